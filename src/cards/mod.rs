//! Card definitions, catalog and instances.

mod catalog;
mod definition;
mod instance;

pub use catalog::CardCatalog;
pub use definition::{CardDefinition, CardId, CardKind, Color, CostProfile};
pub use instance::{CardInstance, InstanceId, Zone};
