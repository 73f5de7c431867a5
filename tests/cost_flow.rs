//! Human cost payment through the decision gateway: suspension, rejection
//! of bad selections, cancellation, and atomic application.

use tcg_sim::{
    AbilityRegistry, CardCatalog, CardDefinition, CardKind, Color, CostProfile, DecisionRequest,
    GameSession, Payment, PaymentSource, Seat, SeatPair, SessionConfig,
};

fn crimson_pool() -> (CardCatalog, tcg_sim::CardId) {
    let mut catalog = CardCatalog::new();
    let id = catalog.next_id();
    catalog.register(
        CardDefinition::new(id, "Crimson Knight", CardKind::Friend, Color::Red)
            .with_cost(CostProfile {
                total: 2,
                red: 1,
                ..CostProfile::free()
            })
            .with_power(2000),
    );
    (catalog, id)
}

fn session_with_two_energy() -> GameSession {
    let (catalog, card) = crimson_pool();
    let mut session = GameSession::new(
        catalog,
        AbilityRegistry::new(),
        SeatPair::with_value(vec![card; 50]),
        SessionConfig::default().with_seed(3),
    )
    .unwrap();
    session.begin().unwrap();

    // Two turns of energy plays for the first seat.
    session.play_energy(Seat::First, 0).unwrap();
    session.end_turn(Seat::First).unwrap();
    session.pass_energy(Seat::Second).unwrap();
    session.end_turn(Seat::Second).unwrap();
    session.play_energy(Seat::First, 0).unwrap();
    session
}

#[test]
fn test_unpayable_cost_rejected_without_suspension() {
    let (catalog, card) = crimson_pool();
    let mut session = GameSession::new(
        catalog,
        AbilityRegistry::new(),
        SeatPair::with_value(vec![card; 50]),
        SessionConfig::default().with_seed(3),
    )
    .unwrap();
    session.begin().unwrap();
    session.pass_energy(Seat::First).unwrap();

    // No energy at all: the play fails up front, nothing parked.
    assert!(session.play_card(Seat::First, 0).is_err());
    assert!(session.pending().is_none());
    assert_eq!(session.state().player(Seat::First).hand.len(), 5);
}

#[test]
fn test_insufficient_selection_keeps_request_pending() {
    let mut session = session_with_two_energy();
    session.play_card(Seat::First, 0).unwrap();
    assert!(matches!(
        session.pending(),
        Some(DecisionRequest::CostSelection(_))
    ));

    let short = Payment {
        sources: vec![PaymentSource::Energy(0)],
    };
    assert!(session.resolve_cost_selection(Some(short)).is_err());

    // Nothing was spent and the request is still outstanding.
    assert!(session.pending().is_some());
    assert!(session
        .state()
        .player(Seat::First)
        .energy
        .iter()
        .all(|slot| !slot.tapped));
}

#[test]
fn test_cancel_aborts_play_without_mutation() {
    let mut session = session_with_two_energy();
    let hand_before = session.state().player(Seat::First).hand.clone();

    session.play_card(Seat::First, 0).unwrap();
    session.resolve_cost_selection(None).unwrap();

    assert!(session.pending().is_none());
    assert_eq!(session.state().player(Seat::First).hand, hand_before);
    assert!(session.state().player(Seat::First).friends.is_empty());
    assert!(session
        .state()
        .player(Seat::First)
        .energy
        .iter()
        .all(|slot| !slot.tapped));
}

#[test]
fn test_valid_selection_pays_and_plays() {
    let mut session = session_with_two_energy();
    session.play_card(Seat::First, 0).unwrap();

    let payment = Payment {
        sources: vec![PaymentSource::Energy(0), PaymentSource::Energy(1)],
    };
    session.resolve_cost_selection(Some(payment)).unwrap();

    assert!(session.pending().is_none());
    assert_eq!(session.state().player(Seat::First).friends.len(), 1);
    assert!(session
        .state()
        .player(Seat::First)
        .energy
        .iter()
        .all(|slot| slot.tapped));
    assert_eq!(session.state().card_count(Seat::First), 50);
}

#[test]
fn test_cancel_pending_helper_matches_explicit_cancel() {
    let mut session = session_with_two_energy();
    session.play_card(Seat::First, 0).unwrap();
    session.cancel_pending().unwrap();

    assert!(session.pending().is_none());
    assert!(session.state().player(Seat::First).friends.is_empty());
}
