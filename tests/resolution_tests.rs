//! Ability resolution scenarios through the public API.

mod common;

use std::sync::Arc;

use duel_ccg::{
    AbilityKind, AbilityResolver, CardDefinition, CardId, GameEvent, GameRng, PlayerId,
    PlayerMap, PlayerSession, Seat,
};

const A: Seat = Seat::new(0);
const B: Seat = Seat::new(1);

fn plain(id: u32, power: u32) -> CardDefinition {
    CardDefinition::new(CardId::new(id), format!("Card {id}"), 1, power)
}

fn with(id: u32, power: u32, kind: AbilityKind, magnitude: u32) -> CardDefinition {
    plain(id, power).with_ability(kind, magnitude)
}

/// Build a session holding `hand` and commit `play` from it.
fn session(name: &str, cards: Vec<CardDefinition>, play: &[u32]) -> PlayerSession {
    let deck: Vec<Arc<CardDefinition>> = cards.into_iter().map(Arc::new).collect();
    let mut session = PlayerSession::new(PlayerId::new(name), deck);
    let n = session.deck().len();
    session.draw_cards(n);
    let ids: Vec<CardId> = play.iter().map(|&id| CardId::new(id)).collect();
    session.commit(&ids).unwrap();
    session
}

fn resolve(a: PlayerSession, b: PlayerSession, seed: u64) -> (PlayerMap<PlayerSession>, Vec<GameEvent>) {
    common::init_tracing();
    let mut sessions = PlayerMap::from_vec(vec![a, b]);
    let resolution = AbilityResolver::resolve(&mut sessions, &mut GameRng::new(seed));
    (sessions, resolution.events)
}

/// A's destroyer removes B's only card before scoring: B gains nothing,
/// A gains its own card's power.
#[test]
fn test_destroy_before_scoring() {
    let a = session("a", vec![with(1, 2, AbilityKind::DestroyOpponentCardInPlay, 1)], &[1]);
    let b = session("b", vec![plain(2, 3)], &[2]);

    let (sessions, events) = resolve(a, b, 1);

    assert_eq!(sessions[A].score(), 2);
    assert_eq!(sessions[B].score(), 0);
    assert!(events
        .iter()
        .all(|e| e.player_id() != Some(&PlayerId::new("b"))));
}

/// Opponent at 2, steal 5: opponent floors at 0, owner gains 2.
#[test]
fn test_steal_floors_at_zero() {
    let a = session("a", vec![with(1, 0, AbilityKind::StealPoints, 5)], &[1]);
    let mut b = session("b", vec![], &[]);
    b.add_score(2);

    let (sessions, events) = resolve(a, b, 1);

    assert_eq!(sessions[A].score(), 2);
    assert_eq!(sessions[B].score(), 0);
    assert_eq!(
        events,
        vec![
            GameEvent::ScoreChanged {
                player_id: PlayerId::new("a"),
                new_score: 0
            },
            GameEvent::ScoreChanged {
                player_id: PlayerId::new("a"),
                new_score: 2
            },
            GameEvent::ScoreChanged {
                player_id: PlayerId::new("b"),
                new_score: 0
            },
        ]
    );
}

/// Discard magnitude beyond the hand empties the hand exactly.
#[test]
fn test_discard_beyond_hand_size() {
    let a = session("a", vec![with(1, 1, AbilityKind::DiscardOpponentRandomCard, 9)], &[1]);
    let b = session("b", vec![plain(2, 1), plain(3, 1), plain(4, 1)], &[]);

    let (sessions, events) = resolve(a, b, 3);

    assert!(sessions[B].hand().is_empty());
    assert_eq!(
        events.last(),
        Some(&GameEvent::HandChanged {
            player_id: PlayerId::new("b"),
            hand_card_ids: vec![]
        })
    );
}

/// Destroy budgets are fixed before anything is removed, so two
/// destroyers cancel each other regardless of seat.
#[test]
fn test_destroyers_are_seat_symmetric() {
    let build = || {
        (
            session(
                "a",
                vec![
                    with(1, 4, AbilityKind::DestroyOpponentCardInPlay, 1),
                    plain(2, 5),
                ],
                &[1, 2],
            ),
            session("b", vec![with(3, 4, AbilityKind::DestroyOpponentCardInPlay, 1)], &[3]),
        )
    };

    let (a, b) = build();
    let (forward, _) = resolve(a, b, 1);
    let (a, b) = build();
    let (backward, _) = resolve(b, a, 1);

    // a loses its destroyer and keeps the 5; b loses its destroyer.
    assert_eq!(forward[A].score(), 5);
    assert_eq!(forward[B].score(), 0);
    assert_eq!(backward[B].score(), 5);
    assert_eq!(backward[A].score(), 0);
}

/// Draw-extra-card moves from deck to hand and reports the new hand.
#[test]
fn test_draw_extra_card() {
    let deck: Vec<Arc<CardDefinition>> = vec![
        Arc::new(with(1, 1, AbilityKind::DrawExtraCard, 2)),
        Arc::new(plain(2, 1)),
        Arc::new(plain(3, 1)),
        Arc::new(plain(4, 1)),
    ];
    let mut a = PlayerSession::new(PlayerId::new("a"), deck);
    a.draw_card();
    a.commit(&[CardId::new(1)]).unwrap();
    let b = session("b", vec![], &[]);

    let (sessions, events) = resolve(a, b, 1);

    assert_eq!(sessions[A].hand_ids(), vec![CardId::new(2), CardId::new(3)]);
    assert_eq!(sessions[A].deck().len(), 1);
    assert_eq!(
        events,
        vec![
            GameEvent::ScoreChanged {
                player_id: PlayerId::new("a"),
                new_score: 1
            },
            GameEvent::HandChanged {
                player_id: PlayerId::new("a"),
                hand_card_ids: vec![CardId::new(2), CardId::new(3)]
            },
        ]
    );
}

/// Double power multiplies the card's own power; gain adds on top.
#[test]
fn test_double_power_and_gain() {
    let a = session(
        "a",
        vec![
            with(1, 3, AbilityKind::DoublePower, 2),
            with(2, 1, AbilityKind::GainPoints, 3),
        ],
        &[1, 2],
    );
    let b = session("b", vec![], &[]);

    let (sessions, events) = resolve(a, b, 1);

    assert_eq!(sessions[A].score(), 6 + 1 + 3);
    let scores: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::ScoreChanged { new_score, .. } => Some(*new_score),
            _ => None,
        })
        .collect();
    assert_eq!(scores, vec![6, 7, 10]);
    assert!(sessions[A].cards_in_play().is_empty());
}
