//! Ability resolution - scoring a turn's committed cards.
//!
//! Resolution runs in two strict passes:
//!
//! 1. **Destructive pass.** Every seat's destroy budget is summed from the
//!    cards it committed, all at once, then each seat loses up to the
//!    opponent's budget from the front of its `cards_in_play` (earliest
//!    commit first). Because budgets are fixed before any removal, seat
//!    order does not matter here.
//! 2. **Scoring pass.** Seat by seat, in commit order, each surviving card
//!    adds its effective power to its owner's score and then applies its
//!    non-destructive ability.
//!
//! Every score or hand mutation yields its event immediately, so the
//! returned event list is the exact mutation order. The resolver keeps no
//! state between calls; the RNG is the authority's and only picks discard
//! targets, whose outcome travels in the resulting `HandChanged` event.

use std::sync::Arc;

use tracing::warn;

use crate::cards::{AbilityKind, CardDefinition, CardId};
use crate::core::{GameRng, PlayerId, PlayerMap, PlayerSession, Seat, PLAYER_COUNT};
use crate::events::GameEvent;

/// Everything one resolution produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Events in mutation order.
    pub events: Vec<GameEvent>,

    /// Cards removed in the destructive pass, per victim.
    pub destroyed: Vec<(PlayerId, CardId)>,

    /// Net score change per seat.
    pub score_deltas: Vec<i64>,
}

/// Resolves one turn over both sessions.
pub struct AbilityResolver;

impl AbilityResolver {
    /// Resolve the cards currently in play and clear the board.
    ///
    /// Resolution is defined for exactly two seats; any other board is left
    /// untouched and yields an empty `Resolution`.
    pub fn resolve(sessions: &mut PlayerMap<PlayerSession>, rng: &mut GameRng) -> Resolution {
        if sessions.len() != PLAYER_COUNT {
            warn!(seats = sessions.len(), "resolution skipped for a non two-seat board");
            return Resolution::default();
        }

        let start_scores: Vec<u32> = sessions.values().map(PlayerSession::score).collect();
        let mut resolution = Resolution::default();

        Self::destructive_pass(sessions, &mut resolution);

        for seat in sessions.seats().collect::<Vec<_>>() {
            Self::scoring_pass(sessions, seat, rng, &mut resolution);
        }

        for (_, session) in sessions.iter_mut() {
            session.clear_cards_in_play();
        }

        resolution.score_deltas = sessions
            .values()
            .zip(start_scores)
            .map(|(s, start)| i64::from(s.score()) - i64::from(start))
            .collect();

        resolution
    }

    fn destructive_pass(sessions: &mut PlayerMap<PlayerSession>, out: &mut Resolution) {
        let budgets: Vec<u32> = sessions
            .values()
            .map(|s| {
                s.cards_in_play()
                    .iter()
                    .filter_map(|c| c.ability)
                    .filter(|a| a.kind.is_destructive())
                    .fold(0u32, |sum, a| sum.saturating_add(a.magnitude))
            })
            .collect();

        for (seat, session) in sessions.iter_mut() {
            let budget = budgets[seat.opponent().index()];
            for _ in 0..budget {
                match session.remove_earliest_in_play() {
                    Some(card) => out.destroyed.push((session.player_id().clone(), card.id)),
                    None => break,
                }
            }
        }
    }

    fn scoring_pass(
        sessions: &mut PlayerMap<PlayerSession>,
        seat: Seat,
        rng: &mut GameRng,
        out: &mut Resolution,
    ) {
        let survivors: Vec<Arc<CardDefinition>> = sessions[seat].cards_in_play().to_vec();
        let (owner, opponent) = sessions.pair_mut(seat, seat.opponent());

        for card in survivors {
            owner.add_score(card.effective_power());
            out.events.push(GameEvent::score(owner.player_id(), owner.score()));

            if let Some(ability) = card.ability {
                Self::apply_ability(ability.kind, ability.magnitude, owner, opponent, rng, out);
            }
        }
    }

    fn apply_ability(
        kind: AbilityKind,
        magnitude: u32,
        owner: &mut PlayerSession,
        opponent: &mut PlayerSession,
        rng: &mut GameRng,
        out: &mut Resolution,
    ) {
        match kind {
            AbilityKind::GainPoints => {
                owner.add_score(magnitude);
                out.events.push(GameEvent::score(owner.player_id(), owner.score()));
            }
            AbilityKind::StealPoints => {
                let taken = opponent.remove_score(magnitude);
                owner.add_score(taken);
                out.events.push(GameEvent::score(owner.player_id(), owner.score()));
                out.events.push(GameEvent::score(opponent.player_id(), opponent.score()));
            }
            AbilityKind::DrawExtraCard => {
                owner.draw_cards(magnitude as usize);
                out.events.push(GameEvent::hand(owner.player_id(), owner.hand_ids()));
            }
            AbilityKind::DiscardOpponentRandomCard => {
                for _ in 0..magnitude {
                    let len = opponent.hand().len();
                    if len == 0 {
                        break;
                    }
                    opponent.remove_hand_at(rng.gen_index(len));
                }
                out.events.push(GameEvent::hand(opponent.player_id(), opponent.hand_ids()));
            }
            // Multiplier is part of effective power; destruction ran in pass 1.
            AbilityKind::DoublePower | AbilityKind::DestroyOpponentCardInPlay => {}
        }
    }
}
