use super::error::{EngineError, StateViolation};
use super::state::{GamePhase, GameState, HAND_SIZE};
use crate::model::card::Card;
use crate::model::deck::DECK_SIZE;
use crate::model::player::PlayerPosition;
use crate::model::trick::Trick;
use std::collections::HashSet;

impl GameState {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Decodes a snapshot and rejects it unless every card of the deck is
    /// accounted for exactly once.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let state: GameState = serde_json::from_str(json).map_err(|err| {
            EngineError::state("from_json", StateViolation::Decode(err.to_string()))
        })?;
        state
            .check_integrity()
            .map_err(|reason| EngineError::state("from_json", reason))?;
        Ok(state)
    }

    /// Every card in hands, kitty, tricks and set-aside piles.
    pub fn accounted_cards(&self) -> Vec<Card> {
        let mut cards: Vec<Card> = self
            .players
            .iter()
            .flat_map(|player| player.hand.iter().copied())
            .collect();
        cards.extend(self.kitty.iter().copied());

        match &self.phase {
            GamePhase::TrumpSelection(selection) => cards.push(selection.turned_up()),
            GamePhase::Playing(play) => {
                if !play.ordered_up {
                    cards.push(play.turned_up);
                }
                cards.extend(play.discard);
                cards.extend(play.current_trick.cards());
                cards.extend(play.completed_tricks.iter().flat_map(|trick| trick.cards()));
            }
            GamePhase::HandComplete(summary) | GamePhase::GameComplete(summary) => {
                if !summary.ordered_up {
                    cards.push(summary.turned_up);
                }
                cards.extend(summary.discard);
                cards.extend(
                    summary
                        .completed_tricks
                        .iter()
                        .flat_map(|trick| trick.cards()),
                );
            }
        }
        cards
    }

    /// Rejects snapshots whose seats are out of order, whose hands hold the
    /// wrong number of cards for the phase, or whose deck is not exactly the
    /// 24 cards once each.
    pub fn check_integrity(&self) -> Result<(), StateViolation> {
        self.check_seating()?;
        for seat in PlayerPosition::LOOP {
            let held = self.hand(seat).len();
            let expected = self.expected_hand_size(seat);
            if held != expected {
                return Err(StateViolation::Integrity(format!(
                    "{seat} holds {held} cards, expected {expected}"
                )));
            }
        }

        let cards = self.accounted_cards();
        let mut seen = HashSet::with_capacity(DECK_SIZE);
        if let Some(duplicate) = cards.iter().find(|card| !seen.insert(**card)) {
            return Err(StateViolation::Integrity(format!(
                "{duplicate} appears more than once"
            )));
        }
        if cards.len() != DECK_SIZE {
            return Err(StateViolation::Integrity(format!(
                "{} cards accounted for, expected {DECK_SIZE}",
                cards.len()
            )));
        }
        Ok(())
    }

    fn check_seating(&self) -> Result<(), StateViolation> {
        for (slot, (player, seat)) in self.players.iter().zip(PlayerPosition::LOOP).enumerate() {
            if player.position != seat {
                return Err(StateViolation::Integrity(format!(
                    "seat slot {slot} holds {}, expected {seat}",
                    player.position
                )));
            }
            if player.team != seat.team() {
                return Err(StateViolation::Integrity(format!(
                    "{seat} is listed on {}, expected {}",
                    player.team,
                    seat.team()
                )));
            }
        }
        Ok(())
    }

    /// Five dealt, plus the pickup while the dealer's discard is pending,
    /// minus every card the seat has put into a trick.
    fn expected_hand_size(&self, seat: PlayerPosition) -> usize {
        let (ordered_up, discard, tricks): (bool, Option<Card>, Vec<&Trick>) = match &self.phase {
            GamePhase::TrumpSelection(_) => return HAND_SIZE,
            GamePhase::Playing(play) => (
                play.ordered_up,
                play.discard,
                play.completed_tricks
                    .iter()
                    .chain(std::iter::once(&play.current_trick))
                    .collect(),
            ),
            GamePhase::HandComplete(summary) | GamePhase::GameComplete(summary) => (
                summary.ordered_up,
                summary.discard,
                summary.completed_tricks.iter().collect(),
            ),
        };
        let pickup = usize::from(ordered_up && discard.is_none() && seat == self.dealer);
        let played = tricks
            .iter()
            .flat_map(|trick| trick.plays())
            .filter(|play| play.position == seat)
            .count();
        (HAND_SIZE + pickup).saturating_sub(played)
    }
}
