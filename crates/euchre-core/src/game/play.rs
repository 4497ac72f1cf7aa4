use crate::game::error::{EngineError, PlayViolation, StateViolation};
use crate::game::state::{GamePhase, GameState, HAND_SIZE, HandSummary, PlayState};
use crate::model::card::Card;
use crate::model::player::PlayerPosition;
use crate::model::score::{Contract, TRICKS_PER_HAND, score_hand, tricks_by_team};
use crate::model::suit::Suit;
use crate::model::trick::{Play, Trick};
use tracing::{Level, event};

/// Seat that takes the trick, given it holds exactly the plays the contract requires.
pub fn determine_trick_winner(
    trick: &Trick,
    trump: Suit,
    going_alone: bool,
) -> Result<PlayerPosition, EngineError> {
    let expected = if going_alone { 3 } else { 4 };
    if trick.len() != expected {
        return Err(EngineError::state(
            "determine_trick_winner",
            StateViolation::TrickPlayCount {
                expected,
                actual: trick.len(),
            },
        ));
    }
    trick
        .best_play(trump)
        .map(|play| play.position)
        .ok_or_else(|| {
            EngineError::state(
                "determine_trick_winner",
                StateViolation::TrickPlayCount {
                    expected,
                    actual: 0,
                },
            )
        })
}

/// Seats taking part in this trick, clockwise from its leader.
fn active_order(trick: &Trick, contract: Contract) -> impl Iterator<Item = PlayerPosition> {
    let sitting_out = contract.sitting_out();
    PlayerPosition::positions_from(trick.leader())
        .into_iter()
        .filter(move |&seat| Some(seat) != sitting_out)
}

fn next_in_trick(play: &PlayState) -> Option<PlayerPosition> {
    active_order(&play.current_trick, play.contract).nth(play.current_trick.len())
}

fn discard_pending(state: &GameState, play: &PlayState) -> bool {
    play.ordered_up && state.hand(state.dealer()).len() > HAND_SIZE
}

/// Cards `hand` may legally contribute to `trick` under `trump`.
fn legal_cards(hand: &[Card], trick: &Trick, trump: Suit) -> Vec<Card> {
    let Some(lead_suit) = trick.lead_suit(trump) else {
        return hand.to_vec();
    };
    let following: Vec<Card> = hand
        .iter()
        .copied()
        .filter(|card| card.effective_suit(trump) == lead_suit)
        .collect();
    if following.is_empty() {
        hand.to_vec()
    } else {
        following
    }
}

impl GameState {
    /// True while the dealer holds the ordered-up card and must discard
    /// before anyone plays.
    pub fn awaiting_discard(&self) -> bool {
        self.play_state()
            .is_some_and(|play| discard_pending(self, play))
    }

    pub fn next_player(&self) -> Result<PlayerPosition, EngineError> {
        let play = self
            .play_state()
            .ok_or_else(|| self.wrong_phase("next_player", "playing"))?;
        next_in_trick(play)
            .ok_or_else(|| EngineError::state("next_player", StateViolation::TrickComplete))
    }

    /// Cards `player` may play now. Outside trick play every held card is listed,
    /// which is meant for display only.
    pub fn valid_cards_for_play(&self, player: PlayerPosition) -> Vec<Card> {
        let hand = self.hand(player).cards();
        let Some(play) = self.play_state() else {
            return hand.to_vec();
        };
        if discard_pending(self, play) {
            return Vec::new();
        }
        legal_cards(hand, &play.current_trick, play.contract.trump)
    }

    /// Probes a play without committing it. Agrees with `valid_cards_for_play`
    /// for the seat whose turn it is.
    pub fn validate_play(&self, card: Card, player: PlayerPosition) -> Result<(), PlayViolation> {
        let Some(play) = self.play_state() else {
            return Err(PlayViolation::NotPlayingPhase);
        };
        if discard_pending(self, play) {
            return Err(PlayViolation::DiscardPending);
        }
        let expected = next_in_trick(play).ok_or(PlayViolation::TrickComplete)?;
        if expected != player {
            return Err(PlayViolation::NotYourTurn { expected });
        }

        let hand = self.hand(player);
        if !hand.contains(card) {
            return Err(PlayViolation::CardNotInHand);
        }

        let trump = play.contract.trump;
        if let Some(lead_suit) = play.current_trick.lead_suit(trump) {
            let can_follow = hand.iter().any(|c| c.effective_suit(trump) == lead_suit);
            if can_follow && card.effective_suit(trump) != lead_suit {
                return Err(PlayViolation::MustFollowSuit { lead_suit });
            }
        }
        Ok(())
    }

    pub fn play_card(
        &self,
        player: PlayerPosition,
        card: Card,
        reasoning: Option<&str>,
    ) -> Result<GameState, EngineError> {
        self.validate_play(card, player)
            .map_err(|reason| EngineError::InvalidPlay {
                player,
                card,
                reason,
            })?;

        event!(
            target: "euchre_core::decision",
            Level::DEBUG,
            hand_number = self.hand_number,
            seat = %player,
            card = %card,
            reasoning = reasoning.unwrap_or(""),
            "card played"
        );

        let mut next = self.clone();
        next.players[player.index()]
            .hand
            .remove(card)
            .map_err(|err| EngineError::state("play_card", err.into()))?;

        let GamePhase::Playing(mut play) = next.phase else {
            return Err(self.wrong_phase("play_card", "playing"));
        };
        play.current_trick.push(Play {
            position: player,
            card,
            reasoning: reasoning.map(str::to_string),
        });

        if play.current_trick.len() < play.contract.plays_per_trick() {
            next.phase = GamePhase::Playing(play);
            return Ok(next);
        }

        let contract = play.contract;
        let winner =
            determine_trick_winner(&play.current_trick, contract.trump, contract.going_alone)?;
        let finished = std::mem::replace(&mut play.current_trick, Trick::new(winner));
        play.completed_tricks.push_back(finished.resolve(winner));
        event!(
            target: "euchre_core::lifecycle",
            Level::INFO,
            hand_number = next.hand_number,
            trick = play.completed_tricks.len(),
            winner = %winner,
            "trick complete"
        );

        if play.completed_tricks.len() < TRICKS_PER_HAND {
            next.phase = GamePhase::Playing(play);
            return Ok(next);
        }

        next.phase = finish_hand(&mut next.game_scores, next.winning_score, play);
        event!(
            target: "euchre_core::lifecycle",
            Level::INFO,
            hand_number = next.hand_number,
            phase = next.phase.name(),
            north_south = next.game_scores[0],
            east_west = next.game_scores[1],
            "hand scored"
        );
        Ok(next)
    }
}

fn finish_hand(game_scores: &mut [u32; 2], winning_score: u32, play: PlayState) -> GamePhase {
    let (points, result) = score_hand(play.contract, play.completed_tricks.iter());
    for (total, earned) in game_scores.iter_mut().zip(points) {
        *total += earned;
    }
    let summary = HandSummary {
        contract: play.contract,
        turned_up: play.turned_up,
        ordered_up: play.ordered_up,
        discard: play.discard,
        tricks_won: tricks_by_team(play.completed_tricks.iter()),
        completed_tricks: play.completed_tricks,
        points,
        result,
    };
    if game_scores.iter().any(|&score| score >= winning_score) {
        GamePhase::GameComplete(summary)
    } else {
        GamePhase::HandComplete(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::determine_trick_winner;
    use crate::game::bidding::BidAction;
    use crate::game::error::{EngineError, PlayViolation, StateViolation};
    use crate::game::state::{GameState, NewGameOptions};
    use crate::model::card::Card;
    use crate::model::player::PlayerPosition;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;
    use crate::model::trick::{Play, Trick};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ordered_up(seed: u64, going_alone: bool) -> GameState {
        let mut rng = StdRng::seed_from_u64(seed);
        let state = GameState::create_new_game_with_rng(
            NewGameOptions::new(["a", "b", "c", "d"]).with_dealer(PlayerPosition::North),
            &mut rng,
        );
        state
            .make_trump_bid(PlayerPosition::East, BidAction::OrderUp, None, going_alone, None)
            .unwrap()
    }

    fn after_discard(seed: u64, going_alone: bool) -> GameState {
        let state = ordered_up(seed, going_alone);
        let card = state.hand(PlayerPosition::North).cards()[0];
        state.dealer_discard(card).unwrap()
    }

    fn trick_of(leader: PlayerPosition, cards: &[Card]) -> Trick {
        let mut trick = Trick::new(leader);
        for (seat, &card) in PlayerPosition::positions_from(leader).iter().zip(cards) {
            trick.push(Play {
                position: *seat,
                card,
                reasoning: None,
            });
        }
        trick
    }

    #[test]
    fn winner_needs_full_trick() {
        let cards = [
            Card::new(Rank::Nine, Suit::Clubs),
            Card::new(Rank::Ace, Suit::Clubs),
            Card::new(Rank::Ten, Suit::Clubs),
        ];
        let trick = trick_of(PlayerPosition::North, &cards);
        assert_eq!(
            determine_trick_winner(&trick, Suit::Hearts, true).unwrap(),
            PlayerPosition::East
        );
        let err = determine_trick_winner(&trick, Suit::Hearts, false).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidGameState {
                reason: StateViolation::TrickPlayCount {
                    expected: 4,
                    actual: 3
                },
                ..
            }
        ));
    }

    #[test]
    fn left_bower_wins_over_ace_of_trump() {
        let cards = [
            Card::new(Rank::Ace, Suit::Spades),
            Card::new(Rank::Jack, Suit::Clubs),
            Card::new(Rank::King, Suit::Spades),
            Card::new(Rank::Ace, Suit::Hearts),
        ];
        let trick = trick_of(PlayerPosition::West, &cards);
        assert_eq!(
            determine_trick_winner(&trick, Suit::Spades, false).unwrap(),
            PlayerPosition::North
        );
    }

    #[test]
    fn play_is_blocked_until_dealer_discards() {
        let state = ordered_up(31, false);
        assert!(state.awaiting_discard());
        assert!(!after_discard(31, false).awaiting_discard());
        let leader = state.next_player().unwrap();
        assert_eq!(leader, PlayerPosition::East);
        assert!(state.valid_cards_for_play(leader).is_empty());
        let card = state.hand(leader).cards()[0];
        assert_eq!(
            state.validate_play(card, leader),
            Err(PlayViolation::DiscardPending)
        );
    }

    #[test]
    fn leader_may_play_anything() {
        let state = after_discard(31, false);
        let leader = state.next_player().unwrap();
        assert_eq!(state.valid_cards_for_play(leader), state.hand(leader).cards());
        for &card in state.hand(leader).cards() {
            assert_eq!(state.validate_play(card, leader), Ok(()));
        }
    }

    #[test]
    fn out_of_turn_and_missing_cards_rejected() {
        let state = after_discard(31, false);
        let south_card = state.hand(PlayerPosition::South).cards()[0];
        assert_eq!(
            state.validate_play(south_card, PlayerPosition::South),
            Err(PlayViolation::NotYourTurn {
                expected: PlayerPosition::East
            })
        );
        let err = state
            .play_card(PlayerPosition::East, south_card, None)
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidPlay {
                player: PlayerPosition::East,
                card: south_card,
                reason: PlayViolation::CardNotInHand,
            }
        );
    }

    #[test]
    fn turn_order_skips_sitting_out_partner() {
        let mut state = after_discard(44, true);
        assert_eq!(state.going_alone(), Some(PlayerPosition::East));
        let mut seen = Vec::new();
        for _ in 0..3 {
            let seat = state.next_player().unwrap();
            seen.push(seat);
            let card = state.valid_cards_for_play(seat)[0];
            state = state.play_card(seat, card, Some("probe")).unwrap();
        }
        assert_eq!(
            seen,
            vec![PlayerPosition::East, PlayerPosition::South, PlayerPosition::North]
        );
        let completed = state.completed_tricks().unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].len(), 3);
        let winner = completed[0].winner().unwrap();
        assert_ne!(winner, PlayerPosition::West);
        assert_eq!(state.current_trick().unwrap().leader(), winner);
        assert!(state.current_trick().unwrap().is_empty());
    }

    #[test]
    fn must_follow_suit_when_able() {
        let mut state = after_discard(57, false);
        let leader = state.next_player().unwrap();
        let lead = state.hand(leader).cards()[0];
        state = state.play_card(leader, lead, None).unwrap();

        let trump = state.trump().unwrap();
        let lead_suit = lead.effective_suit(trump);
        let seat = state.next_player().unwrap();
        let hand = state.hand(seat).cards().to_vec();
        let valid = state.valid_cards_for_play(seat);
        if hand.iter().any(|c| c.effective_suit(trump) == lead_suit) {
            assert!(valid.iter().all(|c| c.effective_suit(trump) == lead_suit));
            if let Some(&off) = hand.iter().find(|c| c.effective_suit(trump) != lead_suit) {
                assert_eq!(
                    state.validate_play(off, seat),
                    Err(PlayViolation::MustFollowSuit { lead_suit })
                );
            }
        } else {
            assert_eq!(valid, hand);
        }
    }

    #[test]
    fn before_trump_every_card_is_listed() {
        let mut rng = StdRng::seed_from_u64(2);
        let state = GameState::create_new_game_with_rng(
            NewGameOptions::new(["a", "b", "c", "d"]),
            &mut rng,
        );
        let seat = PlayerPosition::South;
        assert_eq!(state.valid_cards_for_play(seat), state.hand(seat).cards());
        assert_eq!(
            state.validate_play(state.hand(seat).cards()[0], seat),
            Err(PlayViolation::NotPlayingPhase)
        );
        assert!(state.next_player().unwrap_err().is_state_error());
    }
}
