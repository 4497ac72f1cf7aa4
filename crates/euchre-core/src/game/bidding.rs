use crate::game::error::BidViolation;
use crate::model::card::Card;
use crate::model::player::PlayerPosition;
use crate::model::score::Contract;
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};

const BIDS_PER_ROUND: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidAction {
    OrderUp,
    Pass,
    CallTrump,
}

impl BidAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            BidAction::OrderUp => "order_up",
            BidAction::Pass => "pass",
            BidAction::CallTrump => "call_trump",
        }
    }
}

impl fmt::Display for BidAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrumpBid {
    pub player: PlayerPosition,
    pub action: BidAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suit: Option<Suit>,
    #[serde(default)]
    pub going_alone: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl TrumpBid {
    pub fn pass(player: PlayerPosition) -> Self {
        Self {
            player,
            action: BidAction::Pass,
            suit: None,
            going_alone: false,
            reasoning: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiddingRound {
    First,
    Second,
}

impl BiddingRound {
    pub const fn number(self) -> u8 {
        match self {
            BiddingRound::First => 1,
            BiddingRound::Second => 2,
        }
    }
}

/// Bidding in progress. Each round keeps its own log of at most four bids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrumpSelectionState {
    turned_up: Card,
    dealer: PlayerPosition,
    current_bidder: PlayerPosition,
    round: BiddingRound,
    round1_bids: Vec<TrumpBid>,
    round2_bids: Vec<TrumpBid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BidOutcome {
    Continue(TrumpSelectionState),
    TrumpSet { contract: Contract, ordered_up: bool },
}

impl TrumpSelectionState {
    pub fn new(turned_up: Card, dealer: PlayerPosition) -> Self {
        Self {
            turned_up,
            dealer,
            current_bidder: dealer.next(),
            round: BiddingRound::First,
            round1_bids: Vec::with_capacity(BIDS_PER_ROUND),
            round2_bids: Vec::with_capacity(BIDS_PER_ROUND),
        }
    }

    pub fn turned_up(&self) -> Card {
        self.turned_up
    }

    pub fn dealer(&self) -> PlayerPosition {
        self.dealer
    }

    pub fn current_bidder(&self) -> PlayerPosition {
        self.current_bidder
    }

    pub fn round(&self) -> BiddingRound {
        self.round
    }

    pub fn round1_bids(&self) -> &[TrumpBid] {
        &self.round1_bids
    }

    pub fn round2_bids(&self) -> &[TrumpBid] {
        &self.round2_bids
    }

    /// Full bid history, first round then second.
    pub fn bids(&self) -> impl Iterator<Item = &TrumpBid> {
        self.round1_bids.iter().chain(self.round2_bids.iter())
    }

    /// Suits the current bidder may name in the second round.
    pub fn callable_suits(&self) -> impl Iterator<Item = Suit> + '_ {
        Suit::ALL
            .into_iter()
            .filter(move |&suit| suit != self.turned_up.suit)
    }

    pub fn dealer_must_call(&self) -> bool {
        self.round == BiddingRound::Second
            && self.current_bidder == self.dealer
            && self.round2_bids.len() == BIDS_PER_ROUND - 1
    }

    pub fn check(&self, bid: &TrumpBid) -> Result<(), BidViolation> {
        if bid.player != self.current_bidder {
            return Err(BidViolation::NotYourTurn {
                expected: self.current_bidder,
            });
        }

        match (bid.action, self.round) {
            (BidAction::OrderUp, BiddingRound::Second) => {
                return Err(BidViolation::OrderUpInRoundTwo);
            }
            (BidAction::CallTrump, BiddingRound::First) => {
                return Err(BidViolation::CallTrumpInRoundOne);
            }
            (BidAction::CallTrump, BiddingRound::Second) => {
                let suit = bid.suit.ok_or(BidViolation::MissingSuit)?;
                if suit == self.turned_up.suit {
                    return Err(BidViolation::TurnedDownSuit(suit));
                }
            }
            (BidAction::Pass, _) if self.dealer_must_call() => {
                return Err(BidViolation::DealerMustCall);
            }
            _ => {}
        }

        Ok(())
    }

    pub fn apply(&self, bid: TrumpBid) -> Result<BidOutcome, BidViolation> {
        self.check(&bid)?;

        let trump = match bid.action {
            BidAction::OrderUp => Some(self.turned_up.suit),
            BidAction::CallTrump => bid.suit,
            BidAction::Pass => None,
        };
        if let Some(trump) = trump {
            return Ok(BidOutcome::TrumpSet {
                contract: Contract {
                    trump,
                    caller: bid.player,
                    going_alone: bid.going_alone,
                },
                ordered_up: bid.action == BidAction::OrderUp,
            });
        }

        let mut next = self.clone();
        match next.round {
            BiddingRound::First => {
                next.round1_bids.push(bid);
                if next.round1_bids.len() == BIDS_PER_ROUND {
                    next.round = BiddingRound::Second;
                    next.current_bidder = next.dealer.next();
                } else {
                    next.current_bidder = next.current_bidder.next();
                }
            }
            BiddingRound::Second => {
                next.round2_bids.push(bid);
                next.current_bidder = next.current_bidder.next();
            }
        }
        Ok(BidOutcome::Continue(next))
    }
}

#[cfg(test)]
mod tests {
    use super::{BidAction, BidOutcome, BiddingRound, TrumpBid, TrumpSelectionState};
    use crate::game::error::BidViolation;
    use crate::model::card::Card;
    use crate::model::player::PlayerPosition;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    fn selection() -> TrumpSelectionState {
        TrumpSelectionState::new(Card::new(Rank::Nine, Suit::Hearts), PlayerPosition::North)
    }

    fn pass_all(mut state: TrumpSelectionState, count: usize) -> TrumpSelectionState {
        for _ in 0..count {
            let bid = TrumpBid::pass(state.current_bidder());
            state = match state.apply(bid).unwrap() {
                BidOutcome::Continue(next) => next,
                other => panic!("expected bidding to continue, got {other:?}"),
            };
        }
        state
    }

    fn call(player: PlayerPosition, suit: Option<Suit>) -> TrumpBid {
        TrumpBid {
            player,
            action: BidAction::CallTrump,
            suit,
            going_alone: false,
            reasoning: None,
        }
    }

    #[test]
    fn bidding_starts_left_of_dealer() {
        let state = selection();
        assert_eq!(state.current_bidder(), PlayerPosition::East);
        assert_eq!(state.round(), BiddingRound::First);
    }

    #[test]
    fn four_passes_open_round_two() {
        let state = pass_all(selection(), 4);
        assert_eq!(state.round(), BiddingRound::Second);
        assert_eq!(state.current_bidder(), PlayerPosition::East);
        assert_eq!(state.round1_bids().len(), 4);
        assert!(state.round2_bids().is_empty());
    }

    #[test]
    fn out_of_turn_bid_rejected() {
        let state = selection();
        let err = state.apply(TrumpBid::pass(PlayerPosition::South)).unwrap_err();
        assert_eq!(
            err,
            BidViolation::NotYourTurn {
                expected: PlayerPosition::East
            }
        );
    }

    #[test]
    fn round_restrictions_apply() {
        let state = selection();
        assert_eq!(
            state.check(&call(PlayerPosition::East, Some(Suit::Spades))),
            Err(BidViolation::CallTrumpInRoundOne)
        );

        let second = pass_all(selection(), 4);
        let order_up = TrumpBid {
            action: BidAction::OrderUp,
            ..TrumpBid::pass(PlayerPosition::East)
        };
        assert_eq!(second.check(&order_up), Err(BidViolation::OrderUpInRoundTwo));
        assert_eq!(
            second.check(&call(PlayerPosition::East, None)),
            Err(BidViolation::MissingSuit)
        );
        assert_eq!(
            second.check(&call(PlayerPosition::East, Some(Suit::Hearts))),
            Err(BidViolation::TurnedDownSuit(Suit::Hearts))
        );
    }

    #[test]
    fn dealer_cannot_pass_last() {
        let state = pass_all(selection(), 7);
        assert_eq!(state.current_bidder(), PlayerPosition::North);
        assert!(state.dealer_must_call());
        assert_eq!(
            state.check(&TrumpBid::pass(PlayerPosition::North)),
            Err(BidViolation::DealerMustCall)
        );
        let outcome = state
            .apply(call(PlayerPosition::North, Some(Suit::Clubs)))
            .unwrap();
        match outcome {
            BidOutcome::TrumpSet {
                contract,
                ordered_up,
            } => {
                assert_eq!(contract.trump, Suit::Clubs);
                assert_eq!(contract.caller, PlayerPosition::North);
                assert!(!ordered_up);
            }
            other => panic!("expected trump to be set, got {other:?}"),
        }
    }

    #[test]
    fn order_up_names_turned_up_suit() {
        let bid = TrumpBid {
            action: BidAction::OrderUp,
            going_alone: true,
            ..TrumpBid::pass(PlayerPosition::East)
        };
        match selection().apply(bid).unwrap() {
            BidOutcome::TrumpSet {
                contract,
                ordered_up,
            } => {
                assert_eq!(contract.trump, Suit::Hearts);
                assert!(contract.going_alone);
                assert_eq!(contract.sitting_out(), Some(PlayerPosition::West));
                assert!(ordered_up);
            }
            other => panic!("expected trump to be set, got {other:?}"),
        }
    }

    #[test]
    fn callable_suits_exclude_turned_up() {
        let suits: Vec<_> = selection().callable_suits().collect();
        assert_eq!(suits, vec![Suit::Diamonds, Suit::Clubs, Suit::Spades]);
    }
}
