use crate::game::bidding::BidAction;
use crate::model::card::Card;
use crate::model::hand::HandError;
use crate::model::player::PlayerPosition;
use crate::model::suit::Suit;
use thiserror::Error;

/// Every way a transition can be refused. None of these are transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid game state for {operation}: {reason}")]
    InvalidGameState {
        operation: &'static str,
        reason: StateViolation,
    },
    #[error("invalid bid {action} by {player}: {reason}")]
    InvalidBid {
        player: PlayerPosition,
        action: BidAction,
        reason: BidViolation,
    },
    #[error("invalid play {card} by {player}: {reason}")]
    InvalidPlay {
        player: PlayerPosition,
        card: Card,
        reason: PlayViolation,
    },
}

impl EngineError {
    pub(crate) fn state(operation: &'static str, reason: StateViolation) -> Self {
        EngineError::InvalidGameState { operation, reason }
    }

    pub fn is_state_error(&self) -> bool {
        matches!(self, EngineError::InvalidGameState { .. })
    }
}

/// The snapshot does not fit the requested operation; an orchestrator bug.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateViolation {
    #[error("expected the {expected} phase but the game is in {actual}")]
    WrongPhase {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("no trump caller is recorded")]
    NoTrumpCaller,
    #[error("dealer holds {held} cards, expected {expected}")]
    DealerCardCount { held: usize, expected: usize },
    #[error("trick holds {actual} plays, expected {expected}")]
    TrickPlayCount { expected: usize, actual: usize },
    #[error("the current trick is already complete")]
    TrickComplete,
    #[error("game is already complete")]
    GameComplete,
    #[error("hand number {0} cannot advance further")]
    HandNumberExhausted(u32),
    #[error("{0}")]
    Hand(#[from] HandError),
    #[error("deal integrity violated: {0}")]
    Integrity(String),
    #[error("snapshot could not be decoded: {0}")]
    Decode(String),
}

/// A trump-selection action that breaks the bidding rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BidViolation {
    #[error("it is {expected}'s turn to bid")]
    NotYourTurn { expected: PlayerPosition },
    #[error("ordering up is only allowed in the first round")]
    OrderUpInRoundTwo,
    #[error("calling trump is only allowed in the second round")]
    CallTrumpInRoundOne,
    #[error("calling trump requires a suit")]
    MissingSuit,
    #[error("{0} was turned down and cannot be called")]
    TurnedDownSuit(Suit),
    #[error("the dealer must call trump in the second round")]
    DealerMustCall,
}

/// A card play that breaks the play rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlayViolation {
    #[error("cards can only be played during the playing phase")]
    NotPlayingPhase,
    #[error("the dealer must discard before play begins")]
    DiscardPending,
    #[error("the current trick is already complete")]
    TrickComplete,
    #[error("it is {expected}'s turn to play")]
    NotYourTurn { expected: PlayerPosition },
    #[error("card is not in hand")]
    CardNotInHand,
    #[error("must follow {lead_suit}")]
    MustFollowSuit { lead_suit: Suit },
}

#[cfg(test)]
mod tests {
    use super::{BidViolation, EngineError, PlayViolation, StateViolation};
    use crate::game::bidding::BidAction;
    use crate::model::card::Card;
    use crate::model::player::PlayerPosition;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn errors_render_their_context() {
        let err = EngineError::InvalidPlay {
            player: PlayerPosition::East,
            card: Card::new(Rank::Nine, Suit::Spades),
            reason: PlayViolation::MustFollowSuit {
                lead_suit: Suit::Hearts,
            },
        };
        assert_eq!(err.to_string(), "invalid play 9♠ by East: must follow ♥");

        let err = EngineError::InvalidBid {
            player: PlayerPosition::North,
            action: BidAction::Pass,
            reason: BidViolation::DealerMustCall,
        };
        assert!(err.to_string().contains("dealer must call"));
    }

    #[test]
    fn state_errors_are_flagged() {
        let err = EngineError::state("calculate_scores", StateViolation::NoTrumpCaller);
        assert!(err.is_state_error());
        assert!(err.to_string().starts_with("invalid game state for calculate_scores"));
    }
}
