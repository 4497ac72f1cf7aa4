#![deny(warnings)]
pub mod game;
pub mod model;

pub use game::bidding::{BidAction, BiddingRound, TrumpBid, TrumpSelectionState};
pub use game::error::{BidViolation, EngineError, PlayViolation, StateViolation};
pub use game::play::determine_trick_winner;
pub use game::state::{GamePhase, GameState, HandSummary, NewGameOptions, PlayState};
pub use model::card::{Card, compare_cards};
pub use model::player::{PlayerPosition, Team};
pub use model::rank::Rank;
pub use model::suit::Suit;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "euchre-core"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "euchre-core");
        assert!(!AppInfo::version().is_empty());
    }
}
