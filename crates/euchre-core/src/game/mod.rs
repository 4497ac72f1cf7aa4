pub mod bidding;
pub mod briefing;
pub mod error;
pub mod play;
pub mod serialization;
pub mod state;
