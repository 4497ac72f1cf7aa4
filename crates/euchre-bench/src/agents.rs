//! Seat agents that propose bids, discards and plays to the arena runner.
//!
//! Agents only propose. The runner submits each proposal to the engine and
//! falls back to a fixed choice when the engine rejects it.

use euchre_core::{BidAction, BiddingRound, Card, GameState, PlayerPosition, Suit};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng, rngs::StdRng};
use thiserror::Error;

use crate::config::{AgentConfig, AgentKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidChoice {
    pub action: BidAction,
    pub suit: Option<Suit>,
    pub going_alone: bool,
    pub reasoning: Option<String>,
}

impl BidChoice {
    pub fn pass(reasoning: &str) -> Self {
        Self {
            action: BidAction::Pass,
            suit: None,
            going_alone: false,
            reasoning: Some(reasoning.to_string()),
        }
    }

    pub fn order_up(going_alone: bool, reasoning: &str) -> Self {
        Self {
            action: BidAction::OrderUp,
            suit: None,
            going_alone,
            reasoning: Some(reasoning.to_string()),
        }
    }

    pub fn call(suit: Suit, going_alone: bool, reasoning: &str) -> Self {
        Self {
            action: BidAction::CallTrump,
            suit: Some(suit),
            going_alone,
            reasoning: Some(reasoning.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayChoice {
    pub card: Card,
    pub reasoning: Option<String>,
}

/// Decision maker for one seat.
///
/// Each method sees the full snapshot but must only rely on what `seat` may
/// know. Returning `None` counts as a rejected proposal.
pub trait SeatAgent {
    fn name(&self) -> &str;

    fn choose_bid(&mut self, state: &GameState, seat: PlayerPosition) -> BidChoice;

    fn choose_discard(&mut self, state: &GameState, seat: PlayerPosition) -> Option<Card>;

    fn choose_play(&mut self, state: &GameState, seat: PlayerPosition) -> Option<PlayChoice>;
}

/// Lowest card in `hand` by trump-relative rank. Used by agents and by the
/// runner's discard fallback.
pub fn lowest_card(hand: &[Card], trump: Suit) -> Option<Card> {
    hand.iter().copied().min_by_key(|card| card.trump_rank(trump))
}

/// Never volunteers a contract; calls the first open suit when stuck.
pub struct FirstLegalAgent {
    name: String,
}

impl FirstLegalAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl SeatAgent for FirstLegalAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_bid(&mut self, state: &GameState, _seat: PlayerPosition) -> BidChoice {
        match state.trump_selection() {
            Some(selection) if selection.dealer_must_call() => selection
                .callable_suits()
                .next()
                .map(|suit| BidChoice::call(suit, false, "stuck dealer names first open suit"))
                .unwrap_or_else(|| BidChoice::pass("no open suit")),
            _ => BidChoice::pass("first legal option"),
        }
    }

    fn choose_discard(&mut self, state: &GameState, seat: PlayerPosition) -> Option<Card> {
        lowest_card(state.hand(seat).cards(), state.trump()?)
    }

    fn choose_play(&mut self, state: &GameState, seat: PlayerPosition) -> Option<PlayChoice> {
        state
            .valid_cards_for_play(seat)
            .first()
            .map(|&card| PlayChoice {
                card,
                reasoning: Some("first legal card".to_string()),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomOptions {
    pub seed: Option<u64>,
    /// Chance of taking a contract when not forced to.
    pub aggression: f64,
    /// Chance of going alone once a contract is taken.
    pub alone_rate: f64,
    /// Chance of proposing an arbitrary, possibly illegal, move.
    pub wild_rate: f64,
}

impl Default for RandomOptions {
    fn default() -> Self {
        Self {
            seed: None,
            aggression: 0.3,
            alone_rate: 0.05,
            wild_rate: 0.0,
        }
    }
}

impl RandomOptions {
    fn from_params(name: &str, params: &serde_yaml::Value) -> Result<Self, AgentError> {
        let mut options = Self::default();
        if params.is_null() {
            return Ok(options);
        }

        let mapping = params
            .as_mapping()
            .ok_or_else(|| AgentError::InvalidParam {
                name: name.to_string(),
                message: "expected mapping for random params".to_string(),
            })?;

        for (key, value) in mapping {
            match key.as_str() {
                Some("seed") => {
                    options.seed = Some(value.as_u64().ok_or_else(|| AgentError::InvalidParam {
                        name: name.to_string(),
                        message: "seed must be a non-negative integer".to_string(),
                    })?);
                }
                Some(field @ ("aggression" | "alone_rate" | "wild_rate")) => {
                    let rate = probability(name, field, value)?;
                    match field {
                        "aggression" => options.aggression = rate,
                        "alone_rate" => options.alone_rate = rate,
                        _ => options.wild_rate = rate,
                    }
                }
                other => {
                    return Err(AgentError::InvalidParam {
                        name: name.to_string(),
                        message: format!("unknown parameter {other:?}"),
                    });
                }
            }
        }
        Ok(options)
    }
}

fn probability(name: &str, field: &str, value: &serde_yaml::Value) -> Result<f64, AgentError> {
    value
        .as_f64()
        .filter(|rate| (0.0..=1.0).contains(rate))
        .ok_or_else(|| AgentError::InvalidParam {
            name: name.to_string(),
            message: format!("{field} must be a number between 0 and 1"),
        })
}

/// Picks uniformly among legal options, with tunable appetite for contracts.
pub struct RandomAgent {
    name: String,
    options: RandomOptions,
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(name: impl Into<String>, options: RandomOptions, fallback_seed: u64) -> Self {
        let seed = options.seed.unwrap_or(fallback_seed);
        Self {
            name: name.into(),
            options,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn goes_alone(&mut self) -> bool {
        self.rng.gen_bool(self.options.alone_rate)
    }

    fn goes_wild(&mut self) -> bool {
        self.rng.gen_bool(self.options.wild_rate)
    }
}

impl SeatAgent for RandomAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_bid(&mut self, state: &GameState, _seat: PlayerPosition) -> BidChoice {
        let Some(selection) = state.trump_selection() else {
            return BidChoice::pass("not bidding");
        };

        if self.goes_wild() {
            let suit = selection.turned_up().suit;
            return BidChoice::call(suit, false, "wild call");
        }

        match selection.round() {
            BiddingRound::First => {
                if self.rng.gen_bool(self.options.aggression) {
                    let alone = self.goes_alone();
                    BidChoice::order_up(alone, "random order up")
                } else {
                    BidChoice::pass("random pass")
                }
            }
            BiddingRound::Second => {
                let forced = selection.dealer_must_call();
                if !forced && !self.rng.gen_bool(self.options.aggression) {
                    return BidChoice::pass("random pass");
                }
                let suits: Vec<Suit> = selection.callable_suits().collect();
                match suits.choose(&mut self.rng) {
                    Some(&suit) => {
                        let alone = self.goes_alone();
                        BidChoice::call(suit, alone, "random call")
                    }
                    None => BidChoice::pass("no open suit"),
                }
            }
        }
    }

    fn choose_discard(&mut self, state: &GameState, seat: PlayerPosition) -> Option<Card> {
        state.hand(seat).cards().choose(&mut self.rng).copied()
    }

    fn choose_play(&mut self, state: &GameState, seat: PlayerPosition) -> Option<PlayChoice> {
        let (pool, reasoning) = if self.goes_wild() {
            (state.hand(seat).cards().to_vec(), "wild card")
        } else {
            (state.valid_cards_for_play(seat), "random legal card")
        };
        pool.choose(&mut self.rng).map(|&card| PlayChoice {
            card,
            reasoning: Some(reasoning.to_string()),
        })
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid parameter for agent '{name}': {message}")]
    InvalidParam { name: String, message: String },
}

/// Builds the agent for one config entry. `fallback_seed` seeds random agents
/// that do not pin their own seed.
pub fn build_agent(
    config: &AgentConfig,
    fallback_seed: u64,
) -> Result<Box<dyn SeatAgent>, AgentError> {
    match config.kind {
        AgentKind::FirstLegal => Ok(Box::new(FirstLegalAgent::new(config.name.clone()))),
        AgentKind::Random => {
            let options = RandomOptions::from_params(&config.name, &config.params)?;
            Ok(Box::new(RandomAgent::new(
                config.name.clone(),
                options,
                fallback_seed,
            )))
        }
    }
}
