use crate::game::bidding::{BidAction, BidOutcome, TrumpBid, TrumpSelectionState};
use crate::game::error::{EngineError, StateViolation};
use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::player::{Player, PlayerPosition, Team};
use crate::model::score::{
    Contract, DEFAULT_WINNING_SCORE, HandResult, score_hand, tricks_by_team, winning_team,
};
use crate::model::suit::Suit;
use crate::model::trick::Trick;
use serde::{Deserialize, Serialize};
use std::array;
use tracing::{Level, event};

pub(crate) const HAND_SIZE: usize = 5;
pub(crate) const KITTY_SIZE: usize = 3;
const DEALER_PICKUP_SIZE: usize = HAND_SIZE + 1;

/// Options for starting a game, or a later hand of an ongoing game.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewGameOptions {
    pub model_ids: [String; 4],
    pub dealer: Option<PlayerPosition>,
    pub winning_score: Option<u32>,
    pub existing_game_scores: Option<[u32; 2]>,
    pub hand_number: Option<u32>,
}

impl NewGameOptions {
    pub fn new(model_ids: [&str; 4]) -> Self {
        Self {
            model_ids: model_ids.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_dealer(mut self, dealer: PlayerPosition) -> Self {
        self.dealer = Some(dealer);
        self
    }

    pub fn with_winning_score(mut self, winning_score: u32) -> Self {
        self.winning_score = Some(winning_score);
        self
    }

    pub fn with_game_scores(mut self, scores: [u32; 2]) -> Self {
        self.existing_game_scores = Some(scores);
        self
    }

    pub fn with_hand_number(mut self, hand_number: u32) -> Self {
        self.hand_number = Some(hand_number);
        self
    }
}

/// Trick play under a settled contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayState {
    pub contract: Contract,
    pub turned_up: Card,
    pub ordered_up: bool,
    #[serde(default)]
    pub discard: Option<Card>,
    pub current_trick: Trick,
    pub completed_tricks: im::Vector<Trick>,
}

/// A scored hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandSummary {
    pub contract: Contract,
    pub turned_up: Card,
    pub ordered_up: bool,
    #[serde(default)]
    pub discard: Option<Card>,
    pub completed_tricks: im::Vector<Trick>,
    pub tricks_won: [usize; 2],
    pub points: [u32; 2],
    pub result: HandResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", content = "data", rename_all = "snake_case")]
pub enum GamePhase {
    TrumpSelection(TrumpSelectionState),
    Playing(PlayState),
    HandComplete(HandSummary),
    GameComplete(HandSummary),
}

impl GamePhase {
    pub const fn name(&self) -> &'static str {
        match self {
            GamePhase::TrumpSelection(_) => "trump_selection",
            GamePhase::Playing(_) => "playing",
            GamePhase::HandComplete(_) => "hand_complete",
            GamePhase::GameComplete(_) => "game_complete",
        }
    }
}

/// One immutable snapshot of a game. Transitions return a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) phase: GamePhase,
    pub(crate) players: [Player; 4],
    pub(crate) dealer: PlayerPosition,
    pub(crate) kitty: [Card; KITTY_SIZE],
    pub(crate) game_scores: [u32; 2],
    pub(crate) hand_number: u32,
    pub(crate) winning_score: u32,
}

impl GameState {
    pub fn create_new_game(options: NewGameOptions) -> Self {
        Self::create_new_game_with_rng(options, &mut rand::thread_rng())
    }

    /// Shuffles, deals five cards to each seat starting left of the dealer,
    /// turns up the 21st card and sets the last three aside.
    pub fn create_new_game_with_rng<R: rand::Rng + ?Sized>(
        options: NewGameOptions,
        rng: &mut R,
    ) -> Self {
        let dealer = options.dealer.unwrap_or(PlayerPosition::North);
        let deck = Deck::shuffled(rng);
        let cards = deck.cards();

        let mut hands: [Hand; 4] = array::from_fn(|_| Hand::new());
        for (offset, seat) in PlayerPosition::positions_from(dealer.next())
            .into_iter()
            .enumerate()
        {
            let start = offset * HAND_SIZE;
            hands[seat.index()] = Hand::with_cards(cards[start..start + HAND_SIZE].to_vec());
        }

        let turned_up = cards[4 * HAND_SIZE];
        let kitty = array::from_fn(|i| cards[4 * HAND_SIZE + 1 + i]);
        let model_ids = options.model_ids;
        let players = array::from_fn(|i| {
            let seat = PlayerPosition::LOOP[i];
            Player::new(
                seat,
                model_ids[i].clone(),
                std::mem::take(&mut hands[i]),
            )
        });

        let hand_number = options.hand_number.unwrap_or(1);
        event!(
            target: "euchre_core::lifecycle",
            Level::DEBUG,
            hand_number,
            dealer = %dealer,
            turned_up = %turned_up,
            "dealt new hand"
        );

        Self {
            phase: GamePhase::TrumpSelection(TrumpSelectionState::new(turned_up, dealer)),
            players,
            dealer,
            kitty,
            game_scores: options.existing_game_scores.unwrap_or([0, 0]),
            hand_number,
            winning_score: options.winning_score.unwrap_or(DEFAULT_WINNING_SCORE),
        }
    }

    pub fn phase(&self) -> &GamePhase {
        &self.phase
    }

    pub fn phase_name(&self) -> &'static str {
        self.phase.name()
    }

    pub fn players(&self) -> &[Player; 4] {
        &self.players
    }

    pub fn player(&self, seat: PlayerPosition) -> &Player {
        &self.players[seat.index()]
    }

    pub fn hand(&self, seat: PlayerPosition) -> &Hand {
        &self.players[seat.index()].hand
    }

    pub fn dealer(&self) -> PlayerPosition {
        self.dealer
    }

    pub fn kitty(&self) -> &[Card; KITTY_SIZE] {
        &self.kitty
    }

    pub fn game_scores(&self) -> [u32; 2] {
        self.game_scores
    }

    pub fn hand_number(&self) -> u32 {
        self.hand_number
    }

    pub fn winning_score(&self) -> u32 {
        self.winning_score
    }

    pub fn trump_selection(&self) -> Option<&TrumpSelectionState> {
        match &self.phase {
            GamePhase::TrumpSelection(selection) => Some(selection),
            _ => None,
        }
    }

    pub fn play_state(&self) -> Option<&PlayState> {
        match &self.phase {
            GamePhase::Playing(play) => Some(play),
            _ => None,
        }
    }

    pub fn hand_summary(&self) -> Option<&HandSummary> {
        match &self.phase {
            GamePhase::HandComplete(summary) | GamePhase::GameComplete(summary) => Some(summary),
            _ => None,
        }
    }

    pub fn contract(&self) -> Option<Contract> {
        match &self.phase {
            GamePhase::TrumpSelection(_) => None,
            GamePhase::Playing(play) => Some(play.contract),
            GamePhase::HandComplete(summary) | GamePhase::GameComplete(summary) => {
                Some(summary.contract)
            }
        }
    }

    pub fn trump(&self) -> Option<Suit> {
        self.contract().map(|contract| contract.trump)
    }

    pub fn trump_caller(&self) -> Option<PlayerPosition> {
        self.contract().map(|contract| contract.caller)
    }

    /// The seat playing alone, if any.
    pub fn going_alone(&self) -> Option<PlayerPosition> {
        self.contract()
            .filter(|contract| contract.going_alone)
            .map(|contract| contract.caller)
    }

    pub fn current_trick(&self) -> Option<&Trick> {
        self.play_state().map(|play| &play.current_trick)
    }

    pub fn completed_tricks(&self) -> Option<&im::Vector<Trick>> {
        match &self.phase {
            GamePhase::TrumpSelection(_) => None,
            GamePhase::Playing(play) => Some(&play.completed_tricks),
            GamePhase::HandComplete(summary) | GamePhase::GameComplete(summary) => {
                Some(&summary.completed_tricks)
            }
        }
    }

    /// Tricks taken so far this hand, indexed by team.
    pub fn tricks_won(&self) -> [usize; 2] {
        self.completed_tricks()
            .map(|tricks| tricks_by_team(tricks.iter()))
            .unwrap_or([0, 0])
    }

    /// Points awarded for the current hand; zero until it is scored.
    pub fn scores(&self) -> [u32; 2] {
        self.hand_summary()
            .map(|summary| summary.points)
            .unwrap_or([0, 0])
    }

    pub fn make_trump_bid(
        &self,
        player: PlayerPosition,
        action: BidAction,
        suit: Option<Suit>,
        going_alone: bool,
        reasoning: Option<&str>,
    ) -> Result<GameState, EngineError> {
        let selection = self
            .trump_selection()
            .ok_or_else(|| self.wrong_phase("make_trump_bid", "trump_selection"))?;

        let bid = TrumpBid {
            player,
            action,
            suit,
            going_alone,
            reasoning: reasoning.map(str::to_string),
        };
        let outcome = selection
            .apply(bid)
            .map_err(|reason| EngineError::InvalidBid {
                player,
                action,
                reason,
            })?;

        event!(
            target: "euchre_core::decision",
            Level::DEBUG,
            hand_number = self.hand_number,
            seat = %player,
            action = action.as_str(),
            suit = ?suit,
            going_alone,
            reasoning = reasoning.unwrap_or(""),
            "bid accepted"
        );

        let mut next = self.clone();
        match outcome {
            BidOutcome::Continue(selection) => {
                next.phase = GamePhase::TrumpSelection(selection);
            }
            BidOutcome::TrumpSet {
                contract,
                ordered_up,
            } => {
                let turned_up = selection.turned_up();
                if ordered_up {
                    next.players[self.dealer.index()].hand.add(turned_up);
                }
                let leader = first_active_seat(self.dealer.next(), contract);
                event!(
                    target: "euchre_core::lifecycle",
                    Level::INFO,
                    hand_number = self.hand_number,
                    trump = contract.trump.name(),
                    caller = %contract.caller,
                    going_alone = contract.going_alone,
                    ordered_up,
                    "trump set"
                );
                next.phase = GamePhase::Playing(PlayState {
                    contract,
                    turned_up,
                    ordered_up,
                    discard: None,
                    current_trick: Trick::new(leader),
                    completed_tricks: im::Vector::new(),
                });
            }
        }
        Ok(next)
    }

    /// Dealer drops one card after picking up the ordered-up card.
    pub fn dealer_discard(&self, card: Card) -> Result<GameState, EngineError> {
        const OPERATION: &str = "dealer_discard";
        if self.play_state().is_none() {
            return Err(self.wrong_phase(OPERATION, "playing"));
        }

        let held = self.hand(self.dealer).len();
        if held != DEALER_PICKUP_SIZE {
            return Err(EngineError::state(
                OPERATION,
                StateViolation::DealerCardCount {
                    held,
                    expected: DEALER_PICKUP_SIZE,
                },
            ));
        }

        let mut next = self.clone();
        next.players[self.dealer.index()]
            .hand
            .remove(card)
            .map_err(|err| EngineError::state(OPERATION, err.into()))?;
        if let GamePhase::Playing(play) = &mut next.phase {
            play.discard = Some(card);
        }

        event!(
            target: "euchre_core::decision",
            Level::DEBUG,
            hand_number = self.hand_number,
            seat = %self.dealer,
            card = %card,
            "dealer discarded"
        );
        Ok(next)
    }

    /// Points for a finished set of tricks under this hand's contract.
    pub fn calculate_scores<'a>(
        &self,
        tricks: impl IntoIterator<Item = &'a Trick>,
    ) -> Result<[u32; 2], EngineError> {
        let contract = self
            .contract()
            .ok_or_else(|| EngineError::state("calculate_scores", StateViolation::NoTrumpCaller))?;
        Ok(score_hand(contract, tricks).0)
    }

    pub fn is_game_complete(&self) -> bool {
        matches!(self.phase, GamePhase::GameComplete(_)) || self.winning_team().is_some()
    }

    pub fn winning_team(&self) -> Option<Team> {
        winning_team(self.game_scores, self.winning_score)
    }

    pub fn start_new_hand(&self) -> Result<GameState, EngineError> {
        self.start_new_hand_with_rng(&mut rand::thread_rng())
    }

    /// Deals the next hand with the dealer moved one seat clockwise.
    pub fn start_new_hand_with_rng<R: rand::Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<GameState, EngineError> {
        const OPERATION: &str = "start_new_hand";
        match self.phase {
            GamePhase::HandComplete(_) if !self.is_game_complete() => {}
            GamePhase::HandComplete(_) | GamePhase::GameComplete(_) => {
                return Err(EngineError::state(OPERATION, StateViolation::GameComplete));
            }
            _ => return Err(self.wrong_phase(OPERATION, "hand_complete")),
        }

        let hand_number = self.hand_number.checked_add(1).ok_or_else(|| {
            EngineError::state(
                OPERATION,
                StateViolation::HandNumberExhausted(self.hand_number),
            )
        })?;
        let options = NewGameOptions {
            model_ids: array::from_fn(|i| self.players[i].agent_id.clone()),
            dealer: Some(self.dealer.next()),
            winning_score: Some(self.winning_score),
            existing_game_scores: Some(self.game_scores),
            hand_number: Some(hand_number),
        };
        Ok(Self::create_new_game_with_rng(options, rng))
    }

    pub(crate) fn wrong_phase(&self, operation: &'static str, expected: &'static str) -> EngineError {
        EngineError::state(
            operation,
            StateViolation::WrongPhase {
                expected,
                actual: self.phase.name(),
            },
        )
    }
}

/// First seat at or after `start` that takes part in tricks under `contract`.
pub(crate) fn first_active_seat(start: PlayerPosition, contract: Contract) -> PlayerPosition {
    PlayerPosition::positions_from(start)
        .into_iter()
        .find(|&seat| Some(seat) != contract.sitting_out())
        .unwrap_or(start)
}
