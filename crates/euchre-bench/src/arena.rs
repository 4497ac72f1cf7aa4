use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use euchre_core::model::score::HandResult;
use euchre_core::{BidAction, EngineError, GameState, NewGameOptions, PlayerPosition, Suit, Team};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::agents::{AgentError, SeatAgent, build_agent, lowest_card};
use crate::config::{ArenaConfig, ResolvedOutputs};

/// Drives complete games between four seat agents.
pub struct ArenaRunner {
    config: ArenaConfig,
    outputs: ResolvedOutputs,
}

/// Summary details returned after a run.
#[derive(Debug)]
pub struct RunSummary {
    pub games_played: usize,
    pub hands_played: usize,
    pub rows_written: usize,
    pub fallbacks: u32,
    pub team_wins: [usize; 2],
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
}

impl ArenaRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: ArenaConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        if config.agents.len() != 4 {
            return Err(RunnerError::SeatCount {
                found: config.agents.len(),
            });
        }
        Ok(Self { config, outputs })
    }

    /// Plays every configured game, streaming one JSONL row per hand.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut seats = self.build_seats(&mut rng)?;
        let names: [String; 4] = std::array::from_fn(|i| seats[i].name().to_string());
        let mut tally = ArenaTally::default();

        for game_index in 0..self.config.games.count {
            let options = NewGameOptions {
                model_ids: names.clone(),
                ..NewGameOptions::default()
            }
            .with_winning_score(self.config.games.winning_score);
            let mut state = GameState::create_new_game_with_rng(options, &mut rng);

            loop {
                let mut fallbacks = 0u32;
                state = self.play_hand(game_index, state, &mut seats, &mut fallbacks)?;
                let row = HandLogRow::from_state(&self.config.run_id, game_index, &state, fallbacks)?;
                tally.record_hand(&row);
                serde_json::to_writer(&mut writer, &row)?;
                writer.write_all(b"\n")?;

                event!(
                    target: "euchre_bench::hand",
                    Level::INFO,
                    run_id = %self.config.run_id,
                    game_index = game_index as u32,
                    hand_number = row.hand_number,
                    caller = %row.caller,
                    trump = row.trump.name(),
                    north_south = row.game_scores[0],
                    east_west = row.game_scores[1],
                    fallbacks
                );

                if let Some(team) = state.winning_team() {
                    tally.record_game(team);
                    break;
                }
                state = state.start_new_hand_with_rng(&mut rng)?;
            }
        }

        writer.flush()?;
        fs::write(
            &self.outputs.summary_md,
            tally.render_markdown(&self.config.run_id, &names),
        )?;

        Ok(RunSummary {
            games_played: tally.games,
            hands_played: tally.hands,
            rows_written: tally.hands,
            fallbacks: tally.fallbacks,
            team_wins: tally.teams.map(|team| team.games_won),
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
        })
    }

    fn build_seats(&self, rng: &mut StdRng) -> Result<Vec<Box<dyn SeatAgent>>, RunnerError> {
        self.config
            .agents
            .iter()
            .map(|agent| build_agent(agent, rng.next_u64()).map_err(RunnerError::from))
            .collect()
    }

    fn play_hand(
        &self,
        game_index: usize,
        mut state: GameState,
        seats: &mut [Box<dyn SeatAgent>],
        fallbacks: &mut u32,
    ) -> Result<GameState, RunnerError> {
        while let Some(selection) = state.trump_selection() {
            let seat = selection.current_bidder();
            let agent = &mut seats[seat.index()];
            let choice = agent.choose_bid(&state, seat);
            state = match state.make_trump_bid(
                seat,
                choice.action,
                choice.suit,
                choice.going_alone,
                choice.reasoning.as_deref(),
            ) {
                Ok(next) => next,
                Err(err) => {
                    *fallbacks += 1;
                    self.warn_fallback(game_index, &state, seat, agent.name(), "bid", &err);
                    fallback_bid(&state, seat)?
                }
            };
        }

        while let Some(play) = state.play_state() {
            if state.awaiting_discard() {
                let dealer = state.dealer();
                let trump = play.contract.trump;
                let agent = &mut seats[dealer.index()];
                let attempt = match agent.choose_discard(&state, dealer) {
                    Some(card) => state.dealer_discard(card).map_err(|err| err.to_string()),
                    None => Err("no discard proposed".to_string()),
                };
                state = match attempt {
                    Ok(next) => next,
                    Err(reason) => {
                        *fallbacks += 1;
                        self.warn_fallback(game_index, &state, dealer, agent.name(), "discard", &reason);
                        let card = lowest_card(state.hand(dealer).cards(), trump)
                            .ok_or_else(|| RunnerError::game("dealer holds no cards to discard"))?;
                        state.dealer_discard(card)?
                    }
                };
                continue;
            }

            let seat = state.next_player()?;
            let agent = &mut seats[seat.index()];
            let attempt = match agent.choose_play(&state, seat) {
                Some(choice) => state
                    .play_card(seat, choice.card, choice.reasoning.as_deref())
                    .map_err(|err| err.to_string()),
                None => Err("no card proposed".to_string()),
            };
            state = match attempt {
                Ok(next) => next,
                Err(reason) => {
                    *fallbacks += 1;
                    self.warn_fallback(game_index, &state, seat, agent.name(), "play", &reason);
                    let card = state
                        .valid_cards_for_play(seat)
                        .first()
                        .copied()
                        .ok_or_else(|| RunnerError::game(format!("{seat} has no legal card")))?;
                    state.play_card(seat, card, Some("fallback: first legal card"))?
                }
            };
        }

        Ok(state)
    }

    fn warn_fallback(
        &self,
        game_index: usize,
        state: &GameState,
        seat: PlayerPosition,
        agent: &str,
        decision: &'static str,
        reason: &dyn std::fmt::Display,
    ) {
        event!(
            target: "euchre_bench::fallback",
            Level::WARN,
            run_id = %self.config.run_id,
            game_index = game_index as u32,
            hand_number = state.hand_number(),
            seat = %seat,
            agent,
            decision,
            reason = %reason,
            "proposal rejected, applying fallback"
        );
    }
}

/// Stuck dealer names the first open suit; everyone else passes.
fn fallback_bid(state: &GameState, seat: PlayerPosition) -> Result<GameState, RunnerError> {
    let forced_suit = state
        .trump_selection()
        .filter(|selection| selection.dealer_must_call())
        .and_then(|selection| selection.callable_suits().next());
    let next = match forced_suit {
        Some(suit) => state.make_trump_bid(
            seat,
            BidAction::CallTrump,
            Some(suit),
            false,
            Some("fallback: first open suit"),
        )?,
        None => state.make_trump_bid(seat, BidAction::Pass, None, false, Some("fallback: pass"))?,
    };
    Ok(next)
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct HandLogRow {
    pub run_id: String,
    pub game_index: usize,
    pub hand_number: u32,
    pub dealer: PlayerPosition,
    pub trump: Suit,
    pub caller: PlayerPosition,
    pub alone: bool,
    pub ordered_up: bool,
    pub tricks: [usize; 2],
    pub hand_score: [u32; 2],
    pub result: HandResult,
    pub game_scores: [u32; 2],
    pub fallbacks: u32,
}

impl HandLogRow {
    fn from_state(
        run_id: &str,
        game_index: usize,
        state: &GameState,
        fallbacks: u32,
    ) -> Result<Self, RunnerError> {
        let summary = state
            .hand_summary()
            .ok_or_else(|| RunnerError::game(format!("hand ended in phase {}", state.phase_name())))?;
        Ok(Self {
            run_id: run_id.to_string(),
            game_index,
            hand_number: state.hand_number(),
            dealer: state.dealer(),
            trump: summary.contract.trump,
            caller: summary.contract.caller,
            alone: summary.contract.going_alone,
            ordered_up: summary.ordered_up,
            tricks: summary.tricks_won,
            hand_score: summary.points,
            result: summary.result,
            game_scores: state.game_scores(),
            fallbacks,
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct TeamTally {
    games_won: usize,
    points: u32,
    contracts: usize,
    made: usize,
    marches: usize,
    loner_marches: usize,
    euchred: usize,
}

#[derive(Debug, Default)]
struct ArenaTally {
    games: usize,
    hands: usize,
    fallbacks: u32,
    teams: [TeamTally; 2],
}

impl ArenaTally {
    fn record_hand(&mut self, row: &HandLogRow) {
        self.hands += 1;
        self.fallbacks += row.fallbacks;
        for team in Team::BOTH {
            self.teams[team.index()].points += row.hand_score[team.index()];
        }
        let makers = &mut self.teams[row.caller.team().index()];
        makers.contracts += 1;
        match row.result {
            HandResult::Made => makers.made += 1,
            HandResult::March => makers.marches += 1,
            HandResult::LonerMarch => makers.loner_marches += 1,
            HandResult::Euchre => makers.euchred += 1,
        }
    }

    fn record_game(&mut self, winner: Team) {
        self.games += 1;
        self.teams[winner.index()].games_won += 1;
    }

    fn render_markdown(&self, run_id: &str, names: &[String; 4]) -> String {
        let mut out = format!("# Euchre arena: {run_id}\n\n");
        out.push_str(&format!(
            "{} games, {} hands, {} fallbacks applied.\n\n",
            self.games, self.hands, self.fallbacks
        ));

        out.push_str("## Seats\n\n| Seat | Agent | Team |\n| --- | --- | --- |\n");
        for seat in PlayerPosition::LOOP {
            out.push_str(&format!(
                "| {seat} | {} | {} |\n",
                names[seat.index()],
                seat.team()
            ));
        }

        out.push_str("\n## Teams\n\n");
        out.push_str(
            "| Team | Games won | Points | Contracts | Made | Marches | Loner marches | Euchred |\n",
        );
        out.push_str("| --- | ---: | ---: | ---: | ---: | ---: | ---: | ---: |\n");
        for team in Team::BOTH {
            let t = &self.teams[team.index()];
            out.push_str(&format!(
                "| {team} | {} | {} | {} | {} | {} | {} | {} |\n",
                t.games_won, t.points, t.contracts, t.made, t.marches, t.loner_marches, t.euchred
            ));
        }
        out
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("engine rejected a transition: {0}")]
    Engine(#[from] EngineError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("game execution failed: {message}")]
    Game { message: String },
    #[error("configuration requires exactly 4 agents but found {found}")]
    SeatCount { found: usize },
}

impl RunnerError {
    fn game(message: impl Into<String>) -> Self {
        RunnerError::Game {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(caller: PlayerPosition, result: HandResult, hand_score: [u32; 2]) -> HandLogRow {
        HandLogRow {
            run_id: "t".to_string(),
            game_index: 0,
            hand_number: 1,
            dealer: PlayerPosition::North,
            trump: Suit::Spades,
            caller,
            alone: result == HandResult::LonerMarch,
            ordered_up: false,
            tricks: [0, 0],
            hand_score,
            result,
            game_scores: hand_score,
            fallbacks: 1,
        }
    }

    #[test]
    fn tally_attributes_results_to_makers() {
        let mut tally = ArenaTally::default();
        tally.record_hand(&row(PlayerPosition::East, HandResult::Euchre, [2, 0]));
        tally.record_hand(&row(PlayerPosition::South, HandResult::LonerMarch, [4, 0]));
        tally.record_hand(&row(PlayerPosition::West, HandResult::March, [0, 2]));
        tally.record_game(Team::NorthSouth);

        let ns = tally.teams[Team::NorthSouth.index()];
        let ew = tally.teams[Team::EastWest.index()];
        assert_eq!(ns.points, 6);
        assert_eq!(ns.loner_marches, 1);
        assert_eq!(ns.games_won, 1);
        assert_eq!(ew.euchred, 1);
        assert_eq!(ew.marches, 1);
        assert_eq!(ew.contracts, 2);
        assert_eq!(tally.fallbacks, 3);
    }

    #[test]
    fn markdown_lists_seats_and_teams() {
        let mut tally = ArenaTally::default();
        tally.record_hand(&row(PlayerPosition::North, HandResult::Made, [1, 0]));
        let names = ["n", "e", "s", "w"].map(String::from);
        let text = tally.render_markdown("demo", &names);
        assert!(text.starts_with("# Euchre arena: demo"));
        assert!(text.contains("| North | n | North/South |"));
        assert!(text.contains("| West | w | East/West |"));
        assert!(text.contains("| North/South | 0 | 1 | 1 | 1 | 0 | 0 | 0 |\n"));
        assert!(text.contains("0 games, 1 hands, 1 fallbacks applied.\n\n## Seats"));
    }

    #[test]
    fn fallback_bid_passes_or_names_open_suit() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut state = GameState::create_new_game_with_rng(
            NewGameOptions::new(["a", "b", "c", "d"]),
            &mut rng,
        );
        for _ in 0..7 {
            let seat = state.trump_selection().unwrap().current_bidder();
            state = fallback_bid(&state, seat).unwrap();
        }
        let turned = state.trump_selection().unwrap().turned_up();
        let dealer = state.dealer();
        let state = fallback_bid(&state, dealer).unwrap();
        let trump = state.trump().unwrap();
        assert_ne!(trump, turned.suit);
        assert_eq!(state.trump_caller(), Some(dealer));
        assert!(state.play_state().is_some_and(|play| !play.ordered_up));
    }
}
