//! Plain-text briefings of a snapshot for an external decision maker.
//!
//! Nothing here affects the rules; it only renders what a seat is allowed to see.

use crate::game::bidding::{BidAction, TrumpBid};
use crate::game::state::{GamePhase, GameState};
use crate::model::card::Card;
use crate::model::player::PlayerPosition;
use crate::model::trick::Trick;

pub fn format_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(Card::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_bid(bid: &TrumpBid) -> String {
    let mut line = format!("{}: {}", bid.player, bid.action);
    if let Some(suit) = bid.suit {
        line.push(' ');
        line.push_str(suit.name());
    }
    if bid.going_alone && bid.action != BidAction::Pass {
        line.push_str(" (alone)");
    }
    line
}

fn format_trick(trick: &Trick) -> String {
    if trick.is_empty() {
        return format!("{} to lead", trick.leader());
    }
    let plays = trick
        .plays()
        .iter()
        .map(|play| format!("{} {}", play.position, play.card))
        .collect::<Vec<_>>()
        .join(", ");
    match trick.winner() {
        Some(winner) => format!("{plays} -> won by {winner}"),
        None => plays,
    }
}

/// Bidding view for `seat`: turned-up card, round, history and the options open to it.
pub fn format_trump_selection_for_agent(state: &GameState, seat: PlayerPosition) -> Option<String> {
    let selection = state.trump_selection()?;
    let mut out = format!("You are {seat}; dealer is {}.\n", selection.dealer());
    out.push_str(&format!(
        "Your hand: {}\n",
        format_cards(state.hand(seat).cards())
    ));
    out.push_str(&format!("Turned-up card: {}\n", selection.turned_up()));
    out.push_str(&format!("Bidding round: {}\n", selection.round().number()));

    let history: Vec<String> = selection.bids().map(format_bid).collect();
    if history.is_empty() {
        out.push_str("No bids yet.\n");
    } else {
        out.push_str(&format!("Bids so far: {}\n", history.join("; ")));
    }

    if selection.current_bidder() != seat {
        out.push_str(&format!("Waiting for {} to bid.\n", selection.current_bidder()));
        return Some(out);
    }

    match selection.round().number() {
        1 => out.push_str(&format!(
            "Options: order_up ({}) or pass.\n",
            selection.turned_up().suit.name()
        )),
        _ => {
            let suits = selection
                .callable_suits()
                .map(|suit| suit.name())
                .collect::<Vec<_>>()
                .join(", ");
            if selection.dealer_must_call() {
                out.push_str(&format!(
                    "Options: call_trump with one of {suits}; you may not pass.\n"
                ));
            } else {
                out.push_str(&format!(
                    "Options: call_trump with one of {suits}, or pass.\n"
                ));
            }
        }
    }
    Some(out)
}

/// Whose move it is during trick play, as seen from `seat`.
fn format_turn(state: &GameState, seat: PlayerPosition) -> String {
    let dealer = state.dealer();
    if state.awaiting_discard() {
        return if seat == dealer {
            "Your turn: discard one of your 6 cards before play begins.\n".to_string()
        } else {
            format!("Waiting for {dealer} (dealer) to discard.\n")
        };
    }
    match state.next_player() {
        Ok(next) if next == seat => format!(
            "Your turn. Legal cards: {}\n",
            format_cards(&state.valid_cards_for_play(seat))
        ),
        Ok(next) => format!("Waiting for {next}.\n"),
        Err(_) => String::new(),
    }
}

/// Full briefing for `seat` in any phase.
pub fn format_game_state_for_agent(state: &GameState, seat: PlayerPosition) -> String {
    if let Some(bidding) = format_trump_selection_for_agent(state, seat) {
        return bidding;
    }

    let player = state.player(seat);
    let scores = state.game_scores();
    let mut out = format!(
        "Hand {} | You are {seat} ({}); dealer is {}.\n",
        state.hand_number(),
        player.team,
        state.dealer()
    );
    out.push_str(&format!(
        "Game score: North/South {} - East/West {} (playing to {}).\n",
        scores[0],
        scores[1],
        state.winning_score()
    ));

    if let Some(contract) = state.contract() {
        out.push_str(&format!(
            "Trump: {} called by {}",
            contract.trump.name(),
            contract.caller
        ));
        if let Some(out_seat) = contract.sitting_out() {
            out.push_str(&format!(", going alone ({out_seat} sits out)"));
        }
        out.push_str(".\n");
    }

    let tricks = state.tricks_won();
    out.push_str(&format!(
        "Tricks this hand: North/South {} - East/West {}.\n",
        tricks[0], tricks[1]
    ));
    if let Some(completed) = state.completed_tricks() {
        for (index, trick) in completed.iter().enumerate() {
            out.push_str(&format!("  Trick {}: {}\n", index + 1, format_trick(trick)));
        }
    }

    match state.phase() {
        GamePhase::Playing(play) => {
            out.push_str(&format!(
                "Current trick: {}\n",
                format_trick(&play.current_trick)
            ));
            out.push_str(&format!(
                "Your hand: {}\n",
                format_cards(state.hand(seat).cards())
            ));
            out.push_str(&format_turn(state, seat));
        }
        GamePhase::HandComplete(summary) | GamePhase::GameComplete(summary) => {
            out.push_str(&format!(
                "Hand result: {:?}, points North/South {} - East/West {}.\n",
                summary.result, summary.points[0], summary.points[1]
            ));
            if let Some(team) = state.winning_team() {
                out.push_str(&format!("{team} wins the game.\n"));
            }
        }
        GamePhase::TrumpSelection(_) => {}
    }
    out
}
