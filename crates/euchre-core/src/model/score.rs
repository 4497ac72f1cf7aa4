use crate::model::player::{PlayerPosition, Team};
use crate::model::suit::Suit;
use crate::model::trick::Trick;
use serde::{Deserialize, Serialize};

pub const TRICKS_PER_HAND: usize = 5;
pub const DEFAULT_WINNING_SCORE: u32 = 10;

/// Who named trump, which suit, and whether the caller's partner sits out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub trump: Suit,
    pub caller: PlayerPosition,
    pub going_alone: bool,
}

impl Contract {
    pub const fn makers(self) -> Team {
        self.caller.team()
    }

    pub const fn sitting_out(self) -> Option<PlayerPosition> {
        if self.going_alone {
            Some(self.caller.partner())
        } else {
            None
        }
    }

    /// Plays needed to finish a trick under this contract.
    pub const fn plays_per_trick(self) -> usize {
        if self.going_alone { 3 } else { 4 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandResult {
    Euchre,
    Made,
    March,
    LonerMarch,
}

impl HandResult {
    pub const fn points(self) -> u32 {
        match self {
            HandResult::Euchre => 2,
            HandResult::Made => 1,
            HandResult::March => 2,
            HandResult::LonerMarch => 4,
        }
    }

    pub fn classify(makers_tricks: usize, going_alone: bool) -> Self {
        match makers_tricks {
            0..=2 => HandResult::Euchre,
            3 | 4 => HandResult::Made,
            _ if going_alone => HandResult::LonerMarch,
            _ => HandResult::March,
        }
    }
}

pub fn tricks_by_team<'a>(tricks: impl IntoIterator<Item = &'a Trick>) -> [usize; 2] {
    let mut counts = [0usize; 2];
    for team in tricks.into_iter().filter_map(Trick::winning_team) {
        counts[team.index()] += 1;
    }
    counts
}

/// Points each team earns for a finished hand, indexed by team.
pub fn score_hand<'a>(
    contract: Contract,
    tricks: impl IntoIterator<Item = &'a Trick>,
) -> ([u32; 2], HandResult) {
    let counts = tricks_by_team(tricks);
    let makers = contract.makers();
    let result = HandResult::classify(counts[makers.index()], contract.going_alone);
    let scoring_team = match result {
        HandResult::Euchre => makers.opponent(),
        _ => makers,
    };
    let mut points = [0u32; 2];
    points[scoring_team.index()] = result.points();
    (points, result)
}

/// First team to reach `winning_score`. A tie on both sides names no one.
pub fn winning_team(game_scores: [u32; 2], winning_score: u32) -> Option<Team> {
    let reached: Vec<Team> = Team::BOTH
        .into_iter()
        .filter(|team| game_scores[team.index()] >= winning_score)
        .collect();
    match reached.as_slice() {
        [team] => Some(*team),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{Contract, HandResult, score_hand, winning_team};
    use crate::model::player::{PlayerPosition, Team};
    use crate::model::suit::Suit;
    use crate::model::trick::Trick;
    use PlayerPosition::{East, North, South, West};

    fn won_by(winners: &[PlayerPosition]) -> Vec<Trick> {
        winners
            .iter()
            .map(|&seat| Trick::new(seat).resolve(seat))
            .collect()
    }

    fn contract(caller: PlayerPosition, going_alone: bool) -> Contract {
        Contract {
            trump: Suit::Spades,
            caller,
            going_alone,
        }
    }

    #[test]
    fn three_tricks_score_one() {
        let tricks = won_by(&[North, South, North, East, West]);
        let (points, result) = score_hand(contract(North, false), &tricks);
        assert_eq!(points, [1, 0]);
        assert_eq!(result, HandResult::Made);
    }

    #[test]
    fn march_scores_two() {
        let tricks = won_by(&[North, South, North, South, North]);
        assert_eq!(score_hand(contract(South, false), &tricks).0, [2, 0]);
    }

    #[test]
    fn loner_march_scores_four() {
        let tricks = won_by(&[North; 5]);
        let (points, result) = score_hand(contract(North, true), &tricks);
        assert_eq!(points, [4, 0]);
        assert_eq!(result, HandResult::LonerMarch);
    }

    #[test]
    fn loner_making_four_tricks_scores_one() {
        let tricks = won_by(&[East, East, East, East, North]);
        assert_eq!(score_hand(contract(East, true), &tricks).0, [0, 1]);
    }

    #[test]
    fn euchre_awards_defenders_two() {
        let tricks = won_by(&[North, East, West, East, South]);
        assert_eq!(score_hand(contract(North, false), &tricks).0, [0, 2]);

        let tricks = won_by(&[North, North, South, East, West]);
        assert_eq!(score_hand(contract(West, false), &tricks).0, [2, 0]);
    }

    #[test]
    fn winner_requires_reaching_target() {
        assert_eq!(winning_team([9, 4], 10), None);
        assert_eq!(winning_team([10, 4], 10), Some(Team::NorthSouth));
        assert_eq!(winning_team([3, 12], 10), Some(Team::EastWest));
        assert_eq!(winning_team([10, 10], 10), None);
    }
}
