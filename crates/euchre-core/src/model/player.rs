use crate::model::hand::Hand;
use core::fmt;
use serde::{Deserialize, Serialize};

const SEATS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PlayerPosition {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl PlayerPosition {
    /// Clockwise seating order.
    pub const LOOP: [PlayerPosition; 4] = [
        PlayerPosition::North,
        PlayerPosition::East,
        PlayerPosition::South,
        PlayerPosition::West,
    ];

    /// Maps any offset onto the ring, wrapping negative values.
    pub const fn from_offset(offset: isize) -> Self {
        let wrapped = offset.rem_euclid(SEATS as isize) as usize;
        Self::LOOP[wrapped]
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn next(self) -> PlayerPosition {
        Self::from_offset(self.index() as isize + 1)
    }

    pub const fn partner(self) -> PlayerPosition {
        Self::from_offset(self.index() as isize + 2)
    }

    pub const fn team(self) -> Team {
        if self.index() % 2 == 0 {
            Team::NorthSouth
        } else {
            Team::EastWest
        }
    }

    /// All four seats clockwise, beginning with `start`.
    pub fn positions_from(start: PlayerPosition) -> [PlayerPosition; 4] {
        std::array::from_fn(|offset| Self::from_offset((start.index() + offset) as isize))
    }
}

impl fmt::Display for PlayerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlayerPosition::North => "North",
            PlayerPosition::East => "East",
            PlayerPosition::South => "South",
            PlayerPosition::West => "West",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Team {
    NorthSouth = 0,
    EastWest = 1,
}

impl Team {
    pub const BOTH: [Team; 2] = [Team::NorthSouth, Team::EastWest];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn opponent(self) -> Team {
        match self {
            Team::NorthSouth => Team::EastWest,
            Team::EastWest => Team::NorthSouth,
        }
    }
}

impl From<Team> for u8 {
    fn from(team: Team) -> Self {
        team as u8
    }
}

impl TryFrom<u8> for Team {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Team::NorthSouth),
            1 => Ok(Team::EastWest),
            other => Err(format!("team index {other} out of range")),
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::NorthSouth => f.write_str("North/South"),
            Team::EastWest => f.write_str("East/West"),
        }
    }
}

/// A seat's participant: the agent sitting there and the cards it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub position: PlayerPosition,
    pub team: Team,
    pub hand: Hand,
    pub agent_id: String,
}

impl Player {
    pub fn new(position: PlayerPosition, agent_id: impl Into<String>, hand: Hand) -> Self {
        Self {
            position,
            team: position.team(),
            hand,
            agent_id: agent_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PlayerPosition, Team};

    #[test]
    fn next_wraps_around() {
        assert_eq!(PlayerPosition::West.next(), PlayerPosition::North);
    }

    #[test]
    fn partner_sits_across() {
        assert_eq!(PlayerPosition::North.partner(), PlayerPosition::South);
        assert_eq!(PlayerPosition::West.partner(), PlayerPosition::East);
    }

    #[test]
    fn negative_offsets_wrap() {
        assert_eq!(PlayerPosition::from_offset(-1), PlayerPosition::West);
        assert_eq!(PlayerPosition::from_offset(-6), PlayerPosition::South);
        assert_eq!(PlayerPosition::from_offset(9), PlayerPosition::East);
    }

    #[test]
    fn positions_from_runs_clockwise() {
        assert_eq!(
            PlayerPosition::positions_from(PlayerPosition::South),
            [
                PlayerPosition::South,
                PlayerPosition::West,
                PlayerPosition::North,
                PlayerPosition::East,
            ]
        );
    }

    #[test]
    fn team_follows_seat_parity() {
        assert_eq!(PlayerPosition::North.team(), Team::NorthSouth);
        assert_eq!(PlayerPosition::South.team(), Team::NorthSouth);
        assert_eq!(PlayerPosition::East.team(), Team::EastWest);
        assert_eq!(PlayerPosition::West.team().opponent(), Team::NorthSouth);
    }

    #[test]
    fn index_roundtrip() {
        for (i, seat) in PlayerPosition::LOOP.iter().enumerate() {
            assert_eq!(PlayerPosition::from_offset(i as isize), *seat);
            assert_eq!(seat.index(), i);
        }
    }
}
