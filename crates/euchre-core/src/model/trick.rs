use crate::model::card::{Card, compare_cards};
use crate::model::player::{PlayerPosition, Team};
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trick {
    leader: PlayerPosition,
    plays: Vec<Play>,
    #[serde(default)]
    winner: Option<PlayerPosition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    pub position: PlayerPosition,
    pub card: Card,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl Trick {
    pub fn new(leader: PlayerPosition) -> Self {
        Self {
            leader,
            plays: Vec::with_capacity(4),
            winner: None,
        }
    }

    pub fn leader(&self) -> PlayerPosition {
        self.leader
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn len(&self) -> usize {
        self.plays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    pub fn lead_card(&self) -> Option<Card> {
        self.plays.first().map(|play| play.card)
    }

    /// Lead suit as seen through trump: a led left bower makes trump the lead suit.
    pub fn lead_suit(&self, trump: Suit) -> Option<Suit> {
        self.lead_card().map(|card| card.effective_suit(trump))
    }

    /// Set once the trick has been resolved.
    pub fn winner(&self) -> Option<PlayerPosition> {
        self.winner
    }

    pub fn winning_team(&self) -> Option<Team> {
        self.winner.map(PlayerPosition::team)
    }

    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.plays.iter().map(|play| play.card)
    }

    pub(crate) fn push(&mut self, play: Play) {
        self.plays.push(play);
    }

    /// The play beating every other play, judged against the trick's lead suit.
    pub fn best_play(&self, trump: Suit) -> Option<&Play> {
        let lead_suit = self.lead_suit(trump);
        self.plays
            .iter()
            .max_by(|a, b| compare_cards(a.card, b.card, trump, lead_suit))
    }

    pub(crate) fn resolve(mut self, winner: PlayerPosition) -> Self {
        self.winner = Some(winner);
        self
    }
}
