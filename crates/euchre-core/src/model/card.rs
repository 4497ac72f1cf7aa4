use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::cmp::Ordering;
use core::fmt;
use serde::{Deserialize, Serialize};

const RIGHT_BOWER_RANK: u8 = 100;
const LEFT_BOWER_RANK: u8 = 99;
const TRUMP_OFFSET: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub const fn is_right_bower(self, trump: Suit) -> bool {
        matches!(self.rank, Rank::Jack) && self.suit as u8 == trump as u8
    }

    pub const fn is_left_bower(self, trump: Suit) -> bool {
        matches!(self.rank, Rank::Jack) && self.suit as u8 == trump.same_color() as u8
    }

    /// Suit used for following and grouping: both bowers count as trump.
    pub const fn effective_suit(self, trump: Suit) -> Suit {
        if self.is_left_bower(trump) {
            trump
        } else {
            self.suit
        }
    }

    pub const fn is_trump(self, trump: Suit) -> bool {
        self.effective_suit(trump) as u8 == trump as u8
    }

    /// Single scale ranking every card for a given trump suit.
    pub const fn trump_rank(self, trump: Suit) -> u8 {
        if self.is_right_bower(trump) {
            RIGHT_BOWER_RANK
        } else if self.is_left_bower(trump) {
            LEFT_BOWER_RANK
        } else if self.suit as u8 == trump as u8 {
            TRUMP_OFFSET + self.rank.base_rank()
        } else {
            self.rank.base_rank()
        }
    }

    pub const fn follows_suit(self, lead: Card, trump: Suit) -> bool {
        self.effective_suit(trump) as u8 == lead.effective_suit(trump) as u8
    }
}

/// Orders two cards for trick taking. Trump beats everything else; among
/// non-trump cards a card of `lead_suit` beats one that is not. Remaining ties
/// in `trump_rank` fall back to suit order so distinct cards never compare equal.
pub fn compare_cards(a: Card, b: Card, trump: Suit, lead_suit: Option<Suit>) -> Ordering {
    let by_play = match (a.is_trump(trump), b.is_trump(trump)) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => a.trump_rank(trump).cmp(&b.trump_rank(trump)),
        (false, false) => {
            let by_lead = match lead_suit {
                Some(lead) => (a.suit == lead).cmp(&(b.suit == lead)),
                None => Ordering::Equal,
            };
            by_lead.then_with(|| a.trump_rank(trump).cmp(&b.trump_rank(trump)))
        }
    };
    by_play.then_with(|| a.suit.cmp(&b.suit))
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}
