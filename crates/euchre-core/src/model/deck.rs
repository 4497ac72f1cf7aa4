use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::seq::SliceRandom;

pub const DECK_SIZE: usize = 24;

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::ORDERED.iter().copied() {
                cards.push(Card::new(rank, suit));
            }
        }
        Self { cards }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.shuffle_in_place(rng);
        deck
    }

    /// Fisher-Yates over the whole deck.
    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::{DECK_SIZE, Deck};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn seeded(seed: u64) -> Deck {
        Deck::shuffled(&mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn standard_deck_has_24_unique_cards() {
        let deck = Deck::standard();
        let unique: HashSet<_> = deck.cards().iter().copied().collect();
        assert_eq!(deck.cards().len(), DECK_SIZE);
        assert_eq!(unique.len(), DECK_SIZE);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let standard: HashSet<_> = Deck::standard().cards().iter().copied().collect();
        let shuffled = seeded(7);
        let reshuffled: HashSet<_> = shuffled.cards().iter().copied().collect();
        assert_eq!(standard, reshuffled);
        assert_ne!(Deck::standard().cards(), shuffled.cards());
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let deck_a = seeded(42);
        let deck_b = seeded(42);
        assert_eq!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn shuffle_with_different_seeds_differs() {
        let deck_a = seeded(1);
        let deck_b = seeded(2);
        assert_ne!(deck_a.cards(), deck_b.cards());
    }
}
