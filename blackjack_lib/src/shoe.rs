use crate::card::{Card, STANDARD_DECK};
use crate::error::BlackjackGameError;
use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;

/// A shuffled multi deck shoe. The top of the shoe is the end of `cards`.
#[derive(Debug, Clone)]
pub struct Shoe {
    cards: Vec<Card>,
}

impl Shoe {
    /// Builds `num_decks` concatenated standard decks and shuffles them with `rng`.
    /// Fails if `num_decks` is zero.
    pub fn new<R: Rng + ?Sized>(num_decks: usize, rng: &mut R) -> Result<Shoe, BlackjackGameError> {
        if num_decks == 0 {
            return Err(BlackjackGameError::InvalidConfiguration(
                "a shoe needs at least one deck".to_string(),
            ));
        }

        let mut cards = Vec::with_capacity(num_decks * STANDARD_DECK.len());
        for _ in 0..num_decks {
            cards.extend(STANDARD_DECK.iter().copied());
        }
        cards.shuffle(rng);
        trace!("shuffled a shoe of {} decks", num_decks);

        Ok(Shoe { cards })
    }

    /// Builds an unshuffled shoe that deals `cards` front to back, i.e. `cards[0]` is dealt first.
    /// Useful for replaying a known sequence of cards.
    pub fn from_deal_order(mut cards: Vec<Card>) -> Shoe {
        cards.reverse();
        Shoe { cards }
    }

    /// Removes and returns the top card of the shoe.
    pub fn draw(&mut self) -> Result<Card, BlackjackGameError> {
        self.cards.pop().ok_or(BlackjackGameError::ShoeEmpty)
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}
