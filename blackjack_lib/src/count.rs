use crate::card::{Card, Rank};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt::Display;

lazy_static! {
    /// Hi-Lo tags: low cards +1, neutral cards 0, tens and aces -1.
    static ref HI_LO: HashMap<Rank, i32> = {
        let mut lookup_table = HashMap::new();
        for rank in [Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six] {
            lookup_table.insert(rank, 1);
        }
        for rank in [Rank::Seven, Rank::Eight, Rank::Nine] {
            lookup_table.insert(rank, 0);
        }
        for rank in [Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace] {
            lookup_table.insert(rank, -1);
        }
        lookup_table
    };
}

/// Hi-Lo running count. Purely informational, nothing in the simulation bets or plays on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningCount {
    running_count: i32,
    total_cards_counted: u32,
}

impl RunningCount {
    pub fn new() -> RunningCount {
        RunningCount::default()
    }

    /// The Hi-Lo tag of a single rank.
    pub fn weight(rank: Rank) -> i32 {
        HI_LO[&rank]
    }

    /// Counts a card that has just become visible.
    pub fn update(&mut self, card: &Card) {
        self.running_count += RunningCount::weight(card.rank);
        self.total_cards_counted += 1;
    }

    pub fn running_count(&self) -> i32 {
        self.running_count
    }

    pub fn total_cards_counted(&self) -> u32 {
        self.total_cards_counted
    }

    /// Running count per remaining deck, with the remaining decks floored at half a deck.
    pub fn true_count(&self, remaining_cards: usize) -> f64 {
        let remaining_decks = f64::max(remaining_cards as f64 / 52.0, 0.5);
        self.running_count as f64 / remaining_decks
    }
}

impl Display for RunningCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "running count: {} ({} cards counted)",
            self.running_count, self.total_cards_counted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Suit;

    #[test]
    fn mixed_sequence_nets_zero() {
        let mut count = RunningCount::new();
        for rank in [Rank::Two, Rank::Ten, Rank::Seven, Rank::Ace, Rank::Five] {
            count.update(&Card::new(rank, Suit::Diamonds));
        }
        assert_eq!(count.running_count(), 0);
        assert_eq!(count.total_cards_counted(), 5);
    }

    #[test]
    fn a_full_deck_balances() {
        let mut count = RunningCount::new();
        for card in crate::card::STANDARD_DECK.iter() {
            count.update(card);
        }
        assert_eq!(count.running_count(), 0);
    }

    #[test]
    fn weights() {
        assert_eq!(RunningCount::weight(Rank::Six), 1);
        assert_eq!(RunningCount::weight(Rank::Nine), 0);
        assert_eq!(RunningCount::weight(Rank::Queen), -1);
        assert_eq!(RunningCount::weight(Rank::Ace), -1);
    }

    #[test]
    fn true_count_divides_by_remaining_decks() {
        let mut count = RunningCount::new();
        for _ in 0..4 {
            count.update(&Card::new(Rank::Three, Suit::Spades));
        }
        assert_eq!(count.true_count(104), 2.0);
        // fewer than half a deck left is treated as half a deck
        assert_eq!(count.true_count(10), 8.0);
    }
}
