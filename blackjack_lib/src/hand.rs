use crate::card::Card;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Computes the best blackjack value of `cards`. Aces count 11 until the total exceeds 21,
/// then they are demoted to 1 one at a time. The result may exceed 21 once no ace is left to demote.
pub fn hand_value(cards: &[Card]) -> u8 {
    let mut value: u32 = 0;
    let mut soft_aces = 0;
    for card in cards {
        value += card.val() as u32;
        if card.rank.is_ace() {
            soft_aces += 1;
        }
    }

    while value > 21 && soft_aces > 0 {
        value -= 10;
        soft_aces -= 1;
    }

    u8::try_from(value).unwrap_or(u8::MAX)
}

/// The cards held by one party for the current round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Hand {
        Hand { cards: Vec::new() }
    }

    pub fn receive_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn value(&self) -> u8 {
        hand_value(&self.cards)
    }

    pub fn busted(&self) -> bool {
        self.value() > 21
    }

    /// The first card dealt, for the dealer this is the face up card.
    pub fn first(&self) -> Option<&Card> {
        self.cards.first()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }
}

impl Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cards = self
            .cards
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<String>>()
            .join(" ");
        write!(f, "[{}] ({})", cards, self.value())
    }
}
