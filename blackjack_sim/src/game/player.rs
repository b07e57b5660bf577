use crate::game::strategy::{Action, Strategy, TableState};
use blackjack_lib::{Card, Hand};
use rand::Rng;

/// Struct for a simulated player, owns the bankroll and the hand of the current round.
pub struct PlayerSim<S: Strategy> {
    hand: Hand,
    balance: f64,
    strategy: S,
}

impl<S: Strategy> PlayerSim<S> {
    /// Associated function to create a new `PlayerSim` struct.
    pub fn new(starting_balance: f64, strategy: S) -> PlayerSim<S> {
        PlayerSim {
            hand: Hand::new(),
            balance: starting_balance,
            strategy,
        }
    }

    /// Method for determining whether the player can afford another hand
    pub fn continue_play(&self) -> bool {
        self.balance > 0.0 && self.balance >= self.strategy.min_bet() as f64
    }

    /// Getter method for the players current balance.
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Asks the strategy for a stake, `None` if nothing is affordable.
    pub fn bet<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<u32> {
        self.strategy.bet(self.balance, rng)
    }

    pub fn receive_card(&mut self, card: Card) {
        self.hand.receive_card(card);
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn hand_value(&self) -> u8 {
        self.hand.value()
    }

    pub fn busted(&self) -> bool {
        self.hand.busted()
    }

    /// Method for returning a playing option given the state of the table
    pub fn decide_option<R: Rng + ?Sized>(&mut self, decision_state: &TableState, rng: &mut R) -> Action {
        self.strategy.decide_option(decision_state, rng)
    }

    /// Applies the net reward of a resolved round to the balance.
    pub fn settle(&mut self, reward: f64) {
        self.balance += reward;
    }

    /// Method to get a string that describes the players strategy
    pub fn label(&self) -> String {
        self.strategy.label()
    }

    /// Discards the hand of the finished round.
    pub fn reset(&mut self) {
        self.hand.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::strategy::PlayerStrategy;
    use blackjack_lib::{Rank, Suit};

    #[test]
    fn continue_play_needs_the_smallest_stake() {
        let mut player = PlayerSim::new(30.0, PlayerStrategy::default());
        assert!(player.continue_play());
        player.settle(-10.0);
        assert!(!player.continue_play());
        player.settle(-20.0);
        assert_eq!(player.balance(), 0.0);
        assert!(!player.continue_play());
    }

    #[test]
    fn reset_discards_hand() {
        let mut player = PlayerSim::new(100.0, PlayerStrategy::default());
        player.receive_card(Card::new(Rank::Nine, Suit::Hearts));
        player.receive_card(Card::new(Rank::Nine, Suit::Clubs));
        assert_eq!(player.hand_value(), 18);
        player.reset();
        assert!(player.hand().is_empty());
        assert_eq!(player.balance(), 100.0);
    }
}
