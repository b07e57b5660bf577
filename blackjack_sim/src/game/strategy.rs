//! Betting and playing policies. Neither consults the running count, the count only travels
//! along inside `TableState` so it ends up in the history log.

use blackjack_lib::BlackjackGameError;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod prelude {
    pub use super::{
        Action, BettingStrategy, DecisionStrategy, PlayerStrategy, RandomDecisionStrategy,
        Strategy, TableState, WeightedBettingStrategy, DEFAULT_STAKES, DEFAULT_WEIGHTS,
    };
}

/// Stake options offered by the default betting strategy.
pub const DEFAULT_STAKES: [u32; 4] = [25, 50, 75, 100];
/// Probability weights of `DEFAULT_STAKES`, favouring small stakes.
pub const DEFAULT_WEIGHTS: [f64; 4] = [0.65, 0.20, 0.10, 0.05];

/// A playing option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Hit,
    Stand,
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Hit => write!(f, "hit"),
            Action::Stand => write!(f, "stand"),
        }
    }
}

/// Snapshot of the table at the moment a decision is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableState {
    pub player_value: u8,
    /// Value of the dealer's face up card only.
    pub dealer_up_value: u8,
    pub running_count: i32,
}

impl TableState {
    pub fn new(player_value: u8, dealer_up_value: u8, running_count: i32) -> TableState {
        TableState {
            player_value,
            dealer_up_value,
            running_count,
        }
    }
}

impl Display for TableState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[Player Sum: {}, Dealer Hand: {}, Running Count: {}]",
            self.player_value, self.dealer_up_value, self.running_count
        )
    }
}

/// Trait for a generic betting strategy.
pub trait BettingStrategy {
    /// Returns the stake for the next hand, or `None` if no stake is affordable with `balance`.
    fn bet<R: Rng + ?Sized>(&self, balance: f64, rng: &mut R) -> Option<u32>;
    /// The smallest stake this strategy can return.
    fn min_bet(&self) -> u32;
}

/// Trait for a generic decision strategy, takes the state of the table and returns how to play the hand.
pub trait DecisionStrategy {
    fn decide_option<R: Rng + ?Sized>(&mut self, decision_state: &TableState, rng: &mut R) -> Action;
}

/// Draws stakes from a fixed discrete distribution, resampling until the stake fits the balance.
#[derive(Debug, Clone)]
pub struct WeightedBettingStrategy {
    stakes: Vec<u32>,
    distribution: WeightedIndex<f64>,
    min_bet: u32,
}

impl WeightedBettingStrategy {
    /// Fails if `stakes` is empty, contains a zero stake, or `weights` does not hold one positive
    /// finite weight per stake.
    pub fn new(stakes: Vec<u32>, weights: &[f64]) -> Result<WeightedBettingStrategy, BlackjackGameError> {
        if stakes.is_empty() {
            return Err(BlackjackGameError::InvalidConfiguration(
                "at least one stake is required".to_string(),
            ));
        }
        if stakes.len() != weights.len() {
            return Err(BlackjackGameError::InvalidConfiguration(format!(
                "{} stakes but {} weights",
                stakes.len(),
                weights.len()
            )));
        }
        if stakes.contains(&0) {
            return Err(BlackjackGameError::InvalidConfiguration(
                "stakes must be positive".to_string(),
            ));
        }
        // Every stake needs a chance of being drawn, otherwise rejection sampling could spin forever.
        if weights.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err(BlackjackGameError::InvalidConfiguration(
                "weights must be positive and finite".to_string(),
            ));
        }

        let distribution = WeightedIndex::new(weights)
            .map_err(|e| BlackjackGameError::InvalidConfiguration(e.to_string()))?;
        let min_bet = stakes.iter().copied().min().unwrap_or_default();

        Ok(WeightedBettingStrategy {
            stakes,
            distribution,
            min_bet,
        })
    }

}

impl Default for WeightedBettingStrategy {
    fn default() -> Self {
        WeightedBettingStrategy {
            stakes: DEFAULT_STAKES.to_vec(),
            distribution: WeightedIndex::new(DEFAULT_WEIGHTS).expect("default weights are valid"),
            min_bet: DEFAULT_STAKES[0],
        }
    }
}

impl BettingStrategy for WeightedBettingStrategy {
    fn bet<R: Rng + ?Sized>(&self, balance: f64, rng: &mut R) -> Option<u32> {
        if balance < self.min_bet as f64 {
            return None;
        }
        loop {
            let stake = self.stakes[self.distribution.sample(rng)];
            if stake as f64 <= balance {
                return Some(stake);
            }
        }
    }

    fn min_bet(&self) -> u32 {
        self.min_bet
    }
}

/// Hits or stands with equal probability regardless of the table.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomDecisionStrategy;

impl DecisionStrategy for RandomDecisionStrategy {
    fn decide_option<R: Rng + ?Sized>(&mut self, _decision_state: &TableState, rng: &mut R) -> Action {
        if rng.gen_bool(0.5) {
            Action::Hit
        } else {
            Action::Stand
        }
    }
}

/// Everything a simulated player needs to bet and play a hand.
pub trait Strategy {
    fn bet<R: Rng + ?Sized>(&self, balance: f64, rng: &mut R) -> Option<u32>;
    fn min_bet(&self) -> u32;
    fn decide_option<R: Rng + ?Sized>(&mut self, decision_state: &TableState, rng: &mut R) -> Action;
    fn label(&self) -> String;
}

/// Composes a decision strategy with a betting strategy.
#[derive(Debug, Clone)]
pub struct PlayerStrategy<D, B>
where
    D: DecisionStrategy,
    B: BettingStrategy,
{
    decision_strategy: D,
    betting_strategy: B,
    label: String,
}

impl<D, B> PlayerStrategy<D, B>
where
    D: DecisionStrategy,
    B: BettingStrategy,
{
    pub fn new(decision_strategy: D, betting_strategy: B) -> Self {
        PlayerStrategy {
            decision_strategy,
            betting_strategy,
            label: String::from("random hit/stand, weighted stakes"),
        }
    }
}

impl Default for PlayerStrategy<RandomDecisionStrategy, WeightedBettingStrategy> {
    fn default() -> Self {
        PlayerStrategy::new(RandomDecisionStrategy, WeightedBettingStrategy::default())
    }
}

impl<D, B> Strategy for PlayerStrategy<D, B>
where
    D: DecisionStrategy,
    B: BettingStrategy,
{
    fn bet<R: Rng + ?Sized>(&self, balance: f64, rng: &mut R) -> Option<u32> {
        self.betting_strategy.bet(balance, rng)
    }

    fn min_bet(&self) -> u32 {
        self.betting_strategy.min_bet()
    }

    fn decide_option<R: Rng + ?Sized>(&mut self, decision_state: &TableState, rng: &mut R) -> Action {
        self.decision_strategy.decide_option(decision_state, rng)
    }

    fn label(&self) -> String {
        self.label.clone()
    }
}
