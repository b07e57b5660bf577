//! Module that focuses on the simulation of a single session of blackjack. In other words,
//! this module provides the functionality needed to play rounds from one shoe with one bankroll
//! until the bankroll is gone or the shoe runs low.

pub mod player;
pub mod strategy;
pub mod table;

pub mod prelude {
    pub use super::{run_session, BlackjackGameSim, SessionEnd, SessionResult, MIN_CARDS};
    pub use crate::game::player::PlayerSim;
    pub use crate::game::strategy::prelude::*;
    pub use crate::game::table::{
        resolve_showdown, BlackjackTableSim, Outcome, RoundRecord, Transition,
    };
    pub use blackjack_lib::{BlackjackGameError, Shoe};
}

pub use prelude::*;
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A session stops once the shoe holds this many cards or fewer.
pub const MIN_CARDS: usize = 26;

/// Why a session stopped playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEnd {
    /// The bankroll reached zero.
    Bankrupt,
    /// Money is left but less than the smallest stake.
    BelowMinimumStake,
    /// The shoe fell to the minimum card count.
    ShoeExhausted,
}

impl Display for SessionEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionEnd::Bankrupt => "bankrupt",
            SessionEnd::BelowMinimumStake => "below minimum stake",
            SessionEnd::ShoeExhausted => "shoe exhausted",
        };
        write!(f, "{}", s)
    }
}

/// The bankroll trajectory and round history of one finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    /// Bankroll before the first round followed by the bankroll after every round.
    pub trajectory: Vec<f64>,
    pub history: Vec<RoundRecord>,
    pub end: SessionEnd,
}

impl SessionResult {
    pub fn starting_balance(&self) -> f64 {
        self.trajectory.first().copied().unwrap_or_default()
    }

    pub fn final_balance(&self) -> f64 {
        self.trajectory.last().copied().unwrap_or_default()
    }

    pub fn net_change(&self) -> f64 {
        self.final_balance() - self.starting_balance()
    }

    pub fn rounds(&self) -> usize {
        self.history.len()
    }

    /// Every transition of the session in order.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.history.iter().flat_map(|round| round.transitions.iter())
    }
}

/// Struct that plays a single session: one shoe, one running count, one bankroll.
/// Rounds are played until the bankroll is gone or the shoe is down to `min_cards`.
pub struct BlackjackGameSim<S: Strategy, R: Rng> {
    table: BlackjackTableSim,
    player: PlayerSim<S>,
    rng: R,
    min_cards: usize,
    trajectory: Vec<f64>,
    history: Vec<RoundRecord>,
}

impl<S: Strategy, R: Rng> BlackjackGameSim<S, R> {
    /// Associated method for building a new session.
    /// `table` owns the shoe the session is dealt from, `player` owns the bankroll and strategy,
    /// and `rng` drives every random choice made by the player's strategy.
    pub fn new(table: BlackjackTableSim, player: PlayerSim<S>, rng: R, min_cards: usize) -> Self {
        let trajectory = vec![player.balance()];
        BlackjackGameSim {
            table,
            player,
            rng,
            min_cards,
            trajectory,
            history: Vec::new(),
        }
    }

    /// Plays rounds until the session ends and returns what happened.
    /// Errors only if the shoe runs dry mid round, which the `min_cards` guard should prevent.
    pub fn run(mut self) -> Result<SessionResult, BlackjackGameError> {
        let end = loop {
            if self.player.balance() <= 0.0 {
                break SessionEnd::Bankrupt;
            }
            if self.table.remaining() <= self.min_cards {
                break SessionEnd::ShoeExhausted;
            }
            if !self.player.continue_play() {
                break SessionEnd::BelowMinimumStake;
            }
            let bet = match self.player.bet(&mut self.rng) {
                Some(bet) => bet,
                None => break SessionEnd::BelowMinimumStake,
            };

            let record = self
                .table
                .play_round(&mut self.player, bet, &mut self.rng)?;
            debug!(
                "round {}: bet {} player {} dealer {} -> {} ({}), balance {}, true count {:.2}",
                self.history.len() + 1,
                record.bet,
                record.player_hand,
                record.dealer_hand,
                record.outcome(),
                record.reward,
                record.balance,
                self.table.count().true_count(self.table.remaining()),
            );

            self.trajectory.push(record.balance);
            self.history.push(record);
        };

        info!(
            "session over after {} rounds ({}) playing {}: {} -> {}, {} player blackjacks, {} cards left, {}",
            self.history.len(),
            end,
            self.player.label(),
            self.trajectory[0],
            self.player.balance(),
            self.table.num_player_blackjacks,
            self.table.remaining(),
            self.table.count(),
        );

        Ok(SessionResult {
            trajectory: self.trajectory,
            history: self.history,
            end,
        })
    }
}

/// Plays one session with the default random policy: a fresh shoe of `num_decks` decks shuffled
/// with `rng`, a bankroll of `starting_balance`, and the default stakes.
pub fn run_session<R: Rng>(
    starting_balance: f64,
    num_decks: usize,
    mut rng: R,
) -> Result<SessionResult, BlackjackGameError> {
    if !(starting_balance > 0.0) {
        return Err(BlackjackGameError::InvalidConfiguration(
            "starting balance must be positive".to_string(),
        ));
    }
    let shoe = Shoe::new(num_decks, &mut rng)?;
    let table = BlackjackTableSim::new(shoe);
    let player = PlayerSim::new(starting_balance, PlayerStrategy::default());
    BlackjackGameSim::new(table, player, rng, MIN_CARDS).run()
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn trajectory_tracks_history() {
        for seed in 0..20 {
            let session = run_session(500.0, 5, ChaCha8Rng::seed_from_u64(seed)).unwrap();
            assert_eq!(session.trajectory.len(), session.history.len() + 1);
            assert_eq!(session.starting_balance(), 500.0);

            let mut balance = 500.0;
            for (i, round) in session.history.iter().enumerate() {
                balance += round.reward;
                assert_eq!(round.balance, balance);
                assert_eq!(session.trajectory[i + 1], balance);
                assert!(round.bet as f64 <= session.trajectory[i]);
            }
        }
    }

    #[test]
    fn session_stops_on_an_exit_condition() {
        for seed in 0..20 {
            let session = run_session(150.0, 5, ChaCha8Rng::seed_from_u64(seed)).unwrap();
            let final_balance = session.final_balance();
            match session.end {
                SessionEnd::Bankrupt => assert!(final_balance <= 0.0),
                SessionEnd::BelowMinimumStake => {
                    assert!(final_balance > 0.0 && final_balance < 25.0)
                }
                SessionEnd::ShoeExhausted => assert!(final_balance > 0.0),
            }
        }
    }

    #[test]
    fn same_seed_same_session() {
        let a = run_session(500.0, 5, ChaCha8Rng::seed_from_u64(2024)).unwrap();
        let b = run_session(500.0, 5, ChaCha8Rng::seed_from_u64(2024)).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn rounds_end_with_a_final_outcome() {
        let session = run_session(500.0, 5, ChaCha8Rng::seed_from_u64(77)).unwrap();
        assert!(!session.history.is_empty());
        for round in &session.history {
            let (last, live) = round.transitions.split_last().unwrap();
            assert_ne!(last.outcome, Outcome::Playing);
            assert_eq!(last.reward, round.reward);
            assert!(live.iter().all(|t| t.outcome == Outcome::Playing
                && t.action == Action::Hit
                && t.reward == 0.0));
        }
    }

    #[test]
    fn shoe_guard_keeps_a_cut() {
        let shoe = Shoe::new(1, &mut ChaCha8Rng::seed_from_u64(4)).unwrap();
        let table = BlackjackTableSim::new(shoe);
        let player = PlayerSim::new(1_000_000.0, PlayerStrategy::default());
        let session = BlackjackGameSim::new(table, player, ChaCha8Rng::seed_from_u64(4), MIN_CARDS)
            .run()
            .unwrap();
        assert_eq!(session.end, SessionEnd::ShoeExhausted);
        let dealt: usize = session
            .history
            .iter()
            .map(|r| r.player_hand.len() + r.dealer_hand.len())
            .sum();
        assert!(52 - dealt <= MIN_CARDS);
    }

    #[test]
    fn balance_below_smallest_stake_plays_nothing() {
        let shoe = Shoe::new(1, &mut ChaCha8Rng::seed_from_u64(8)).unwrap();
        let table = BlackjackTableSim::new(shoe);
        let player = PlayerSim::new(20.0, PlayerStrategy::default());
        let session = BlackjackGameSim::new(table, player, ChaCha8Rng::seed_from_u64(8), MIN_CARDS)
            .run()
            .unwrap();
        assert_eq!(session.end, SessionEnd::BelowMinimumStake);
        assert!(session.history.is_empty());
        assert_eq!(session.trajectory, vec![20.0]);
    }

    #[test]
    fn non_positive_balance_is_rejected() {
        assert!(run_session(0.0, 5, ChaCha8Rng::seed_from_u64(0)).is_err());
        assert!(run_session(100.0, 0, ChaCha8Rng::seed_from_u64(0)).is_err());
    }
}
