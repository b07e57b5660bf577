pub mod chart;
pub mod game;
pub mod stats;
pub mod write;

pub use game::prelude::*;
use log::{info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use stats::BatchSummary;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use thiserror::Error;

pub mod prelude {
    pub use super::{
        run_batch, BatchResult, BlackjackSimulator,
        BlackjackSimulatorConfig, BlackjackSimulatorConfigBuilder, SimulationError,
    };
    pub use crate::game::prelude::*;
    pub use crate::stats::{BatchSummary, TrajectoryStats};
}

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("game error: {0}")]
    Game(#[from] BlackjackGameError),
    #[error("sending error: {0}")]
    Sending(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Struct for configuring a `BlackjackSimulator`. Every field has a default, so a JSON config file
/// only needs to name the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlackjackSimulatorConfig {
    pub starting_balance: u32,
    pub num_decks: usize,
    pub num_episodes: u32,
    pub stakes: Vec<u32>,
    pub weights: Vec<f64>,
    pub min_cards: usize,
    pub seed: Option<u64>,
}

impl BlackjackSimulatorConfig {
    /// Associated method for returning a new `BlackjackSimulatorConfigBuilder` object. Allows customization of the simulation
    /// i.e. the starting bankroll, the number of decks in the shoe, how many sessions are played and the stake distribution.
    pub fn new() -> BlackjackSimulatorConfigBuilder {
        BlackjackSimulatorConfigBuilder::default()
    }

    /// Loads a configuration from a JSON file, fields missing from the file keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<BlackjackSimulatorConfig, SimulationError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Checks the configuration before any session starts.
    pub fn validate(&self) -> Result<(), BlackjackGameError> {
        if self.starting_balance == 0 {
            return Err(BlackjackGameError::InvalidConfiguration(
                "starting balance must be positive".to_string(),
            ));
        }
        if self.num_decks == 0 {
            return Err(BlackjackGameError::InvalidConfiguration(
                "number of decks must be positive".to_string(),
            ));
        }
        if self.num_episodes == 0 {
            return Err(BlackjackGameError::InvalidConfiguration(
                "number of episodes must be positive".to_string(),
            ));
        }
        let betting_strategy = WeightedBettingStrategy::new(self.stakes.clone(), &self.weights)?;
        if betting_strategy.min_bet() > self.starting_balance {
            return Err(BlackjackGameError::InvalidConfiguration(format!(
                "smallest stake {} exceeds the starting balance {}",
                betting_strategy.min_bet(),
                self.starting_balance
            )));
        }
        if self.min_cards >= self.num_decks * 52 {
            warn!(
                "a shoe of {} cards never exceeds the minimum of {}, no rounds will be played",
                self.num_decks * 52,
                self.min_cards
            );
        }
        Ok(())
    }
}

impl Default for BlackjackSimulatorConfig {
    /// Returns the standard configuration: 150 starting balance, a five deck shoe, one session.
    fn default() -> Self {
        BlackjackSimulatorConfig::new().build()
    }
}

/// Struct to implement builder pattern for `BlackjackSimulatorConfig`
#[derive(Debug, Clone, Default)]
pub struct BlackjackSimulatorConfigBuilder {
    starting_balance: Option<u32>,
    num_decks: Option<usize>,
    num_episodes: Option<u32>,
    stakes: Option<Vec<u32>>,
    weights: Option<Vec<f64>>,
    min_cards: Option<usize>,
    seed: Option<u64>,
}

impl BlackjackSimulatorConfigBuilder {
    /// Method for changing the starting bankroll of every session.
    pub fn starting_balance(&mut self, balance: u32) -> &mut Self {
        self.starting_balance = Some(balance);
        self
    }

    /// Method for choosing the number of decks in each shoe
    pub fn num_decks(&mut self, decks: usize) -> &mut Self {
        self.num_decks = Some(decks);
        self
    }

    /// Method for setting the number of independent sessions played
    pub fn num_episodes(&mut self, episodes: u32) -> &mut Self {
        self.num_episodes = Some(episodes);
        self
    }

    /// Method for setting the stake options and their weights
    pub fn stakes(&mut self, stakes: Vec<u32>, weights: Vec<f64>) -> &mut Self {
        self.stakes = Some(stakes);
        self.weights = Some(weights);
        self
    }

    /// Method for setting the card count at which a session stops dealing
    pub fn min_cards(&mut self, min_cards: usize) -> &mut Self {
        self.min_cards = Some(min_cards);
        self
    }

    /// Method for seeding the simulation, making every session reproducible
    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = Some(seed);
        self
    }

    /// Method for building a `BlackjackSimulatorConfig` object from the given builder.
    pub fn build(&mut self) -> BlackjackSimulatorConfig {
        BlackjackSimulatorConfig {
            starting_balance: self.starting_balance.unwrap_or(150),
            num_decks: self.num_decks.unwrap_or(5),
            num_episodes: self.num_episodes.unwrap_or(1),
            stakes: self.stakes.take().unwrap_or_else(|| DEFAULT_STAKES.to_vec()),
            weights: self.weights.take().unwrap_or_else(|| DEFAULT_WEIGHTS.to_vec()),
            min_cards: self.min_cards.unwrap_or(MIN_CARDS),
            seed: self.seed,
        }
    }
}

/// The sessions of a batch in episode order, plus their summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub summary: BatchSummary,
    pub sessions: Vec<SessionResult>,
}

impl BatchResult {
    pub fn new(sessions: Vec<SessionResult>) -> Self {
        let summary = BatchSummary::from_sessions(&sessions);
        BatchResult { summary, sessions }
    }

    /// One bankroll trajectory per session, what the chart consumes.
    pub fn trajectories(&self) -> Vec<&[f64]> {
        self.sessions
            .iter()
            .map(|session| session.trajectory.as_slice())
            .collect()
    }
}

/// Runs independent sessions for a validated configuration, either one after the other or
/// spread over worker threads.
#[derive(Debug, Clone)]
pub struct BlackjackSimulator {
    config: BlackjackSimulatorConfig,
}

impl BlackjackSimulator {
    /// Fails fast with `InvalidConfiguration` before any session is played.
    pub fn new(config: BlackjackSimulatorConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(BlackjackSimulator { config })
    }

    pub fn config(&self) -> &BlackjackSimulatorConfig {
        &self.config
    }

    /// Plays every session in order on the current thread.
    pub fn run(&self) -> Result<BatchResult, SimulationError> {
        info!(
            "running {} sessions with {} decks and a balance of {}",
            self.config.num_episodes, self.config.num_decks, self.config.starting_balance
        );
        let sessions = (0..self.config.num_episodes as usize)
            .map(|id| self.run_single_simulation(id))
            .collect::<Result<Vec<SessionResult>, BlackjackGameError>>()?;
        Ok(BatchResult::new(sessions))
    }

    /// Plays the sessions on `num_threads` worker threads. Each worker sends its finished sessions
    /// over a channel tagged with their episode id, so the result is ordered exactly like `run`.
    pub fn run_parallel(&self, num_threads: usize) -> Result<BatchResult, SimulationError> {
        if num_threads == 0 {
            return Err(BlackjackGameError::InvalidConfiguration(
                "at least one thread is required".to_string(),
            )
            .into());
        }
        let num_episodes = self.config.num_episodes as usize;
        let num_threads = num_threads.min(num_episodes);
        info!(
            "running {} sessions on {} threads",
            num_episodes, num_threads
        );

        let (sender, receiver) = mpsc::channel::<(usize, Result<SessionResult, BlackjackGameError>)>();
        let mut handles = vec![];
        for worker in 0..num_threads {
            let sender = sender.clone();
            let simulator = self.clone();
            let handle = thread::spawn(move || -> Result<(), SimulationError> {
                for id in (worker..num_episodes).step_by(num_threads) {
                    let result = simulator.run_single_simulation(id);
                    let failed = result.is_err();
                    sender
                        .send((id, result))
                        .map_err(|e| SimulationError::Sending(e.to_string()))?;
                    if failed {
                        break;
                    }
                }
                Ok(())
            });
            handles.push(handle);
        }
        // Only the workers hold senders now, so the receiver ends when they finish.
        drop(sender);

        let mut sessions: Vec<Option<SessionResult>> = vec![None; num_episodes];
        for (id, result) in receiver {
            sessions[id] = Some(result?);
        }

        for (i, handle) in handles.into_iter().enumerate() {
            handle
                .join()
                .map_err(|_| SimulationError::Sending(format!("worker #{} panicked", i)))??;
        }

        let sessions = sessions
            .into_iter()
            .enumerate()
            .map(|(id, session)| {
                session.ok_or_else(|| SimulationError::Sending(format!("session #{} never reported", id)))
            })
            .collect::<Result<Vec<SessionResult>, SimulationError>>()?;
        Ok(BatchResult::new(sessions))
    }

    /// Plays session `id` from a fresh shoe and bankroll.
    pub fn run_single_simulation(&self, id: usize) -> Result<SessionResult, BlackjackGameError> {
        let mut rng = self.session_rng(id);
        let betting_strategy =
            WeightedBettingStrategy::new(self.config.stakes.clone(), &self.config.weights)?;
        let strategy = PlayerStrategy::new(RandomDecisionStrategy, betting_strategy);
        let player = PlayerSim::new(self.config.starting_balance as f64, strategy);
        let shoe = Shoe::new(self.config.num_decks, &mut rng)?;
        let table = BlackjackTableSim::new(shoe);
        BlackjackGameSim::new(table, player, rng, self.config.min_cards).run()
    }

    /// Seeded configurations give every session its own stream of the same generator, so a
    /// session's result does not depend on which thread plays it or in what order.
    fn session_rng(&self, id: usize) -> ChaCha8Rng {
        match self.config.seed {
            Some(seed) => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(id as u64);
                rng
            }
            None => ChaCha8Rng::from_entropy(),
        }
    }
}

/// Runs `num_episodes` independent sessions of the default policy and returns their results.
pub fn run_batch(
    starting_balance: u32,
    num_decks: usize,
    num_episodes: u32,
    seed: Option<u64>,
) -> Result<BatchResult, SimulationError> {
    let mut builder = BlackjackSimulatorConfig::new();
    builder
        .starting_balance(starting_balance)
        .num_decks(num_decks)
        .num_episodes(num_episodes);
    if let Some(seed) = seed {
        builder.seed(seed);
    }
    BlackjackSimulator::new(builder.build())?.run()
}
