use crate::game::{Outcome, SessionEnd, SessionResult};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Spread of the net bankroll changes across a batch of trajectories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryStats {
    /// Final minus starting balance, one per trajectory in input order.
    pub net_changes: Vec<f64>,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl TrajectoryStats {
    /// Returns `None` when no trajectory holds a balance.
    pub fn from_trajectories<T: AsRef<[f64]>>(trajectories: &[T]) -> Option<TrajectoryStats> {
        let net_changes = trajectories
            .iter()
            .filter_map(|trajectory| {
                let trajectory = trajectory.as_ref();
                Some(trajectory.last()? - trajectory.first()?)
            })
            .collect::<Vec<f64>>();
        if net_changes.is_empty() {
            return None;
        }

        let mut sorted = net_changes.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let n = sorted.len();
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let variance = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;

        Some(TrajectoryStats {
            min: sorted[0],
            max: sorted[n - 1],
            median,
            std_dev: variance.sqrt(),
            net_changes,
        })
    }
}

/// Struct for keeping track of the results of a batch of sessions
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub sessions: u32,
    pub rounds: u32,
    pub wins: u32,
    pub pushes: u32,
    pub losses: u32,
    pub player_blackjacks: u32,
    pub bankrupt_sessions: u32,
    pub winnings: f64,
    pub stats: Option<TrajectoryStats>,
}

impl BatchSummary {
    /// Tallies the rounds of every session and computes the net change statistics.
    pub fn from_sessions(sessions: &[SessionResult]) -> BatchSummary {
        let mut summary = BatchSummary {
            sessions: sessions.len() as u32,
            ..Default::default()
        };
        for session in sessions {
            if session.end == SessionEnd::Bankrupt {
                summary.bankrupt_sessions += 1;
            }
            summary.winnings += session.net_change();
            for round in &session.history {
                summary.rounds += 1;
                match round.outcome() {
                    Outcome::Win => summary.wins += 1,
                    Outcome::Draw => summary.pushes += 1,
                    Outcome::Lose => summary.losses += 1,
                    Outcome::Playing => {}
                }
                if round.player_blackjack {
                    summary.player_blackjacks += 1;
                }
            }
        }
        let trajectories = sessions
            .iter()
            .map(|session| session.trajectory.as_slice())
            .collect::<Vec<&[f64]>>();
        summary.stats = TrajectoryStats::from_trajectories(&trajectories);
        summary
    }
}

impl Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const WIDTH: usize = 80;
        const TEXT_WIDTH: usize = "number of player blackjacks".len() + 20;
        const NUM_WIDTH: usize = WIDTH - TEXT_WIDTH;
        writeln!(f, "{:-^WIDTH$}", "summary")?;
        write!(
            f,
            "{:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n",
            "sessions played",
            self.sessions,
            "rounds played",
            self.rounds,
            "hands won",
            self.wins,
            "hands pushed",
            self.pushes,
            "hands lost",
            self.losses,
            "number of player blackjacks",
            self.player_blackjacks,
            "bankrupt sessions",
            self.bankrupt_sessions,
            "winnings",
            self.winnings,
        )?;
        if let Some(stats) = &self.stats {
            write!(
                f,
                "{:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
                {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
                {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
                {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n",
                "most loss",
                stats.min,
                "most profit",
                stats.max,
                "median profit",
                stats.median,
                "std dev",
                stats.std_dev,
            )?;
        }
        write!(f, "{}", "-".repeat(WIDTH))
    }
}
