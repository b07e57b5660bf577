use blackjack_sim::chart::{self, DEFAULT_CHART_PATH};
use blackjack_sim::write::{write_batch_json, write_history};
use blackjack_sim::{BatchResult, BlackjackSimulator, BlackjackSimulatorConfig, SimulationError};
use clap::Parser;
use log::{error, info};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

/// Plays seeded sessions of blackjack with a random hit/stand policy and charts every bankroll.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON file with a simulator configuration, flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Starting balance of each session
    #[arg(short, long)]
    balance: Option<u32>,
    /// Number of decks in the shoe
    #[arg(short, long)]
    decks: Option<usize>,
    /// Number of independent sessions
    #[arg(short, long)]
    episodes: Option<u32>,
    /// Seed for reproducible runs
    #[arg(short, long)]
    seed: Option<u64>,
    /// Worker threads used to play the sessions
    #[arg(short, long, default_value_t = 1)]
    threads: usize,
    /// Where the SVG chart is written
    #[arg(long, default_value = DEFAULT_CHART_PATH)]
    chart: PathBuf,
    /// Also write the full batch as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,
    /// Also write every transition of every session to this path
    #[arg(long)]
    history: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> Result<BlackjackSimulatorConfig, SimulationError> {
        let mut config = match &self.config {
            Some(path) => BlackjackSimulatorConfig::from_json_file(path)?,
            None => BlackjackSimulatorConfig::default(),
        };
        if let Some(balance) = self.balance {
            config.starting_balance = balance;
        }
        if let Some(decks) = self.decks {
            config.num_decks = decks;
        }
        if let Some(episodes) = self.episodes {
            config.num_episodes = episodes;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

fn run(args: &Args) -> Result<BatchResult, SimulationError> {
    let simulator = BlackjackSimulator::new(args.config()?)?;
    let batch = if args.threads > 1 {
        simulator.run_parallel(args.threads)?
    } else {
        simulator.run()?
    };

    println!("{}", batch.summary);

    chart::save_svg(&args.chart, &batch.trajectories(), batch.summary.stats.as_ref())?;
    info!("chart written to {}", args.chart.display());

    if let Some(path) = &args.json {
        write_batch_json(&batch, BufWriter::new(File::create(path)?))?;
        info!("batch written to {}", path.display());
    }
    if let Some(path) = &args.history {
        write_history(&batch.sessions, BufWriter::new(File::create(path)?))?;
        info!("history written to {}", path.display());
    }
    Ok(batch)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    match run(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
