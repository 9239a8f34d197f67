use anyhow::Result;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

mod replay;

#[derive(Parser)]
#[command(name = "presence", about = "Presence liveness challenge tooling", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay recorded landmark frames through an in-process session.
    Replay(replay::ReplayArgs),
    /// Sample a randomized gesture task list.
    Tasks {
        /// Number of distinct gestures to sample (1–7).
        #[arg(long, default_value_t = 3)]
        count: usize,
        /// RNG seed for a reproducible list.
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Seeded RNG when a seed is given, OS entropy otherwise.
pub(crate) fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Replay(args) => replay::run(args),
        Command::Tasks { count, seed } => {
            let mut rng = rng_from(seed);
            let tasks = presence_core::random_tasks(&mut rng, count)?;
            for task in &tasks {
                println!("{task}");
            }
            Ok(())
        }
    }
}
