//! Headless Fireline runner.
//!
//! This binary runs the game without graphics, controlled via JSON on stdin/stdout.
//! Designed for scripted play, CI testing, and determinism checks.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p fireline_headless
//!
//! # Play a scenario file interactively
//! cargo run -p fireline_headless -- run --scenario scenarios/creek.ron
//!
//! # Play unattended games and print their final statistics
//! cargo run -p fireline_headless -- simulate --scenario level2 --count 10
//!
//! # Verify determinism
//! cargo run -p fireline_headless -- verify --scenario level3 --seed 12345 --runs 5
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information
//!
//! See the protocol module for command/response format.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fireline_headless::{
    batch::{run_batch, verify_determinism, BatchConfig, DEFAULT_MAX_TURNS},
    runner::{HeadlessConfig, HeadlessRunner},
    scenario::Scenario,
};

#[derive(Parser)]
#[command(name = "fireline_headless")]
#[command(about = "Headless Fireline runner for scripted play and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single interactive game
    Run {
        /// Built-in level (level1..level3) or scenario file
        #[arg(short, long, default_value = "level1")]
        scenario: String,

        /// Override the scenario's seed
        #[arg(long)]
        seed: Option<u64>,

        /// Output state after every turn
        #[arg(long)]
        auto_state: bool,
    },

    /// Play unattended games and print final statistics
    Simulate {
        /// Built-in level (level1..level3) or scenario file
        #[arg(short, long, default_value = "level1")]
        scenario: String,

        /// Number of games to run
        #[arg(short, long, default_value = "1")]
        count: u32,

        /// Starting random seed (defaults to the scenario's)
        #[arg(long)]
        seed: Option<u64>,

        /// Stop a game after this many turns
        #[arg(long, default_value_t = DEFAULT_MAX_TURNS)]
        max_turns: u32,
    },

    /// Verify determinism by running same seed multiple times
    Verify {
        /// Built-in level (level1..level3) or scenario file
        #[arg(short, long, default_value = "level1")]
        scenario: String,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,

        /// Stop each run after this many turns
        #[arg(long, default_value_t = DEFAULT_MAX_TURNS)]
        max_turns: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Some(Commands::Run {
            scenario,
            seed,
            auto_state,
        }) => {
            cmd_run(&scenario, seed, auto_state);
        }
        Some(Commands::Simulate {
            scenario,
            count,
            seed,
            max_turns,
        }) => {
            cmd_simulate(&scenario, count, seed, max_turns);
        }
        Some(Commands::Verify {
            scenario,
            seed,
            runs,
            max_turns,
        }) => {
            cmd_verify(&scenario, seed, runs, max_turns);
        }
        None => {
            // Default: interactive mode
            cmd_run("level1", None, false);
        }
    }
}

/// Load a scenario or exit with a message.
fn load_scenario(name: &str) -> Scenario {
    match Scenario::resolve(name) {
        Ok(scenario) => scenario,
        Err(e) => {
            tracing::error!(error = %e, scenario = name, "Failed to load scenario");
            eprintln!("Failed to load scenario '{name}': {e}");
            std::process::exit(1);
        }
    }
}

/// Run a single interactive game
fn cmd_run(scenario: &str, seed: Option<u64>, auto_state: bool) {
    tracing::info!(scenario, "Starting interactive session");

    let mut scenario = load_scenario(scenario);
    if let Some(seed) = seed {
        scenario = scenario.with_seed(seed);
    }

    let config = HeadlessConfig {
        auto_state_output: auto_state,
    };

    let mut runner = match HeadlessRunner::with_config(&scenario, config) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("Failed to set up '{}': {e}", scenario.name);
            std::process::exit(1);
        }
    };

    if let Err(e) = runner.run_stdio() {
        tracing::error!(error = %e, "Protocol IO failed");
        std::process::exit(1);
    }
}

/// Play unattended games and print one JSON summary per game
fn cmd_simulate(scenario: &str, count: u32, seed: Option<u64>, max_turns: u32) {
    let scenario = load_scenario(scenario);
    let config = BatchConfig {
        game_count: count,
        seed_start: seed.unwrap_or(scenario.seed),
        max_turns,
    };

    tracing::info!(
        scenario = %scenario.name,
        count,
        seed = config.seed_start,
        max_turns,
        "Starting unattended games"
    );

    let results = match run_batch(&scenario, &config) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Simulation failed: {e}");
            std::process::exit(1);
        }
    };

    for summary in &results {
        match serde_json::to_string(summary) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!(error = %e, "Failed to serialize summary"),
        }
    }

    let unfinished = results.iter().filter(|r| r.stats.is_none()).count();
    if unfinished > 0 {
        eprintln!("{unfinished} of {count} games hit the {max_turns}-turn cap");
    }
}

/// Verify determinism by running the same seed several times
fn cmd_verify(scenario: &str, seed: u64, runs: u32, max_turns: u32) {
    tracing::info!(
        "Verifying determinism: {} with seed {} ({} runs)",
        scenario,
        seed,
        runs
    );

    let scenario = load_scenario(scenario).with_seed(seed);
    match verify_determinism(&scenario, runs, max_turns) {
        Ok(true) => {
            eprintln!("PASS: All {runs} runs produced identical results");
        }
        Ok(false) => {
            eprintln!("FAIL: Non-determinism detected!");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Verification failed: {e}");
            std::process::exit(1);
        }
    }
}
