// Prop assistant entry point.
//
// Pipeline stages mirror the analysis workflow:
// 1. `score`   - props board + game logs -> scored recommendations
// 2. `tickets` - recommendations -> constrained ticket bundles
// 3. `run`     - both stages in sequence

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use prop_assistant::config;
use prop_assistant::pipeline;

#[derive(Parser)]
#[command(
    name = "prop-assistant",
    about = "Score sportsbook player props against game logs and assemble tickets"
)]
struct Cli {
    /// TOML configuration file; compiled-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the ticket sampler, for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score the props board and write the recommendations artifact.
    Score,
    /// Generate tickets from an existing recommendations artifact.
    Tickets,
    /// Run the full pipeline: score, then generate tickets.
    Run,
}

fn main() -> anyhow::Result<()> {
    init_tracing().context("failed to initialize tracing")?;

    let cli = Cli::parse();

    let config =
        config::load_config(cli.config.as_deref()).context("failed to load configuration")?;
    info!(
        "config loaded: sport={:?}, window={}, context={}",
        config.sport,
        config.weights().window,
        config.apply_context
    );

    let mut rng = match cli.seed {
        Some(seed) => {
            info!("using seeded rng ({seed})");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    match cli.command {
        Command::Score => {
            pipeline::run_score(&config).context("scoring stage failed")?;
        }
        Command::Tickets => {
            let tickets =
                pipeline::run_tickets(&config, &mut rng).context("ticket stage failed")?;
            info!("generated {} tickets", tickets.len());
        }
        Command::Run => {
            let tickets = pipeline::run_all(&config, &mut rng).context("pipeline failed")?;
            info!("generated {} tickets", tickets.len());
        }
    }

    Ok(())
}

/// Initialize tracing to stderr so stdout stays clean for shell pipelines.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("prop_assistant=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
