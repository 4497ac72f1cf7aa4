use std::path::PathBuf;

use clap::Parser;

use euchre_bench::arena::ArenaRunner;
use euchre_bench::config::ArenaConfig;
use euchre_bench::logging::init_logging;

/// Arena harness that plays full Euchre games between seat agents.
#[derive(Debug, Parser)]
#[command(
    name = "euchre-bench",
    author,
    version,
    about = "Deterministic Euchre arena harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/arena.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of games to play.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the RNG seed for deals and random agents.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration.
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = ArenaConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(games) = cli.games {
        config.games.count = games;
    }

    if let Some(seed) = cli.seed {
        config.games.seed = Some(seed);
    }

    config.validate()?;

    let outputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let games = config.games.count;
    let agents = config
        .agents
        .iter()
        .map(|agent| agent.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    println!(
        "Loaded configuration '{run_id}': {games} game{} with {agents}",
        if games == 1 { "" } else { "s" }
    );

    if cli.validate_only {
        println!("Validation-only mode: arena execution skipped.");
        return Ok(());
    }

    let logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = ArenaRunner::new(config, outputs)?;
    let summary = runner.run()?;

    println!(
        "Arena complete for '{run_id}': {} games, {} hands, {} fallbacks → {} rows at {}",
        summary.games_played,
        summary.hands_played,
        summary.fallbacks,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!(
        "Games won: North/South {} - East/West {}",
        summary.team_wins[0], summary.team_wins[1]
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(guard) = logging_guard.as_ref() {
        println!("Event log: {}", guard.events_path.display());
    }

    Ok(())
}
