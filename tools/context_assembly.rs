/// Context Assembly: builds the drafting context package for one episode.
///
/// Usage: context_assembly <EP-NN> [--lore-dir <dir>] [--episodes-dir <dir>] [--rules <file.ron>]
use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use episode_workflow::core::assembly::{AssemblyError, ContextAssembler, WorkspaceLayout};
use episode_workflow::schema::rules::LoreRules;

#[derive(Parser, Debug)]
#[command(name = "context_assembly")]
#[command(version, about = "Assemble the lore context package for an episode", long_about = None)]
struct Cli {
    /// Episode identifier, e.g. EP-05
    episode: String,

    /// Directory holding episode-outline.md, characters.md, world.md and style-guide.md
    #[arg(long, default_value = "lore")]
    lore_dir: PathBuf,

    /// Directory holding episode drafts
    #[arg(long, default_value = "episodes")]
    episodes_dir: PathBuf,

    /// Keyword and character table (RON); the bundled table is used if omitted
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: &Cli) -> Result<String, AssemblyError> {
    let rules = match &cli.rules {
        Some(path) => LoreRules::load_from_ron(path)?,
        None => LoreRules::bundled()?,
    };
    let layout = WorkspaceLayout {
        lore_dir: cli.lore_dir.clone(),
        episodes_dir: cli.episodes_dir.clone(),
    };
    let package = ContextAssembler::new(&rules, layout).assemble(&cli.episode)?;
    Ok(package.to_json()?)
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(&cli) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::error!(error = %e, "context assembly failed");
            println!("{}", serde_json::json!({ "error": e.to_string() }));
            process::exit(2);
        }
    }
}
