/// Episode Linter: validates a finished draft against the serialization rules.
///
/// Usage: episode_linter <draft.md> [--config <lint.ron>]
///        episode_linter --episode <EP-NN> [--episodes-dir <dir>]
///
/// Exit status: 0 when every check passes, 1 when any check fails,
/// 2 when the draft or configuration cannot be read.
use clap::Parser;
use std::path::PathBuf;
use std::process;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use episode_workflow::core::drafts::find_draft;
use episode_workflow::core::linter::{validate_file, LintConfig, LintError};
use episode_workflow::schema::episode::{EpisodeTag, EpisodeTagError};
use episode_workflow::schema::report::ValidationReport;

#[derive(Parser, Debug)]
#[command(name = "episode_linter")]
#[command(version, about = "Validate an episode draft", long_about = None)]
struct Cli {
    /// Path to the draft markdown file
    #[arg(required_unless_present = "episode", conflicts_with = "episode")]
    draft: Option<PathBuf>,

    /// Look the draft up by episode identifier instead of by path
    #[arg(long)]
    episode: Option<String>,

    /// Directory searched when --episode is given
    #[arg(long, default_value = "episodes")]
    episodes_dir: PathBuf,

    /// Threshold overrides (RON); production thresholds are used if omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Episode(#[from] EpisodeTagError),
    #[error(transparent)]
    Lint(#[from] LintError),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
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

fn resolve_draft(cli: &Cli) -> Result<PathBuf, CliError> {
    if let Some(path) = &cli.draft {
        return Ok(path.clone());
    }
    let raw = cli.episode.as_deref().unwrap_or_default();
    let tag = EpisodeTag::parse(raw)?;
    find_draft(&cli.episodes_dir, tag).ok_or_else(|| {
        CliError::Lint(LintError::DraftNotFound {
            tag,
            dir: cli.episodes_dir.clone(),
        })
    })
}

fn run(cli: &Cli) -> Result<(ValidationReport, String), CliError> {
    let config = match &cli.config {
        Some(path) => LintConfig::load_from_ron(path)?,
        None => LintConfig::default(),
    };
    let draft = resolve_draft(cli)?;
    let report = validate_file(&draft, &config)?;
    let json = report.to_json()?;
    Ok((report, json))
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(&cli) {
        Ok((report, json)) => {
            println!("{}", json);
            process::exit(if report.overall.is_pass() { 0 } else { 1 });
        }
        Err(e) => {
            tracing::error!(error = %e, "validation failed to run");
            println!(
                "{}",
                serde_json::json!({ "error": e.to_string(), "overall": "ERROR" })
            );
            process::exit(2);
        }
    }
}
