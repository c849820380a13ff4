//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use postweave_core::pipeline::{
    self, EnrichConfig, EnrichFileConfig, EnrichReport, ProgressReporter,
};
use postweave_shared::{AppConfig, DATE_FORMAT, init_config, load_config, load_config_from};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// postweave: cross-link and relate the posts of a blog corpus.
#[derive(Parser)]
#[command(
    name = "postweave",
    version,
    about = "Enrich a JSON blog corpus with word counts, related posts, and internal links.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file to use instead of ~/.postweave/postweave.toml.
    #[arg(long, global = true, env = "POSTWEAVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Enrich every post of a corpus and write it back.
    Enrich {
        /// Corpus document (defaults to `defaults.corpus_path`).
        corpus: Option<PathBuf>,

        /// Write the result here instead of over the input.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Date stamp for `lastModified` (YYYY-MM-DD, defaults to today).
        #[arg(long)]
        date: Option<String>,

        /// Run everything but write nothing.
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate a corpus without modifying it.
    Check {
        /// Corpus document (defaults to `defaults.corpus_path`).
        corpus: Option<PathBuf>,
    },

    /// Show the ranked related posts of one post.
    Related {
        /// Slug of the post to rank against.
        slug: String,

        /// Corpus document (defaults to `defaults.corpus_path`).
        corpus: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
///
/// Logs go to stderr so stdout stays free for command output.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "postweave=info",
        1 => "postweave=debug",
        _ => "postweave=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    match cli.command {
        Command::Enrich {
            corpus,
            out,
            date,
            dry_run,
        } => {
            let config = resolve_config(config_path.as_deref())?;
            cmd_enrich(&config, corpus, out, date.as_deref(), dry_run).await
        }
        Command::Check { corpus } => {
            let config = resolve_config(config_path.as_deref())?;
            cmd_check(&config, corpus).await
        }
        Command::Related { slug, corpus } => {
            let config = resolve_config(config_path.as_deref())?;
            cmd_related(&config, &slug, corpus).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path.as_deref()).await,
        },
    }
}

/// Load the explicit `--config` file, or the user config (defaults if absent).
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

fn corpus_path(config: &AppConfig, corpus: Option<PathBuf>) -> PathBuf {
    corpus.unwrap_or_else(|| PathBuf::from(&config.defaults.corpus_path))
}

fn parse_stamp(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|e| eyre!("invalid --date '{date}': {e} (expected YYYY-MM-DD)"))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_enrich(
    config: &AppConfig,
    corpus: Option<PathBuf>,
    out: Option<PathBuf>,
    date: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let mut enrich = EnrichConfig::from(config);
    if let Some(date) = date {
        enrich.stamp = parse_stamp(date)?;
    }

    let file_config = EnrichFileConfig {
        input: corpus_path(config, corpus),
        output: out,
        dry_run,
        enrich,
    };

    info!(
        input = %file_config.input.display(),
        output = %file_config.output_path().display(),
        dry_run,
        "enriching corpus"
    );

    let reporter = CliProgress::new();
    let report = pipeline::enrich_file(&file_config, &reporter).await?;

    eprintln!();
    eprintln!("  Posts enriched:        {}", report.posts);
    eprintln!("  Avg links per post:    {:.1}", report.average_links());
    eprintln!("  Posts without links:   {}", report.posts_without_links);
    eprintln!("  Posts with related:    {}", report.posts_with_related);
    eprintln!("  Time:                  {:.1}s", report.elapsed.as_secs_f64());
    if dry_run {
        eprintln!("  (dry run, nothing written)");
    } else {
        eprintln!("  Written to:            {}", file_config.output_path().display());
    }
    eprintln!();

    Ok(())
}

async fn cmd_check(config: &AppConfig, corpus: Option<PathBuf>) -> Result<()> {
    let path = corpus_path(config, corpus);
    let check = pipeline::check_file(&path, &config.linking).await?;

    println!("  Corpus OK: {}", path.display());
    println!("  Posts:            {}", check.posts);
    println!("  Categories:       {}", check.categories);
    println!("  Tags:             {}", check.tags);
    println!("  Link candidates:  {}", check.candidates);
    println!("  Already linked:   {}", check.posts_with_links);
    println!("  Empty bodies:     {}", check.empty_posts);

    Ok(())
}

async fn cmd_related(config: &AppConfig, slug: &str, corpus: Option<PathBuf>) -> Result<()> {
    let path = corpus_path(config, corpus);
    let ranked = pipeline::related_in_file(&path, slug, &config.related).await?;

    if ranked.is_empty() {
        println!("no related posts for '{slug}'");
        return Ok(());
    }

    for (i, scored) in ranked.iter().enumerate() {
        let marker = if i < config.related.max_related { "*" } else { " " };
        println!("{marker} {:>3}  {}", scored.score, scored.slug);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn post_enriched(&self, slug: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Enriching [{current}/{total}] {slug}"));
    }

    fn done(&self, _report: &EnrichReport) {
        self.spinner.finish_and_clear();
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
