use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use storefront_reviews::config::{Config, SourceKind, DEFAULT_CONFIG_PATH};
use storefront_reviews::source::fixture::sample_reviews;
use storefront_reviews::{render_snapshot, LoadState, RatingSummary, ReviewLoader, SubjectId};

#[derive(Parser)]
#[command(name = "storefront-reviews")]
#[command(about = "Load and display app reviews for the storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and render the reviews of an app
    Show {
        /// App identifiers; each one supersedes the previous, the last is awaited.
        /// Earlier ones are printed as they stood when replaced
        #[arg(required = true)]
        app_ids: Vec<SubjectId>,

        /// Override the configured review source
        #[arg(long, value_enum)]
        source: Option<SourceArg>,

        /// Override the fixture delay in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Include the rating summary
        #[arg(long)]
        summary: bool,

        /// Print the loaded states as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the built-in review dataset as JSON
    Fixture,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum SourceArg {
    Fixture,
    JsonDir,
    Http,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Fixture => SourceKind::Fixture,
            SourceArg::JsonDir => SourceKind::JsonDir,
            SourceArg::Http => SourceKind::Http,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("storefront_reviews=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show {
            app_ids,
            source,
            delay_ms,
            summary,
            json,
        } => {
            let mut config = Config::load(&cli.config)?;
            if let Some(source) = source {
                config.source.kind = source.into();
            }
            if let Some(delay_ms) = delay_ms {
                config.source.fixture.delay_ms = delay_ms;
            }
            if summary {
                config.display.show_summary = true;
            }

            show_reviews(&config, app_ids, json).await?;
        }
        Commands::Fixture => {
            let content = serde_json::to_string_pretty(&sample_reviews())
                .context("Failed to serialize fixture reviews")?;
            println!("{}", content);
        }
    }

    Ok(())
}

async fn show_reviews(config: &Config, app_ids: Vec<SubjectId>, json: bool) -> Result<()> {
    let options = config.render_options();
    let loader = ReviewLoader::new(config.build_source()?);

    let report = loader
        .load_in_sequence(app_ids)
        .await
        .context("No app identifiers given")?;

    if json {
        let content =
            serde_json::to_string_pretty(&report).context("Failed to serialize review state")?;
        println!("{}", content);
        return Ok(());
    }

    for snapshot in &report.superseded {
        print!("{}", render_snapshot(snapshot, &options));
        println!();
    }

    let state = &report.settled.state;
    print!("{}", render_snapshot(&report.settled, &options));

    if config.display.show_summary {
        if let LoadState::Loaded { reviews } = state {
            println!();
            print!("{}", RatingSummary::from_reviews(reviews).to_markdown());
        }
    }

    Ok(())
}
