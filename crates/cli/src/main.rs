//! Binary entry point for finding and cutting moments in long videos.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clipseek_core::clip;
use clipseek_core::config::{
    Config, DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_ORACLE_ATTEMPTS, DEFAULT_ORACLE_TIMEOUT_SECS,
    DEFAULT_WORK_DIR,
};
use clipseek_core::search::{self, openai::OpenAiOracle, CaptionSource};
use clipseek_core::segments::{DurationPolicy, SegmentSet};
use clipseek_core::srt::{self, Form};
use clipseek_core::video;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Query used for viral mode when none is given.
const VIRAL_QUERY: &str =
    "the funniest, most amusing, outlandish or shocking moments that could go viral online";

/// Command line options for the binary.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose debug and trace logs.
    #[arg(long, global = true)]
    debug: bool,

    /// Directory for transcripts, segment sets and clips.
    #[arg(long, global = true, default_value = DEFAULT_WORK_DIR)]
    work_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch or read captions, normalize them and print the transcript.
    Transcript {
        /// Print without block indices.
        #[arg(long)]
        plain: bool,

        /// Path to an SRT file or a video URL.
        source: String,
    },

    /// Ask the oracle for segments matching a query.
    Search {
        #[arg(long, value_enum, default_value_t = Mode::Query)]
        mode: Mode,

        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: String,

        #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
        model: String,

        #[arg(long, env = "OPENAI_API_BASE", default_value = DEFAULT_API_BASE)]
        api_base: String,

        /// Seconds to wait for one oracle answer.
        #[arg(long, default_value_t = DEFAULT_ORACLE_TIMEOUT_SECS)]
        timeout: u64,

        /// How many times to ask before giving up.
        #[arg(long, default_value_t = DEFAULT_ORACLE_ATTEMPTS)]
        attempts: u32,

        /// Path to an SRT file or a video URL.
        source: String,

        /// What to look for. Required in query mode.
        query: Option<String>,
    },

    /// Download the part of a video between two timestamps.
    Clip {
        /// Only print the cut instruction.
        #[arg(long)]
        dry_run: bool,

        url: String,

        /// Start as HH:MM:SS,mmm.
        start: String,

        /// End as HH:MM:SS,mmm.
        end: String,
    },
}

/// Which duration policy a search runs under.
#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Segments answering a question, 10 s to 2 min, scored.
    Query,
    /// Short shareable moments, 15 s to 1:20.
    Viral,
}

/// Application entry point which parses CLI args and performs actions.
/// This function should initialize logging and delegate to the core library.
#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.debug)?;
    if let Some(msg) = dotenv_warning(&dotenv) {
        warn!("{msg}");
    }

    match cli.command {
        Command::Transcript { plain, source } => {
            let config = Config {
                work_dir: cli.work_dir,
                ..Config::new("")
            };
            let records = search::load_transcript(&CaptionSource::from_arg(&source), &config)?;
            let form = if plain { Form::Plain } else { Form::Indexed };
            print!("{}", srt::format(&records, form));
        }
        Command::Search {
            mode,
            api_key,
            model,
            api_base,
            timeout,
            attempts,
            source,
            query,
        } => {
            let config = Config {
                api_key,
                model,
                api_base,
                work_dir: cli.work_dir,
                oracle_timeout_secs: timeout,
                oracle_attempts: attempts,
            };
            let (policy, query) = match mode {
                Mode::Query => (
                    DurationPolicy::query_search(),
                    query.context("a query is required in query mode")?,
                ),
                Mode::Viral => (
                    DurationPolicy::viral(),
                    query.unwrap_or_else(|| VIRAL_QUERY.to_string()),
                ),
            };
            let oracle = OpenAiOracle::new(&config);
            let source = CaptionSource::from_arg(&source);
            let set = search::find_segments(&source, &query, &policy, &oracle, &config).await?;
            print_segments(&set);
        }
        Command::Clip {
            dry_run,
            url,
            start,
            end,
        } => {
            let cut = clip::resolve_str(&url, &start, &end)?;
            if dry_run {
                println!("{}", serde_json::to_string_pretty(&cut)?);
            } else {
                let id = video::extract_video_id(&url)?;
                let path = video::download_clip(&cut, &cli.work_dir, &id)?;
                info!("clip saved to {}", path.display());
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}

/// Install the tracing subscriber; `--debug` turns on trace output for our crates.
fn init_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::default()
            .add_directive("clipseek=trace".parse()?)
            .add_directive("clipseek_core=trace".parse()?)
            .add_directive("info".parse()?)
    } else {
        EnvFilter::default()
            .add_directive("clipseek=info".parse()?)
            .add_directive("clipseek_core=info".parse()?)
            .add_directive("warn".parse()?)
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// A missing `.env` is fine since the key may come from the environment;
/// one that exists but cannot be read or parsed is worth a warning.
fn dotenv_warning(result: &dotenvy::Result<PathBuf>) -> Option<String> {
    match result {
        Err(e) if !e.not_found() => Some(format!("ignoring .env: {e}")),
        _ => None,
    }
}

fn print_segments(set: &SegmentSet) {
    println!("Found {} segments for '{}'", set.total_segments, set.query);
    for (i, segment) in set.segments.iter().enumerate() {
        let score = segment
            .relevance_score
            .map(|s| format!(" [relevance: {s}]"))
            .unwrap_or_default();
        println!(
            "{}. {} ({} - {}){}",
            i + 1,
            segment.title,
            segment.start,
            segment.end,
            score
        );
        if let Some(summary) = &segment.summary {
            println!("   {summary}");
        }
    }
}
