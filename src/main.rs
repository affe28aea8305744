//! execwatch: reads exec approval notices from an automation gateway.
//!
//! Quick start:
//!   execwatch parse notice.txt                 # what does this notice ask for?
//!   execwatch detect --pending pending.json "Exec denied: 0e9a9d4d"
//!   execwatch watch --input messages.jsonl     # follow a message stream
//!
//! For more info: execwatch --help

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use execwatch::cli;
use execwatch::utils::duration::parse_duration;
use std::path::PathBuf;

/// Parse gateway exec approval notices and spot their answers.
#[derive(Parser)]
#[command(
    name = "execwatch",
    version,
    about = "Parse gateway exec approval notices and spot their answers",
    long_about = "execwatch reads the plain-text exec approval notices an automation\n\
                  gateway posts to chat, and recognizes the later messages that\n\
                  allow or deny them.\n\n\
                  Quick start:\n  \
                  execwatch parse notice.txt\n  \
                  execwatch detect --pending pending.json \"Exec denied: 0e9a9d4d\"\n  \
                  execwatch watch --input messages.jsonl"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse one approval notice
    Parse {
        /// File holding the notice (default: stdin)
        #[arg(help = "Notice file, or - for stdin")]
        file: Option<PathBuf>,

        /// Print JSON instead of a summary card
        #[arg(long)]
        json: bool,
    },

    /// Check whether a message resolves a pending approval
    Detect {
        /// JSON snapshot of pending approvals
        #[arg(short, long, help = "Pending snapshot (JSON array)")]
        pending: PathBuf,

        /// The message text (default: stdin)
        text: Option<String>,
    },

    /// Follow a JSON-lines message stream and report approval events
    Watch {
        /// Message stream file (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Lifetime for notices whose "Expires in" can't be read
        #[arg(long, env = "EXECWATCH_DEFAULT_TTL", default_value = "120s")]
        default_ttl: String,

        /// Keep pending approvals forever
        #[arg(long)]
        no_expire: bool,

        /// Print counters to stderr when the stream ends
        #[arg(long)]
        summary: bool,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("execwatch=warn".parse().expect("static directive")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse { file, json } => cli::parse::run_parse(file.as_deref(), json),

        Commands::Detect { pending, text } => cli::detect::run_detect(&pending, text.as_deref()),

        Commands::Watch {
            input,
            default_ttl,
            no_expire,
            summary,
        } => run_watch(input, &default_ttl, !no_expire, summary).await,
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!();
            eprintln!("  {} {}", "✗".red().bold(), e);
            for cause in e.chain().skip(1) {
                eprintln!("  {} {}", "caused by:".dimmed(), cause);
            }
            eprintln!();
            std::process::exit(1);
        }
    }
}

async fn run_watch(
    input: Option<PathBuf>,
    default_ttl: &str,
    expire: bool,
    summary: bool,
) -> anyhow::Result<bool> {
    let default_ttl = parse_duration(default_ttl)
        .with_context(|| format!("Invalid --default-ttl '{}'", default_ttl))?;

    let options = cli::watch::WatchOptions {
        input,
        default_ttl,
        expire,
        summary,
    };
    cli::watch::run_watch(options).await?;
    Ok(true)
}
