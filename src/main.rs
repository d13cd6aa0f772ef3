//! Ripple - write and post answers to a Q&A thread from the terminal.
//!
//! # Usage
//!
//! ```bash
//! ripple 42
//! ripple --offline demo
//! ripple --draft answer.md --api-base https://qa.example.com/api/v1 42
//! ripple --print 42
//! ```

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use ripple::api::{DEFAULT_API_BASE, HttpApi, MemoryApi, QaApi};
use ripple::app::App;
use ripple::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use ripple::display::thread_text;
use ripple::document::from_markdown;
use ripple::editor::DEFAULT_HISTORY_LIMIT;

/// Write and post answers to a Q&A thread from the terminal
#[derive(Parser, Debug)]
#[command(name = "ripple", version, about, long_about = None)]
struct Cli {
    /// Question to open
    #[arg(value_name = "QUESTION_ID")]
    question_id: String,

    /// Base URL of the Q&A REST API
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// Name shown on answers posted from this session
    #[arg(long, value_name = "NAME")]
    author: Option<String>,

    /// Maximum undo depth of the answer editor
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    history_limit: Option<u64>,

    /// Use a built-in sample thread instead of the API
    #[arg(long)]
    offline: bool,

    /// Write logs to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Bearer token sent with API requests
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,

    /// Start the answer editor with this markdown file
    #[arg(long, value_name = "FILE")]
    draft: Option<PathBuf>,

    /// Print the question and its answers as plain text and exit
    #[arg(long)]
    print: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

fn build_api(question_id: &str, flags: &ConfigFlags) -> Result<Arc<dyn QaApi>> {
    if flags.offline {
        info!(question_id, "using offline sample thread");
        return Ok(Arc::new(MemoryApi::sample(question_id)));
    }
    let base = flags.api_base.as_deref().unwrap_or(DEFAULT_API_BASE);
    let api = HttpApi::new(base, flags.token.clone())
        .with_context(|| format!("Invalid API base URL {base:?}"))?;
    Ok(Arc::new(api))
}

fn load_draft(path: &Path) -> Result<String> {
    let markdown = fs::read_to_string(path)
        .with_context(|| format!("Failed to read draft {}", path.display()))?;
    Ok(from_markdown(&markdown).to_html())
}

fn print_thread(api: &dyn QaApi, question_id: &str) -> Result<()> {
    let thread = api
        .get_question(question_id)
        .with_context(|| format!("Could not load question {question_id}"))?;
    let width = crossterm::terminal::size().map_or(80, |(width, _)| width);
    print!(
        "{}",
        thread_text(&thread.question, &thread.answers, width, Utc::now())
    );
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(effective.log_file.as_deref())?;
    debug!(?effective, "effective configuration");

    let api = build_api(&cli.question_id, &effective)?;

    if cli.print {
        return print_thread(api.as_ref(), &cli.question_id);
    }

    let draft = cli.draft.as_deref().map(load_draft).transpose()?;

    let mut app = App::new(cli.question_id, api)
        .with_author(effective.author.unwrap_or_else(|| "You".to_string()))
        .with_history_limit(effective.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
        .with_draft(draft)
        .with_config_paths(
            Some(global_path),
            if local_path.exists() {
                Some(local_path)
            } else {
                None
            },
        );

    app.run().context("Application error")
}
