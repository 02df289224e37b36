//! Command-line host for `unbound_core`.
//!
//! # Responsibility
//! - Exercise conversion, statistics and chapter import/export from a shell.
//! - Keep output deterministic so it can be diffed in scripts.

use clap::{Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use unbound_core::{
    core_version, html_to_markdown, import_markdown_file, init_from_config, markdown_to_html, stats,
    SessionConfig, WritingSession,
};

#[derive(Parser)]
#[command(version, about = "Unbound - Markdown and rich text writing core", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a session config JSON file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print word, character and paragraph statistics of a Markdown file
    Stats { file: PathBuf },
    /// Convert a Markdown file to HTML
    ToHtml { file: PathBuf },
    /// Convert an HTML file to Markdown
    ToMarkdown { file: PathBuf },
    /// Import a Markdown file, switch editing mode there and back, print the result
    Roundtrip {
        file: PathBuf,

        /// Chapter id to import into
        #[arg(long, default_value = "item_9")]
        chapter: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => SessionConfig::load(path).map_err(|err| err.to_string())?,
        None => SessionConfig::default(),
    };
    init_from_config(&config)?;
    info!(
        "event=cli_start module=cli status=ok core_version={}",
        core_version()
    );

    match cli.command {
        Commands::Stats { file } => {
            let text = read_file(&file)?;
            println!("{}", stats(&text).summary());
        }
        Commands::ToHtml { file } => println!("{}", markdown_to_html(&read_file(&file)?)),
        Commands::ToMarkdown { file } => println!("{}", html_to_markdown(&read_file(&file)?)),
        Commands::Roundtrip { file, chapter } => {
            let mut session = WritingSession::new(config);
            let view = session.item_selected(&chapter);
            import_markdown_file(&mut session, &file).map_err(|err| err.to_string())?;
            session.toggle_mode();
            session.toggle_mode();
            info!(
                "event=cli_roundtrip module=cli status=ok chapter={} words={}",
                view.id,
                session.statistics().words
            );
            match session.export_markdown() {
                Ok(markdown) => println!("{markdown}"),
                Err(warning) => eprintln!("warning: {warning}"),
            }
        }
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read `{}`: {err}", path.display()))
}
