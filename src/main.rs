use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use journal_builder::{
    BuildMode, EntryBuild, JournalBuilder, JournalConfig, ListingPolicy, normalize_input_path,
    resolve_markdown_path,
};

#[derive(Parser)]
#[command(name = "journal")]
#[command(about = "Build and update journal entry pages from Markdown")]
struct Cli {
    /// Project directory holding journal.config.json
    #[arg(long, default_value = ".", global = true)]
    project: PathBuf,

    /// Journals root, overriding the configuration
    #[arg(long, global = true)]
    journals_root: Option<PathBuf>,

    /// Keep a .bak copy of each listing page before patching it
    #[arg(long, global = true)]
    backup: bool,

    /// Build the entry without touching the listing pages
    #[arg(long, global = true)]
    skip_listings: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new entry from a Markdown file
    New {
        /// Markdown file; prompted for when omitted
        path: Option<String>,
    },
    /// Rebuild an existing entry from its Markdown file or entry folder
    Update {
        /// Markdown file or entry folder; prompted for when omitted
        path: Option<String>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("❌ {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = JournalConfig::discover(&cli.project);
    if let Some(root) = &cli.journals_root {
        config.journals_root = root.to_string_lossy().into_owned();
    }
    if cli.backup {
        config.keep_backups = true;
    }
    let layout = config.to_layout(&cli.project);
    let listings = if cli.skip_listings {
        ListingPolicy::Skip
    } else {
        ListingPolicy::Update
    };

    let (mode, raw) = match cli.command {
        Command::New { path } => (BuildMode::Create, path),
        Command::Update { path } => (BuildMode::Update, path),
    };
    let raw = match raw {
        Some(raw) => raw,
        None => prompt(mode)?,
    };

    let input = normalize_input_path(&raw)?;
    let markdown = match mode {
        BuildMode::Create => input,
        BuildMode::Update => resolve_markdown_path(&input)?,
    };

    let build = JournalBuilder::new(&layout)
        .publish(&markdown, mode, listings)
        .with_context(|| format!("failed to build {}", markdown.display()))?;
    report(&build, mode);
    Ok(())
}

fn prompt(mode: BuildMode) -> Result<String> {
    let message = match mode {
        BuildMode::Create => "Drag the journal Markdown file here and press Enter: ",
        BuildMode::Update => "Drag the entry folder or Markdown file here and press Enter: ",
    };
    let mut stdout = io::stdout();
    stdout.write_all(message.as_bytes())?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("failed to read path from stdin")?;
    Ok(line)
}

fn report(build: &EntryBuild, mode: BuildMode) {
    let verb = match mode {
        BuildMode::Create => "created",
        BuildMode::Update => "updated",
    };
    println!(
        "✅ journal entry \"{}\" {}: {}",
        build.title,
        verb,
        build.paths.html_path.display()
    );
    for warning in &build.warnings {
        println!("⚠️ {warning}");
    }
}
