//! narrel CLI - Command-line interface
//!
//! Usage:
//!   narrel relations <path> [--reduced]
//!   narrel svos <path>
//!   narrel tokens <path>
//!
//! Input is an annotated document (JSON or CoNLL-U); output is a JSON
//! array on stdout. Logs go to stderr.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use narrel_core::{load_document, AppConfig, Document, InputFormat, LoggingConfig};
use narrel_extractor::{
    reduce_relations, relation_records, svo_records, token_records, DependencyExtractor,
    RelationExtractor,
};

#[derive(Parser)]
#[command(name = "narrel")]
#[command(about = "Typed relation extraction from dependency-parsed text")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Annotated document (.json, .conllu)
    path: PathBuf,

    /// Input format, inferred from the extension when omitted
    #[arg(long)]
    format: Option<String>,

    /// Language code for documents that do not declare one
    #[arg(long)]
    lang: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract typed relations
    Relations {
        #[command(flatten)]
        input: InputArgs,

        /// Drop duplicate relations
        #[arg(long)]
        reduced: bool,

        /// Ignore punctuation dependents
        #[arg(long)]
        skip_punct: bool,
    },
    /// Extract subject-verb-object triples
    Svos {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Dump token annotations with classifier flags
    Tokens {
        #[command(flatten)]
        input: InputArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Relations {
            input,
            reduced,
            skip_punct,
        } => {
            let doc = read_input(&input, &config)?;
            let mut extraction = config.extraction.clone();
            extraction.reduce |= reduced;
            extraction.skip_punct |= skip_punct;

            let extractor = DependencyExtractor::with_config(extraction);
            let mut relations = extractor.extract(&doc)?;
            if extractor.config().reduce {
                relations = reduce_relations(&relations);
            }
            write_json(&relation_records(&relations), cli.pretty)?;
        }
        Commands::Svos { input } => {
            let doc = read_input(&input, &config)?;
            let extractor = DependencyExtractor::with_config(config.extraction.clone());
            let relations = extractor.extract(&doc)?;
            write_json(&svo_records(&relations), cli.pretty)?;
        }
        Commands::Tokens { input } => {
            let doc = read_input(&input, &config)?;
            write_json(&token_records(&doc), cli.pretty)?;
        }
    }

    Ok(())
}

/// Config file (if any), then environment overrides
fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    Ok(config.with_env_override()?)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(logging.include_location)
        .with_line_number(logging.include_location);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_input(input: &InputArgs, config: &AppConfig) -> anyhow::Result<Document> {
    let format = input
        .format
        .as_deref()
        .map(str::parse::<InputFormat>)
        .transpose()?;
    let lang = input
        .lang
        .as_deref()
        .unwrap_or(&config.extraction.default_language);

    let doc = load_document(&input.path, format, lang)
        .with_context(|| format!("Failed to load {}", input.path.display()))?;

    tracing::info!(
        "Loaded {} ({} sentences, language {})",
        input.path.display(),
        doc.sentences().len(),
        doc.lang()
    );

    Ok(doc)
}

fn write_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}
