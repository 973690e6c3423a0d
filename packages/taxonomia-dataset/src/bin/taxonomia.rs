//! Taxonomia dataset CLI
//!
//! # Usage
//!
//! ```bash
//! # Create an empty store (db.sq3 unless configured)
//! taxonomia init
//!
//! # Load a Hazo document into the store
//! taxonomia import flora.hazo.json
//!
//! # Identify taxa carrying every selected state
//! taxonomia identify --state s12 --state s40
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use taxonomia_dataset::application::refresh_picture_cache;
use taxonomia_dataset::codec::{self, EncodedDataset};
use taxonomia_dataset::diagnostics::find_duplicate_ids;
use taxonomia_dataset::infrastructure::HttpPictureFetcher;
use taxonomia_dataset::{
    logging, CharacterSummary, DatasetConfig, DatasetError, DatasetStore, Result,
    SqliteDatasetStore,
};

#[derive(Parser)]
#[command(name = "taxonomia")]
#[command(about = "Identification dataset tools", long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema
    Init,

    /// Bulk load a Hazo document into the database
    Import {
        /// Document to load (defaults to the configured dataset path)
        file: Option<PathBuf>,
    },

    /// Decode a document and write it back in canonical form
    Normalize {
        input: PathBuf,
        output: PathBuf,
    },

    /// Download every referenced picture into the cache table
    Cache,

    /// Print the character tree with its states
    Lschar,

    /// List taxa carrying all the given states
    Identify {
        /// Selected state id (repeatable)
        #[arg(short, long = "state", required = true)]
        states: Vec<String>,
    },

    /// Report ids shared by several records of a document
    CheckIds { file: PathBuf },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("taxonomia: {}", err);
            return ExitCode::FAILURE;
        }
    };
    logging::init_tracing(&config.log_filter);

    match run(cli.command, &config).await {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, "Command failed");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<DatasetConfig> {
    let config = match path {
        Some(path) => DatasetConfig::from_yaml(path)?,
        None => DatasetConfig::default(),
    };
    Ok(config.with_env_overrides())
}

async fn run(command: Commands, config: &DatasetConfig) -> Result<ExitCode> {
    match command {
        Commands::Init => {
            let store = SqliteDatasetStore::new(&config.database_path)?;
            store.initialize().await?;
            info!(path = %config.database_path.display(), "Database initialized");
        }
        Commands::Import { file } => {
            let path = file.unwrap_or_else(|| config.dataset_path.clone());
            import(&path, config).await?;
        }
        Commands::Normalize { input, output } => {
            let dataset = codec::read_hazo(BufReader::new(File::open(&input)?))?;
            codec::write_hazo_pretty(BufWriter::new(File::create(&output)?), &dataset)?;
            info!(
                input = %input.display(),
                output = %output.display(),
                "Document normalized"
            );
        }
        Commands::Cache => {
            let store = SqliteDatasetStore::new(&config.database_path)?;
            let fetcher = HttpPictureFetcher::new(&config.picture_cache)?;
            let report = refresh_picture_cache(&store, Arc::new(fetcher)).await?;
            println!(
                "{} pictures requested, {} cached, {} failed",
                report.requested, report.cached, report.failed
            );
        }
        Commands::Lschar => {
            let store = SqliteDatasetStore::new(&config.database_path)?;
            for character in store.character_tree().await? {
                print_character(&character, 0);
            }
        }
        Commands::Identify { states } => {
            let store = SqliteDatasetStore::new(&config.database_path)?;
            let taxa = store.identify_taxa(&states).await?;
            for taxon in &taxa {
                if taxon.author.is_empty() {
                    println!("{}\t{}", taxon.id, taxon.name);
                } else {
                    println!("{}\t{} {}", taxon.id, taxon.name, taxon.author);
                }
            }
            info!(matches = taxa.len(), "Identification done");
        }
        Commands::CheckIds { file } => {
            let document: EncodedDataset =
                serde_json::from_reader(BufReader::new(File::open(&file)?))
                    .map_err(|e| DatasetError::decode(e.to_string()).with_source(e))?;
            let duplicates = find_duplicate_ids(&document);
            for duplicate in &duplicates {
                println!("{}", duplicate);
            }
            if !duplicates.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn import(path: &Path, config: &DatasetConfig) -> Result<()> {
    let file = File::open(path).map_err(|e| {
        DatasetError::decode(format!("Cannot open '{}': {}", path.display(), e)).with_source(e)
    })?;
    let dataset = codec::read_hazo(BufReader::new(file))?;

    let store = SqliteDatasetStore::new(&config.database_path)?;
    let report = store.load_dataset(&dataset).await?;
    if report.synthesized > 0 {
        warn!(
            synthesized = report.synthesized,
            "Dangling child ids were loaded as empty records"
        );
    }
    println!(
        "{} characters, {} states, {} taxa loaded into {}",
        report.characters,
        report.states,
        report.taxa,
        config.database_path.display()
    );
    Ok(())
}

fn print_character(character: &CharacterSummary, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{}{} {}", indent, character.id, character.name.scientific);
    for state in &character.states {
        println!("{}  - {} {}", indent, state.id, state.name.scientific);
    }
    for child in &character.children {
        print_character(child, depth + 1);
    }
}
