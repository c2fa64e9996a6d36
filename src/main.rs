use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use takeout_semantic_history::export::{self, ExportOptions};
use takeout_semantic_history::takeout::{self, find_data_paths, open_storage, ParseOptions, RecordPolicy};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// read a takeout and write activity segments and place visits to two delimited files
    Export {
        /// path to the Google Takeout, either the .zip or the extracted folder
        takeout_path: PathBuf,

        #[arg(long, default_value = "activities.csv")]
        activities_path: PathBuf,

        #[arg(long, default_value = "places.csv")]
        places_path: PathBuf,

        /// what to do with timeline records that are neither segments nor visits
        #[arg(long, value_enum, env = "TAKEOUT_RECORD_POLICY", default_value_t = RecordPolicy::Strict)]
        policy: RecordPolicy,

        /// single-byte field delimiter
        #[arg(long, default_value_t = '|')]
        delimiter: char,

        /// history files parsed at once (needs the `parallel` feature)
        #[arg(short, long, default_value_t = 1)]
        jobs: usize,
    },
    /// list the history files found in a takeout
    List {
        #[arg(short, long)]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    run_cli(cli)
}

fn init_tracing(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
}

fn run_cli(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Export {
            takeout_path,
            activities_path,
            places_path,
            policy,
            delimiter,
            jobs,
        } => {
            let delimiter = u8::try_from(delimiter)
                .ok()
                .filter(u8::is_ascii)
                .with_context(|| format!("delimiter must be a single ASCII character, got {delimiter:?}"))?;
            let options = ParseOptions {
                policy,
                jobs,
                cancel: None,
            };

            let data = takeout::read_takeout(&takeout_path, &options)
                .with_context(|| format!("could not read takeout at {}", takeout_path.display()))?;
            println!("Found {} data files", data.num_files);
            if policy == RecordPolicy::Lenient {
                println!("Skipped {} unrecognized records", data.skipped.len());
            }

            let export_options = ExportOptions { delimiter };
            let written = export::export_to_path(&activities_path, &data.activities, export_options)
                .with_context(|| format!("could not write {}", activities_path.display()))?;
            println!("Wrote {written} ActivitySegments to {}", absolute(&activities_path).display());

            let written = export::export_to_path(&places_path, &data.places, export_options)
                .with_context(|| format!("could not write {}", places_path.display()))?;
            println!("Wrote {written} PlaceVisits to {}", absolute(&places_path).display());
        }
        Commands::List { path } => {
            let storage = open_storage(&path)?;
            for file in find_data_paths(storage.as_ref())? {
                println!("{file}");
            }
        }
    }
    Ok(())
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
