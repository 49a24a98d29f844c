use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blockdex::{commands, IndexOptions, Result};

#[derive(Parser)]
#[command(
    name = "blockdex",
    version,
    about = "Disk-resident B-tree index of unsigned 64-bit keys and values"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new, empty index file
    Create { file: PathBuf },
    /// Insert a key/value pair, overwriting the value if the key exists
    Insert { file: PathBuf, key: u64, value: u64 },
    /// Look up a key
    Search { file: PathBuf, key: u64 },
    /// Insert every `key,value` row of a CSV file
    Load { file: PathBuf, csv: PathBuf },
    /// Print every pair in ascending key order
    Print { file: PathBuf },
    /// Write every pair to a new CSV file
    Extract { file: PathBuf, output: PathBuf },
}

fn run(command: Command, options: IndexOptions) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Command::Create { file } => commands::create(&file, options, &mut out)?,
        Command::Insert { file, key, value } => {
            commands::insert(&file, key, value, options, &mut out)?;
        }
        Command::Search { file, key } => {
            commands::search(&file, key, options, &mut out)?;
        }
        Command::Load { file, csv } => {
            commands::load(&file, &csv, options, &mut out)?;
        }
        Command::Print { file } => {
            commands::print(&file, options, &mut out)?;
        }
        Command::Extract { file, output } => {
            commands::extract(&file, &output, options, &mut out)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blockdex=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let options = IndexOptions::from_env();

    if let Err(err) = run(cli.command, options) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
