//! Deterministic stand-in for the store under test.
//!
//! Speaks the same command surface as the real store binary
//! (`kvstub DEVICE COMMAND --key ... --file ...`) and emits the same
//! diagnostic markers, backed by a plain directory per device instead of a
//! block device. `select` replays the stored bytes unchanged (an identity
//! query), so expected-result fixtures for stub runs are authored as exact
//! copies of the data they query.
//!
//! The backing root comes from `KVSTUB_ROOT` (default `.kvstub`), which the
//! integration suite points at a temp directory.

use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "kvstub", about = "Directory-backed key/value store stand-in.")]
struct KvstubArgs {
    /// Block device name; selects the backing subdirectory.
    device: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Store the contents of FILE under KEY.
    Store {
        #[arg(long)]
        key: String,
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        append: bool,
    },
    /// Retrieve the contents of KEY and write to FILE.
    Retrieve {
        #[arg(long)]
        key: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Run SQL on the contents of KEY and write the results to FILE.
    Select {
        #[arg(long)]
        key: String,
        #[arg(long)]
        sql: String,
        #[arg(long)]
        file: PathBuf,
        #[arg(long = "input_format", default_value = "csv")]
        input_format: String,
        #[arg(long = "output_format", default_value = "csv")]
        output_format: String,
        #[arg(long = "use_csv_header_for_input")]
        use_csv_header_for_input: bool,
        #[arg(long = "use_csv_header_for_output")]
        use_csv_header_for_output: bool,
    },
    /// List keys matching the prefix.
    List {
        #[arg(long, default_value = "")]
        key: String,
    },
    /// Check if KEY exists.
    Exists {
        #[arg(long)]
        key: String,
    },
    /// Delete KEY from the store.
    Delete {
        #[arg(long)]
        key: String,
    },
}

fn main() {
    let args = KvstubArgs::parse();
    if let Err(e) = run(args) {
        eprintln!("kvstub: {e}");
        process::exit(1);
    }
}

fn run(args: KvstubArgs) -> io::Result<()> {
    let root = backing_dir(&args.device)?;
    match args.command {
        Command::Store { key, file, append } => {
            let data = fs::read(&file)?;
            let target = root.join(&key);
            if append && target.exists() {
                let mut existing = fs::read(&target)?;
                existing.extend_from_slice(&data);
                fs::write(&target, existing)?;
            } else {
                fs::write(&target, data)?;
            }
        }
        Command::Retrieve { key, file } => {
            let source = root.join(&key);
            if !source.is_file() {
                eprintln!("Key does not exist.");
                return Ok(());
            }
            fs::copy(&source, &file)?;
        }
        Command::Select { key, file, .. } => {
            let source = root.join(&key);
            if !source.is_file() {
                eprintln!("Key does not exist.");
                return Ok(());
            }
            // Identity query: the stub has no SQL engine.
            fs::copy(&source, &file)?;
        }
        Command::List { key } => {
            let mut names: Vec<String> = fs::read_dir(&root)?
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .filter(|name| name.starts_with(&key))
                .collect();
            names.sort();
            for (index, name) in names.iter().enumerate() {
                eprintln!("key[{index}] = {name}");
            }
        }
        Command::Exists { key } => {
            if root.join(&key).is_file() {
                eprintln!("Key exists.");
            } else {
                eprintln!("Key does not exist.");
            }
        }
        Command::Delete { key } => {
            let target = root.join(&key);
            if target.is_file() {
                fs::remove_file(&target)?;
            }
        }
    }
    Ok(())
}

fn backing_dir(device: &str) -> io::Result<PathBuf> {
    let root = env::var_os("KVSTUB_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".kvstub"));
    let dir = root.join(device);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}
