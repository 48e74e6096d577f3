//! Command-line arguments and subcommands for the kvcheck binary.
//!
//! Uses `clap` derive. Every run parameter is also settable through the
//! environment (`KVCHECK_*`), mirroring how the harness is driven from CI.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use termcolor::ColorChoice;

use crate::config::HarnessConfig;

#[derive(Debug, Parser)]
#[command(
    name = "kvcheck",
    version,
    about = "Black-box acceptance checks for a CLI-driven key/value store."
)]
pub struct KvcheckArgs {
    /// Name of the block device the store operates on.
    #[arg(long, env = "KVCHECK_DEVICE", default_value = "Nvme1n1")]
    pub device: String,

    /// Path to the store executable under test.
    #[arg(long, env = "KVCHECK_SUT_EXE", default_value = "./build/examples/kvcli")]
    pub sut_exe: PathBuf,

    /// Directory holding fixture data files and their query/result files.
    #[arg(long, env = "KVCHECK_FIXTURE_DIR", default_value = "./tests")]
    pub fixture_dir: PathBuf,

    /// Scratch directory for retrieved and queried output.
    #[arg(long, env = "KVCHECK_SCRATCH_DIR", default_value = "./tmp")]
    pub scratch_dir: PathBuf,

    /// Run only fixtures whose file name contains this substring.
    #[arg(long)]
    pub filter: Option<String>,

    /// When to color the report output.
    #[arg(long, value_enum, default_value = "auto")]
    pub color: ColorMode,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full acceptance sequence against the store.
    Run,
    /// Print the discovered fixtures and their query-case plan without
    /// touching the store.
    Fixtures,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl KvcheckArgs {
    pub fn to_config(&self) -> HarnessConfig {
        HarnessConfig {
            device: self.device.clone(),
            sut_exe: self.sut_exe.clone(),
            fixture_dir: self.fixture_dir.clone(),
            scratch_dir: self.scratch_dir.clone(),
            filter: self.filter.clone(),
            color: match self.color {
                ColorMode::Always => ColorChoice::Always,
                ColorMode::Never => ColorChoice::Never,
                ColorMode::Auto => {
                    if atty::is(atty::Stream::Stdout) {
                        ColorChoice::Auto
                    } else {
                        ColorChoice::Never
                    }
                }
            },
        }
    }
}
