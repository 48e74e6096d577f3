//! Run configuration.
//!
//! Every parameter here is overridable from the command line (and most from
//! the environment, see [`crate::cli::args`]); the defaults match the
//! conventional layout of a store checkout: the built `kvcli` binary under
//! `build/examples/`, fixtures under `tests/`, scratch output under `tmp/`.

use std::path::PathBuf;

use termcolor::ColorChoice;

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Store identifier handed to every invocation (block device name).
    pub device: String,
    /// Path to the store executable under test.
    pub sut_exe: PathBuf,
    /// Directory holding data files and their query/result companions.
    pub fixture_dir: PathBuf,
    /// Directory for retrieved and queried scratch output.
    pub scratch_dir: PathBuf,
    /// Optional substring restricting which fixtures run.
    pub filter: Option<String>,
    /// Color handling for the report stream.
    pub color: ColorChoice,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            device: "Nvme1n1".to_string(),
            sut_exe: PathBuf::from("./build/examples/kvcli"),
            fixture_dir: PathBuf::from("./tests"),
            scratch_dir: PathBuf::from("./tmp"),
            filter: None,
            color: if atty::is(atty::Stream::Stdout) {
                ColorChoice::Auto
            } else {
                ColorChoice::Never
            },
        }
    }
}
