//! Driver for the store under test.
//!
//! Each of the six operations is one blocking invocation of the store
//! binary: `EXE DEVICE COMMAND [OPTION]...`. Both output streams are
//! captured; the process exit status is deliberately never inspected. A
//! store that exits abnormally but leaves partial output is scored on that
//! output downstream, the same as any other run. The only hard failure here
//! is the executable not launching at all.
//!
//! `list` and `exists` answer through free-form diagnostic text rather than
//! a structured channel. The two parsers at the bottom of this module are
//! the single place that knows the store's log format; nothing outside them
//! matches on raw store output.

use std::path::{Path, PathBuf};
use std::process::Command;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::discovery::TableFormat;
use crate::errors::{HarnessError, Result};

/// Captured output streams of one store invocation.
#[derive(Debug, Clone)]
pub struct Captured {
    pub stdout: String,
    pub stderr: String,
}

impl Captured {
    /// The text searched for diagnostic markers: stderr first (where the
    /// store's logging layer writes), then stdout (where the store itself
    /// prints).
    pub fn diagnostic_text(&self) -> String {
        let mut text = self.stderr.clone();
        if !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&self.stdout);
        text
    }
}

/// Answer of an existence check, as read out of the diagnostic text.
///
/// `Indeterminate` means neither marker appeared. Callers treat it as "not
/// confirmed present", distinct from an explicit `Missing`; it is never an
/// error by itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existence {
    Exists,
    Missing,
    Indeterminate,
}

/// Issues store operations against one device through one executable.
#[derive(Debug, Clone)]
pub struct SutDriver {
    exe: PathBuf,
    device: String,
}

impl SutDriver {
    pub fn new(exe: impl Into<PathBuf>, device: impl Into<String>) -> Self {
        Self {
            exe: exe.into(),
            device: device.into(),
        }
    }

    /// Uploads `file` under `key`.
    pub fn store(&self, key: &str, file: &Path) -> Result<Captured> {
        let mut cmd = self.base();
        cmd.args(["store", "--key", key, "--file"]).arg(file);
        self.capture(&mut cmd)
    }

    /// Downloads the content stored under `key` into `out`.
    pub fn retrieve(&self, key: &str, out: &Path) -> Result<Captured> {
        let mut cmd = self.base();
        cmd.args(["retrieve", "--key", key, "--file"]).arg(out);
        self.capture(&mut cmd)
    }

    /// Runs `sql` against the content stored under `key`, writing the result
    /// to `out` in the same encoding as the input, headers included on both
    /// sides.
    pub fn select(&self, key: &str, sql: &str, format: TableFormat, out: &Path) -> Result<Captured> {
        let mut cmd = self.base();
        cmd.args([
            "select",
            "--key",
            key,
            "--sql",
            sql,
            "--input_format",
            format.format_arg(),
            "--output_format",
            format.format_arg(),
            "--file",
        ])
        .arg(out)
        .args(["--use_csv_header_for_input", "--use_csv_header_for_output"]);
        self.capture(&mut cmd)
    }

    /// Enumerates stored keys, optionally restricted to a prefix, as parsed
    /// from the invocation's diagnostic text.
    pub fn list(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        let mut cmd = self.base();
        cmd.args(["list", "--key", prefix.unwrap_or("")]);
        let captured = self.capture(&mut cmd)?;
        Ok(parse_key_listing(&captured.diagnostic_text()))
    }

    /// Asks whether `key` is stored.
    pub fn exists(&self, key: &str) -> Result<Existence> {
        let mut cmd = self.base();
        cmd.args(["exists", "--key", key]);
        let captured = self.capture(&mut cmd)?;
        Ok(parse_existence(&captured.diagnostic_text()))
    }

    /// Removes the entry stored under `key`.
    pub fn delete(&self, key: &str) -> Result<Captured> {
        let mut cmd = self.base();
        cmd.args(["delete", "--key", key]);
        self.capture(&mut cmd)
    }

    fn base(&self) -> Command {
        let mut cmd = Command::new(&self.exe);
        cmd.arg(&self.device);
        cmd
    }

    fn capture(&self, cmd: &mut Command) -> Result<Captured> {
        let output = cmd.output().map_err(|e| HarnessError::SutLaunch {
            exe: self.exe.clone(),
            source: e,
        })?;
        Ok(Captured {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

static KEY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"key\[\d+\]\s=\s(\S+)").expect("key listing pattern compiles"));

/// Extracts keys from listing output of the form `key[<idx>] = <key>`.
pub fn parse_key_listing(text: &str) -> Vec<String> {
    KEY_LINE
        .captures_iter(text)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Maps the existence markers onto the tri-state answer.
pub fn parse_existence(text: &str) -> Existence {
    if text.contains("Key exists.") {
        Existence::Exists
    } else if text.contains("Key does not exist.") {
        Existence::Missing
    } else {
        Existence::Indeterminate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keys_out_of_noisy_listing_output() {
        let text = "\
[2026-08-07 10:00:01.123] bdev_nvme: attached to Nvme1n1
key[0] = a.csv
key[1] = b.parquet
some unrelated line
key[2] = long_name.csv
";
        assert_eq!(
            parse_key_listing(text),
            ["a.csv", "b.parquet", "long_name.csv"]
        );
    }

    #[test]
    fn listing_without_markers_parses_to_nothing() {
        assert!(parse_key_listing("no keys here\n").is_empty());
    }

    #[test]
    fn existence_markers_map_to_tri_state() {
        assert_eq!(parse_existence("Key exists.\n"), Existence::Exists);
        assert_eq!(parse_existence("Key does not exist.\n"), Existence::Missing);
        assert_eq!(parse_existence("Unknown error.\n"), Existence::Indeterminate);
        assert_eq!(parse_existence(""), Existence::Indeterminate);
    }

    #[test]
    fn diagnostic_text_joins_stderr_before_stdout() {
        let captured = Captured {
            stdout: "Key exists.\n".into(),
            stderr: "starting app\n".into(),
        };
        let text = captured.diagnostic_text();
        assert!(text.starts_with("starting app\n"));
        assert_eq!(parse_existence(&text), Existence::Exists);
    }

    #[test]
    fn missing_executable_is_a_launch_error() {
        let driver = SutDriver::new("/no/such/kvcli-binary", "Nvme1n1");
        let err = driver.exists("a.csv").unwrap_err();
        assert!(matches!(err, HarnessError::SutLaunch { .. }));
    }
}
