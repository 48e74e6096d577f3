//! Unified error type for the harness.
//!
//! Assertion failures (content mismatches, missing keys, and so on) are not
//! errors: they go through the [`Reporter`](crate::report::Reporter) tally and
//! the run continues. `HarnessError` is reserved for conditions that make the
//! run itself meaningless, such as a misauthored fixture tree or a harness
//! that cannot reach its subject.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Maximum length of a store key, and therefore of a fixture file name.
pub const MAX_KEY_LEN: usize = 16;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    /// A fixture file name is too long to be used as a store key. This is a
    /// fixture-authoring defect, never a defect of the subject under test,
    /// and it aborts the run before any store invocation.
    #[error(
        "fixture file name `{key}` is {len} characters long; store keys are limited to {max}",
        max = MAX_KEY_LEN
    )]
    #[diagnostic(
        code(kvcheck::key_too_long),
        help("rename the fixture so its full file name (including extension) fits in 16 characters")
    )]
    KeyTooLong { key: String, len: usize },

    /// The fixture directory could not be scanned.
    #[error("failed to scan fixture directory `{dir}`")]
    #[diagnostic(code(kvcheck::fixture_scan))]
    FixtureScan {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A file the harness itself needs (a fixture, an expected result, the
    /// scratch directory) could not be read or created.
    #[error("failed to access `{path}`")]
    #[diagnostic(code(kvcheck::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store executable could not be launched at all. Exit codes of a
    /// launched store are deliberately ignored; this variant only covers the
    /// process never starting.
    #[error("failed to launch store executable `{exe}`")]
    #[diagnostic(
        code(kvcheck::sut_launch),
        help("point --sut-exe (or KVCHECK_SUT_EXE) at the store binary under test")
    )]
    SutLaunch {
        exe: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HarnessError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
