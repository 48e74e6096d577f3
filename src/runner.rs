//! Phase orchestration for one acceptance run.
//!
//! Phases are strictly ordered and never retried. Per fixture: store, then
//! round-trip read-back, then the query cases in increasing index order.
//! After every fixture has been through that: one listing check (superset of
//! the uploaded keys), an existence check per key, a delete per key, and a
//! final listing check (no uploaded key may remain). A failed check never
//! blocks later phases; the only aborts are discovery preconditions and
//! harness-side errors.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::HarnessConfig;
use crate::discovery::{self, Fixture, QueryCase, QueryScan};
use crate::driver::{Existence, SutDriver};
use crate::errors::{HarnessError, Result};
use crate::report::Reporter;
use crate::verify;

pub struct Harness {
    config: HarnessConfig,
    driver: SutDriver,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Self {
        let driver = SutDriver::new(&config.sut_exe, &config.device);
        Self { config, driver }
    }

    /// Runs the full acceptance sequence against the configured store.
    ///
    /// Returns `Ok` even when checks fail; the tally lives in `reporter`.
    /// `Err` means the run itself could not proceed.
    pub fn run(&self, reporter: &mut Reporter) -> Result<()> {
        fs::create_dir_all(&self.config.scratch_dir)
            .map_err(|e| HarnessError::io(&self.config.scratch_dir, e))?;
        let fixtures = discovery::discover_fixtures(
            &self.config.fixture_dir,
            self.config.filter.as_deref(),
        )?;

        let mut uploaded: Vec<String> = Vec::new();
        for fixture in &fixtures {
            self.check_fixture(fixture, reporter)?;
            uploaded.push(fixture.key.clone());
        }

        self.check_presence(&uploaded, reporter)?;
        self.check_existence(&uploaded, reporter)?;
        for key in &uploaded {
            self.driver.delete(key)?;
        }
        self.check_removal(&uploaded, reporter)?;

        reporter.summary();
        Ok(())
    }

    /// Upload, round-trip, and query phases for one fixture.
    fn check_fixture(&self, fixture: &Fixture, reporter: &mut Reporter) -> Result<()> {
        self.driver.store(&fixture.key, &fixture.path)?;

        let scratch = self.scratch_path(fixture);
        self.driver.retrieve(&fixture.key, &scratch)?;
        if verify::files_equal(&fixture.path, &scratch)? {
            reporter.pass(&format!("read data for {} matches", fixture.key));
        } else {
            reporter.fail(&format!("read data for {} does not match", fixture.key));
            self.diff_if_text(fixture, &fixture.path, &scratch, reporter);
        }
        let _ = fs::remove_file(&scratch);

        let cases = discovery::scan_query_cases(&self.config.fixture_dir, fixture);
        if cases.is_empty() {
            reporter.info(&format!("no queries found for {}", fixture.key));
        }
        for scan in cases {
            match scan {
                QueryScan::MissingResult { index } => {
                    reporter.info(&format!("no result file for {} query {index}", fixture.key));
                }
                QueryScan::Case(case) => self.check_query(fixture, &case, reporter)?,
            }
        }
        Ok(())
    }

    /// One query case: run select, compare against the expected result.
    fn check_query(&self, fixture: &Fixture, case: &QueryCase, reporter: &mut Reporter) -> Result<()> {
        let scratch = self.scratch_path(fixture);
        self.driver
            .select(&fixture.key, &case.sql, fixture.format, &scratch)?;
        let label = format!(
            "query {} data for {} query {}",
            fixture.format.format_arg(),
            fixture.key,
            case.index
        );
        if verify::files_equal(&case.expected, &scratch)? {
            reporter.pass(&format!("{label} matches"));
        } else {
            reporter.fail(&format!("{label} does not match"));
            self.diff_if_text(fixture, &case.expected, &scratch, reporter);
        }
        let _ = fs::remove_file(&scratch);
        Ok(())
    }

    /// Listing must contain every uploaded key; unrelated keys are fine.
    fn check_presence(&self, uploaded: &[String], reporter: &mut Reporter) -> Result<()> {
        let listed = self.driver.list(None)?;
        let missing = verify::missing_keys(&listed, uploaded);
        if missing.is_empty() {
            reporter.pass("list contains all uploaded keys");
        } else {
            reporter.fail(&format!(
                "list is missing uploaded keys: {}",
                missing.join(", ")
            ));
        }
        Ok(())
    }

    /// Every uploaded key must answer an explicit "exists".
    fn check_existence(&self, uploaded: &[String], reporter: &mut Reporter) -> Result<()> {
        for key in uploaded {
            match self.driver.exists(key)? {
                Existence::Exists => reporter.pass(&format!("existence check for {key}")),
                Existence::Missing => {
                    reporter.fail(&format!("existence check for {key}: store reports missing"));
                }
                Existence::Indeterminate => {
                    reporter.fail(&format!("existence check for {key}: no recognizable answer"));
                }
            }
        }
        Ok(())
    }

    /// After deleting every uploaded key, none may remain in the listing.
    fn check_removal(&self, uploaded: &[String], reporter: &mut Reporter) -> Result<()> {
        let listed = self.driver.list(None)?;
        let lingering = verify::lingering_keys(&listed, uploaded);
        if lingering.is_empty() {
            reporter.pass("uploaded keys absent from list after delete");
        } else {
            reporter.fail(&format!(
                "keys still listed after delete: {}",
                lingering.join(", ")
            ));
        }
        Ok(())
    }

    fn scratch_path(&self, fixture: &Fixture) -> PathBuf {
        self.config.scratch_dir.join(&fixture.key)
    }

    /// On a text-format mismatch, show what changed line by line. Binary
    /// formats get no diff; the FAIL line already names the artifacts.
    fn diff_if_text(
        &self,
        fixture: &Fixture,
        reference: &Path,
        actual: &Path,
        reporter: &mut Reporter,
    ) {
        if !fixture.format.is_text() {
            return;
        }
        let want = fs::read(reference).unwrap_or_default();
        let got = fs::read(actual).unwrap_or_default();
        reporter.text_diff(
            &String::from_utf8_lossy(&want),
            &String::from_utf8_lossy(&got),
        );
    }
}
