//! Comparisons behind the pass/fail decisions.
//!
//! Round-trip and query checks are byte-exact. List checks are containment
//! checks, not equality: the store may be shared across runs and hold keys
//! this harness never uploaded, so the presence phase only demands a
//! superset and the post-delete phase only demands an empty intersection.

use std::fs;
use std::path::Path;

use crate::errors::{HarnessError, Result};

/// Byte-exact comparison of `actual` against `reference`.
///
/// The reference (a fixture or an expected-result file) must be readable;
/// failing to read it is a harness error. The actual file is whatever the
/// store produced. If it is absent or unreadable the store produced nothing
/// usable, and that scores as a mismatch rather than aborting the run.
pub fn files_equal(reference: &Path, actual: &Path) -> Result<bool> {
    let want = fs::read(reference).map_err(|e| HarnessError::io(reference, e))?;
    match fs::read(actual) {
        Ok(got) => Ok(got == want),
        Err(_) => Ok(false),
    }
}

/// Uploaded keys absent from a listing. Empty means the superset property
/// holds.
pub fn missing_keys(listed: &[String], uploaded: &[String]) -> Vec<String> {
    uploaded
        .iter()
        .filter(|key| !listed.contains(key))
        .cloned()
        .collect()
}

/// Uploaded keys still present in a post-delete listing. Empty means the
/// deletion property holds.
pub fn lingering_keys(listed: &[String], uploaded: &[String]) -> Vec<String> {
    uploaded
        .iter()
        .filter(|key| listed.contains(key))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn identical_files_compare_equal() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, b"id,v\n1,10\n").unwrap();
        fs::write(&b, b"id,v\n1,10\n").unwrap();
        assert!(files_equal(&a, &b).unwrap());
    }

    #[test]
    fn differing_bytes_compare_unequal() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, b"id,v\n1,10\n").unwrap();
        fs::write(&b, b"id,v\n1,10").unwrap();
        assert!(!files_equal(&a, &b).unwrap());
    }

    #[test]
    fn absent_actual_scores_as_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        fs::write(&a, b"x").unwrap();
        assert!(!files_equal(&a, &dir.path().join("never-written")).unwrap());
    }

    #[test]
    fn absent_reference_is_a_harness_error() {
        let dir = tempfile::tempdir().unwrap();
        let b = dir.path().join("b");
        fs::write(&b, b"x").unwrap();
        let err = files_equal(&dir.path().join("gone"), &b).unwrap_err();
        assert!(matches!(err, HarnessError::Io { .. }));
    }

    #[test]
    fn superset_listing_has_no_missing_keys() {
        let listed = vec!["stray.csv".into(), "a.csv".into(), "b.parquet".into()];
        let uploaded = vec!["a.csv".into(), "b.parquet".into()];
        assert!(missing_keys(&listed, &uploaded).is_empty());
    }

    #[test]
    fn missing_keys_reports_only_uploaded_absentees() {
        let listed = vec!["a.csv".into()];
        let uploaded = vec!["a.csv".into(), "b.parquet".into()];
        assert_eq!(missing_keys(&listed, &uploaded), ["b.parquet"]);
    }

    #[test]
    fn unrelated_keys_do_not_linger() {
        let listed = vec!["stray.csv".into()];
        let uploaded = vec!["a.csv".into()];
        assert!(lingering_keys(&listed, &uploaded).is_empty());
    }

    #[test]
    fn undeleted_keys_linger() {
        let listed = vec!["a.csv".into(), "stray.csv".into()];
        let uploaded = vec!["a.csv".into(), "b.parquet".into()];
        assert_eq!(lingering_keys(&listed, &uploaded), ["a.csv"]);
    }
}
