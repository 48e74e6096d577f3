//! Fixture and query-case discovery.
//!
//! A fixture is a tabular data file directly under the fixture directory,
//! named `<stem>.csv` (row-oriented text) or `<stem>.parquet` (columnar
//! binary). Its file name, extension included, is used verbatim as the store
//! key. Query cases ride alongside by naming convention: `<stem>.query<N>`
//! holds the SQL text for case `N` (1-indexed, contiguous) and
//! `<stem>.result<N>` holds the expected output in the fixture's own
//! encoding.
//!
//! The two companion files are not symmetric. The query files define how far
//! the sequence extends: the first index whose query file is absent (or
//! empty) ends the scan, and later indices are never probed. A result file,
//! by contrast, is independently optional; a query file without its result
//! file yields a [`QueryScan::MissingResult`] marker and the scan moves on.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::{HarnessError, Result, MAX_KEY_LEN};

/// The two tabular encodings a fixture may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Row-oriented text table.
    Csv,
    /// Columnar binary table.
    Parquet,
}

impl TableFormat {
    pub fn extension(self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Parquet => "parquet",
        }
    }

    /// The value passed to the store's `--input_format`/`--output_format`.
    pub fn format_arg(self) -> &'static str {
        self.extension()
    }

    /// True for encodings whose content is human-readable text, which the
    /// reporter may diff line by line on mismatch.
    pub fn is_text(self) -> bool {
        matches!(self, TableFormat::Csv)
    }
}

/// A discovered data file, identified by the file name it will be stored
/// under.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub path: PathBuf,
    /// Store key: the full file name, including extension.
    pub key: String,
    pub format: TableFormat,
}

impl Fixture {
    /// File name without the format extension; the prefix query and result
    /// files share.
    pub fn stem(&self) -> &str {
        self.key
            .strip_suffix(self.format.extension())
            .and_then(|s| s.strip_suffix('.'))
            .unwrap_or(&self.key)
    }
}

/// One complete (query text, expected result) pair.
#[derive(Debug, Clone)]
pub struct QueryCase {
    /// 1-based position in the fixture's sequence.
    pub index: u32,
    pub sql: String,
    pub expected: PathBuf,
}

/// One step of the query-case scan.
#[derive(Debug, Clone)]
pub enum QueryScan {
    Case(QueryCase),
    /// The query file exists but its result file does not. Skipped, not
    /// failed; the scan continues at the next index.
    MissingResult { index: u32 },
}

/// Enumerates fixtures directly under `dir`: the CSV class first, then the
/// Parquet class, each sorted by file name for a deterministic run order.
///
/// Every data file in the directory is checked against the key-length limit
/// before `filter` is applied, so a misnamed fixture aborts the run even when
/// a filter would have excluded it.
pub fn discover_fixtures(dir: &Path, filter: Option<&str>) -> Result<Vec<Fixture>> {
    let mut fixtures = Vec::new();
    for format in [TableFormat::Csv, TableFormat::Parquet] {
        let mut class = fixtures_of(dir, format)?;
        class.sort_by(|a, b| a.key.cmp(&b.key));
        fixtures.extend(class);
    }
    if let Some(needle) = filter {
        fixtures.retain(|f| f.key.contains(needle));
    }
    Ok(fixtures)
}

fn fixtures_of(dir: &Path, format: TableFormat) -> Result<Vec<Fixture>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| HarnessError::FixtureScan {
            dir: dir.to_path_buf(),
            source: e,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path
            .extension()
            .is_some_and(|ext| ext == format.extension())
        {
            let key = entry.file_name().to_string_lossy().into_owned();
            if key.len() > MAX_KEY_LEN {
                return Err(HarnessError::KeyTooLong {
                    len: key.len(),
                    key,
                });
            }
            found.push(Fixture {
                path: path.to_path_buf(),
                key,
                format,
            });
        }
    }
    Ok(found)
}

/// Walks the fixture's query sequence starting at index 1.
///
/// Stops at the first index whose query file is absent or empty; an empty
/// returned vector therefore means the fixture has no queries at all. A
/// present query file with no result file produces a `MissingResult` marker
/// and does not stop the scan.
pub fn scan_query_cases(dir: &Path, fixture: &Fixture) -> Vec<QueryScan> {
    let stem = fixture.stem();
    let mut cases = Vec::new();
    for index in 1u32.. {
        let query_path = dir.join(format!("{stem}.query{index}"));
        let sql = match fs::read_to_string(&query_path) {
            Ok(text) if !text.is_empty() => text,
            // Absent or empty: the sequence ends here.
            _ => break,
        };
        let expected = dir.join(format!("{stem}.result{index}"));
        if expected.is_file() {
            cases.push(QueryScan::Case(QueryCase {
                index,
                sql,
                expected,
            }));
        } else {
            cases.push(QueryScan::MissingResult { index });
        }
    }
    cases
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn discovers_csv_class_before_parquet_class() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "z.csv", "id\n1\n");
        touch(dir.path(), "a.parquet", "PAR1");
        touch(dir.path(), "b.csv", "id\n2\n");
        touch(dir.path(), "notes.txt", "ignored");

        let fixtures = discover_fixtures(dir.path(), None).unwrap();
        let keys: Vec<_> = fixtures.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, ["b.csv", "z.csv", "a.parquet"]);
        assert_eq!(fixtures[2].format, TableFormat::Parquet);
    }

    #[test]
    fn filter_restricts_by_substring() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "orders.csv", "x\n");
        touch(dir.path(), "users.csv", "x\n");

        let fixtures = discover_fixtures(dir.path(), Some("ord")).unwrap();
        assert_eq!(fixtures.len(), 1);
        assert_eq!(fixtures[0].key, "orders.csv");
    }

    #[test]
    fn key_over_sixteen_chars_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // 13-char stem + ".csv" = 17 characters.
        touch(dir.path(), "abcdefghijklm.csv", "x\n");

        let err = discover_fixtures(dir.path(), None).unwrap_err();
        assert!(matches!(
            err,
            HarnessError::KeyTooLong { len: 17, .. }
        ));
    }

    #[test]
    fn key_length_checked_even_for_filtered_out_fixtures() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "ok.csv", "x\n");
        touch(dir.path(), "abcdefghijklm.csv", "x\n");

        let err = discover_fixtures(dir.path(), Some("ok")).unwrap_err();
        assert!(matches!(err, HarnessError::KeyTooLong { .. }));
    }

    #[test]
    fn exactly_sixteen_chars_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "abcdefghijkl.csv", "x\n");

        let fixtures = discover_fixtures(dir.path(), None).unwrap();
        assert_eq!(fixtures[0].key.len(), 16);
    }

    #[test]
    fn stem_strips_only_the_format_extension() {
        let f = Fixture {
            path: PathBuf::from("/fx/a.b.csv"),
            key: "a.b.csv".into(),
            format: TableFormat::Csv,
        };
        assert_eq!(f.stem(), "a.b");
    }

    #[test]
    fn missing_query_file_ends_the_sequence() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "t.csv", "id\n1\n");
        touch(dir.path(), "t.query1", "SELECT 1");
        touch(dir.path(), "t.result1", "1\n");
        // No t.query2; t.query3 must never be reached.
        touch(dir.path(), "t.query3", "SELECT 3");
        touch(dir.path(), "t.result3", "3\n");

        let fixture = &discover_fixtures(dir.path(), None).unwrap()[0];
        let cases = scan_query_cases(dir.path(), fixture);
        assert_eq!(cases.len(), 1);
        assert!(matches!(&cases[0], QueryScan::Case(c) if c.index == 1));
    }

    #[test]
    fn empty_query_file_ends_the_sequence() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "t.csv", "id\n1\n");
        touch(dir.path(), "t.query1", "");
        touch(dir.path(), "t.query2", "SELECT 2");
        touch(dir.path(), "t.result2", "2\n");

        let fixture = &discover_fixtures(dir.path(), None).unwrap()[0];
        let cases = scan_query_cases(dir.path(), fixture);
        assert!(cases.is_empty());
    }

    #[test]
    fn missing_result_file_skips_but_continues() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "t.csv", "id\n1\n");
        touch(dir.path(), "t.query1", "SELECT 1");
        // No t.result1.
        touch(dir.path(), "t.query2", "SELECT 2");
        touch(dir.path(), "t.result2", "2\n");

        let fixture = &discover_fixtures(dir.path(), None).unwrap()[0];
        let cases = scan_query_cases(dir.path(), fixture);
        assert_eq!(cases.len(), 2);
        assert!(matches!(&cases[0], QueryScan::MissingResult { index: 1 }));
        assert!(matches!(&cases[1], QueryScan::Case(c) if c.index == 2));
    }

    #[test]
    fn no_queries_yields_empty_scan() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "t.csv", "id\n1\n");

        let fixture = &discover_fixtures(dir.path(), None).unwrap()[0];
        assert!(scan_query_cases(dir.path(), fixture).is_empty());
    }
}
