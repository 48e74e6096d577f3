//! Outcome tally and run reporting.
//!
//! The reporter is the only mutable state shared across verification steps.
//! Every check lands here exactly once, as a `pass` or a `fail`; purely
//! informational notes (skipped query cases, fixtures without queries) go
//! through `info` and are not counted. Lines print as they happen and are
//! buffered for programmatic inspection, so verification code never writes
//! to the terminal itself.

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use std::io::Write;

pub struct Reporter {
    stream: StandardStream,
    successes: usize,
    failures: usize,
    log: Vec<String>,
}

impl Reporter {
    pub fn new(color: ColorChoice) -> Self {
        Self {
            stream: StandardStream::stdout(color),
            successes: 0,
            failures: 0,
            log: Vec::new(),
        }
    }

    /// Records and prints a passing check.
    pub fn pass(&mut self, line: &str) {
        self.successes += 1;
        self.emit("PASS", Some(Color::Green), line);
    }

    /// Records and prints a failing check.
    pub fn fail(&mut self, line: &str) {
        self.failures += 1;
        self.emit("FAIL", Some(Color::Red), line);
    }

    /// Prints an informational line; not counted in the tally.
    pub fn info(&mut self, line: &str) {
        self.emit("note", Some(Color::Yellow), line);
    }

    /// Prints a line diff of a text mismatch, indented under the preceding
    /// FAIL line.
    pub fn text_diff(&mut self, expected: &str, actual: &str) {
        let changeset = Changeset::new(expected, actual, "\n");
        for diff in &changeset.diffs {
            match diff {
                Difference::Same(block) => {
                    let _ = self.stream.reset();
                    for line in block.lines() {
                        let _ = writeln!(self.stream, "    {line}");
                    }
                }
                Difference::Rem(block) => {
                    let _ = self
                        .stream
                        .set_color(ColorSpec::new().set_fg(Some(Color::Green)));
                    for line in block.lines() {
                        let _ = writeln!(self.stream, "  - {line}");
                    }
                }
                Difference::Add(block) => {
                    let _ = self
                        .stream
                        .set_color(ColorSpec::new().set_fg(Some(Color::Red)));
                    for line in block.lines() {
                        let _ = writeln!(self.stream, "  + {line}");
                    }
                }
            }
        }
        let _ = self.stream.reset();
    }

    /// Prints the final counters.
    pub fn summary(&mut self) {
        let line = format!("Summary: {} passed, {} failed", self.successes, self.failures);
        let _ = writeln!(self.stream);
        let _ = writeln!(self.stream, "{line}");
        self.log.push(line);
    }

    pub fn successes(&self) -> usize {
        self.successes
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Everything reported so far, one entry per line, tags included.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    fn emit(&mut self, tag: &str, color: Option<Color>, line: &str) {
        let _ = self
            .stream
            .set_color(ColorSpec::new().set_fg(color).set_bold(true));
        let _ = write!(self.stream, "{tag}");
        let _ = self.stream.reset();
        let _ = writeln!(self.stream, ": {line}");
        self.log.push(format!("{tag}: {line}"));
    }
}
