use std::io::BufRead;

use anyhow::{Context, Result};
use serde_json::Value;

/// The JSON value parsed from one non-blank replay log line.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLineRecord {
    pub line_number: usize,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderCounts {
    pub lines_read: usize,
    pub blank_lines: usize,
    pub malformed_lines: usize,
    pub records_parsed: usize,
}

/// Lazily parses a newline-delimited JSON stream.
///
/// Lines are handled as raw bytes, so a line that is not valid JSON (invalid
/// UTF-8 included) is recorded in `warnings` and skipped; only a failure to
/// read from the underlying stream ends iteration with an error.
pub struct RecordReader<R> {
    input: R,
    buffer: Vec<u8>,
    line_number: usize,
    counts: ReaderCounts,
    warnings: Vec<String>,
    finished: bool,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            buffer: Vec::new(),
            line_number: 0,
            counts: ReaderCounts::default(),
            warnings: Vec::new(),
            finished: false,
        }
    }

    #[must_use]
    pub const fn counts(&self) -> ReaderCounts {
        self.counts
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    #[must_use]
    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }

    fn read_next_line(&mut self) -> Result<bool> {
        self.buffer.clear();
        let bytes = self
            .input
            .read_until(b'\n', &mut self.buffer)
            .with_context(|| format!("failed to read replay log line {}", self.line_number + 1))?;
        if bytes == 0 {
            return Ok(false);
        }

        self.line_number += 1;
        self.counts.lines_read += 1;
        Ok(true)
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<RawLineRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            match self.read_next_line() {
                Ok(true) => {}
                Ok(false) => {
                    self.finished = true;
                    return None;
                }
                Err(error) => {
                    self.finished = true;
                    return Some(Err(error));
                }
            }

            let trimmed = self.buffer.trim_ascii();
            if trimmed.is_empty() {
                self.counts.blank_lines += 1;
                continue;
            }

            match serde_json::from_slice::<Value>(trimmed) {
                Ok(value) => {
                    self.counts.records_parsed += 1;
                    return Some(Ok(RawLineRecord {
                        line_number: self.line_number,
                        value,
                    }));
                }
                Err(error) => {
                    self.counts.malformed_lines += 1;
                    self.warnings.push(format!(
                        "line {}: invalid JSON payload ({error})",
                        self.line_number
                    ));
                }
            }
        }

        None
    }
}
