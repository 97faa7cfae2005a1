//! Incremental reader for playback logs.

use std::collections::VecDeque;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{ReplayError, Result};
use crate::record::EventRecord;

use super::parser::Parser;

/// Outcome of a read-ahead batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadStatus {
    /// More lines may follow
    More,
    /// The end of the log was reached
    Eof,
}

/// Reads a playback log a few records at a time.
pub struct LogReader<R = Box<dyn BufRead>> {
    path: PathBuf,
    input: R,
    parser: Parser,
    line_number: usize,
    skipped: usize,
    buf: String,
}

impl<R> fmt::Debug for LogReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogReader")
            .field("path", &self.path)
            .field("line_number", &self.line_number)
            .field("skipped", &self.skipped)
            .finish_non_exhaustive()
    }
}

impl LogReader {
    /// Open a log file for playback.
    pub fn open(path: impl AsRef<Path>, parser: Parser) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| ReplayError::io(&path, e))?;
        Ok(Self::from_reader(path, Box::new(BufReader::new(file)), parser))
    }
}

impl<R: BufRead> LogReader<R> {
    /// Read from any buffered source; `path` is only used in error messages.
    pub fn from_reader(path: impl Into<PathBuf>, input: R, parser: Parser) -> Self {
        Self {
            path: path.into(),
            input,
            parser,
            line_number: 0,
            skipped: 0,
            buf: String::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines read so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Lines that did not hold a known record
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Parse the next record, skipping blank lines and unknown kinds.
    pub fn next_record(&mut self) -> Result<Option<EventRecord>> {
        loop {
            self.buf.clear();
            let read = self
                .input
                .read_line(&mut self.buf)
                .map_err(|e| ReplayError::io(&self.path, e))?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let parsed = self
                .parser
                .parse_line(&self.buf)
                .map_err(|e| e.at_line(self.line_number))?;
            match parsed {
                Some(record) => return Ok(Some(record)),
                None => {
                    if !self.buf.trim().is_empty() {
                        self.skipped += 1;
                        tracing::trace!(
                            "skipping unrecognized line {}: {}",
                            self.line_number,
                            self.buf.trim_end()
                        );
                    }
                }
            }
        }
    }

    /// Append up to `max` records to `queue`.
    pub fn read_batch(
        &mut self,
        max: usize,
        queue: &mut VecDeque<EventRecord>,
    ) -> Result<ReadStatus> {
        for _ in 0..max {
            match self.next_record()? {
                Some(record) => queue.push_back(record),
                None => return Ok(ReadStatus::Eof),
            }
        }
        Ok(ReadStatus::More)
    }
}

impl<R: BufRead> Iterator for LogReader<R> {
    type Item = Result<EventRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;
    use crate::record::{EventKind, WindowBase};
    use std::io::Cursor;

    fn reader(text: &str) -> LogReader<Cursor<Vec<u8>>> {
        LogReader::from_reader(
            "test.log",
            Cursor::new(text.as_bytes().to_vec()),
            Parser::new(WindowBase(0)),
        )
    }

    #[test]
    fn test_skips_blank_and_unknown_lines() {
        let mut log = reader("\n(wobble (window 1))\n(map_notify (window 2))\n\n");
        let record = log.next_record().unwrap().unwrap();
        assert_eq!(record.kind(), EventKind::MapNotify);
        assert_eq!(log.line_number(), 3);
        assert_eq!(log.skipped(), 1);
        assert!(log.next_record().unwrap().is_none());
    }

    #[test]
    fn test_batches() {
        let mut log = reader(
            "(map_notify (window 1))\n(map_notify (window 2))\n(map_notify (window 3))\n",
        );
        let mut queue = VecDeque::new();
        assert_eq!(log.read_batch(2, &mut queue).unwrap(), ReadStatus::More);
        assert_eq!(queue.len(), 2);
        assert_eq!(log.read_batch(2, &mut queue).unwrap(), ReadStatus::Eof);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_grammar_error_carries_line() {
        let mut log = reader("(map_notify (window 1))\n(button_press (window 5) (time))\n");
        assert!(log.next_record().unwrap().is_some());
        match log.next_record() {
            Err(ReplayError::Parse(err)) => {
                assert_eq!(err.line, 2);
                assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LogReader::open(dir.path().join("nope.log"), Parser::default()).unwrap_err();
        assert!(matches!(err, ReplayError::Io { .. }));
    }

    #[test]
    fn test_iterator() {
        let log = reader("(create_notify (window 1))\n(configure_notify (window 1))\n");
        let kinds: Vec<_> = log.map(|r| r.unwrap().kind()).collect();
        assert_eq!(kinds, vec![EventKind::CreateNotify, EventKind::ConfigureNotify]);
    }
}
