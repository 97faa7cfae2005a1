//! Recorder and replay error types

use std::io;
use std::path::PathBuf;

use blinc_platform::PlatformError;
use thiserror::Error;

/// A replay log line that starts a record but does not follow the grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    /// 1-based line number in the log, 0 when parsing a detached line
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind) -> Self {
        Self { line: 0, kind }
    }

    /// Attach the log line number
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }
}

/// What went wrong while parsing a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("expected {expected}, found `{found}`")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
    },

    #[error("expected {expected}, found end of line")]
    UnexpectedEnd { expected: &'static str },

    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    #[error("field `{field}` is not allowed in `{kind}` records")]
    FieldNotAllowed {
        field: &'static str,
        kind: &'static str,
    },

    #[error("window {0} is outside the resource range")]
    WindowOutOfRange(i64),

    #[error("line does not start a record")]
    NotARecord,
}

/// Errors surfaced by the replay engine
#[derive(Error, Debug)]
pub enum ReplayError {
    /// Opening, reading or writing a log file failed
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The playback log is corrupt; the replay session has been aborted
    #[error("replay log corrupt: {0}")]
    Parse(#[from] ParseError),

    /// The display could not inject a replayed event; the session has been aborted
    #[error("event injection failed: {0}")]
    Platform(#[from] PlatformError),

    /// Invalid replay configuration
    #[error("invalid replay config: {0}")]
    Config(#[from] toml::de::Error),
}

impl ReplayError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for replay operations
pub type Result<T> = std::result::Result<T, ReplayError>;
