//! Replay log format.
//!
//! One record per line, as a small s-expression:
//!
//! ```text
//! (button_press (window 3) (time 50) (xy 10 10) (state 0) (button 1))
//! (map_notify (window 3))
//! ```
//!
//! This module provides:
//! - `Tokenizer` - Splits a line into parentheses, keywords and symbols
//! - `Parser` - Builds an `EventRecord` from one line
//! - `Recorder` - Appends live events to a log
//! - `LogReader` - Reads a log back in batches for playback

mod parser;
mod reader;
mod tokenizer;
mod writer;

pub use parser::{parse, Parser};
pub use reader::{LogReader, ReadStatus};
pub use tokenizer::{Field, Token, Tokenizer};
pub use writer::Recorder;
