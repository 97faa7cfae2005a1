//! Blinc Recorder
//!
//! Event capture and deterministic replay for native display sessions:
//!
//! - **Recording**: live events written to a line-oriented log
//! - **Playback**: log records injected back at their recorded pace, each
//!   key and button injection confirmed by its echo before moving on
//! - **Clicks**: double and triple click synthesis over the button stream
//!
//! # Example
//!
//! ```ignore
//! use blinc_recorder::ReplayEngine;
//!
//! let mut engine = ReplayEngine::new(display);
//! engine.start_playback("session.log")?;
//!
//! loop {
//!     let timeout = engine.on_poll_tick(Instant::now())?;
//!     for event in wait_for_events(timeout) {
//!         engine.dispatch_live(event)?;
//!     }
//!     while let Some(event) = engine.next_event() {
//!         app.handle(event);
//!     }
//! }
//! ```

pub mod click;
pub mod config;
pub mod engine;
pub mod error;
pub mod log;
pub mod record;
pub mod replay;
pub mod testing;

pub use click::ClickCounter;
pub use config::ReplayConfig;
pub use engine::{EventDisposition, ReplayEngine};
pub use error::{ParseError, ParseErrorKind, ReplayError, Result};
pub use log::{LogReader, Parser, Recorder};
pub use record::{EventClass, EventKind, EventRecord, Pointer, RecordBody, WindowBase};
pub use replay::{merge_timeout, PlaybackState};
