//! Replay engine for recorded sessions.
//!
//! This module provides:
//! - `ReplayClock` - Maps wall time onto log time, at a chosen speed
//! - `PlaybackScheduler` - Reads records ahead and injects them when due
//! - `EchoCorrelator` - Holds the scheduler back until injected events echo
//!
//! # Example
//!
//! ```ignore
//! use blinc_recorder::replay::merge_timeout;
//!
//! // Before every blocking wait:
//! let timeout = engine.on_poll_tick(Instant::now())?;
//! let timeout = merge_timeout(timeout, idle_timer);
//! ```

mod clock;
mod correlator;
mod scheduler;

use std::time::Duration;

pub use clock::ReplayClock;
pub use correlator::{Correlation, EchoCorrelator};
pub use scheduler::{PlaybackScheduler, PlaybackState, TickOutcome};

/// Combine two wait timeouts, keeping the earliest wake-up.
///
/// `None` means "no timeout" and never wins over a finite one.
pub fn merge_timeout(a: Option<Duration>, b: Option<Duration>) -> Option<Duration> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_timeout() {
        let short = Some(Duration::from_millis(5));
        let long = Some(Duration::from_millis(50));
        assert_eq!(merge_timeout(short, long), short);
        assert_eq!(merge_timeout(long, short), short);
        assert_eq!(merge_timeout(None, long), long);
        assert_eq!(merge_timeout(short, None), short);
        assert_eq!(merge_timeout(None, None), None);
    }
}
