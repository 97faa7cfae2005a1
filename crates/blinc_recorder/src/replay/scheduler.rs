//! Playback scheduler.
//!
//! Reads records ahead from a replay log, decides when the head record is
//! due against the replay clock and injects it through the display. Key and
//! button injections block the scheduler until their echo is observed;
//! motions are fire-and-forget; structural records wait for the window they
//! name to exist.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use blinc_platform::{Display, EventType, NativeEvent};

use super::clock::ReplayClock;
use super::correlator::{Correlation, EchoCorrelator};
use crate::error::Result;
use crate::log::{LogReader, ReadStatus};
use crate::record::{EventClass, EventRecord};

/// Current state of playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// No playback in progress.
    Idle,
    /// Queue empty, more of the log to read.
    Reading,
    /// Head record not yet due.
    Armed,
    /// Head record due for injection.
    Due,
    /// Waiting for the echo of an injected event (or a structural barrier).
    AwaitingEcho,
}

/// Result of one scheduler tick.
#[derive(Debug, Default)]
pub struct TickOutcome {
    /// How long the caller may block before the next tick is needed
    pub timeout: Option<Duration>,
    /// Events injected during this tick, in order
    pub injected: Vec<NativeEvent>,
}

/// Drives injection of queued records.
pub struct PlaybackScheduler {
    reader: Option<LogReader>,
    queue: VecDeque<EventRecord>,
    clock: Option<ReplayClock>,
    echo: EchoCorrelator,
    read_ahead: usize,
    injected: u64,
}

impl PlaybackScheduler {
    pub fn new(read_ahead: usize) -> Self {
        Self {
            reader: None,
            queue: VecDeque::new(),
            clock: None,
            echo: EchoCorrelator::new(),
            read_ahead: read_ahead.max(1),
            injected: 0,
        }
    }

    /// Begin playback of `reader` with log time 0 at `clock.anchor()`.
    pub fn start(&mut self, reader: LogReader, clock: ReplayClock) {
        self.stop();
        tracing::info!(
            "replay started: {} at {}x",
            reader.path().display(),
            clock.speed()
        );
        self.reader = Some(reader);
        self.clock = Some(clock);
    }

    /// Abandon playback, discarding queued records and pending echoes.
    pub fn stop(&mut self) {
        if self.is_active() {
            tracing::info!("replay stopped after {} injected events", self.injected);
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.reader = None;
        self.queue.clear();
        self.clock = None;
        self.echo.reset();
        self.injected = 0;
    }

    /// Whether playback is in progress
    pub fn is_active(&self) -> bool {
        self.reader.is_some() || !self.queue.is_empty() || self.echo.is_waiting()
    }

    /// Records read ahead and not yet confirmed
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Events injected since playback started
    pub fn injected(&self) -> u64 {
        self.injected
    }

    pub fn clock(&self) -> Option<&ReplayClock> {
        self.clock.as_ref()
    }

    pub fn state(&self, now: Instant) -> PlaybackState {
        if self.echo.is_waiting() {
            return PlaybackState::AwaitingEcho;
        }
        match (self.queue.front(), self.clock) {
            (Some(head), Some(clock)) => {
                if head.class() == EventClass::Structural || clock.is_due(head.time, now) {
                    PlaybackState::Due
                } else {
                    PlaybackState::Armed
                }
            }
            _ if self.reader.is_some() => PlaybackState::Reading,
            _ => PlaybackState::Idle,
        }
    }

    /// Run the scheduler before the caller blocks.
    ///
    /// Injects every record that is due, stopping at the first one that has
    /// to wait for an echo. On error the session is aborted.
    pub fn tick<D: Display>(&mut self, now: Instant, display: &mut D) -> Result<TickOutcome> {
        let mut outcome = TickOutcome::default();
        match self.advance(now, display, &mut outcome) {
            Ok(()) => Ok(outcome),
            Err(err) => {
                tracing::warn!("replay aborted: {}", err);
                self.reset();
                Err(err)
            }
        }
    }

    fn advance<D: Display>(
        &mut self,
        now: Instant,
        display: &mut D,
        outcome: &mut TickOutcome,
    ) -> Result<()> {
        let Some(clock) = self.clock else {
            return Ok(());
        };

        while !self.echo.is_waiting() {
            if self.queue.is_empty() && !self.fill()? {
                self.finish();
                return Ok(());
            }
            let Some(head) = self.queue.front() else {
                continue;
            };

            if head.class() == EventClass::Structural {
                match head.window {
                    Some(window) if !display.window_exists(window) => {
                        tracing::debug!("waiting for {} on {}", head.kind(), window);
                        self.echo.expect_barrier(head, window);
                    }
                    _ => {
                        tracing::trace!("barrier {} satisfied", head.kind());
                        self.queue.pop_front();
                    }
                }
                continue;
            }

            if let Some(remaining) = clock.until(head.time, now) {
                outcome.timeout = Some(remaining);
                return Ok(());
            }

            let Some(event) = head.to_native(display.root_window()) else {
                self.queue.pop_front();
                continue;
            };
            if matches!(
                event.event_type,
                EventType::ButtonPress | EventType::ButtonRelease | EventType::MotionNotify
            ) {
                display.warp_pointer(event.window, event.x, event.y)?;
            }
            display.send_event(&event)?;
            display.flush()?;
            self.injected += 1;
            tracing::debug!(
                "injected {} on {} at {}ms",
                head.kind(),
                event.window,
                head.time
            );

            if head.class() == EventClass::Motion {
                self.echo.expect_motion(event.window);
                self.queue.pop_front();
            } else {
                self.echo.expect_echo(&event);
            }
            outcome.injected.push(event);
        }

        Ok(())
    }

    /// Read the next batch. Returns `false` when nothing is left to play.
    fn fill(&mut self) -> Result<bool> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(false);
        };
        if reader.read_batch(self.read_ahead, &mut self.queue)? == ReadStatus::Eof {
            tracing::info!(
                "end of replay log {} ({} lines, {} skipped)",
                reader.path().display(),
                reader.line_number(),
                reader.skipped()
            );
            self.reader = None;
        }
        Ok(!self.queue.is_empty())
    }

    /// End of log. Pending motion echoes stay tracked since they can arrive
    /// after the last record was injected.
    fn finish(&mut self) {
        if self.clock.is_some() {
            tracing::info!("replay finished: {} events injected", self.injected);
        }
        self.reader = None;
        self.queue.clear();
        self.clock = None;
    }

    /// Check a live event against the pending echo, popping the queue head
    /// when it confirms the head record.
    pub fn observe(&mut self, event: &NativeEvent) -> Correlation {
        let correlation = self.echo.observe(event);
        match correlation {
            Correlation::Echo | Correlation::Barrier => {
                if let Some(record) = self.queue.pop_front() {
                    tracing::debug!("confirmed {} on {}", record.kind(), event.window);
                }
                if self.queue.is_empty() && self.reader.is_none() {
                    self.finish();
                }
            }
            Correlation::MotionEcho | Correlation::Unrelated => {}
        }
        correlation
    }
}

impl Default for PlaybackScheduler {
    fn default() -> Self {
        Self::new(1)
    }
}
