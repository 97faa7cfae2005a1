//! Replay engine
//!
//! `ReplayEngine` owns every piece of capture and playback state for one
//! display connection. The surrounding event loop calls two hooks:
//!
//! - [`ReplayEngine::on_poll_tick`] before each blocking wait, to inject due
//!   records and learn how long it may block
//! - [`ReplayEngine::on_live_event`] (or [`ReplayEngine::dispatch_live`]) for
//!   every event read from the display
//!
//! Events meant for the application are queued on a put-back queue that the
//! loop drains with [`ReplayEngine::next_event`] before reading the display
//! again.
//!
//! Injected events carry log-relative times while live events carry server
//! times, so replayed and live presses are counted in separate click
//! histories. The replayed history starts empty with each playback.

use std::collections::VecDeque;
use std::path::Path;
use std::time::{Duration, Instant};

use blinc_platform::{Display, NativeEvent};
use smallvec::{smallvec, SmallVec};

use crate::click::ClickCounter;
use crate::config::ReplayConfig;
use crate::error::Result;
use crate::log::{LogReader, Parser, Recorder};
use crate::record::WindowBase;
use crate::replay::{PlaybackScheduler, PlaybackState, ReplayClock};

/// What the engine decided about a live event.
#[derive(Clone, Debug, PartialEq)]
pub enum EventDisposition {
    /// Echo of an injected event, hidden from the application
    Echo,
    /// Deliver the event unchanged
    Deliver(NativeEvent),
    /// Deliver the event, followed by a synthesized click event
    DeliverWithClick {
        event: NativeEvent,
        click: NativeEvent,
    },
}

impl EventDisposition {
    pub fn is_echo(&self) -> bool {
        matches!(self, Self::Echo)
    }

    /// Events to hand to the application, in delivery order
    pub fn into_events(self) -> SmallVec<[NativeEvent; 2]> {
        match self {
            Self::Echo => SmallVec::new(),
            Self::Deliver(event) => smallvec![event],
            Self::DeliverWithClick { event, click } => smallvec![event, click],
        }
    }
}

/// Capture and deterministic replay of native display events.
pub struct ReplayEngine<D: Display> {
    display: D,
    config: ReplayConfig,
    base: WindowBase,
    recorder: Option<Recorder>,
    scheduler: PlaybackScheduler,
    clicks: ClickCounter,
    replay_clicks: ClickCounter,
    put_back: VecDeque<NativeEvent>,
}

impl<D: Display> ReplayEngine<D> {
    pub fn new(display: D) -> Self {
        Self::with_config(display, ReplayConfig::default())
    }

    pub fn with_config(display: D, config: ReplayConfig) -> Self {
        let base = WindowBase(config.window_base.unwrap_or_else(|| display.window_base()));
        tracing::debug!("replay engine window base {:#x}", base.0);
        Self {
            scheduler: PlaybackScheduler::new(config.read_ahead()),
            clicks: ClickCounter::new(config.double_click_ms, config.triple_click_ms),
            replay_clicks: ClickCounter::new(config.double_click_ms, config.triple_click_ms),
            display,
            config,
            base,
            recorder: None,
            put_back: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Offset applied to window ids in log files
    pub fn window_base(&self) -> WindowBase {
        self.base
    }

    // =========================================================================
    // Recording
    // =========================================================================

    /// Start writing live events to `path`, replacing any active recording.
    pub fn start_recording(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.stop_recording()?;
        let recorder = Recorder::create(path, self.base)?;
        tracing::info!("recording to {}", recorder.path().display());
        self.recorder = Some(recorder);
        Ok(())
    }

    /// Flush and close the recording, if one is active.
    pub fn stop_recording(&mut self) -> Result<()> {
        let Some(recorder) = self.recorder.take() else {
            return Ok(());
        };
        tracing::info!(
            "recording stopped: {} events written to {}",
            recorder.written(),
            recorder.path().display()
        );
        recorder.finish()
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    // =========================================================================
    // Playback
    // =========================================================================

    /// Start replaying `path`, with log time 0 at the current instant.
    pub fn start_playback(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.start_playback_at(path, Instant::now())
    }

    /// Start replaying `path`, with log time 0 at `start`.
    pub fn start_playback_at(&mut self, path: impl AsRef<Path>, start: Instant) -> Result<()> {
        let reader = LogReader::open(path, Parser::new(self.base))?;
        let clock = ReplayClock::new(start).with_speed(self.config.playback_speed);
        self.scheduler.start(reader, clock);
        self.replay_clicks.reset();
        Ok(())
    }

    /// Abandon playback; queued records and pending echoes are discarded.
    pub fn stop_playback(&mut self) {
        self.scheduler.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler.is_active()
    }

    pub fn playback_state(&self, now: Instant) -> PlaybackState {
        self.scheduler.state(now)
    }

    /// Events injected since playback started
    pub fn injected(&self) -> u64 {
        self.scheduler.injected()
    }

    // =========================================================================
    // Event loop hooks
    // =========================================================================

    /// Inject every due record and return how long the caller may block.
    ///
    /// Returns `Some(Duration::ZERO)` while the put-back queue holds events,
    /// and `None` when the engine has no reason to wake the loop. A grammar
    /// or display error aborts playback and is returned.
    pub fn on_poll_tick(&mut self, now: Instant) -> Result<Option<Duration>> {
        let outcome = self.scheduler.tick(now, &mut self.display)?;
        for event in outcome.injected {
            let click = self.replay_clicks.process(&event);
            self.put_back.push_back(event);
            self.put_back.extend(click);
        }
        if !self.put_back.is_empty() {
            return Ok(Some(Duration::ZERO));
        }
        Ok(outcome.timeout)
    }

    /// Classify one event read from the display.
    ///
    /// Every event is recorded while a recording is active, echoes included.
    /// A failed write ends the recording and is returned.
    pub fn on_live_event(&mut self, event: NativeEvent) -> Result<EventDisposition> {
        if let Some(recorder) = self.recorder.as_mut() {
            if let Err(err) = recorder.record(&event) {
                tracing::warn!("recording aborted: {}", err);
                self.recorder = None;
                return Err(err);
            }
        }

        if self.scheduler.observe(&event).is_echo() {
            tracing::trace!("swallowed echo {:?} on {}", event.event_type, event.window);
            return Ok(EventDisposition::Echo);
        }

        Ok(match self.clicks.process(&event) {
            Some(click) => EventDisposition::DeliverWithClick { event, click },
            None => EventDisposition::Deliver(event),
        })
    }

    /// Run `on_live_event` and queue whatever should reach the application.
    pub fn dispatch_live(&mut self, event: NativeEvent) -> Result<()> {
        let disposition = self.on_live_event(event)?;
        self.put_back.extend(disposition.into_events());
        Ok(())
    }

    /// Next event for the application, if one is queued.
    pub fn next_event(&mut self) -> Option<NativeEvent> {
        self.put_back.pop_front()
    }

    /// Whether `next_event` would return an event
    pub fn has_pending(&self) -> bool {
        !self.put_back.is_empty()
    }

    /// Stop playback and close the recording.
    pub fn shutdown(&mut self) -> Result<()> {
        self.stop_playback();
        self.stop_recording()
    }
}

impl<D: Display> Drop for ReplayEngine<D> {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            tracing::warn!("replay engine shutdown failed: {}", err);
        }
    }
}
