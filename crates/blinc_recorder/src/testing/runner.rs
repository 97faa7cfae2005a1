//! Replay harness for deterministic tests.
//!
//! Drives a [`ReplayEngine`] over a [`HeadlessDisplay`] with a virtual
//! millisecond clock, so playback never sleeps and every run takes the same
//! path through the scheduler.

use std::path::Path;
use std::time::{Duration, Instant};

use blinc_platform::{NativeEvent, WindowId};

use super::headless::HeadlessDisplay;
use crate::config::ReplayConfig;
use crate::engine::ReplayEngine;
use crate::error::Result;
use crate::replay::PlaybackState;

/// Configuration for the replay harness.
#[derive(Clone, Debug)]
pub struct HarnessConfig {
    /// Engine configuration.
    pub replay: ReplayConfig,
    /// First resource id of the headless display.
    pub window_base: u64,
    /// Whether injected events echo back automatically.
    pub auto_echo: bool,
    /// Upper bound on loop iterations in `run_until_idle`.
    pub max_steps: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            replay: ReplayConfig::default(),
            window_base: 0x40_0000,
            auto_echo: true,
            max_steps: 10_000,
        }
    }
}

impl HarnessConfig {
    /// Set the engine configuration.
    pub fn with_replay(mut self, replay: ReplayConfig) -> Self {
        self.replay = replay;
        self
    }

    /// Set the display's window base.
    pub fn with_window_base(mut self, base: u64) -> Self {
        self.window_base = base;
        self
    }

    /// Enable or disable automatic echoes.
    pub fn with_auto_echo(mut self, enabled: bool) -> Self {
        self.auto_echo = enabled;
        self
    }

    /// Set the iteration bound.
    pub fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = steps;
        self
    }
}

/// A replay engine, a headless display and a virtual clock.
pub struct ReplayHarness {
    engine: ReplayEngine<HeadlessDisplay>,
    start: Instant,
    elapsed: Duration,
    delivered: Vec<NativeEvent>,
    max_steps: usize,
}

impl ReplayHarness {
    pub fn new(config: HarnessConfig) -> Self {
        let display = HeadlessDisplay::new(config.window_base).with_auto_echo(config.auto_echo);
        Self {
            engine: ReplayEngine::with_config(display, config.replay),
            start: Instant::now(),
            elapsed: Duration::ZERO,
            delivered: Vec::new(),
            max_steps: config.max_steps,
        }
    }

    pub fn engine(&self) -> &ReplayEngine<HeadlessDisplay> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ReplayEngine<HeadlessDisplay> {
        &mut self.engine
    }

    pub fn display(&self) -> &HeadlessDisplay {
        self.engine.display()
    }

    pub fn display_mut(&mut self) -> &mut HeadlessDisplay {
        self.engine.display_mut()
    }

    /// Register a window by its log id, relative to the window base.
    pub fn add_window(&mut self, log_id: i64) -> WindowId {
        let window = self
            .engine
            .window_base()
            .from_log(log_id)
            .unwrap_or(WindowId(self.engine.window_base().0));
        self.display_mut().add_window(window);
        window
    }

    /// Current virtual instant
    pub fn now(&self) -> Instant {
        self.start + self.elapsed
    }

    /// Virtual milliseconds since the harness was created
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }

    /// Move the virtual clock forward.
    pub fn advance(&mut self, by: Duration) {
        self.elapsed += by;
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Start recording to `path`.
    pub fn record(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.engine.start_recording(path)
    }

    /// Start playback of `path` at the current virtual instant.
    pub fn play(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let now = self.now();
        self.engine.start_playback_at(path, now)
    }

    pub fn state(&self) -> PlaybackState {
        self.engine.playback_state(self.now())
    }

    /// Run one poll tick at the current virtual instant.
    pub fn tick(&mut self) -> Result<Option<Duration>> {
        let now = self.now();
        self.engine.on_poll_tick(now)
    }

    /// Feed queued live events to the engine and collect what the
    /// application would receive. Returns the number of live events read.
    pub fn pump(&mut self) -> Result<usize> {
        let mut pumped = 0;
        while let Some(event) = self.engine.display_mut().pop_live() {
            self.engine.dispatch_live(event)?;
            pumped += 1;
        }
        self.collect();
        Ok(pumped)
    }

    /// Simulate user input arriving from the display.
    pub fn live(&mut self, event: NativeEvent) -> Result<()> {
        self.engine.dispatch_live(event)?;
        self.collect();
        Ok(())
    }

    fn collect(&mut self) {
        while let Some(event) = self.engine.next_event() {
            self.delivered.push(event);
        }
    }

    /// Tick, pump and advance the virtual clock until playback ends.
    ///
    /// Returns `Ok(false)` when playback is stuck waiting for an event that
    /// will never come, or the step bound is reached.
    pub fn run_until_idle(&mut self) -> Result<bool> {
        for _ in 0..self.max_steps {
            let timeout = self.tick()?;
            let pumped = self.pump()?;
            if !self.engine.is_playing() {
                return Ok(true);
            }
            if pumped > 0 {
                continue;
            }
            match timeout {
                Some(wait) if !wait.is_zero() => self.advance(wait),
                Some(_) => {}
                None => {
                    tracing::debug!("harness stalled in {:?}", self.state());
                    return Ok(false);
                }
            }
        }
        Ok(false)
    }

    /// Events delivered to the application so far
    pub fn delivered(&self) -> &[NativeEvent] {
        &self.delivered
    }

    pub fn take_delivered(&mut self) -> Vec<NativeEvent> {
        std::mem::take(&mut self.delivered)
    }
}

impl Default for ReplayHarness {
    fn default() -> Self {
        Self::new(HarnessConfig::default())
    }
}
