//! In-memory display for testing.
//!
//! `HeadlessDisplay` implements [`Display`] without a display server, useful
//! for:
//! - Unit testing the scheduler and engine
//! - Dry runs of replay logs from the command line
//! - CI pipelines with no windowing system

use std::collections::VecDeque;
use std::mem;

use blinc_platform::{Display, NativeEvent, PlatformError, Result, WindowId};
use rustc_hash::FxHashSet;

/// A display connection that only remembers what was asked of it.
///
/// Injected events and pointer warps are logged in order. With auto-echo
/// enabled, every injected event is also queued as a live event, the way a
/// real server delivers a forced event back to the client.
#[derive(Debug)]
pub struct HeadlessDisplay {
    base: u64,
    root: WindowId,
    windows: FxHashSet<WindowId>,
    sent: Vec<NativeEvent>,
    warps: Vec<(WindowId, i32, i32)>,
    live: VecDeque<NativeEvent>,
    auto_echo: bool,
}

impl HeadlessDisplay {
    /// Create a display whose resource ids start at `window_base`.
    ///
    /// The root window takes the base id itself and always exists.
    pub fn new(window_base: u64) -> Self {
        let root = WindowId(window_base);
        let mut windows = FxHashSet::default();
        windows.insert(root);
        Self {
            base: window_base,
            root,
            windows,
            sent: Vec::new(),
            warps: Vec::new(),
            live: VecDeque::new(),
            auto_echo: false,
        }
    }

    /// Queue every injected event back as a live event.
    pub fn with_auto_echo(mut self, enabled: bool) -> Self {
        self.auto_echo = enabled;
        self
    }

    pub fn auto_echo(&self) -> bool {
        self.auto_echo
    }

    /// Register a window.
    pub fn add_window(&mut self, window: WindowId) {
        self.windows.insert(window);
    }

    /// Forget a window. The root window cannot be removed.
    pub fn remove_window(&mut self, window: WindowId) -> bool {
        window != self.root && self.windows.remove(&window)
    }

    /// Number of registered windows, root included
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Events injected so far
    pub fn sent(&self) -> &[NativeEvent] {
        &self.sent
    }

    /// Take the injected events, leaving the log empty
    pub fn take_sent(&mut self) -> Vec<NativeEvent> {
        mem::take(&mut self.sent)
    }

    /// Pointer warps so far, as `(window, x, y)`
    pub fn warps(&self) -> &[(WindowId, i32, i32)] {
        &self.warps
    }

    /// Queue a live event, as if the server delivered it.
    pub fn push_live(&mut self, event: NativeEvent) {
        self.live.push_back(event);
    }

    /// Next queued live event
    pub fn pop_live(&mut self) -> Option<NativeEvent> {
        self.live.pop_front()
    }

    /// Take every queued live event
    pub fn take_live(&mut self) -> Vec<NativeEvent> {
        self.live.drain(..).collect()
    }

    pub fn has_live(&self) -> bool {
        !self.live.is_empty()
    }

    fn require(&self, window: WindowId) -> Result<()> {
        if self.windows.contains(&window) {
            Ok(())
        } else {
            Err(PlatformError::UnknownWindow(window))
        }
    }
}

impl Default for HeadlessDisplay {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Display for HeadlessDisplay {
    fn window_base(&self) -> u64 {
        self.base
    }

    fn root_window(&self) -> WindowId {
        self.root
    }

    fn window_exists(&self, window: WindowId) -> bool {
        self.windows.contains(&window)
    }

    fn warp_pointer(&mut self, window: WindowId, x: i32, y: i32) -> Result<()> {
        self.require(window)?;
        self.warps.push((window, x, y));
        Ok(())
    }

    fn send_event(&mut self, event: &NativeEvent) -> Result<()> {
        self.require(event.window)?;
        self.sent.push(event.clone());
        if self.auto_echo {
            self.live.push_back(event.clone());
        }
        Ok(())
    }
}
