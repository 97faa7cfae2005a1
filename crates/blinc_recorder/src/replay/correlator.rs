//! Echo correlation between injected events and the live event stream.
//!
//! After the scheduler injects a key or button event it must not move on
//! until the display has delivered that event back. The correlator tells
//! those echoes apart from unrelated live input.

use std::collections::VecDeque;

use blinc_platform::{EventType, NativeEvent, WindowId};

use crate::record::EventRecord;

/// Synthetic motions still allowed to echo back.
const MAX_PENDING_MOTIONS: usize = 64;

/// How a live event relates to the playback in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Correlation {
    /// Echo of the injected key or button record at the head of the queue
    Echo,
    /// Late echo of an injected motion; the queue already moved past it
    MotionEcho,
    /// The structural event the queue head was waiting for
    Barrier,
    /// Not related to playback
    Unrelated,
}

impl Correlation {
    /// Whether the live event must be hidden from the application
    pub fn is_echo(self) -> bool {
        matches!(self, Self::Echo | Self::MotionEcho)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Expected {
    event_type: EventType,
    window: WindowId,
    barrier: bool,
}

impl Expected {
    /// Echoes must carry the synthetic flag; barriers are real server events.
    fn matches(&self, event: &NativeEvent) -> bool {
        self.event_type == event.event_type
            && self.window == event.window
            && (self.barrier || event.send_event)
    }
}

/// Tracks which live event the scheduler is waiting for.
#[derive(Debug, Default)]
pub struct EchoCorrelator {
    expected: Option<Expected>,
    motions: VecDeque<WindowId>,
}

impl EchoCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the echo of an injected event.
    pub fn expect_echo(&mut self, injected: &NativeEvent) {
        self.expected = Some(Expected {
            event_type: injected.event_type,
            window: injected.window,
            barrier: false,
        });
    }

    /// Wait for a live structural event of `record`'s kind on `window`.
    pub fn expect_barrier(&mut self, record: &EventRecord, window: WindowId) {
        self.expected = Some(Expected {
            event_type: record.kind().event_type(),
            window,
            barrier: true,
        });
    }

    /// Note an injected motion that may or may not echo back.
    pub fn expect_motion(&mut self, window: WindowId) {
        if self.motions.len() == MAX_PENDING_MOTIONS {
            self.motions.pop_front();
        }
        self.motions.push_back(window);
    }

    /// Whether the scheduler is blocked on a live event
    pub fn is_waiting(&self) -> bool {
        self.expected.is_some()
    }

    /// Synthetic motions that have not echoed back yet
    pub fn pending_motions(&self) -> usize {
        self.motions.len()
    }

    /// Classify a live event, consuming the expectation it satisfies.
    pub fn observe(&mut self, event: &NativeEvent) -> Correlation {
        if let Some(expected) = self.expected {
            if expected.matches(event) {
                self.expected = None;
                return if expected.barrier {
                    Correlation::Barrier
                } else {
                    Correlation::Echo
                };
            }
        }

        if event.event_type == EventType::MotionNotify && event.send_event {
            if let Some(index) = self.motions.iter().position(|w| *w == event.window) {
                self.motions.remove(index);
                return Correlation::MotionEcho;
            }
        }

        Correlation::Unrelated
    }

    /// Forget every expectation.
    pub fn reset(&mut self) {
        self.expected = None;
        self.motions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EventKind;

    #[test]
    fn test_echo_requires_kind_and_window() {
        let mut echo = EchoCorrelator::new();
        let injected = NativeEvent::button(true, WindowId(3), 0, 0, 0, 1).synthetic();
        echo.expect_echo(&injected);
        assert!(echo.is_waiting());

        let other_window = NativeEvent::button(true, WindowId(4), 0, 0, 0, 1).synthetic();
        assert_eq!(echo.observe(&other_window), Correlation::Unrelated);
        let other_kind = NativeEvent::button(false, WindowId(3), 0, 0, 0, 1).synthetic();
        assert_eq!(echo.observe(&other_kind), Correlation::Unrelated);
        assert!(echo.is_waiting());

        assert_eq!(echo.observe(&injected), Correlation::Echo);
        assert!(!echo.is_waiting());
        assert_eq!(echo.observe(&injected), Correlation::Unrelated);
    }

    #[test]
    fn test_user_input_is_not_an_echo() {
        let mut echo = EchoCorrelator::new();
        let injected = NativeEvent::button(true, WindowId(3), 0, 3, 3, 1).synthetic();
        echo.expect_echo(&injected);

        // Same kind and window, but delivered by the server as real input
        let user = NativeEvent::button(true, WindowId(3), 7, 50, 50, 3);
        assert_eq!(echo.observe(&user), Correlation::Unrelated);
        assert!(echo.is_waiting());
        assert_eq!(echo.observe(&injected), Correlation::Echo);
    }

    #[test]
    fn test_barrier() {
        let mut echo = EchoCorrelator::new();
        let record = EventRecord::new(EventKind::MapNotify).with_window(WindowId(8));
        echo.expect_barrier(&record, WindowId(8));

        assert_eq!(
            echo.observe(&NativeEvent::new(EventType::MapNotify, WindowId(9))),
            Correlation::Unrelated
        );
        let map = NativeEvent::new(EventType::MapNotify, WindowId(8));
        let correlation = echo.observe(&map);
        assert_eq!(correlation, Correlation::Barrier);
        assert!(!correlation.is_echo());
    }

    #[test]
    fn test_motion_echoes() {
        let mut echo = EchoCorrelator::new();
        echo.expect_motion(WindowId(1));
        echo.expect_motion(WindowId(1));
        assert!(!echo.is_waiting());

        let live = NativeEvent::motion(WindowId(1), 0, 5, 5);
        assert_eq!(echo.observe(&live), Correlation::Unrelated);

        let synthetic = live.clone().synthetic();
        assert_eq!(echo.observe(&synthetic), Correlation::MotionEcho);
        assert_eq!(echo.pending_motions(), 1);
        echo.reset();
        assert_eq!(echo.observe(&synthetic), Correlation::Unrelated);
    }

    #[test]
    fn test_pending_motions_are_bounded() {
        let mut echo = EchoCorrelator::new();
        for _ in 0..(MAX_PENDING_MOTIONS + 10) {
            echo.expect_motion(WindowId(2));
        }
        assert_eq!(echo.pending_motions(), MAX_PENDING_MOTIONS);
    }
}
