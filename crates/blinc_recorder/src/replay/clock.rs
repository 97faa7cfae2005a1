//! Replay clock for deterministic playback timing.
//!
//! Maps real time onto the millisecond timeline of a replay log. The clock
//! is anchored at the instant playback started and can run faster or slower
//! than real time.

use std::time::{Duration, Instant};

/// Clock translating between wall time and log time.
#[derive(Clone, Copy, Debug)]
pub struct ReplayClock {
    /// Real instant corresponding to log time 0.
    anchor: Instant,
    /// Playback speed multiplier (1.0 = normal, 2.0 = 2x speed).
    speed: f64,
}

impl ReplayClock {
    /// Create a clock anchored at `anchor`, running at normal speed.
    pub fn new(anchor: Instant) -> Self {
        Self { anchor, speed: 1.0 }
    }

    /// Set the playback speed.
    ///
    /// A speed of 1.0 is normal, 2.0 is twice as fast, 0.5 is half speed.
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.set_speed(speed);
        self
    }

    pub fn set_speed(&mut self, speed: f64) {
        // Clamp to reasonable values
        self.speed = if speed.is_finite() {
            speed.clamp(0.1, 10.0)
        } else {
            1.0
        };
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn anchor(&self) -> Instant {
        self.anchor
    }

    /// Log time reached at `now`, in microseconds.
    fn elapsed_micros(&self, now: Instant) -> u64 {
        let real = now.saturating_duration_since(self.anchor).as_micros() as f64;
        (real * self.speed) as u64
    }

    /// Log time reached at `now`, in milliseconds.
    pub fn elapsed_ms(&self, now: Instant) -> u64 {
        self.elapsed_micros(now) / 1000
    }

    /// Check whether a record stamped `time_ms` is due at `now`.
    pub fn is_due(&self, time_ms: u32, now: Instant) -> bool {
        self.until(time_ms, now).is_none()
    }

    /// Real time left until log time `time_ms`, or `None` if it has passed.
    pub fn until(&self, time_ms: u32, now: Instant) -> Option<Duration> {
        let target = u64::from(time_ms) * 1000;
        let elapsed = self.elapsed_micros(now);
        if elapsed >= target {
            return None;
        }
        let remaining = (target - elapsed) as f64 / self.speed;
        Some(Duration::from_micros(remaining.ceil() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_and_due() {
        let start = Instant::now();
        let clock = ReplayClock::new(start);

        assert_eq!(clock.elapsed_ms(start), 0);
        assert!(clock.is_due(0, start));
        assert!(!clock.is_due(10, start));

        let later = start + Duration::from_millis(10);
        assert_eq!(clock.elapsed_ms(later), 10);
        assert!(clock.is_due(10, later));
        assert!(!clock.is_due(11, later));
    }

    #[test]
    fn test_until() {
        let start = Instant::now();
        let clock = ReplayClock::new(start);

        assert_eq!(clock.until(50, start), Some(Duration::from_millis(50)));
        assert_eq!(
            clock.until(50, start + Duration::from_millis(20)),
            Some(Duration::from_millis(30))
        );
        assert_eq!(clock.until(50, start + Duration::from_millis(50)), None);
    }

    #[test]
    fn test_speed() {
        let start = Instant::now();
        let clock = ReplayClock::new(start).with_speed(2.0);

        assert_eq!(clock.elapsed_ms(start + Duration::from_millis(10)), 20);
        assert_eq!(clock.until(50, start), Some(Duration::from_millis(25)));

        // Speed should be clamped
        assert_eq!(ReplayClock::new(start).with_speed(100.0).speed(), 10.0);
        assert_eq!(ReplayClock::new(start).with_speed(0.01).speed(), 0.1);
        assert_eq!(ReplayClock::new(start).with_speed(f64::NAN).speed(), 1.0);
    }

    #[test]
    fn test_time_before_anchor() {
        let start = Instant::now() + Duration::from_millis(5);
        let clock = ReplayClock::new(start);
        assert_eq!(clock.elapsed_ms(Instant::now()), 0);
    }
}
