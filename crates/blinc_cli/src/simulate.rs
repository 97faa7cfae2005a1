//! Real-time dry run of a replay log against a headless display

use anyhow::{bail, Result};
use blinc_platform::{EventType, WindowId};
use blinc_recorder::testing::HeadlessDisplay;
use blinc_recorder::{LogReader, Parser, ReplayConfig, ReplayEngine, WindowBase};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::SimulateConfig;

/// Outcome of a dry run
#[derive(Debug, Default, Serialize)]
pub struct SimulationReport {
    pub injected: u64,
    pub delivered: usize,
    pub clicks: usize,
    pub elapsed_ms: u128,
}

/// Windows named anywhere in the log
fn collect_windows(path: &Path, base: WindowBase) -> Result<BTreeSet<WindowId>> {
    let mut windows = BTreeSet::new();
    for record in LogReader::open(path, Parser::new(base))? {
        if let Some(window) = record?.window {
            windows.insert(window);
        }
    }
    Ok(windows)
}

pub fn run(path: &Path, replay: ReplayConfig, options: &SimulateConfig) -> Result<SimulationReport> {
    let base = WindowBase(replay.window_base.unwrap_or(0));
    let mut display = HeadlessDisplay::new(base.0).with_auto_echo(true);
    if options.register_windows {
        let windows = collect_windows(path, base)?;
        tracing::debug!("registering {} windows", windows.len());
        for window in windows {
            display.add_window(window);
        }
    }

    let mut engine = ReplayEngine::with_config(display, replay);
    let started = Instant::now();
    engine.start_playback(path)?;

    let stall_limit = Duration::from_millis(options.stall_timeout_ms);
    let mut report = SimulationReport::default();
    let mut last_progress = Instant::now();

    loop {
        let timeout = engine.on_poll_tick(Instant::now())?;

        while let Some(event) = engine.display_mut().pop_live() {
            engine.dispatch_live(event)?;
        }
        while let Some(event) = engine.next_event() {
            last_progress = Instant::now();
            match event.event_type {
                EventType::DoubleButtonPress | EventType::TripleButtonPress => {
                    report.clicks += 1;
                    tracing::info!("{:?} on {}", event.event_type, event.window);
                }
                _ => {
                    report.delivered += 1;
                    tracing::info!(
                        "{:>6}ms {:?} on {} at ({}, {})",
                        event.time,
                        event.event_type,
                        event.window,
                        event.x,
                        event.y
                    );
                }
            }
        }

        if !engine.is_playing() {
            break;
        }
        match timeout {
            Some(wait) => thread::sleep(wait),
            None => {
                if last_progress.elapsed() >= stall_limit {
                    bail!(
                        "playback stalled in {:?} after {} injected events",
                        engine.playback_state(Instant::now()),
                        engine.injected()
                    );
                }
                thread::sleep(Duration::from_millis(10));
            }
        }
    }

    report.injected = engine.display().sent().len() as u64;
    report.elapsed_ms = started.elapsed().as_millis();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_simulate_small_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.log");
        fs::write(
            &path,
            "(map_notify (window 7))\n\
             (button_press (window 7) (time 0) (xy 5 5) (button 1))\n\
             (button_press (window 7) (time 20) (xy 5 5) (button 1))\n\
             (motion_notify (window 7) (time 30) (xy 6 6))\n",
        )
        .unwrap();

        let report = run(
            &path,
            ReplayConfig::default().with_speed(10.0),
            &SimulateConfig::default(),
        )
        .unwrap();
        assert_eq!(report.injected, 3);
        assert_eq!(report.delivered, 3);
        assert_eq!(report.clicks, 1);
    }

    #[test]
    fn test_unregistered_window_stalls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.log");
        fs::write(&path, "(map_notify (window 7))\n").unwrap();

        let options = SimulateConfig {
            register_windows: false,
            stall_timeout_ms: 20,
        };
        assert!(run(&path, ReplayConfig::default(), &options).is_err());
    }
}
