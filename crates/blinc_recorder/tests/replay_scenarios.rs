use std::fs;
use std::path::PathBuf;

use blinc_platform::{EventType, NativeEvent, WindowId};
use blinc_recorder::testing::{HarnessConfig, ReplayHarness};
use blinc_recorder::{PlaybackState, ReplayConfig, ReplayError};
use tempfile::TempDir;

const BASE: u64 = 0x40_0000;

fn write_log(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

fn types(events: &[NativeEvent]) -> Vec<EventType> {
    events.iter().map(|e| e.event_type).collect()
}

#[test]
fn button_press_replays_after_window_creation() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_log(
        &dir,
        "scenario.log",
        "(create_notify (window 3))\n\
         (button_press (window 3) (time 50) (xy 10 10) (state 0) (button 1))\n",
    );

    let mut harness = ReplayHarness::default();
    let window = harness.add_window(3);
    assert_eq!(window, WindowId(BASE + 3));
    harness.play(&log).unwrap();
    assert!(harness.run_until_idle().unwrap());

    let sent = harness.display().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].event_type, EventType::ButtonPress);
    assert_eq!(sent[0].time, 50);
    assert_eq!(sent[0].window, window);
    assert_eq!(harness.display().warps(), &[(window, 10, 10)]);
    assert_eq!(harness.elapsed_ms(), 50);
    assert_eq!(harness.state(), PlaybackState::Idle);
    assert_eq!(types(harness.delivered()), vec![EventType::ButtonPress]);
}

#[test]
fn echo_reaches_application_only_once() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_log(&dir, "press.log", "(button_press (window 1) (time 0) (button 1))\n");

    let mut harness = ReplayHarness::new(HarnessConfig::default().with_auto_echo(false));
    harness.add_window(1);
    harness.play(&log).unwrap();

    harness.tick().unwrap();
    harness.pump().unwrap();
    assert_eq!(harness.delivered().len(), 1);
    assert_eq!(harness.state(), PlaybackState::AwaitingEcho);

    let echo = harness.display().sent()[0].clone();
    harness.display_mut().push_live(echo);
    assert_eq!(harness.pump().unwrap(), 1);
    assert_eq!(harness.delivered().len(), 1);

    assert!(harness.run_until_idle().unwrap());
    assert_eq!(harness.delivered().len(), 1);
}

#[test]
fn recorded_session_replays_with_same_timing() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("session.log");
    let window = WindowId(BASE + 2);

    let mut recording = ReplayHarness::default();
    recording.record(&log).unwrap();
    for event in [
        NativeEvent::new(EventType::MapNotify, window),
        NativeEvent::motion(window, 5000, 10, 20),
        NativeEvent::button(true, window, 5040, 10, 20, 1),
        NativeEvent::button(false, window, 5090, 10, 20, 1),
        NativeEvent::key(true, window, 5200, 38),
        NativeEvent::key(false, window, 5260, 38),
    ] {
        recording.live(event).unwrap();
    }
    recording.engine_mut().stop_recording().unwrap();
    assert_eq!(fs::read_to_string(&log).unwrap().lines().count(), 6);

    let mut replay = ReplayHarness::default();
    replay.add_window(2);
    replay.play(&log).unwrap();
    assert!(replay.run_until_idle().unwrap());

    let delivered = replay.delivered();
    assert_eq!(
        types(delivered),
        vec![
            EventType::MotionNotify,
            EventType::ButtonPress,
            EventType::ButtonRelease,
            EventType::KeyPress,
            EventType::KeyRelease,
        ]
    );
    let times: Vec<_> = delivered.iter().map(|e| e.time).collect();
    assert_eq!(times, vec![0, 40, 90, 200, 260]);
    assert!(delivered.iter().all(|e| e.window == window));
    assert_eq!(replay.elapsed_ms(), 260);
    assert_eq!(
        replay.display().warps(),
        &[(window, 10, 20), (window, 10, 20), (window, 10, 20)]
    );
}

#[test]
fn playback_speed_scales_waits() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_log(&dir, "fast.log", "(key_press (window 1) (time 200) (keycode 9))\n");

    let config = HarnessConfig::default().with_replay(ReplayConfig::default().with_speed(2.0));
    let mut harness = ReplayHarness::new(config);
    harness.add_window(1);
    harness.play(&log).unwrap();
    assert!(harness.run_until_idle().unwrap());
    assert_eq!(harness.elapsed_ms(), 100);
}

#[test]
fn unknown_kinds_and_blank_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_log(
        &dir,
        "noisy.log",
        "\n(wobble (window 1))\n(key_press (window 1) (time 0) (keycode 9))\n\n",
    );

    let mut harness = ReplayHarness::default();
    harness.add_window(1);
    harness.play(&log).unwrap();
    assert!(harness.run_until_idle().unwrap());
    assert_eq!(types(harness.delivered()), vec![EventType::KeyPress]);
}

#[test]
fn grammar_error_aborts_session() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_log(
        &dir,
        "corrupt.log",
        "(key_press (window 1) (time 0) (keycode 9))\n\
         (key_release (window 1) (time 10) (keycode))\n\
         (key_press (window 1) (time 20) (keycode 9))\n",
    );

    let mut harness = ReplayHarness::default();
    harness.add_window(1);
    harness.play(&log).unwrap();

    match harness.run_until_idle() {
        Err(ReplayError::Parse(err)) => assert_eq!(err.line, 2),
        other => panic!("expected parse error, got {other:?}"),
    }
    assert!(!harness.engine().is_playing());
    assert_eq!(harness.display().sent().len(), 1);
}

#[test]
fn missing_log_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut harness = ReplayHarness::default();
    let err = harness.play(dir.path().join("absent.log")).unwrap_err();
    assert!(matches!(err, ReplayError::Io { .. }));
    assert!(!harness.engine().is_playing());
}

#[test]
fn structural_record_waits_for_live_event() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_log(
        &dir,
        "barrier.log",
        "(map_notify (window 5))\n(key_press (window 5) (time 0) (keycode 9))\n",
    );

    let mut harness = ReplayHarness::default();
    harness.play(&log).unwrap();
    assert!(!harness.run_until_idle().unwrap());
    assert_eq!(harness.state(), PlaybackState::AwaitingEcho);
    assert!(harness.display().sent().is_empty());

    let window = harness.add_window(5);
    harness
        .live(NativeEvent::new(EventType::MapNotify, window))
        .unwrap();
    assert!(harness.run_until_idle().unwrap());
    assert_eq!(
        types(harness.delivered()),
        vec![EventType::MapNotify, EventType::KeyPress]
    );
}

#[test]
fn record_without_window_targets_root() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_log(&dir, "root.log", "(key_press (time 0) (keycode 9))\n");

    let mut harness = ReplayHarness::default();
    harness.play(&log).unwrap();
    assert!(harness.run_until_idle().unwrap());
    assert_eq!(harness.display().sent()[0].window, WindowId(BASE));
}

#[test]
fn replayed_presses_synthesize_clicks() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_log(
        &dir,
        "clicks.log",
        "(button_press (window 1) (time 0) (button 1))\n\
         (button_press (window 1) (time 100) (button 1))\n\
         (button_press (window 1) (time 200) (button 1))\n",
    );

    let mut harness = ReplayHarness::default();
    harness.add_window(1);
    harness.play(&log).unwrap();
    assert!(harness.run_until_idle().unwrap());
    assert_eq!(
        types(harness.delivered()),
        vec![
            EventType::ButtonPress,
            EventType::ButtonPress,
            EventType::DoubleButtonPress,
            EventType::ButtonPress,
            EventType::TripleButtonPress,
        ]
    );
}

#[test]
fn windowless_key_echo_ignores_other_windows() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_log(&dir, "key.log", "(key_press (time 0) (keycode 9))\n");

    let mut harness = ReplayHarness::new(HarnessConfig::default().with_auto_echo(false));
    harness.play(&log).unwrap();
    harness.tick().unwrap();
    harness.pump().unwrap();
    let injected = harness.display().sent()[0].clone();
    assert_eq!(injected.window, WindowId(BASE));

    // Same kind, different window: the user typed elsewhere
    let user = NativeEvent::key(true, WindowId(BASE + 5), 1234, 9).synthetic();
    harness.live(user.clone()).unwrap();
    assert_eq!(harness.delivered().len(), 2);
    assert_eq!(harness.delivered()[1], user);
    assert_eq!(harness.state(), PlaybackState::AwaitingEcho);

    harness.display_mut().push_live(injected);
    harness.pump().unwrap();
    assert_eq!(harness.delivered().len(), 2);
    assert!(harness.run_until_idle().unwrap());
}

#[test]
fn user_press_before_echo_is_delivered() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_log(
        &dir,
        "press.log",
        "(button_press (window 1) (time 0) (xy 3 3) (button 1))\n",
    );

    let mut harness = ReplayHarness::new(HarnessConfig::default().with_auto_echo(false));
    let window = harness.add_window(1);
    harness.play(&log).unwrap();
    harness.tick().unwrap();
    harness.pump().unwrap();

    // Real input on the replayed window lands before the echo does
    let user = NativeEvent::button(true, window, 10, 50, 50, 3);
    harness.live(user).unwrap();
    assert_eq!(harness.state(), PlaybackState::AwaitingEcho);

    let echo = harness.display().sent()[0].clone();
    harness.display_mut().push_live(echo);
    harness.pump().unwrap();

    let delivered = harness.delivered();
    assert_eq!(
        types(delivered),
        vec![EventType::ButtonPress, EventType::ButtonPress]
    );
    assert!(delivered[0].send_event);
    assert_eq!((delivered[0].x, delivered[0].detail), (3, 1));
    assert!(!delivered[1].send_event);
    assert_eq!((delivered[1].x, delivered[1].detail), (50, 3));
    assert!(harness.run_until_idle().unwrap());
    assert_eq!(harness.delivered().len(), 2);
}
