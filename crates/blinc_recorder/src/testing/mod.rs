//! Testing utilities for replay logs.
//!
//! This module provides:
//! - `HeadlessDisplay` - In-memory `Display` with optional automatic echoes
//! - `ReplayHarness` - Engine, headless display and virtual clock in one
//!
//! # Example
//!
//! ```ignore
//! use blinc_recorder::testing::ReplayHarness;
//!
//! let mut harness = ReplayHarness::default();
//! harness.add_window(3);
//! harness.play("session.log")?;
//! assert!(harness.run_until_idle()?);
//! ```

mod headless;
mod runner;

pub use headless::HeadlessDisplay;
pub use runner::{HarnessConfig, ReplayHarness};
