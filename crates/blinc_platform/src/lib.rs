//! Blinc Platform Abstraction
//!
//! The native side of event capture and replay:
//!
//! - **Events**: `NativeEvent` as delivered by the display connection
//! - **Windows**: raw `WindowId` resource identifiers
//! - **Display**: the injection seam (forced delivery, pointer warp, window lookup)

pub mod display;
pub mod error;
pub mod event;
pub mod window;

pub use display::Display;
pub use error::{PlatformError, Result};
pub use event::{EventType, NativeEvent};
pub use window::WindowId;
