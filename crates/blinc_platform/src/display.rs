//! Display connection abstraction
//!
//! The replay engine drives the native display only through this trait:
//! it looks windows up, warps the pointer and forces synthetic events onto
//! the event queue. Everything else about the connection (the event queue
//! itself, drawing, resources) stays with the backend.

use crate::{NativeEvent, Result, WindowId};

/// A connection to the native display server
pub trait Display {
    /// First resource id handed out by this connection.
    ///
    /// Window ids are written to replay logs relative to this value so logs
    /// stay valid across runs.
    fn window_base(&self) -> u64;

    /// Root window of the default screen
    fn root_window(&self) -> WindowId;

    /// Check whether a window is currently known to the application
    fn window_exists(&self, window: WindowId) -> bool;

    /// Move the pointer to a position relative to `window`
    fn warp_pointer(&mut self, window: WindowId, x: i32, y: i32) -> Result<()>;

    /// Force delivery of a synthetic event to `event.window`
    fn send_event(&mut self, event: &NativeEvent) -> Result<()>;

    /// Flush pending requests to the server
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<D: Display + ?Sized> Display for &mut D {
    fn window_base(&self) -> u64 {
        (**self).window_base()
    }

    fn root_window(&self) -> WindowId {
        (**self).root_window()
    }

    fn window_exists(&self, window: WindowId) -> bool {
        (**self).window_exists(window)
    }

    fn warp_pointer(&mut self, window: WindowId, x: i32, y: i32) -> Result<()> {
        (**self).warp_pointer(window, x, y)
    }

    fn send_event(&mut self, event: &NativeEvent) -> Result<()> {
        (**self).send_event(event)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}
