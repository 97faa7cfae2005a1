//! Window identifiers

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw resource identifier of a native window.
///
/// Identifiers are allocated by the display connection starting at its
/// resource base (see [`Display::window_base`](crate::Display::window_base)).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl WindowId {
    /// Get the raw identifier
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl From<u64> for WindowId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}
