//! Comparison/overlay player: two trimmed videos, synchronized "play both",
//! boundary stops and the overlay blend.

#[cfg(feature = "desktop")]
pub mod commands;
pub mod controller;
pub mod state;

pub use controller::{PlayerController, PlayerUpdate};
pub use state::{ComparisonPlayer, MediaCommand, PlayerView, SlotView, FOREGROUND_SLOT, SLOT_COUNT};
