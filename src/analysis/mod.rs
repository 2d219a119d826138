//! Pose-analysis state per swing: `not_generated -> processing -> available | failed`.

#[cfg(feature = "desktop")]
pub mod commands;
pub mod controller;
pub mod state;

pub use controller::AnalysisController;
pub use state::{needs_auto_generate, AnalysisView, GenerateBook, GenerateOutcome};
