//! Still-frame views over pose-analysis snapshots.

#[cfg(feature = "desktop")]
pub mod commands;
pub mod comparison;
pub mod controller;
pub mod grid;

use serde::Serialize;

pub use comparison::{ComparisonFrames, PoseComparisonView, COMPARISON_EVENTS};
pub use controller::SnapshotsController;
pub use grid::{GridCell, GridView, SnapshotGrid};

pub const IMAGE_FAILED_MESSAGE: &str = "Image failed to load";
pub const NO_SNAPSHOT_MESSAGE: &str = "No snapshot available";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaceholderReason {
    ImageFailed,
    NoSnapshot,
}

/// One still: either an image to load or a placeholder in its place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Frame {
    Image { url: String, alt: String },
    Placeholder { reason: PlaceholderReason, message: String },
}

impl Frame {
    /// An image URL that already failed once is never handed out again.
    pub fn resolve(url: Option<&str>, failed: bool, alt: String) -> Self {
        match url {
            Some(_) if failed => Frame::placeholder(PlaceholderReason::ImageFailed),
            Some(url) if !url.trim().is_empty() => Frame::Image {
                url: url.to_string(),
                alt,
            },
            _ => Frame::placeholder(PlaceholderReason::NoSnapshot),
        }
    }

    fn placeholder(reason: PlaceholderReason) -> Self {
        let message = match reason {
            PlaceholderReason::ImageFailed => IMAGE_FAILED_MESSAGE,
            PlaceholderReason::NoSnapshot => NO_SNAPSHOT_MESSAGE,
        };
        Frame::Placeholder {
            reason,
            message: message.to_string(),
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Frame::Image { .. })
    }
}
