pub mod analysis;
pub mod comparison;
pub mod playback;
pub mod swing;

pub use analysis::{AnalysisStatus, PoseAnalysis, SnapshotSet, SwingEvent};
pub use comparison::{AlignmentType, Comparison, ComparisonInput, ViewMode};
pub use playback::{BoundaryPolicy, DisplayMode, OverlaySettings, VideoTiming};
pub use swing::{NewSwing, Swing, SwingPatch, SwingTag, TagKind};
