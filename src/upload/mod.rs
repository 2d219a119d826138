//! Upload pipeline: local checks, presigned destination, direct storage POST,
//! then the swing record.

#[cfg(feature = "desktop")]
pub mod commands;
pub mod file;
pub mod pipeline;
pub mod presigned;

pub use file::VideoFile;
pub use pipeline::{SwingMetadata, UploadOutcome, UploadPipeline};
pub use presigned::{resolve_target, UploadTarget};
