//! Admission checks for candidate media before it enters the shared directory.
//!
//! Validation never touches the shared directory. It checks the declared
//! mime type, the byte size (via seek, never a full read) and the pixel
//! dimensions: container metadata for video, header-only bounds for images.

pub mod bounds;
pub mod container;
pub mod validate;

use camera_dir::MediaKind;
use serde::Serialize;

pub use bounds::image_dimensions;
pub use container::video_dimensions;
pub use validate::{check_dimensions, check_mime, validate, validate_file};

/// Largest accepted payload: 500 MiB.
pub const MAX_FILE_SIZE: u64 = 500 * 1024 * 1024;
/// Smallest accepted width or height.
pub const MIN_DIMENSION: u32 = 16;
/// Largest accepted width or height.
pub const MAX_DIMENSION: u32 = 4096;

/// What validation measured about an accepted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MediaInfo {
    pub kind: MediaKind,
    pub size: u64,
    /// 0 when unknown (video without readable metadata).
    pub width: u32,
    pub height: u32,
}

impl MediaInfo {
    pub fn has_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Rejection reasons. The display string is shown to the user as-is.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid file type. Expected {kind} file.")]
    MimeMismatch { kind: MediaKind, declared: String },

    #[error("File too large. Maximum size is 500 MB.")]
    FileTooLarge { size: u64 },

    #[error("{} resolution too small. Minimum is {min}x{min}.", label(.kind))]
    ResolutionTooSmall {
        kind: MediaKind,
        width: u32,
        height: u32,
        min: u32,
    },

    #[error("{} resolution too large. Maximum is {max}x{max}.", label(.kind))]
    ResolutionTooLarge {
        kind: MediaKind,
        width: u32,
        height: u32,
        max: u32,
    },

    #[error("Could not read image dimensions: {0}")]
    UnreadableImage(String),

    #[error("Could not read file: {0}")]
    Io(#[from] std::io::Error),
}

fn label(kind: &MediaKind) -> &'static str {
    match kind {
        MediaKind::Video => "Video",
        MediaKind::Image => "Image",
    }
}

/// Outcome of admitting a candidate file.
pub type ValidationResult = Result<MediaInfo, ValidationError>;
