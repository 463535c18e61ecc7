//! The admission pipeline: mime, then size, then dimensions.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use camera_dir::MediaKind;
use tracing::{debug, info};

use crate::bounds::image_dimensions;
use crate::container::video_dimensions;
use crate::{MAX_DIMENSION, MAX_FILE_SIZE, MIN_DIMENSION, MediaInfo, ValidationError, ValidationResult};

/// Validate a candidate file read from `source`.
///
/// A declared mime type outside the expected major type rejects before
/// anything is read. Size comes from seeking to the end. Video without
/// readable container metadata is accepted with 0x0 dimensions; an image
/// whose header cannot be decoded is rejected.
pub fn validate<R: Read + Seek>(
    kind: MediaKind,
    declared_mime: Option<&str>,
    source: &mut R,
) -> ValidationResult {
    check_mime(kind, declared_mime)?;

    let size = source.seek(SeekFrom::End(0))?;
    source.seek(SeekFrom::Start(0))?;
    if size > MAX_FILE_SIZE {
        return Err(ValidationError::FileTooLarge { size });
    }

    let (width, height) = match kind {
        MediaKind::Video => match video_dimensions(source, size) {
            Some(dims) => dims,
            None => {
                debug!(size, "Accepting video without readable dimensions");
                return Ok(MediaInfo {
                    kind,
                    size,
                    width: 0,
                    height: 0,
                });
            }
        },
        MediaKind::Image => image_dimensions(source).map_err(ValidationError::UnreadableImage)?,
    };
    check_dimensions(kind, width, height)?;

    info!(kind = %kind, size, width, height, "Media accepted");
    Ok(MediaInfo {
        kind,
        size,
        width,
        height,
    })
}

/// Open `path` and validate it.
pub fn validate_file(kind: MediaKind, declared_mime: Option<&str>, path: &Path) -> ValidationResult {
    check_mime(kind, declared_mime)?;
    let mut reader = BufReader::new(File::open(path)?);
    validate(kind, declared_mime, &mut reader)
}

/// An absent or empty mime type is not checked.
pub fn check_mime(kind: MediaKind, declared_mime: Option<&str>) -> Result<(), ValidationError> {
    let Some(mime) = declared_mime.map(str::trim).filter(|m| !m.is_empty()) else {
        return Ok(());
    };
    let prefix = kind.mime_prefix();
    let matches = mime
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
    if matches {
        Ok(())
    } else {
        Err(ValidationError::MimeMismatch {
            kind,
            declared: mime.to_string(),
        })
    }
}

/// Both sides must fall within [`MIN_DIMENSION`, `MAX_DIMENSION`].
pub fn check_dimensions(kind: MediaKind, width: u32, height: u32) -> Result<(), ValidationError> {
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return Err(ValidationError::ResolutionTooSmall {
            kind,
            width,
            height,
            min: MIN_DIMENSION,
        });
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(ValidationError::ResolutionTooLarge {
            kind,
            width,
            height,
            max: MAX_DIMENSION,
        });
    }
    Ok(())
}
