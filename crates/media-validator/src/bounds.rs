//! Header-only image bounds.

use std::io::{BufReader, Read, Seek, SeekFrom};

use image::ImageReader;
use tracing::debug;

/// Read width and height from the image header without decoding pixels.
///
/// The format is sniffed from the content, not the file name.
pub fn image_dimensions<R: Read + Seek>(source: &mut R) -> Result<(u32, u32), String> {
    source
        .seek(SeekFrom::Start(0))
        .map_err(|e| e.to_string())?;
    let reader = ImageReader::new(BufReader::new(source))
        .with_guessed_format()
        .map_err(|e| e.to_string())?;
    let Some(format) = reader.format() else {
        return Err("unrecognized image format".into());
    };
    let (w, h) = reader.into_dimensions().map_err(|e| e.to_string())?;
    debug!(?format, w, h, "Read image bounds");
    Ok((w, h))
}
