//! Property-based tests for the admission pipeline.

use std::io::{self, Cursor, Read, Seek, SeekFrom};

use camera_dir::MediaKind;
use image::{DynamicImage, ImageFormat};
use media_validator::{MAX_DIMENSION, MAX_FILE_SIZE, MIN_DIMENSION, ValidationError, validate};
use proptest::prelude::*;

/// A zero-filled source of arbitrary length that is never materialized.
struct SizedSource {
    len: u64,
    pos: u64,
}

impl SizedSource {
    fn new(len: u64) -> Self {
        Self { len, pos: 0 }
    }
}

impl Read for SizedSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.len.saturating_sub(self.pos);
        let n = remaining.min(buf.len() as u64) as usize;
        buf[..n].fill(0);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for SizedSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let next = match pos {
            SeekFrom::Start(p) => p as i128,
            SeekFrom::End(d) => self.len as i128 + d as i128,
            SeekFrom::Current(d) => self.pos as i128 + d as i128,
        };
        if next < 0 {
            return Err(io::Error::from(io::ErrorKind::InvalidInput));
        }
        self.pos = next as u64;
        Ok(self.pos)
    }
}

fn kind_strategy() -> impl Strategy<Value = MediaKind> {
    prop_oneof![Just(MediaKind::Video), Just(MediaKind::Image)]
}

fn png(w: u32, h: u32) -> Cursor<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::new_luma8(w, h)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.set_position(0);
    buf
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Anything over the ceiling is rejected, whatever else is true.
    #[test]
    fn oversize_always_rejected(
        kind in kind_strategy(),
        excess in 1u64..(4 * MAX_FILE_SIZE),
        with_mime in any::<bool>(),
    ) {
        let mime = with_mime.then(|| kind.mime_prefix().to_string() + "x-test");
        let mut src = SizedSource::new(MAX_FILE_SIZE + excess);
        let result = validate(kind, mime.as_deref(), &mut src);
        let is_too_large = matches!(result, Err(ValidationError::FileTooLarge { .. }));
        prop_assert!(is_too_large);
    }

    /// A foreign major type is rejected before size or dimensions matter.
    #[test]
    fn foreign_mime_rejected_first(
        kind in kind_strategy(),
        major in "(audio|text|application|font|model)",
        len in 0u64..(2 * MAX_FILE_SIZE),
    ) {
        let mime = format!("{major}/whatever");
        let mut src = SizedSource::new(len);
        let result = validate(kind, Some(&mime), &mut src);
        let is_mismatch = matches!(result, Err(ValidationError::MimeMismatch { .. }));
        prop_assert!(is_mismatch);
        prop_assert_eq!(src.pos, 0);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// In-range image bounds are accepted and reported unchanged.
    #[test]
    fn in_range_image_reports_bounds(
        long in MIN_DIMENSION..=MAX_DIMENSION,
        short in MIN_DIMENSION..=128u32,
        transpose in any::<bool>(),
    ) {
        let (w, h) = if transpose { (short, long) } else { (long, short) };
        let info = validate(MediaKind::Image, Some("image/png"), &mut png(w, h)).unwrap();
        prop_assert_eq!((info.width, info.height), (w, h));
    }

    /// Out-of-range image bounds are rejected with the size reason,
    /// never the decode-failure reason.
    #[test]
    fn out_of_range_image_rejected(
        small in 1u32..MIN_DIMENSION,
        ok in MIN_DIMENSION..=64u32,
        transpose in any::<bool>(),
    ) {
        let (w, h) = if transpose { (ok, small) } else { (small, ok) };
        let result = validate(MediaKind::Image, None, &mut png(w, h));
        let is_too_small = matches!(result, Err(ValidationError::ResolutionTooSmall { .. }));
        prop_assert!(is_too_small);
    }
}
