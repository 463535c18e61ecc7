//! Video dimensions from MP4 container metadata.

use std::io::{BufReader, Read, Seek, SeekFrom};
use std::panic::{self, AssertUnwindSafe};

use mp4::{Mp4Reader, TrackType};
use tracing::debug;

/// Width and height of the first video track, read from the `moov` box
/// without touching sample data.
///
/// `None` when the container cannot be parsed or has no sized video track.
/// Parser panics on hostile input are caught and treated the same way.
pub fn video_dimensions<R: Read + Seek>(source: &mut R, size: u64) -> Option<(u32, u32)> {
    source.seek(SeekFrom::Start(0)).ok()?;
    let reader = BufReader::new(source);

    let parsed = panic::catch_unwind(AssertUnwindSafe(|| Mp4Reader::read_header(reader, size)));
    let mp4 = match parsed {
        Ok(Ok(mp4)) => mp4,
        Ok(Err(e)) => {
            debug!("Container metadata unavailable: {e}");
            return None;
        }
        Err(_) => {
            debug!("Container parser panicked");
            return None;
        }
    };

    let mut tracks: Vec<_> = mp4.tracks().iter().collect();
    tracks.sort_by_key(|(id, _)| **id);
    tracks
        .into_iter()
        .filter(|(_, t)| matches!(t.track_type(), Ok(TrackType::Video)))
        .map(|(_, t)| (u32::from(t.width()), u32::from(t.height())))
        .find(|&(w, h)| w > 0 && h > 0)
}
