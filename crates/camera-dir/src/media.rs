//! Media slots: at most one active video and one active image.

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{IMAGE_FILE, SharedDirectory, StoreError, VIDEO_FILE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    /// Fixed slot name in the shared directory.
    pub fn file_name(self) -> &'static str {
        match self {
            MediaKind::Video => VIDEO_FILE,
            MediaKind::Image => IMAGE_FILE,
        }
    }

    /// Expected major mime type, including the slash.
    pub fn mime_prefix(self) -> &'static str {
        match self {
            MediaKind::Video => "video/",
            MediaKind::Image => "image/",
        }
    }

    /// Only the slot formats are recognized: `mp4` and `bmp`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "mp4" => Some(MediaKind::Video),
            "bmp" => Some(MediaKind::Image),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MediaKind::Video => "video",
            MediaKind::Image => "image",
        })
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "video" => Ok(MediaKind::Video),
            "image" => Ok(MediaKind::Image),
            other => Err(format!("unknown media kind: {other}")),
        }
    }
}

/// How a new media file replaces the old one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplaceMode {
    /// Delete both slots, then write. A poller can briefly see no media.
    #[default]
    DeleteThenWrite,
    /// Write a hidden partial file, then rename it over the slot.
    Staged,
}

/// Remembers whether the failure came from the source side of a copy.
struct SourceReader<'a> {
    inner: &'a mut dyn Read,
    failed: Option<String>,
}

impl Read for SourceReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).inspect_err(|e| {
            self.failed = Some(e.to_string());
        })
    }
}

impl SharedDirectory {
    pub fn media_path(&self, kind: MediaKind) -> PathBuf {
        self.path_of(kind.file_name())
    }

    /// Stream `source` into the slot for `kind`.
    ///
    /// Both slots are cleared first; failing to delete a stale file is logged
    /// and ignored. Returns the destination path.
    pub fn put_media(&self, kind: MediaKind, source: &mut dyn Read) -> Result<PathBuf, StoreError> {
        self.ensure_directory()?;
        let dest = self.media_path(kind);
        let mut reader = SourceReader {
            inner: source,
            failed: None,
        };

        let written = match self.replace_mode {
            ReplaceMode::DeleteThenWrite => {
                self.remove_stale(&[MediaKind::Video, MediaKind::Image]);
                self.backend.write_stream(&mut reader, &dest)
            }
            ReplaceMode::Staged => {
                let partial = self.partial_path(kind);
                self.backend.write_stream(&mut reader, &partial).and_then(|n| {
                    self.remove_stale(&[other_kind(kind)]);
                    self.backend.rename(&partial, &dest).map(|_| n)
                })
            }
        };

        match written {
            Ok(bytes) => {
                info!(kind = %kind, bytes, path = %dest.display(), "Media placed");
                Ok(dest)
            }
            Err(e) => {
                self.discard_partial(kind, &dest);
                match reader.failed {
                    Some(reason) => Err(StoreError::SourceUnreadable(reason)),
                    None => Err(StoreError::from_write(e)),
                }
            }
        }
    }

    /// Copy a file by path into the slot for `kind`.
    ///
    /// The copy itself is done by the backend, so this also works when only
    /// the elevated helper can read the source.
    pub fn put_media_file(&self, kind: MediaKind, source: &Path) -> Result<PathBuf, StoreError> {
        self.ensure_directory()?;
        match self.backend.exists(source) {
            Ok(true) => {}
            Ok(false) => {
                return Err(StoreError::SourceUnreadable(format!(
                    "{} does not exist",
                    source.display()
                )));
            }
            Err(e) => return Err(StoreError::SourceUnreadable(e.to_string())),
        }

        let dest = self.media_path(kind);
        let copied = match self.replace_mode {
            ReplaceMode::DeleteThenWrite => {
                self.remove_stale(&[MediaKind::Video, MediaKind::Image]);
                self.backend.copy_file(source, &dest)
            }
            ReplaceMode::Staged => {
                let partial = self.partial_path(kind);
                self.backend.copy_file(source, &partial).and_then(|()| {
                    self.remove_stale(&[other_kind(kind)]);
                    self.backend.rename(&partial, &dest)
                })
            }
        };

        match copied {
            Ok(()) => {
                info!(kind = %kind, source = %source.display(), path = %dest.display(), "Media copied");
                Ok(dest)
            }
            Err(e) => {
                self.discard_partial(kind, &dest);
                Err(StoreError::from_write(e))
            }
        }
    }

    /// Remove both slots. Missing files are fine.
    pub fn clear_media(&self) -> Result<(), StoreError> {
        for kind in [MediaKind::Video, MediaKind::Image] {
            self.backend
                .remove(&self.media_path(kind))
                .map_err(StoreError::from_write)?;
        }
        info!("Media cleared");
        Ok(())
    }

    /// The video slot if present, otherwise the image slot.
    pub fn current_media(&self) -> Option<PathBuf> {
        [MediaKind::Video, MediaKind::Image]
            .into_iter()
            .map(|kind| self.media_path(kind))
            .find(|path| self.probe(path))
    }

    fn partial_path(&self, kind: MediaKind) -> PathBuf {
        self.path_of(&format!(".{}.partial", kind.file_name()))
    }

    fn remove_stale(&self, kinds: &[MediaKind]) {
        for &kind in kinds {
            let path = self.media_path(kind);
            if let Err(e) = self.backend.remove(&path) {
                warn!(path = %path.display(), "Failed to remove stale media: {e}");
            }
        }
    }

    /// Drop whatever a failed write left behind.
    fn discard_partial(&self, kind: MediaKind, dest: &Path) {
        let leftover = match self.replace_mode {
            ReplaceMode::DeleteThenWrite => dest.to_path_buf(),
            ReplaceMode::Staged => self.partial_path(kind),
        };
        let _ = self.backend.remove(&leftover);
    }
}

fn other_kind(kind: MediaKind) -> MediaKind {
    match kind {
        MediaKind::Video => MediaKind::Image,
        MediaKind::Image => MediaKind::Video,
    }
}
