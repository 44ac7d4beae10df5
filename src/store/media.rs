use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{GriotError, Result};

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "aac", "flac", "ogg", "opus"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi", "webm"];

/// Which uploads subtree a media file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Image,
    Video,
    File,
}

impl MediaKind {
    /// Classify by file extension. Anything unrecognized is a plain file.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Self::File;
        };
        let ext = ext.to_lowercase();
        if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Audio
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Self::Image
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Video
        } else {
            Self::File
        }
    }

    #[must_use]
    pub const fn subdir(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Image => "image",
            Self::Video => "video",
            Self::File => "file",
        }
    }
}

/// MIME type for an audio file, by extension. The transcription and
/// generative services both want one alongside the raw bytes.
#[must_use]
pub fn audio_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    match ext.as_deref() {
        Some("wav") => "audio/wav",
        Some("m4a" | "mp4") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("flac") => "audio/flac",
        Some("ogg" | "opus") => "audio/ogg",
        _ => "audio/mpeg",
    }
}

/// Saves raw uploaded media under `<data-dir>/uploads/{audio,image,video,file}/`.
pub struct MediaStore {
    data_dir: PathBuf,
}

impl MediaStore {
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
        }
    }

    /// Copy `source` into the uploads tree under its classified kind.
    /// Returns the kind and the data-dir-relative path for the record.
    pub fn import(&self, source: &Path) -> Result<(MediaKind, String)> {
        self.import_as(source, MediaKind::from_path(source))
    }

    /// Copy `source` into a specific subtree. The primary submission audio
    /// goes through here: the caller knows it is audio even when the
    /// container extension (e.g. mp4) would classify otherwise.
    pub fn import_as(&self, source: &Path, kind: MediaKind) -> Result<(MediaKind, String)> {
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .map_or_else(|| "bin".to_string(), str::to_lowercase);

        let name = format!("{}.{ext}", Uuid::new_v4());
        let relative = PathBuf::from("uploads").join(kind.subdir()).join(name);
        let dest = self.data_dir.join(&relative);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::copy(source, &dest).map_err(|e| {
            GriotError::Store(format!(
                "failed to copy {} into uploads: {e}",
                source.display()
            ))
        })?;

        Ok((kind, relative.to_string_lossy().to_string()))
    }
}
