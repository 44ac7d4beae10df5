//! The per-submission pipeline: media in, hosted API calls, marker
//! extraction, one JSON record out.

use std::path::PathBuf;

use chrono::Utc;
use uuid::Uuid;

use crate::config::{Config, Pipeline};
use crate::error::{GriotError, Result};
use crate::extract;
use crate::prompt;
use crate::record::{ANONYMOUS, CATEGORIES, Coordinates, LANGUAGES, MediaRefs, Record, Summary};
use crate::remote::generate::{GenerateClient, InlineMedia};
use crate::remote::transcribe::TranscribeClient;
use crate::store::RecordStore;
use crate::store::media::{self, MediaKind, MediaStore};

/// One submission's worth of user input, the CLI stand-in for the form.
#[derive(Debug, Clone)]
pub struct Submission {
    pub audio: PathBuf,
    pub submitter: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub category: String,
    pub language: String,
    pub attachments: Vec<PathBuf>,
}

/// Everything a pipeline run produces before the record is assembled.
struct Derived {
    transcript: String,
    translation: String,
    summary: Option<Summary>,
    prompt: String,
}

/// Run a complete submission and return the saved record.
pub async fn run_submission(config: &Config, submission: Submission) -> Result<Record> {
    validate(&submission)?;

    let audio_bytes = std::fs::read(&submission.audio).map_err(|e| {
        GriotError::Other(format!(
            "failed to read audio file {}: {e}",
            submission.audio.display()
        ))
    })?;
    let file_name = submission
        .audio
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("audio.mp3")
        .to_string();
    let mime = media::audio_mime(&submission.audio);

    let derived = match config.submit.pipeline {
        Pipeline::Combined => {
            run_combined(config, &submission.language, audio_bytes, mime).await?
        }
        Pipeline::Staged => {
            run_staged(config, &submission.language, audio_bytes, &file_name, mime).await?
        }
    };

    let store = RecordStore::open(&config.store)?;
    let media_store = MediaStore::new(store.data_dir());

    let mut media_refs = MediaRefs::default();
    let (_, audio_ref) = media_store.import_as(&submission.audio, MediaKind::Audio)?;
    media_refs.audio.push(audio_ref);

    for attachment in &submission.attachments {
        let (kind, path) = media_store.import(attachment)?;
        match kind {
            MediaKind::Audio => media_refs.audio.push(path),
            MediaKind::Image => media_refs.image.push(path),
            MediaKind::Video => media_refs.video.push(path),
            MediaKind::File => media_refs.file.push(path),
        }
    }

    let record = Record {
        id: Uuid::new_v4(),
        timestamp: Utc::now(),
        submitter: submission
            .submitter
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| ANONYMOUS.to_string()),
        coordinates: Coordinates {
            latitude: submission.latitude,
            longitude: submission.longitude,
        },
        category: submission.category,
        language: submission.language,
        transcript: derived.transcript,
        translation: derived.translation,
        summary: derived.summary,
        prompt: derived.prompt,
        media: media_refs,
    };

    let path = store.save(&record)?;
    tracing::info!("saved record {} to {}", record.id, path.display());
    Ok(record)
}

/// One multimodal call: the audio goes inline with the prompt, the response
/// is split into transcript, translation, and summary on section markers.
async fn run_combined(
    config: &Config,
    language: &str,
    audio: Vec<u8>,
    mime: &str,
) -> Result<Derived> {
    let client = GenerateClient::new(&config.generate)?;
    let prompt = prompt::combined_prompt(language);

    let response = client
        .generate(
            &prompt,
            Some(InlineMedia {
                mime_type: mime.to_string(),
                data: audio,
            }),
        )
        .await?;

    match extract::extract_sections(&response, language) {
        Ok(sections) => Ok(Derived {
            transcript: sections.transcript,
            translation: sections.translation,
            summary: Some(sections.summary),
            prompt,
        }),
        Err(e) => {
            // No partial recovery: nothing of a failed extraction is kept,
            // but the raw text is surfaced for manual inspection.
            tracing::warn!("raw response for manual inspection:\n{response}");
            Err(e)
        }
    }
}

/// Transcription service first, then a translation-only generative call
/// whose whole trimmed response is the English text. No summary.
async fn run_staged(
    config: &Config,
    language: &str,
    audio: Vec<u8>,
    file_name: &str,
    mime: &str,
) -> Result<Derived> {
    let stt = TranscribeClient::new(&config.transcribe)?;
    let transcription = stt.transcribe(audio, file_name, mime).await?;

    if transcription.text.is_empty() {
        return Err(GriotError::Transcribe(
            "transcription came back empty".to_string(),
        ));
    }
    if let Some(tag) = &transcription.language {
        tracing::debug!("service tagged the audio as '{tag}'");
    }

    let client = GenerateClient::new(&config.generate)?;
    let prompt = prompt::translation_prompt(language, &transcription.text);
    let translation = client.generate(&prompt, None).await?;

    Ok(Derived {
        transcript: transcription.text,
        translation: translation.trim().to_string(),
        summary: None,
        prompt,
    })
}

fn validate(submission: &Submission) -> Result<()> {
    if !CATEGORIES.contains(&submission.category.as_str()) {
        return Err(GriotError::Other(format!(
            "unknown category '{}' (available: {})",
            submission.category,
            CATEGORIES.join(", ")
        )));
    }
    if !LANGUAGES.contains(&submission.language.as_str()) {
        return Err(GriotError::Other(format!(
            "unsupported language '{}' (available: {})",
            submission.language,
            LANGUAGES.join(", ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> Submission {
        Submission {
            audio: PathBuf::from("clip.mp3"),
            submitter: None,
            latitude: None,
            longitude: None,
            category: "Story".to_string(),
            language: "Telugu".to_string(),
            attachments: Vec::new(),
        }
    }

    #[test]
    fn known_category_and_language_validate() {
        assert!(validate(&submission()).is_ok());
    }

    #[test]
    fn unknown_category_is_rejected() {
        let mut s = submission();
        s.category = "Gossip".to_string();
        let err = validate(&s).unwrap_err();
        assert!(err.to_string().contains("unknown category"));
    }

    #[test]
    fn unsupported_language_is_rejected() {
        let mut s = submission();
        s.language = "Klingon".to_string();
        let err = validate(&s).unwrap_err();
        assert!(err.to_string().contains("unsupported language"));
    }
}
