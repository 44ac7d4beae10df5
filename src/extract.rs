//! Section extraction from the generative service's free-text response.
//!
//! The response is expected to carry a transcription, an English
//! translation, and a fenced JSON summary, each behind a literal marker.
//! This is a linear scan over those markers, not a parser: if any marker
//! is missing or out of order the whole extraction is abandoned and the
//! caller is left with the raw text for manual inspection.

use crate::error::{GriotError, Result};
use crate::record::Summary;

pub const ENGLISH_MARKER: &str = "**English Translation:**";
pub const SUMMARY_MARKER: &str = "**Summary JSON:**";
pub const JSON_FENCE_OPEN: &str = "```json";
pub const JSON_FENCE_CLOSE: &str = "```";

/// The transcription marker depends on the declared source language.
#[must_use]
pub fn transcription_marker(language: &str) -> String {
    format!("**{language} Transcription:**")
}

/// The three sections recovered from one response.
#[derive(Debug, Clone, PartialEq)]
pub struct Sections {
    pub transcript: String,
    pub translation: String,
    pub summary: Summary,
}

/// Slice the text between consecutive markers, trimming whitespace, and
/// parse the fenced block as JSON. No partial recovery: every failure
/// returns an error and no fields.
pub fn extract_sections(response: &str, language: &str) -> Result<Sections> {
    let transcript_marker = transcription_marker(language);

    let transcript_at = response
        .find(&transcript_marker)
        .ok_or_else(|| missing(&transcript_marker))?;
    let english_at = response
        .find(ENGLISH_MARKER)
        .ok_or_else(|| missing(ENGLISH_MARKER))?;
    let fence_open_at = response
        .find(JSON_FENCE_OPEN)
        .ok_or_else(|| missing(JSON_FENCE_OPEN))?;

    let after_fence_open = fence_open_at + JSON_FENCE_OPEN.len();
    let fence_close_at = response[after_fence_open..]
        .find(JSON_FENCE_CLOSE)
        .map(|i| i + after_fence_open)
        .ok_or_else(|| {
            GriotError::Extract("summary JSON fence is never closed".to_string())
        })?;

    if transcript_at >= english_at || english_at >= fence_open_at {
        return Err(GriotError::Extract(
            "response sections are out of order".to_string(),
        ));
    }

    let transcript = response[transcript_at + transcript_marker.len()..english_at].trim();

    // The summary heading sits between the translation and the fence when
    // the model follows the requested format; it is not translation text.
    let translation = response[english_at + ENGLISH_MARKER.len()..fence_open_at].trim();
    let translation = translation
        .strip_suffix(SUMMARY_MARKER)
        .map_or(translation, str::trim_end);

    let json_text = response[after_fence_open..fence_close_at].trim();

    let summary: Summary = serde_json::from_str(json_text)
        .map_err(|e| GriotError::Extract(format!("summary block is not valid JSON: {e}")))?;

    Ok(Sections {
        transcript: transcript.to_string(),
        translation: translation.to_string(),
        summary,
    })
}

fn missing(marker: &str) -> GriotError {
    GriotError::Extract(format!("response is missing the '{marker}' section"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = "\
**Telugu Transcription:**
మట్టి పాత్రలు తయారు చేయడం ఒక కళ.

**English Translation:**
Making clay pots is an art.

**Summary JSON:**
```json
{
  \"title\": \"Clay pot making\",
  \"category\": \"Pottery Tutorial\",
  \"instructions\": [\"1. Knead the clay.\", \"2. Center it on the wheel.\"]
}
```
";

    #[test]
    fn recovers_all_three_sections() {
        let sections =
            extract_sections(RESPONSE, "Telugu").unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(sections.transcript, "మట్టి పాత్రలు తయారు చేయడం ఒక కళ.");
        assert_eq!(sections.translation, "Making clay pots is an art.");
        match sections.summary {
            Summary::Steps {
                title,
                instructions,
                ..
            } => {
                assert_eq!(title, "Clay pot making");
                assert_eq!(instructions.len(), 2);
            }
            other => panic!("expected a steps summary, got {other:?}"),
        }
    }

    #[test]
    fn surrounding_whitespace_is_stripped() {
        let response = "**Hindi Transcription:**\n\n\n  text  \n\n\
            **English Translation:**\n\n  translated  \n\n\
            ```json\n{\"title\": \"T\", \"category\": \"General Summary\", \"summary_text\": \"s\"}\n```";
        let sections = extract_sections(response, "Hindi").unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(sections.transcript, "text");
        assert_eq!(sections.translation, "translated");
    }

    #[test]
    fn text_summary_shape_is_accepted() {
        let response = "**Tamil Transcription:**\nt\n\
            **English Translation:**\ne\n\
            ```json\n{\"title\": \"A story\", \"category\": \"General Summary\", \"summary_text\": \"Once upon a time.\"}\n```";
        let sections = extract_sections(response, "Tamil").unwrap_or_else(|e| panic!("{e}"));
        match sections.summary {
            Summary::Text { summary_text, .. } => {
                assert_eq!(summary_text, "Once upon a time.");
            }
            other => panic!("expected a text summary, got {other:?}"),
        }
    }

    #[test]
    fn summary_heading_is_not_part_of_the_translation() {
        let sections =
            extract_sections(RESPONSE, "Telugu").unwrap_or_else(|e| panic!("{e}"));
        assert!(!sections.translation.contains("Summary JSON"));
    }

    #[test]
    fn missing_transcription_marker_fails() {
        let response = "**English Translation:**\ne\n```json\n{}\n```";
        let err = extract_sections(response, "Telugu").unwrap_err();
        assert!(err.to_string().contains("Telugu Transcription"));
    }

    #[test]
    fn missing_translation_marker_fails() {
        let response = "**Telugu Transcription:**\nt\n```json\n{}\n```";
        let err = extract_sections(response, "Telugu").unwrap_err();
        assert!(err.to_string().contains("English Translation"));
    }

    #[test]
    fn missing_fence_fails() {
        let response = "**Telugu Transcription:**\nt\n**English Translation:**\ne\n";
        let err = extract_sections(response, "Telugu").unwrap_err();
        assert!(err.to_string().contains("```json"));
    }

    #[test]
    fn unclosed_fence_fails() {
        let response =
            "**Telugu Transcription:**\nt\n**English Translation:**\ne\n```json\n{\"title\": 1}";
        let err = extract_sections(response, "Telugu").unwrap_err();
        assert!(err.to_string().contains("never closed"));
    }

    #[test]
    fn out_of_order_sections_fail() {
        let response = "**English Translation:**\ne\n\
            **Telugu Transcription:**\nt\n\
            ```json\n{\"title\": \"T\", \"category\": \"C\", \"summary_text\": \"s\"}\n```";
        let err = extract_sections(response, "Telugu").unwrap_err();
        assert!(err.to_string().contains("out of order"));
    }

    #[test]
    fn invalid_summary_json_fails_whole_extraction() {
        let response = "**Telugu Transcription:**\nt\n\
            **English Translation:**\ne\n\
            ```json\n{not json}\n```";
        let err = extract_sections(response, "Telugu").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn wrong_language_marker_fails() {
        // The response announces Telugu, the submission declared Hindi.
        let err = extract_sections(RESPONSE, "Hindi").unwrap_err();
        assert!(err.to_string().contains("Hindi Transcription"));
    }
}
