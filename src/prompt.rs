//! Prompt construction for the generative service.
//!
//! The combined prompt dictates the exact section markers that
//! [`crate::extract`] later searches for, so the two modules share the
//! marker constants.

use crate::extract::{ENGLISH_MARKER, JSON_FENCE_CLOSE, JSON_FENCE_OPEN, SUMMARY_MARKER, transcription_marker};

/// Prompt for the single multimodal call: transcribe the attached audio,
/// translate it, and summarize it, in a fixed marker-delimited layout.
#[must_use]
pub fn combined_prompt(language: &str) -> String {
    let transcript_marker = transcription_marker(language);
    format!(
        "Transcribe the attached audio in {language}. Then translate the {language} \
transcription into fluent, natural English. Finally, analyze the English translation \
and produce a structured summary in JSON.\n\
If the content is a tutorial, the summary must contain a \"title\", a \"category\" \
(e.g. \"Pottery Tutorial\"), and an \"instructions\" array of numbered steps. \
Otherwise it must contain a \"title\", a \"category\" (e.g. \"General Summary\"), and \
a \"summary_text\" field.\n\
Preserve meaning, tone, and context throughout. The audio may mix in other languages \
or contain grammatical errors; focus on the essence of the content.\n\n\
Format the full response exactly as follows, including the markdown bolding:\n\n\
{transcript_marker}\n\
[{language} transcribed text]\n\n\
{ENGLISH_MARKER}\n\
[translated English text]\n\n\
{SUMMARY_MARKER}\n\
{JSON_FENCE_OPEN}\n\
{{\n\
  \"title\": \"Summary title\",\n\
  \"category\": \"Pottery Tutorial\" or \"General Summary\",\n\
  \"instructions\": [\"1. First step...\", \"2. Second step...\"]\n\
}}\n\
{JSON_FENCE_CLOSE}\n"
    )
}

/// Prompt for the staged pipeline's translation-only call. The reply is the
/// translated text and nothing else, so no markers are requested.
#[must_use]
pub fn translation_prompt(language: &str, transcript: &str) -> String {
    format!(
        "You are a professional translator. Translate the following {language} text into \
fluent, natural English. Preserve meaning, tone, and context. The input may mix in \
other languages or contain grammatical errors; focus on the essence of the content. \
Reply with the translated text only, no header or footer.\n\n\
{language}:\n\
\"\"\"{transcript}\"\"\""
    )
}
