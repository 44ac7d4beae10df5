use reqwest::Client;
use serde::Deserialize;

use crate::config::TranscribeConfig;
use crate::error::{GriotError, Result};
use crate::remote;

/// Plain transcript text plus the language tag reported by the service.
#[derive(Debug, Clone)]
pub struct Transcription {
    pub text: String,
    pub language: Option<String>,
}

/// Client for the hosted transcription API.
pub struct TranscribeClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl TranscribeClient {
    pub fn new(config: &TranscribeConfig) -> Result<Self> {
        Ok(Self {
            client: remote::http_client(config.timeout_secs)?,
            endpoint: config.endpoint.clone(),
            api_key: config.resolve_api_key()?,
            model: config.model.clone(),
        })
    }

    /// Upload the audio as a multipart form and return the transcript.
    pub async fn transcribe(
        &self,
        audio: Vec<u8>,
        file_name: &str,
        mime: &str,
    ) -> Result<Transcription> {
        let file_part = reqwest::multipart::Part::bytes(audio)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|e| GriotError::Transcribe(format!("failed to set MIME type: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .part("file", file_part);

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| GriotError::Transcribe(format!("transcription request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(GriotError::Transcribe(format!(
                "transcription API returned {status}: {body}"
            )));
        }

        let parsed: TranscriptionResponse = resp.json().await.map_err(|e| {
            GriotError::Transcribe(format!("failed to parse transcription response: {e}"))
        })?;

        Ok(Transcription {
            text: parsed.text.trim().to_string(),
            language: parsed.language,
        })
    }
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
    language: Option<String>,
}
