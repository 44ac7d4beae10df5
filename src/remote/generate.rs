use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::GenerateConfig;
use crate::error::{GriotError, Result};
use crate::remote;

/// Raw media bytes sent inline with a prompt, base64-encoded on the wire.
#[derive(Debug, Clone)]
pub struct InlineMedia {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Client for the hosted generative-text API.
///
/// The service takes the API key in the query string and returns a single
/// text completion; recovering structure from that text is the caller's
/// problem (see [`crate::extract`]).
pub struct GenerateClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl GenerateClient {
    pub fn new(config: &GenerateConfig) -> Result<Self> {
        Ok(Self {
            client: remote::http_client(config.timeout_secs)?,
            endpoint: config.endpoint.clone(),
            api_key: config.resolve_api_key()?,
            model: config.model.clone(),
        })
    }

    /// Send the prompt (plus optional inline media) and return the first
    /// candidate's text.
    pub async fn generate(&self, prompt: &str, media: Option<InlineMedia>) -> Result<String> {
        let mut parts = vec![Part::Text {
            text: prompt.to_string(),
        }];
        if let Some(media) = media {
            parts.push(Part::Inline {
                inline_data: InlineData {
                    mime_type: media.mime_type,
                    data: STANDARD.encode(media.data),
                },
            });
        }

        let request = GenerateRequest {
            contents: vec![Content { parts }],
        };
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);

        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| GriotError::Generate(format!("generation request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(GriotError::Generate(format!(
                "generative API returned {status}: {body}"
            )));
        }

        let parsed: GenerateResponse = resp.json().await.map_err(|e| {
            GriotError::Generate(format!("failed to parse generation response: {e}"))
        })?;

        first_candidate_text(parsed)
    }
}

fn first_candidate_text(response: GenerateResponse) -> Result<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().find_map(|p| p.text))
        .ok_or_else(|| GriotError::Generate("response contained no text candidates".to_string()))
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    Inline { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_has_the_expected_wire_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: "translate this".to_string(),
                    },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: "audio/mpeg".to_string(),
                            data: STANDARD.encode(b"abc"),
                        },
                    },
                ],
            }],
        };
        let json = serde_json::to_value(&request).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(json["contents"][0]["parts"][0]["text"], "translate this");
        assert_eq!(
            json["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            "audio/mpeg"
        );
        assert_eq!(
            json["contents"][0]["parts"][1]["inline_data"]["data"],
            "YWJj"
        );
    }

    #[test]
    fn first_candidate_text_is_recovered() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "the completion"}], "role": "model"}}
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(body).unwrap_or_else(|e| panic!("{e}"));
        let text = first_candidate_text(parsed).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(text, "the completion");
    }

    #[test]
    fn textless_response_is_a_generation_error() {
        let body = r#"{"candidates": [{"content": {"parts": []}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(body).unwrap_or_else(|e| panic!("{e}"));
        assert!(first_candidate_text(parsed).is_err());
    }

    #[test]
    fn empty_candidate_list_is_a_generation_error() {
        let parsed: GenerateResponse =
            serde_json::from_str("{}").unwrap_or_else(|e| panic!("{e}"));
        assert!(first_candidate_text(parsed).is_err());
    }
}
