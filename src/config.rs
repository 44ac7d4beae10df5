use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{GriotError, Result};

fn default_transcribe_endpoint() -> String {
    "https://api.openai.com/v1/audio/transcriptions".to_string()
}

fn default_transcribe_model() -> String {
    "whisper-1".to_string()
}

const fn default_transcribe_timeout_secs() -> u64 {
    120
}

fn default_generate_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_generate_model() -> String {
    "gemini-1.5-flash".to_string()
}

const fn default_generate_timeout_secs() -> u64 {
    15
}

fn default_language() -> String {
    "Telugu".to_string()
}

fn default_data_directory() -> String {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join("griot").to_string_lossy().to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub transcribe: TranscribeConfig,

    #[serde(default)]
    pub generate: GenerateConfig,

    #[serde(default)]
    pub submit: SubmitConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

/// Hosted transcription service (OpenAI-compatible audio endpoint).
#[derive(Debug, Clone, Deserialize)]
pub struct TranscribeConfig {
    #[serde(default = "default_transcribe_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_transcribe_model")]
    pub model: String,

    pub api_key: Option<String>,

    #[serde(default = "default_transcribe_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranscribeConfig {
    fn default() -> Self {
        Self {
            endpoint: default_transcribe_endpoint(),
            model: default_transcribe_model(),
            api_key: None,
            timeout_secs: default_transcribe_timeout_secs(),
        }
    }
}

impl TranscribeConfig {
    /// Config file key first, `OPENAI_API_KEY` as fallback.
    pub fn resolve_api_key(&self) -> Result<String> {
        resolve_key(
            self.api_key.as_deref(),
            std::env::var("OPENAI_API_KEY").ok(),
            "transcribe.api_key",
            "OPENAI_API_KEY",
        )
    }
}

/// Hosted generative-text service (Gemini-compatible `generateContent` endpoint).
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateConfig {
    #[serde(default = "default_generate_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_generate_model")]
    pub model: String,

    pub api_key: Option<String>,

    #[serde(default = "default_generate_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            endpoint: default_generate_endpoint(),
            model: default_generate_model(),
            api_key: None,
            timeout_secs: default_generate_timeout_secs(),
        }
    }
}

impl GenerateConfig {
    /// Config file key first, `GEMINI_API_KEY` as fallback.
    pub fn resolve_api_key(&self) -> Result<String> {
        resolve_key(
            self.api_key.as_deref(),
            std::env::var("GEMINI_API_KEY").ok(),
            "generate.api_key",
            "GEMINI_API_KEY",
        )
    }
}

fn resolve_key(
    configured: Option<&str>,
    env: Option<String>,
    config_key: &str,
    env_var: &str,
) -> Result<String> {
    if let Some(key) = configured
        && !key.is_empty()
    {
        return Ok(key.to_string());
    }
    if let Some(key) = env
        && !key.is_empty()
    {
        return Ok(key);
    }
    Err(GriotError::Config(format!(
        "no API key: set {config_key} in the config file or export {env_var}"
    )))
}

/// Which submission pipeline to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pipeline {
    /// One multimodal generative call does transcription, translation, and
    /// summary; the response is split on section markers.
    #[default]
    Combined,

    /// The transcription service produces the transcript, then a
    /// translation-only generative call produces the English text.
    Staged,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitConfig {
    #[serde(default)]
    pub pipeline: Pipeline,

    /// Source language assumed when `submit` is not given one explicitly.
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            pipeline: Pipeline::default(),
            language: default_language(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the record JSON files and the uploads tree.
    #[serde(default = "default_data_directory")]
    pub directory: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            directory: default_data_directory(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GriotError::Config(format!(
                "config file not found: {} — run `griot init` or use --config to specify a path",
                path.display()
            )));
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            GriotError::Config(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let config: Self = serde_yaml_ng::from_str(&contents).map_err(|e| {
            GriotError::Config(format!(
                "failed to parse config file {}: {e}",
                path.display()
            ))
        })?;

        Ok(config)
    }

    #[must_use]
    pub fn default_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        config_dir.join("griot/config.yaml")
    }

    /// Expand `~` in a path string to the user's home directory.
    #[must_use]
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let yaml = "{}";
        let config: Config =
            serde_yaml_ng::from_str(yaml).unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert_eq!(config.generate.model, "gemini-1.5-flash");
        assert_eq!(config.generate.timeout_secs, 15);
        assert_eq!(config.transcribe.model, "whisper-1");
        assert_eq!(config.submit.pipeline, Pipeline::Combined);
        assert_eq!(config.submit.language, "Telugu");
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
transcribe:
  endpoint: https://stt.example.com/v1/audio/transcriptions
  model: whisper-large
  api_key: sk-test
  timeout_secs: 60

generate:
  endpoint: https://llm.example.com/v1beta
  model: gemini-2.0-flash
  api_key: gm-test
  timeout_secs: 30

submit:
  pipeline: staged
  language: Hindi

store:
  directory: /tmp/griot-test
"#;
        let config: Config =
            serde_yaml_ng::from_str(yaml).unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert_eq!(
            config.transcribe.endpoint,
            "https://stt.example.com/v1/audio/transcriptions"
        );
        assert_eq!(config.transcribe.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.transcribe.timeout_secs, 60);
        assert_eq!(config.generate.model, "gemini-2.0-flash");
        assert_eq!(config.generate.timeout_secs, 30);
        assert_eq!(config.submit.pipeline, Pipeline::Staged);
        assert_eq!(config.submit.language, "Hindi");
        assert_eq!(config.store.directory, "/tmp/griot-test");
    }

    #[test]
    fn missing_config_file_gives_error() {
        let result = Config::load(Path::new("/nonexistent/config.yaml"));
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("config file not found"));
    }

    #[test]
    fn expand_tilde_path() {
        let expanded = Config::expand_path("~/griot");
        assert!(!expanded.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn key_from_config_wins_over_env() {
        let key = resolve_key(Some("from-config"), Some("from-env".to_string()), "k", "K")
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(key, "from-config");
    }

    #[test]
    fn key_falls_back_to_env() {
        let key = resolve_key(None, Some("from-env".to_string()), "k", "K")
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(key, "from-env");
    }

    #[test]
    fn empty_keys_are_a_config_error() {
        let result = resolve_key(Some(""), None, "generate.api_key", "GEMINI_API_KEY");
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("GEMINI_API_KEY"));
    }
}
