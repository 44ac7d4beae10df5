use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Labels a submission can be filed under.
pub const CATEGORIES: &[&str] = &["Story", "Interview", "News", "Tutorial", "Other"];

/// Source languages the hosted services are asked to work in.
pub const LANGUAGES: &[&str] = &[
    "Hindi",
    "Bengali",
    "Marathi",
    "Telugu",
    "Tamil",
    "Gujarati",
    "Kannada",
    "Malayalam",
    "Punjabi",
    "Odia",
    "Assamese",
    "Urdu",
    "Nepali",
    "Konkani",
];

/// Name stored when the submitter leaves theirs blank.
pub const ANONYMOUS: &str = "Anonymous";

/// One archived submission. Written once at creation, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub submitter: String,
    pub coordinates: Coordinates,
    pub category: String,
    pub language: String,
    pub transcript: String,
    pub translation: String,

    /// Structured summary, when the generative service produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,

    /// The exact prompt sent to the generative service, kept for audit.
    pub prompt: String,

    #[serde(default, skip_serializing_if = "MediaRefs::is_empty")]
    pub media: MediaRefs,
}

impl Record {
    /// Title to show in listings: the summary's title when there is one,
    /// the category otherwise.
    #[must_use]
    pub fn title(&self) -> &str {
        match &self.summary {
            Some(Summary::Steps { title, .. } | Summary::Text { title, .. }) => title,
            _ => &self.category,
        }
    }

    /// First eight characters of the identifier, for compact display.
    #[must_use]
    pub fn short_id(&self) -> String {
        self.id.to_string().chars().take(8).collect()
    }

    /// One listing line: local timestamp, short id, title.
    #[must_use]
    pub fn display_label(&self) -> String {
        let time = self
            .timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S");
        format!("{time}  {}  {}", self.short_id(), self.title())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

/// The summary shape is chosen ad hoc by the upstream model: tutorials come
/// back as ordered steps, everything else as free text. Anything that fits
/// neither shape is preserved verbatim rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Summary {
    Steps {
        title: String,
        category: String,
        instructions: Vec<String>,
    },
    Text {
        title: String,
        category: String,
        summary_text: String,
    },
    Other(serde_json::Value),
}

/// Data-dir-relative paths of the raw uploaded media belonging to a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRefs {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audio: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub video: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file: Vec<String>,
}

impl MediaRefs {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.audio.is_empty()
            && self.image.is_empty()
            && self.video.is_empty()
            && self.file.is_empty()
    }
}
