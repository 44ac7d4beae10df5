use std::io;

#[derive(Debug, thiserror::Error)]
pub enum GriotError {
    #[error("config error: {0}")]
    Config(String),

    #[error("transcription error: {0}")]
    Transcribe(String),

    #[error("generation error: {0}")]
    Generate(String),

    #[error("extraction error: {0}")]
    Extract(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, GriotError>;
