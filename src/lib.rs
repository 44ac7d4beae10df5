//! griot archives spoken knowledge. It sends submitted audio to hosted
//! transcription and generative-AI services, recovers the transcript,
//! English translation, and structured summary from the marker-delimited
//! response text, and stores each submission as one JSON record in a flat
//! on-disk directory alongside the raw uploaded media.

pub mod config;
pub mod error;
pub mod extract;
pub mod prompt;
pub mod record;
pub mod remote;
pub mod store;
pub mod submit;
