pub mod credential;
pub mod document;
pub mod tts;
