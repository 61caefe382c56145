use serde::Deserialize;
use std::str::FromStr;

/// Encodings whose per-chunk outputs can be concatenated into one playable
/// stream. Header-carrying formats such as LINEAR16 are left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AudioFormat {
    #[serde(rename = "MP3")]
    Mp3,
    #[serde(rename = "OGG_OPUS")]
    OggOpus,
}

impl AudioFormat {
    /// Name of the encoding in the Google TTS `audioConfig`
    pub fn encoding(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "MP3",
            AudioFormat::OggOpus => "OGG_OPUS",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::OggOpus => "ogg",
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        [AudioFormat::Mp3, AudioFormat::OggOpus]
            .into_iter()
            .find(|format| format.extension() == extension)
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::OggOpus => "audio/ogg",
        }
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MP3" => Ok(AudioFormat::Mp3),
            "OGG_OPUS" => Ok(AudioFormat::OggOpus),
            other => Err(format!(
                "unsupported audio encoding {:?} (expected MP3 or OGG_OPUS)",
                other
            )),
        }
    }
}
