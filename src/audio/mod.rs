use std::fmt::Display;

/// Upper bound on an uploaded audio clip (25 MiB).
pub const MAX_AUDIO_SIZE: usize = 25 * 1024 * 1024;

pub const DEFAULT_MIME_TYPE: &str = "audio/ogg";

#[derive(Debug, PartialEq)]
pub enum AudioError {
    PayloadTooLarge { size: usize, limit: usize },
}

impl Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::PayloadTooLarge { size, limit } => {
                write!(f, "Audio too large: {} bytes (limit {})", size, limit)
            }
        }
    }
}

impl std::error::Error for AudioError {}

/// One uploaded clip, held in memory only for the duration of the request.
#[derive(Debug, Clone)]
pub struct AudioPayload {
    pub data: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}

impl AudioPayload {
    pub fn new(
        data: Vec<u8>,
        filename: Option<&str>,
        content_type: Option<&str>,
        limit: usize,
    ) -> Result<Self, AudioError> {
        if data.len() > limit {
            return Err(AudioError::PayloadTooLarge { size: data.len(), limit });
        }

        let filename = filename
            .filter(|name| !name.is_empty())
            .unwrap_or("unknown")
            .to_string();
        let mime_type = mime_type_for(&filename, content_type).to_string();

        Ok(Self { data, filename, mime_type })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The file extension wins over whatever content type the client declared.
pub fn mime_type_for<'a>(filename: &str, content_type: Option<&'a str>) -> &'a str {
    if filename.ends_with(".ogg") {
        "audio/ogg"
    } else if filename.ends_with(".m4a") {
        "audio/mp4"
    } else if filename.ends_with(".wav") {
        "audio/wav"
    } else if filename.ends_with(".mp3") {
        "audio/mpeg"
    } else {
        content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
    }
}
