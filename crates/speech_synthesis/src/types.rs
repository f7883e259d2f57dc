//! Types for speech synthesis
//!
//! Contains the audio container returned by synthesis providers.

use serde::{Deserialize, Serialize};

/// Encoded audio formats produced by synthesis providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MPEG-1/2 Audio Layer III
    #[default]
    Mp3,
}

/// Container for encoded audio bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioData {
    data: Vec<u8>,
    format: AudioFormat,
}

impl AudioData {
    /// Create new audio data
    #[must_use]
    pub const fn new(data: Vec<u8>, format: AudioFormat) -> Self {
        Self { data, format }
    }

    /// Get the raw audio bytes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume and return the raw audio bytes
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Get the audio format
    #[must_use]
    pub const fn format(&self) -> AudioFormat {
        self.format
    }

    /// Get the size of the audio data in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Check if the audio data is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append another clip of the same format
    ///
    /// MP3 streams are frame based, so concatenated clips play back to back.
    pub fn append(&mut self, other: Self) {
        self.data.extend(other.data);
    }
}

/// Check for an ID3v2 tag or an MPEG audio frame sync word
#[must_use]
pub fn looks_like_mp3(bytes: &[u8]) -> bool {
    match bytes {
        [b'I', b'D', b'3', ..] => true,
        // 11 set sync bits, then a layer field that is not "reserved"
        [0xFF, second, ..] => second & 0xE0 == 0xE0 && second & 0x06 != 0,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod audio_format {
        use super::*;

        #[test]
        fn serializes_lowercase() {
            let json = serde_json::to_string(&AudioFormat::Mp3).unwrap();
            assert_eq!(json, "\"mp3\"");
        }
    }

    mod audio_data {
        use super::*;

        #[test]
        fn new_creates_audio_data() {
            let data = vec![1, 2, 3, 4];
            let audio = AudioData::new(data.clone(), AudioFormat::Mp3);

            assert_eq!(audio.data(), &data);
            assert_eq!(audio.format(), AudioFormat::Mp3);
            assert_eq!(audio.size_bytes(), 4);
        }

        #[test]
        fn is_empty_reflects_data() {
            assert!(AudioData::new(vec![], AudioFormat::Mp3).is_empty());
            assert!(!AudioData::new(vec![1], AudioFormat::Mp3).is_empty());
        }

        #[test]
        fn append_concatenates_clips() {
            let mut first = AudioData::new(vec![0xFF, 0xFB], AudioFormat::Mp3);
            first.append(AudioData::new(vec![0x90, 0x00], AudioFormat::Mp3));
            assert_eq!(first.into_data(), vec![0xFF, 0xFB, 0x90, 0x00]);
        }

        #[test]
        fn detects_frame_sync() {
            assert!(looks_like_mp3(&[0xFF, 0xFB, 0x90, 0x00]));
        }

        #[test]
        fn detects_id3_tag() {
            assert!(looks_like_mp3(b"ID3\x04\x00\x00"));
        }

        #[test]
        fn rejects_other_data() {
            assert!(!looks_like_mp3(b"OggS"));
            assert!(!looks_like_mp3(&[0xFF]));
            assert!(!looks_like_mp3(&[0xFF, 0xE0]));
            assert!(!looks_like_mp3(&[]));
        }
    }
}
