//! Data-URL encoding for binary attribute payloads.
//!
//! Binary attributes store the selected file as `data:<mime>;base64,<payload>`.
//! MIME type comes from the file extension; unknown extensions fall back to
//! `application/octet-stream`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;

pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Extension → MIME table (lowercase extensions).
const MIME_TYPES: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("csv", "text/csv"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("js", "text/javascript"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("bmp", "image/bmp"),
    ("ico", "image/vnd.microsoft.icon"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("mov", "video/quicktime"),
];

/// MIME type for a file path, by extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .and_then(|ext| {
            MIME_TYPES
                .iter()
                .find(|(e, _)| *e == ext)
                .map(|(_, mime)| *mime)
        })
        .unwrap_or(DEFAULT_MIME)
}

/// Encode bytes as a base64 data URL.
pub fn encode(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Borrowed view over a data-URL string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUrl<'a> {
    mime: &'a str,
    payload: &'a str,
}

impl<'a> DataUrl<'a> {
    /// Parse a base64 data URL. Non-base64 (percent-encoded) URLs are rejected.
    pub fn parse(s: &'a str) -> Option<Self> {
        let rest = s.strip_prefix("data:")?;
        let (meta, payload) = rest.split_once(',')?;
        let mime = meta.strip_suffix(";base64")?;
        Some(Self {
            mime: if mime.is_empty() { DEFAULT_MIME } else { mime },
            payload,
        })
    }

    pub fn mime(&self) -> &'a str {
        self.mime
    }

    pub fn payload(&self) -> &'a str {
        self.payload
    }

    /// Decoded byte count, computed from the base64 length and padding.
    pub fn decoded_len(&self) -> usize {
        let len = self.payload.len();
        let padding = self.payload.bytes().rev().take_while(|&b| b == b'=').count();
        (len / 4 * 3).saturating_sub(padding)
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_lookup() {
        assert_eq!(mime_for_path(Path::new("photo.PNG")), "image/png");
        assert_eq!(mime_for_path(Path::new("/tmp/a.txt")), "text/plain");
        assert_eq!(mime_for_path(Path::new("blob.xyz")), DEFAULT_MIME);
        assert_eq!(mime_for_path(Path::new("noext")), DEFAULT_MIME);
    }

    #[test]
    fn test_encode_known_bytes() {
        assert_eq!(encode(b"hello", "text/plain"), "data:text/plain;base64,aGVsbG8=");
        assert_eq!(encode(&[], DEFAULT_MIME), "data:application/octet-stream;base64,");
    }

    #[test]
    fn test_parse_and_decode() {
        let url = DataUrl::parse("data:text/plain;base64,aGVsbG8=").unwrap();
        assert_eq!(url.mime(), "text/plain");
        assert_eq!(url.payload(), "aGVsbG8=");
        assert_eq!(url.decoded_len(), 5);
        assert_eq!(url.decode().unwrap(), b"hello");

        assert!(DataUrl::parse("hello").is_none());
        assert!(DataUrl::parse("data:text/plain,hello").is_none());
        assert_eq!(DataUrl::parse("data:;base64,").unwrap().mime(), DEFAULT_MIME);
    }

    #[test]
    fn test_decoded_len_matches_decode() {
        for len in 0..10usize {
            let bytes: Vec<u8> = (0..len as u8).collect();
            let s = encode(&bytes, "application/octet-stream");
            let url = DataUrl::parse(&s).unwrap();
            assert_eq!(url.decoded_len(), len);
        }
    }
}
