//! Study material payloads.
//!
//! The generation service takes a document as a data URI,
//! `data:<media type>;base64,<content>`, so the media type travels with the
//! bytes.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use super::UploadFile;
use crate::error::{Error, Result};

/// A payload split back into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    /// Media type from the URI header.
    pub media_type: String,
    /// Decoded content.
    pub bytes: Vec<u8>,
}

/// Encode a file as a base64 data URI.
///
/// # Errors
///
/// Returns an error if the file has no media type.
pub fn encode_data_uri(file: &UploadFile) -> Result<String> {
    if file.media_type.trim().is_empty() {
        return Err(Error::encoding(&file.name, "missing media type"));
    }
    Ok(format!(
        "data:{};base64,{}",
        file.media_type,
        BASE64.encode(&file.bytes)
    ))
}

/// Decode a base64 data URI produced by [`encode_data_uri`].
///
/// # Errors
///
/// Returns an error if the URI is not a base64 data URI or the content is
/// not valid base64.
pub fn decode_data_uri(uri: &str) -> Result<DecodedPayload> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| Error::encoding("payload", "not a data URI"))?;
    let (header, content) = rest
        .split_once(',')
        .ok_or_else(|| Error::encoding("payload", "data URI has no content"))?;
    let media_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| Error::encoding("payload", "data URI is not base64 encoded"))?;

    let bytes = BASE64
        .decode(content)
        .map_err(|e| Error::encoding("payload", e.to_string()))?;

    Ok(DecodedPayload {
        media_type: media_type.to_string(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_text_file() {
        let file = UploadFile::new("notes.txt", "text/plain", b"hello".to_vec());
        assert_eq!(
            encode_data_uri(&file).unwrap(),
            "data:text/plain;base64,aGVsbG8="
        );
    }

    #[test]
    fn test_encode_empty_content() {
        let file = UploadFile::new("empty.md", "text/markdown", Vec::new());
        assert_eq!(encode_data_uri(&file).unwrap(), "data:text/markdown;base64,");
    }

    #[test]
    fn test_encode_requires_media_type() {
        let file = UploadFile::new("mystery", "", b"x".to_vec());
        let err = encode_data_uri(&file).unwrap_err();
        assert!(err.to_string().contains("mystery"));
    }

    #[test]
    fn test_decode_reverses_encode() {
        let bytes: Vec<u8> = (0..=255).collect();
        let file = UploadFile::new("blob.pdf", "application/pdf", bytes.clone());

        let decoded = decode_data_uri(&encode_data_uri(&file).unwrap()).unwrap();
        assert_eq!(decoded.media_type, "application/pdf");
        assert_eq!(decoded.bytes, bytes);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(decode_data_uri("text/plain;base64,aGVsbG8=").is_err());
        assert!(decode_data_uri("data:text/plain;base64").is_err());
        assert!(decode_data_uri("data:text/plain,hello").is_err());
        assert!(decode_data_uri("data:text/plain;base64,!!!").is_err());
    }
}
