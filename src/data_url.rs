//! `data:<mime>;base64,<payload>` encoding

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::DecodeError;

/// A parsed data URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Encode arbitrary binary content as a base64 data URL.
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Parse a base64 data URL back into its MIME type and bytes.
pub fn parse(url: &str) -> Result<DataUrl, DecodeError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| DecodeError::InvalidDataUrl("missing data: scheme".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| DecodeError::InvalidDataUrl("missing ',' separator".to_string()))?;

    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| DecodeError::InvalidDataUrl(format!("not base64 encoded: {}", header)))?;

    Ok(DataUrl {
        mime_type: mime_type.to_string(),
        bytes: STANDARD.decode(payload)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_prefix() {
        assert_eq!(encode("text/plain", b"hi"), "data:text/plain;base64,aGk=");
        assert_eq!(encode("application/octet-stream", &[]), "data:application/octet-stream;base64,");
    }

    #[test]
    fn test_parse_binary() {
        let bytes: Vec<u8> = (0..=255).collect();
        let parsed = parse(&encode("image/png", &bytes)).unwrap();
        assert_eq!(parsed.mime_type, "image/png");
        assert_eq!(parsed.bytes, bytes);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(parse("image/png;base64,AAAA"), Err(DecodeError::InvalidDataUrl(_))));
        assert!(matches!(parse("data:image/png;base64"), Err(DecodeError::InvalidDataUrl(_))));
        assert!(matches!(parse("data:text/plain,hello"), Err(DecodeError::InvalidDataUrl(_))));
        assert!(matches!(parse("data:image/png;base64,@@@"), Err(DecodeError::Base64(_))));
    }
}
