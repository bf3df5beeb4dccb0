use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPage {
    pub text: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode page with {encoding}: {message}")]
    DecodeFailure { encoding: String, message: String },
}

/// Decode a stored listing page into text: BOM -> strict UTF-8 -> chardetng guess.
pub fn decode_page(bytes: &[u8]) -> Result<DecodedPage, DecodeError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    // Listing exports are almost always UTF-8; only guess when that fails.
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(DecodedPage {
            text: text.to_string(),
            encoding_label: UTF_8.name().to_string(),
        });
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    decode_with(bytes, encoding)
}

fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> Result<DecodedPage, DecodeError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(DecodeError::DecodeFailure {
            encoding: encoding.name().to_string(),
            message: "malformed byte sequence".into(),
        });
    }
    Ok(DecodedPage {
        text: text.into_owned(),
        encoding_label: encoding.name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::decode_page;

    #[test]
    fn utf8_with_sentinel_is_kept() {
        let page = decode_page("✨ Pikachu `1`".as_bytes()).unwrap();
        assert_eq!(page.text, "✨ Pikachu `1`");
        assert_eq!(page.encoding_label, "UTF-8");
    }

    #[test]
    fn utf16_bom_is_honoured() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "Lvl. 5".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let page = decode_page(&bytes).unwrap();
        assert_eq!(page.text, "Lvl. 5");
        assert_eq!(page.encoding_label, "UTF-16LE");
    }
}
