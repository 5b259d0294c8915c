//! Pre-chunking content extraction.
//!
//! Repository blobs arrive either as plain text or base64-transported bytes, and
//! some paths name binary formats that should never reach the chunker. This module
//! screens those out and decodes base64 payloads back into text.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use std::sync::OnceLock;

/// Extensions that always indicate non-text content.
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "ico", "pdf", "zip", "tar", "gz", "woff", "woff2", "ttf",
    "eot",
];

fn base64_alphabet() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9+/]+=*$").expect("valid base64 pattern"))
}

/// Extract usable text from raw blob content, or `None` for binary files.
///
/// Known binary extensions are rejected outright. Content that looks like base64
/// (pure base64 alphabet, longer than 100 characters) is decoded first; anything
/// that fails to decode as base64 or as UTF-8 falls back to the raw string.
pub fn extract_text(content: &str, file_path: &str) -> Option<String> {
    if has_binary_extension(file_path) {
        return None;
    }

    let trimmed = content.trim();
    if trimmed.len() > 100 && base64_alphabet().is_match(trimmed) {
        if let Ok(bytes) = STANDARD.decode(trimmed) {
            if let Ok(decoded) = String::from_utf8(bytes) {
                return Some(decoded);
            }
        }
        // Looked like base64 but was not; treat it as ordinary text.
    }

    Some(content.to_string())
}

fn has_binary_extension(file_path: &str) -> bool {
    std::path::Path::new(file_path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            BINARY_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_extensions_are_rejected() {
        assert!(extract_text("anything", "logo.png").is_none());
        assert!(extract_text("anything", "font.WOFF2").is_none());
        assert!(extract_text("anything", "doc.pdf").is_none());
    }

    #[test]
    fn plain_text_passes_through() {
        let text = "fn main() {}\n";
        assert_eq!(extract_text(text, "src/main.rs").as_deref(), Some(text));
    }

    #[test]
    fn long_base64_is_decoded() {
        let original = "x".repeat(120);
        let encoded = STANDARD.encode(&original);
        assert_eq!(
            extract_text(&encoded, "src/lib.rs").as_deref(),
            Some(original.as_str())
        );
    }

    #[test]
    fn short_base64_like_text_is_left_alone() {
        // Under the length threshold, even pure-alphabet text is kept raw.
        let text = "deadbeef";
        assert_eq!(extract_text(text, "hash.txt").as_deref(), Some(text));
    }

    #[test]
    fn invalid_base64_falls_back_to_raw() {
        // Pure alphabet but bad padding for its length.
        let text = "A".repeat(101);
        assert_eq!(extract_text(&text, "blob.txt").as_deref(), Some(text.as_str()));
    }

    #[test]
    fn base64_of_non_utf8_falls_back_to_raw() {
        let encoded = STANDARD.encode([0xffu8; 90]);
        assert!(encoded.len() > 100);
        assert_eq!(
            extract_text(&encoded, "data.txt").as_deref(),
            Some(encoded.as_str())
        );
    }
}
