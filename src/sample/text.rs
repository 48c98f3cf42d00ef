//! Text-safe sample encoding — turns embedded base64 (optionally a data URL) back into bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Decode an embedded base64 payload into raw container bytes.
///
/// Accepts a bare payload or a `data:<mime>;base64,<payload>` URL. Whitespace
/// is ignored, the URL-safe alphabet (`-`, `_`) is mapped onto the standard
/// one, and stripped `=` padding is restored before decoding.
pub fn decode_text(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(normalize(text))
}

fn normalize(text: &str) -> String {
    let text = text.trim();
    let payload = match text.strip_prefix("data:") {
        Some(url) => url.split_once(',').map_or(url, |(_, payload)| payload),
        None => text,
    };

    let mut normalized: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    while normalized.len() % 4 != 0 {
        normalized.push('=');
    }
    normalized
}
