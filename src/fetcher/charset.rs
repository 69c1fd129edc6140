//! Decoding of listing page bodies to UTF-8.
//!
//! Government listing pages are not reliably UTF-8, so the encoding is taken
//! from the `Content-Type` header, then from a `<meta>` declaration near the
//! top of the document, then guessed with `chardetng`. Malformed sequences are
//! replaced instead of failing: a few garbled characters in navigation text
//! must not prevent finding the download links.

use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::Regex;

/// Bytes inspected for a `<meta>` declaration and for detection.
const SNIFF_LEN: usize = 4096;

static HEADER_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s;/>]+)"#).unwrap()
});

/// Decode `body` to a UTF-8 string, returning the encoding that was used.
pub fn decode_html(content_type: Option<&str>, body: &[u8]) -> (String, &'static Encoding) {
    let encoding = sniff_encoding(content_type, body);
    let (decoded, used, _had_errors) = encoding.decode(body);
    (decoded.into_owned(), used)
}

fn sniff_encoding(content_type: Option<&str>, body: &[u8]) -> &'static Encoding {
    if let Some(encoding) = content_type.and_then(|ct| label_from(&HEADER_CHARSET, ct)) {
        return encoding;
    }

    let head = &body[..body.len().min(SNIFF_LEN)];
    // META_CHARSET also covers the http-equiv form since it only looks for
    // `charset=` inside any meta tag.
    if let Some(encoding) = label_from(&META_CHARSET, &String::from_utf8_lossy(head)) {
        return encoding;
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(head, head.len() == body.len());
    detector.guess(None, true)
}

fn label_from(pattern: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let label = pattern.captures(haystack)?.get(1)?.as_str();
    Encoding::for_label(label.trim().as_bytes())
}
