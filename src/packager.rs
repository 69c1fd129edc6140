//! Turning a converted payload into an HTTP attachment.
//!
//! Converters only produce an [`OutputPayload`]; this is the one place that
//! knows about `Content-Type` and `Content-Disposition`.

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

/// Used when a display name sanitizes to nothing.
pub const FALLBACK_FILENAME: &str = "latest";

/// Bytes ready to send, with the name and type they should be sent under.
#[derive(Debug, Clone)]
pub struct OutputPayload {
    pub bytes: Bytes,
    pub filename: String,
    pub mime_type: &'static str,
}

impl OutputPayload {
    /// Build a payload named `<sanitized display name>.<extension>`.
    pub fn new(
        bytes: impl Into<Bytes>,
        display_name: &str,
        extension: &str,
        mime_type: &'static str,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            filename: format!("{}.{}", file_stem(display_name), extension),
            mime_type,
        }
    }
}

/// ASCII-only filename for a `Content-Disposition` header.
///
/// Non-ASCII characters are dropped, whitespace runs become a single `_`, and
/// parentheses, double quotes, backslashes and control characters are
/// removed. The result contains none of the characters any step acts on, so
/// sanitizing twice changes nothing.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for c in name.chars().filter(char::is_ascii) {
        if c.is_ascii_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if matches!(c, '(' | ')' | '"' | '\\') || c.is_ascii_control() {
            continue;
        }
        out.push(c);
    }

    out
}

fn file_stem(display_name: &str) -> String {
    let stem = sanitize_filename(display_name);
    if stem.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        stem
    }
}

fn content_disposition(filename: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

impl IntoResponse for OutputPayload {
    fn into_response(self) -> Response {
        let length = self.bytes.len();
        let mut response = Response::new(Body::from(self.bytes));
        *response.status_mut() = StatusCode::OK;

        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(self.mime_type),
        );
        headers.insert(
            header::CONTENT_DISPOSITION,
            content_disposition(&self.filename),
        );
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
        response
    }
}
