use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Reverse;

use crate::listing::model::{DateToken, DocumentReference};

// ASCII digits only; `\d` would also match other scripts' digits.
static DATE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{8}").unwrap());

/// First run of eight digits in `name`, read as a number.
pub fn extract_date_token(name: &str) -> DateToken {
    DATE_TOKEN
        .find(name)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .map(DateToken::new)
        .unwrap_or(DateToken::NONE)
}

/// The reference with the greatest date token.
///
/// Ties go to the earliest reference, and references without a token rank
/// below every dated one, so a set with no tokens at all yields its first
/// element. Returns `None` only for an empty slice.
pub fn select_latest(references: &[DocumentReference]) -> Option<&DocumentReference> {
    // min_by_key keeps the first of equal elements
    references
        .iter()
        .min_by_key(|reference| Reverse(extract_date_token(&reference.display_name).rank()))
}
