use std::fmt;

use serde::Serialize;
use url::Url;

/// A download link found on the listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReference {
    /// Trimmed anchor text; used for ranking and for output filenames.
    pub display_name: String,
    /// Always absolute, resolved against the listing origin.
    pub url: Url,
}

impl DocumentReference {
    pub fn new(display_name: impl Into<String>, url: Url) -> Self {
        Self {
            display_name: display_name.into(),
            url,
        }
    }
}

/// `YYYYMMDD` token embedded in a display name, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateToken(Option<u32>);

impl DateToken {
    pub const NONE: DateToken = DateToken(None);

    pub fn new(value: u32) -> Self {
        Self(Some(value))
    }

    pub fn value(self) -> Option<u32> {
        self.0
    }

    /// Ordering key: a missing token ranks as 0, below any real date.
    pub fn rank(self) -> u32 {
        self.0.unwrap_or(0)
    }
}

impl fmt::Display for DateToken {
    /// Renders the token as its original eight digits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{:08}", value),
            None => Ok(()),
        }
    }
}
