//! Configuration handling for the application.
//!
//! Everything the pipeline needs to know about the outside world (which page
//! to scrape, how to present itself to the remote server, where scratch files
//! go) lives on [`Config`], which is passed into the pipeline at construction.
//! `Config::from_env` loads it from environment variables with development
//! defaults; tests build one directly and point it at a mock server.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use url::Url;

/// Environment variable names.
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_LISTING_URL: &str = "LISTING_URL";
pub const ENV_REDIRECT_MARKER: &str = "REDIRECT_MARKER";
pub const ENV_USER_AGENT: &str = "FETCH_USER_AGENT";
pub const ENV_MAX_LISTING_BYTES: &str = "MAX_LISTING_BYTES";
pub const ENV_MAX_DOCUMENT_BYTES: &str = "MAX_DOCUMENT_BYTES";
pub const ENV_LINE_EXPORT_EMPTY: &str = "LINE_EXPORT_EMPTY";
pub const ENV_SCRATCH_DIR: &str = "SCRATCH_DIR";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_LISTING_URL: &str = "https://en.fa.gov.tw/view.php?theme=VR_of_RFMO&subtheme=&id=10";
const DEFAULT_REDIRECT_MARKER: &str = "redirect_file.php";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
const DEFAULT_MAX_LISTING_BYTES: u64 = 5 * 1024 * 1024; // 5MB
const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 50 * 1024 * 1024; // 50MB

/// What the line-oriented exports do when every extracted line is blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyOutputPolicy {
    /// Emit the output with zero data rows.
    #[default]
    Allow,
    /// Fail the request with `ExtractionEmpty`.
    Reject,
}

impl FromStr for EmptyOutputPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "reject" => Ok(Self::Reject),
            other => Err(format!("expected 'allow' or 'reject', got '{}'", other)),
        }
    }
}

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    bind_addr: String,
    listing_url: Url,
    redirect_marker: String,
    user_agent: String,
    max_listing_bytes: u64,
    max_document_bytes: u64,
    empty_line_policy: EmptyOutputPolicy,
    scratch_dir: PathBuf,
}

impl Config {
    /// Create a config for the given listing page, with defaults for the rest.
    pub fn new(bind_addr: impl Into<String>, listing_url: Url) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            listing_url,
            redirect_marker: DEFAULT_REDIRECT_MARKER.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_listing_bytes: DEFAULT_MAX_LISTING_BYTES,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            empty_line_policy: EmptyOutputPolicy::default(),
            scratch_dir: env::temp_dir(),
        }
    }

    /// Load from environment variables, falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let listing_url =
            env::var(ENV_LISTING_URL).unwrap_or_else(|_| DEFAULT_LISTING_URL.to_string());
        let listing_url = parse_listing_url(&listing_url)?;

        let mut config = Self::new(bind_addr, listing_url);

        if let Ok(marker) = env::var(ENV_REDIRECT_MARKER) {
            if marker.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: ENV_REDIRECT_MARKER,
                    reason: "must not be empty".to_string(),
                });
            }
            config.redirect_marker = marker;
        }
        if let Ok(user_agent) = env::var(ENV_USER_AGENT) {
            config.user_agent = user_agent;
        }
        if let Some(limit) = parse_env::<u64>(ENV_MAX_LISTING_BYTES)? {
            config.max_listing_bytes = limit;
        }
        if let Some(limit) = parse_env::<u64>(ENV_MAX_DOCUMENT_BYTES)? {
            config.max_document_bytes = limit;
        }
        if let Some(policy) = parse_env::<EmptyOutputPolicy>(ENV_LINE_EXPORT_EMPTY)? {
            config.empty_line_policy = policy;
        }
        if let Ok(dir) = env::var(ENV_SCRATCH_DIR) {
            config.scratch_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    pub fn with_redirect_marker(mut self, marker: impl Into<String>) -> Self {
        self.redirect_marker = marker.into();
        self
    }

    pub fn with_empty_line_policy(mut self, policy: EmptyOutputPolicy) -> Self {
        self.empty_line_policy = policy;
        self
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    pub fn with_max_document_bytes(mut self, limit: u64) -> Self {
        self.max_document_bytes = limit;
        self
    }

    /// TCP bind address (host:port) for the HTTP server.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }
    /// The page that enumerates the available documents.
    pub fn listing_url(&self) -> &Url {
        &self.listing_url
    }
    /// Base used to absolutize relative document links: the listing page's origin.
    pub fn link_base(&self) -> Url {
        let mut base = self.listing_url.clone();
        base.set_path("/");
        base.set_query(None);
        base.set_fragment(None);
        base
    }
    /// Substring identifying a download link among the page's anchors.
    pub fn redirect_marker(&self) -> &str {
        &self.redirect_marker
    }
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
    pub fn max_listing_bytes(&self) -> u64 {
        self.max_listing_bytes
    }
    pub fn max_document_bytes(&self) -> u64 {
        self.max_document_bytes
    }
    pub fn empty_line_policy(&self) -> EmptyOutputPolicy {
        self.empty_line_policy
    }
    /// Where per-invocation temporary files are created.
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }
}

impl Default for Config {
    /// Development defaults (mirrors `from_env` with no env overrides).
    fn default() -> Self {
        let listing_url =
            parse_listing_url(DEFAULT_LISTING_URL).expect("default listing url is valid");
        Self::new(DEFAULT_BIND_ADDR, listing_url)
    }
}

fn parse_listing_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        field: ENV_LISTING_URL,
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            field: ENV_LISTING_URL,
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

fn parse_env<T>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                field: key,
                reason: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}
