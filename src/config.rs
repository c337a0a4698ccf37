//! Runtime options for report rendering.

use std::env;
use std::time::Duration;

use log::warn;

use crate::fetch::{DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_PHOTO_BYTES};

/// Environment variable holding the photo request timeout in seconds.
pub const FETCH_TIMEOUT_ENV: &str = "SURVEY_REPORT_FETCH_TIMEOUT_SECS";
/// Environment variable holding the maximum photo size in bytes.
pub const MAX_PHOTO_BYTES_ENV: &str = "SURVEY_REPORT_MAX_PHOTO_BYTES";
/// Environment variable toggling parallel photo fetching (`true`/`false`, `1`/`0`).
pub const PARALLEL_FETCH_ENV: &str = "SURVEY_REPORT_PARALLEL_FETCH";

/// Options controlling how reports are produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportOptions {
    fetch_timeout: Duration,
    max_photo_bytes: u64,
    parallel_fetch: bool,
    title: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_photo_bytes: DEFAULT_MAX_PHOTO_BYTES,
            parallel_fetch: true,
            title: "Property Condition Survey".to_string(),
        }
    }
}

impl ReportOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from the defaults and applies any overrides found in the
    /// environment.  Values that fail to parse are reported and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();

        if let Some(raw) = lookup(FETCH_TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => options.fetch_timeout = Duration::from_secs(secs),
                _ => warn!(
                    "ignoring {FETCH_TIMEOUT_ENV}='{raw}': expected a positive number of seconds"
                ),
            }
        }

        if let Some(raw) = lookup(MAX_PHOTO_BYTES_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(bytes) if bytes > 0 => options.max_photo_bytes = bytes,
                _ => {
                    warn!("ignoring {MAX_PHOTO_BYTES_ENV}='{raw}': expected a positive byte count")
                }
            }
        }

        if let Some(raw) = lookup(PARALLEL_FETCH_ENV) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => options.parallel_fetch = true,
                "0" | "false" | "no" | "off" => options.parallel_fetch = false,
                _ => warn!("ignoring {PARALLEL_FETCH_ENV}='{raw}': expected true or false"),
            }
        }

        options
    }

    /// Sets the per-photo request timeout and returns the updated options.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Sets the maximum accepted photo size and returns the updated options.
    pub fn with_max_photo_bytes(mut self, max_bytes: u64) -> Self {
        self.max_photo_bytes = max_bytes;
        self
    }

    /// Enables or disables fetching photos in parallel.
    pub fn with_parallel_fetch(mut self, parallel: bool) -> Self {
        self.parallel_fetch = parallel;
        self
    }

    /// Sets the title stored in the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    pub fn max_photo_bytes(&self) -> u64 {
        self.max_photo_bytes
    }

    pub fn parallel_fetch(&self) -> bool {
        self.parallel_fetch
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}
