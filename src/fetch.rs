//! Retrieval of survey photos.
//!
//! Photos are referenced by URL and fetched before the layout walk starts.
//! A failed fetch never aborts a render: the outcome is kept per photo and the
//! renderer draws a placeholder in its place.

use std::io::Read;
use std::time::Duration;

use image::{ImageError, RgbImage};
use log::warn;
use rayon::prelude::*;
use thiserror::Error;

use crate::elements;

/// Default time budget for a single photo request.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);
/// Default cap on the size of a photo body, matching the upload limit.
pub const DEFAULT_MAX_PHOTO_BYTES: u64 = 10 * 1024 * 1024;

/// Reasons a photo could not be turned into a thumbnail.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent or the connection failed.
    #[error("request for {url} failed: {message}")]
    Transport { url: String, message: String },
    /// The server answered with a non-success status code.
    #[error("request for {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    /// The body exceeded the configured size cap.
    #[error("photo at {url} is larger than {limit} bytes")]
    TooLarge { url: String, limit: u64 },
    /// Reading the response body failed.
    #[error("failed to read photo body from {url}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },
    /// The bytes are not an image format the decoder understands.
    #[error("failed to decode photo from {url}")]
    Decode {
        url: String,
        #[source]
        source: ImageError,
    },
}

/// Source of raw photo bytes.
pub trait ImageFetcher: Send + Sync {
    /// Retrieves the raw bytes behind `url`.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Fetches photos over HTTP(S) with a bounded timeout and body size.
#[derive(Clone)]
pub struct HttpImageFetcher {
    agent: ureq::Agent,
    max_bytes: u64,
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_PHOTO_BYTES)
    }
}

impl HttpImageFetcher {
    /// Creates a fetcher with the given per-request timeout and body size cap.
    pub fn new(timeout: Duration, max_bytes: u64) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent, max_bytes }
    }

    /// Maximum accepted body size in bytes.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }
}

impl std::fmt::Debug for HttpImageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpImageFetcher")
            .field("max_bytes", &self.max_bytes)
            .finish_non_exhaustive()
    }
}

impl ImageFetcher for HttpImageFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status,
                })
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(FetchError::Transport {
                    url: url.to_string(),
                    message: transport.to_string(),
                })
            }
        };

        let declared = response
            .header("Content-Length")
            .and_then(|value| value.trim().parse::<u64>().ok());
        if declared.map_or(false, |length| length > self.max_bytes) {
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                limit: self.max_bytes,
            });
        }

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(self.max_bytes + 1)
            .read_to_end(&mut bytes)
            .map_err(|source| FetchError::Io {
                url: url.to_string(),
                source,
            })?;

        if bytes.len() as u64 > self.max_bytes {
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                limit: self.max_bytes,
            });
        }
        Ok(bytes)
    }
}

/// Fetches and decodes one photo into a report thumbnail.
pub fn fetch_thumbnail(fetcher: &dyn ImageFetcher, url: &str) -> Result<RgbImage, FetchError> {
    let bytes = fetcher.fetch(url)?;
    elements::thumbnail_from_bytes(bytes).map_err(|source| FetchError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Resolves `urls` into thumbnails, one outcome per URL in the same order.
///
/// With `parallel` set the requests run on the rayon pool.  Failures are
/// logged and returned in place; they never affect sibling fetches.
pub fn fetch_photos<S>(
    fetcher: &dyn ImageFetcher,
    urls: &[S],
    parallel: bool,
) -> Vec<Result<RgbImage, FetchError>>
where
    S: AsRef<str> + Sync,
{
    let fetch_one = |url: &S| {
        let outcome = fetch_thumbnail(fetcher, url.as_ref());
        if let Err(err) = &outcome {
            warn!("photo unavailable: {err}");
        }
        outcome
    };

    if parallel {
        urls.par_iter().map(fetch_one).collect()
    } else {
        urls.iter().map(fetch_one).collect()
    }
}
