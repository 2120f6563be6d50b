//! Utility functions for video URL handling.

use thiserror::Error;
use url::{ParseError, Url};

/// Base for annotation URLs written without a scheme or host.
const RELATIVE_URL_BASE: &str = "https://localhost/";

/// Errors that can occur during video ID extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VideoIdError {
    /// URL could not be parsed at all
    #[error("Invalid video URL `{0}`")]
    InvalidUrl(String),
    /// URL has no non-empty `v` query parameter
    #[error("Video ID not found in URL `{0}`")]
    VideoIdNotFound(String),
}

/// Extract the platform video identifier from the `v` query parameter.
///
/// Only the first `v` parameter counts. The scheme is optional:
/// - `https://www.youtube.com/watch?v=VIDEO_ID`
/// - `https://www.youtube.com/watch?feature=share&v=VIDEO_ID`
/// - `www.youtube.com/watch?v=VIDEO_ID`
/// - `//www.youtube.com/watch?v=VIDEO_ID`
pub fn extract_video_id(url: &str) -> Result<String, VideoIdError> {
    let url = url.trim();
    let parsed = parse_lenient(url).map_err(|_| VideoIdError::InvalidUrl(url.to_string()))?;

    parsed
        .query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| VideoIdError::VideoIdNotFound(url.to_string()))
}

/// Parse an absolute URL, resolving scheme-less and protocol-relative ones
/// against a fixed base so their query string survives.
fn parse_lenient(url: &str) -> Result<Url, ParseError> {
    match Url::parse(url) {
        Err(ParseError::RelativeUrlWithoutBase) => Url::parse(RELATIVE_URL_BASE)?.join(url),
        parsed => parsed,
    }
}

/// Canonical watch URL for a video identifier.
pub fn watch_url(video_id: &str) -> String {
    format!("https://youtube.com/watch?v={}", video_id)
}
