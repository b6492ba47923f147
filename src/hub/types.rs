use std::error::Error;
use std::fmt;
use reqwest::StatusCode;
use serde::Deserialize;

/// Repository metadata returned by `GET /api/models/{repo}/revision/{rev}`.
///
/// Only the file listing is used; every other field of the response is ignored.
#[derive(Debug, Deserialize)]
pub struct RepoInfo {
    /// Files in the repository, in the order the hub reports them
    #[serde(default)]
    pub siblings: Vec<Sibling>,
}

/// One file entry of a repository listing
#[derive(Debug, Deserialize)]
pub struct Sibling {
    /// Path of the file relative to the repository root
    pub rfilename: String,
}

impl RepoInfo {
    /// Flattens the listing into repository-relative paths, keeping hub order.
    pub fn into_paths(self) -> Vec<String> {
        self.siblings.into_iter().map(|s| s.rfilename).collect()
    }
}

/// Errors raised while talking to the model hub
#[derive(Debug)]
pub enum HubError {
    /// Transport failure or undecodable response body
    Request(reqwest::Error),
    /// The hub answered with an unexpected status code
    Status { url: String, status: StatusCode },
    /// Repository, revision or file does not exist
    NotFound(String),
    /// The hub refused access (missing or invalid token)
    Unauthorized(String),
    /// A remote path that would escape the destination directory
    InvalidPath(String),
    /// Local file system failure while writing a download
    Io(std::io::Error),
}

impl fmt::Display for HubError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HubError::Request(e) => write!(f, "request failed: {}", e),
            HubError::Status { url, status } => write!(f, "unexpected status {} from {}", status, url),
            HubError::NotFound(what) => write!(f, "not found: {}", what),
            HubError::Unauthorized(what) => write!(f, "access denied: {}", what),
            HubError::InvalidPath(path) => write!(f, "invalid remote path: {}", path),
            HubError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for HubError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            HubError::Request(e) => Some(e),
            HubError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for HubError {
    fn from(err: reqwest::Error) -> Self {
        HubError::Request(err)
    }
}

impl From<std::io::Error> for HubError {
    fn from(err: std::io::Error) -> Self {
        HubError::Io(err)
    }
}

impl HubError {
    /// Maps a non-success HTTP status onto the matching variant.
    pub fn from_status(url: &str, status: StatusCode) -> Self {
        match status {
            StatusCode::NOT_FOUND => HubError::NotFound(url.to_string()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => HubError::Unauthorized(url.to_string()),
            _ => HubError::Status { url: url.to_string(), status },
        }
    }
}
