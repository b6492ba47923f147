use std::error::Error;
use std::fmt;

use crate::hub::HubError;
use super::types::{ArtifactRole, AttemptOutcome, TokenizerAttempt};

/// Errors that end a fetch run
#[derive(Debug)]
pub enum FetchError {
    /// The repository listing could not be retrieved
    RemoteListing(HubError),
    /// No configured variant had both its encoder and decoder listed
    NoSuitableModel {
        /// Names of the variants that were checked, in order
        variants: Vec<String>,
        /// Leading entries of the listing, for manual diagnosis
        preview: Vec<String>,
        /// Total number of entries in the listing
        total: usize,
    },
    /// An encoder or decoder download failed
    Download {
        role: ArtifactRole,
        remote: String,
        source: HubError,
    },
    /// Every tokenizer candidate failed and a tokenizer is required
    TokenizerUnavailable(Vec<TokenizerAttempt>),
    /// Local file system failure
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl FetchError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        FetchError::Io { context: context.into(), source }
    }

    /// Whether the user should be pointed at a manual download.
    ///
    /// A missing variant already prints the listing, which is the more useful hint.
    pub fn needs_remediation(&self) -> bool {
        !matches!(self, FetchError::NoSuitableModel { .. })
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FetchError::RemoteListing(e) => write!(f, "could not list repository files: {}", e),
            FetchError::NoSuitableModel { variants, total, .. } => write!(
                f,
                "no model variant found among {} listed files (checked: {})",
                total,
                variants.join(", ")
            ),
            FetchError::Download { role, remote, source } => {
                write!(f, "failed to download {} model {}: {}", role, remote, source)
            }
            FetchError::TokenizerUnavailable(attempts) => {
                let tried: Vec<String> = attempts
                    .iter()
                    .map(|a| match &a.outcome {
                        AttemptOutcome::Failed(reason) => format!("{} ({})", a.remote, reason),
                        AttemptOutcome::Downloaded(_) => a.remote.clone(),
                    })
                    .collect();
                write!(f, "no tokenizer could be downloaded, tried: {}", tried.join("; "))
            }
            FetchError::Io { context, source } => write!(f, "{}: {}", context, source),
        }
    }
}

impl Error for FetchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FetchError::RemoteListing(e) => Some(e),
            FetchError::Download { source, .. } => Some(source),
            FetchError::Io { source, .. } => Some(source),
            FetchError::NoSuitableModel { .. } | FetchError::TokenizerUnavailable(_) => None,
        }
    }
}
