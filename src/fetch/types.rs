use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::ModelVariant;
use super::report::ArtifactReport;

/// The three files a model consists of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactRole {
    Encoder,
    Decoder,
    Tokenizer,
}

impl fmt::Display for ArtifactRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ArtifactRole::Encoder => write!(f, "encoder"),
            ArtifactRole::Decoder => write!(f, "decoder"),
            ArtifactRole::Tokenizer => write!(f, "tokenizer"),
        }
    }
}

/// Which rule picked the tokenizer path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerSource {
    /// Listed, suffix match and carries the preferred marker
    Preferred,
    /// First suffix match in the listing
    FirstListed,
    /// Nothing matched; the root-level file is assumed to exist
    RootGuess,
}

/// Remote paths chosen for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Variant whose encoder and decoder were both listed
    pub variant: ModelVariant,
    /// True when the preferred variant was missing and a later one was used
    pub is_fallback: bool,
    pub encoder: String,
    pub decoder: String,
    pub tokenizer: String,
    pub tokenizer_source: TokenizerSource,
}

/// Result of a single tokenizer download attempt
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// The file was written to this local path
    Downloaded(PathBuf),
    /// The download failed for this reason
    Failed(String),
}

/// One remote path tried while looking for a tokenizer
#[derive(Debug, Clone, PartialEq)]
pub struct TokenizerAttempt {
    pub remote: String,
    pub outcome: AttemptOutcome,
}

impl TokenizerAttempt {
    pub fn failed(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Failed(_))
    }
}

/// How the tokenizer step ended
#[derive(Debug, Clone, PartialEq)]
pub enum TokenizerOutcome {
    /// Stored at `path` after downloading `remote`
    Fetched {
        remote: String,
        path: PathBuf,
        attempts: Vec<TokenizerAttempt>,
    },
    /// Every candidate failed
    Unavailable { attempts: Vec<TokenizerAttempt> },
}

impl TokenizerOutcome {
    /// Every attempt made, in order
    pub fn attempts(&self) -> &[TokenizerAttempt] {
        match self {
            TokenizerOutcome::Fetched { attempts, .. } => attempts,
            TokenizerOutcome::Unavailable { attempts } => attempts,
        }
    }

    /// Local tokenizer path, if one was fetched
    pub fn path(&self) -> Option<&Path> {
        match self {
            TokenizerOutcome::Fetched { path, .. } => Some(path),
            TokenizerOutcome::Unavailable { .. } => None,
        }
    }
}

/// Everything a successful run produced
#[derive(Debug)]
pub struct FetchSummary {
    pub selection: Selection,
    /// Canonical local path of the encoder
    pub encoder: PathBuf,
    /// Canonical local path of the decoder
    pub decoder: PathBuf,
    pub tokenizer: TokenizerOutcome,
    /// Artifacts found in the models directory after the run
    pub report: ArtifactReport,
}
