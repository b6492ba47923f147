//! # Fetch Module
//!
//! Retrieves the encoder, decoder and tokenizer of a sequence-to-sequence
//! model from a hub and stores them under flat canonical names.
//!
//! A run is strictly sequential: list the repository, select the variant and
//! tokenizer paths, download, move each file to its canonical name, report.

mod types;
mod error;
mod selection;
mod normalize;
mod report;
mod fetcher;
pub mod display;

pub use types::{
    ArtifactRole, AttemptOutcome, FetchSummary, Selection, TokenizerAttempt, TokenizerOutcome,
    TokenizerSource,
};
pub use error::FetchError;
pub use selection::{select, select_tokenizer, select_variant, TokenizerChoice};
pub use normalize::{place_artifact, prune_empty_dirs};
pub use report::{ArtifactKind, ArtifactReport, ReportEntry};
pub use fetcher::Fetcher;
