use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::hub::ModelHub;
use super::display;
use super::error::FetchError;
use super::normalize::place_artifact;
use super::report::ArtifactReport;
use super::selection::select;
use super::types::{
    ArtifactRole, AttemptOutcome, FetchSummary, Selection, TokenizerAttempt, TokenizerOutcome,
};

/// Fetches a model's encoder, decoder and tokenizer from a hub.
///
/// The hub is a type parameter so the same flow runs against `HubClient` in
/// production and an in-memory hub in tests.
pub struct Fetcher<H: ModelHub> {
    hub: H,
    settings: Settings,
}

impl<H: ModelHub> Fetcher<H> {
    pub fn new(hub: H, settings: Settings) -> Self {
        Self { hub, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs one complete fetch: list, select, download, rename, report.
    ///
    /// # Errors
    /// Fails when the listing cannot be retrieved, no variant is fully
    /// listed, the encoder or decoder cannot be downloaded, a local file
    /// operation fails, or (only if configured as required) no tokenizer
    /// could be downloaded.
    pub async fn run(&self) -> Result<FetchSummary, FetchError> {
        let dest = self.settings.models.directory.as_path();
        fs::create_dir_all(dest)
            .map_err(|e| FetchError::io(format!("create models directory {}", dest.display()), e))?;
        info!("Fetching {} into {}", self.settings.hub.repo_id, dest.display());
        display::print_header(&self.settings);

        println!("Checking available files...");
        let listing = self.hub.list_files().await.map_err(|e| {
            error!("Listing {} failed: {}", self.settings.hub.repo_id, e);
            FetchError::RemoteListing(e)
        })?;
        debug!("Listing: {:?}", listing);

        let selection = select(&listing, &self.settings.artifacts, self.settings.report.listing_preview)
            .inspect_err(|e| error!("{}", e))?;
        if selection.is_fallback {
            warn!(
                "Preferred variant unavailable, using '{}' ({})",
                selection.variant.name,
                selection.variant.note.as_deref().unwrap_or("no note")
            );
            display::print_variant_fallback(self.settings.artifacts.variants.first(), &selection.variant);
        }
        info!(
            "Selected encoder={} decoder={} tokenizer={} ({:?})",
            selection.encoder, selection.decoder, selection.tokenizer, selection.tokenizer_source
        );

        let names = &self.settings.artifacts.names;
        let encoder = self
            .fetch_model_file(ArtifactRole::Encoder, &selection.encoder, &names.encoder)
            .await?;
        let decoder = self
            .fetch_model_file(ArtifactRole::Decoder, &selection.decoder, &names.decoder)
            .await?;

        let tokenizer = self.fetch_tokenizer(&selection).await?;

        let report = ArtifactReport::collect(dest)
            .map_err(|e| FetchError::io(format!("read models directory {}", dest.display()), e))?;
        info!("Fetch complete, {} artifacts, {:.2} MB", report.entries.len(), report.total_mb());

        Ok(FetchSummary { selection, encoder, decoder, tokenizer, report })
    }

    /// Downloads the encoder or decoder and moves it to its canonical name.
    async fn fetch_model_file(
        &self,
        role: ArtifactRole,
        remote: &str,
        canonical: &str,
    ) -> Result<PathBuf, FetchError> {
        let dest = self.settings.models.directory.as_path();
        println!("\nDownloading {} model: {}...", role, remote);

        let downloaded = self.hub.download(remote, dest).await.map_err(|source| {
            error!("Downloading {} {} failed: {}", role, remote, source);
            FetchError::Download { role, remote: remote.to_string(), source }
        })?;

        let placed = self.place(&downloaded, canonical)?;
        if placed != downloaded {
            println!("Saved as {}", canonical);
        }
        Ok(placed)
    }

    /// Tries the selected tokenizer path, then each configured fallback.
    ///
    /// Every attempt is recorded. Running out of candidates is only an error
    /// when the tokenizer is configured as required.
    async fn fetch_tokenizer(&self, selection: &Selection) -> Result<TokenizerOutcome, FetchError> {
        let dest = self.settings.models.directory.as_path();
        let config = &self.settings.artifacts.tokenizer;

        let mut candidates: Vec<&str> = vec![selection.tokenizer.as_str()];
        for fallback in &config.fallbacks {
            if !candidates.contains(&fallback.as_str()) {
                candidates.push(fallback);
            }
        }

        println!("Downloading tokenizer: {}...", selection.tokenizer);
        let mut attempts = Vec::with_capacity(candidates.len());
        for (i, remote) in candidates.into_iter().enumerate() {
            if i == 1 {
                println!("Trying alternative locations...");
            }
            match self.hub.download(remote, dest).await {
                Ok(path) => {
                    if i > 0 {
                        println!("Downloaded tokenizer from {}", remote);
                    }
                    attempts.push(TokenizerAttempt {
                        remote: remote.to_string(),
                        outcome: AttemptOutcome::Downloaded(path.clone()),
                    });
                    let placed = self.place(&path, &self.settings.artifacts.names.tokenizer)?;
                    if placed != path {
                        println!("Saved as {}", self.settings.artifacts.names.tokenizer);
                    }
                    return Ok(TokenizerOutcome::Fetched { remote: remote.to_string(), path: placed, attempts });
                }
                Err(e) => {
                    warn!("Tokenizer download from {} failed: {}", remote, e);
                    if i == 0 {
                        println!("Warning: Could not download tokenizer from {}: {}", remote, e);
                    }
                    attempts.push(TokenizerAttempt {
                        remote: remote.to_string(),
                        outcome: AttemptOutcome::Failed(e.to_string()),
                    });
                }
            }
        }

        let summary: Vec<String> = attempts.iter().map(|a| a.remote.clone()).collect();
        if config.required {
            error!("No tokenizer available, tried {}", summary.join(", "));
            return Err(FetchError::TokenizerUnavailable(attempts));
        }
        warn!("No tokenizer available, tried {}; continuing without one", summary.join(", "));
        display::print_tokenizer_warning(&attempts);
        Ok(TokenizerOutcome::Unavailable { attempts })
    }

    fn place(&self, downloaded: &Path, canonical: &str) -> Result<PathBuf, FetchError> {
        let dest = self.settings.models.directory.as_path();
        place_artifact(downloaded, dest, canonical).map_err(|e| {
            FetchError::io(
                format!("move {} to {}", downloaded.display(), dest.join(canonical).display()),
                e,
            )
        })
    }
}
