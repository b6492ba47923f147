use std::path::{Path, PathBuf};
use std::time::Duration;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, RequestBuilder, Response, Url};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::HubConfig;
use super::hub::{checked_local_path, ModelHub};
use super::types::{HubError, RepoInfo};

/// HTTP client for a Hugging Face compatible model hub.
///
/// Listing goes through `/api/models/{repo}/revision/{rev}`, downloads through
/// `/{repo}/resolve/{rev}/{path}`. Downloads stream into `<file>.incomplete`
/// and are renamed into place once the body has been fully written.
pub struct HubClient {
    client: Client,
    endpoint: Url,
    repo_id: String,
    revision: String,
    token: Option<String>,
}

impl HubClient {
    /// Creates a client for the repository described by `config`.
    pub fn new(config: &HubConfig) -> Result<Self, HubError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|_| HubError::InvalidPath(config.endpoint.clone()))?;

        let mut builder = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        info!("Hub client for {} at {} (revision {})", config.repo_id, endpoint, config.revision);
        Ok(Self {
            client,
            endpoint,
            repo_id: config.repo_id.trim().to_string(),
            revision: config.revision.clone(),
            token: config.token.clone().filter(|t| !t.is_empty()),
        })
    }

    /// Builds `endpoint/<segments...>`, percent-encoding each segment.
    fn url_with<'a, I>(&self, segments: I) -> Result<Url, HubError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.endpoint.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| HubError::InvalidPath(self.endpoint.to_string()))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    fn listing_url(&self) -> Result<Url, HubError> {
        let mut segments = vec!["api", "models"];
        segments.extend(self.repo_id.split('/'));
        segments.extend(["revision", self.revision.as_str()]);
        self.url_with(segments)
    }

    fn resolve_url(&self, remote: &str) -> Result<Url, HubError> {
        let mut segments: Vec<&str> = self.repo_id.split('/').collect();
        segments.extend(["resolve", self.revision.as_str()]);
        segments.extend(remote.split('/').filter(|s| !s.is_empty()));
        self.url_with(segments)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get(&self, url: &Url) -> Result<Response, HubError> {
        let response = self.authorized(self.client.get(url.clone())).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("GET {} returned {}", url, status);
            return Err(HubError::from_status(url.as_str(), status));
        }
        Ok(response)
    }
}

impl ModelHub for HubClient {
    async fn list_files(&self) -> Result<Vec<String>, HubError> {
        let url = self.listing_url()?;
        debug!("Listing repository files from {}", url);

        let info: RepoInfo = self.get(&url).await?.json().await?;
        let files = info.into_paths();
        info!("Repository {} lists {} files", self.repo_id, files.len());
        Ok(files)
    }

    async fn download(&self, remote: &str, local_dir: &Path) -> Result<PathBuf, HubError> {
        let target = checked_local_path(local_dir, remote)?;
        let url = self.resolve_url(remote)?;
        info!("Downloading {} to {}", url, target.display());

        let response = self.get(&url).await?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let partial = incomplete_path(&target);
        let pb = progress_bar(response.content_length(), remote);
        match write_body(response, &partial, &pb).await {
            Ok(bytes) => {
                tokio::fs::rename(&partial, &target).await?;
                pb.finish_and_clear();
                info!("Wrote {} bytes to {}", bytes, target.display());
                Ok(target)
            }
            Err(e) => {
                pb.abandon();
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    debug!("Could not remove {}: {}", partial.display(), cleanup);
                }
                Err(e)
            }
        }
    }
}

/// Streams the response body into `path`, returning the number of bytes written.
async fn write_body(response: Response, path: &Path, pb: &ProgressBar) -> Result<u64, HubError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
        pb.set_position(written);
    }

    file.flush().await?;
    Ok(written)
}

fn incomplete_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".incomplete");
    target.with_file_name(name)
}

fn progress_bar(total: Option<u64>, remote: &str) -> ProgressBar {
    let name = remote.rsplit('/').next().unwrap_or(remote).to_string();
    match total {
        Some(len) => {
            let pb = ProgressBar::new(len);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{msg:30} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-"),
            );
            pb.set_message(name);
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner} {msg} {bytes}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.enable_steady_tick(Duration::from_millis(120));
            pb.set_message(name);
            pb
        }
    }
}
