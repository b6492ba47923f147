use std::path::{Component, Path, PathBuf};
use super::types::HubError;

/// Read access to a model repository.
///
/// `HubClient` talks to a real hub over HTTP; tests substitute an in-memory
/// implementation so the fetcher can be exercised without a network.
#[allow(async_fn_in_trait)]
pub trait ModelHub {
    /// Lists every file path in the repository, in hub order.
    async fn list_files(&self) -> Result<Vec<String>, HubError>;

    /// Downloads `remote` into `local_dir`, mirroring the remote directory
    /// layout, and returns the path of the written file.
    async fn download(&self, remote: &str, local_dir: &Path) -> Result<PathBuf, HubError>;
}

impl<H: ModelHub> ModelHub for &H {
    async fn list_files(&self) -> Result<Vec<String>, HubError> {
        (**self).list_files().await
    }

    async fn download(&self, remote: &str, local_dir: &Path) -> Result<PathBuf, HubError> {
        (**self).download(remote, local_dir).await
    }
}

/// Resolves where `remote` lands under `local_dir`.
///
/// Rejects empty, absolute and parent-relative paths so a hostile listing
/// cannot write outside the destination directory.
pub fn checked_local_path(local_dir: &Path, remote: &str) -> Result<PathBuf, HubError> {
    if remote.is_empty() || remote.starts_with('/') || remote.starts_with('\\') {
        return Err(HubError::InvalidPath(remote.to_string()));
    }

    let mut target = local_dir.to_path_buf();
    for component in Path::new(remote).components() {
        match component {
            Component::Normal(part) => target.push(part),
            Component::CurDir => {}
            _ => return Err(HubError::InvalidPath(remote.to_string())),
        }
    }

    if target == local_dir {
        return Err(HubError::InvalidPath(remote.to_string()));
    }
    Ok(target)
}
