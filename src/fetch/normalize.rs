use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Moves a downloaded file to `dest_dir/canonical`, replacing any file already there.
///
/// Directories emptied by the move are removed up to (not including)
/// `dest_dir`, so repeated runs do not accumulate nested leftovers.
pub fn place_artifact(downloaded: &Path, dest_dir: &Path, canonical: &str) -> io::Result<PathBuf> {
    let target = dest_dir.join(canonical);
    if downloaded == target {
        return Ok(target);
    }

    if target.exists() {
        fs::remove_file(&target)?;
        debug!("Removed previous {}", target.display());
    }
    move_file(downloaded, &target)?;
    info!("Moved {} to {}", downloaded.display(), target.display());

    prune_empty_dirs(downloaded, dest_dir);
    Ok(target)
}

/// Renames `from` to `to`, copying when the rename crosses file systems.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) => {
            debug!("rename {} failed ({}), copying instead", from.display(), e);
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}

/// Removes the now-empty parent directories of `moved` below `root`.
///
/// Stops at the first directory that still has content or lies outside `root`.
pub fn prune_empty_dirs(moved: &Path, root: &Path) {
    let mut dir = moved.parent();
    while let Some(current) = dir {
        if current == root || !current.starts_with(root) {
            break;
        }
        if fs::remove_dir(current).is_err() {
            break;
        }
        debug!("Removed empty directory {}", current.display());
        dir = current.parent();
    }
}
