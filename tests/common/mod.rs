#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use hubfetch::config::Settings;
use hubfetch::hub::{checked_local_path, HubError, ModelHub};

pub const Q_ENC: &str = "onnx/merged/tiny/quantized/encoder_model.onnx";
pub const Q_DEC: &str = "onnx/merged/tiny/quantized/decoder_model_merged.onnx";
pub const F_ENC: &str = "onnx/merged/tiny/float/encoder_model.onnx";
pub const F_DEC: &str = "onnx/merged/tiny/float/decoder_model_merged.onnx";

/// In-memory hub: listed files, downloadable-but-unlisted files and
/// paths whose download always fails.
#[derive(Default)]
pub struct FakeHub {
    listed: Vec<(String, Vec<u8>)>,
    unlisted: Vec<(String, Vec<u8>)>,
    failing: HashSet<String>,
    listing_fails: bool,
    downloads: Mutex<Vec<String>>,
}

impl FakeHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, contents: &str) -> Self {
        self.listed.push((path.to_string(), contents.as_bytes().to_vec()));
        self
    }

    pub fn with_unlisted(mut self, path: &str, contents: &str) -> Self {
        self.unlisted.push((path.to_string(), contents.as_bytes().to_vec()));
        self
    }

    pub fn failing(mut self, path: &str) -> Self {
        self.failing.insert(path.to_string());
        self
    }

    pub fn listing_fails(mut self) -> Self {
        self.listing_fails = true;
        self
    }

    /// Remote paths passed to `download`, in call order
    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

impl ModelHub for FakeHub {
    async fn list_files(&self) -> Result<Vec<String>, HubError> {
        if self.listing_fails {
            return Err(HubError::NotFound("acme/missing".to_string()));
        }
        Ok(self.listed.iter().map(|(p, _)| p.clone()).collect())
    }

    async fn download(&self, remote: &str, local_dir: &Path) -> Result<PathBuf, HubError> {
        self.downloads.lock().unwrap().push(remote.to_string());
        if self.failing.contains(remote) {
            return Err(HubError::NotFound(remote.to_string()));
        }
        let contents = self
            .listed
            .iter()
            .chain(self.unlisted.iter())
            .find(|(p, _)| p == remote)
            .map(|(_, c)| c.clone())
            .ok_or_else(|| HubError::NotFound(remote.to_string()))?;

        let target = checked_local_path(local_dir, remote)?;
        std::fs::create_dir_all(target.parent().unwrap())?;
        std::fs::write(&target, contents)?;
        Ok(target)
    }
}

/// Default settings writing into `<dir>/models`
pub fn settings_in(dir: &Path) -> Settings {
    let mut settings = Settings::defaults().unwrap();
    settings.models.directory = dir.join("models");
    settings
}

/// Sorted names of everything directly inside `dir`
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
