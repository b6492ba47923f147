use std::fs;
use std::io;
use std::path::Path;

const MB: f64 = 1024.0 * 1024.0;

/// Kind of artifact file found in the models directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// `.onnx` graph, sized in MB
    Model,
    /// `.json` definition, sized in KB
    Definition,
}

impl ArtifactKind {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "onnx" => Some(ArtifactKind::Model),
            "json" => Some(ArtifactKind::Definition),
            _ => None,
        }
    }
}

/// One file listed in the final report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub name: String,
    pub kind: ArtifactKind,
    pub bytes: u64,
}

impl ReportEntry {
    /// Size in the unit the report uses for this kind, with the unit label
    pub fn display_size(&self) -> String {
        match self.kind {
            ArtifactKind::Model => format!("{:.2} MB", self.bytes as f64 / MB),
            ArtifactKind::Definition => format!("{:.2} KB", self.bytes as f64 / 1024.0),
        }
    }
}

/// Artifacts present at the top level of the models directory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactReport {
    /// Model graphs first, then definitions; each group sorted by name
    pub entries: Vec<ReportEntry>,
}

impl ArtifactReport {
    /// Collects every `.onnx` and `.json` file directly under `dir`.
    pub fn collect(dir: &Path) -> io::Result<Self> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let Some(kind) = ArtifactKind::from_path(&path) else {
                continue;
            };
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            entries.push(ReportEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                kind,
                bytes: metadata.len(),
            });
        }

        entries.sort_by(|a, b| {
            (a.kind != ArtifactKind::Model, &a.name).cmp(&(b.kind != ArtifactKind::Model, &b.name))
        });
        Ok(Self { entries })
    }

    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.bytes).sum()
    }

    pub fn total_mb(&self) -> f64 {
        self.total_bytes() as f64 / MB
    }

    /// Whether the total size is above `budget_mb`
    pub fn exceeds(&self, budget_mb: f64) -> bool {
        self.total_mb() > budget_mb
    }
}
