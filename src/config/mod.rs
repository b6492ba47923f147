// Required external crates for configuration management and serialization
use serde::Deserialize;
use std::path::{Path, PathBuf};
use config::{Config, ConfigError, Environment, File, FileFormat};

/// Settings shipped with the binary; every other source layers on top of these.
const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Connection details for the remote model hub
#[derive(Debug, Deserialize, Clone)]
pub struct HubConfig {
    /// Base URL of the hub, e.g. https://huggingface.co
    pub endpoint: String,
    /// Repository identifier in `owner/name` form
    pub repo_id: String,
    /// Branch, tag or commit to fetch from
    pub revision: String,
    /// Optional access token for gated or private repositories
    #[serde(default)]
    pub token: Option<String>,
    /// Optional TCP connect timeout; transport defaults apply otherwise
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

/// Local destination for fetched artifacts
#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Directory the canonical artifact files are written to
    pub directory: PathBuf,
}

/// One encoder/decoder pair the hub may carry
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ModelVariant {
    /// Short name shown to the user, e.g. "quantized"
    pub name: String,
    /// Remote path of the encoder graph
    pub encoder: String,
    /// Remote path of the decoder graph
    pub decoder: String,
    /// Size/accuracy remark printed when this variant is used as a fallback
    #[serde(default)]
    pub note: Option<String>,
}

/// How the tokenizer definition is located in the listing
#[derive(Debug, Deserialize, Clone)]
pub struct TokenizerConfig {
    /// File name suffix identifying tokenizer definitions
    pub suffix: String,
    /// Case-insensitive marker of the preferred tokenizer path
    pub preferred_marker: String,
    /// Path segments that disqualify a tokenizer from being preferred
    #[serde(default)]
    pub excluded_segments: Vec<String>,
    /// Remote paths retried, in order, when the selected tokenizer fails
    #[serde(default)]
    pub fallbacks: Vec<String>,
    /// Whether a missing tokenizer fails the run
    #[serde(default)]
    pub required: bool,
}

/// Flat file names the artifacts are stored under locally
#[derive(Debug, Deserialize, Clone)]
pub struct CanonicalNames {
    pub encoder: String,
    pub decoder: String,
    pub tokenizer: String,
}

/// Everything describing which remote files to fetch and where they land
#[derive(Debug, Deserialize, Clone)]
pub struct ArtifactConfig {
    /// Candidate encoder/decoder pairs in order of preference
    pub variants: Vec<ModelVariant>,
    pub tokenizer: TokenizerConfig,
    pub names: CanonicalNames,
}

/// Output settings for the final report and diagnostics
#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    /// How many listing entries to print when no model variant matches
    pub listing_preview: usize,
    /// Optional total size (MB) above which the report warns
    #[serde(default)]
    pub size_budget_mb: Option<f64>,
}

/// Configuration for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Directory the rolling log files are written to
    pub directory: PathBuf,
}

/// Main settings struct that contains all configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Remote hub settings
    pub hub: HubConfig,
    /// Local model directory settings
    pub models: ModelConfig,
    /// Remote paths and local names of the artifacts
    pub artifacts: ArtifactConfig,
    /// Report settings
    pub report: ReportConfig,
    /// Logging-related settings
    pub logging: LoggingConfig,
}

/// Implementation for loading and parsing configuration
impl Settings {
    /// Creates a new Settings instance by loading config from multiple sources
    /// in the following order of precedence (highest to lowest):
    /// 1. Environment variables prefixed with HUBFETCH__ (e.g. HUBFETCH__HUB__REPO_ID)
    /// 2. Local config file (`<config_dir>/local.toml`) if present
    /// 3. Default config file (`<config_dir>/default.toml`) if present
    /// 4. Defaults compiled into the binary
    pub fn new(config_dir: &Path) -> Result<Self, ConfigError> {
        let default_config = config_dir.join("default.toml");
        let local_config = config_dir.join("local.toml");

        // Convert paths to strings and keep them alive
        let default_config_path = default_config.to_string_lossy();
        let local_config_path = local_config.to_string_lossy();

        let settings = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::with_name(&default_config_path).required(false))
            .add_source(File::with_name(&local_config_path).required(false))
            .add_source(
                Environment::with_prefix("HUBFETCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;

        Ok(settings)
    }

    /// Settings built only from the defaults compiled into the binary.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::from_toml_str(DEFAULT_CONFIG)
    }

    /// Parses and validates settings from a complete TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;

        Ok(settings)
    }

    /// Web page users can fetch the artifacts from by hand.
    pub fn manual_download_url(&self) -> String {
        format!("{}/{}", self.hub.endpoint.trim_end_matches('/'), self.hub.repo_id)
    }

    /// Remote files a manual download needs: the preferred variant plus a tokenizer.
    pub fn required_files(&self) -> Vec<String> {
        let mut files = Vec::new();
        if let Some(primary) = self.artifacts.variants.first() {
            files.push(primary.encoder.clone());
            files.push(primary.decoder.clone());
        }
        files.push(
            self.artifacts
                .tokenizer
                .fallbacks
                .first()
                .cloned()
                .unwrap_or_else(|| self.artifacts.names.tokenizer.clone()),
        );
        files
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if reqwest::Url::parse(&self.hub.endpoint).is_err() {
            return Err(ConfigError::Message(
                format!("Invalid hub endpoint URL: {}", self.hub.endpoint)
            ));
        }

        // Repository ids may omit the owner but must not start or end with a separator
        let repo_id = self.hub.repo_id.trim();
        if repo_id.is_empty() || repo_id.starts_with('/') || repo_id.ends_with('/') {
            return Err(ConfigError::Message(
                format!("Invalid repository id: '{}'", self.hub.repo_id)
            ));
        }

        if self.hub.revision.trim().is_empty() {
            return Err(ConfigError::Message("revision must not be empty".to_string()));
        }

        if self.artifacts.variants.is_empty() {
            return Err(ConfigError::Message(
                "at least one model variant must be configured".to_string()
            ));
        }

        for variant in &self.artifacts.variants {
            if variant.encoder.trim().is_empty() || variant.decoder.trim().is_empty() {
                return Err(ConfigError::Message(
                    format!("Model variant '{}' has an empty encoder or decoder path", variant.name)
                ));
            }
        }

        if self.artifacts.tokenizer.suffix.is_empty() {
            return Err(ConfigError::Message("tokenizer suffix must not be empty".to_string()));
        }

        // Canonical names are written directly under the models directory
        let names = &self.artifacts.names;
        for name in [&names.encoder, &names.decoder, &names.tokenizer] {
            if name.is_empty() || name.contains('/') || name.contains('\\') || name == ".." {
                return Err(ConfigError::Message(
                    format!("Canonical file name must be a plain file name, got: '{}'", name)
                ));
            }
        }
        if names.encoder == names.decoder
            || names.encoder == names.tokenizer
            || names.decoder == names.tokenizer
        {
            return Err(ConfigError::Message(
                "Canonical file names for encoder, decoder and tokenizer must differ".to_string()
            ));
        }

        if let Some(budget) = self.report.size_budget_mb {
            if budget.is_nan() || budget <= 0.0 {
                return Err(ConfigError::Message(
                    format!("size_budget_mb must be positive, got: {}", budget)
                ));
            }
        }

        // Validate logging level
        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(ConfigError::Message(
                format!("Invalid logging level: {}. Must be one of: error, warn, info, debug, trace",
                    self.logging.level)
            )),
        }?;

        Ok(())
    }
}
