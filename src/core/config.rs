//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.peek/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::scrollback::DEFAULT_MAX_LINES;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PeekConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub demo: DemoConfig,
    #[serde(default)]
    pub files: FilesConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub source: Option<SourceKind>,
    pub max_output_lines: Option<usize>,
    pub log_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub address: Option<String>,
    pub auth_token: Option<String>,
    pub connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DemoConfig {
    pub line_interval_ms: Option<u64>,
    pub connect_delay_ms: Option<u64>,
    pub fail_connects: Option<u32>,
    #[serde(default)]
    pub targets: Vec<TargetEntry>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FilesConfig {
    pub poll_interval_ms: Option<u64>,
    pub from_start: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TargetEntry {
    pub id: String,
    pub description: Option<String>,
}

/// Which `DataSource` backs the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Synthetic lines at a fixed pace.
    #[default]
    Demo,
    /// Tail files in a local directory.
    Files,
}

impl SourceKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "demo" => Some(SourceKind::Demo),
            "files" => Some(SourceKind::Files),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Demo => f.write_str("demo"),
            SourceKind::Files => f.write_str("files"),
        }
    }
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_DEMO_ADDRESS: &str = "demo.local:9090";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_LINE_INTERVAL: Duration = Duration::from_millis(200);
pub const DEFAULT_CONNECT_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);
pub const DEFAULT_LOG_FILE: &str = "peek.log";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub source: SourceKind,
    pub address: String,
    pub auth_token: Option<String>,
    pub connect_timeout: Duration,
    pub max_output_lines: usize,
    pub log_file: PathBuf,
    pub demo_line_interval: Duration,
    pub demo_connect_delay: Duration,
    pub demo_fail_connects: u32,
    pub demo_targets: Vec<TargetEntry>,
    pub files_poll_interval: Duration,
    pub files_from_start: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve(&PeekConfig::default(), &CliOverrides::default())
    }
}

/// Values supplied on the command line (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub source: Option<SourceKind>,
    pub address: Option<String>,
    pub auth_token: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub max_output_lines: Option<usize>,
    pub log_file: Option<PathBuf>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.peek/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".peek").join("config.toml"))
}

/// Load config from `~/.peek/config.toml`, or from `explicit` when given.
///
/// If the default file doesn't exist, generates a commented-out default and
/// returns `PeekConfig::default()`. An explicit path must exist.
pub fn load_config(explicit: Option<&Path>) -> Result<PeekConfig, ConfigError> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(PeekConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(PeekConfig::default());
    }

    read_config(&path)
}

fn read_config(path: &Path) -> Result<PeekConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: PeekConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Peek Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# source = "demo"                    # "demo" or "files"
# max_output_lines = 5000
# log_file = "peek.log"

# [server]
# address = "demo.local:9090"        # For "files", the directory to tail
# auth_token = "..."                 # Or set PEEK_AUTH_TOKEN env var
# connect_timeout_secs = 5

# [demo]
# line_interval_ms = 200
# connect_delay_ms = 1000
# fail_connects = 0                  # Simulate this many failed connects

# [[demo.targets]]
# id = "billing"
# description = "Billing service consumer"

# [files]
# poll_interval_ms = 250
# from_start = false                 # Replay existing file contents first
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &PeekConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Source: CLI → env → config → default
    let source = cli
        .source
        .or_else(|| {
            std::env::var("PEEK_SOURCE")
                .ok()
                .and_then(|s| SourceKind::parse(&s))
        })
        .or(config.general.source)
        .unwrap_or_default();

    // Address: CLI → env → config → default (demo host or current directory)
    let address = cli
        .address
        .clone()
        .or_else(|| std::env::var("PEEK_ADDRESS").ok())
        .or_else(|| config.server.address.clone())
        .unwrap_or_else(|| match source {
            SourceKind::Demo => DEFAULT_DEMO_ADDRESS.to_string(),
            SourceKind::Files => ".".to_string(),
        });

    // Auth token: CLI → env → config
    let auth_token = cli
        .auth_token
        .clone()
        .or_else(|| std::env::var("PEEK_AUTH_TOKEN").ok())
        .or_else(|| config.server.auth_token.clone());

    // Connect timeout: CLI → env → config → default
    let connect_timeout = cli
        .connect_timeout_secs
        .or_else(|| {
            std::env::var("PEEK_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.trim().parse().ok())
        })
        .or(config.server.connect_timeout_secs)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_CONNECT_TIMEOUT);

    let log_file = cli
        .log_file
        .clone()
        .or_else(|| config.general.log_file.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    ResolvedConfig {
        source,
        address,
        auth_token,
        connect_timeout,
        max_output_lines: cli
            .max_output_lines
            .or(config.general.max_output_lines)
            .unwrap_or(DEFAULT_MAX_LINES),
        log_file,
        demo_line_interval: config
            .demo
            .line_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_LINE_INTERVAL),
        demo_connect_delay: config
            .demo
            .connect_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_CONNECT_DELAY),
        demo_fail_connects: config.demo.fail_connects.unwrap_or(0),
        demo_targets: config.demo.targets.clone(),
        files_poll_interval: config
            .files
            .poll_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL),
        files_from_start: config.files.from_start.unwrap_or(false),
    }
}
