//! Configuration loading and typed config structures.
//!
//! The configuration lives in `roster-config.yaml` next to the binary's
//! working directory. Every field has a default, so a missing file or a
//! partial file is fine.
//!
//! Environment variables override the file:
//! - `DATABASE_URL` overrides `database.url`
//! - `ROSTER_HOST` overrides `server.host`
//! - `ROSTER_PORT` overrides `server.port`

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override held an unusable value.
    #[error("invalid value for {name}: {message}")]
    Env {
        /// Variable name.
        name: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// The compiled delete-confirmation bundle has not been built.
    #[error(
        "{} is missing; build it with `wasm-pack build crates/roster-confirm --target web \
         --out-dir ../roster-web/static/pkg` or set assets.require_confirm_bundle: false",
        .0.display()
    )]
    MissingBundle(PathBuf),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseSection,

    /// Session cookie settings.
    #[serde(default)]
    pub session: SessionSection,

    /// Password hashing cost.
    #[serde(default)]
    pub password: PasswordSection,

    /// Template and static asset locations.
    #[serde(default)]
    pub assets: AssetsSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl AppConfig {
    /// Load `path` if it exists (defaults otherwise), then apply the
    /// environment overrides.
    ///
    /// Returns the configuration and whether the file was read.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] or [`ConfigError::Yaml`] if the file
    /// exists but cannot be loaded, or [`ConfigError::Env`] if an override
    /// is malformed.
    pub fn load(path: &Path) -> Result<(Self, bool), ConfigError> {
        let from_file = path.exists();
        let mut config = if from_file {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        Ok((config, from_file))
    }

    /// Load configuration from a YAML file. No environment overrides are
    /// applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if it is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply `DATABASE_URL`, `ROSTER_HOST`, and `ROSTER_PORT` from the
    /// process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(host) = lookup("ROSTER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("ROSTER_PORT") {
            self.server.port = port.parse().map_err(|e| ConfigError::Env {
                name: "ROSTER_PORT",
                message: format!("{e}"),
            })?;
        }
        Ok(())
    }
}

/// Listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseSection {
    /// `SQLite` URL.
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionSection {
    /// Idle minutes after which a session is forgotten.
    #[serde(default = "default_session_ttl_minutes")]
    pub ttl_minutes: u32,
    /// How often expired sessions are swept, in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            ttl_minutes: default_session_ttl_minutes(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

/// Argon2 cost parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PasswordSection {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Number of passes.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for PasswordSection {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

/// Template and static asset locations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetsSection {
    /// Directory holding the page templates.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,
    /// Directory served under `/static`.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    /// Refuse to start when the compiled delete-confirmation bundle is
    /// missing from `static_dir`.
    #[serde(default = "default_require_confirm_bundle")]
    pub require_confirm_bundle: bool,
}

impl AssetsSection {
    /// Bundle path relative to `static_dir`, as imported by `base.html`.
    pub const CONFIRM_BUNDLE: &'static str = "pkg/roster_confirm.js";

    /// Where the compiled delete-confirmation bundle should be.
    pub fn confirm_bundle(&self) -> PathBuf {
        self.static_dir.join(Self::CONFIRM_BUNDLE)
    }

    /// Check that the bundle exists.
    ///
    /// Returns `Ok(false)` when it is missing but not required.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingBundle`] when it is missing and
    /// [`require_confirm_bundle`](Self::require_confirm_bundle) is set.
    pub fn check_confirm_bundle(&self) -> Result<bool, ConfigError> {
        let bundle = self.confirm_bundle();
        if bundle.exists() {
            Ok(true)
        } else if self.require_confirm_bundle {
            Err(ConfigError::MissingBundle(bundle))
        } else {
            Ok(false)
        }
    }
}

impl Default for AssetsSection {
    fn default() -> Self {
        Self {
            templates_dir: default_templates_dir(),
            static_dir: default_static_dir(),
            require_confirm_bundle: default_require_confirm_bundle(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingSection {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

const fn default_port() -> u16 {
    5000
}

fn default_database_url() -> String {
    "sqlite://students.db".to_owned()
}

const fn default_max_connections() -> u32 {
    5
}

const fn default_session_ttl_minutes() -> u32 {
    60
}

const fn default_sweep_interval_secs() -> u64 {
    300
}

const fn default_memory_kib() -> u32 {
    19 * 1024
}

const fn default_iterations() -> u32 {
    2
}

const fn default_parallelism() -> u32 {
    1
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

const fn default_require_confirm_bundle() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_owned()
}
