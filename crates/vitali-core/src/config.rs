// Configuration loading and parsing (settings.toml, credentials.toml).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable consulted when credentials.toml has no API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Store file name used when no data directory can be resolved.
const FALLBACK_DB_FILE: &str = "vitali.db";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub notifications: NotificationConfig,
    pub credentials: CredentialsConfig,
    /// Resolved path of the local store.
    pub db_path: PathBuf,
}

// ---------------------------------------------------------------------------
// settings.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire settings.toml file.
#[derive(Debug, Clone, Deserialize)]
struct SettingsFile {
    llm: LlmConfig,
    #[serde(default)]
    notifications: NotificationConfig,
    #[serde(default)]
    database: DatabaseSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DatabaseSection {
    /// Explicit store path. When omitted the platform data directory is used.
    path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub max_output_tokens: u32,
    pub recipe_temperature: f32,
    pub workout_temperature: f32,
    pub motivation_temperature: f32,
    pub request_timeout_secs: u64,
    /// Override for the API base URL (useful for proxies).
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// How long confirmation banners stay up.
    pub success_secs: u64,
    /// How long a water reminder stays up.
    pub water_reminder_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        NotificationConfig {
            success_secs: 3,
            water_reminder_secs: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub gemini_api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/settings.toml` and
/// (optionally) `config/credentials.toml`, relative to `base_dir`.
///
/// This does not copy defaults or consult the environment; `load_config()`
/// does both.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- settings.toml (required) ---
    let settings_path = config_dir.join("settings.toml");
    let settings_text = read_file(&settings_path)?;
    let settings: SettingsFile =
        toml::from_str(&settings_text).map_err(|e| ConfigError::ParseError {
            path: settings_path.clone(),
            source: e,
        })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let db_path = match settings.database.path {
        Some(p) if !p.trim().is_empty() => resolve_relative(base_dir, &p),
        _ => default_db_path(),
    };

    let config = Config {
        llm: settings.llm,
        notifications: settings.notifications,
        credentials,
        db_path,
    };

    validate(&config)?;

    Ok(config)
}

/// Seed `config/` with any file from `defaults/` it doesn't have yet.
///
/// `.example` files are templates for the user and are never seeded. Returns
/// the paths that were written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        return if config_dir.is_dir() {
            Ok(Vec::new())
        } else {
            Err(seed_error(format!(
                "no defaults/ or config/ directory under {}; start vitali from its install directory",
                base_dir.display()
            )))
        };
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| seed_error(format!("cannot create {}: {e}", config_dir.display())))?;

    let mut sources = Vec::new();
    for entry in std::fs::read_dir(&defaults_dir)
        .map_err(|e| seed_error(format!("cannot list {}: {e}", defaults_dir.display())))?
    {
        let path = entry
            .map_err(|e| seed_error(format!("cannot list {}: {e}", defaults_dir.display())))?
            .path();
        let is_template = path.extension().is_some_and(|ext| ext == "example");
        if path.is_file() && !is_template {
            sources.push(path);
        }
    }
    sources.sort();

    let mut seeded = Vec::new();
    for source in sources {
        let Some(name) = source.file_name() else {
            continue;
        };
        let target = config_dir.join(name);
        if seed_file(&source, &target)? {
            seeded.push(target);
        }
    }
    Ok(seeded)
}

/// Copy `source` to `target` unless `target` already exists.
fn seed_file(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    use std::io::Write;

    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(seed_error(format!("cannot create {}: {e}", target.display()))),
    };
    let content = std::fs::read(source)
        .map_err(|e| seed_error(format!("cannot read {}: {e}", source.display())))?;
    dest.write_all(&content)
        .map_err(|e| seed_error(format!("cannot write {}: {e}", target.display())))?;
    Ok(true)
}

fn seed_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

/// Load config relative to the current working directory, copying defaults
/// first and falling back to `GEMINI_API_KEY` when no key is configured.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    let mut config = load_config_from(&cwd)?;
    config
        .credentials
        .fill_missing_key(std::env::var(API_KEY_ENV).ok());
    Ok(config)
}

impl CredentialsConfig {
    pub fn has_api_key(&self) -> bool {
        self.gemini_api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    /// Use `env_key` when no usable key is configured. A configured key
    /// always wins; a blank `env_key` is ignored.
    pub fn fill_missing_key(&mut self, env_key: Option<String>) {
        if self.has_api_key() {
            return;
        }
        if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
            self.gemini_api_key = Some(key);
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn resolve_relative(base_dir: &Path, path: &str) -> PathBuf {
    let p = PathBuf::from(path);
    if p.is_absolute() || path == ":memory:" {
        p
    } else {
        base_dir.join(p)
    }
}

/// Platform data directory for the store, e.g.
/// `~/.local/share/vitali/vitali.db` on Linux.
pub fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("app", "vitali", "vitali")
        .map(|dirs| dirs.data_dir().join(FALLBACK_DB_FILE))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DB_FILE))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let llm = &config.llm;

    if llm.model.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "llm.model".into(),
            message: "must not be empty".into(),
        });
    }

    if llm.max_output_tokens == 0 {
        return Err(ConfigError::ValidationError {
            field: "llm.max_output_tokens".into(),
            message: "must be greater than 0".into(),
        });
    }

    if llm.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "llm.request_timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    let temperatures: &[(&str, f32)] = &[
        ("llm.recipe_temperature", llm.recipe_temperature),
        ("llm.workout_temperature", llm.workout_temperature),
        ("llm.motivation_temperature", llm.motivation_temperature),
    ];
    for (name, val) in temperatures {
        if !(0.0..=2.0).contains(val) {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be between 0.0 and 2.0 inclusive, got {val}"),
            });
        }
    }

    let n = &config.notifications;
    let durations: &[(&str, u64)] = &[
        ("notifications.success_secs", n.success_secs),
        ("notifications.water_reminder_secs", n.water_reminder_secs),
    ];
    for (name, val) in durations {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
