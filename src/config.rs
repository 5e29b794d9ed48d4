use std::{
    env,
    fmt::Display,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write config {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },
}

/// Dev or production, selected by `NAVPANEL_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Dev,
    Production,
}

impl RunMode {
    pub fn from_env() -> Self {
        match env::var("NAVPANEL_ENV").as_deref() {
            Ok("production") | Ok("prod") => RunMode::Production,
            _ => RunMode::Dev,
        }
    }

    fn default_config_path(self) -> PathBuf {
        match self {
            RunMode::Dev => PathBuf::from("./config.json"),
            RunMode::Production => PathBuf::from("/app/config/config.json"),
        }
    }

    fn default_database_path(self) -> PathBuf {
        match self {
            RunMode::Dev => PathBuf::from("./shortcuts.db"),
            RunMode::Production => PathBuf::from("/app/db/shortcuts.db"),
        }
    }

    fn default_logo_dir(self) -> PathBuf {
        match self {
            RunMode::Dev => PathBuf::from("./logo"),
            RunMode::Production => PathBuf::from("/app/logo"),
        }
    }
}

/// Single admin account held in the config file, compared in plaintext
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum StorageConfig {
    /// Files on disk, served by this process under `url_prefix`
    Local {
        dir: PathBuf,
        #[serde(default = "default_url_prefix")]
        url_prefix: String,
    },
    /// Any S3-compatible bucket (Minio, R2, AWS)
    S3 {
        endpoint: String,
        region: String,
        bucket: String,
        access_key: String,
        secret_key: String,
        /// Base URL objects are reachable at; defaults to `<endpoint>/<bucket>`
        #[serde(default)]
        public_url: Option<String>,
        #[serde(default = "default_true")]
        path_style: bool,
    },
}

fn default_true() -> bool {
    true
}

fn default_url_prefix() -> String {
    "/logo".to_string()
}

impl StorageConfig {
    fn local(mode: RunMode) -> Self {
        StorageConfig::Local {
            dir: mode.default_logo_dir(),
            url_prefix: default_url_prefix(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundRemovalConfig {
    pub api_url: String,
    pub api_key: String,
    #[serde(default = "default_background_timeout")]
    pub timeout_ms: u64,
}

fn default_background_timeout() -> u64 {
    15_000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogoConfig {
    pub page_timeout_ms: u64,
    pub icon_timeout_ms: u64,
    pub max_icon_bytes: usize,
    /// Cap on the site HTML read while looking for `<link>` icons
    pub max_page_bytes: usize,
    pub user_agent: String,
    /// Probed at the site origin after the HTML candidates
    pub fallback_paths: Vec<String>,
    pub background_removal: Option<BackgroundRemovalConfig>,
}

impl Default for LogoConfig {
    fn default() -> Self {
        Self {
            page_timeout_ms: 5_000,
            icon_timeout_ms: 5_000,
            max_icon_bytes: 1024 * 1024,
            max_page_bytes: 2 * 1024 * 1024,
            user_agent: "Mozilla/5.0 (compatible; nav-panel/0.1; +favicon-fetch)".to_string(),
            fallback_paths: [
                "/favicon.ico",
                "/favicon.png",
                "/favicon.svg",
                "/apple-touch-icon.png",
                "/apple-touch-icon-precomposed.png",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
            background_removal: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub port: u16,
    pub database_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub allow_registration: bool,
    pub admin: Option<AdminCredentials>,
    pub storage: StorageConfig,
    pub logo: LogoConfig,
    pub upload_limit_bytes: usize,
    /// Built SPA assets, served with an index.html fallback
    pub static_dir: Option<PathBuf>,

    #[serde(skip)]
    pub mode: RunMode,
    /// File the config was read from; admin password changes are written back here
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults_for(RunMode::Dev)
    }
}

impl Config {
    pub fn defaults_for(mode: RunMode) -> Self {
        Self {
            port: 3000,
            database_path: mode.default_database_path(),
            jwt_secret: String::new(),
            token_ttl_hours: 24,
            bcrypt_cost: 10,
            allow_registration: true,
            admin: None,
            storage: StorageConfig::local(mode),
            logo: LogoConfig::default(),
            upload_limit_bytes: 5 * 1024 * 1024,
            static_dir: None,
            mode,
            source: None,
        }
    }

    /// Resolve mode, read the JSON file (if any) and apply env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mode = RunMode::from_env();
        info!("Running in {:?} mode", mode);

        let path = var("NAVPANEL_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| mode.default_config_path());

        let mut config = if path.exists() {
            Self::from_file(&path, mode)?
        } else {
            warn!("Config file {} not found, using defaults", path.display());
            Self::defaults_for(mode)
        };

        if let Ok(port) = var("PORT") {
            config.port = parse_or(&port, "PORT", config.port);
        }
        if let Ok(secret) = var("JWT_SECRET") {
            config.jwt_secret = secret;
        }
        if config.jwt_secret.is_empty() {
            warn!("No jwtSecret configured, generating one; tokens will not survive a restart");
            config.jwt_secret = random_secret();
        }

        Ok(config)
    }

    pub fn from_file(path: &Path, mode: RunMode) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, path, mode)
    }

    fn from_json(text: &str, path: &Path, mode: RunMode) -> Result<Self, ConfigError> {
        // Start from mode defaults so unspecified keys follow dev/prod layout
        let mut value = serde_json::to_value(Self::defaults_for(mode)).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let overrides: serde_json::Value =
            serde_json::from_str(text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        merge_json(&mut value, overrides);

        let mut config: Config =
            serde_json::from_value(value).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.mode = mode;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }
}

/// Rewrite `admin.password` in the config file, leaving every other key as it was.
pub fn persist_admin_password(path: &Path, password: &str) -> Result<(), ConfigError> {
    let write_err = |message: String| ConfigError::Write {
        path: path.to_path_buf(),
        message,
    };

    let text = fs::read_to_string(path).map_err(|e| write_err(e.to_string()))?;
    let mut value: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| write_err(e.to_string()))?;

    let admin = value
        .get_mut("admin")
        .and_then(|admin| admin.as_object_mut())
        .ok_or_else(|| write_err("no admin section".to_string()))?;
    admin.insert(
        "password".to_string(),
        serde_json::Value::String(password.to_string()),
    );

    let pretty = serde_json::to_string_pretty(&value).map_err(|e| write_err(e.to_string()))?;
    fs::write(path, pretty).map_err(|e| write_err(e.to_string()))
}

fn merge_json(base: &mut serde_json::Value, overrides: serde_json::Value) {
    match (base, overrides) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overrides)) => {
            for (key, value) in overrides {
                // A different storage kind replaces the whole section
                let replace = key == "storage" && switches_kind(base.get(&key), &value);
                match base.get_mut(&key) {
                    Some(existing) if !replace => merge_json(existing, value),
                    _ => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overrides) => *base = overrides,
    }
}

fn switches_kind(base: Option<&serde_json::Value>, overrides: &serde_json::Value) -> bool {
    match overrides.get("kind") {
        Some(kind) => base.and_then(|b| b.get("kind")) != Some(kind),
        None => false,
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        info!("Environment variable {key} not set");
    })
}

fn parse_or<T: FromStr + Display + Copy>(raw: &str, key: &str, default: T) -> T
where
    T::Err: Display,
{
    raw.parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw}: {e}, using {default}");
        default
    })
}

fn random_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::STANDARD_NO_PAD.encode(bytes)
}
