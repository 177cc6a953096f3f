use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub timeouts: TimeoutsConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default)]
    pub allow_lan_access: bool,

    #[serde(default)]
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allow_lan_access: false,
            debug: false,
        }
    }
}

impl ServerConfig {
    pub fn bind_host(&self) -> &str {
        if self.allow_lan_access {
            "0.0.0.0"
        } else {
            &self.host
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer credential for the game server. Empty means none.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Upstream bodies larger than this are answered with 502
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            user_agent: default_user_agent(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    #[serde(default = "default_standard_timeout")]
    pub standard: u64,

    #[serde(default = "default_batch_timeout")]
    pub batch: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            standard: default_standard_timeout(),
            batch: default_batch_timeout(),
            connect: default_connect_timeout(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    /// Forward every request to the game server
    #[default]
    Proxy,
    /// Serve the built-in sample data
    Fixture,
}

impl BackendMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proxy => "proxy",
            Self::Fixture => "fixture",
        }
    }
}

impl std::str::FromStr for BackendMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "proxy" => Ok(Self::Proxy),
            "fixture" | "fixtures" => Ok(Self::Fixture),
            other => anyhow::bail!("Unknown backend mode: {}", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BackendConfig {
    #[serde(default)]
    pub mode: BackendMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiConfig {
    /// Directory with the built browser UI, served for non-API paths
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_port() -> u16 { 5000 }
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_base_url() -> String { "https://api.example-game-server.com".to_string() }
fn default_user_agent() -> String { "MiniUltiMaxConsole/1.0".to_string() }
fn default_max_response_bytes() -> usize { 16 * 1024 * 1024 }
fn default_standard_timeout() -> u64 { 30 }
fn default_batch_timeout() -> u64 { 60 }
fn default_connect_timeout() -> u64 { 10 }
fn default_log_level() -> String { "info".to_string() }

impl Config {
    /// Apply the environment variables understood by the console backend.
    ///
    /// `lookup` is usually `std::env::var(..).ok()`; tests pass a map.
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("GAME_SERVER_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.upstream.base_url = url.trim().to_string();
        }
        if let Some(key) = lookup("GAME_SERVER_API_KEY") {
            self.upstream.api_key = key.trim().to_string();
        }
        if let Some(debug) = lookup("FLASK_DEBUG") {
            self.server.debug = is_truthy(&debug);
        }
        if let Some(port) = lookup("PORT").filter(|v| !v.trim().is_empty()) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid PORT value {:?}: {}", port, e))?;
        }
        Ok(())
    }

    pub fn apply_process_env(&mut self) -> anyhow::Result<()> {
        self.apply_env(|name| std::env::var(name).ok())
    }

    /// API key with everything but the last four characters hidden
    pub fn masked_api_key(&self) -> String {
        let key = &self.upstream.api_key;
        if key.is_empty() {
            return "(none)".to_string();
        }
        let visible: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
        format!("****{}", visible)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Get default config file path
/// Uses ~/.config/miniultimax-console/config.toml
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("miniultimax-console")
        .join("config.toml")
}

/// Where the effective configuration was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults => f.write_str("(none, using defaults)"),
        }
    }
}

/// Load config from file, or return defaults if not found.
///
/// Loading order:
/// 1. Specified path (if provided)
/// 2. ./config.toml (if exists)
/// 3. default_config_path() (usually ~/.config/miniultimax-console/config.toml)
///
/// A file that exists but cannot be read or parsed is an error; the next
/// candidate is never tried in its place.
pub fn load_config(path: Option<PathBuf>) -> anyhow::Result<(Config, ConfigSource)> {
    load_from(path, &[PathBuf::from("config.toml"), default_config_path()])
}

fn load_from(explicit: Option<PathBuf>, candidates: &[PathBuf]) -> anyhow::Result<(Config, ConfigSource)> {
    if let Some(config_path) = explicit {
        if !config_path.exists() {
            anyhow::bail!("Specified config file not found: {:?}", config_path);
        }
        return read_config_file(&config_path);
    }

    for candidate in candidates {
        if candidate.exists() {
            return read_config_file(candidate);
        }
    }

    tracing::info!("No config file found, using defaults");
    Ok((Config::default(), ConfigSource::Defaults))
}

fn read_config_file(path: &Path) -> anyhow::Result<(Config, ConfigSource)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {:?}", path))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {:?}", path))?;
    tracing::info!("Loaded config from {:?}", path);
    Ok((config, ConfigSource::File(path.to_path_buf())))
}

/// Expand ~ in path to home directory
pub fn expand_path(path: &PathBuf) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(rest) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
    }
    path.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_match_console_backend() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.upstream.base_url, "https://api.example-game-server.com");
        assert!(config.upstream.api_key.is_empty());
        assert_eq!(config.timeouts.standard, 30);
        assert_eq!(config.timeouts.batch, 60);
        assert_eq!(config.backend.mode, BackendMode::Proxy);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [upstream]
            base_url = "http://game.local:8080/v1/"

            [backend]
            mode = "fixture"
            "#,
        )
        .expect("parse");
        assert_eq!(config.upstream.base_url, "http://game.local:8080/v1/");
        assert_eq!(config.upstream.user_agent, "MiniUltiMaxConsole/1.0");
        assert_eq!(config.backend.mode, BackendMode::Fixture);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.timeouts.batch, 60);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("GAME_SERVER_BASE_URL", "http://10.0.0.5:9000"),
                ("GAME_SERVER_API_KEY", "secret-key"),
                ("FLASK_DEBUG", "True"),
                ("PORT", "8081"),
            ]))
            .expect("apply env");
        assert_eq!(config.upstream.base_url, "http://10.0.0.5:9000");
        assert_eq!(config.upstream.api_key, "secret-key");
        assert!(config.server.debug);
        assert_eq!(config.server.port, 8081);
    }

    #[test]
    fn blank_base_url_is_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[("GAME_SERVER_BASE_URL", "  ")])).expect("apply env");
        assert_eq!(config.upstream.base_url, "https://api.example-game-server.com");
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut config = Config::default();
        let err = config.apply_env(env(&[("PORT", "fifty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn backend_mode_parses_from_cli_strings() {
        assert_eq!("proxy".parse::<BackendMode>().unwrap(), BackendMode::Proxy);
        assert_eq!("Fixture".parse::<BackendMode>().unwrap(), BackendMode::Fixture);
        assert!("mock".parse::<BackendMode>().is_err());
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("miniultimax-config-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).expect("create dir");
        dir
    }

    #[test]
    fn malformed_local_config_is_reported() {
        let dir = scratch_dir("malformed");
        let local = dir.join("config.toml");
        let fallback = dir.join("fallback.toml");
        std::fs::write(&local, "[server\nport = 5000").expect("write local");
        std::fs::write(&fallback, "[server]\nport = 6000").expect("write fallback");

        let err = load_from(None, &[local.clone(), fallback]).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn first_existing_candidate_wins_and_is_reported() {
        let dir = scratch_dir("candidates");
        let missing = dir.join("config.toml");
        let fallback = dir.join("fallback.toml");
        std::fs::write(&fallback, "[server]\nport = 6000").expect("write fallback");

        let (config, source) = load_from(None, &[missing, fallback.clone()]).expect("load");
        assert_eq!(config.server.port, 6000);
        assert_eq!(source, ConfigSource::File(fallback));

        let (_, source) = load_from(None, &[]).expect("defaults");
        assert_eq!(source, ConfigSource::Defaults);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let path = scratch_dir("explicit").join("nope.toml");
        assert!(load_from(Some(path), &[]).is_err());
    }

    #[test]
    fn api_key_is_masked() {
        let mut config = Config::default();
        assert_eq!(config.masked_api_key(), "(none)");
        config.upstream.api_key = "abcdef123456".to_string();
        assert_eq!(config.masked_api_key(), "****3456");
    }
}
