use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable that points at an explicit config file.
pub const CONFIG_PATH_ENV: &str = "LAPTOPDASH_CONFIG";

/// Environment variable that overrides `general.database_path`.
pub const DATABASE_URL_ENV: &str = "LAPTOPDASH_DATABASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub cache: CacheConfig,

    pub analytics: AnalyticsConfig,

    pub import: ImportConfig,

    pub security: SecurityConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/laptopdash.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Leave disabled for local development without HTTPS.
    pub secure_cookies: bool,

    /// Session lifetime without activity, in minutes.
    pub session_inactivity_minutes: i64,

    /// Session lifetime when "remember me" is ticked on the login form.
    pub remember_me_days: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            cors_allowed_origins: vec![
                "http://localhost:5000".to_string(),
                "http://127.0.0.1:5000".to_string(),
            ],
            secure_cookies: false,
            session_inactivity_minutes: 60,
            remember_me_days: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Time-to-live of cached aggregate responses.
    pub ttl_seconds: u64,

    /// Upper bound on cached (handler, query string) pairs.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 300,
            max_entries: 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Length of the synthetic price history the forecast is fitted on.
    pub history_days: usize,

    pub default_forecast_days: usize,

    pub max_forecast_days: usize,

    /// Pin the forecast noise seed. When unset every call draws fresh noise.
    pub forecast_seed: Option<u64>,

    pub cluster_min_rows: usize,

    pub cluster_k_min: usize,

    pub cluster_k_max: usize,

    pub kmeans_seed: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            history_days: 90,
            default_forecast_days: 30,
            max_forecast_days: 365,
            forecast_seed: None,
            cluster_min_rows: 10,
            cluster_k_min: 2,
            cluster_k_max: 5,
            kmeans_seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// CSV used by `import-csv` when no `--csv-path` is given.
    pub csv_path: String,

    /// Rows per committed transaction.
    pub batch_size: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            csv_path: "data/laptops_final.csv".to_string(),
            batch_size: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,

    pub min_password_length: usize,

    /// Account created by `init-db` when the users table is empty.
    pub bootstrap_admin_username: String,

    pub bootstrap_admin_email: String,

    pub bootstrap_admin_password: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
            min_password_length: 6,
            bootstrap_admin_username: "admin".to_string(),
            bootstrap_admin_email: "admin@example.com".to_string(),
            bootstrap_admin_password: "admin123".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
            analytics: AnalyticsConfig::default(),
            import: ImportConfig::default(),
            security: SecurityConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;

        if let Ok(url) = std::env::var(DATABASE_URL_ENV)
            && !url.trim().is_empty()
        {
            info!("Database path overridden by {DATABASE_URL_ENV}");
            config.general.database_path = url;
        }

        Ok(config)
    }

    fn load_file() -> Result<Self> {
        if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(explicit);
            info!("Loading config from {CONFIG_PATH_ENV}: {}", path.display());
            return Self::load_from_path(&path);
        }

        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("laptopdash").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".laptopdash").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_path.trim().is_empty() {
            anyhow::bail!("Database path cannot be empty");
        }

        if self.general.min_db_connections > self.general.max_db_connections {
            anyhow::bail!("min_db_connections cannot exceed max_db_connections");
        }

        let analytics = &self.analytics;
        if analytics.history_days < 3 {
            anyhow::bail!("analytics.history_days must be at least 3");
        }
        if analytics.cluster_k_min < 2 || analytics.cluster_k_min > analytics.cluster_k_max {
            anyhow::bail!("analytics cluster k range must satisfy 2 <= k_min <= k_max");
        }
        if analytics.default_forecast_days == 0
            || analytics.default_forecast_days > analytics.max_forecast_days
        {
            anyhow::bail!("analytics.default_forecast_days must be in 1..=max_forecast_days");
        }

        if self.import.batch_size == 0 {
            anyhow::bail!("import.batch_size must be > 0");
        }

        if self.cache.max_entries == 0 {
            anyhow::bail!("cache.max_entries must be > 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cache.ttl_seconds, 300);
        assert_eq!(config.analytics.history_days, 90);
        assert_eq!(config.analytics.cluster_k_min, 2);
        assert_eq!(config.analytics.cluster_k_max, 5);
        assert_eq!(config.server.remember_me_days, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[analytics]"));
        assert!(toml_str.contains("[cache]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [analytics]
            forecast_seed = 7
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.analytics.forecast_seed, Some(7));
        assert_eq!(config.analytics.kmeans_seed, 42);
        assert_eq!(config.cache.ttl_seconds, 300);
    }

    #[test]
    fn test_validate_rejects_bad_cluster_range() {
        let mut config = Config::default();
        config.analytics.cluster_k_min = 6;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.import.batch_size = 0;
        assert!(config.validate().is_err());
    }
}
