use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Database URL that selects the in-process store instead of PostgreSQL.
pub const MEMORY_DATABASE_URL: &str = "memory://";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub seed: SeedSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub pool_size: u32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedSettings {
    pub enabled: bool,
}

impl DatabaseSettings {
    pub fn is_memory(&self) -> bool {
        self.url.starts_with(MEMORY_DATABASE_URL)
    }
}

impl Settings {
    /// Loads `appsettings.*` (optional) and `APP__*` environment overrides,
    /// e.g. `APP__DATABASE__URL=postgres://...`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_file("appsettings")
    }

    pub fn from_file(name: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3001_i64)?
            .set_default("database.url", MEMORY_DATABASE_URL)?
            .set_default("database.pool_size", 10_i64)?
            .set_default("database.timeout_seconds", 30_i64)?
            .set_default("seed.enabled", false)?
            .add_source(File::with_name(name).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_settings_file() {
        let settings = Settings::from_file("does-not-exist").unwrap();
        assert_eq!(settings.server.port, 3001);
        assert_eq!(settings.database.pool_size, 10);
        assert!(settings.database.is_memory());
        assert!(!settings.seed.enabled);
    }
}
