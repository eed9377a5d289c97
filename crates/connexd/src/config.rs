//! Daemon configuration
//!
//! An optional TOML file with a `[server]` table for the listener and an
//! `[api]` table that deserializes into [`ApiConfig`]. `CONNEX_HOST`,
//! `CONNEX_PORT` and `CONNEX_ENV` override the file.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use connex_api::{ApiConfig, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Generate sample data at boot when the store holds no records
    pub seed_on_empty: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            seed_on_empty: true,
        }
    }
}

impl DaemonConfig {
    /// Read `path` (or start from defaults) and apply environment overrides
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                Self::parse(&content)
                    .with_context(|| format!("Invalid config file {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `CONNEX_*` overrides looked up through `var`
    pub fn apply_overrides<F>(&mut self, var: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = var("CONNEX_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("CONNEX_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("CONNEX_PORT '{}' is not a port number", port))?;
        }
        if let Some(env) = var("CONNEX_ENV") {
            self.api.environment = env.parse::<Environment>().map_err(anyhow::Error::msg)?;
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid listen address {}:{}",
                    self.server.host, self.server.port
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_without_file() {
        let config = DaemonConfig::default();
        assert_eq!(config.listen_addr().unwrap().to_string(), "0.0.0.0:8000");
        assert!(config.server.seed_on_empty);
        assert_eq!(config.api.rate_limit.max_requests, 1000);
        assert_eq!(config.api.seed.record_count, 50_000);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9100
seed_on_empty = false

[api]
environment = "production"

[api.rate_limit]
max_requests = 50
"#
        )
        .unwrap();

        let config = DaemonConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(!config.server.seed_on_empty);
        assert!(config.api.environment.is_production());
        assert_eq!(config.api.rate_limit.max_requests, 50);
        assert_eq!(config.api.rate_limit.window_secs, 60);
        assert_eq!(config.api.store_timeout_ms, 5000);
    }

    #[test]
    fn unreadable_or_invalid_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DaemonConfig::load(Some(&dir.path().join("missing.toml"))).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = \"eighty\"").unwrap();
        assert!(DaemonConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn environment_overrides_file() {
        let vars: HashMap<&str, &str> = [
            ("CONNEX_HOST", "127.0.0.1"),
            ("CONNEX_PORT", "8123"),
            ("CONNEX_ENV", "prod"),
        ]
        .into_iter()
        .collect();

        let mut config = DaemonConfig::parse("[server]\nport = 9000").unwrap();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.listen_addr().unwrap().to_string(), "127.0.0.1:8123");
        assert_eq!(config.api.environment, Environment::Production);
    }

    #[test]
    fn bad_override_is_rejected() {
        let mut config = DaemonConfig::default();
        assert!(config
            .apply_overrides(|k| (k == "CONNEX_PORT").then(|| "http".to_string()))
            .is_err());
        assert!(config
            .apply_overrides(|k| (k == "CONNEX_ENV").then(|| "staging".to_string()))
            .is_err());
    }
}
