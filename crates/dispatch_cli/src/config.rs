//! Layered runtime configuration (§4.7): built-in defaults, an optional TOML
//! file, environment variables, then CLI flags, each layer overriding the
//! last.

use std::path::PathBuf;

use dispatch_core::model::Point;
use serde::Deserialize;

use crate::cli::Args;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub port: u16,
    pub log_filter: String,
    pub depot: Point,
    pub fixture_path: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            log_filter: "info".to_string(),
            depot: Point::new(0.0, 0.0),
            fixture_path: None,
        }
    }
}

/// Mirrors `RuntimeConfig`, every field optional, for deserializing a TOML
/// file that may only override a subset of the defaults.
#[derive(Debug, Default, Deserialize)]
struct RuntimeConfigFile {
    bind_addr: Option<String>,
    port: Option<u16>,
    log_filter: Option<String>,
    depot_lng: Option<f64>,
    depot_lat: Option<f64>,
    fixture_path: Option<PathBuf>,
}

impl RuntimeConfig {
    /// Builds the final config: defaults, then an optional TOML file at
    /// `args.config`, then environment variables, then `args` flags.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = RuntimeConfig::default();

        if let Some(path) = &args.config {
            let contents = std::fs::read_to_string(path)
                .map_err(|err| ConfigError::ReadFile(path.clone(), err.to_string()))?;
            let file: RuntimeConfigFile =
                toml::from_str(&contents).map_err(|err| ConfigError::ParseFile(path.clone(), err.to_string()))?;
            config.apply_file(file);
        }

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    fn apply_file(&mut self, file: RuntimeConfigFile) {
        if let Some(v) = file.bind_addr {
            self.bind_addr = v;
        }
        if let Some(v) = file.port {
            self.port = v;
        }
        if let Some(v) = file.log_filter {
            self.log_filter = v;
        }
        if let (Some(lng), Some(lat)) = (file.depot_lng, file.depot_lat) {
            self.depot = Point::new(lng, lat);
        }
        if let Some(v) = file.fixture_path {
            self.fixture_path = Some(v);
        }
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("DISPATCH_BIND") {
            self.bind_addr = v;
        }
        if let Ok(v) = std::env::var("DISPATCH_PORT") {
            if let Ok(port) = v.parse() {
                self.port = port;
            }
        }
        if let Ok(v) = std::env::var("RUST_LOG") {
            self.log_filter = v;
        }
        if let Ok(v) = std::env::var("DISPATCH_FIXTURE") {
            self.fixture_path = Some(PathBuf::from(v));
        }
    }

    fn apply_args(&mut self, args: &Args) {
        if let Some(v) = &args.bind {
            self.bind_addr = v.clone();
        }
        if let Some(v) = args.port {
            self.port = v;
        }
        if let Some(v) = &args.log_filter {
            self.log_filter = v.clone();
        }
        if let Some(v) = &args.fixture {
            self.fixture_path = Some(v.clone());
        }
        if let (Some(lng), Some(lat)) = (args.depot_lng, args.depot_lat) {
            self.depot = Point::new(lng, lat);
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFile(PathBuf, String),
    #[error("failed to parse config file {0}: {1}")]
    ParseFile(PathBuf, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Args, Command};

    #[test]
    fn defaults_apply_with_no_overrides() {
        let args = Args {
            command: Command::Run,
            config: None,
            bind: None,
            port: None,
            log_filter: None,
            fixture: None,
            depot_lng: None,
            depot_lat: None,
        };
        let config = RuntimeConfig::load(&args).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn cli_flags_override_defaults() {
        let args = Args {
            command: Command::Run,
            config: None,
            bind: Some("0.0.0.0".to_string()),
            port: Some(9000),
            log_filter: Some("debug".to_string()),
            fixture: None,
            depot_lng: Some(1.0),
            depot_lat: Some(2.0),
        };
        let config = RuntimeConfig::load(&args).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.depot, Point::new(1.0, 2.0));
    }
}
