//! Configuration management for the gateway binary

use crate::cli::Cli;
use figment::{Figment, providers::{Format, Yaml, Env}};
use graph_gateway_adapter_in_memory::InMemoryConfig;
use graph_gateway_core::errors::{CoreError, CoreResult};
use graph_gateway_http::HttpConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix; `__` separates sections, e.g.
/// `GRAPH_GATEWAY_HTTP__MOUNT_PATH`
pub const ENV_PREFIX: &str = "GRAPH_GATEWAY_";

/// Configuration for the gateway process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listener and routing
    pub http: HttpConfig,
    /// In-memory graph module
    pub store: InMemoryConfig,
}

impl ServerConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: &Option<PathBuf>) -> CoreResult<Self> {
        let mut figment = Figment::new();

        // Load from default config file if it exists
        let default_config_paths = [
            "graph-gateway.yaml",
            "graph-gateway.yml",
        ];

        for path in &default_config_paths {
            if Path::new(path).exists() {
                figment = figment.merge(Yaml::file(path));
                break;
            }
        }

        // Load from specified config file
        if let Some(path) = config_path {
            if path.exists() {
                figment = figment.merge(Yaml::file(path));
            } else {
                return Err(CoreError::Configuration(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract()
            .map_err(|e| CoreError::Configuration(format!("Failed to parse configuration: {}", e)))
    }

    /// Apply CLI argument overrides to the configuration
    pub fn with_overrides(mut self, args: &Cli) -> Self {
        if let Some(bind) = args.bind {
            self.http.bind_address = bind;
        }

        if let Some(ref mount) = args.mount {
            self.http.mount_path = mount.clone();
        }

        self
    }
}
