// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Veiled Labs <dev@veiled.sh>

use crate::domain::constants::DEFAULT_EXECUTION_COOLDOWN_BLOCKS;
use crate::domain::error::EngineError;
use alloy::primitives::Address;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use url::Url;

#[derive(Debug, Deserialize, Clone)]
pub struct EngineSettings {
    // General
    #[serde(default = "default_debug")]
    pub debug: bool,
    #[serde(default = "default_false")]
    pub json_logs: bool,

    // Principals
    pub governance_address: Address,
    #[serde(default)]
    pub authorized_executors: Vec<Address>,

    // Execution discipline
    #[serde(default = "default_cooldown_blocks")]
    pub execution_cooldown_blocks: u64,

    // Coprocessor
    #[serde(default = "default_coprocessor_backend")]
    pub coprocessor_backend: String, // "software"; remote backends configure an endpoint
    pub coprocessor_endpoint: Option<String>,

    // Service
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
    #[serde(default = "default_block_time_ms")]
    pub block_time_ms: u64,
}

// Defaults
fn default_debug() -> bool {
    false
}
fn default_false() -> bool {
    false
}
fn default_cooldown_blocks() -> u64 {
    DEFAULT_EXECUTION_COOLDOWN_BLOCKS
}
fn default_coprocessor_backend() -> String {
    "software".to_string()
}
fn default_metrics_port() -> u16 {
    9100
}
fn default_block_time_ms() -> u64 {
    12_000
}

impl EngineSettings {
    pub fn load_with_path(path: Option<&str>) -> Result<Self, EngineError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();
        if let Some(selected) = path {
            builder = builder.add_source(File::from(Path::new(selected)).required(true));
        } else {
            builder = builder.add_source(File::with_name("config").required(false));
        }
        // Deterministic precedence: env/.env > selected profile file.
        builder = builder.add_source(Environment::default());

        let settings: EngineSettings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load() -> Result<Self, EngineError> {
        Self::load_with_path(None)
    }

    fn validate(&self) -> Result<(), EngineError> {
        match self.coprocessor_backend.as_str() {
            "software" => {}
            "remote" => {
                let endpoint = self.coprocessor_endpoint.as_deref().ok_or_else(|| {
                    EngineError::Config(
                        "coprocessor_backend = \"remote\" requires coprocessor_endpoint"
                            .to_string(),
                    )
                })?;
                Url::parse(endpoint).map_err(|e| {
                    EngineError::Config(format!("Invalid coprocessor_endpoint: {}", e))
                })?;
            }
            other => {
                return Err(EngineError::Config(format!(
                    "Unknown coprocessor backend '{}'",
                    other
                )));
            }
        }
        if self.block_time_ms == 0 {
            return Err(EngineError::Config(
                "block_time_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn block_time(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.block_time_ms.max(1))
    }
}
