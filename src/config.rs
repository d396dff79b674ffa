use std::path::Path;

use serde::{Deserialize, Serialize};

/// Settings for the kernel self-check run by the `lockstep_fixed` binary.
///
/// None of these affect kernel results; they only steer how much of the input
/// space [`crate::verify::run`] samples and which table it checks.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct VerifyConfig {
    /// Seed for the sampling RNG. A fixed seed makes every run check the same inputs.
    pub seed: u64,
    /// Random samples drawn per property.
    pub samples: usize,
    /// Allowed `|Div(Mul(a, b), b) - a|` in raw units, for `|b| >= 1.0`.
    pub max_roundtrip_error: u32,
    /// Table file to verify instead of the built-in table.
    pub table_path: Option<String>,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            samples: 100_000,
            max_roundtrip_error: 1,
            table_path: None,
        }
    }
}

pub const DEFAULT_CONFIG_PATH: &str = "assets/verify_config.ron";

/// Load the verification config, falling back to defaults when the file is
/// missing or malformed.
pub fn load_config(path: impl AsRef<Path>) -> VerifyConfig {
    let path = path.as_ref();

    match std::fs::read_to_string(path) {
        Ok(contents) => match parse_config(&contents) {
            Ok(config) => {
                tracing::info!("Loaded verify config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse verify config: {}", e);
                tracing::error!("Using default VerifyConfig");
                VerifyConfig::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read {}: {}", path.display(), e);
            tracing::error!("Using default VerifyConfig");
            VerifyConfig::default()
        }
    }
}

/// Read and parse a config file the user asked for by name. Unlike
/// [`load_config`], a missing or malformed file is an error.
pub fn read_config(path: impl AsRef<Path>) -> crate::Result<VerifyConfig> {
    let path = path.as_ref();
    let config = parse_config(&std::fs::read_to_string(path)?)?;
    tracing::info!("Loaded verify config from {}", path.display());
    Ok(config)
}

pub fn parse_config(contents: &str) -> crate::Result<VerifyConfig> {
    Ok(ron::from_str(contents)?)
}
