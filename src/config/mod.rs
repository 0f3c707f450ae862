use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::inputs::{keys, RawInputs};

pub const DEFAULT_CONFIG_FILE: &str = ".bridge-action.toml";

/// Top-level configuration from `.bridge-action.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input values, keyed like the action inputs.
    #[serde(default)]
    pub inputs: BTreeMap<String, InputValue>,
}

/// TOML scalars accepted for an input; all end up as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Flag(bool),
    Number(i64),
    Text(String),
}

impl std::fmt::Display for InputValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Convert into raw inputs. Keys that no input answers to are logged.
    pub fn into_raw_inputs(self) -> RawInputs {
        let mut inputs = RawInputs::new();
        for (key, value) in self.inputs {
            let known = keys::ALL
                .iter()
                .any(|input| input.names().any(|name| name.eq_ignore_ascii_case(&key)));
            if !known {
                tracing::warn!(key = %key, "unknown input in config file");
            }
            inputs.insert(&key, value.to_string());
        }
        inputs
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# Bridge action configuration
# Values here are overridden by INPUT_<NAME> environment variables.

[inputs]
# At least one scan endpoint selects a tool.
# polaris_server_url = "https://polaris.example.com"
# polaris_assessment_types = "SCA,SAST"
# coverity_url = "https://coverity.example.com"
# blackducksca_url = "https://blackduck.example.com"
# srm_url = "https://srm.example.com"

# Bridge CLI location and version.
# bridgecli_install_directory = "/opt/bridge-cli-bundle"
# bridgecli_download_version = "latest"

# Upload the .bridge directory as an artifact.
include_diagnostics = false
# diagnostics_retention_days = 7
"#
    }
}
