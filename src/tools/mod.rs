//! Per-tool command builders.
//!
//! Each scan tool maps the flat inputs into its own state document and
//! contributes a `--stage <name> --state <file>` fragment to the bridge
//! command line.

pub mod blackduck;
pub mod coverity;
pub mod document;
pub mod polaris;
pub mod srm;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::ExecutionContext;
use crate::error::{BridgeError, Result};
use crate::inputs::{keys, Input, RawInputs};
use crate::validate;

/// The scan tools the bridge can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Polaris,
    Coverity,
    BlackDuck,
    Srm,
}

impl Tool {
    /// Fixed order in which stages are placed on the command line.
    pub const ALL: [Tool; 4] = [Tool::Polaris, Tool::Coverity, Tool::BlackDuck, Tool::Srm];

    /// Bridge stage selected with `--stage`.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Polaris => "polaris",
            Self::Coverity => "connect",
            Self::BlackDuck => "blackduck",
            Self::Srm => "srm",
        }
    }

    pub fn state_file_name(&self) -> &'static str {
        match self {
            Self::Polaris => "polaris_input.json",
            Self::Coverity => "coverity_input.json",
            Self::BlackDuck => "blackduck_input.json",
            Self::Srm => "srm_input.json",
        }
    }

    /// The input whose presence selects this tool.
    pub fn endpoint(&self) -> Input {
        match self {
            Self::Polaris => keys::POLARIS_SERVER_URL,
            Self::Coverity => keys::COVERITY_URL,
            Self::BlackDuck => keys::BLACKDUCKSCA_URL,
            Self::Srm => keys::SRM_URL,
        }
    }

    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "polaris" => Some(Self::Polaris),
            "coverity" | "connect" => Some(Self::Coverity),
            "blackduck" | "blackducksca" | "bd" => Some(Self::BlackDuck),
            "srm" => Some(Self::Srm),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Polaris => write!(f, "Polaris"),
            Self::Coverity => write!(f, "Coverity"),
            Self::BlackDuck => write!(f, "Black Duck SCA"),
            Self::Srm => write!(f, "SRM"),
        }
    }
}

/// One tool's contribution to the bridge command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageCommand {
    pub tool: Tool,
    pub state_path: PathBuf,
}

impl StageCommand {
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--stage".to_string(),
            self.tool.stage().to_string(),
            "--state".to_string(),
            self.state_path.display().to_string(),
        ];
        if self.tool == Tool::Coverity {
            args.push("--verbose".to_string());
        }
        args
    }
}

impl std::fmt::Display for StageCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.args().join(" "))
    }
}

/// A builder turns raw inputs into one tool's state file.
pub trait CommandBuilder: Send + Sync {
    fn tool(&self) -> Tool;

    /// Check mandatory fields without failing.
    fn validate(&self, inputs: &RawInputs) -> Vec<String>;

    /// Assemble the state document. Only called once `validate` is clean.
    fn build(&self, inputs: &RawInputs, ctx: &ExecutionContext) -> Result<Value>;

    /// A tool takes part in the run when its endpoint input is set.
    fn is_selected(&self, inputs: &RawInputs) -> bool {
        inputs.get(&self.tool().endpoint()).is_some()
    }

    /// Validate, build and write the state file, returning the CLI fragment.
    ///
    /// Nothing is written when validation or building fails.
    fn prepare(
        &self,
        inputs: &RawInputs,
        ctx: &ExecutionContext,
        state_dir: &Path,
    ) -> Result<StageCommand> {
        validate::fatal(self.validate(inputs), BridgeError::MissingParameter)?;
        let document = self.build(inputs, ctx)?;
        let state_path = write_state_file(state_dir, self.tool(), &document)?;
        Ok(StageCommand {
            tool: self.tool(),
            state_path,
        })
    }
}

/// All builders, in command-line order.
pub fn all_builders() -> Vec<Box<dyn CommandBuilder>> {
    vec![
        Box::new(polaris::PolarisBuilder),
        Box::new(coverity::CoverityBuilder),
        Box::new(blackduck::BlackDuckBuilder),
        Box::new(srm::SrmBuilder),
    ]
}

/// Write `document` to the tool's state file, replacing any earlier one.
pub fn write_state_file(state_dir: &Path, tool: Tool, document: &Value) -> Result<PathBuf> {
    let dir = if state_dir.is_absolute() {
        state_dir.to_path_buf()
    } else {
        std::env::current_dir()?.join(state_dir)
    };
    let path = dir.join(tool.state_file_name());
    let json = serde_json::to_string_pretty(document)?;
    std::fs::write(&path, json)?;
    tracing::debug!(tool = %tool, path = %path.display(), "wrote state file");
    Ok(path)
}

/// Shared fixtures for the builder tests.
#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;

    use crate::context::ExecutionContext;

    pub fn push_context() -> ExecutionContext {
        context(&[
            ("GITHUB_EVENT_NAME", "push"),
            ("GITHUB_REPOSITORY", "acme/demo"),
            ("GITHUB_REPOSITORY_OWNER", "acme"),
            ("GITHUB_REF_NAME", "main"),
            ("GITHUB_REF", "refs/heads/main"),
            ("GITHUB_SHA", "0123abcd"),
            ("GITHUB_SERVER_URL", "https://github.com"),
        ])
    }

    pub fn pr_context() -> ExecutionContext {
        context(&[
            ("GITHUB_EVENT_NAME", "pull_request"),
            ("GITHUB_REPOSITORY", "acme/demo"),
            ("GITHUB_REPOSITORY_OWNER", "acme"),
            ("GITHUB_HEAD_REF", "feature1"),
            ("GITHUB_BASE_REF", "main"),
            ("GITHUB_REF_NAME", "7/merge"),
            ("GITHUB_REF", "refs/pull/7/merge"),
            ("GITHUB_SHA", "0123abcd"),
            ("GITHUB_SERVER_URL", "https://github.com"),
        ])
    }

    pub fn context(pairs: &[(&str, &str)]) -> ExecutionContext {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ExecutionContext::resolve(&env)
    }

    pub fn read_state(path: &std::path::Path) -> serde_json::Value {
        let content = std::fs::read_to_string(path).unwrap();
        serde_json::from_str(&content).unwrap()
    }
}
