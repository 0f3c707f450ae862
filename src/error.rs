use thiserror::Error;

use crate::bridge::BridgeExitCode;
use crate::tools::Tool;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("{0}")]
    MissingParameter(String),

    #[error("{0}")]
    InvalidValue(String),

    #[error("{0}")]
    ConflictingFields(String),

    #[error("Missing required github token for {feature}")]
    MissingCredential { feature: String },

    #[error("{}", no_scan_type_message(.failures))]
    NoScanTypeSelected { failures: Vec<String> },

    #[error("Bridge CLI not found: {0}")]
    BridgeNotFound(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Bridge CLI exited with code {code}: {description}")]
    BridgeExecution { code: i32, description: String },

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Errors that abort a single tool's stage but not the whole run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MissingParameter(_)
                | Self::InvalidValue(_)
                | Self::ConflictingFields(_)
                | Self::MissingCredential { .. }
        )
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::BridgeExecution { code, .. } => *code,
            _ => BridgeExitCode::UndefinedError.code(),
        }
    }
}

fn no_scan_type_message(failures: &[String]) -> String {
    let endpoints: Vec<&str> = Tool::ALL.iter().map(|t| t.endpoint().key).collect();
    let mut message = format!(
        "Requires at least one scan type: ({})",
        endpoints.join(",")
    );
    if !failures.is_empty() {
        message.push_str("; ");
        message.push_str(&failures.join("; "));
    }
    message
}
