pub mod console;
pub mod json;

use serde::{Deserialize, Serialize};

use crate::assembler::BridgeCommand;
use crate::error::Result;
use crate::inputs::Input;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
}

impl OutputFormat {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" | "table" => Some(Self::Console),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Render a prepared bridge command into the specified format.
pub fn render(command: &BridgeCommand, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render(command)),
        OutputFormat::Json => json::render(command),
    }
}

/// Render the input catalog.
pub fn render_inputs(inputs: &[Input], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render_inputs(inputs)),
        OutputFormat::Json => json::render_inputs(inputs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_are_lenient() {
        assert_eq!(OutputFormat::from_str_lenient("TABLE"), Some(OutputFormat::Console));
        assert_eq!(OutputFormat::from_str_lenient("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str_lenient("sarif"), None);
    }
}
