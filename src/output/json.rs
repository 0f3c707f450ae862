use crate::assembler::BridgeCommand;
use crate::error::Result;
use crate::inputs::Input;

use serde::Serialize;

#[derive(Serialize)]
struct JsonCommand<'a> {
    command: String,
    args: Vec<String>,
    #[serde(flatten)]
    detail: &'a BridgeCommand,
}

/// Render a prepared command as JSON, including the joined command line.
pub fn render(command: &BridgeCommand) -> Result<String> {
    let report = JsonCommand {
        command: command.to_string(),
        args: command.args(),
        detail: command,
    };
    let json = serde_json::to_string_pretty(&report)?;
    Ok(json)
}

pub fn render_inputs(inputs: &[Input]) -> Result<String> {
    Ok(serde_json::to_string_pretty(inputs)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::keys;
    use crate::tools::{StageCommand, Tool};
    use std::path::PathBuf;

    #[test]
    fn command_json_carries_stages_and_line() {
        let command = BridgeCommand {
            stages: vec![StageCommand {
                tool: Tool::Srm,
                state_path: PathBuf::from("/tmp/srm_input.json"),
            }],
            diagnostics: true,
            warnings: vec!["skipped".into()],
        };
        let value: serde_json::Value = serde_json::from_str(&render(&command).unwrap()).unwrap();
        assert_eq!(
            value["command"],
            "--stage srm --state /tmp/srm_input.json --diagnostics"
        );
        assert_eq!(value["stages"][0]["tool"], "srm");
        assert_eq!(value["warnings"][0], "skipped");
    }

    #[test]
    fn inputs_serialize_with_scope_and_aliases() {
        let value: serde_json::Value =
            serde_json::from_str(&render_inputs(&[keys::BLACKDUCKSCA_URL]).unwrap()).unwrap();
        assert_eq!(value[0]["key"], "blackducksca_url");
        assert_eq!(value[0]["deprecated"][0], "blackduck_url");
        assert_eq!(value[0]["scope"], "blackduck");
    }
}
