use crate::assembler::BridgeCommand;
use crate::inputs::Input;

/// Render a prepared command: the command line, one state file per stage,
/// then any skipped tools.
pub fn render(command: &BridgeCommand) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n  bridge-cli {}\n\n", command));

    output.push_str(&format!("  {} stage(s) prepared:\n", command.stages.len()));
    for stage in &command.stages {
        output.push_str(&format!(
            "  {:<16} {}\n",
            stage.tool.to_string(),
            stage.state_path.display()
        ));
    }

    if !command.warnings.is_empty() {
        output.push_str(&format!("\n  {} tool(s) skipped:\n", command.warnings.len()));
        for warning in &command.warnings {
            output.push_str(&format!("  [WARN] {}\n", warning));
        }
    }
    output.push('\n');

    output
}

/// One row per input: key, owning tool, deprecated names, description.
pub fn render_inputs(inputs: &[Input]) -> String {
    let width = inputs.iter().map(|i| i.key.len()).max().unwrap_or(0);
    let mut output = String::new();
    for input in inputs {
        let scope = input
            .scope
            .map(|t| t.to_string())
            .unwrap_or_else(|| "common".into());
        output.push_str(&format!(
            "{:<width$}  {:<14}  {}",
            input.key, scope, input.description
        ));
        if !input.deprecated.is_empty() {
            output.push_str(&format!(" (deprecated: {})", input.deprecated.join(", ")));
        }
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::keys;
    use crate::tools::{StageCommand, Tool};
    use std::path::PathBuf;

    #[test]
    fn lists_stages_and_warnings() {
        let command = BridgeCommand {
            stages: vec![StageCommand {
                tool: Tool::Coverity,
                state_path: PathBuf::from("/tmp/coverity_input.json"),
            }],
            diagnostics: false,
            warnings: vec!["Invalid value for `blackducksca_fixpr_maxCount`".into()],
        };
        let text = render(&command);
        assert!(text.contains("bridge-cli --stage connect --state /tmp/coverity_input.json --verbose"));
        assert!(text.contains("1 stage(s) prepared"));
        assert!(text.contains("[WARN] Invalid value"));
    }

    #[test]
    fn input_table_shows_deprecated_names() {
        let text = render_inputs(&[keys::GITHUB_TOKEN, keys::COVERITY_PROJECT_NAME]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("common"));
        assert!(lines[1].contains("deprecated: coverity_repository_name"));
    }
}
