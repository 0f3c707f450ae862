//! Turns the selected tools' fragments into one bridge command line.

use std::path::Path;

use serde::Serialize;

use crate::context::ExecutionContext;
use crate::error::{BridgeError, Result};
use crate::inputs::{keys, RawInputs};
use crate::tools::{all_builders, CommandBuilder, StageCommand};

pub const DIAGNOSTICS_FLAG: &str = "--diagnostics";

/// The prepared bridge invocation.
#[derive(Debug, Clone, Serialize)]
pub struct BridgeCommand {
    pub stages: Vec<StageCommand>,
    pub diagnostics: bool,
    /// Tools that were selected but skipped, with the reason.
    pub warnings: Vec<String>,
}

impl BridgeCommand {
    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = self.stages.iter().flat_map(StageCommand::args).collect();
        if self.diagnostics {
            args.push(DIAGNOSTICS_FLAG.to_string());
        }
        args
    }
}

impl std::fmt::Display for BridgeCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.args().join(" "))
    }
}

/// Prepare every selected tool, writing state files into `state_dir`.
pub fn assemble(
    inputs: &RawInputs,
    ctx: &ExecutionContext,
    state_dir: &Path,
) -> Result<BridgeCommand> {
    assemble_with(&all_builders(), inputs, ctx, state_dir)
}

/// Like [`assemble`] with an explicit builder list, kept in the given order.
///
/// A tool that fails validation is skipped with a warning as long as
/// another tool succeeds. Errors outside the per-tool kinds abort.
pub fn assemble_with(
    builders: &[Box<dyn CommandBuilder>],
    inputs: &RawInputs,
    ctx: &ExecutionContext,
    state_dir: &Path,
) -> Result<BridgeCommand> {
    let diagnostics = inputs.flag(&keys::INCLUDE_DIAGNOSTICS);
    if diagnostics {
        inputs.number(&keys::DIAGNOSTICS_RETENTION_DAYS)?;
    }

    let mut stages = Vec::new();
    let mut failures = Vec::new();

    for builder in builders.iter().filter(|b| b.is_selected(inputs)) {
        match builder.prepare(inputs, ctx, state_dir) {
            Ok(stage) => {
                tracing::info!(tool = %builder.tool(), stage = builder.tool().stage(), "stage prepared");
                stages.push(stage);
            }
            Err(e) if e.is_recoverable() => failures.push((builder.tool(), e.to_string())),
            Err(e) => return Err(e),
        }
    }

    if stages.is_empty() {
        return Err(BridgeError::NoScanTypeSelected {
            failures: failures.into_iter().map(|(_, message)| message).collect(),
        });
    }

    for (tool, message) in &failures {
        tracing::warn!(tool = %tool, error = %message, "skipping tool");
    }

    Ok(BridgeCommand {
        stages,
        diagnostics,
        warnings: failures.into_iter().map(|(_, message)| message).collect(),
    })
}
