//! Bridge action: turns CI inputs into Bridge CLI state files and runs
//! Polaris, Coverity, Black Duck SCA and SRM stages.
//!
//! Inputs come from `INPUT_<NAME>` environment variables layered over an
//! optional `.bridge-action.toml`. Each selected tool writes its own state
//! file; the bridge is then invoked once with every stage.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::collections::HashMap;
//! use std::path::Path;
//! use bridge_action::{load_inputs, prepare, resolve_context};
//!
//! let env: HashMap<String, String> = std::env::vars().collect();
//! let inputs = load_inputs(Path::new(".bridge-action.toml"), &env).unwrap();
//! let ctx = resolve_context(&inputs, &env);
//! let command = prepare(&inputs, &ctx, Path::new("/tmp")).unwrap();
//! println!("bridge-cli {}", command);
//! ```

pub mod assembler;
pub mod bridge;
pub mod config;
pub mod context;
pub mod error;
pub mod inputs;
pub mod output;
pub mod relay;
pub mod tools;
pub mod validate;

use std::collections::HashMap;
use std::path::Path;

use assembler::BridgeCommand;
use bridge::{BridgeResolver, BridgeSource, Executor};
use config::Config;
use context::ExecutionContext;
use error::Result;
use inputs::{keys, RawInputs};
use relay::{ArtifactUploader, CodeScanningClient, RelayReport};

/// Config file values overlaid with `INPUT_*` environment values.
pub fn load_inputs(config_path: &Path, env: &HashMap<String, String>) -> Result<RawInputs> {
    let mut inputs = Config::load(config_path)?.into_raw_inputs();
    inputs.extend(RawInputs::from_env(env));
    Ok(inputs)
}

/// Hosting-platform context, with the `github_token` input taking
/// precedence over the environment token.
pub fn resolve_context(inputs: &RawInputs, env: &HashMap<String, String>) -> ExecutionContext {
    ExecutionContext::resolve(env).with_token(inputs.get(&keys::GITHUB_TOKEN))
}

/// Write state files into `state_dir` and return the bridge command.
pub fn prepare(
    inputs: &RawInputs,
    ctx: &ExecutionContext,
    state_dir: &Path,
) -> Result<BridgeCommand> {
    assembler::assemble(inputs, ctx, state_dir)
}

/// External systems a run talks to.
pub struct Collaborators<'a> {
    pub resolver: &'a dyn BridgeResolver,
    pub executor: &'a dyn Executor,
    pub uploader: &'a dyn ArtifactUploader,
    pub scanning: &'a dyn CodeScanningClient,
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct RunReport {
    pub command: BridgeCommand,
    pub exit_code: i32,
    pub relay: RelayReport,
}

/// Resolve the bridge, prepare every stage in a temporary state directory,
/// execute, then relay results.
///
/// Results are relayed even when the bridge fails; the failure is returned
/// afterwards as [`error::BridgeError::BridgeExecution`].
pub fn run(
    inputs: &RawInputs,
    ctx: &ExecutionContext,
    collaborators: &Collaborators<'_>,
) -> Result<RunReport> {
    let source = BridgeSource::from_inputs(inputs)?;
    let program = collaborators.resolver.resolve(&source)?;

    let state_dir = tempfile::Builder::new().prefix("bridge-action-").tempdir()?;
    let command = assembler::assemble(inputs, ctx, state_dir.path())?;
    for warning in &command.warnings {
        tracing::debug!(warning = %warning, "continuing without tool");
    }

    let working_dir = ctx.working_directory(inputs.get(&keys::PROJECT_DIRECTORY));
    let exit_code = collaborators
        .executor
        .execute(&program, &command.args(), &working_dir)?;

    let relay = relay::publish(
        inputs,
        ctx,
        &command,
        &working_dir,
        collaborators.uploader,
        collaborators.scanning,
    );

    let state_path = state_dir.path().to_path_buf();
    if let Err(e) = state_dir.close() {
        tracing::warn!(path = %state_path.display(), error = %e, "failed to remove state directory");
    }

    bridge::check_exit(exit_code)?;
    Ok(RunReport {
        command,
        exit_code,
        relay,
    })
}
