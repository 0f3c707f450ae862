use std::collections::HashMap;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bridge_action::bridge::{LocalInstall, ProcessExecutor};
use bridge_action::config::{Config, DEFAULT_CONFIG_FILE};
use bridge_action::error::BridgeError;
use bridge_action::inputs::keys;
use bridge_action::output::{self, OutputFormat};
use bridge_action::relay::{DirectoryUploader, FileCodeScanningClient};
use bridge_action::tools::Tool;
use bridge_action::Collaborators;

#[derive(Parser)]
#[command(
    name = "bridge-action",
    about = "Translate CI inputs into Bridge CLI stages and run them",
    version,
    author
)]
struct Cli {
    /// Debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare state files, run the bridge and relay its results
    Run {
        /// Config file path
        #[arg(long, short = 'c', default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Directory receiving artifacts and code-scanning payloads
        #[arg(long, default_value = "bridge-artifacts", env = "BRIDGE_ACTION_ARTIFACT_DIR")]
        artifact_dir: PathBuf,
    },

    /// Write state files and print the bridge command without running it
    Prepare {
        /// Config file path
        #[arg(long, short = 'c', default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Where state files are written
        #[arg(long, short = 's', default_value = ".")]
        state_dir: PathBuf,

        /// Output format (console, json)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,
    },

    /// List every recognised input
    ListInputs {
        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,

        /// Only inputs of one tool (polaris, coverity, blackduck, srm)
        #[arg(long, short = 't')]
        tool: Option<String>,
    },

    /// Generate a starter .bridge-action.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "bridge_action=debug"
    } else {
        "bridge_action=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run {
            config,
            artifact_dir,
        } => cmd_run(config, artifact_dir),
        Commands::Prepare {
            config,
            state_dir,
            format,
        } => cmd_prepare(config, state_dir, format),
        Commands::ListInputs { format, tool } => cmd_list_inputs(format, tool),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn environment() -> HashMap<String, String> {
    std::env::vars().collect()
}

fn cmd_run(config: PathBuf, artifact_dir: PathBuf) -> Result<i32, BridgeError> {
    let env = environment();
    let inputs = bridge_action::load_inputs(&config, &env)?;
    let ctx = bridge_action::resolve_context(&inputs, &env);

    let resolver = LocalInstall::from_home(env.get("HOME").map(String::as_str));
    let uploader = DirectoryUploader::new(&artifact_dir);
    let scanning = FileCodeScanningClient::new(&artifact_dir);
    let collaborators = Collaborators {
        resolver: &resolver,
        executor: &ProcessExecutor,
        uploader: &uploader,
        scanning: &scanning,
    };

    let report = bridge_action::run(&inputs, &ctx, &collaborators)?;
    for warning in report.command.warnings.iter().chain(&report.relay.warnings) {
        eprintln!("Warning: {}", warning);
    }
    if !report.relay.artifacts.is_empty() {
        println!(
            "Artifacts in {}: {}",
            artifact_dir.display(),
            report.relay.artifacts.join(", ")
        );
    }

    Ok(report.exit_code)
}

fn cmd_prepare(config: PathBuf, state_dir: PathBuf, format_str: String) -> Result<i32, BridgeError> {
    let format = OutputFormat::from_str_lenient(&format_str).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", format_str);
        OutputFormat::Console
    });

    let env = environment();
    let inputs = bridge_action::load_inputs(&config, &env)?;
    let ctx = bridge_action::resolve_context(&inputs, &env);

    std::fs::create_dir_all(&state_dir)?;
    let command = bridge_action::prepare(&inputs, &ctx, &state_dir)?;
    print!("{}", output::render(&command, format)?);

    Ok(0)
}

fn cmd_list_inputs(format_str: String, tool: Option<String>) -> Result<i32, BridgeError> {
    let format = OutputFormat::from_str_lenient(&format_str).unwrap_or(OutputFormat::Console);

    let scope = match tool {
        Some(name) => match Tool::from_str_lenient(&name) {
            Some(tool) => Some(tool),
            None => {
                eprintln!("Unknown tool '{}'. Use polaris, coverity, blackduck or srm.", name);
                return Ok(1);
            }
        },
        None => None,
    };

    let selected: Vec<_> = keys::ALL
        .iter()
        .filter(|input| scope.is_none() || input.scope == scope)
        .copied()
        .collect();
    println!("{}", output::render_inputs(&selected, format)?);

    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, BridgeError> {
    let path = PathBuf::from(DEFAULT_CONFIG_FILE);

    if path.exists() && !force {
        eprintln!("{} already exists. Use --force to overwrite.", DEFAULT_CONFIG_FILE);
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created {}", DEFAULT_CONFIG_FILE);

    Ok(0)
}
