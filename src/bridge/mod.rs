//! Locating and running the Bridge CLI.

use std::path::{Path, PathBuf};
use std::process::Command;

use url::Url;

use crate::error::{BridgeError, Result};
use crate::inputs::{keys, RawInputs};
use crate::validate;

pub const DOWNLOAD_BASE_URL: &str =
    "https://repo.blackduck.com/bds-integrations-release/com/blackduck/integration/bridge/binaries/bridge-cli-bundle";
pub const DEFAULT_INSTALL_DIR_NAME: &str = "bridge-cli-bundle";
pub const VERSIONS_FILE: &str = "versions.txt";

/// Exit codes the Bridge CLI documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeExitCode {
    Success,
    UndefinedError,
    AdapterError,
    ShutdownFailure,
    BuildBreak,
    InitializationFailure,
}

impl BridgeExitCode {
    pub fn code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::UndefinedError => 1,
            Self::AdapterError => 2,
            Self::ShutdownFailure => 3,
            Self::BuildBreak => 8,
            Self::InitializationFailure => 9,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::UndefinedError),
            2 => Some(Self::AdapterError),
            3 => Some(Self::ShutdownFailure),
            8 => Some(Self::BuildBreak),
            9 => Some(Self::InitializationFailure),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Success => "Bridge execution successfully completed",
            Self::UndefinedError => "Undefined error, check error logs",
            Self::AdapterError => "Error from adapter end",
            Self::ShutdownFailure => "Failed to shutdown the bridge",
            Self::BuildBreak => "The config option bridge.break has been set to true",
            Self::InitializationFailure => "Bridge initialization failed",
        }
    }
}

/// Map a process exit code to `Ok` or [`BridgeError::BridgeExecution`].
pub fn check_exit(code: i32) -> Result<()> {
    match BridgeExitCode::from_code(code) {
        Some(BridgeExitCode::Success) => Ok(()),
        Some(known) => Err(BridgeError::BridgeExecution {
            code,
            description: known.description().to_string(),
        }),
        None => Err(BridgeError::BridgeExecution {
            code,
            description: "unknown exit code".to_string(),
        }),
    }
}

/// Bundle flavours published for download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux64,
    LinuxArm,
    MacIntel,
    MacArm,
    Win64,
}

impl Platform {
    pub fn current() -> Self {
        match (std::env::consts::OS, std::env::consts::ARCH) {
            ("macos", "aarch64") => Self::MacArm,
            ("macos", _) => Self::MacIntel,
            ("windows", _) => Self::Win64,
            ("linux", "aarch64") | ("linux", "arm") => Self::LinuxArm,
            _ => Self::Linux64,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux64 => "linux64",
            Self::LinuxArm => "linux_arm",
            Self::MacIntel => "macosx",
            Self::MacArm => "macos_arm",
            Self::Win64 => "win64",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeVersion {
    Latest,
    Exact(semver::Version),
}

impl std::fmt::Display for BridgeVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::Exact(v) => write!(f, "{v}"),
        }
    }
}

/// Where the bridge comes from, as configured by the bridge inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeSource {
    pub install_dir: Option<PathBuf>,
    pub download_url: Option<Url>,
    pub version: Option<BridgeVersion>,
}

impl BridgeSource {
    pub fn from_inputs(inputs: &RawInputs) -> Result<Self> {
        let install_dir = inputs.get(&keys::BRIDGE_INSTALL_DIRECTORY);
        validate::fatal(
            validate::path_exists(install_dir, "Bridge CLI Install Directory"),
            BridgeError::InvalidValue,
        )?;

        let download_url = inputs
            .get(&keys::BRIDGE_DOWNLOAD_URL)
            .map(|raw| Url::parse(raw).map_err(|e| BridgeError::InvalidUrl(format!("{raw}: {e}"))))
            .transpose()?;

        let version = match inputs.get(&keys::BRIDGE_DOWNLOAD_VERSION) {
            None => None,
            Some(v) if v.eq_ignore_ascii_case("latest") => Some(BridgeVersion::Latest),
            Some(v) => Some(BridgeVersion::Exact(semver::Version::parse(v).map_err(|_| {
                BridgeError::InvalidValue(format!(
                    "Invalid value for `{}`: {v} is not a version",
                    keys::BRIDGE_DOWNLOAD_VERSION.key
                ))
            })?)),
        };

        Ok(Self {
            install_dir: install_dir.map(PathBuf::from),
            download_url,
            version,
        })
    }

    /// Bundle URL: the explicit one when configured, otherwise derived from
    /// the version (`latest` when none is given).
    pub fn download_url(&self, platform: Platform) -> String {
        if let Some(url) = &self.download_url {
            return url.to_string();
        }
        let platform = platform.as_str();
        match self.version.as_ref().unwrap_or(&BridgeVersion::Latest) {
            BridgeVersion::Latest => {
                format!("{DOWNLOAD_BASE_URL}/latest/bridge-cli-bundle-{platform}.zip")
            }
            BridgeVersion::Exact(v) => {
                format!("{DOWNLOAD_BASE_URL}/{v}/bridge-cli-bundle-{v}-{platform}.zip")
            }
        }
    }
}

/// Finds an executable bridge for a source.
pub trait BridgeResolver {
    fn resolve(&self, source: &BridgeSource) -> Result<PathBuf>;
}

/// Runs the bridge and reports its exit code.
pub trait Executor {
    fn execute(&self, program: &Path, args: &[String], cwd: &Path) -> Result<i32>;
}

/// A bridge bundle already unpacked on disk.
#[derive(Debug, Clone)]
pub struct LocalInstall {
    pub default_dir: PathBuf,
}

impl LocalInstall {
    pub fn new(default_dir: impl Into<PathBuf>) -> Self {
        Self {
            default_dir: default_dir.into(),
        }
    }

    /// `$HOME/bridge-cli-bundle`, or relative to the current directory
    /// when no home is known.
    pub fn from_home(home: Option<&str>) -> Self {
        let base = home.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join(DEFAULT_INSTALL_DIR_NAME))
    }
}

pub fn executable_name() -> &'static str {
    if cfg!(windows) {
        "bridge-cli.exe"
    } else {
        "bridge-cli"
    }
}

impl BridgeResolver for LocalInstall {
    fn resolve(&self, source: &BridgeSource) -> Result<PathBuf> {
        let dir = source
            .install_dir
            .as_deref()
            .unwrap_or(self.default_dir.as_path());
        let executable = dir.join(executable_name());
        if !executable.is_file() {
            return Err(BridgeError::BridgeNotFound(format!(
                "{} does not exist, download the bundle from {}",
                executable.display(),
                source.download_url(Platform::current())
            )));
        }

        if let Some(BridgeVersion::Exact(wanted)) = &source.version {
            let versions = std::fs::read_to_string(dir.join(VERSIONS_FILE)).unwrap_or_default();
            if !versions.lines().filter_map(bundle_version).any(|v| &v == wanted) {
                return Err(BridgeError::BridgeNotFound(format!(
                    "version {wanted} is not installed in {}, download it from {}",
                    dir.display(),
                    source.download_url(Platform::current())
                )));
            }
        }

        tracing::debug!(path = %executable.display(), "using bridge");
        Ok(executable)
    }
}

/// Version on a `versions.txt` line such as `bridge-cli-bundle: 2.9.2`.
fn bundle_version(line: &str) -> Option<semver::Version> {
    let token = line.rsplit(':').next()?.trim();
    semver::Version::parse(token).ok()
}

/// Spawns the bridge with inherited stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl Executor for ProcessExecutor {
    fn execute(&self, program: &Path, args: &[String], cwd: &Path) -> Result<i32> {
        tracing::info!(program = %program.display(), args = %args.join(" "), "running bridge");
        let status = Command::new(program).args(args).current_dir(cwd).status()?;
        // No code means the process was killed by a signal.
        Ok(status
            .code()
            .unwrap_or_else(|| BridgeExitCode::UndefinedError.code()))
    }
}
