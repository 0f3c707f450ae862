//! Sub-documents shared between the tool state files.
//!
//! Optional sections are `Option`s skipped on serialization: the bridge
//! reads a missing key as "feature off", so they are never written as
//! `null` or `{}`.

use serde::Serialize;

use crate::context::ExecutionContext;
use crate::error::{BridgeError, Result};
use crate::inputs::{keys, Input, RawInputs};
use crate::validate;

/// Top-level `{"data": ...}` wrapper of every state file.
#[derive(Debug, Serialize)]
pub struct StateFile<T> {
    pub data: T,
}

impl<T: Serialize> StateFile<T> {
    pub fn into_value(data: T) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(StateFile { data })?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Named {
    pub name: String,
}

impl Named {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathRef {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryRef {
    pub directory: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandRef {
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepthRef {
    pub depth: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Automation {
    pub pr_comment: bool,
}

// GitHub

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GithubDocument {
    pub user: GithubUser,
    pub repository: GithubRepository,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<GithubHost>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GithubUser {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GithubRepository {
    pub name: String,
    pub owner: Named,
    pub branch: Named,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull: Option<GithubPull>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GithubPull {
    pub number: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GithubHost {
    pub url: String,
}

impl GithubDocument {
    /// Hosting-platform details for a feature that acts on the repository.
    ///
    /// Fails with [`BridgeError::MissingCredential`] naming `feature` when no
    /// token is available. The explicit host is only set on enterprise
    /// servers; on the public cloud the bridge uses its own default.
    pub fn require(ctx: &ExecutionContext, feature: &str) -> Result<Self> {
        if !ctx.has_token() {
            return Err(BridgeError::MissingCredential {
                feature: feature.to_string(),
            });
        }
        let host = (!ctx.is_cloud_host && !ctx.api_base_url().is_empty()).then(|| GithubHost {
            url: ctx.api_base_url().to_string(),
        });
        Ok(Self {
            user: GithubUser {
                token: ctx.github_token.clone(),
            },
            repository: GithubRepository {
                name: ctx.repository_name.clone(),
                owner: Named::new(&ctx.repository_owner),
                branch: Named::new(ctx.current_branch()),
                pull: ctx
                    .pull_number
                    .filter(|_| ctx.is_pull_request)
                    .map(|number| GithubPull { number }),
            },
            host,
        })
    }
}

/// Whether a PR-comment section should attach for this run.
///
/// Outside pull-request runs an enabled flag is ignored, not an error.
pub fn pr_comment_requested(inputs: &RawInputs, flag: &Input, ctx: &ExecutionContext) -> bool {
    if !inputs.flag(flag) {
        return false;
    }
    if !ctx.is_pull_request {
        tracing::info!(input = flag.key, "not a pull request run, PR comments skipped");
        return false;
    }
    true
}

// Project

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ProjectSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_sym_links: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excludes: Option<Vec<String>>,
}

impl ProjectDocument {
    /// `project` section; source-upload fields only when `with_source`.
    pub fn from_inputs(inputs: &RawInputs, with_source: bool) -> Option<Self> {
        let source = if with_source {
            let source = ProjectSource {
                archive: inputs.text(&keys::PROJECT_SOURCE_ARCHIVE),
                preserve_sym_links: inputs.optional_flag(&keys::PROJECT_SOURCE_PRESERVE_SYMLINKS),
                excludes: inputs.list(&keys::PROJECT_SOURCE_EXCLUDES),
            };
            (source != ProjectSource::default()).then_some(source)
        } else {
            None
        };
        let project = Self {
            directory: inputs.text(&keys::PROJECT_DIRECTORY),
            source,
        };
        (project != Self::default()).then_some(project)
    }
}

// Network

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkDocument {
    pub ssl: SslSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SslSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert: Option<CertFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_all: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertFile {
    pub file: String,
}

impl NetworkDocument {
    pub fn from_inputs(inputs: &RawInputs) -> Option<Self> {
        let ssl = SslSettings {
            cert: inputs
                .text(&keys::NETWORK_SSL_CERT_FILE)
                .map(|file| CertFile { file }),
            trust_all: inputs.optional_flag(&keys::NETWORK_SSL_TRUST_ALL),
        };
        (ssl != SslSettings::default()).then_some(Self { ssl })
    }
}

// Reports

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reports {
    pub sarif: SarifReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifReport {
    pub create: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severities: Option<Vec<String>>,
    #[serde(rename = "groupSCAIssues", skip_serializing_if = "Option::is_none")]
    pub group_sca_issues: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<IssueTypes>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueTypes {
    pub types: Vec<String>,
}

/// Inputs describing one tool's SARIF report.
pub struct SarifInputs<'a> {
    pub create: &'a Input,
    pub file_path: &'a Input,
    pub severities: &'a Input,
    pub allowed_severities: &'a [&'a str],
    pub group_sca_issues: &'a Input,
}

impl SarifReport {
    /// `reports.sarif` section, attached whenever `create` is true.
    pub fn from_inputs(inputs: &RawInputs, source: &SarifInputs<'_>) -> Result<Option<Self>> {
        if !inputs.flag(source.create) {
            return Ok(None);
        }
        Ok(Some(Self {
            create: true,
            file: inputs.text(source.file_path).map(|path| PathRef { path }),
            severities: inputs.tokens(source.severities, source.allowed_severities)?,
            group_sca_issues: inputs.optional_flag(source.group_sca_issues),
            issue: None,
        }))
    }
}

// Pass-through settings for Coverity and Detect sub-scans

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverityPassthrough {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<CommandRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean: Option<CommandRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<PathRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
}

impl CoverityPassthrough {
    pub fn from_inputs(inputs: &RawInputs) -> Self {
        Self {
            build: inputs
                .text(&keys::COVERITY_BUILD_COMMAND)
                .map(|command| CommandRef { command }),
            clean: inputs
                .text(&keys::COVERITY_CLEAN_COMMAND)
                .map(|command| CommandRef { command }),
            config: inputs
                .text(&keys::COVERITY_CONFIG_PATH)
                .map(|path| PathRef { path }),
            args: inputs.text(&keys::COVERITY_ARGS),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetectPassthrough {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install: Option<DirectoryRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<DepthRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<PathRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<PathRef>,
}

impl DetectPassthrough {
    /// Detect settings; the install directory must exist and the search
    /// depth must be numeric.
    pub fn from_inputs(inputs: &RawInputs) -> Result<Self> {
        let install_dir = inputs.get(&keys::DETECT_INSTALL_DIRECTORY);
        validate::fatal(
            validate::path_exists(install_dir, "Detect Install Directory"),
            BridgeError::InvalidValue,
        )?;
        Ok(Self {
            install: install_dir.map(|d| DirectoryRef {
                directory: d.to_string(),
            }),
            search: inputs
                .number(&keys::DETECT_SEARCH_DEPTH)?
                .map(|depth| DepthRef { depth }),
            config: inputs
                .text(&keys::DETECT_CONFIG_PATH)
                .map(|path| PathRef { path }),
            args: inputs.text(&keys::DETECT_ARGS),
            execution: None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// `{ "execution": { "path": ... } }` used by SRM for its sub-scans.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionPath {
    pub execution: PathRef,
}

impl ExecutionPath {
    pub fn from_input(inputs: &RawInputs, input: &Input) -> Option<Self> {
        inputs.text(input).map(|path| Self {
            execution: PathRef { path },
        })
    }
}
