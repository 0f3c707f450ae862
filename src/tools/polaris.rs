use serde::Serialize;
use serde_json::Value;

use super::document::{
    pr_comment_requested, CoverityPassthrough, DetectPassthrough, GithubDocument, IssueTypes,
    Named, NetworkDocument, ProjectDocument, Reports, SarifInputs, SarifReport, StateFile,
};
use super::{CommandBuilder, Tool};
use crate::context::ExecutionContext;
use crate::error::{BridgeError, Result};
use crate::inputs::{keys, RawInputs};
use crate::validate;

pub const ASSESSMENT_TYPES: &[&str] = &["SCA", "SAST", "DAST"];
pub const ASSESSMENT_MODES: &[&str] = &["CI", "SOURCE_UPLOAD"];
pub const SEVERITIES: &[&str] = &["CRITICAL", "HIGH", "MEDIUM", "LOW", "INFORMATIONAL"];
pub const SARIF_ISSUE_TYPES: &[&str] = &["SCA", "SAST"];

/// Polaris stage. Can orchestrate Coverity (SAST) and Detect (SCA)
/// sub-scans, whose pass-through settings ride along in the same file.
pub struct PolarisBuilder;

#[derive(Debug, Serialize)]
struct PolarisData {
    polaris: PolarisSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<ProjectDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    github: Option<GithubDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    network: Option<NetworkDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    coverity: Option<CoverityPassthrough>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detect: Option<DetectPassthrough>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PolarisSettings {
    server_url: String,
    #[serde(rename = "accesstoken")]
    access_token: String,
    application: Named,
    project: Named,
    assessment: Assessment,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<Branch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    test: Option<TestSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pr_comment: Option<PrComment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reports: Option<Reports>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wait_for_scan: Option<bool>,
}

#[derive(Debug, Serialize)]
struct Assessment {
    types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<String>,
}

#[derive(Debug, Serialize)]
struct Branch {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<Named>,
}

#[derive(Debug, Serialize)]
struct TestSettings {
    sca: ScaTest,
}

#[derive(Debug, Serialize)]
struct ScaTest {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize)]
struct PrComment {
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    severities: Option<Vec<String>>,
}

impl CommandBuilder for PolarisBuilder {
    fn tool(&self) -> Tool {
        Tool::Polaris
    }

    fn validate(&self, inputs: &RawInputs) -> Vec<String> {
        validate::require_all(
            &[
                (keys::POLARIS_SERVER_URL.key, inputs.get(&keys::POLARIS_SERVER_URL)),
                (keys::POLARIS_ACCESS_TOKEN.key, inputs.get(&keys::POLARIS_ACCESS_TOKEN)),
                (keys::POLARIS_ASSESSMENT_TYPES.key, inputs.get(&keys::POLARIS_ASSESSMENT_TYPES)),
            ],
            &self.tool().to_string(),
        )
    }

    fn build(&self, inputs: &RawInputs, ctx: &ExecutionContext) -> Result<Value> {
        let types = inputs
            .tokens(&keys::POLARIS_ASSESSMENT_TYPES, ASSESSMENT_TYPES)?
            .unwrap_or_default();
        let mode = match inputs.get(&keys::POLARIS_ASSESSMENT_MODE) {
            Some(mode) => {
                validate::fatal(
                    validate::enum_member(mode, ASSESSMENT_MODES, keys::POLARIS_ASSESSMENT_MODE.key),
                    BridgeError::InvalidValue,
                )?;
                Some(mode.to_uppercase())
            }
            None => None,
        };

        let application = inputs
            .text(&keys::POLARIS_APPLICATION_NAME)
            .unwrap_or_else(|| ctx.repository_name.clone());
        let project = inputs
            .text(&keys::POLARIS_PROJECT_NAME)
            .unwrap_or_else(|| ctx.repository_name.clone());
        validate::fatal(
            validate::require_all(
                &[
                    (keys::POLARIS_APPLICATION_NAME.key, Some(application.as_str())),
                    (keys::POLARIS_PROJECT_NAME.key, Some(project.as_str())),
                ],
                &self.tool().to_string(),
            ),
            BridgeError::MissingParameter,
        )?;

        let mut github = None;
        let pr_comment = if pr_comment_requested(inputs, &keys::POLARIS_PR_COMMENT_ENABLED, ctx) {
            github = Some(GithubDocument::require(ctx, "Polaris PR comments")?);
            Some(PrComment {
                enabled: true,
                severities: inputs.tokens(&keys::POLARIS_PR_COMMENT_SEVERITIES, SEVERITIES)?,
            })
        } else {
            None
        };

        let sarif = SarifReport::from_inputs(
            inputs,
            &SarifInputs {
                create: &keys::POLARIS_REPORTS_SARIF_CREATE,
                file_path: &keys::POLARIS_REPORTS_SARIF_FILE_PATH,
                severities: &keys::POLARIS_REPORTS_SARIF_SEVERITIES,
                allowed_severities: SEVERITIES,
                group_sca_issues: &keys::POLARIS_REPORTS_SARIF_GROUP_SCA_ISSUES,
            },
        )?;
        let reports = match sarif {
            Some(mut sarif) => {
                sarif.issue = inputs
                    .tokens(&keys::POLARIS_REPORTS_SARIF_ISSUE_TYPES, SARIF_ISSUE_TYPES)?
                    .map(|types| IssueTypes { types });
                Some(Reports { sarif })
            }
            None => None,
        };

        let coverity = if types.iter().any(|t| t == "SAST") {
            Some(CoverityPassthrough::from_inputs(inputs)).filter(|c| !c.is_empty())
        } else {
            None
        };
        let detect = if types.iter().any(|t| t == "SCA") {
            Some(DetectPassthrough::from_inputs(inputs)?).filter(|d| !d.is_empty())
        } else {
            None
        };

        let settings = PolarisSettings {
            server_url: inputs.text(&keys::POLARIS_SERVER_URL).unwrap_or_default(),
            access_token: inputs.text(&keys::POLARIS_ACCESS_TOKEN).unwrap_or_default(),
            application: Named::new(application),
            project: Named::new(project),
            assessment: Assessment { types, mode },
            branch: branch(inputs, ctx),
            test: inputs.text(&keys::POLARIS_TEST_SCA_TYPE).map(|kind| TestSettings {
                sca: ScaTest { kind },
            }),
            pr_comment,
            reports,
            wait_for_scan: inputs.optional_flag(&keys::POLARIS_WAIT_FOR_SCAN),
        };

        StateFile::into_value(PolarisData {
            polaris: settings,
            project: ProjectDocument::from_inputs(inputs, true),
            github,
            network: NetworkDocument::from_inputs(inputs),
            coverity,
            detect,
        })
    }
}

/// Branch defaults to the scanned branch; the parent to the PR target.
fn branch(inputs: &RawInputs, ctx: &ExecutionContext) -> Option<Branch> {
    let name = inputs
        .text(&keys::POLARIS_BRANCH_NAME)
        .or_else(|| Some(ctx.current_branch().to_string()).filter(|b| !b.is_empty()))?;
    let parent = inputs
        .text(&keys::POLARIS_BRANCH_PARENT_NAME)
        .or_else(|| {
            Some(ctx.base_branch_name.clone()).filter(|b| ctx.is_pull_request && !b.is_empty())
        })
        .map(Named::new);
    Some(Branch { name, parent })
}
