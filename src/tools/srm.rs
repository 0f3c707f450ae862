use serde::Serialize;
use serde_json::Value;

use super::document::{ExecutionPath, NetworkDocument, ProjectDocument, StateFile};
use super::{CommandBuilder, Tool};
use crate::context::ExecutionContext;
use crate::error::{BridgeError, Result};
use crate::inputs::{keys, RawInputs};
use crate::validate;

pub const ASSESSMENT_TYPES: &[&str] = &["SCA", "SAST"];

/// Software Risk Manager stage.
pub struct SrmBuilder;

#[derive(Debug, Serialize)]
struct SrmData {
    srm: SrmSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    coverity: Option<ExecutionPath>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detect: Option<ExecutionPath>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<ProjectDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    network: Option<NetworkDocument>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SrmSettings {
    url: String,
    apikey: String,
    project: SrmProject,
    assessment: Assessment,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<Branch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wait_for_scan: Option<bool>,
}

#[derive(Debug, Serialize)]
struct SrmProject {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct Assessment {
    types: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Branch {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<String>,
}

impl CommandBuilder for SrmBuilder {
    fn tool(&self) -> Tool {
        Tool::Srm
    }

    fn validate(&self, inputs: &RawInputs) -> Vec<String> {
        validate::require_all(
            &[
                (keys::SRM_URL.key, inputs.get(&keys::SRM_URL)),
                (keys::SRM_APIKEY.key, inputs.get(&keys::SRM_APIKEY)),
                (keys::SRM_ASSESSMENT_TYPES.key, inputs.get(&keys::SRM_ASSESSMENT_TYPES)),
            ],
            &self.tool().to_string(),
        )
    }

    fn build(&self, inputs: &RawInputs, ctx: &ExecutionContext) -> Result<Value> {
        let types = inputs
            .tokens(&keys::SRM_ASSESSMENT_TYPES, ASSESSMENT_TYPES)?
            .unwrap_or_default();

        // A project is identified by id or name; the repository name stands
        // in only when neither is given.
        let id = inputs.text(&keys::SRM_PROJECT_ID);
        let name = inputs.text(&keys::SRM_PROJECT_NAME).or_else(|| {
            Some(ctx.repository_name.clone()).filter(|n| id.is_none() && !n.is_empty())
        });
        let id_group: &[validate::Field<'_>] = &[(keys::SRM_PROJECT_ID.key, id.as_deref())];
        let name_group: &[validate::Field<'_>] = &[(keys::SRM_PROJECT_NAME.key, name.as_deref())];
        validate::fatal(
            validate::require_one_of(&[id_group, name_group], &self.tool().to_string()),
            BridgeError::MissingParameter,
        )?;

        let branch = inputs
            .text(&keys::SRM_BRANCH_NAME)
            .or_else(|| Some(ctx.current_branch().to_string()).filter(|b| !b.is_empty()))
            .map(|name| Branch {
                name,
                parent: inputs.text(&keys::SRM_BRANCH_PARENT),
            });

        let settings = SrmSettings {
            url: inputs.text(&keys::SRM_URL).unwrap_or_default(),
            apikey: inputs.text(&keys::SRM_APIKEY).unwrap_or_default(),
            project: SrmProject { id, name },
            assessment: Assessment { types },
            branch,
            wait_for_scan: inputs.optional_flag(&keys::SRM_WAIT_FOR_SCAN),
        };

        StateFile::into_value(SrmData {
            srm: settings,
            coverity: ExecutionPath::from_input(inputs, &keys::COVERITY_EXECUTION_PATH),
            detect: ExecutionPath::from_input(inputs, &keys::DETECT_EXECUTION_PATH),
            project: ProjectDocument::from_inputs(inputs, false),
            network: NetworkDocument::from_inputs(inputs),
        })
    }
}
