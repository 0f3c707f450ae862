use serde::Serialize;
use serde_json::Value;

use super::document::{
    pr_comment_requested, Automation, CoverityPassthrough, DirectoryRef, GithubDocument, Named,
    NetworkDocument, ProjectDocument, StateFile,
};
use super::{CommandBuilder, Tool};
use crate::context::ExecutionContext;
use crate::error::{BridgeError, Result};
use crate::inputs::{keys, RawInputs};
use crate::validate;

/// Coverity Connect stage (`--stage connect`).
pub struct CoverityBuilder;

#[derive(Debug, Serialize)]
struct CoverityData {
    coverity: CoveritySettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<ProjectDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    github: Option<GithubDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    network: Option<NetworkDocument>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CoveritySettings {
    connect: Connect,
    #[serde(skip_serializing_if = "Option::is_none")]
    install: Option<DirectoryRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    local: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    automation: Option<Automation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wait_for_scan: Option<bool>,
    #[serde(flatten)]
    passthrough: CoverityPassthrough,
}

#[derive(Debug, Serialize)]
struct Connect {
    user: ConnectUser,
    url: String,
    project: Named,
    stream: Named,
    #[serde(skip_serializing_if = "Option::is_none")]
    policy: Option<PolicyView>,
}

#[derive(Debug, Serialize)]
struct ConnectUser {
    name: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct PolicyView {
    view: String,
}

impl CommandBuilder for CoverityBuilder {
    fn tool(&self) -> Tool {
        Tool::Coverity
    }

    fn validate(&self, inputs: &RawInputs) -> Vec<String> {
        validate::require_all(
            &[
                (keys::COVERITY_URL.key, inputs.get(&keys::COVERITY_URL)),
                (keys::COVERITY_USER.key, inputs.get(&keys::COVERITY_USER)),
                (keys::COVERITY_PASSPHRASE.key, inputs.get(&keys::COVERITY_PASSPHRASE)),
            ],
            &self.tool().to_string(),
        )
    }

    fn build(&self, inputs: &RawInputs, ctx: &ExecutionContext) -> Result<Value> {
        let install_dir = inputs.get(&keys::COVERITY_INSTALL_DIRECTORY);
        validate::fatal(
            validate::path_exists(install_dir, "Install Directory"),
            BridgeError::InvalidValue,
        )?;

        let project = inputs
            .text(&keys::COVERITY_PROJECT_NAME)
            .unwrap_or_else(|| ctx.repository_name.clone());
        let stream = inputs
            .text(&keys::COVERITY_STREAM_NAME)
            .unwrap_or_else(|| default_stream_name(ctx));
        validate::fatal(
            validate::require_all(
                &[
                    (keys::COVERITY_PROJECT_NAME.key, Some(project.as_str())),
                    (keys::COVERITY_STREAM_NAME.key, Some(stream.as_str())),
                ],
                &self.tool().to_string(),
            ),
            BridgeError::MissingParameter,
        )?;

        let mut github = None;
        let automation = if pr_comment_requested(inputs, &keys::COVERITY_PR_COMMENT_ENABLED, ctx) {
            github = Some(GithubDocument::require(ctx, "Coverity PR comments")?);
            Some(Automation { pr_comment: true })
        } else {
            None
        };

        let settings = CoveritySettings {
            connect: Connect {
                user: ConnectUser {
                    name: inputs.text(&keys::COVERITY_USER).unwrap_or_default(),
                    password: inputs.text(&keys::COVERITY_PASSPHRASE).unwrap_or_default(),
                },
                url: inputs.text(&keys::COVERITY_URL).unwrap_or_default(),
                project: Named::new(project),
                stream: Named::new(stream),
                policy: inputs
                    .text(&keys::COVERITY_POLICY_VIEW)
                    .map(|view| PolicyView { view }),
            },
            install: install_dir.map(|d| DirectoryRef {
                directory: d.to_string(),
            }),
            local: inputs.optional_flag(&keys::COVERITY_LOCAL),
            version: inputs.text(&keys::COVERITY_VERSION),
            automation,
            wait_for_scan: inputs.optional_flag(&keys::COVERITY_WAIT_FOR_SCAN),
            passthrough: CoverityPassthrough::from_inputs(inputs),
        };

        StateFile::into_value(CoverityData {
            coverity: settings,
            project: ProjectDocument::from_inputs(inputs, false),
            github,
            network: NetworkDocument::from_inputs(inputs),
        })
    }
}

/// `<repo>-<branch>`: the PR head branch on pull requests, the ref otherwise.
/// Empty when either part is unknown.
pub fn default_stream_name(ctx: &ExecutionContext) -> String {
    let branch = ctx.current_branch();
    if ctx.repository_name.is_empty() || branch.is_empty() {
        return String::new();
    }
    format!("{}-{}", ctx.repository_name, branch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{context, pr_context, push_context, read_state};
    use crate::tools::StageCommand;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const MINIMAL: &[(&str, &str)] = &[
        ("coverity_url", "https://coverity.example.com"),
        ("coverity_user", "scanner"),
        ("coverity_passphrase", "s3cret"),
    ];

    fn prepare(pairs: &[(&str, &str)], ctx: &ExecutionContext) -> (tempfile::TempDir, Result<StageCommand>) {
        let dir = tempfile::tempdir().unwrap();
        let inputs = RawInputs::from_pairs(pairs.iter().copied());
        let result = CoverityBuilder.prepare(&inputs, ctx, dir.path());
        (dir, result)
    }

    fn with(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        MINIMAL.iter().chain(extra.iter()).copied().collect()
    }

    #[test]
    fn minimal_document_round_trips() {
        let (dir, result) = prepare(MINIMAL, &push_context());
        let stage = result.unwrap();
        let state_path = dir.path().join("coverity_input.json");
        assert_eq!(
            stage.to_string(),
            format!("--stage connect --state {} --verbose", state_path.display())
        );
        assert_eq!(
            read_state(&state_path),
            json!({
                "data": {
                    "coverity": {
                        "connect": {
                            "user": {"name": "scanner", "password": "s3cret"},
                            "url": "https://coverity.example.com",
                            "project": {"name": "demo"},
                            "stream": {"name": "demo-main"}
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn each_missing_mandatory_field_is_named() {
        for (missing, _) in MINIMAL {
            let pairs: Vec<_> = MINIMAL.iter().filter(|(k, _)| k != missing).copied().collect();
            let (_dir, result) = prepare(&pairs, &push_context());
            let err = result.unwrap_err();
            assert!(matches!(err, BridgeError::MissingParameter(_)));
            assert!(err.to_string().contains(missing), "{err} should name {missing}");
        }
    }

    #[test]
    fn stream_name_follows_pull_request_branch() {
        assert_eq!(default_stream_name(&pr_context()), "demo-feature1");
        assert_eq!(default_stream_name(&push_context()), "demo-main");
    }

    #[test]
    fn stream_default_needs_repository_and_branch() {
        let ctx = context(&[("GITHUB_EVENT_NAME", "push")]);
        let (_dir, result) = prepare(MINIMAL, &ctx);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("coverity_project_name,coverity_stream_name"));
    }

    #[test]
    fn explicit_stream_and_project_win() {
        let pairs = with(&[
            ("coverity_repository_name", "legacy-project"),
            ("coverity_stream_name", "nightly"),
            ("coverity_policy_view", "Outstanding Issues"),
        ]);
        let (dir, result) = prepare(&pairs, &pr_context());
        result.unwrap();
        let doc = read_state(&dir.path().join("coverity_input.json"));
        assert_eq!(doc["data"]["coverity"]["connect"]["project"]["name"], "legacy-project");
        assert_eq!(doc["data"]["coverity"]["connect"]["stream"]["name"], "nightly");
        assert_eq!(doc["data"]["coverity"]["connect"]["policy"]["view"], "Outstanding Issues");
    }

    #[test]
    fn install_directory_must_exist() {
        let pairs = with(&[("coverity_install_directory", "/no/such/coverity")]);
        let (dir, result) = prepare(&pairs, &push_context());
        let err = result.unwrap_err();
        assert!(matches!(err, BridgeError::InvalidValue(_)));
        assert!(err.to_string().starts_with("Invalid Install Directory"));
        assert!(!dir.path().join("coverity_input.json").exists());
    }

    #[test]
    fn existing_install_directory_and_local_settings_pass_through() {
        let install = tempfile::tempdir().unwrap();
        let install_path = install.path().to_string_lossy().into_owned();
        let dir = tempfile::tempdir().unwrap();
        let mut inputs = RawInputs::from_pairs(MINIMAL.iter().copied());
        inputs.insert("coverity_install_directory", install_path.clone());
        inputs.insert("coverity_local", "true");
        inputs.insert("coverity_version", "2024.6.0");
        inputs.insert("coverity_build_command", "mvn -B package");
        inputs.insert("coverity_clean_command", "mvn clean");

        CoverityBuilder.prepare(&inputs, &push_context(), dir.path()).unwrap();
        let doc = read_state(&dir.path().join("coverity_input.json"));
        let coverity = &doc["data"]["coverity"];
        assert_eq!(coverity["install"]["directory"], install_path);
        assert_eq!(coverity["local"], true);
        assert_eq!(coverity["version"], "2024.6.0");
        assert_eq!(coverity["build"]["command"], "mvn -B package");
        assert_eq!(coverity["clean"]["command"], "mvn clean");
    }

    #[test]
    fn pr_comment_uses_deprecated_alias_and_attaches_github() {
        let pairs = with(&[("coverity_automation_prcomment", "true")]);
        let ctx = pr_context().with_token(Some("ghp_token"));
        let (dir, result) = prepare(&pairs, &ctx);
        result.unwrap();
        let doc = read_state(&dir.path().join("coverity_input.json"));
        assert_eq!(doc["data"]["coverity"]["automation"], json!({"prComment": true}));
        assert_eq!(doc["data"]["github"]["user"]["token"], "ghp_token");
    }

    #[test]
    fn pr_comment_is_ignored_on_push() {
        let pairs = with(&[("coverity_prComment_enabled", "true")]);
        let (dir, result) = prepare(&pairs, &push_context());
        result.unwrap();
        let doc = read_state(&dir.path().join("coverity_input.json"));
        assert!(doc["data"]["coverity"].get("automation").is_none());
        assert!(doc["data"].get("github").is_none());
    }

    #[test]
    fn pr_comment_without_token_fails() {
        let pairs = with(&[("coverity_prComment_enabled", "true")]);
        let (_dir, result) = prepare(&pairs, &pr_context());
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Missing required github token for Coverity PR comments");
    }
}
