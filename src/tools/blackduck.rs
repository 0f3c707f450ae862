use serde::Serialize;
use serde_json::Value;

use super::document::{
    pr_comment_requested, Automation, DetectPassthrough, GithubDocument, NetworkDocument,
    ProjectDocument, Reports, SarifInputs, SarifReport, StateFile,
};
use super::{CommandBuilder, Tool};
use crate::context::ExecutionContext;
use crate::error::{BridgeError, Result};
use crate::inputs::{keys, RawInputs};
use crate::validate;

pub const FAILURE_SEVERITIES: &[&str] = &[
    "ALL",
    "NONE",
    "BLOCKER",
    "CRITICAL",
    "MAJOR",
    "MINOR",
    "TRIVIAL",
    "UNSPECIFIED",
];
pub const VULNERABILITY_SEVERITIES: &[&str] = &["CRITICAL", "HIGH", "MEDIUM", "LOW"];
pub const UPGRADE_GUIDANCE: &[&str] = &["SHORT_TERM", "LONG_TERM"];

/// Black Duck SCA stage, scanning through Detect.
pub struct BlackDuckBuilder;

#[derive(Debug, Serialize)]
struct BlackDuckData {
    blackducksca: BlackDuckSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    detect: Option<DetectPassthrough>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<ProjectDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    github: Option<GithubDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    network: Option<NetworkDocument>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BlackDuckSettings {
    url: String,
    token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scan: Option<Scan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    automation: Option<Automation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fixpr: Option<FixPr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reports: Option<Reports>,
    #[serde(skip_serializing_if = "Option::is_none")]
    policy: Option<Policy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wait_for_scan: Option<bool>,
}

#[derive(Debug, Serialize)]
struct Scan {
    #[serde(skip_serializing_if = "Option::is_none")]
    full: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<Severities>,
}

#[derive(Debug, Serialize)]
struct Severities {
    severities: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FixPr {
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_count: Option<u32>,
    #[serde(rename = "createSinglePR", skip_serializing_if = "Option::is_none")]
    create_single_pr: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Severities>,
    #[serde(skip_serializing_if = "Option::is_none")]
    use_upgrade_guidance: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct Policy {
    badges: Badges,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Badges {
    create: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_count: Option<u32>,
}

impl CommandBuilder for BlackDuckBuilder {
    fn tool(&self) -> Tool {
        Tool::BlackDuck
    }

    fn validate(&self, inputs: &RawInputs) -> Vec<String> {
        validate::require_all(
            &[
                (keys::BLACKDUCKSCA_URL.key, inputs.get(&keys::BLACKDUCKSCA_URL)),
                (keys::BLACKDUCKSCA_TOKEN.key, inputs.get(&keys::BLACKDUCKSCA_TOKEN)),
            ],
            &self.tool().to_string(),
        )
    }

    fn build(&self, inputs: &RawInputs, ctx: &ExecutionContext) -> Result<Value> {
        let mut github = None;

        let scan = Scan {
            full: inputs.optional_flag(&keys::BLACKDUCKSCA_SCAN_FULL),
            failure: inputs
                .tokens(&keys::BLACKDUCKSCA_SCAN_FAILURE_SEVERITIES, FAILURE_SEVERITIES)?
                .map(|severities| Severities { severities }),
        };
        let scan = (scan.full.is_some() || scan.failure.is_some()).then_some(scan);

        let automation = if pr_comment_requested(inputs, &keys::BLACKDUCKSCA_PR_COMMENT_ENABLED, ctx) {
            attach_github(&mut github, ctx, "Black Duck PR comments")?;
            Some(Automation { pr_comment: true })
        } else {
            None
        };

        let fixpr = fix_pr(inputs, ctx, &mut github)?;
        let policy = badges(inputs, ctx, &mut github)?;

        let reports = SarifReport::from_inputs(
            inputs,
            &SarifInputs {
                create: &keys::BLACKDUCKSCA_REPORTS_SARIF_CREATE,
                file_path: &keys::BLACKDUCKSCA_REPORTS_SARIF_FILE_PATH,
                severities: &keys::BLACKDUCKSCA_REPORTS_SARIF_SEVERITIES,
                allowed_severities: VULNERABILITY_SEVERITIES,
                group_sca_issues: &keys::BLACKDUCKSCA_REPORTS_SARIF_GROUP_SCA_ISSUES,
            },
        )?
        .map(|sarif| Reports { sarif });

        let settings = BlackDuckSettings {
            url: inputs.text(&keys::BLACKDUCKSCA_URL).unwrap_or_default(),
            token: inputs.text(&keys::BLACKDUCKSCA_TOKEN).unwrap_or_default(),
            scan,
            automation,
            fixpr,
            reports,
            policy,
            wait_for_scan: inputs.optional_flag(&keys::BLACKDUCKSCA_WAIT_FOR_SCAN),
        };

        StateFile::into_value(BlackDuckData {
            blackducksca: settings,
            detect: Some(DetectPassthrough::from_inputs(inputs)?).filter(|d| !d.is_empty()),
            project: ProjectDocument::from_inputs(inputs, false),
            github,
            network: NetworkDocument::from_inputs(inputs),
        })
    }
}

fn attach_github(
    github: &mut Option<GithubDocument>,
    ctx: &ExecutionContext,
    feature: &str,
) -> Result<()> {
    if github.is_none() {
        *github = Some(GithubDocument::require(ctx, feature)?);
    }
    Ok(())
}

/// Fix-PR settings. The count limit and the single-PR switch are checked
/// even while fix PRs are off, so a bad combination never goes unnoticed.
fn fix_pr(
    inputs: &RawInputs,
    ctx: &ExecutionContext,
    github: &mut Option<GithubDocument>,
) -> Result<Option<FixPr>> {
    let max_count = inputs.number(&keys::BLACKDUCKSCA_FIXPR_MAX_COUNT)?;
    let create_single_pr = inputs.optional_flag(&keys::BLACKDUCKSCA_FIXPR_CREATE_SINGLE_PR);
    validate::fatal(
        validate::mutually_exclusive(
            (keys::BLACKDUCKSCA_FIXPR_MAX_COUNT.key, max_count.is_some()),
            (
                keys::BLACKDUCKSCA_FIXPR_CREATE_SINGLE_PR.key,
                create_single_pr == Some(true),
            ),
        ),
        BridgeError::ConflictingFields,
    )?;

    if !inputs.flag(&keys::BLACKDUCKSCA_FIXPR_ENABLED) {
        return Ok(None);
    }
    attach_github(github, ctx, "Black Duck fix pull requests")?;

    Ok(Some(FixPr {
        enabled: true,
        max_count,
        create_single_pr,
        filter: inputs
            .tokens(&keys::BLACKDUCKSCA_FIXPR_FILTER_SEVERITIES, VULNERABILITY_SEVERITIES)?
            .map(|severities| Severities { severities }),
        use_upgrade_guidance: inputs.tokens(&keys::BLACKDUCKSCA_FIXPR_UPGRADE_GUIDANCE, UPGRADE_GUIDANCE)?,
    }))
}

fn badges(
    inputs: &RawInputs,
    ctx: &ExecutionContext,
    github: &mut Option<GithubDocument>,
) -> Result<Option<Policy>> {
    let max_count = inputs.number(&keys::BLACKDUCKSCA_POLICY_BADGES_MAX_COUNT)?;
    if !inputs.flag(&keys::BLACKDUCKSCA_POLICY_BADGES_CREATE) {
        return Ok(None);
    }
    attach_github(github, ctx, "Black Duck policy badges")?;
    Ok(Some(Policy {
        badges: Badges {
            create: true,
            max_count,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{pr_context, push_context, read_state};
    use crate::tools::StageCommand;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const MINIMAL: &[(&str, &str)] = &[
        ("blackducksca_url", "https://blackduck.example.com"),
        ("blackducksca_token", "bd-token"),
    ];

    fn prepare(pairs: &[(&str, &str)], ctx: &ExecutionContext) -> (tempfile::TempDir, Result<StageCommand>) {
        let dir = tempfile::tempdir().unwrap();
        let inputs = RawInputs::from_pairs(pairs.iter().copied());
        let result = BlackDuckBuilder.prepare(&inputs, ctx, dir.path());
        (dir, result)
    }

    fn with(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        MINIMAL.iter().chain(extra.iter()).copied().collect()
    }

    fn state(dir: &tempfile::TempDir) -> Value {
        read_state(&dir.path().join("blackduck_input.json"))
    }

    #[test]
    fn minimal_document_round_trips() {
        let (dir, result) = prepare(MINIMAL, &push_context());
        let stage = result.unwrap();
        assert!(stage.to_string().starts_with("--stage blackduck --state "));
        assert_eq!(
            state(&dir),
            json!({
                "data": {
                    "blackducksca": {
                        "url": "https://blackduck.example.com",
                        "token": "bd-token"
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
    fn legacy_input_names_still_work() {
        let pairs = [
            ("blackduck_url", "https://legacy.example.com"),
            ("blackduck_api_token", "legacy-token"),
            ("blackduck_scan_full", "true"),
        ];
        let (dir, result) = prepare(&pairs, &push_context());
        result.unwrap();
        let doc = state(&dir);
        assert_eq!(doc["data"]["blackducksca"]["url"], "https://legacy.example.com");
        assert_eq!(doc["data"]["blackducksca"]["token"], "legacy-token");
        assert_eq!(doc["data"]["blackducksca"]["scan"], json!({"full": true}));
    }

    #[test]
    fn failure_severities_are_validated() {
        let pairs = with(&[("blackducksca_scan_failure_severities", "blocker, critical")]);
        let (dir, result) = prepare(&pairs, &push_context());
        result.unwrap();
        assert_eq!(
            state(&dir)["data"]["blackducksca"]["scan"],
            json!({"failure": {"severities": ["BLOCKER", "CRITICAL"]}})
        );

        let pairs = with(&[("blackducksca_scan_failure_severities", "BLOCKER,SEVERE")]);
        let (_dir, result) = prepare(&pairs, &push_context());
        assert!(result.unwrap_err().to_string().contains("SEVERE"));
    }

    #[test]
    fn fix_pr_count_conflicts_with_single_pr() {
        let pairs = with(&[
            ("blackducksca_fixpr_enabled", "true"),
            ("blackducksca_fixpr_maxCount", "3"),
            ("blackducksca_fixpr_createSinglePR", "true"),
        ]);
        let ctx = push_context().with_token(Some("ghp_token"));
        let (dir, result) = prepare(&pairs, &ctx);
        let err = result.unwrap_err();
        assert!(matches!(err, BridgeError::ConflictingFields(_)));
        let message = err.to_string();
        assert!(message.contains("fixpr_maxCount"));
        assert!(message.contains("fixpr_createSinglePR"));
        assert!(!dir.path().join("blackduck_input.json").exists());
    }

    #[test]
    fn fix_pr_max_count_must_be_numeric() {
        let pairs = with(&[("blackducksca_fixpr_maxCount", "lots")]);
        let (_dir, result) = prepare(&pairs, &push_context());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Invalid value for `blackducksca_fixpr_maxCount`"
        );
    }

    #[test]
    fn fix_pr_requires_token() {
        let pairs = with(&[("blackducksca_fixpr_enabled", "true")]);
        let (_dir, result) = prepare(&pairs, &push_context());
        let err = result.unwrap_err();
        assert!(matches!(err, BridgeError::MissingCredential { ref feature } if feature.contains("fix pull requests")));

        let ctx = push_context().with_token(Some("ghp_token"));
        let pairs = with(&[
            ("blackducksca_fixpr_enabled", "true"),
            ("blackducksca_fixpr_maxCount", "5"),
            ("blackducksca_fixpr_filter_severities", "critical,high"),
            ("blackducksca_fixpr_useUpgradeGuidance", "short_term"),
        ]);
        let (dir, result) = prepare(&pairs, &ctx);
        result.unwrap();
        let doc = state(&dir);
        assert_eq!(
            doc["data"]["blackducksca"]["fixpr"],
            json!({
                "enabled": true,
                "maxCount": 5,
                "filter": {"severities": ["CRITICAL", "HIGH"]},
                "useUpgradeGuidance": ["SHORT_TERM"]
            })
        );
        assert_eq!(doc["data"]["github"]["repository"]["branch"]["name"], "main");
    }

    #[test]
    fn badges_require_token() {
        let pairs = with(&[
            ("blackducksca_policy_badges_create", "true"),
            ("blackducksca_policy_badges_maxCount", "4"),
        ]);
        let (_dir, result) = prepare(&pairs, &push_context());
        assert!(matches!(result.unwrap_err(), BridgeError::MissingCredential { .. }));

        let ctx = push_context().with_token(Some("ghp_token"));
        let (dir, result) = prepare(&pairs, &ctx);
        result.unwrap();
        assert_eq!(
            state(&dir)["data"]["blackducksca"]["policy"],
            json!({"badges": {"create": true, "maxCount": 4}})
        );
    }

    #[test]
    fn pr_comment_present_only_on_pull_requests() {
        let pairs = with(&[("blackducksca_prComment_enabled", "true")]);

        let ctx = pr_context().with_token(Some("ghp_token"));
        let (dir, result) = prepare(&pairs, &ctx);
        result.unwrap();
        let doc = state(&dir);
        assert_eq!(doc["data"]["blackducksca"]["automation"], json!({"prComment": true}));
        assert!(doc["data"].get("github").is_some());

        let ctx = push_context().with_token(Some("ghp_token"));
        let (dir, result) = prepare(&pairs, &ctx);
        result.unwrap();
        let doc = state(&dir);
        assert!(doc["data"]["blackducksca"].get("automation").is_none());
        assert!(doc["data"].get("github").is_none());
    }

    #[test]
    fn pr_comment_without_token_fails_on_pull_requests() {
        let pairs = with(&[("blackducksca_prComment_enabled", "true")]);
        let (_dir, result) = prepare(&pairs, &pr_context());
        assert!(matches!(result.unwrap_err(), BridgeError::MissingCredential { .. }));
    }

    #[test]
    fn sarif_report_and_detect_settings() {
        let pairs = with(&[
            ("blackducksca_reports_sarif_create", "true"),
            ("blackducksca_reports_sarif_file_path", "out/bd.sarif.json"),
            ("blackducksca_reports_sarif_severities", "high"),
            ("detect_search_depth", "4"),
            ("detect_args", "--detect.tools=DETECTOR"),
        ]);
        let (dir, result) = prepare(&pairs, &pr_context());
        result.unwrap();
        let doc = state(&dir);
        assert_eq!(
            doc["data"]["blackducksca"]["reports"],
            json!({"sarif": {"create": true, "file": {"path": "out/bd.sarif.json"}, "severities": ["HIGH"]}})
        );
        assert_eq!(
            doc["data"]["detect"],
            json!({"search": {"depth": 4}, "args": "--detect.tools=DETECTOR"})
        );
    }
}
