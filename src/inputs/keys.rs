//! Catalog of every recognised action input.
//!
//! Canonical keys come first; deprecated names are tried in order when the
//! canonical key is missing.

use super::Input;
use crate::tools::Tool;

const fn common(key: &'static str, description: &'static str) -> Input {
    Input {
        key,
        deprecated: &[],
        scope: None,
        description,
    }
}

const fn scoped(tool: Tool, key: &'static str, description: &'static str) -> Input {
    Input {
        key,
        deprecated: &[],
        scope: Some(tool),
        description,
    }
}

const fn aliased(
    scope: Option<Tool>,
    key: &'static str,
    deprecated: &'static [&'static str],
    description: &'static str,
) -> Input {
    Input {
        key,
        deprecated,
        scope,
        description,
    }
}

// Common

pub const GITHUB_TOKEN: Input = common("github_token", "Token used for PR comments, fix PRs, badges and SARIF upload");
pub const INCLUDE_DIAGNOSTICS: Input = common("include_diagnostics", "Collect bridge diagnostics and upload them as an artifact");
pub const DIAGNOSTICS_RETENTION_DAYS: Input = common("diagnostics_retention_days", "Retention in days for uploaded diagnostics artifacts");
pub const PROJECT_DIRECTORY: Input = common("project_directory", "Directory the scan runs in (defaults to the workspace)");
pub const NETWORK_SSL_CERT_FILE: Input = common("network_ssl_cert_file", "Custom CA certificate file for bridge network calls");
pub const NETWORK_SSL_TRUST_ALL: Input = common("network_ssl_trustAll", "Skip TLS certificate verification");
pub const BRIDGE_INSTALL_DIRECTORY: Input = aliased(
    None,
    "bridgecli_install_directory",
    &["synopsys_bridge_install_directory"],
    "Directory containing the Bridge CLI bundle",
);
pub const BRIDGE_DOWNLOAD_URL: Input = aliased(
    None,
    "bridgecli_download_url",
    &["synopsys_bridge_download_url"],
    "Explicit Bridge CLI bundle download URL",
);
pub const BRIDGE_DOWNLOAD_VERSION: Input = aliased(
    None,
    "bridgecli_download_version",
    &["synopsys_bridge_download_version"],
    "Bridge CLI version to use (semver or `latest`)",
);

// Project source (Polaris source upload)

pub const PROJECT_SOURCE_ARCHIVE: Input = scoped(Tool::Polaris, "project_source_archive", "Archive uploaded instead of the working tree");
pub const PROJECT_SOURCE_PRESERVE_SYMLINKS: Input = scoped(Tool::Polaris, "project_source_preserveSymLinks", "Preserve symbolic links in the source upload");
pub const PROJECT_SOURCE_EXCLUDES: Input = scoped(Tool::Polaris, "project_source_excludes", "Comma-separated globs excluded from the source upload");

// Polaris

pub const POLARIS_SERVER_URL: Input = scoped(Tool::Polaris, "polaris_server_url", "Polaris server URL");
pub const POLARIS_ACCESS_TOKEN: Input = aliased(
    Some(Tool::Polaris),
    "polaris_access_token",
    &["polaris_accessToken"],
    "Polaris access token",
);
pub const POLARIS_APPLICATION_NAME: Input = scoped(Tool::Polaris, "polaris_application_name", "Polaris application name (defaults to the repository name)");
pub const POLARIS_PROJECT_NAME: Input = scoped(Tool::Polaris, "polaris_project_name", "Polaris project name (defaults to the repository name)");
pub const POLARIS_ASSESSMENT_TYPES: Input = scoped(Tool::Polaris, "polaris_assessment_types", "Comma-separated assessment types (SCA, SAST, DAST)");
pub const POLARIS_ASSESSMENT_MODE: Input = scoped(Tool::Polaris, "polaris_assessment_mode", "Assessment mode (CI, SOURCE_UPLOAD)");
pub const POLARIS_BRANCH_NAME: Input = scoped(Tool::Polaris, "polaris_branch_name", "Branch name reported to Polaris");
pub const POLARIS_BRANCH_PARENT_NAME: Input = scoped(Tool::Polaris, "polaris_branch_parent_name", "Parent branch name reported to Polaris");
pub const POLARIS_TEST_SCA_TYPE: Input = scoped(Tool::Polaris, "polaris_test_sca_type", "SCA test type passed through to Polaris");
pub const POLARIS_WAIT_FOR_SCAN: Input = scoped(Tool::Polaris, "polaris_waitForScan", "Wait for the Polaris scan to complete");
pub const POLARIS_PR_COMMENT_ENABLED: Input = scoped(Tool::Polaris, "polaris_prComment_enabled", "Comment on pull requests with new issues");
pub const POLARIS_PR_COMMENT_SEVERITIES: Input = scoped(Tool::Polaris, "polaris_prComment_severities", "Severities included in PR comments");
pub const POLARIS_REPORTS_SARIF_CREATE: Input = scoped(Tool::Polaris, "polaris_reports_sarif_create", "Generate a SARIF report");
pub const POLARIS_REPORTS_SARIF_FILE_PATH: Input = scoped(Tool::Polaris, "polaris_reports_sarif_file_path", "Path of the generated SARIF report");
pub const POLARIS_REPORTS_SARIF_SEVERITIES: Input = scoped(Tool::Polaris, "polaris_reports_sarif_severities", "Severities included in the SARIF report");
pub const POLARIS_REPORTS_SARIF_GROUP_SCA_ISSUES: Input = scoped(Tool::Polaris, "polaris_reports_sarif_groupSCAIssues", "Group SCA issues by component in the SARIF report");
pub const POLARIS_REPORTS_SARIF_ISSUE_TYPES: Input = scoped(Tool::Polaris, "polaris_reports_sarif_issue_types", "Issue types included in the SARIF report (SCA, SAST)");
pub const POLARIS_UPLOAD_SARIF_REPORT: Input = scoped(Tool::Polaris, "polaris_upload_sarif_report", "Upload the SARIF report to code scanning");

// Coverity

pub const COVERITY_URL: Input = scoped(Tool::Coverity, "coverity_url", "Coverity Connect URL");
pub const COVERITY_USER: Input = scoped(Tool::Coverity, "coverity_user", "Coverity Connect user name");
pub const COVERITY_PASSPHRASE: Input = scoped(Tool::Coverity, "coverity_passphrase", "Coverity Connect passphrase");
pub const COVERITY_PROJECT_NAME: Input = aliased(
    Some(Tool::Coverity),
    "coverity_project_name",
    &["coverity_repository_name"],
    "Coverity project name (defaults to the repository name)",
);
pub const COVERITY_STREAM_NAME: Input = scoped(Tool::Coverity, "coverity_stream_name", "Coverity stream name (defaults to <repo>-<branch>)");
pub const COVERITY_INSTALL_DIRECTORY: Input = scoped(Tool::Coverity, "coverity_install_directory", "Existing Coverity installation directory");
pub const COVERITY_POLICY_VIEW: Input = scoped(Tool::Coverity, "coverity_policy_view", "Coverity policy view name or id");
pub const COVERITY_PR_COMMENT_ENABLED: Input = aliased(
    Some(Tool::Coverity),
    "coverity_prComment_enabled",
    &["coverity_automation_prcomment"],
    "Comment on pull requests with new issues",
);
pub const COVERITY_LOCAL: Input = scoped(Tool::Coverity, "coverity_local", "Run Coverity analysis locally");
pub const COVERITY_VERSION: Input = scoped(Tool::Coverity, "coverity_version", "Coverity tool version");
pub const COVERITY_BUILD_COMMAND: Input = scoped(Tool::Coverity, "coverity_build_command", "Build command captured by Coverity");
pub const COVERITY_CLEAN_COMMAND: Input = scoped(Tool::Coverity, "coverity_clean_command", "Clean command run before the build");
pub const COVERITY_CONFIG_PATH: Input = scoped(Tool::Coverity, "coverity_config_path", "Coverity configuration file");
pub const COVERITY_ARGS: Input = scoped(Tool::Coverity, "coverity_args", "Additional Coverity arguments");
pub const COVERITY_EXECUTION_PATH: Input = scoped(Tool::Coverity, "coverity_execution_path", "Coverity executable path used by SRM");
pub const COVERITY_WAIT_FOR_SCAN: Input = scoped(Tool::Coverity, "coverity_waitForScan", "Wait for the Coverity scan to complete");

// Black Duck SCA

pub const BLACKDUCKSCA_URL: Input = aliased(Some(Tool::BlackDuck), "blackducksca_url", &["blackduck_url"], "Black Duck SCA server URL");
pub const BLACKDUCKSCA_TOKEN: Input = aliased(
    Some(Tool::BlackDuck),
    "blackducksca_token",
    &["blackduck_token", "blackduck_api_token"],
    "Black Duck SCA API token",
);
pub const BLACKDUCKSCA_SCAN_FULL: Input = aliased(Some(Tool::BlackDuck), "blackducksca_scan_full", &["blackduck_scan_full"], "Run a full (intelligent) scan");
pub const BLACKDUCKSCA_SCAN_FAILURE_SEVERITIES: Input = aliased(
    Some(Tool::BlackDuck),
    "blackducksca_scan_failure_severities",
    &["blackduck_scan_failure_severities"],
    "Policy severities that fail the scan",
);
pub const BLACKDUCKSCA_PR_COMMENT_ENABLED: Input = aliased(
    Some(Tool::BlackDuck),
    "blackducksca_prComment_enabled",
    &["blackduck_prComment_enabled", "blackduck_automation_prcomment"],
    "Comment on pull requests with policy violations",
);
pub const BLACKDUCKSCA_FIXPR_ENABLED: Input = aliased(
    Some(Tool::BlackDuck),
    "blackducksca_fixpr_enabled",
    &["blackduck_fixpr_enabled"],
    "Open fix pull requests for vulnerable components",
);
pub const BLACKDUCKSCA_FIXPR_MAX_COUNT: Input = aliased(
    Some(Tool::BlackDuck),
    "blackducksca_fixpr_maxCount",
    &["blackduck_fixpr_maxCount"],
    "Maximum number of fix pull requests",
);
pub const BLACKDUCKSCA_FIXPR_CREATE_SINGLE_PR: Input = aliased(
    Some(Tool::BlackDuck),
    "blackducksca_fixpr_createSinglePR",
    &["blackduck_fixpr_createSinglePR"],
    "Combine all fixes into a single pull request",
);
pub const BLACKDUCKSCA_FIXPR_FILTER_SEVERITIES: Input = aliased(
    Some(Tool::BlackDuck),
    "blackducksca_fixpr_filter_severities",
    &["blackduck_fixpr_filter_severities"],
    "Vulnerability severities that trigger fix pull requests",
);
pub const BLACKDUCKSCA_FIXPR_UPGRADE_GUIDANCE: Input = aliased(
    Some(Tool::BlackDuck),
    "blackducksca_fixpr_useUpgradeGuidance",
    &["blackduck_fixpr_useUpgradeGuidance"],
    "Upgrade guidance used for fixes (SHORT_TERM, LONG_TERM)",
);
pub const BLACKDUCKSCA_REPORTS_SARIF_CREATE: Input = aliased(
    Some(Tool::BlackDuck),
    "blackducksca_reports_sarif_create",
    &["blackduck_reports_sarif_create"],
    "Generate a SARIF report",
);
pub const BLACKDUCKSCA_REPORTS_SARIF_FILE_PATH: Input = aliased(
    Some(Tool::BlackDuck),
    "blackducksca_reports_sarif_file_path",
    &["blackduck_reports_sarif_file_path"],
    "Path of the generated SARIF report",
);
pub const BLACKDUCKSCA_REPORTS_SARIF_SEVERITIES: Input = aliased(
    Some(Tool::BlackDuck),
    "blackducksca_reports_sarif_severities",
    &["blackduck_reports_sarif_severities"],
    "Severities included in the SARIF report",
);
pub const BLACKDUCKSCA_REPORTS_SARIF_GROUP_SCA_ISSUES: Input = aliased(
    Some(Tool::BlackDuck),
    "blackducksca_reports_sarif_groupSCAIssues",
    &["blackduck_reports_sarif_groupSCAIssues"],
    "Group issues by component in the SARIF report",
);
pub const BLACKDUCKSCA_UPLOAD_SARIF_REPORT: Input = aliased(
    Some(Tool::BlackDuck),
    "blackducksca_upload_sarif_report",
    &["blackduck_upload_sarif_report"],
    "Upload the SARIF report to code scanning",
);
pub const BLACKDUCKSCA_POLICY_BADGES_CREATE: Input = aliased(
    Some(Tool::BlackDuck),
    "blackducksca_policy_badges_create",
    &["blackduck_policy_badges_create"],
    "Publish policy badges to the repository",
);
pub const BLACKDUCKSCA_POLICY_BADGES_MAX_COUNT: Input = aliased(
    Some(Tool::BlackDuck),
    "blackducksca_policy_badges_maxCount",
    &["blackduck_policy_badges_maxCount"],
    "Maximum number of policy badges",
);
pub const BLACKDUCKSCA_WAIT_FOR_SCAN: Input = aliased(
    Some(Tool::BlackDuck),
    "blackducksca_waitForScan",
    &["blackduck_waitForScan"],
    "Wait for the Black Duck scan to complete",
);
pub const DETECT_INSTALL_DIRECTORY: Input = aliased(
    Some(Tool::BlackDuck),
    "detect_install_directory",
    &["blackduck_install_directory"],
    "Existing Detect installation directory",
);
pub const DETECT_SEARCH_DEPTH: Input = aliased(
    Some(Tool::BlackDuck),
    "detect_search_depth",
    &["blackduck_search_depth"],
    "Directory depth Detect searches for package managers",
);
pub const DETECT_CONFIG_PATH: Input = aliased(
    Some(Tool::BlackDuck),
    "detect_config_path",
    &["blackduck_config_path"],
    "Detect configuration file",
);
pub const DETECT_ARGS: Input = aliased(Some(Tool::BlackDuck), "detect_args", &["blackduck_args"], "Additional Detect arguments");
pub const DETECT_EXECUTION_PATH: Input = aliased(
    Some(Tool::BlackDuck),
    "detect_execution_path",
    &["blackduck_execution_path"],
    "Detect executable path used by SRM",
);

// SRM

pub const SRM_URL: Input = scoped(Tool::Srm, "srm_url", "SRM server URL");
pub const SRM_APIKEY: Input = scoped(Tool::Srm, "srm_apikey", "SRM API key");
pub const SRM_ASSESSMENT_TYPES: Input = scoped(Tool::Srm, "srm_assessment_types", "Comma-separated assessment types (SCA, SAST)");
pub const SRM_PROJECT_NAME: Input = scoped(Tool::Srm, "srm_project_name", "SRM project name (defaults to the repository name)");
pub const SRM_PROJECT_ID: Input = scoped(Tool::Srm, "srm_project_id", "SRM project id");
pub const SRM_BRANCH_NAME: Input = scoped(Tool::Srm, "srm_branch_name", "Branch name reported to SRM");
pub const SRM_BRANCH_PARENT: Input = scoped(Tool::Srm, "srm_branch_parent", "Parent branch reported to SRM");
pub const SRM_WAIT_FOR_SCAN: Input = scoped(Tool::Srm, "srm_waitForScan", "Wait for the SRM scan to complete");

/// Every recognised input, grouped by scope.
pub const ALL: &[Input] = &[
    GITHUB_TOKEN,
    INCLUDE_DIAGNOSTICS,
    DIAGNOSTICS_RETENTION_DAYS,
    PROJECT_DIRECTORY,
    NETWORK_SSL_CERT_FILE,
    NETWORK_SSL_TRUST_ALL,
    BRIDGE_INSTALL_DIRECTORY,
    BRIDGE_DOWNLOAD_URL,
    BRIDGE_DOWNLOAD_VERSION,
    POLARIS_SERVER_URL,
    POLARIS_ACCESS_TOKEN,
    POLARIS_APPLICATION_NAME,
    POLARIS_PROJECT_NAME,
    POLARIS_ASSESSMENT_TYPES,
    POLARIS_ASSESSMENT_MODE,
    POLARIS_BRANCH_NAME,
    POLARIS_BRANCH_PARENT_NAME,
    POLARIS_TEST_SCA_TYPE,
    POLARIS_WAIT_FOR_SCAN,
    POLARIS_PR_COMMENT_ENABLED,
    POLARIS_PR_COMMENT_SEVERITIES,
    POLARIS_REPORTS_SARIF_CREATE,
    POLARIS_REPORTS_SARIF_FILE_PATH,
    POLARIS_REPORTS_SARIF_SEVERITIES,
    POLARIS_REPORTS_SARIF_GROUP_SCA_ISSUES,
    POLARIS_REPORTS_SARIF_ISSUE_TYPES,
    POLARIS_UPLOAD_SARIF_REPORT,
    PROJECT_SOURCE_ARCHIVE,
    PROJECT_SOURCE_PRESERVE_SYMLINKS,
    PROJECT_SOURCE_EXCLUDES,
    COVERITY_URL,
    COVERITY_USER,
    COVERITY_PASSPHRASE,
    COVERITY_PROJECT_NAME,
    COVERITY_STREAM_NAME,
    COVERITY_INSTALL_DIRECTORY,
    COVERITY_POLICY_VIEW,
    COVERITY_PR_COMMENT_ENABLED,
    COVERITY_LOCAL,
    COVERITY_VERSION,
    COVERITY_BUILD_COMMAND,
    COVERITY_CLEAN_COMMAND,
    COVERITY_CONFIG_PATH,
    COVERITY_ARGS,
    COVERITY_EXECUTION_PATH,
    COVERITY_WAIT_FOR_SCAN,
    BLACKDUCKSCA_URL,
    BLACKDUCKSCA_TOKEN,
    BLACKDUCKSCA_SCAN_FULL,
    BLACKDUCKSCA_SCAN_FAILURE_SEVERITIES,
    BLACKDUCKSCA_PR_COMMENT_ENABLED,
    BLACKDUCKSCA_FIXPR_ENABLED,
    BLACKDUCKSCA_FIXPR_MAX_COUNT,
    BLACKDUCKSCA_FIXPR_CREATE_SINGLE_PR,
    BLACKDUCKSCA_FIXPR_FILTER_SEVERITIES,
    BLACKDUCKSCA_FIXPR_UPGRADE_GUIDANCE,
    BLACKDUCKSCA_REPORTS_SARIF_CREATE,
    BLACKDUCKSCA_REPORTS_SARIF_FILE_PATH,
    BLACKDUCKSCA_REPORTS_SARIF_SEVERITIES,
    BLACKDUCKSCA_REPORTS_SARIF_GROUP_SCA_ISSUES,
    BLACKDUCKSCA_UPLOAD_SARIF_REPORT,
    BLACKDUCKSCA_POLICY_BADGES_CREATE,
    BLACKDUCKSCA_POLICY_BADGES_MAX_COUNT,
    BLACKDUCKSCA_WAIT_FOR_SCAN,
    DETECT_INSTALL_DIRECTORY,
    DETECT_SEARCH_DEPTH,
    DETECT_CONFIG_PATH,
    DETECT_ARGS,
    DETECT_EXECUTION_PATH,
    SRM_URL,
    SRM_APIKEY,
    SRM_ASSESSMENT_TYPES,
    SRM_PROJECT_NAME,
    SRM_PROJECT_ID,
    SRM_BRANCH_NAME,
    SRM_BRANCH_PARENT,
    SRM_WAIT_FOR_SCAN,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_and_aliases_are_unique() {
        let mut seen = HashSet::new();
        for input in ALL {
            for name in std::iter::once(&input.key).chain(input.deprecated.iter()) {
                assert!(
                    seen.insert(name.to_lowercase()),
                    "duplicate input name {name}"
                );
            }
        }
    }

    #[test]
    fn every_tool_endpoint_is_catalogued() {
        for tool in Tool::ALL {
            assert!(ALL.iter().any(|i| i.key == tool.endpoint().key));
        }
    }
}
