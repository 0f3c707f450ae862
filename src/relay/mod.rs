//! Hands bridge results back to the hosting platform: SARIF reports to
//! code scanning and the `.bridge` directory as a diagnostics artifact.
//!
//! Nothing here fails the run. Problems are logged and collected as
//! warnings on the [`RelayReport`].

use std::io::Write;
use std::path::{Path, PathBuf};

use base64::Engine;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use walkdir::WalkDir;

use crate::assembler::BridgeCommand;
use crate::context::ExecutionContext;
use crate::error::{BridgeError, Result};
use crate::inputs::{keys, Input, RawInputs};
use crate::tools::Tool;

pub const BRIDGE_OUTPUT_DIR: &str = ".bridge";
pub const DIAGNOSTICS_ARTIFACT: &str = "bridge_diagnostics";
pub const SARIF_ARTIFACT_PREFIX: &str = "sarif_report_";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub retention_days: Option<u32>,
}

/// Stores a named set of files as a build artifact.
pub trait ArtifactUploader {
    /// `files` keep their path relative to `root_dir` inside the artifact.
    fn upload_artifact(
        &self,
        name: &str,
        files: &[PathBuf],
        root_dir: &Path,
        options: &UploadOptions,
    ) -> Result<()>;
}

/// Code-scanning upload body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeScanningPayload {
    pub commit_sha: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// Gzip-compressed, base64-encoded SARIF document.
    pub sarif: String,
    pub tool_name: String,
}

/// Posts SARIF results to the platform's code-scanning API.
pub trait CodeScanningClient {
    /// Returns the HTTP-style status of the post.
    fn post_code_scanning_result(&self, payload: &CodeScanningPayload) -> Result<u16>;
}

/// Outcome of [`publish`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelayReport {
    pub artifacts: Vec<String>,
    pub code_scanning: Vec<(Tool, u16)>,
    pub warnings: Vec<String>,
}

impl RelayReport {
    fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.warnings.push(message);
    }
}

struct SarifSource {
    tool: Tool,
    create: Input,
    upload: Input,
    file_path: Input,
    default_path: &'static str,
}

static SARIF_SOURCES: [SarifSource; 2] = [
    SarifSource {
        tool: Tool::Polaris,
        create: keys::POLARIS_REPORTS_SARIF_CREATE,
        upload: keys::POLARIS_UPLOAD_SARIF_REPORT,
        file_path: keys::POLARIS_REPORTS_SARIF_FILE_PATH,
        default_path: ".bridge/Polaris SARIF Generator/report.sarif.json",
    },
    SarifSource {
        tool: Tool::BlackDuck,
        create: keys::BLACKDUCKSCA_REPORTS_SARIF_CREATE,
        upload: keys::BLACKDUCKSCA_UPLOAD_SARIF_REPORT,
        file_path: keys::BLACKDUCKSCA_REPORTS_SARIF_FILE_PATH,
        default_path: ".bridge/Blackduck SCA SARIF Generator/report.sarif.json",
    },
];

/// Where the bridge leaves a tool's SARIF report.
pub fn sarif_report_path(inputs: &RawInputs, tool: Tool, working_dir: &Path) -> Option<PathBuf> {
    let source = SARIF_SOURCES.iter().find(|s| s.tool == tool)?;
    let relative = inputs
        .text(&source.file_path)
        .unwrap_or_else(|| source.default_path.to_string());
    Some(working_dir.join(relative))
}

/// Gzip then base64, as the code-scanning API expects.
pub fn encode_sarif(content: &[u8]) -> Result<String> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content)?;
    let compressed = encoder.finish()?;
    Ok(base64::engine::general_purpose::STANDARD.encode(compressed))
}

/// Every file under `<working_dir>/.bridge`, sorted.
pub fn diagnostics_files(working_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(working_dir.join(BRIDGE_OUTPUT_DIR))
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// Relay SARIF reports and diagnostics for the stages that ran.
pub fn publish(
    inputs: &RawInputs,
    ctx: &ExecutionContext,
    command: &BridgeCommand,
    working_dir: &Path,
    uploader: &dyn ArtifactUploader,
    scanning: &dyn CodeScanningClient,
) -> RelayReport {
    let mut report = RelayReport::default();

    for source in &SARIF_SOURCES {
        let ran = command.stages.iter().any(|s| s.tool == source.tool);
        if !ran || !inputs.flag(&source.create) || !inputs.flag(&source.upload) {
            continue;
        }
        if let Err(e) = relay_sarif(inputs, ctx, source, working_dir, uploader, scanning, &mut report) {
            report.warn(format!("{} SARIF upload failed: {e}", source.tool));
        }
    }

    if command.diagnostics {
        if let Err(e) = relay_diagnostics(inputs, working_dir, uploader, &mut report) {
            report.warn(format!("diagnostics upload failed: {e}"));
        }
    }

    report
}

fn relay_sarif(
    inputs: &RawInputs,
    ctx: &ExecutionContext,
    source: &SarifSource,
    working_dir: &Path,
    uploader: &dyn ArtifactUploader,
    scanning: &dyn CodeScanningClient,
    report: &mut RelayReport,
) -> Result<()> {
    let Some(path) = sarif_report_path(inputs, source.tool, working_dir) else {
        return Ok(());
    };
    if !path.is_file() {
        report.warn(format!("{} SARIF report not found at {}", source.tool, path.display()));
        return Ok(());
    }

    let name = format!("{SARIF_ARTIFACT_PREFIX}{}", source.tool.stage());
    let root = path.parent().unwrap_or(working_dir);
    uploader.upload_artifact(&name, &[path.clone()], root, &UploadOptions::default())?;
    report.artifacts.push(name);

    if !ctx.has_token() {
        return Err(BridgeError::MissingCredential {
            feature: "SARIF upload".to_string(),
        });
    }
    let payload = CodeScanningPayload {
        commit_sha: ctx.commit_sha.clone(),
        git_ref: ctx.git_ref.clone(),
        sarif: encode_sarif(&std::fs::read(&path)?)?,
        tool_name: source.tool.to_string(),
    };
    let status = scanning.post_code_scanning_result(&payload)?;
    tracing::info!(tool = %source.tool, status, "SARIF report posted to code scanning");
    report.code_scanning.push((source.tool, status));
    Ok(())
}

fn relay_diagnostics(
    inputs: &RawInputs,
    working_dir: &Path,
    uploader: &dyn ArtifactUploader,
    report: &mut RelayReport,
) -> Result<()> {
    let files = diagnostics_files(working_dir);
    if files.is_empty() {
        report.warn(format!(
            "no diagnostics found under {}",
            working_dir.join(BRIDGE_OUTPUT_DIR).display()
        ));
        return Ok(());
    }
    let options = UploadOptions {
        retention_days: inputs.number(&keys::DIAGNOSTICS_RETENTION_DAYS)?,
    };
    uploader.upload_artifact(
        DIAGNOSTICS_ARTIFACT,
        &files,
        &working_dir.join(BRIDGE_OUTPUT_DIR),
        &options,
    )?;
    report.artifacts.push(DIAGNOSTICS_ARTIFACT.to_string());
    Ok(())
}

/// Copies artifacts into `<root>/<artifact name>/`.
#[derive(Debug, Clone)]
pub struct DirectoryUploader {
    pub root: PathBuf,
}

impl DirectoryUploader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ArtifactUploader for DirectoryUploader {
    fn upload_artifact(
        &self,
        name: &str,
        files: &[PathBuf],
        root_dir: &Path,
        options: &UploadOptions,
    ) -> Result<()> {
        let target = self.root.join(name);
        for file in files {
            let relative = file.strip_prefix(root_dir).map_err(|_| {
                BridgeError::Upload(format!(
                    "{} is outside {}",
                    file.display(),
                    root_dir.display()
                ))
            })?;
            let dest = target.join(relative);
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(file, &dest)?;
        }
        tracing::info!(
            artifact = name,
            files = files.len(),
            retention_days = ?options.retention_days,
            path = %target.display(),
            "artifact stored"
        );
        Ok(())
    }
}

/// Writes each payload to `<dir>/code_scanning_<tool>.json`.
#[derive(Debug, Clone)]
pub struct FileCodeScanningClient {
    pub dir: PathBuf,
}

impl FileCodeScanningClient {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl CodeScanningClient for FileCodeScanningClient {
    fn post_code_scanning_result(&self, payload: &CodeScanningPayload) -> Result<u16> {
        std::fs::create_dir_all(&self.dir)?;
        let slug = payload.tool_name.to_lowercase().replace(' ', "_");
        let path = self.dir.join(format!("code_scanning_{slug}.json"));
        std::fs::write(&path, serde_json::to_string_pretty(payload)?)?;
        Ok(201)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::push_context;
    use crate::tools::StageCommand;
    use flate2::read::GzDecoder;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::io::Read;

    #[derive(Default)]
    struct RecordingUploader {
        uploads: RefCell<Vec<(String, Vec<PathBuf>, UploadOptions)>>,
    }

    impl ArtifactUploader for RecordingUploader {
        fn upload_artifact(&self, name: &str, files: &[PathBuf], _root: &Path, options: &UploadOptions) -> Result<()> {
            self.uploads
                .borrow_mut()
                .push((name.to_string(), files.to_vec(), *options));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingClient {
        payloads: RefCell<Vec<CodeScanningPayload>>,
    }

    impl CodeScanningClient for RecordingClient {
        fn post_code_scanning_result(&self, payload: &CodeScanningPayload) -> Result<u16> {
            self.payloads.borrow_mut().push(payload.clone());
            Ok(201)
        }
    }

    fn command(tools: &[Tool], diagnostics: bool) -> BridgeCommand {
        BridgeCommand {
            stages: tools
                .iter()
                .map(|&tool| StageCommand {
                    tool,
                    state_path: PathBuf::from(tool.state_file_name()),
                })
                .collect(),
            diagnostics,
            warnings: vec![],
        }
    }

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn sarif_encoding_round_trips() {
        let encoded = encode_sarif(br#"{"version":"2.1.0"}"#).unwrap();
        let compressed = base64::engine::general_purpose::STANDARD.decode(encoded).unwrap();
        let mut decoded = String::new();
        GzDecoder::new(&compressed[..]).read_to_string(&mut decoded).unwrap();
        assert_eq!(decoded, r#"{"version":"2.1.0"}"#);
    }

    #[test]
    fn default_and_custom_report_paths() {
        let work = Path::new("/work");
        assert_eq!(
            sarif_report_path(&RawInputs::new(), Tool::Polaris, work),
            Some(work.join(".bridge/Polaris SARIF Generator/report.sarif.json"))
        );
        let inputs = RawInputs::from_pairs([("blackducksca_reports_sarif_file_path", "out/bd.json")]);
        assert_eq!(
            sarif_report_path(&inputs, Tool::BlackDuck, work),
            Some(work.join("out/bd.json"))
        );
        assert_eq!(sarif_report_path(&inputs, Tool::Srm, work), None);
    }

    #[test]
    fn sarif_is_uploaded_and_posted() {
        let work = tempfile::tempdir().unwrap();
        write(
            &work.path().join(".bridge/Polaris SARIF Generator/report.sarif.json"),
            "{}",
        );
        let inputs = RawInputs::from_pairs([
            ("polaris_reports_sarif_create", "true"),
            ("polaris_upload_sarif_report", "true"),
        ]);
        let ctx = push_context().with_token(Some("ghp_token"));
        let uploader = RecordingUploader::default();
        let client = RecordingClient::default();

        let report = publish(&inputs, &ctx, &command(&[Tool::Polaris], false), work.path(), &uploader, &client);
        assert_eq!(report.artifacts, vec!["sarif_report_polaris"]);
        assert_eq!(report.code_scanning, vec![(Tool::Polaris, 201)]);
        let payloads = client.payloads.borrow();
        assert_eq!(payloads[0].commit_sha, "0123abcd");
        assert_eq!(payloads[0].git_ref, "refs/heads/main");
        assert_eq!(payloads[0].tool_name, "Polaris");
    }

    #[test]
    fn sarif_post_needs_token() {
        let work = tempfile::tempdir().unwrap();
        write(
            &work.path().join(".bridge/Blackduck SCA SARIF Generator/report.sarif.json"),
            "{}",
        );
        let inputs = RawInputs::from_pairs([
            ("blackducksca_reports_sarif_create", "true"),
            ("blackducksca_upload_sarif_report", "true"),
        ]);
        let client = RecordingClient::default();
        let report = publish(
            &inputs,
            &push_context(),
            &command(&[Tool::BlackDuck], false),
            work.path(),
            &RecordingUploader::default(),
            &client,
        );
        assert!(client.payloads.borrow().is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Missing required github token"));
    }

    #[test]
    fn missing_report_and_skipped_tools_only_warn() {
        let work = tempfile::tempdir().unwrap();
        let inputs = RawInputs::from_pairs([
            ("polaris_reports_sarif_create", "true"),
            ("polaris_upload_sarif_report", "true"),
            ("blackducksca_reports_sarif_create", "true"),
            ("blackducksca_upload_sarif_report", "true"),
        ]);
        let report = publish(
            &inputs,
            &push_context().with_token(Some("t")),
            &command(&[Tool::Polaris], false),
            work.path(),
            &RecordingUploader::default(),
            &RecordingClient::default(),
        );
        assert!(report.artifacts.is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("not found"));
    }

    #[test]
    fn diagnostics_collect_bridge_directory() {
        let work = tempfile::tempdir().unwrap();
        write(&work.path().join(".bridge/bridge.log"), "log");
        write(&work.path().join(".bridge/polaris/state.json"), "{}");
        write(&work.path().join("unrelated.txt"), "x");
        let inputs = RawInputs::from_pairs([("diagnostics_retention_days", "5")]);
        let uploader = RecordingUploader::default();

        let report = publish(
            &inputs,
            &push_context(),
            &command(&[Tool::Coverity], true),
            work.path(),
            &uploader,
            &RecordingClient::default(),
        );
        assert_eq!(report.artifacts, vec![DIAGNOSTICS_ARTIFACT]);
        let uploads = uploader.uploads.borrow();
        assert_eq!(uploads[0].1.len(), 2);
        assert_eq!(uploads[0].2.retention_days, Some(5));
    }

    #[test]
    fn directory_uploader_keeps_relative_layout() {
        let work = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let file = work.path().join(".bridge/nested/out.log");
        write(&file, "content");

        DirectoryUploader::new(out.path())
            .upload_artifact("diag", &[file], &work.path().join(".bridge"), &UploadOptions::default())
            .unwrap();
        let copied = std::fs::read_to_string(out.path().join("diag/nested/out.log")).unwrap();
        assert_eq!(copied, "content");
    }

    #[test]
    fn file_client_writes_payload() {
        let out = tempfile::tempdir().unwrap();
        let client = FileCodeScanningClient::new(out.path());
        let payload = CodeScanningPayload {
            commit_sha: "abc".into(),
            git_ref: "refs/heads/main".into(),
            sarif: "H4sI".into(),
            tool_name: "Black Duck SCA".into(),
        };
        assert_eq!(client.post_code_scanning_result(&payload).unwrap(), 201);
        let written = std::fs::read_to_string(out.path().join("code_scanning_black_duck_sca.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["ref"], "refs/heads/main");
    }
}
