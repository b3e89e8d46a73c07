use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::NormalizedChatMessage;
use crate::utils::time::parse_timestamp_usec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    Baseline,
    Strict,
}

impl ValidationMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Strict => "strict",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationIssueKind {
    InvalidJson,
    SchemaViolation,
    InvariantViolation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationIssueSeverity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Pass,
    Warn,
    Fail,
}

impl ValidationStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Warn => "warn",
            Self::Fail => "fail",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PerVideoValidationStats {
    pub records_validated: usize,
    pub errors: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub line: usize,
    pub kind: ValidationIssueKind,
    pub severity: ValidationIssueSeverity,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub schema_version: String,
    pub mode: ValidationMode,
    pub status: ValidationStatus,
    pub total_records: usize,
    pub records_validated: usize,
    pub errors: usize,
    pub warnings: usize,
    pub per_video_summary: BTreeMap<String, PerVideoValidationStats>,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if self.errors > 0 { 2 } else { 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationArtifactLayout {
    pub report_json: PathBuf,
}

#[must_use]
pub fn build_artifact_layout(out_dir: &Path) -> ValidationArtifactLayout {
    ValidationArtifactLayout {
        report_json: out_dir.join("validate").join("report.json"),
    }
}

pub fn write_report_artifact(path: &Path, report: &ValidationReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("failed to create validate artifact directory")?;
    }

    let encoded =
        serde_json::to_vec_pretty(report).context("failed to encode validation report json")?;
    std::fs::write(path, encoded).context("failed to write validation report artifact")
}

pub fn validate_messages_file(path: &Path, mode: ValidationMode) -> Result<ValidationReport> {
    let input = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input file: {}", path.display()))?;
    Ok(validate_messages_jsonl(&input, mode))
}

#[must_use]
pub fn validate_messages_jsonl(input: &str, mode: ValidationMode) -> ValidationReport {
    let schema = crate::models::json_schema();
    let required_fields = required_fields_from_schema(&schema);
    let mut issues = Vec::new();
    let mut total_records = 0usize;
    let mut parsed_records = Vec::new();

    for (index, line) in input.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        total_records += 1;

        let value = match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => value,
            Err(error) => {
                issues.push(error_issue(
                    line_number,
                    ValidationIssueKind::InvalidJson,
                    format!("invalid JSON: {error}"),
                ));
                continue;
            }
        };

        match validate_record_against_schema(&value, &required_fields) {
            Ok(record) => parsed_records.push((line_number, record)),
            Err(detail) => issues.push(error_issue(
                line_number,
                ValidationIssueKind::SchemaViolation,
                detail,
            )),
        }
    }

    issues.extend(validate_invariants(&parsed_records, mode));

    let errors = issues
        .iter()
        .filter(|issue| issue.severity == ValidationIssueSeverity::Error)
        .count();
    let warnings = issues.len() - errors;

    ValidationReport {
        schema_version: crate::models::SCHEMA_VERSION.to_string(),
        mode,
        status: validation_status(errors, warnings),
        total_records,
        records_validated: parsed_records.len(),
        errors,
        warnings,
        per_video_summary: build_per_video_summary(&parsed_records, &issues),
        issues,
    }
}

fn required_fields_from_schema(schema: &Value) -> BTreeSet<String> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(ToString::to_string)
                .collect::<BTreeSet<String>>()
        })
        .unwrap_or_default()
}

fn validate_record_against_schema(
    value: &Value,
    required_fields: &BTreeSet<String>,
) -> Result<NormalizedChatMessage, String> {
    let object = value
        .as_object()
        .ok_or_else(|| "record is not a JSON object".to_string())?;

    let missing_fields = required_fields
        .iter()
        .filter(|field| !object.contains_key(field.as_str()))
        .cloned()
        .collect::<Vec<_>>();

    if !missing_fields.is_empty() {
        return Err(format!(
            "missing required fields: {}",
            missing_fields.join(", ")
        ));
    }

    serde_json::from_value::<NormalizedChatMessage>(value.clone())
        .map_err(|error| format!("record does not match chat-message.v1 schema: {error}"))
}

type InvariantCheck = fn(&[(usize, NormalizedChatMessage)], ValidationMode) -> Vec<ValidationIssue>;

fn validate_invariants(
    records: &[(usize, NormalizedChatMessage)],
    mode: ValidationMode,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for check in invariant_catalog() {
        issues.extend(check(records, mode));
    }

    issues.sort_by(|left, right| {
        left.line
            .cmp(&right.line)
            .then_with(|| left.detail.cmp(&right.detail))
    });
    issues
}

fn invariant_catalog() -> &'static [InvariantCheck] {
    &[
        invariant_fields_non_empty,
        invariant_timestamp_usec,
        invariant_timestamp_order,
    ]
}

fn invariant_fields_non_empty(
    records: &[(usize, NormalizedChatMessage)],
    _mode: ValidationMode,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (line, record) in records {
        let fields = [
            ("video_id", &record.video_id),
            ("author", &record.author),
            ("message", &record.message),
        ];
        for (name, value) in fields {
            if value.is_empty() {
                issues.push(error_issue(
                    *line,
                    ValidationIssueKind::InvariantViolation,
                    format!("{name} must be non-empty"),
                ));
            }
        }
    }
    issues
}

fn invariant_timestamp_usec(
    records: &[(usize, NormalizedChatMessage)],
    _mode: ValidationMode,
) -> Vec<ValidationIssue> {
    records
        .iter()
        .filter_map(|(line, record)| {
            parse_timestamp_usec(&record.timestamp_usec)
                .err()
                .map(|error| {
                    error_issue(
                        *line,
                        ValidationIssueKind::InvariantViolation,
                        format!("{error:#}"),
                    )
                })
        })
        .collect()
}

fn invariant_timestamp_order(
    records: &[(usize, NormalizedChatMessage)],
    mode: ValidationMode,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut latest_by_video: BTreeMap<&str, u64> = BTreeMap::new();

    for (line, record) in records {
        let Ok(micros) = parse_timestamp_usec(&record.timestamp_usec) else {
            continue;
        };

        match latest_by_video.get_mut(record.video_id.as_str()) {
            Some(latest) if micros < *latest => {
                issues.push(ValidationIssue {
                    line: *line,
                    kind: ValidationIssueKind::InvariantViolation,
                    severity: out_of_order_severity(mode),
                    detail: format!(
                        "timestampUsec {micros} precedes earlier message at {latest} for video {}",
                        record.video_id
                    ),
                });
            }
            Some(latest) => *latest = micros,
            None => {
                latest_by_video.insert(record.video_id.as_str(), micros);
            }
        }
    }

    issues
}

fn out_of_order_severity(mode: ValidationMode) -> ValidationIssueSeverity {
    match mode {
        ValidationMode::Baseline => ValidationIssueSeverity::Warning,
        ValidationMode::Strict => ValidationIssueSeverity::Error,
    }
}

fn error_issue(line: usize, kind: ValidationIssueKind, detail: String) -> ValidationIssue {
    ValidationIssue {
        line,
        kind,
        severity: ValidationIssueSeverity::Error,
        detail,
    }
}

fn validation_status(errors: usize, warnings: usize) -> ValidationStatus {
    if errors > 0 {
        ValidationStatus::Fail
    } else if warnings > 0 {
        ValidationStatus::Warn
    } else {
        ValidationStatus::Pass
    }
}

fn build_per_video_summary(
    records: &[(usize, NormalizedChatMessage)],
    issues: &[ValidationIssue],
) -> BTreeMap<String, PerVideoValidationStats> {
    let mut summary: BTreeMap<String, PerVideoValidationStats> = BTreeMap::new();
    let mut line_to_video = BTreeMap::new();

    for (line, record) in records {
        line_to_video.insert(*line, record.video_id.as_str());
        summary
            .entry(record.video_id.clone())
            .or_default()
            .records_validated += 1;
    }

    for issue in issues {
        let key = line_to_video.get(&issue.line).copied().unwrap_or("unknown");
        let entry = summary.entry(key.to_string()).or_default();
        match issue.severity {
            ValidationIssueSeverity::Warning => entry.warnings += 1,
            ValidationIssueSeverity::Error => entry.errors += 1,
        }
    }

    summary
}
