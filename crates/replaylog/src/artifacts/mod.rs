use std::collections::BTreeSet;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::extract::{ExtractionCounts, ExtractionReport};
use crate::models::{ChatRowBatch, NormalizedChatMessage, SCHEMA_VERSION};
use crate::utils::time::format_timestamp_usec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    pub messages_jsonl: PathBuf,
    pub chat_rows_json: PathBuf,
    pub schema_json: PathBuf,
    pub stats_json: PathBuf,
}

#[must_use]
pub fn build_artifact_layout(video_out_dir: &Path) -> ArtifactLayout {
    ArtifactLayout {
        messages_jsonl: video_out_dir.join("messages.jsonl"),
        chat_rows_json: video_out_dir.join("chat_rows.json"),
        schema_json: video_out_dir.join("chat-message.v1.schema.json"),
        stats_json: video_out_dir.join("stats.json"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractStats {
    pub schema_version: String,
    pub video_id: String,
    pub counts: ExtractionCounts,
    pub unique_authors: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_message_utc: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message_utc: Option<String>,

    pub warnings: Vec<String>,
}

#[must_use]
pub fn build_extract_stats(report: &ExtractionReport) -> ExtractStats {
    let unique_authors = report
        .messages
        .iter()
        .map(|message| message.author.as_str())
        .collect::<BTreeSet<_>>()
        .len();
    let first_message_utc = report
        .messages
        .first()
        .and_then(|message| format_timestamp_usec(&message.timestamp_usec).ok());
    let last_message_utc = report
        .messages
        .last()
        .and_then(|message| format_timestamp_usec(&message.timestamp_usec).ok());

    ExtractStats {
        schema_version: SCHEMA_VERSION.to_string(),
        video_id: report.video_id.clone(),
        counts: report.counts,
        unique_authors,
        first_message_utc,
        last_message_utc,
        warnings: report.warnings.clone(),
    }
}

#[must_use]
pub fn build_schema_document() -> Value {
    crate::models::json_schema()
}

pub fn write_messages_artifact(path: &Path, messages: &[NormalizedChatMessage]) -> Result<()> {
    ensure_parent_dir(path)?;

    let file = std::fs::File::create(path).context("failed to create messages artifact")?;
    let mut writer = BufWriter::new(file);
    for message in messages {
        serde_json::to_writer(&mut writer, message)
            .context("failed to encode messages jsonl row")?;
        writer
            .write_all(b"\n")
            .context("failed to write messages newline")?;
    }
    writer
        .flush()
        .context("failed to flush messages artifact writer")
}

pub fn write_chat_rows_artifact(path: &Path, messages: &[NormalizedChatMessage]) -> Result<()> {
    ensure_parent_dir(path)?;

    let batch = ChatRowBatch::append_rows(messages.to_vec());
    let encoded = serde_json::to_vec(&batch).context("failed to encode chat rows batch")?;
    std::fs::write(path, encoded).context("failed to write chat rows artifact")
}

pub fn write_schema_artifact(path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;

    let encoded = serde_json::to_vec_pretty(&build_schema_document())
        .context("failed to encode schema json")?;
    std::fs::write(path, encoded).context("failed to write schema artifact")
}

pub fn write_stats_artifact(path: &Path, stats: &ExtractStats) -> Result<()> {
    ensure_parent_dir(path)?;

    let encoded = serde_json::to_vec_pretty(stats).context("failed to encode stats json")?;
    std::fs::write(path, encoded).context("failed to write stats artifact")
}

pub fn write_extract_artifacts(
    layout: &ArtifactLayout,
    report: &ExtractionReport,
) -> Result<ExtractStats> {
    write_messages_artifact(&layout.messages_jsonl, &report.messages)?;
    write_chat_rows_artifact(&layout.chat_rows_json, &report.messages)?;
    write_schema_artifact(&layout.schema_json)?;
    let stats = build_extract_stats(report);
    write_stats_artifact(&layout.stats_json, &stats)?;
    Ok(stats)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create artifact directory: {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{build_artifact_layout, build_extract_stats};
    use crate::extract::{ExtractionCounts, ExtractionReport};
    use crate::models::NormalizedChatMessage;
    use std::path::Path;

    fn message(author: &str, timestamp_usec: &str) -> NormalizedChatMessage {
        NormalizedChatMessage {
            video_id: "abc123".to_string(),
            author: author.to_string(),
            timestamp_usec: timestamp_usec.to_string(),
            message: "hi".to_string(),
        }
    }

    #[test]
    fn layout_is_rooted_in_video_directory() {
        let layout = build_artifact_layout(Path::new("/out/abc123"));
        assert_eq!(layout.messages_jsonl, Path::new("/out/abc123/messages.jsonl"));
        assert_eq!(layout.chat_rows_json, Path::new("/out/abc123/chat_rows.json"));
        assert_eq!(layout.stats_json, Path::new("/out/abc123/stats.json"));
    }

    #[test]
    fn stats_track_authors_and_time_span() {
        let report = ExtractionReport {
            video_id: "abc123".to_string(),
            messages: vec![
                message("Alice", "1770274803000000"),
                message("Bob", "1770274804500000"),
                message("Alice", "1770274805000000"),
            ],
            counts: ExtractionCounts::default(),
            warnings: Vec::new(),
        };
        let stats = build_extract_stats(&report);

        assert_eq!(stats.unique_authors, 2);
        assert_eq!(
            stats.first_message_utc.as_deref(),
            Some("2026-02-05T07:00:03.000000Z")
        );
        assert_eq!(
            stats.last_message_utc.as_deref(),
            Some("2026-02-05T07:00:05.000000Z")
        );
    }

    #[test]
    fn stats_omit_span_for_empty_extraction() {
        let report = ExtractionReport {
            video_id: "abc123".to_string(),
            messages: Vec::new(),
            counts: ExtractionCounts::default(),
            warnings: Vec::new(),
        };
        let stats = build_extract_stats(&report);
        assert_eq!(stats.unique_authors, 0);
        assert!(stats.first_message_utc.is_none());
        assert!(stats.last_message_utc.is_none());
    }
}
