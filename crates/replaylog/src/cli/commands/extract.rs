use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Args;

use crate::artifacts::{ExtractStats, build_artifact_layout, write_extract_artifacts};
use crate::config::RuntimePaths;
use crate::discovery::video_id_from_path;

#[derive(Debug, Clone, Args)]
pub struct ExtractArgs {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Video id stamped on every record; derived from `<id>.live_chat.json` when omitted.
    #[arg(long)]
    pub video_id: Option<String>,
}

pub fn run(args: &ExtractArgs, runtime_paths: &RuntimePaths) -> Result<()> {
    let input = runtime_paths.resolve(&args.input);
    let video_id = match &args.video_id {
        Some(video_id) => video_id.clone(),
        None => video_id_from_path(&input).ok_or_else(|| {
            anyhow!(
                "cannot derive a video id from {}; pass --video-id",
                input.display()
            )
        })?,
    };
    println!(
        "extract: start video_id={} input={} out_dir={}",
        video_id,
        input.display(),
        runtime_paths.out_dir.display()
    );

    let stats = extract_replay_log(&input, &video_id, runtime_paths)?;
    println!(
        "extract: next `replaylog validate {}`",
        build_artifact_layout(&runtime_paths.video_out_dir(&stats.video_id))
            .messages_jsonl
            .display()
    );

    Ok(())
}

/// Extracts one replay log and writes its artifacts, logging progress.
pub fn extract_replay_log(
    input: &Path,
    video_id: &str,
    runtime_paths: &RuntimePaths,
) -> Result<ExtractStats> {
    let file = std::fs::File::open(input)
        .with_context(|| format!("failed to open replay log: {}", input.display()))?;

    println!("extract: stage read video_id={video_id}");
    let report = crate::extract::extract_stream(BufReader::new(file), video_id)
        .with_context(|| format!("failed to read replay log: {}", input.display()))?;
    let counts = report.counts;
    println!(
        "extract: checkpoint read_complete video_id={} lines_read={} blank_lines={} malformed_lines={} records_parsed={}",
        video_id,
        counts.lines_read,
        counts.blank_lines,
        counts.malformed_lines,
        counts.records_parsed
    );
    for warning in &report.warnings {
        println!("extract: warning video_id={video_id} detail={warning}");
    }
    println!(
        "extract: checkpoint extract_complete video_id={} actions_seen={} actions_skipped={} messages={} fallback_runs={}",
        video_id,
        counts.actions_seen,
        counts.actions_skipped,
        counts.messages_emitted,
        counts.fallback_runs
    );

    println!("extract: stage write_artifacts video_id={video_id}");
    let layout = build_artifact_layout(&runtime_paths.video_out_dir(video_id));
    let stats = write_extract_artifacts(&layout, &report)?;
    println!(
        "extract: complete video_id={} messages={} unique_authors={} first_message_utc={} last_message_utc={}",
        video_id,
        stats.counts.messages_emitted,
        stats.unique_authors,
        stats.first_message_utc.as_deref().unwrap_or("none"),
        stats.last_message_utc.as_deref().unwrap_or("none")
    );
    println!(
        "extract: artifacts messages={} chat_rows={} schema={} stats={}",
        layout.messages_jsonl.display(),
        layout.chat_rows_json.display(),
        layout.schema_json.display(),
        layout.stats_json.display()
    );

    Ok(stats)
}
