use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use replaylog::artifacts::{build_artifact_layout, write_extract_artifacts};
use replaylog::extract::extract_stream;
use replaylog::models::NormalizedChatMessage;
use serde_json::Value;

#[test]
fn writes_messages_batch_schema_and_stats() {
    let out_dir = unique_temp_dir("replaylog-artifacts").join("abc123");
    let file = File::open(fixture_path("abc123.live_chat.json")).expect("fixture readable");
    let report = extract_stream(BufReader::new(file), "abc123").expect("fixture should read");

    let layout = build_artifact_layout(&out_dir);
    let stats = write_extract_artifacts(&layout, &report).expect("artifacts should write");
    assert_eq!(stats.counts.messages_emitted, 4);
    assert_eq!(stats.unique_authors, 4);

    let messages = std::fs::read_to_string(&layout.messages_jsonl)
        .expect("messages artifact readable")
        .lines()
        .map(|line| {
            serde_json::from_str::<NormalizedChatMessage>(line).expect("row should deserialize")
        })
        .collect::<Vec<_>>();
    assert_eq!(messages, report.messages);

    let batch: Value = serde_json::from_slice(
        &std::fs::read(&layout.chat_rows_json).expect("chat rows artifact readable"),
    )
    .expect("chat rows should be JSON");
    assert_eq!(batch["executeType"], "appendChatRow");
    assert_eq!(
        batch["chatRows"].as_array().map(Vec::len),
        Some(report.messages.len())
    );
    assert!(
        batch.get("hashedPassword").is_none(),
        "batch must not carry credentials"
    );

    let schema: Value = serde_json::from_slice(
        &std::fs::read(&layout.schema_json).expect("schema artifact readable"),
    )
    .expect("schema should be JSON");
    assert!(schema["properties"].get("timestampUsec").is_some());

    let stats_json: Value = serde_json::from_slice(
        &std::fs::read(&layout.stats_json).expect("stats artifact readable"),
    )
    .expect("stats should be JSON");
    assert_eq!(stats_json["schema_version"], "chat-message.v1");
    assert_eq!(stats_json["video_id"], "abc123");
    assert_eq!(stats_json["counts"]["malformed_lines"], 1);
    assert_eq!(stats_json["counts"]["fallback_runs"], 1);
    assert_eq!(
        stats_json["first_message_utc"],
        "2026-02-05T07:00:03.000000Z"
    );
    assert_eq!(stats_json["last_message_utc"], "2026-02-05T07:00:07.000000Z");
    assert_eq!(stats_json["warnings"].as_array().map(Vec::len), Some(1));
}

#[test]
fn empty_extraction_still_writes_artifacts() {
    let out_dir = unique_temp_dir("replaylog-artifacts-empty").join("nothing");
    let report = extract_stream(std::io::Cursor::new("{}\n"), "nothing").expect("stream should read");

    let layout = build_artifact_layout(&out_dir);
    write_extract_artifacts(&layout, &report).expect("artifacts should write");

    let messages = std::fs::read_to_string(&layout.messages_jsonl).expect("messages readable");
    assert!(messages.is_empty());
    let stats_json: Value = serde_json::from_slice(
        &std::fs::read(&layout.stats_json).expect("stats artifact readable"),
    )
    .expect("stats should be JSON");
    assert!(stats_json.get("first_message_utc").is_none());
}

fn fixture_path(name: &str) -> PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../fixtures/replay")
        .join(name)
}

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}-{nanos}"))
}
