use std::io::BufRead;

use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{MessageRun, NormalizedChatMessage};
use crate::reader::RecordReader;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionCounts {
    pub lines_read: usize,
    pub blank_lines: usize,
    pub malformed_lines: usize,
    pub records_parsed: usize,
    pub actions_seen: usize,
    pub actions_skipped: usize,
    pub messages_emitted: usize,
    pub fallback_runs: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    pub video_id: String,
    pub messages: Vec<NormalizedChatMessage>,
    pub counts: ExtractionCounts,
    pub warnings: Vec<String>,
}

/// A text message action reduced to the parts the output record needs.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMessageAction {
    pub author: String,
    pub timestamp_usec: String,
    pub runs: Vec<MessageRun>,
}

impl TextMessageAction {
    #[must_use]
    pub fn body(&self) -> String {
        let mut body = String::new();
        for run in &self.runs {
            run.render_into(&mut body);
        }
        body
    }

    #[must_use]
    pub fn fallback_runs(&self) -> usize {
        self.runs.iter().filter(|run| run.is_fallback()).count()
    }

    #[must_use]
    pub fn into_message(self, video_id: &str) -> Option<NormalizedChatMessage> {
        let message = self.body();
        if message.is_empty() {
            return None;
        }

        Some(NormalizedChatMessage {
            video_id: video_id.to_string(),
            author: self.author,
            timestamp_usec: self.timestamp_usec,
            message,
        })
    }
}

/// Runs the reader and the extractor over a whole replay log.
///
/// Malformed lines and non-text actions never stop extraction; the only
/// error returned is a failure to read `input`.
pub fn extract_stream<R: BufRead>(input: R, video_id: &str) -> Result<ExtractionReport> {
    let mut reader = RecordReader::new(input);
    let mut messages = Vec::new();
    let mut counts = ExtractionCounts::default();

    for record in reader.by_ref() {
        let record = record?;
        for action in replay_actions(&record.value) {
            counts.actions_seen += 1;
            let Some(parsed) = parse_text_message_action(action) else {
                counts.actions_skipped += 1;
                continue;
            };

            let fallback_runs = parsed.fallback_runs();
            match parsed.into_message(video_id) {
                Some(message) => {
                    counts.fallback_runs += fallback_runs;
                    messages.push(message);
                }
                None => counts.actions_skipped += 1,
            }
        }
    }

    let reader_counts = reader.counts();
    counts.lines_read = reader_counts.lines_read;
    counts.blank_lines = reader_counts.blank_lines;
    counts.malformed_lines = reader_counts.malformed_lines;
    counts.records_parsed = reader_counts.records_parsed;
    counts.messages_emitted = messages.len();

    Ok(ExtractionReport {
        video_id: video_id.to_string(),
        messages,
        counts,
        warnings: reader.into_warnings(),
    })
}

/// Extracts every text message carried by one replay line record.
#[must_use]
pub fn extract_messages(record: &Value, video_id: &str) -> Vec<NormalizedChatMessage> {
    replay_actions(record)
        .iter()
        .filter_map(|action| extract_action(action, video_id))
        .collect()
}

#[must_use]
pub fn extract_action(action: &Value, video_id: &str) -> Option<NormalizedChatMessage> {
    parse_text_message_action(action)?.into_message(video_id)
}

/// Returns `replayChatItemAction.actions`, or nothing when the record has a
/// different shape.
#[must_use]
pub fn replay_actions(record: &Value) -> &[Value] {
    record
        .get("replayChatItemAction")
        .and_then(|wrapper| wrapper.get("actions"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

#[must_use]
pub fn parse_text_message_action(action: &Value) -> Option<TextMessageAction> {
    let renderer = text_message_renderer(action)?;

    let author = renderer
        .get("authorName")
        .and_then(|name| name.get("simpleText"))
        .and_then(non_empty_str)?
        .to_string();
    let timestamp_usec = extract_timestamp_usec(renderer.get("timestampUsec")?)?;
    let runs = renderer
        .get("message")
        .and_then(|message| message.get("runs"))
        .and_then(Value::as_array)?
        .iter()
        .map(MessageRun::from_value)
        .collect::<Option<Vec<_>>>()?;

    Some(TextMessageAction {
        author,
        timestamp_usec,
        runs,
    })
}

fn text_message_renderer(action: &Value) -> Option<&Map<String, Value>> {
    action
        .get("addChatItemAction")
        .and_then(Value::as_object)
        .and_then(|add| add.get("item"))
        .and_then(Value::as_object)
        .and_then(|item| item.get("liveChatTextMessageRenderer"))
        .and_then(Value::as_object)
}

fn extract_timestamp_usec(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => non_empty_str(value).map(|_| text.clone()),
        Value::Number(number) => number.as_u64().map(|micros| micros.to_string()),
        _ => None,
    }
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|text| !text.is_empty())
}
