use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SCHEMA_VERSION: &str = "chat-message.v1";
pub const APPEND_CHAT_ROW: &str = "appendChatRow";

/// One text chat message lifted out of a replay log.
///
/// Every field is non-empty whenever a value is produced by the extractor.
/// `timestamp_usec` stays textual so that microsecond precision survives any
/// downstream consumer that parses JSON numbers as doubles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NormalizedChatMessage {
    pub video_id: String,
    pub author: String,

    #[serde(rename = "timestampUsec")]
    #[schemars(rename = "timestampUsec")]
    pub timestamp_usec: String,

    pub message: String,
}

/// Bulk payload handed to whatever ships the rows to remote storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRowBatch {
    pub execute_type: String,
    pub chat_rows: Vec<NormalizedChatMessage>,
}

impl ChatRowBatch {
    #[must_use]
    pub fn append_rows(chat_rows: Vec<NormalizedChatMessage>) -> Self {
        Self {
            execute_type: APPEND_CHAT_ROW.to_string(),
            chat_rows,
        }
    }
}

#[must_use]
pub fn json_schema() -> Value {
    let schema = schemars::schema_for!(NormalizedChatMessage);
    match serde_json::to_value(schema) {
        Ok(value) => value,
        Err(error) => {
            panic!("failed to serialize generated chat message schema: {error}");
        }
    }
}
