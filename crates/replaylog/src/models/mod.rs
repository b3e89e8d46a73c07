pub mod chat_message;
pub mod run;

pub use chat_message::{
    APPEND_CHAT_ROW, ChatRowBatch, NormalizedChatMessage, SCHEMA_VERSION, json_schema,
};
pub use run::MessageRun;
