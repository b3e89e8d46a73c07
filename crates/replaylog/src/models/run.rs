use serde_json::Value;

/// One content segment of a chat message body.
///
/// The replay schema carries no explicit tag, so the variant is chosen from
/// the shape of the run: a string `text` wins, then `emoji.emojiId`, and a
/// run with neither key is kept raw.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageRun {
    Text(String),
    Emoji(String),
    Unrecognized(Value),
}

impl MessageRun {
    /// Returns `None` for an `emoji` run without a string `emojiId`; the
    /// action carrying it is incomplete rather than merely unusual.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        if let Some(text) = value.get("text").and_then(Value::as_str) {
            return Some(Self::Text(text.to_string()));
        }

        if let Some(emoji) = value.get("emoji") {
            return emoji
                .get("emojiId")
                .and_then(Value::as_str)
                .map(|emoji_id| Self::Emoji(emoji_id.to_string()));
        }

        Some(Self::Unrecognized(value.clone()))
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Unrecognized(_))
    }

    /// Appends this run's contribution to a message body.
    ///
    /// Unrecognized runs are written as compact JSON, structure and all.
    pub fn render_into(&self, body: &mut String) {
        match self {
            Self::Text(text) => body.push_str(text),
            Self::Emoji(emoji_id) => body.push_str(emoji_id),
            Self::Unrecognized(raw) => body.push_str(&raw.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MessageRun;
    use serde_json::{Value, json};

    #[test]
    fn text_takes_precedence_over_emoji() {
        let run = MessageRun::from_value(&json!({
            "text": "plain",
            "emoji": {"emojiId": "🙂"}
        }));
        assert_eq!(run, Some(MessageRun::Text("plain".to_string())));
    }

    #[test]
    fn emoji_run_uses_identifier() {
        let run = MessageRun::from_value(&json!({
            "emoji": {"emojiId": "UCkszU2WH9gy1mb0dV-11UJg/xyz", "shortcuts": [":wave:"]}
        }));
        assert_eq!(
            run,
            Some(MessageRun::Emoji("UCkszU2WH9gy1mb0dV-11UJg/xyz".to_string()))
        );
    }

    #[test]
    fn emoji_without_identifier_is_rejected() {
        assert!(MessageRun::from_value(&json!({"emoji": {"shortcuts": [":wave:"]}})).is_none());
        assert!(MessageRun::from_value(&json!({"emoji": {"emojiId": 7}})).is_none());
        assert!(MessageRun::from_value(&json!({"emoji": null})).is_none());
    }

    #[test]
    fn non_string_text_is_not_treated_as_text() {
        let run = MessageRun::from_value(&json!({"text": 42}));
        assert_eq!(run, Some(MessageRun::Unrecognized(json!({"text": 42}))));
    }

    #[test]
    fn fallback_keeps_source_key_order() {
        let raw: Value = serde_json::from_str(r#"{"zeta":1,"alpha":{"y":2,"b":3}}"#)
            .expect("run should parse");
        let run = MessageRun::from_value(&raw).expect("run without emoji is kept");
        assert!(run.is_fallback());

        let mut body = String::new();
        run.render_into(&mut body);
        assert_eq!(body, r#"{"zeta":1,"alpha":{"y":2,"b":3}}"#);
    }
}
