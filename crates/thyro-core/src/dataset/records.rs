//! Training record shapes.
//!
//! All shapes carry the image path in `images`; they differ only in how the
//! question and answer(s) are laid out.

use serde::{Deserialize, Serialize};

/// Which record shape to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    /// ShareGPT-style supervised pair with a `system` field
    Sft,
    /// Preference pair with `chosen` and `rejected` answers
    Dpo,
    /// Role/content messages without a system prompt
    Legacy,
}

impl RecordFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sft" => Some(Self::Sft),
            "dpo" | "preference" => Some(Self::Dpo),
            "legacy" => Some(Self::Legacy),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sft => "sft",
            Self::Dpo => "dpo",
            Self::Legacy => "legacy",
        }
    }

    /// File name used when the caller doesn't pick one.
    pub fn default_output_name(&self) -> &'static str {
        match self {
            Self::Sft => "balanced_thyroid_dataset.json",
            Self::Dpo => "thyroid_dpo.json",
            Self::Legacy => "balanced_thyroid_dataset_legacy.json",
        }
    }
}

/// One ShareGPT conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub from: String,
    pub value: String,
}

impl Turn {
    pub fn new(from: &str, value: impl Into<String>) -> Self {
        Self {
            from: from.to_string(),
            value: value.into(),
        }
    }
}

/// One role/content chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub content: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SftRecord {
    pub conversations: Vec<Turn>,
    pub images: Vec<String>,
    pub system: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    pub conversations: Vec<Turn>,
    pub chosen: Turn,
    pub rejected: Turn,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyRecord {
    pub messages: Vec<ChatMessage>,
    pub images: Vec<String>,
}

/// A training record in any of the supported shapes.
///
/// Serialized without a tag so each variant produces exactly its own shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrainingRecord {
    Sft(SftRecord),
    Preference(PreferenceRecord),
    Legacy(LegacyRecord),
}

impl TrainingRecord {
    /// The image this record refers to.
    pub fn image(&self) -> Option<&str> {
        let images = match self {
            TrainingRecord::Sft(r) => &r.images,
            TrainingRecord::Preference(r) => &r.images,
            TrainingRecord::Legacy(r) => &r.images,
        };
        images.first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!(RecordFormat::parse("SFT"), Some(RecordFormat::Sft));
        assert_eq!(RecordFormat::parse("dpo"), Some(RecordFormat::Dpo));
        assert_eq!(RecordFormat::parse("legacy"), Some(RecordFormat::Legacy));
        assert_eq!(RecordFormat::parse("alpaca"), None);
    }

    #[test]
    fn test_preference_shape() {
        let record = TrainingRecord::Preference(PreferenceRecord {
            conversations: vec![Turn::new("system", "p"), Turn::new("human", "<image>q")],
            chosen: Turn::new("gpt", "sick"),
            rejected: Turn::new("gpt", "not sick"),
            images: vec!["a.png".to_string()],
        });

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["chosen"]["from"], "gpt");
        assert_eq!(value["rejected"]["value"], "not sick");
        assert!(value.get("system").is_none());
    }

    #[test]
    fn test_untagged_deserialize_picks_shape() {
        let legacy = r#"{"messages":[{"content":"<image>q","role":"user"}],"images":["x.png"]}"#;
        let record: TrainingRecord = serde_json::from_str(legacy).unwrap();
        assert!(matches!(record, TrainingRecord::Legacy(_)));
        assert_eq!(record.image(), Some("x.png"));

        let dpo = r#"{"conversations":[],"chosen":{"from":"gpt","value":"a"},
                      "rejected":{"from":"gpt","value":"b"},"images":["y.png"]}"#;
        let record: TrainingRecord = serde_json::from_str(dpo).unwrap();
        assert!(matches!(record, TrainingRecord::Preference(_)));
    }
}
