//! Record model for the tweet collection
//!
//! Documents are schema-less JSON objects. The four known fields keep the
//! column names of the CSV files they are imported from; anything else is
//! carried through untouched in [`Record::extra`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Stored field names
pub mod fields {
    pub const TEXT: &str = "Text";
    pub const SENTIMENT: &str = "Sentiment";
    pub const TIMESTAMP: &str = "Timestamp";
    pub const BATCH_TIMESTAMP: &str = "BatchTimestamp";

    /// Projection used by every read path of the dashboard
    pub const DASHBOARD: &[&str] = &[TEXT, SENTIMENT, TIMESTAMP];
}

/// One stored tweet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(
        rename = "Text",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub text: Option<String>,

    /// Raw sentiment label as stored; see [`Record::sentiment`]
    #[serde(
        rename = "Sentiment",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub sentiment: Option<String>,

    #[serde(
        rename = "Timestamp",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,

    /// Stamped onto every row of one CSV upload
    #[serde(
        rename = "BatchTimestamp",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub batch_timestamp: Option<String>,

    /// Fields beyond the known four, passed through opaquely
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// Convenience constructor for the three dashboard fields
    pub fn new(
        text: impl Into<String>,
        sentiment: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            text: Some(text.into()),
            sentiment: Some(sentiment.into()),
            timestamp: Some(timestamp.into()),
            ..Default::default()
        }
    }

    /// Decode a stored JSON document
    pub fn from_document(document: Map<String, Value>) -> serde_json::Result<Self> {
        serde_json::from_value(Value::Object(document))
    }

    /// Encode as a JSON document for storage
    pub fn to_document(&self) -> serde_json::Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            // A struct always serializes to an object
            _ => Ok(Map::new()),
        }
    }

    /// Parsed sentiment category
    pub fn sentiment(&self) -> Sentiment {
        Sentiment::parse(self.sentiment.as_deref())
    }

    /// Text if present and not blank
    pub fn non_empty_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Accepts strings, numbers, and booleans; `null` becomes `None`
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_string))
}

/// Render a JSON value as plain text
pub fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Sentiment category of a record
///
/// The three known labels are matched case-insensitively. Any other label
/// passes through as its own category. Missing or blank labels land in
/// `Unlabeled` so every record belongs to exactly one category.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Other(String),
    Unlabeled,
}

impl Sentiment {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Sentiment::Unlabeled;
        };
        match raw.to_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "neutral" => Sentiment::Neutral,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
            Sentiment::Other(label) => label,
            Sentiment::Unlabeled => "unlabeled",
        }
    }

    /// Label shown in HTML tables
    pub fn display_label(&self) -> String {
        match self {
            Sentiment::Positive => "😊 Positive".to_string(),
            Sentiment::Neutral => "😐 Neutral".to_string(),
            Sentiment::Negative => "😠 Negative".to_string(),
            Sentiment::Other(label) => label.clone(),
            Sentiment::Unlabeled => String::new(),
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Serialized as its label so it can key JSON maps
impl Serialize for Sentiment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
