use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One serialized judgment: where an item sits for one question.
///
/// Older snapshots used `brand`, `scale` and `value` for the item key, bucket
/// label and weight; those names are still accepted when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub subdomain: Option<String>,
    pub question: String,
    #[serde(alias = "brand")]
    pub item: String,
    #[serde(alias = "scale")]
    pub bucket: String,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default, alias = "value")]
    pub weight: Option<u32>,
}

/// Why a restore entry could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnknownQuestion(String),
    UnknownItem(String),
    AlreadyPlaced { question: String, item: String },
    /// The entry is not a readable record (missing fields, wrong types).
    Malformed(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownQuestion(question) => write!(f, "unknown question '{question}'"),
            Self::UnknownItem(item) => write!(f, "unknown item '{item}'"),
            Self::AlreadyPlaced { question, item } => {
                write!(f, "'{item}' already placed for '{question}'")
            }
            Self::Malformed(detail) => write!(f, "malformed entry ({detail})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: SkipReason,
}

/// Outcome of a best-effort restore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub applied: usize,
    /// Applied entries whose bucket label was unknown and fell back to unsorted.
    pub relabeled: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.relabeled == 0
    }
}

/// Saved entries decoded one by one. Readable records keep their index in the
/// saved list; unreadable ones are reported as skipped instead of failing the
/// whole list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedEntries {
    pub records: Vec<(usize, ResultRecord)>,
    pub malformed: Vec<SkippedRecord>,
}

impl DecodedEntries {
    pub fn len(&self) -> usize {
        self.records.len() + self.malformed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn decode_entries(entries: Vec<Value>) -> DecodedEntries {
    let mut decoded = DecodedEntries::default();
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<ResultRecord>(entry) {
            Ok(record) => decoded.records.push((index, record)),
            Err(error) => {
                tracing::debug!(index, %error, "skipping unreadable saved entry");
                decoded.malformed.push(SkippedRecord {
                    index,
                    reason: SkipReason::Malformed(error.to_string()),
                });
            }
        }
    }
    decoded
}
