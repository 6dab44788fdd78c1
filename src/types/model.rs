use crate::error::{RankboardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Label used for the pseudo-bucket holding items that have not been rated.
pub const UNSORTED_LABEL: &str = "unsorted";

pub const LIKERT_LABELS: [&str; 5] = [
    "Strongly disagree",
    "Disagree",
    "Neutral",
    "Agree",
    "Strongly agree",
];

/// A rated thing ("brand"). Only `key` takes part in ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub key: String,
    pub name: String,
    pub image: Option<String>,
}

impl Item {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub key: Option<String>,
    pub domain: Option<String>,
    pub subdomain: Option<String>,
}

impl Question {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            key: None,
            domain: None,
            subdomain: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_grouping(mut self, domain: Option<String>, subdomain: Option<String>) -> Self {
        self.domain = domain;
        self.subdomain = subdomain;
        self
    }

    /// Identity used in result records: the explicit key, else the text.
    pub fn id(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleBucket {
    pub label: String,
    pub weight: u32,
}

/// Ordered rating buckets with strictly increasing, strictly positive weights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scale {
    buckets: Vec<ScaleBucket>,
}

impl Scale {
    pub fn new(buckets: Vec<ScaleBucket>) -> Result<Self> {
        if buckets.is_empty() {
            return Err(RankboardError::Config(
                "scale must define at least one bucket".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut previous: Option<&ScaleBucket> = None;
        for bucket in &buckets {
            let label = bucket.label.trim();
            if label.is_empty() {
                return Err(RankboardError::Config(
                    "scale labels must be non-empty".to_string(),
                ));
            }
            if label.eq_ignore_ascii_case(UNSORTED_LABEL) {
                return Err(RankboardError::Config(format!(
                    "scale label '{label}' is reserved"
                )));
            }
            if !seen.insert(label.to_string()) {
                return Err(RankboardError::Config(format!(
                    "scale contains duplicate label: {label}"
                )));
            }
            if bucket.weight == 0 {
                return Err(RankboardError::Config(format!(
                    "scale weight for '{label}' must be greater than 0"
                )));
            }
            if let Some(prev) = previous {
                if bucket.weight <= prev.weight {
                    return Err(RankboardError::Config(format!(
                        "scale weights must increase: '{}' ({}) follows '{}' ({})",
                        bucket.label, bucket.weight, prev.label, prev.weight
                    )));
                }
            }
            previous = Some(bucket);
        }

        Ok(Self { buckets })
    }

    /// Builds a scale from labels, taking weights from `weights` where given
    /// and falling back to the label's 1-based position.
    pub fn from_labels<S: AsRef<str>>(
        labels: &[S],
        weights: Option<&BTreeMap<String, u32>>,
    ) -> Result<Self> {
        let buckets = labels
            .iter()
            .enumerate()
            .map(|(index, label)| {
                let label = label.as_ref().to_string();
                let weight = weights
                    .and_then(|map| map.get(&label).copied())
                    .unwrap_or(index as u32 + 1);
                ScaleBucket { label, weight }
            })
            .collect();
        Self::new(buckets)
    }

    pub fn likert() -> Self {
        let buckets = LIKERT_LABELS
            .iter()
            .zip(1..)
            .map(|(label, weight)| ScaleBucket {
                label: (*label).to_string(),
                weight,
            })
            .collect();
        Self { buckets }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn buckets(&self) -> &[ScaleBucket] {
        &self.buckets
    }

    pub fn get(&self, index: usize) -> Option<&ScaleBucket> {
        self.buckets.get(index)
    }

    pub fn weight(&self, index: usize) -> Option<u32> {
        self.buckets.get(index).map(|bucket| bucket.weight)
    }

    pub fn position_of(&self, label: &str) -> Option<usize> {
        let label = label.trim();
        self.buckets
            .iter()
            .position(|bucket| bucket.label.trim() == label)
    }

    pub fn is_unsorted_label(label: &str) -> bool {
        label.trim().eq_ignore_ascii_case(UNSORTED_LABEL)
    }

    /// Strict lookup: `unsorted` or a configured label, anything else is `None`.
    pub fn lookup(&self, label: &str) -> Option<Bucket> {
        if Self::is_unsorted_label(label) {
            return Some(Bucket::Unsorted);
        }
        self.position_of(label).map(Bucket::Scale)
    }

    /// Lenient lookup used by restore: unmatched labels land in unsorted.
    pub fn resolve(&self, label: &str) -> Bucket {
        self.lookup(label).unwrap_or(Bucket::Unsorted)
    }

    pub fn label(&self, bucket: Bucket) -> &str {
        match bucket {
            Bucket::Unsorted => UNSORTED_LABEL,
            Bucket::Scale(index) => self
                .buckets
                .get(index)
                .map(|b| b.label.as_str())
                .unwrap_or(UNSORTED_LABEL),
        }
    }

    /// Index of the bucket whose weight is closest to `score`; ties go to the
    /// lower weight.
    pub fn nearest(&self, score: f64) -> usize {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (index, bucket) in self.buckets.iter().enumerate() {
            let distance = (f64::from(bucket.weight) - score).abs();
            if distance < best_distance {
                best = index;
                best_distance = distance;
            }
        }
        best
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::likert()
    }
}

/// One column within a question's row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    Unsorted,
    Scale(usize),
}

impl Bucket {
    pub fn is_unsorted(self) -> bool {
        matches!(self, Bucket::Unsorted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub bucket: Bucket,
    pub position: usize,
}
