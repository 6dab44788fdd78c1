//! Compact board state for hosts that only need a single ordering with
//! per-item scores and notes.

use crate::board::Board;
use crate::types::model::Bucket;
use crate::types::record::{RestoreReport, ResultRecord, SkipReason, SkippedRecord};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompactState {
    #[serde(default)]
    pub order: Vec<String>,
    #[serde(default)]
    pub scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
}

impl Board {
    /// Items ordered by mean placed weight across questions, highest first.
    /// Items never placed keep configuration order after the scored ones.
    pub fn get_state(&self) -> CompactState {
        let mut scored: Vec<(&str, Option<f64>)> = self
            .items()
            .iter()
            .map(|item| (item.key.as_str(), self.mean_weight(&item.key)))
            .collect();

        scored.sort_by(|(_, a), (_, b)| match (a, b) {
            (Some(a), Some(b)) => b.partial_cmp(a).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        CompactState {
            order: scored.iter().map(|(key, _)| (*key).to_string()).collect(),
            scores: scored
                .iter()
                .filter_map(|(key, score)| score.map(|s| ((*key).to_string(), s)))
                .collect(),
            notes: self.notes.clone(),
        }
    }

    fn mean_weight(&self, item: &str) -> Option<f64> {
        let weights: Vec<u32> = (0..self.questions().len())
            .filter_map(|question| match self.placement(question, item)?.bucket {
                Bucket::Unsorted => None,
                Bucket::Scale(index) => self.scale().weight(index),
            })
            .collect();
        if weights.is_empty() {
            return None;
        }
        let total: f64 = weights.iter().copied().map(f64::from).sum();
        Some(total / weights.len() as f64)
    }

    /// Applies a compact state to every question: scored items go to the
    /// bucket nearest their score in `order` sequence, everything else is
    /// unsorted. Notes are replaced.
    pub fn set_state(&mut self, state: &CompactState) -> RestoreReport {
        let mut report = RestoreReport::default();
        let mut seen = HashSet::new();
        let mut accepted: Vec<(String, Option<usize>)> = Vec::new();

        for (index, key) in state.order.iter().enumerate() {
            let Some(item) = self.item_index(key) else {
                report.skipped.push(SkippedRecord {
                    index,
                    reason: SkipReason::UnknownItem(key.clone()),
                });
                continue;
            };
            let canonical = self.items()[item].key.clone();
            if !seen.insert(canonical.clone()) {
                report.skipped.push(SkippedRecord {
                    index,
                    reason: SkipReason::AlreadyPlaced {
                        question: "*".to_string(),
                        item: key.clone(),
                    },
                });
                continue;
            }
            let bucket = state
                .scores
                .get(&canonical)
                .or_else(|| state.scores.get(key))
                .filter(|score| score.is_finite())
                .map(|score| self.scale().nearest(*score));
            accepted.push((canonical, bucket));
            report.applied += 1;
        }

        let placements: Vec<(String, String)> = accepted
            .into_iter()
            .map(|(item, bucket)| {
                let bucket = bucket.map_or(Bucket::Unsorted, Bucket::Scale);
                (item, self.scale().label(bucket).to_string())
            })
            .collect();
        let mut records = Vec::with_capacity(self.questions().len() * placements.len());
        for question in self.questions() {
            for (item, bucket) in &placements {
                records.push(ResultRecord {
                    domain: question.domain.clone(),
                    subdomain: question.subdomain.clone(),
                    question: question.id().to_string(),
                    item: item.clone(),
                    bucket: bucket.clone(),
                    rank: None,
                    weight: None,
                });
            }
        }
        self.apply_records(&records);

        self.notes = state
            .notes
            .iter()
            .filter_map(|(key, note)| {
                self.item_index(key)
                    .map(|item| (self.items()[item].key.clone(), note.clone()))
            })
            .collect();

        tracing::info!(
            applied = report.applied,
            skipped = report.skipped.len(),
            "applied compact board state"
        );
        self.emit_current();
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::model::{Item, Question};

    fn board(questions: &[&str]) -> Board {
        Board::builder(
            vec![
                Item::new("brand_a", "Brand A"),
                Item::new("brand_b", "Brand B"),
                Item::new("brand_c", "Brand C"),
            ],
            questions.iter().map(|q| Question::new(*q)).collect(),
        )
        .build()
        .expect("board should build")
    }

    #[test]
    fn test_get_state_orders_by_mean_weight() {
        let mut board = board(&["q1", "q2"]);
        board
            .move_item_by_label("q1", "brand_c", "Strongly agree", None)
            .expect("move c");
        board
            .move_item_by_label("q2", "brand_c", "Agree", None)
            .expect("move c");
        board
            .move_item_by_label("q1", "brand_a", "Neutral", None)
            .expect("move a");

        let state = board.get_state();
        assert_eq!(state.order, vec!["brand_c", "brand_a", "brand_b"]);
        assert_eq!(state.scores.get("brand_c"), Some(&4.5));
        assert_eq!(state.scores.get("brand_a"), Some(&3.0));
        assert!(!state.scores.contains_key("brand_b"));
    }

    #[test]
    fn test_set_state_places_items_by_nearest_weight() {
        let mut board = board(&["q1"]);
        let mut scores = BTreeMap::new();
        scores.insert("brand_b".to_string(), 4.9);
        scores.insert("brand_a".to_string(), 4.6);
        let mut notes = BTreeMap::new();
        notes.insert("brand_a".to_string(), "liked packaging".to_string());
        notes.insert("ghost".to_string(), "dropped".to_string());

        let report = board.set_state(&CompactState {
            order: vec![
                "brand_b".to_string(),
                "ghost".to_string(),
                "brand_a".to_string(),
            ],
            scores,
            notes,
        });

        assert_eq!(report.applied, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(board.rank_of(0, "brand_b"), Some(1));
        assert_eq!(board.rank_of(0, "brand_a"), Some(2));
        assert_eq!(board.rank_of(0, "brand_c"), None);
        assert_eq!(board.notes().len(), 1);
        assert_eq!(
            board.notes().get("brand_a").map(String::as_str),
            Some("liked packaging")
        );
    }

    #[test]
    fn test_compact_state_round_trips_on_single_question() {
        let mut board = board(&["q1"]);
        board
            .move_item_by_label("q1", "brand_a", "Disagree", None)
            .expect("move a");
        board
            .move_item_by_label("q1", "brand_b", "Agree", None)
            .expect("move b");
        let state = board.get_state();

        let mut fresh = self::board(&["q1"]);
        fresh.set_state(&state);
        assert_eq!(fresh.get_state(), state);
        assert_eq!(fresh.results(), board.results());
    }

    #[test]
    fn test_set_state_finds_scores_when_order_uses_display_names() {
        let mut board = board(&["q1"]);
        let mut scores = BTreeMap::new();
        scores.insert("brand_a".to_string(), 5.0);
        scores.insert("Brand B".to_string(), 2.0);

        let report = board.set_state(&CompactState {
            order: vec!["Brand A".to_string(), "Brand B".to_string()],
            scores,
            notes: BTreeMap::new(),
        });

        assert_eq!(report.applied, 2);
        assert_eq!(
            board.placement(0, "brand_a").map(|p| p.bucket),
            Some(Bucket::Scale(4))
        );
        assert_eq!(
            board.placement(0, "brand_b").map(|p| p.bucket),
            Some(Bucket::Scale(1))
        );
        assert_eq!(board.rank_of(0, "brand_a"), Some(1));
    }
}
