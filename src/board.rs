//! Board model: item placement for every question, row-locked moves, ranks,
//! serialization and restore.

use crate::drag::{can_accept, ContainerId, DragHooks, MoveCommit, MoveOutcome, MoveProposal};
use crate::error::{RankboardError, Result};
use crate::notify::clock::{Clock, SystemClock};
use crate::notify::{
    BoardState, CallbackError, ChangeCallback, ChangeNotifier, StateShape, DEFAULT_DEBOUNCE,
};
use crate::rank::{rank, RankInput};
use crate::types::model::{Bucket, Item, Placement, Question, Scale};
use crate::types::record::{
    DecodedEntries, RestoreReport, ResultRecord, SkipReason, SkippedRecord,
};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

/// One question's buckets. Lists hold indexes into the board's item list.
#[derive(Debug, Clone)]
struct Row {
    unsorted: Vec<usize>,
    buckets: Vec<Vec<usize>>,
    ranks: Vec<Option<u32>>,
}

impl Row {
    fn empty(item_count: usize, bucket_count: usize) -> Self {
        Self {
            unsorted: Vec::with_capacity(item_count),
            buckets: vec![Vec::new(); bucket_count],
            ranks: vec![None; item_count],
        }
    }

    fn all_unsorted(item_count: usize, bucket_count: usize) -> Self {
        let mut row = Self::empty(item_count, bucket_count);
        row.unsorted.extend(0..item_count);
        row
    }

    fn list(&self, bucket: Bucket) -> &[usize] {
        match bucket {
            Bucket::Unsorted => &self.unsorted,
            Bucket::Scale(index) => self.buckets.get(index).map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    fn list_mut(&mut self, bucket: Bucket) -> Option<&mut Vec<usize>> {
        match bucket {
            Bucket::Unsorted => Some(&mut self.unsorted),
            Bucket::Scale(index) => self.buckets.get_mut(index),
        }
    }

    fn locate(&self, item: usize) -> Option<Placement> {
        if let Some(position) = self.unsorted.iter().position(|&i| i == item) {
            return Some(Placement {
                bucket: Bucket::Unsorted,
                position,
            });
        }
        self.buckets.iter().enumerate().find_map(|(index, list)| {
            list.iter().position(|&i| i == item).map(|position| Placement {
                bucket: Bucket::Scale(index),
                position,
            })
        })
    }

    fn recompute(&mut self, scale: &Scale) {
        let inputs: Vec<RankInput<'_, usize>> = self
            .buckets
            .iter()
            .zip(scale.buckets())
            .map(|(items, bucket)| RankInput {
                weight: bucket.weight,
                items,
            })
            .collect();
        let ranked = rank(&inputs);

        self.ranks.iter_mut().for_each(|rank| *rank = None);
        for entry in ranked {
            if let Some(slot) = self.ranks.get_mut(entry.item) {
                *slot = Some(entry.rank);
            }
        }
    }
}

/// Builder for [`Board`].
pub struct BoardBuilder {
    items: Vec<Item>,
    questions: Vec<Question>,
    scale: Scale,
    initial_state: Option<Vec<ResultRecord>>,
    callback: Option<ChangeCallback>,
    shape: StateShape,
    debounce: Duration,
    clock: Option<Box<dyn Clock>>,
}

impl BoardBuilder {
    pub fn new(items: Vec<Item>, questions: Vec<Question>) -> Self {
        Self {
            items,
            questions,
            scale: Scale::default(),
            initial_state: None,
            callback: None,
            shape: StateShape::default(),
            debounce: DEFAULT_DEBOUNCE,
            clock: None,
        }
    }

    pub fn scale(mut self, scale: Scale) -> Self {
        self.scale = scale;
        self
    }

    pub fn initial_state(mut self, records: Vec<ResultRecord>) -> Self {
        self.initial_state = Some(records);
        self
    }

    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&BoardState) -> std::result::Result<(), CallbackError> + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    pub fn state_shape(mut self, shape: StateShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn debounce(mut self, delay: Duration) -> Self {
        self.debounce = delay;
        self
    }

    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(RankboardError::Config(
                "board needs at least one item".to_string(),
            ));
        }
        if self.questions.is_empty() {
            return Err(RankboardError::Config(
                "board needs at least one question".to_string(),
            ));
        }

        let mut keys = HashSet::new();
        for item in &self.items {
            if item.key.trim().is_empty() {
                return Err(RankboardError::Config(
                    "item keys must be non-empty".to_string(),
                ));
            }
            if !keys.insert(item.key.as_str()) {
                return Err(RankboardError::Config(format!(
                    "duplicate item key: {}",
                    item.key
                )));
            }
        }
        let mut ids = HashSet::new();
        for question in &self.questions {
            if !ids.insert(question.id()) {
                return Err(RankboardError::Config(format!(
                    "duplicate question: {}",
                    question.id()
                )));
            }
        }
        Ok(())
    }

    pub fn build(self) -> Result<Board> {
        self.validate()?;

        let rows = (0..self.questions.len())
            .map(|_| Row::all_unsorted(self.items.len(), self.scale.len()))
            .collect();
        let clock = self
            .clock
            .unwrap_or_else(|| Box::new(SystemClock) as Box<dyn Clock>);
        let notifier = ChangeNotifier::new(self.callback, self.shape, self.debounce, clock);

        let mut board = Board {
            items: self.items,
            questions: self.questions,
            scale: self.scale,
            rows,
            notes: BTreeMap::new(),
            notifier,
        };

        if let Some(records) = self.initial_state {
            let report = board.apply_records(&records);
            tracing::info!(
                applied = report.applied,
                skipped = report.skipped.len(),
                "restored initial board state"
            );
        }
        board.emit_current();
        Ok(board)
    }
}

#[derive(Debug)]
pub struct Board {
    items: Vec<Item>,
    questions: Vec<Question>,
    scale: Scale,
    rows: Vec<Row>,
    pub(crate) notes: BTreeMap<String, String>,
    notifier: ChangeNotifier,
}

impl Board {
    pub fn builder(items: Vec<Item>, questions: Vec<Question>) -> BoardBuilder {
        BoardBuilder::new(items, questions)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    pub fn notes(&self) -> &BTreeMap<String, String> {
        &self.notes
    }

    pub fn set_note(&mut self, item: &str, note: impl Into<String>) -> Result<()> {
        let index = self
            .item_index(item)
            .ok_or_else(|| RankboardError::UnknownItem(item.to_string()))?;
        let key = self.items[index].key.clone();
        self.notes.insert(key, note.into());
        self.schedule_change();
        Ok(())
    }

    /// Finds a question by identity, then by display text.
    pub fn find_question(&self, name: &str) -> Option<usize> {
        self.questions
            .iter()
            .position(|q| q.id() == name)
            .or_else(|| self.questions.iter().position(|q| q.text == name))
    }

    /// Finds an item by key, then by display name.
    pub fn item_index(&self, name: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.key == name)
            .or_else(|| self.items.iter().position(|item| item.name == name))
    }

    pub fn placement(&self, question: usize, item: &str) -> Option<Placement> {
        let index = self.item_index(item)?;
        self.rows.get(question)?.locate(index)
    }

    pub fn rank_of(&self, question: usize, item: &str) -> Option<u32> {
        let index = self.item_index(item)?;
        self.rows.get(question)?.ranks.get(index).copied().flatten()
    }

    pub fn bucket_items(&self, question: usize, bucket: Bucket) -> Vec<&Item> {
        self.rows
            .get(question)
            .map(|row| row.list(bucket).iter().map(|&i| &self.items[i]).collect())
            .unwrap_or_default()
    }

    /// Moves `item` within `question`'s row to `target`, inserting at
    /// `position` (clamped to the end of the target list).
    pub fn move_item(
        &mut self,
        question: usize,
        item: &str,
        target: ContainerId,
        position: usize,
    ) -> Result<MoveOutcome> {
        let index = self
            .item_index(item)
            .ok_or_else(|| RankboardError::UnknownItem(item.to_string()))?;
        let current = self
            .rows
            .get(question)
            .and_then(|row| row.locate(index))
            .ok_or_else(|| RankboardError::UnknownQuestion(question.to_string()))?;
        self.apply_move(index, ContainerId::new(question, current.bucket), target, position)
    }

    /// Label-addressed variant of [`Board::move_item`]; `None` appends.
    pub fn move_item_by_label(
        &mut self,
        question: &str,
        item: &str,
        bucket: &str,
        position: Option<usize>,
    ) -> Result<MoveOutcome> {
        let row = self
            .find_question(question)
            .ok_or_else(|| RankboardError::UnknownQuestion(question.to_string()))?;
        let bucket = self
            .scale
            .lookup(bucket)
            .ok_or_else(|| RankboardError::UnknownBucket(bucket.to_string()))?;
        self.move_item(
            row,
            item,
            ContainerId::new(row, bucket),
            position.unwrap_or(usize::MAX),
        )
    }

    fn apply_move(
        &mut self,
        item: usize,
        source: ContainerId,
        target: ContainerId,
        position: usize,
    ) -> Result<MoveOutcome> {
        if !can_accept(source.row, target.row) {
            tracing::warn!(
                source_row = source.row,
                target_row = target.row,
                "rejected cross-question move"
            );
            return Err(RankboardError::RowLocked {
                source_row: source.row,
                target_row: target.row,
            });
        }
        if let Bucket::Scale(index) = target.bucket {
            if index >= self.scale.len() {
                return Err(RankboardError::UnknownBucket(index.to_string()));
            }
        }

        let row = self
            .rows
            .get_mut(source.row)
            .ok_or_else(|| RankboardError::UnknownQuestion(source.row.to_string()))?;
        let current = row
            .locate(item)
            .ok_or_else(|| RankboardError::UnknownItem(self.items[item].key.clone()))?;

        if let Some(list) = row.list_mut(current.bucket) {
            list.remove(current.position);
        }
        let list = row
            .list_mut(target.bucket)
            .ok_or_else(|| RankboardError::UnknownBucket(format!("{:?}", target.bucket)))?;
        let position = position.min(list.len());
        list.insert(position, item);
        row.recompute(&self.scale);
        let rank = row.ranks[item];

        tracing::debug!(
            row = source.row,
            item = %self.items[item].key,
            from = ?current.bucket,
            to = ?target.bucket,
            position,
            "moved item"
        );
        self.schedule_change();

        Ok(MoveOutcome {
            row: source.row,
            from: current.bucket,
            to: target.bucket,
            position,
            rank,
        })
    }

    /// Flat result list: question order, then unsorted followed by the scale
    /// buckets in scale order, then position within the bucket.
    pub fn results(&self) -> Vec<ResultRecord> {
        let mut out = Vec::with_capacity(self.questions.len() * self.items.len());
        for (question, row) in self.questions.iter().zip(&self.rows) {
            let buckets = std::iter::once(Bucket::Unsorted)
                .chain((0..self.scale.len()).map(Bucket::Scale));
            for bucket in buckets {
                let weight = match bucket {
                    Bucket::Unsorted => None,
                    Bucket::Scale(index) => self.scale.weight(index),
                };
                for &item in row.list(bucket) {
                    out.push(ResultRecord {
                        domain: question.domain.clone(),
                        subdomain: question.subdomain.clone(),
                        question: question.id().to_string(),
                        item: self.items[item].key.clone(),
                        bucket: self.scale.label(bucket).to_string(),
                        rank: row.ranks[item],
                        weight,
                    });
                }
            }
        }
        out
    }

    /// Rebuilds every row from `records`. Entries that cannot be resolved are
    /// skipped; items no entry mentions end up unsorted.
    pub fn restore_state(&mut self, records: &[ResultRecord]) -> RestoreReport {
        let report = self.apply_records(records);
        self.finish_restore(report)
    }

    /// Like [`Board::restore_state`] for entries read from an untrusted saved
    /// list. Unreadable entries are skipped as malformed.
    pub fn restore_entries(&mut self, entries: DecodedEntries) -> RestoreReport {
        let report = self.apply_indexed(
            entries.records.iter().map(|(index, record)| (*index, record)),
            entries.malformed,
        );
        self.finish_restore(report)
    }

    fn finish_restore(&mut self, report: RestoreReport) -> RestoreReport {
        tracing::info!(
            applied = report.applied,
            relabeled = report.relabeled,
            skipped = report.skipped.len(),
            "restored board state"
        );
        self.emit_current();
        report
    }

    pub(crate) fn apply_records(&mut self, records: &[ResultRecord]) -> RestoreReport {
        self.apply_indexed(records.iter().enumerate(), Vec::new())
    }

    fn apply_indexed<'r>(
        &mut self,
        records: impl Iterator<Item = (usize, &'r ResultRecord)>,
        skipped: Vec<SkippedRecord>,
    ) -> RestoreReport {
        let item_count = self.items.len();
        let bucket_count = self.scale.len();
        for row in &mut self.rows {
            *row = Row::empty(item_count, bucket_count);
        }

        let mut placed = vec![vec![false; item_count]; self.questions.len()];
        let mut report = RestoreReport {
            skipped,
            ..RestoreReport::default()
        };

        for (index, record) in records {
            let Some(question) = self.find_question(&record.question) else {
                tracing::debug!(index, question = %record.question, "skipping record for unknown question");
                report.skipped.push(SkippedRecord {
                    index,
                    reason: SkipReason::UnknownQuestion(record.question.clone()),
                });
                continue;
            };
            let Some(item) = self.item_index(&record.item) else {
                tracing::debug!(index, item = %record.item, "skipping record for unknown item");
                report.skipped.push(SkippedRecord {
                    index,
                    reason: SkipReason::UnknownItem(record.item.clone()),
                });
                continue;
            };
            if placed[question][item] {
                report.skipped.push(SkippedRecord {
                    index,
                    reason: SkipReason::AlreadyPlaced {
                        question: record.question.clone(),
                        item: record.item.clone(),
                    },
                });
                continue;
            }

            let bucket = self.scale.resolve(&record.bucket);
            if bucket.is_unsorted() && !Scale::is_unsorted_label(&record.bucket) {
                tracing::debug!(index, bucket = %record.bucket, "unknown bucket label; using unsorted");
                report.relabeled += 1;
            }
            if let Some(list) = self.rows[question].list_mut(bucket) {
                list.push(item);
                placed[question][item] = true;
                report.applied += 1;
            }
        }

        report.skipped.sort_by_key(|skipped| skipped.index);
        if !report.skipped.is_empty() {
            tracing::warn!(
                skipped = report.skipped.len(),
                "some saved entries no longer match the board"
            );
        }

        for (row, placed) in self.rows.iter_mut().zip(&placed) {
            for (item, done) in placed.iter().enumerate() {
                if !done {
                    row.unsorted.push(item);
                }
            }
            row.recompute(&self.scale);
        }
        report
    }

    pub(crate) fn current_state(&self) -> BoardState {
        match self.notifier.shape() {
            StateShape::Results => BoardState::Results(self.results()),
            StateShape::Compact => BoardState::Compact(self.get_state()),
        }
    }

    pub(crate) fn emit_current(&mut self) {
        if self.notifier.is_listening() {
            let state = self.current_state();
            self.notifier.emit_now(state);
        }
    }

    fn schedule_change(&mut self) {
        if self.notifier.is_listening() {
            let state = self.current_state();
            self.notifier.schedule(state);
        }
    }

    /// Delivers the pending change if its debounce window has elapsed.
    pub fn tick(&mut self) -> bool {
        self.notifier.tick()
    }

    /// Delivers any pending change immediately.
    pub fn flush_notifications(&mut self) -> bool {
        self.notifier.flush()
    }

    pub fn has_pending_notification(&self) -> bool {
        self.notifier.has_pending()
    }
}

impl DragHooks for Board {
    fn on_move_proposed(&self, proposal: &MoveProposal) -> bool {
        can_accept(proposal.from.row, proposal.to.row) && proposal.from.row < self.rows.len()
    }

    fn on_move_committed(&mut self, commit: &MoveCommit) -> Result<MoveOutcome> {
        let item = self
            .item_index(&commit.item)
            .ok_or_else(|| RankboardError::UnknownItem(commit.item.clone()))?;
        self.apply_move(item, commit.from, commit.to, commit.new_index)
    }
}

impl Drop for Board {
    fn drop(&mut self) {
        self.notifier.flush();
    }
}
