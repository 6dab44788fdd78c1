//! Host-side persistence of the serialized board.

use crate::error::{RankboardError, Result};
use crate::notify::fingerprint;
use crate::types::record::{decode_entries, DecodedEntries, ResultRecord};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: String,
    pub saved_at: String,
    pub fingerprint: String,
    pub records: Vec<ResultRecord>,
}

impl Snapshot {
    pub fn new(records: Vec<ResultRecord>) -> Result<Self> {
        Ok(Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            saved_at: Utc::now().to_rfc3339(),
            fingerprint: fingerprint(&records)?,
            records,
        })
    }
}

/// Envelope as read back. Entries stay raw so that one unreadable record
/// does not hide the others.
#[derive(Debug, Deserialize)]
struct StoredEnvelope {
    #[serde(default)]
    fingerprint: Option<String>,
    records: Vec<Value>,
}

/// Accepts the current envelope as well as a bare record array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredState {
    Envelope(StoredEnvelope),
    Bare(Vec<Value>),
}

/// State file paths must stay inside the board directory.
pub fn validate_state_path(path: &str) -> Result<()> {
    let parsed = Path::new(path);
    if parsed.is_absolute() {
        return Err(RankboardError::ConfigParse(format!(
            "absolute state path rejected: {path}"
        )));
    }
    if parsed
        .components()
        .any(|component| matches!(component, Component::ParentDir))
    {
        return Err(RankboardError::ConfigParse(format!(
            "path traversal rejected: {path}"
        )));
    }
    Ok(())
}

pub fn state_path(root: &Path, relative: &str) -> Result<PathBuf> {
    validate_state_path(relative)?;
    Ok(root.join(relative))
}

/// Reads a saved list. Only a file that is not a record list at all is an
/// error; unreadable entries inside the list are reported as malformed.
pub fn parse_entries(raw: &str) -> Result<DecodedEntries> {
    let stored: StoredState = serde_json::from_str(raw)?;
    let entries = match stored {
        StoredState::Envelope(envelope) => envelope.records,
        StoredState::Bare(entries) => entries,
    };
    Ok(decode_entries(entries))
}

pub fn load_entries(path: &Path) -> Result<Option<DecodedEntries>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_entries(&raw).map(Some)
}

/// Persists records, skipping the write when the stored snapshot already
/// holds the same records. Returns whether a write happened.
pub fn persist(path: &Path, records: &[ResultRecord]) -> Result<bool> {
    let current = fingerprint(&records)?;
    if let Some(existing) = stored_fingerprint(path) {
        if existing == current {
            tracing::debug!(path = %path.display(), "snapshot unchanged; not rewriting");
            return Ok(false);
        }
    }

    let snapshot = Snapshot::new(records.to_vec())?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&snapshot)?;
    fs::write(path, json)?;
    tracing::info!(path = %path.display(), records = records.len(), "saved board snapshot");
    Ok(true)
}

fn stored_fingerprint(path: &Path) -> Option<String> {
    let raw = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<StoredState>(&raw).ok()? {
        StoredState::Envelope(envelope) => envelope.fingerprint,
        StoredState::Bare(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(item: &str, bucket: &str, rank: Option<u32>) -> ResultRecord {
        ResultRecord {
            domain: None,
            subdomain: None,
            question: "q1".to_string(),
            item: item.to_string(),
            bucket: bucket.to_string(),
            rank,
            weight: rank.map(|_| 4),
        }
    }

    #[test]
    fn test_state_path_rejects_traversal_and_absolute_paths() {
        assert!(validate_state_path("../../etc/passwd").is_err());
        assert!(validate_state_path("/tmp/state.json").is_err());
        assert!(validate_state_path(".rankboard/state.json").is_ok());
    }

    #[test]
    fn test_persist_writes_envelope_and_skips_identical_state() {
        let dir = TempDir::new().expect("temp dir should create");
        let path = dir.path().join(".rankboard/state.json");
        let records = vec![record("brand_a", "Agree", Some(1))];

        assert!(persist(&path, &records).expect("first persist should succeed"));
        assert!(!persist(&path, &records).expect("second persist should succeed"));

        let loaded = load_entries(&path)
            .expect("load should succeed")
            .expect("records should exist");
        assert_eq!(loaded.records, vec![(0, records[0].clone())]);
        assert!(loaded.malformed.is_empty());

        let changed = vec![record("brand_a", "unsorted", None)];
        assert!(persist(&path, &changed).expect("changed persist should succeed"));
    }

    #[test]
    fn test_load_accepts_bare_arrays_and_missing_files() {
        let dir = TempDir::new().expect("temp dir should create");
        let path = dir.path().join("state.json");
        assert!(load_entries(&path).expect("missing file is fine").is_none());

        fs::write(
            &path,
            r#"[{"question":"q1","brand":"brand_a","scale":"Agree","rank":1,"value":4}]"#,
        )
        .expect("bare state should write");
        let loaded = load_entries(&path)
            .expect("load should succeed")
            .expect("records should exist");
        assert_eq!(loaded.records[0].1.item, "brand_a");
        assert_eq!(loaded.records[0].1.bucket, "Agree");
    }

    #[test]
    fn test_unreadable_entries_do_not_fail_the_list() {
        let raw = r#"[
            {"question":"q1","brand":"brand_a","scale":"Agree","rank":1,"value":4},
            {"question":"q1","brand":"brand_b","scale":"Agree","rank":2,"value":4.5},
            {"question":"q1","brand":"brand_c","rank":3}
        ]"#;
        let bare = parse_entries(raw).expect("bare list should load");
        assert_eq!(bare.records.len(), 1);
        assert_eq!(bare.records[0].1.item, "brand_a");
        let skipped: Vec<usize> = bare.malformed.iter().map(|s| s.index).collect();
        assert_eq!(skipped, vec![1, 2]);

        let envelope = format!(
            r#"{{"version":"0.1.0","saved_at":"2026-01-01T00:00:00Z","fingerprint":"x","records":{raw}}}"#
        );
        let wrapped = parse_entries(&envelope).expect("envelope should load");
        assert_eq!(wrapped, bare);
    }

    #[test]
    fn test_parse_entries_rejects_garbage() {
        assert!(matches!(
            parse_entries("{\"not\": \"records\"}"),
            Err(RankboardError::Json(_))
        ));
    }
}
