pub mod clock;
pub mod debounce;

use crate::compact::CompactState;
use crate::types::record::ResultRecord;
use clock::Clock;
use debounce::Debouncer;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

/// Payload handed to the host on every coalesced change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoardState {
    Results(Vec<ResultRecord>),
    Compact(CompactState),
}

/// Which shape the host wants to receive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateShape {
    #[default]
    Results,
    Compact,
}

pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;
pub type ChangeCallback = Box<dyn FnMut(&BoardState) -> Result<(), CallbackError>>;

/// SHA-256 of the value's JSON encoding, hex encoded.
pub fn fingerprint<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(value)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{digest:x}"))
}

/// Delivers board changes to the host callback.
///
/// Scheduled changes are debounced; immediate emissions cancel anything
/// pending. A payload identical to the last delivered one is not re-sent.
/// Callback errors and panics are logged and swallowed.
pub struct ChangeNotifier {
    callback: Option<ChangeCallback>,
    shape: StateShape,
    debouncer: Debouncer<BoardState>,
    clock: Box<dyn Clock>,
    last_fingerprint: Option<String>,
    delivered: usize,
}

impl ChangeNotifier {
    pub fn new(
        callback: Option<ChangeCallback>,
        shape: StateShape,
        delay: Duration,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            callback,
            shape,
            debouncer: Debouncer::new(delay),
            clock,
            last_fingerprint: None,
            delivered: 0,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.callback.is_some()
    }

    pub fn shape(&self) -> StateShape {
        self.shape
    }

    pub fn has_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Number of payloads the callback has accepted.
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    pub fn schedule(&mut self, state: BoardState) {
        if !self.is_listening() {
            return;
        }
        let now = self.clock.now();
        self.debouncer.schedule(state, now);
    }

    pub fn emit_now(&mut self, state: BoardState) -> bool {
        self.debouncer.cancel();
        self.deliver(state)
    }

    /// Fires the pending payload if its quiet period has elapsed.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now();
        match self.debouncer.poll(now) {
            Some(state) => self.deliver(state),
            None => false,
        }
    }

    pub fn flush(&mut self) -> bool {
        match self.debouncer.flush() {
            Some(state) => self.deliver(state),
            None => false,
        }
    }

    fn deliver(&mut self, state: BoardState) -> bool {
        let Some(callback) = self.callback.as_mut() else {
            return false;
        };

        let current = match fingerprint(&state) {
            Ok(hash) => Some(hash),
            Err(error) => {
                tracing::warn!(%error, "could not fingerprint board state");
                None
            }
        };
        if current.is_some() && current == self.last_fingerprint {
            tracing::debug!("board state unchanged since last delivery; skipping");
            return false;
        }

        match catch_unwind(AssertUnwindSafe(|| callback(&state))) {
            Ok(Ok(())) => {
                self.last_fingerprint = current;
                self.delivered += 1;
                true
            }
            Ok(Err(error)) => {
                tracing::warn!(%error, "change callback failed");
                false
            }
            Err(_) => {
                tracing::warn!("change callback panicked");
                false
            }
        }
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listening", &self.is_listening())
            .field("shape", &self.shape)
            .field("delay", &self.debouncer.delay())
            .field("pending", &self.has_pending())
            .field("delivered", &self.delivered)
            .finish()
    }
}
