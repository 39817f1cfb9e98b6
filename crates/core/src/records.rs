//! In-memory retention of received NFC scans.
//!
//! Records are held newest-first in a capped list. Insertion of the 51st
//! record evicts the oldest by arrival order. There is no individual deletion
//! and no persistence.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum number of records retained at any time.
pub const MAX_RECORDS: usize = 50;

/// A single NFC scan event as stored by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NfcRecord {
    /// Server-assigned identifier: the ingestion time in milliseconds since
    /// the Unix epoch, bumped by one on a same-millisecond collision so ids
    /// stay strictly increasing.
    pub id: i64,
    /// Opaque tag payload, stored exactly as submitted.
    pub text: String,
    /// Server-assigned capture time. Any client-supplied timestamp is ignored
    /// for storage.
    pub timestamp: DateTime<Utc>,
    /// Free-text device label supplied by the scanning client.
    pub device_info: String,
}

/// Inbound NFC scan payload.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NfcSubmission {
    /// Tag payload. Author-supplied and unvalidated.
    pub text: String,
    /// Accepted for contract compatibility with existing clients. The stored
    /// timestamp is always server time, never this value.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Device label; defaults to `Unknown Device` when absent.
    #[serde(default)]
    pub device_info: Option<String>,
}

struct StoreInner {
    records: Vec<NfcRecord>,
    last_id: i64,
}

/// Capped newest-first store of NFC records.
///
/// Cloning is cheap and all clones share the same underlying list, so a single
/// store constructed at startup can be handed to every request handler.
#[derive(Clone)]
pub struct NfcStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl NfcStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                records: Vec::new(),
                last_id: 0,
            })),
        }
    }

    /// Stores a submission and returns the record as kept in memory.
    ///
    /// The record is prepended and the list truncated to [`MAX_RECORDS`],
    /// evicting the oldest entry by arrival order.
    pub fn ingest(&self, submission: NfcSubmission) -> NfcRecord {
        let now = Utc::now();
        let mut inner = self.inner.lock().expect("record store mutex poisoned");

        let id = now.timestamp_millis().max(inner.last_id + 1);
        inner.last_id = id;

        let record = NfcRecord {
            id,
            text: submission.text,
            timestamp: now,
            device_info: submission
                .device_info
                .unwrap_or_else(|| "Unknown Device".to_owned()),
        };

        inner.records.insert(0, record.clone());
        inner.records.truncate(MAX_RECORDS);
        record
    }

    /// Returns a newest-first snapshot of all retained records.
    pub fn list(&self) -> Vec<NfcRecord> {
        self.inner
            .lock()
            .expect("record store mutex poisoned")
            .records
            .clone()
    }

    /// Removes every retained record. Irreversible.
    pub fn clear(&self) {
        self.inner
            .lock()
            .expect("record store mutex poisoned")
            .records
            .clear();
    }

    /// Number of currently retained records.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("record store mutex poisoned")
            .records
            .len()
    }

    /// Whether the store currently holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for NfcStore {
    fn default() -> Self {
        Self::new()
    }
}
