//! # NFCure Core
//!
//! Core state and relay logic for the NFCure NFC ingestion server.
//!
//! This crate contains the in-memory data services:
//! - Capped, newest-first retention of received NFC scans ([`NfcStore`])
//! - The process-wide forwarding configuration singleton ([`ForwardingStore`])
//! - Best-effort relay of ingested records to an operator-configured URL
//!   ([`Forwarder`])
//!
//! **No API concerns**: HTTP routing, TLS, and request/response shaping belong
//! in `api-rest` and the run binary.
//!
//! Nothing here is persisted. A process restart loses all received records and
//! resets the forwarding configuration to its disabled default.

pub mod forwarding;
pub mod records;

pub use forwarding::{ForwardError, Forwarder, ForwardingConfig, ForwardingStore};
pub use records::{NfcRecord, NfcStore, NfcSubmission, MAX_RECORDS};
