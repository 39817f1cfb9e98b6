//! # NFCure AI
//!
//! Client for the hosted chat-completion API used to turn formatted patient
//! reports into structured narrative summaries and compact risk assessments.
//!
//! Two operations, both one outbound call with no retries and no explicit
//! timeout beyond transport defaults:
//!
//! - [`AiClient::generate_medical_summary`] — full eight-section narrative.
//!   Partial or malformed model output degrades into sentinel sections plus
//!   the always-preserved raw text; only transport/API failures are errors.
//! - [`AiClient::generate_risk_assessment`] — JSON-only risk object. A
//!   response that is not valid JSON yields a fixed fallback object carrying
//!   the raw text for diagnostics; it never fails the operation.

mod client;
pub mod risk;
pub mod summary;

pub use client::{AiClient, AiError, CompletionError};
pub use summary::{AiSummary, SummaryMetadata, SummarySections};
