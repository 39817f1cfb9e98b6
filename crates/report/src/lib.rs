//! # NFCure Report
//!
//! Patient record schema and the plain-text medical report formatter.
//!
//! The formatter is a pure function over a [`PatientRecord`]: no I/O, no
//! failure for any input. Every section is always present in the output; a
//! missing field renders as the literal sentinel `Not recorded` so the report
//! keeps a stable shape regardless of how complete the source row is.

pub mod patient;
pub mod report;

pub use patient::PatientRecord;
pub use report::generate_medical_report;
