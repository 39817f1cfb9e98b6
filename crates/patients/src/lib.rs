//! # NFCure Patients
//!
//! Read-only client for the external patient data store.
//!
//! The store exposes a PostgREST-style table endpoint; patients are looked up
//! by an equality filter on `patient_id`. This crate never writes.

use nfcure_report::PatientRecord;

/// Failures while querying the patient store.
#[derive(Debug, thiserror::Error)]
pub enum PatientStoreError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("patient store returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
}

/// Client for the hosted patient table.
#[derive(Clone)]
pub struct PatientDirectory {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PatientDirectory {
    /// Creates a directory client for `base_url` (project root, without the
    /// `/rest/v1` suffix) authenticated by `api_key`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Fetches one patient row by id.
    ///
    /// Returns `Ok(None)` when no row matches; the caller decides how to map
    /// that onto its own not-found handling.
    pub async fn fetch(&self, patient_id: &str) -> Result<Option<PatientRecord>, PatientStoreError> {
        let url = format!("{}/rest/v1/patients", self.base_url.trim_end_matches('/'));
        let filter = format!("eq.{patient_id}");

        let response = self
            .http
            .get(&url)
            .query(&[("select", "*"), ("patient_id", filter.as_str())])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PatientStoreError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let mut rows: Vec<PatientRecord> = response.json().await?;
        if rows.len() > 1 {
            tracing::warn!(patient_id, "patient id matched more than one row");
        }
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }
}
