//! Request handlers and wire types.
//!
//! JSON field names are camelCase throughout, matching the clients that
//! already speak this protocol. All failures communicate via a short message
//! string in an `{error: ...}` body.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use nfcure_core::{ForwardError, ForwardingConfig, NfcRecord, NfcSubmission};
use nfcure_report::{generate_medical_report, PatientRecord};

use crate::AppState;

/// Generic success acknowledgment.
#[derive(Debug, Serialize, ToSchema)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

impl Ack {
    fn ok(message: &str) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.to_owned(),
        })
    }
}

/// Error body carried by non-2xx responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

type ApiFailure = (StatusCode, Json<ErrorBody>);

fn failure(status: StatusCode, message: &str) -> ApiFailure {
    (
        status,
        Json(ErrorBody {
            error: message.to_owned(),
        }),
    )
}

/// Outcome of the synchronous forwarding test.
#[derive(Debug, Serialize, ToSchema)]
pub struct TestForwardingRes {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Report request.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportReq {
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default = "default_true")]
    pub include_ai_summary: bool,
}

fn default_true() -> bool {
    true
}

/// Risk-assessment request.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RiskReq {
    #[serde(default)]
    pub patient_id: Option<String>,
}

/// Report response: the formatted report, the source row, and either the AI
/// summary or an embedded error object when summarization failed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRes {
    pub success: bool,
    pub report: String,
    pub patient: PatientRecord,
    pub ai_summary: Option<serde_json::Value>,
}

/// Risk-assessment response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRes {
    pub success: bool,
    pub patient_id: String,
    pub risk_assessment: serde_json::Value,
    pub generated_at: DateTime<Utc>,
}

/// Liveness probe body.
#[derive(Debug, Serialize, ToSchema)]
pub struct LivenessRes {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[utoipa::path(
    post,
    path = "/api/nfc-data",
    request_body = NfcSubmission,
    responses((status = 200, description = "Scan stored", body = Ack))
)]
/// Receives one NFC scan payload.
///
/// The record is stored first and acknowledged unconditionally; when
/// forwarding is configured, the relay is spawned fire-and-forget so its
/// outcome can never alter this response.
pub async fn receive_nfc_data(
    State(state): State<AppState>,
    Json(submission): Json<NfcSubmission>,
) -> Json<Ack> {
    let record = state.nfc.ingest(submission);
    tracing::info!(id = record.id, device = %record.device_info, "received NFC data");

    let config = state.forwarding.get();
    if config.is_configured() {
        state.forwarder.spawn_relay(config, record);
    }

    Ack::ok("NFC data received successfully")
}

#[utoipa::path(
    get,
    path = "/api/nfc-data",
    responses((status = 200, description = "All retained scans, newest first", body = Vec<NfcRecord>))
)]
/// Lists all retained scans, newest first, bounded by the retention cap.
pub async fn list_nfc_data(State(state): State<AppState>) -> Json<Vec<NfcRecord>> {
    Json(state.nfc.list())
}

#[utoipa::path(
    delete,
    path = "/api/nfc-data",
    responses((status = 200, description = "All scans cleared", body = Ack))
)]
/// Clears every retained scan. Irreversible, no confirmation step.
pub async fn clear_nfc_data(State(state): State<AppState>) -> Json<Ack> {
    state.nfc.clear();
    Ack::ok("All NFC data cleared")
}

#[utoipa::path(
    get,
    path = "/api/forwarding-config",
    responses((status = 200, description = "Current forwarding configuration", body = ForwardingConfig))
)]
/// Returns the current forwarding configuration verbatim.
pub async fn get_forwarding_config(State(state): State<AppState>) -> Json<ForwardingConfig> {
    Json(state.forwarding.get())
}

#[utoipa::path(
    post,
    path = "/api/forwarding-config",
    request_body = ForwardingConfig,
    responses((status = 200, description = "Configuration replaced", body = Ack))
)]
/// Replaces the forwarding configuration wholesale.
///
/// Full-replace semantics: fields omitted from the payload reset to their
/// defaults rather than keeping their previous values.
pub async fn set_forwarding_config(
    State(state): State<AppState>,
    Json(config): Json<ForwardingConfig>,
) -> Json<Ack> {
    tracing::info!(enabled = config.enabled, target_url = %config.target_url,
        "forwarding configuration updated");
    state.forwarding.set(config);
    Ack::ok("Configuration saved")
}

#[utoipa::path(
    post,
    path = "/api/test-forwarding",
    responses((status = 200, description = "Relay test outcome", body = TestForwardingRes))
)]
/// Relays a synthetic test record to the configured target.
///
/// Unlike ingestion this path is synchronous: the relay outcome is the
/// response. When forwarding is disabled or has no target URL, a structured
/// failure is returned without any network call.
pub async fn test_forwarding(State(state): State<AppState>) -> Json<TestForwardingRes> {
    let config = state.forwarding.get();
    match state.forwarder.send_test(&config).await {
        Ok(()) => Json(TestForwardingRes {
            success: true,
            message: Some("Test data forwarded successfully".to_owned()),
            error: None,
        }),
        Err(e) => {
            if !matches!(e, ForwardError::NotConfigured) {
                tracing::error!("forwarding test failed: {e}");
            }
            Json(TestForwardingRes {
                success: false,
                message: None,
                error: Some(e.to_string()),
            })
        }
    }
}

/// Looks up a patient, mapping both "no row" and store failures onto the 404
/// contract this API has always presented.
async fn fetch_patient(state: &AppState, patient_id: &str) -> Result<PatientRecord, ApiFailure> {
    match state.patients.fetch(patient_id).await {
        Ok(Some(patient)) => Ok(patient),
        Ok(None) => Err(failure(StatusCode::NOT_FOUND, "Patient not found")),
        Err(e) => {
            tracing::error!(patient_id, "patient store lookup failed: {e}");
            Err(failure(StatusCode::NOT_FOUND, "Patient not found"))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/report",
    request_body = ReportReq,
    responses(
        (status = 200, description = "Formatted report with optional AI summary"),
        (status = 400, description = "Missing patient id", body = ErrorBody),
        (status = 404, description = "Patient not found", body = ErrorBody),
    )
)]
/// Generates the formatted medical report, optionally with an AI summary.
///
/// A failed summarization degrades the response: the report and patient row
/// are still returned with an error object embedded under `aiSummary`.
pub async fn generate_report(
    State(state): State<AppState>,
    Json(req): Json<ReportReq>,
) -> Result<Json<ReportRes>, ApiFailure> {
    let patient_id = req
        .patient_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, "Patient ID is required"))?;

    tracing::info!(%patient_id, "generating patient report");
    let patient = fetch_patient(&state, &patient_id).await?;
    let report = generate_medical_report(&patient, Utc::now());

    let ai_summary = if req.include_ai_summary {
        let summary = match state.ai.generate_medical_summary(&patient, &report).await {
            Ok(summary) => serde_json::to_value(&summary).unwrap_or(serde_json::Value::Null),
            Err(e) => {
                tracing::error!(%patient_id, "AI summary generation failed: {e}");
                serde_json::json!({
                    "error": "AI summary generation failed",
                    "message": e.to_string(),
                    "patientId": patient_id,
                })
            }
        };
        Some(summary)
    } else {
        None
    };

    Ok(Json(ReportRes {
        success: true,
        report,
        patient,
        ai_summary,
    }))
}

#[utoipa::path(
    post,
    path = "/api/risk-assessment",
    request_body = RiskReq,
    responses(
        (status = 200, description = "Risk assessment for the patient"),
        (status = 400, description = "Missing patient id", body = ErrorBody),
        (status = 404, description = "Patient not found", body = ErrorBody),
        (status = 500, description = "Assessment failed", body = ErrorBody),
    )
)]
/// Generates a quick risk assessment for a patient.
pub async fn risk_assessment(
    State(state): State<AppState>,
    Json(req): Json<RiskReq>,
) -> Result<Json<RiskRes>, ApiFailure> {
    let patient_id = req
        .patient_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, "Patient ID is required"))?;

    let patient = fetch_patient(&state, &patient_id).await?;

    let risk_assessment = state.ai.generate_risk_assessment(&patient).await.map_err(|e| {
        tracing::error!(%patient_id, "risk assessment failed: {e}");
        failure(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    })?;

    Ok(Json(RiskRes {
        success: true,
        patient_id,
        risk_assessment,
        generated_at: Utc::now(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/test",
    responses((status = 200, description = "Server liveness", body = LivenessRes))
)]
/// Liveness probe.
pub async fn liveness() -> Json<LivenessRes> {
    Json(LivenessRes {
        message: "Server is working!".to_owned(),
        timestamp: Utc::now(),
    })
}
