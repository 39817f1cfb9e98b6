//! # NFCure API
//!
//! REST surface of the NFCure server.
//!
//! Handles:
//! - NFC scan ingestion, listing and clearing
//! - Forwarding configuration reads/updates and the synchronous relay test
//! - Patient report and risk-assessment generation
//! - OpenAPI/Swagger documentation
//!
//! All state lives in [`AppState`], constructed once at startup and injected
//! into every handler; there are no module-level singletons.

pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use nfcure_ai::AiClient;
use nfcure_core::{Forwarder, ForwardingConfig, ForwardingStore, NfcRecord, NfcStore, NfcSubmission};
use nfcure_patients::PatientDirectory;

/// Application state shared across REST handlers.
///
/// Every field clones cheaply; the record list and forwarding configuration
/// are shared behind the services themselves.
#[derive(Clone)]
pub struct AppState {
    pub nfc: NfcStore,
    pub forwarding: ForwardingStore,
    pub forwarder: Forwarder,
    pub patients: PatientDirectory,
    pub ai: AiClient,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::receive_nfc_data,
        handlers::list_nfc_data,
        handlers::clear_nfc_data,
        handlers::get_forwarding_config,
        handlers::set_forwarding_config,
        handlers::test_forwarding,
        handlers::generate_report,
        handlers::risk_assessment,
        handlers::liveness,
    ),
    components(schemas(
        handlers::Ack,
        handlers::ErrorBody,
        handlers::TestForwardingRes,
        handlers::ReportReq,
        handlers::RiskReq,
        handlers::LivenessRes,
        NfcRecord,
        NfcSubmission,
        ForwardingConfig,
    ))
)]
struct ApiDoc;

/// Builds the full application router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/nfc-data",
            post(handlers::receive_nfc_data)
                .get(handlers::list_nfc_data)
                .delete(handlers::clear_nfc_data),
        )
        .route(
            "/api/forwarding-config",
            get(handlers::get_forwarding_config).post(handlers::set_forwarding_config),
        )
        .route("/api/test-forwarding", post(handlers::test_forwarding))
        .route("/api/report", post(handlers::generate_report))
        .route("/api/risk-assessment", post(handlers::risk_assessment))
        .route("/api/test", get(handlers::liveness))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests;
