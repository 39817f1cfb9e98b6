//! Transport layer for the chat-completion API.

use nfcure_report::PatientRecord;
use serde::Deserialize;
use serde_json::json;

use crate::risk;
use crate::summary::{self, AiSummary};

/// Failures of a single completion call.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("no summary content in completion response")]
    EmptyResponse,
}

/// Errors surfaced by the two AI operations.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("Failed to generate medical summary: {0}")]
    SummaryGeneration(#[source] CompletionError),
    #[error("Failed to generate risk assessment: {0}")]
    RiskAssessment(#[source] CompletionError),
}

#[derive(Deserialize)]
struct ChatCompletionRes {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat-completion endpoint.
#[derive(Clone)]
pub struct AiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AiClient {
    /// Creates a client against `base_url` (e.g. `https://api.groq.com/openai/v1`).
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    /// The configured completion model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Issues one completion request and returns the assistant text.
    async fn chat_completion(
        &self,
        system: &str,
        user: &str,
        temperature: f64,
        max_completion_tokens: u32,
    ) -> Result<String, CompletionError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": temperature,
            "max_completion_tokens": max_completion_tokens,
            "top_p": 1,
            "stream": false,
        });

        tracing::debug!(model = %self.model, "requesting completion");

        let response = self
            .http
            .post(format!(
                "{}/chat/completions",
                self.base_url.trim_end_matches('/')
            ))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: ChatCompletionRes = response.json().await?;
        payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)
    }

    /// Generates the structured narrative summary for a formatted report.
    ///
    /// The call uses low randomness (temperature 0.3) and a bounded output
    /// length. Transport/API failures and empty payloads fail the operation;
    /// malformed section structure in the response does not.
    pub async fn generate_medical_summary(
        &self,
        patient: &PatientRecord,
        raw_report: &str,
    ) -> Result<AiSummary, AiError> {
        let prompt = summary::summary_prompt(raw_report);
        let text = self
            .chat_completion(summary::SUMMARY_SYSTEM_PROMPT, &prompt, 0.3, 2000)
            .await
            .map_err(AiError::SummaryGeneration)?;

        Ok(summary::parse_summary(
            &text,
            &patient.patient_id,
            &self.model,
        ))
    }

    /// Generates the compact JSON risk assessment.
    ///
    /// The response is parsed as JSON; an unparseable response returns the
    /// fixed fallback object with the raw text attached, never an error.
    pub async fn generate_risk_assessment(
        &self,
        patient: &PatientRecord,
    ) -> Result<serde_json::Value, AiError> {
        let prompt = risk::risk_prompt(patient);
        let text = self
            .chat_completion(risk::RISK_SYSTEM_PROMPT, &prompt, 0.2, 500)
            .await
            .map_err(AiError::RiskAssessment)?;

        Ok(risk::parse_risk_response(&text))
    }
}
