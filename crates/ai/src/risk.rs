//! Compact risk-assessment prompt and JSON parsing with fallback.

use nfcure_report::PatientRecord;
use serde_json::{json, Value};
use std::fmt::Display;

pub(crate) const RISK_SYSTEM_PROMPT: &str =
    "You are a medical AI assistant providing risk assessments. Respond with valid JSON only.";

fn unknown_or<T: Display>(field: &Option<T>) -> String {
    match field {
        Some(v) => v.to_string(),
        None => "Unknown".to_owned(),
    }
}

fn yes_no(field: Option<bool>) -> &'static str {
    if field.unwrap_or(false) {
        "Yes"
    } else {
        "No"
    }
}

/// Builds the seven-attribute risk prompt. Missing numeric or categorical
/// values render as `Unknown`; condition flags render as `Yes`/`No`.
pub(crate) fn risk_prompt(patient: &PatientRecord) -> String {
    format!(
        "Analyze the following patient data and provide a risk assessment focusing on \
cardiovascular, metabolic, and lifestyle risks:

Patient ID: {patient_id}
Age: {age}
BMI: {bmi}
Blood Pressure: {restbp} mmHg
Cholesterol: {cholesterol} mg/dL
Diabetes: {diabetes}
Smoking: {smoking}
Heart Disease: {heart_disease}

Provide a brief risk assessment with:
1. Overall risk level (Low/Medium/High)
2. Primary risk factors
3. Immediate concerns
4. Preventive recommendations

Format as JSON with fields: riskLevel, primaryRisks, immediateConcerns, recommendations",
        patient_id = patient.patient_id,
        age = unknown_or(&patient.age),
        bmi = unknown_or(&patient.bmi),
        restbp = unknown_or(&patient.restbp),
        cholesterol = unknown_or(&patient.cholesterol),
        diabetes = yes_no(patient.diabetes),
        smoking = yes_no(patient.smoker),
        heart_disease = yes_no(patient.heartdiseaseorattack),
    )
}

/// Parses the model response as a JSON object.
///
/// Anything else (prose, arrays, truncated output) returns the fixed fallback
/// object with the raw text attached under `rawResponse` for diagnostics.
pub fn parse_risk_response(text: &str) -> Value {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(value) if value.is_object() => value,
        _ => json!({
            "riskLevel": "Unknown",
            "primaryRisks": ["Unable to parse risk assessment"],
            "immediateConcerns": ["Analysis failed"],
            "recommendations": ["Consult healthcare provider"],
            "rawResponse": text,
        }),
    }
}
