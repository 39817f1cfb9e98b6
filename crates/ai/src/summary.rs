//! Narrative summary prompt and tolerant section parsing.
//!
//! The model is instructed to answer under eight fixed `##` headings. The
//! parser scans the response once, case-insensitively, over that known
//! ordered heading list; a heading missing from the response yields a
//! sentinel for its section rather than failing the whole operation, and the
//! raw text is always preserved alongside the structured sections.

use chrono::{DateTime, Utc};
use serde::Serialize;

pub(crate) const SUMMARY_SYSTEM_PROMPT: &str = "You are a medical AI assistant specialized in \
analyzing patient data and providing comprehensive medical summaries for healthcare \
professionals. You have access to complete patient medical histories and can identify \
patterns, risk factors, and critical health indicators.";

/// Sentinel for a heading the model did not produce.
pub const MISSING_SECTION: &str = "Section not found in response";

const HEADINGS: [&str; 8] = [
    "EXECUTIVE SUMMARY",
    "CLINICAL ASSESSMENT",
    "RISK FACTOR ANALYSIS",
    "LIFESTYLE IMPACT ASSESSMENT",
    "CRITICAL ALERTS",
    "TREATMENT RECOMMENDATIONS",
    "PATIENT EDUCATION PRIORITIES",
    "FOLLOW-UP CONSIDERATIONS",
];

/// The eight named narrative sections plus the unmodified response text.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySections {
    pub executive_summary: String,
    pub clinical_assessment: String,
    pub risk_factor_analysis: String,
    pub lifestyle_impact_assessment: String,
    pub critical_alerts: String,
    pub treatment_recommendations: String,
    pub patient_education_priorities: String,
    pub follow_up_considerations: String,
    pub full_text: String,
}

/// Summary metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetadata {
    pub model: String,
    pub word_count: usize,
    /// Heuristic only: true when the critical-alerts section contains the
    /// substring "urgent" (case-insensitive). This is not a verified clinical
    /// classification and must not be treated as one.
    pub has_critical_alerts: bool,
    /// Set when the response carried none of the expected headings and the
    /// sections degraded to sentinels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

/// Structured narrative summary derived from one completion response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSummary {
    pub patient_id: String,
    pub generated_at: DateTime<Utc>,
    pub summary: SummarySections,
    pub metadata: SummaryMetadata,
}

/// Builds the single large analysis prompt embedding the formatted report.
pub(crate) fn summary_prompt(raw_report: &str) -> String {
    format!(
        "Please analyze the following patient medical data and provide a comprehensive medical \
summary for healthcare professionals. Focus on clinical insights, risk factors, and actionable \
recommendations.

PATIENT DATA:
{raw_report}

Please provide your analysis in the following structured format:

## EXECUTIVE SUMMARY
[Brief 2-3 sentence overview of the patient's current health status and key concerns]

## CLINICAL ASSESSMENT
[Detailed analysis of vital signs, laboratory values, and physical health indicators]

## RISK FACTOR ANALYSIS
[Identification and analysis of cardiovascular, metabolic, and lifestyle risk factors]

## LIFESTYLE IMPACT ASSESSMENT
[Analysis of smoking, diet, exercise, and other lifestyle factors on health outcomes]

## CRITICAL ALERTS
[List any urgent or concerning health indicators that require immediate attention]

## TREATMENT RECOMMENDATIONS
[Specific, actionable recommendations for healthcare providers]

## PATIENT EDUCATION PRIORITIES
[Key areas where patient education and lifestyle modifications would be most beneficial]

## FOLLOW-UP CONSIDERATIONS
[Suggested monitoring parameters and follow-up intervals]

Please ensure your analysis is:
- Clinically accurate and evidence-based
- Specific to this patient's data
- Actionable for healthcare providers
- Focused on patient safety and outcomes
- Written in clear, professional medical language"
    )
}

/// Splits a response into the eight known sections.
///
/// A line starting with `##` opens a section when its title matches one of
/// the known headings (case-insensitive) and closes the previous one either
/// way, so content under an unrecognised heading is not attributed to the
/// section before it.
fn split_sections(text: &str) -> [Option<String>; 8] {
    let mut bodies: [Option<String>; 8] = Default::default();
    let mut current: Option<usize> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("##") {
            let title = rest.trim_start_matches('#').trim();
            current = HEADINGS
                .iter()
                .position(|heading| title.eq_ignore_ascii_case(heading));
            if let Some(idx) = current {
                bodies[idx].get_or_insert_with(String::new);
            }
            continue;
        }
        if let Some(idx) = current {
            let body = bodies[idx].get_or_insert_with(String::new);
            body.push_str(line);
            body.push('\n');
        }
    }

    bodies
}

/// Parses one completion response into an [`AiSummary`].
///
/// Never fails: missing headings degrade to [`MISSING_SECTION`] and a fully
/// unstructured response is flagged via `metadata.parse_error`.
pub(crate) fn parse_summary(text: &str, patient_id: &str, model: &str) -> AiSummary {
    let bodies = split_sections(text);
    let found_any = bodies.iter().any(Option::is_some);

    let mut sections = bodies
        .into_iter()
        .map(|body| match body {
            Some(content) => content.trim().to_owned(),
            None => MISSING_SECTION.to_owned(),
        })
        .collect::<Vec<_>>()
        .into_iter();

    let mut next = || sections.next().unwrap_or_else(|| MISSING_SECTION.to_owned());
    let summary = SummarySections {
        executive_summary: next(),
        clinical_assessment: next(),
        risk_factor_analysis: next(),
        lifestyle_impact_assessment: next(),
        critical_alerts: next(),
        treatment_recommendations: next(),
        patient_education_priorities: next(),
        follow_up_considerations: next(),
        full_text: text.to_owned(),
    };

    let has_critical_alerts = summary.critical_alerts.to_lowercase().contains("urgent");

    AiSummary {
        patient_id: patient_id.to_owned(),
        generated_at: Utc::now(),
        summary,
        metadata: SummaryMetadata {
            model: model.to_owned(),
            word_count: text.split_whitespace().count(),
            has_critical_alerts,
            parse_error: if found_any {
                None
            } else {
                Some("no section headings found in response".to_owned())
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = "## EXECUTIVE SUMMARY
Stable overall, elevated cardiovascular risk.

## CLINICAL ASSESSMENT
Blood pressure is high.

## RISK FACTOR ANALYSIS
Smoking and cholesterol.

## LIFESTYLE IMPACT ASSESSMENT
Sedentary.

## CRITICAL ALERTS
URGENT: systolic pressure above 180 mmHg.

## TREATMENT RECOMMENDATIONS
Start antihypertensives.

## PATIENT EDUCATION PRIORITIES
Smoking cessation.

## FOLLOW-UP CONSIDERATIONS
Review in 4 weeks.";

    #[test]
    fn all_sections_are_extracted() {
        let summary = parse_summary(RESPONSE, "P1", "test-model");
        let s = &summary.summary;
        assert_eq!(
            s.executive_summary,
            "Stable overall, elevated cardiovascular risk."
        );
        assert_eq!(s.clinical_assessment, "Blood pressure is high.");
        assert_eq!(s.follow_up_considerations, "Review in 4 weeks.");
        assert_eq!(s.full_text, RESPONSE);
        assert!(summary.metadata.parse_error.is_none());
        assert_eq!(summary.metadata.model, "test-model");
        assert!(summary.metadata.word_count > 0);
    }

    #[test]
    fn critical_alert_heuristic_matches_urgent_case_insensitively() {
        let summary = parse_summary(RESPONSE, "P1", "m");
        assert!(summary.metadata.has_critical_alerts);

        let calm = RESPONSE.replace("URGENT: systolic pressure above 180 mmHg.", "None.");
        let summary = parse_summary(&calm, "P1", "m");
        assert!(!summary.metadata.has_critical_alerts);
    }

    #[test]
    fn missing_heading_yields_the_sentinel() {
        let partial = "## EXECUTIVE SUMMARY\nFine.\n\n## CRITICAL ALERTS\nNone.";
        let summary = parse_summary(partial, "P1", "m");
        assert_eq!(summary.summary.executive_summary, "Fine.");
        assert_eq!(summary.summary.clinical_assessment, MISSING_SECTION);
        assert_eq!(summary.summary.treatment_recommendations, MISSING_SECTION);
        assert!(summary.metadata.parse_error.is_none());
    }

    #[test]
    fn headings_match_case_insensitively() {
        let lower = "## executive summary\nlooks fine\n";
        let summary = parse_summary(lower, "P1", "m");
        assert_eq!(summary.summary.executive_summary, "looks fine");
    }

    #[test]
    fn unknown_heading_terminates_the_previous_section() {
        let text = "## EXECUTIVE SUMMARY\nShort.\n## SOMETHING ELSE\nIgnored.\n";
        let summary = parse_summary(text, "P1", "m");
        assert_eq!(summary.summary.executive_summary, "Short.");
    }

    #[test]
    fn unstructured_response_degrades_with_a_parse_marker() {
        let summary = parse_summary("free-form prose with no headings", "P1", "m");
        assert_eq!(summary.summary.executive_summary, MISSING_SECTION);
        assert_eq!(summary.summary.full_text, "free-form prose with no headings");
        assert!(summary.metadata.parse_error.is_some());
    }
}
