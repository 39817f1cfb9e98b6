//! Fixed-layout plain-text medical report.

use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::fmt::Write as _;

use crate::patient::PatientRecord;

const RULE: &str = "═══════════════════════════════════════════════════════════════";

/// Renders a value with a fixed unit suffix, or the missing-data sentinel.
fn value<T: Display>(field: &Option<T>, unit: &str) -> String {
    match field {
        Some(v) => format!("{v}{unit}"),
        None => "Not recorded".to_owned(),
    }
}

/// Renders a condition flag. The sentinel wins over Yes/No when absent.
fn yes_no(field: Option<bool>) -> &'static str {
    match field {
        Some(true) => "Yes",
        Some(false) => "No",
        None => "Not recorded",
    }
}

/// Renders a stored date, falling back to the raw string when it does not
/// parse as RFC 3339.
fn date(field: &Option<String>) -> String {
    match field {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|_| raw.clone()),
        None => "Not recorded".to_owned(),
    }
}

/// Renders the 0/1 gender code with a closed fallback for any other value.
fn gender(code: Option<i64>) -> &'static str {
    match code {
        Some(1) => "Male",
        Some(0) => "Female",
        _ => "Not specified",
    }
}

/// Builds the fixed-section patient report.
///
/// Pure and deterministic for a given record and generation time. Every
/// section is emitted even when the record is empty; missing fields render as
/// `Not recorded`. No clinical validation of the values is performed.
pub fn generate_medical_report(patient: &PatientRecord, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    let w = &mut out;

    let _ = writeln!(w, "{RULE}");
    let _ = writeln!(w, "                    PATIENT MEDICAL REPORT");
    let _ = writeln!(w, "{RULE}");
    let _ = writeln!(w);

    let _ = writeln!(w, "PATIENT INFORMATION:");
    let _ = writeln!(w, "──────────────────");
    let _ = writeln!(w, "Patient ID: {}", patient.patient_id);
    let _ = writeln!(w, "Name: {}", value(&patient.name, ""));
    let _ = writeln!(w, "Age: {}", value(&patient.age, " years"));
    let _ = writeln!(w, "Gender: {}", gender(patient.gender));
    let _ = writeln!(w, "BMI: {}", value(&patient.bmi, " kg/m²"));
    let _ = writeln!(w, "Record Created: {}", date(&patient.created_at));
    let _ = writeln!(w);

    let _ = writeln!(w, "VITAL SIGNS:");
    let _ = writeln!(w, "───────────");
    let _ = writeln!(w, "Blood Pressure:");
    let _ = writeln!(w, "  • Resting BP: {}", value(&patient.restbp, " mmHg"));
    let _ = writeln!(w, "  • Systolic BP: {}", value(&patient.systolic_bp, " mmHg"));
    let _ = writeln!(
        w,
        "  • Diastolic BP: {}",
        value(&patient.diastolic_bp, " mmHg")
    );
    let _ = writeln!(w, "  • High BP: {}", yes_no(patient.highbp));
    let _ = writeln!(w);
    let _ = writeln!(w, "Heart Rate: {}", value(&patient.heart_rate, " bpm"));
    let _ = writeln!(w);

    let _ = writeln!(w, "LABORATORY VALUES:");
    let _ = writeln!(w, "────────────────");
    let _ = writeln!(w, "Cholesterol:");
    let _ = writeln!(
        w,
        "  • Total Cholesterol: {}",
        value(&patient.cholesterol, " mg/dL")
    );
    let _ = writeln!(w, "  • LDL: {}", value(&patient.ldl, " mg/dL"));
    let _ = writeln!(w, "  • HDL: {}", value(&patient.hdl, " mg/dL"));
    let _ = writeln!(w, "  • High Cholesterol: {}", yes_no(patient.highchol));
    let _ = writeln!(w, "  • Cholesterol Check: {}", yes_no(patient.cholcheck));
    let _ = writeln!(w);
    let _ = writeln!(
        w,
        "Triglycerides: {}",
        value(&patient.triglycerides, " mg/dL")
    );
    let _ = writeln!(w, "Glucose: {}", value(&patient.glucose, " mg/dL"));
    let _ = writeln!(w);

    let _ = writeln!(w, "LIFESTYLE FACTORS:");
    let _ = writeln!(w, "────────────────");
    let _ = writeln!(w, "Smoking Status: {}", value(&patient.smoking_status, ""));
    let _ = writeln!(w, "Smoker: {}", yes_no(patient.smoker));
    let _ = writeln!(
        w,
        "Alcohol Intake: {}",
        value(&patient.alcohol_intake, " units/week")
    );
    let _ = writeln!(
        w,
        "Heavy Alcohol Consumption: {}",
        yes_no(patient.hvyalcoholconsump)
    );
    let _ = writeln!(w);
    let _ = writeln!(w, "Physical Activity:");
    let _ = writeln!(
        w,
        "  • Activity Level: {}",
        value(&patient.physical_activity_level, "")
    );
    let _ = writeln!(
        w,
        "  • Physically Active: {}",
        yes_no(patient.physactivity)
    );
    let _ = writeln!(w);
    let _ = writeln!(w, "Diet:");
    let _ = writeln!(w, "  • Fruits: {}", value(&patient.fruits, " servings/day"));
    let _ = writeln!(
        w,
        "  • Vegetables: {}",
        value(&patient.veggies, " servings/day")
    );
    let _ = writeln!(w);
    let _ = writeln!(
        w,
        "Sleep Duration: {}",
        value(&patient.sleep_duration, " hours/night")
    );
    let _ = writeln!(w, "Salt Intake: {}", value(&patient.salt_intake, " g/day"));
    let _ = writeln!(w);

    let _ = writeln!(w, "HEALTH CONDITIONS:");
    let _ = writeln!(w, "────────────────");
    let _ = writeln!(w, "Diabetes: {}", yes_no(patient.diabetes));
    let _ = writeln!(w, "Stroke: {}", yes_no(patient.stroke));
    let _ = writeln!(
        w,
        "Heart Disease/Attack: {}",
        yes_no(patient.heartdiseaseorattack)
    );
    let _ = writeln!(w, "Difficulty Walking: {}", yes_no(patient.diffwalk));
    let _ = writeln!(w);
    let _ = writeln!(w, "Family History: {}", yes_no(patient.family_history));
    let _ = writeln!(w);

    let _ = writeln!(w, "MENTAL HEALTH:");
    let _ = writeln!(w, "─────────────");
    let _ = writeln!(w, "Stress Level: {}", value(&patient.stress_level, "/10"));
    let _ = writeln!(w, "Mental Health: {}", value(&patient.menthlth, "/30"));
    let _ = writeln!(w, "Physical Health: {}", value(&patient.physhlth, "/30"));
    let _ = writeln!(w, "General Health: {}", value(&patient.genhlth, "/5"));
    let _ = writeln!(w);

    let _ = writeln!(w, "CARDIAC ASSESSMENT:");
    let _ = writeln!(w, "─────────────────");
    let _ = writeln!(w, "Chest Pain: {}", value(&patient.chestpain, "/4"));
    let _ = writeln!(w, "Rest ECG: {}", value(&patient.restecg, "/2"));
    let _ = writeln!(w, "Exercise Angina: {}", value(&patient.exang, "/1"));
    let _ = writeln!(
        w,
        "ST Depression: {}",
        value(&patient.st_depression, " mm")
    );
    let _ = writeln!(w, "ST Slope: {}", value(&patient.st_slope, "/3"));
    let _ = writeln!(w, "Major Vessels: {}", value(&patient.majorvessels, "/3"));
    let _ = writeln!(w, "Thalassemia: {}", value(&patient.thalassemia, "/3"));
    let _ = writeln!(w);

    let _ = writeln!(w, "LIFESTYLE SCORE:");
    let _ = writeln!(w, "──────────────");
    let _ = writeln!(
        w,
        "Overall Lifestyle Score: {}",
        value(&patient.lifestylescore, "/100")
    );
    let _ = writeln!(w);

    let _ = writeln!(w, "{RULE}");
    let _ = writeln!(
        w,
        "Report Generated: {}",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = write!(w, "{RULE}");

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> DateTime<Utc> {
        "2026-03-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn empty_record_renders_the_sentinel_in_every_section() {
        let patient = PatientRecord::with_id("P-EMPTY");
        let report = generate_medical_report(&patient, at());

        assert!(report.contains("Patient ID: P-EMPTY"));
        assert!(report.contains("Gender: Not specified"));
        for section in [
            "PATIENT INFORMATION:",
            "VITAL SIGNS:",
            "LABORATORY VALUES:",
            "LIFESTYLE FACTORS:",
            "HEALTH CONDITIONS:",
            "MENTAL HEALTH:",
            "CARDIAC ASSESSMENT:",
            "LIFESTYLE SCORE:",
        ] {
            assert!(report.contains(section), "section {section} missing");
        }
        // All 43 optional fields (everything except id and gender) fall back
        // to the sentinel.
        assert_eq!(report.matches("Not recorded").count(), 43);
    }

    #[test]
    fn values_carry_their_unit_suffixes() {
        let mut patient = PatientRecord::with_id("P1");
        patient.age = Some(45.0);
        patient.bmi = Some(27.4);
        patient.restbp = Some(130.0);
        patient.highbp = Some(true);
        patient.diabetes = Some(false);
        let report = generate_medical_report(&patient, at());

        assert!(report.contains("Age: 45 years"));
        assert!(report.contains("BMI: 27.4 kg/m²"));
        assert!(report.contains("• Resting BP: 130 mmHg"));
        assert!(report.contains("• High BP: Yes"));
        assert!(report.contains("Diabetes: No"));
    }

    #[test]
    fn gender_code_is_closed() {
        let mut patient = PatientRecord::with_id("P1");
        patient.gender = Some(1);
        assert!(generate_medical_report(&patient, at()).contains("Gender: Male"));
        patient.gender = Some(0);
        assert!(generate_medical_report(&patient, at()).contains("Gender: Female"));
        patient.gender = Some(7);
        assert!(generate_medical_report(&patient, at()).contains("Gender: Not specified"));
    }

    #[test]
    fn output_is_deterministic_for_equal_inputs() {
        let mut patient = PatientRecord::with_id("P1");
        patient.name = Some("Ada".to_owned());
        patient.created_at = Some("2024-01-15T09:30:00+00:00".to_owned());
        let a = generate_medical_report(&patient, at());
        let b = generate_medical_report(&patient, at());
        assert_eq!(a, b);
        assert!(a.contains("Record Created: 2024-01-15"));
    }
}
