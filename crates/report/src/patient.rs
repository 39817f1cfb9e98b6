//! Patient row schema as served by the external patient store.
//!
//! The store is a wide flat table; every column other than `patient_id` may be
//! null. Columns this schema does not know about are captured in `extra` so a
//! fetched row can be echoed back to API clients without loss.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One patient row, consumed read-only.
///
/// Numeric vitals and labs are kept as `f64` (the store serves them as JSON
/// numbers); coded categories such as `gender` or `chestpain` are small
/// integers; condition flags are booleans. Out-of-range values are not
/// validated here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: String,

    // Demographics
    pub name: Option<String>,
    pub age: Option<f64>,
    /// Coded 1 = male, 0 = female; any other value renders as "Not specified".
    pub gender: Option<i64>,
    pub bmi: Option<f64>,
    pub created_at: Option<String>,

    // Vital signs
    pub restbp: Option<f64>,
    pub systolic_bp: Option<f64>,
    pub diastolic_bp: Option<f64>,
    pub highbp: Option<bool>,
    pub heart_rate: Option<f64>,

    // Laboratory values
    pub cholesterol: Option<f64>,
    pub ldl: Option<f64>,
    pub hdl: Option<f64>,
    pub highchol: Option<bool>,
    pub cholcheck: Option<bool>,
    pub triglycerides: Option<f64>,
    pub glucose: Option<f64>,

    // Lifestyle factors
    pub smoking_status: Option<String>,
    pub smoker: Option<bool>,
    pub alcohol_intake: Option<f64>,
    pub hvyalcoholconsump: Option<bool>,
    pub physical_activity_level: Option<String>,
    pub physactivity: Option<bool>,
    pub fruits: Option<f64>,
    pub veggies: Option<f64>,
    pub sleep_duration: Option<f64>,
    pub salt_intake: Option<f64>,

    // Health conditions
    pub diabetes: Option<bool>,
    pub stroke: Option<bool>,
    pub heartdiseaseorattack: Option<bool>,
    pub diffwalk: Option<bool>,
    pub family_history: Option<bool>,

    // Mental health
    pub stress_level: Option<f64>,
    pub menthlth: Option<f64>,
    pub physhlth: Option<f64>,
    pub genhlth: Option<f64>,

    // Cardiac assessment
    pub chestpain: Option<i64>,
    pub restecg: Option<i64>,
    pub exang: Option<i64>,
    pub st_depression: Option<f64>,
    pub st_slope: Option<i64>,
    pub majorvessels: Option<i64>,
    pub thalassemia: Option<i64>,

    pub lifestylescore: Option<f64>,

    /// Columns not modelled above, preserved verbatim for echoing the row back.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl PatientRecord {
    /// A record carrying only an id, with every optional field absent.
    pub fn with_id(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_columns_round_trip() {
        let row = serde_json::json!({
            "patient_id": "P1",
            "age": 52,
            "some_new_column": "kept",
        });
        let record: PatientRecord = serde_json::from_value(row).unwrap();
        assert_eq!(record.age, Some(52.0));
        assert_eq!(
            record.extra.get("some_new_column"),
            Some(&serde_json::Value::String("kept".to_owned()))
        );

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["some_new_column"], "kept");
    }
}
