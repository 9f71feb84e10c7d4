//! Integration tests for end-to-end record extraction.
//!
//! These tests verify that:
//! - Every leaf of the record is always present, with the sentinel when absent
//! - Extraction is deterministic for a fixed timestamp
//! - The individual sub-extractors pick up the documented phrasings

use chrono::{DateTime, TimeZone, Utc};
use periop_core::{FieldPath, InsightRecord, NOT_FOUND};
use periop_extract::InsightExtractor;

fn engine() -> InsightExtractor {
    InsightExtractor::with_defaults().expect("Default rules should compile")
}

fn fixed_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 14, 9, 26, 53)
        .single()
        .expect("Valid timestamp")
}

fn extract(text: &str) -> InsightRecord {
    engine()
        .extract_with_timestamp(text, fixed_timestamp())
        .expect("Extraction should succeed")
}

fn value(record: &InsightRecord, field: FieldPath) -> Option<String> {
    record.get(field).value().map(str::to_string)
}

const CHART: &str = "62 year old male. ASA III. NKDA. Medications: metoprolol, insulin glargine. \
History of hypertension, type 2 diabetes, chronic kidney disease. Hemoglobin 11.8, Creatinine 1.4.";

#[test]
fn test_empty_input_yields_sentinel_everywhere() {
    let record = extract("");
    let json = serde_json::to_value(&record).expect("Record should serialize");

    for field in FieldPath::ALL {
        let pointer = format!("/{}", field.as_str().replace('.', "/"));
        assert_eq!(
            json.pointer(&pointer).and_then(|v| v.as_str()),
            Some(NOT_FOUND),
            "{field}"
        );
    }

    assert_eq!(json["metadata"]["version"], "1.0");
    assert_eq!(
        json["metadata"]["extraction_confidence"],
        "Automated extraction - verify critical values"
    );
    assert!(json["metadata"].get("source").is_none());
}

#[test]
fn test_output_shape_is_fixed() {
    let sparse = serde_json::to_value(extract("")).expect("Record should serialize");
    let dense = serde_json::to_value(extract(CHART)).expect("Record should serialize");

    let keys = |v: &serde_json::Value| -> Vec<String> {
        v.as_object()
            .map(|o| o.keys().cloned().collect())
            .unwrap_or_default()
    };
    assert_eq!(keys(&sparse), keys(&dense));
    assert_eq!(
        keys(&sparse["pre_operative"]),
        keys(&dense["pre_operative"])
    );
}

#[test]
fn test_same_text_same_timestamp_is_byte_identical() {
    let first = serde_json::to_string(&extract(CHART)).expect("Record should serialize");
    let second = serde_json::to_string(&extract(CHART)).expect("Record should serialize");
    assert_eq!(first, second);
}

#[test]
fn test_timestamp_serializes_as_rfc3339() {
    let json = serde_json::to_value(extract("")).expect("Record should serialize");
    let stamp = json["metadata"]["processed_timestamp"]
        .as_str()
        .expect("Timestamp should be a string");
    assert!(stamp.starts_with("2024-03-14T09:26:53"));
    assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
}

#[test]
fn test_nkda_in_any_case() {
    for text in ["NKDA", "nkda", "Allergies: NKA", "Patient reports nKdA."] {
        let record = extract(text);
        assert_eq!(
            value(&record, FieldPath::Allergies).as_deref(),
            Some("NKDA (No Known Drug Allergies)"),
            "{text}"
        );
    }
}

#[test]
fn test_named_allergy_is_title_cased() {
    let record = extract("Allergies: penicillin (hives). Otherwise well.");
    assert_eq!(
        value(&record, FieldPath::Allergies).as_deref(),
        Some("Penicillin (Hives)")
    );
}

#[test]
fn test_asa_phrasings() {
    assert_eq!(
        value(&extract("ASA III"), FieldPath::AsaStatus).as_deref(),
        Some("ASA III")
    );
    assert_eq!(
        value(&extract("asa class 2"), FieldPath::AsaStatus).as_deref(),
        Some("ASA 2")
    );
    assert_eq!(
        value(&extract("ASA status: IV"), FieldPath::AsaStatus).as_deref(),
        Some("ASA IV")
    );
    assert_eq!(value(&extract("aspirin daily"), FieldPath::AsaStatus), None);
}

#[test]
fn test_asa_emergency_suffix_dropped() {
    assert_eq!(
        value(&extract("ASA 3E"), FieldPath::AsaStatus).as_deref(),
        Some("ASA 3")
    );
    assert_eq!(
        value(&extract("ASA IIIE emergency laparotomy"), FieldPath::AsaStatus).as_deref(),
        Some("ASA III")
    );
    assert_eq!(
        value(&extract("asa class 4e"), FieldPath::AsaStatus).as_deref(),
        Some("ASA 4")
    );
}

#[test]
fn test_weight_and_height_prefer_labelled_values() {
    let record = extract("Gained 3 kg last month. Weight: 82 kg. Height: 178 cm.");
    assert_eq!(
        value(&record, FieldPath::Weight).as_deref(),
        Some("weight: 82 kg")
    );
    assert_eq!(
        value(&record, FieldPath::Height).as_deref(),
        Some("height: 178 cm")
    );

    let bare = extract("Patient is 70 kg and 165 cm tall.");
    assert_eq!(value(&bare, FieldPath::Weight).as_deref(), Some("70 kg"));
    assert_eq!(value(&bare, FieldPath::Height).as_deref(), Some("165 cm"));
}

#[test]
fn test_female_mapping() {
    assert_eq!(
        value(&extract("Sex: F"), FieldPath::Gender).as_deref(),
        Some("Female")
    );
    assert_eq!(
        value(&extract("45 year old female"), FieldPath::Gender).as_deref(),
        Some("Female")
    );
}

#[test]
fn test_anticoagulants_and_bleeding_risk() {
    let record = extract("On warfarin and aspirin; history of thrombocytopenia.");
    assert_eq!(
        value(&record, FieldPath::Anticoagulants).as_deref(),
        Some("Warfarin, Aspirin")
    );
    assert_eq!(
        value(&record, FieldPath::BleedingRisk).as_deref(),
        Some("Elevated")
    );
}

#[test]
fn test_pulmonary_conditions() {
    let record = extract("COPD and obstructive sleep apnea, prior pneumonia.");
    assert_eq!(
        value(&record, FieldPath::PulmonaryComorbidity).as_deref(),
        Some("sleep apnea, pneumonia")
    );
}

#[test]
fn test_short_allergy_capture_falls_through() {
    let record = extract("Allergies: no. Allergic to: latex.");
    assert_eq!(value(&record, FieldPath::Allergies).as_deref(), Some("Latex"));
}

#[test]
fn test_short_procedure_capture_falls_through() {
    let record = extract("Procedure: ab. Scheduled for: knee arthroscopy.");
    assert_eq!(
        value(&record, FieldPath::Procedure).as_deref(),
        Some("Knee Arthroscopy")
    );
}

#[test]
fn test_reverse_trendelenburg_reports_trendelenburg() {
    let record = extract("Positioned in reverse Trendelenburg.");
    assert_eq!(
        value(&record, FieldPath::SurgicalPosition).as_deref(),
        Some("Trendelenburg")
    );
}

#[test]
fn test_keywords_match_inside_longer_words() {
    let record = extract("Bilateral knee replacement.");
    assert_eq!(
        value(&record, FieldPath::SurgicalPosition).as_deref(),
        Some("Lateral")
    );
}

#[test]
fn test_hemoglobin_with_unit() {
    let record = extract("Hemoglobin: 11.8");
    assert_eq!(
        value(&record, FieldPath::Hemoglobin).as_deref(),
        Some("11.8 g/dL")
    );
}

#[test]
fn test_lab_panel() {
    let record = extract("Labs: Hgb 13.2, Plt 210, INR 1.1, Cr 0.9");
    assert_eq!(
        value(&record, FieldPath::Hemoglobin).as_deref(),
        Some("13.2 g/dL")
    );
    assert_eq!(
        value(&record, FieldPath::PlateletCount).as_deref(),
        Some("210 K/uL")
    );
    assert_eq!(value(&record, FieldPath::InrPtPtt).as_deref(), Some("INR 1.1"));
    assert_eq!(
        value(&record, FieldPath::Creatinine).as_deref(),
        Some("0.9 mg/dL")
    );
}

#[test]
fn test_no_cardiac_terms_leaves_cardiac_fields_absent() {
    let record = extract("Healthy 30 year old for knee arthroscopy. NPO since midnight.");
    assert_eq!(value(&record, FieldPath::CardiacComorbidity), None);
    assert_eq!(value(&record, FieldPath::CardiacRisk), None);
}

#[test]
fn test_recent_mi_is_high_cardiac_risk() {
    let record = extract("History of hypertension and recent MI three weeks ago.");
    assert_eq!(value(&record, FieldPath::CardiacRisk).as_deref(), Some("High"));
    assert!(record.get(FieldPath::CardiacComorbidity).contains("hypertension"));
}

#[test]
fn test_cardiac_condition_is_moderate_risk() {
    let record = extract("Known atrial fibrillation, rate controlled.");
    assert_eq!(
        value(&record, FieldPath::CardiacRisk).as_deref(),
        Some("Moderate")
    );
}

#[test]
fn test_aspiration_tiers() {
    assert_eq!(
        value(&extract("NPO after midnight, GERD on omeprazole"), FieldPath::AspirationRisk)
            .as_deref(),
        Some("Elevated")
    );
    assert_eq!(
        value(&extract("NPO after midnight"), FieldPath::AspirationRisk).as_deref(),
        Some("Standard")
    );
}

#[test]
fn test_airway_assessment() {
    let record = extract("Airway: Mallampati class III, mouth opening 3 fingerbreadths, short neck.");
    assert_eq!(
        value(&record, FieldPath::Mallampati).as_deref(),
        Some("Class III")
    );
    assert_eq!(
        value(&record, FieldPath::MouthOpening).as_deref(),
        Some("mouth opening 3 fingerbreadths")
    );
    assert_eq!(
        value(&record, FieldPath::PredictedDifficulty).as_deref(),
        Some("Potentially difficult")
    );
}

#[test]
fn test_surgical_plan() {
    let record = extract("Procedure: laparoscopic cholecystectomy. Position supine. Estimated duration: 2 hours.");
    assert_eq!(
        value(&record, FieldPath::Procedure).as_deref(),
        Some("Laparoscopic Cholecystectomy")
    );
    assert_eq!(
        value(&record, FieldPath::SurgicalPosition).as_deref(),
        Some("Supine")
    );
    assert_eq!(
        value(&record, FieldPath::EstimatedDuration).as_deref(),
        Some("duration: 2 hours")
    );
}

#[test]
fn test_end_to_end_chart() {
    let record = extract(CHART);

    assert_eq!(value(&record, FieldPath::Age).as_deref(), Some("62 years"));
    assert_eq!(value(&record, FieldPath::Gender).as_deref(), Some("Male"));
    assert_eq!(value(&record, FieldPath::AsaStatus).as_deref(), Some("ASA III"));
    assert_eq!(
        value(&record, FieldPath::Allergies).as_deref(),
        Some("NKDA (No Known Drug Allergies)")
    );
    assert!(record.get(FieldPath::CardiacMeds).contains("Metoprolol"));
    assert!(record.get(FieldPath::Insulin).contains("Insulin"));
    assert!(record.get(FieldPath::CardiacComorbidity).contains("hypertension"));
    assert!(record.get(FieldPath::RenalComorbidity).contains("kidney disease"));
    assert!(record.get(FieldPath::EndocrineComorbidity).contains("diabetes"));
    assert_eq!(
        value(&record, FieldPath::Hemoglobin).as_deref(),
        Some("11.8 g/dL")
    );
    assert_eq!(
        value(&record, FieldPath::Creatinine).as_deref(),
        Some("1.4 mg/dL")
    );
    assert_eq!(
        value(&record, FieldPath::CardiacRisk).as_deref(),
        Some("Moderate")
    );

    // Fields with no rule stay absent.
    assert_eq!(value(&record, FieldPath::Surgeon), None);
    assert_eq!(value(&record, FieldPath::Glucose), None);
}
