//! The insight record: a fixed-shape, fully-populated schema.
//!
//! Every leaf is a [`Finding`]; a fresh record has every leaf absent. Records
//! are built by folding sub-extractor [`Patch`]es into [`Findings`] and then
//! attaching [`Metadata`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::field::FieldPath;
use crate::finding::Finding;
use crate::patch::Patch;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientInfo {
    pub age: Finding,
    pub weight: Finding,
    pub height: Finding,
    pub gender: Finding,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medications {
    pub anticoagulants: Finding,
    pub insulin: Finding,
    pub cardiac_meds: Finding,
    pub other_relevant: Finding,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comorbidities {
    pub cardiac: Finding,
    pub pulmonary: Finding,
    pub renal: Finding,
    pub hepatic: Finding,
    pub neurologic: Finding,
    pub endocrine: Finding,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirwayAssessment {
    pub mallampati: Finding,
    pub mouth_opening: Finding,
    pub neck_mobility: Finding,
    pub thyromental_distance: Finding,
    pub dentition: Finding,
    pub predicted_difficulty: Finding,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaboratoryValues {
    pub hemoglobin: Finding,
    pub platelet_count: Finding,
    pub inr_pt_ptt: Finding,
    pub creatinine: Finding,
    pub glucose: Finding,
    pub electrolytes: Finding,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreOperative {
    pub asa_status: Finding,
    pub allergies: Finding,
    pub medications: Medications,
    pub comorbidities: Comorbidities,
    pub airway_assessment: AirwayAssessment,
    pub laboratory_values: LaboratoryValues,
    pub device_implants: Finding,
    pub npo_status: Finding,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurgicalPlan {
    pub procedure: Finding,
    pub surgical_position: Finding,
    pub estimated_duration: Finding,
    pub surgeon: Finding,
    pub approach: Finding,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntraOperative {
    pub special_monitoring: Finding,
    pub vascular_access: Finding,
    pub blood_products: Finding,
    pub regional_anesthesia: Finding,
    pub temperature_management: Finding,
    pub fluid_management: Finding,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostOperative {
    pub planned_disposition: Finding,
    pub pain_management: Finding,
    pub icu_monitoring: Finding,
    pub ventilator_weaning: Finding,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub aspiration_risk: Finding,
    pub difficult_airway: Finding,
    pub cardiac_risk: Finding,
    pub bleeding_risk: Finding,
}

/// All extracted sections, without metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Findings {
    pub patient_info: PatientInfo,
    pub pre_operative: PreOperative,
    pub surgical_plan: SurgicalPlan,
    pub intra_operative: IntraOperative,
    pub post_operative: PostOperative,
    pub risk_assessment: RiskAssessment,
}

impl Findings {
    /// Fold one sub-extractor patch into the findings.
    ///
    /// # Errors
    /// Fails if the patch writes a field owned by a different sub-extractor
    /// or a field that is already populated.
    pub fn apply(&mut self, patch: Patch) -> Result<()> {
        let source = patch.source();
        for (field, value) in patch.into_entries() {
            if field.owner() != source {
                return Err(Error::ForeignField {
                    extractor: source.as_str(),
                    field: field.as_str(),
                });
            }
            let slot = self.slot_mut(field);
            if slot.is_found() {
                return Err(Error::FieldConflict {
                    field: field.as_str(),
                });
            }
            *slot = Finding::found(value);
        }
        Ok(())
    }

    #[must_use]
    pub fn slot(&self, field: FieldPath) -> &Finding {
        let pre = &self.pre_operative;
        match field {
            FieldPath::Age => &self.patient_info.age,
            FieldPath::Weight => &self.patient_info.weight,
            FieldPath::Height => &self.patient_info.height,
            FieldPath::Gender => &self.patient_info.gender,
            FieldPath::AsaStatus => &pre.asa_status,
            FieldPath::Allergies => &pre.allergies,
            FieldPath::Anticoagulants => &pre.medications.anticoagulants,
            FieldPath::Insulin => &pre.medications.insulin,
            FieldPath::CardiacMeds => &pre.medications.cardiac_meds,
            FieldPath::OtherRelevantMeds => &pre.medications.other_relevant,
            FieldPath::CardiacComorbidity => &pre.comorbidities.cardiac,
            FieldPath::PulmonaryComorbidity => &pre.comorbidities.pulmonary,
            FieldPath::RenalComorbidity => &pre.comorbidities.renal,
            FieldPath::HepaticComorbidity => &pre.comorbidities.hepatic,
            FieldPath::NeurologicComorbidity => &pre.comorbidities.neurologic,
            FieldPath::EndocrineComorbidity => &pre.comorbidities.endocrine,
            FieldPath::Mallampati => &pre.airway_assessment.mallampati,
            FieldPath::MouthOpening => &pre.airway_assessment.mouth_opening,
            FieldPath::NeckMobility => &pre.airway_assessment.neck_mobility,
            FieldPath::ThyromentalDistance => &pre.airway_assessment.thyromental_distance,
            FieldPath::Dentition => &pre.airway_assessment.dentition,
            FieldPath::PredictedDifficulty => &pre.airway_assessment.predicted_difficulty,
            FieldPath::Hemoglobin => &pre.laboratory_values.hemoglobin,
            FieldPath::PlateletCount => &pre.laboratory_values.platelet_count,
            FieldPath::InrPtPtt => &pre.laboratory_values.inr_pt_ptt,
            FieldPath::Creatinine => &pre.laboratory_values.creatinine,
            FieldPath::Glucose => &pre.laboratory_values.glucose,
            FieldPath::Electrolytes => &pre.laboratory_values.electrolytes,
            FieldPath::DeviceImplants => &pre.device_implants,
            FieldPath::NpoStatus => &pre.npo_status,
            FieldPath::Procedure => &self.surgical_plan.procedure,
            FieldPath::SurgicalPosition => &self.surgical_plan.surgical_position,
            FieldPath::EstimatedDuration => &self.surgical_plan.estimated_duration,
            FieldPath::Surgeon => &self.surgical_plan.surgeon,
            FieldPath::Approach => &self.surgical_plan.approach,
            FieldPath::SpecialMonitoring => &self.intra_operative.special_monitoring,
            FieldPath::VascularAccess => &self.intra_operative.vascular_access,
            FieldPath::BloodProducts => &self.intra_operative.blood_products,
            FieldPath::RegionalAnesthesia => &self.intra_operative.regional_anesthesia,
            FieldPath::TemperatureManagement => &self.intra_operative.temperature_management,
            FieldPath::FluidManagement => &self.intra_operative.fluid_management,
            FieldPath::PlannedDisposition => &self.post_operative.planned_disposition,
            FieldPath::PainManagement => &self.post_operative.pain_management,
            FieldPath::IcuMonitoring => &self.post_operative.icu_monitoring,
            FieldPath::VentilatorWeaning => &self.post_operative.ventilator_weaning,
            FieldPath::AspirationRisk => &self.risk_assessment.aspiration_risk,
            FieldPath::DifficultAirway => &self.risk_assessment.difficult_airway,
            FieldPath::CardiacRisk => &self.risk_assessment.cardiac_risk,
            FieldPath::BleedingRisk => &self.risk_assessment.bleeding_risk,
        }
    }

    fn slot_mut(&mut self, field: FieldPath) -> &mut Finding {
        let pre = &mut self.pre_operative;
        match field {
            FieldPath::Age => &mut self.patient_info.age,
            FieldPath::Weight => &mut self.patient_info.weight,
            FieldPath::Height => &mut self.patient_info.height,
            FieldPath::Gender => &mut self.patient_info.gender,
            FieldPath::AsaStatus => &mut pre.asa_status,
            FieldPath::Allergies => &mut pre.allergies,
            FieldPath::Anticoagulants => &mut pre.medications.anticoagulants,
            FieldPath::Insulin => &mut pre.medications.insulin,
            FieldPath::CardiacMeds => &mut pre.medications.cardiac_meds,
            FieldPath::OtherRelevantMeds => &mut pre.medications.other_relevant,
            FieldPath::CardiacComorbidity => &mut pre.comorbidities.cardiac,
            FieldPath::PulmonaryComorbidity => &mut pre.comorbidities.pulmonary,
            FieldPath::RenalComorbidity => &mut pre.comorbidities.renal,
            FieldPath::HepaticComorbidity => &mut pre.comorbidities.hepatic,
            FieldPath::NeurologicComorbidity => &mut pre.comorbidities.neurologic,
            FieldPath::EndocrineComorbidity => &mut pre.comorbidities.endocrine,
            FieldPath::Mallampati => &mut pre.airway_assessment.mallampati,
            FieldPath::MouthOpening => &mut pre.airway_assessment.mouth_opening,
            FieldPath::NeckMobility => &mut pre.airway_assessment.neck_mobility,
            FieldPath::ThyromentalDistance => &mut pre.airway_assessment.thyromental_distance,
            FieldPath::Dentition => &mut pre.airway_assessment.dentition,
            FieldPath::PredictedDifficulty => &mut pre.airway_assessment.predicted_difficulty,
            FieldPath::Hemoglobin => &mut pre.laboratory_values.hemoglobin,
            FieldPath::PlateletCount => &mut pre.laboratory_values.platelet_count,
            FieldPath::InrPtPtt => &mut pre.laboratory_values.inr_pt_ptt,
            FieldPath::Creatinine => &mut pre.laboratory_values.creatinine,
            FieldPath::Glucose => &mut pre.laboratory_values.glucose,
            FieldPath::Electrolytes => &mut pre.laboratory_values.electrolytes,
            FieldPath::DeviceImplants => &mut pre.device_implants,
            FieldPath::NpoStatus => &mut pre.npo_status,
            FieldPath::Procedure => &mut self.surgical_plan.procedure,
            FieldPath::SurgicalPosition => &mut self.surgical_plan.surgical_position,
            FieldPath::EstimatedDuration => &mut self.surgical_plan.estimated_duration,
            FieldPath::Surgeon => &mut self.surgical_plan.surgeon,
            FieldPath::Approach => &mut self.surgical_plan.approach,
            FieldPath::SpecialMonitoring => &mut self.intra_operative.special_monitoring,
            FieldPath::VascularAccess => &mut self.intra_operative.vascular_access,
            FieldPath::BloodProducts => &mut self.intra_operative.blood_products,
            FieldPath::RegionalAnesthesia => &mut self.intra_operative.regional_anesthesia,
            FieldPath::TemperatureManagement => &mut self.intra_operative.temperature_management,
            FieldPath::FluidManagement => &mut self.intra_operative.fluid_management,
            FieldPath::PlannedDisposition => &mut self.post_operative.planned_disposition,
            FieldPath::PainManagement => &mut self.post_operative.pain_management,
            FieldPath::IcuMonitoring => &mut self.post_operative.icu_monitoring,
            FieldPath::VentilatorWeaning => &mut self.post_operative.ventilator_weaning,
            FieldPath::AspirationRisk => &mut self.risk_assessment.aspiration_risk,
            FieldPath::DifficultAirway => &mut self.risk_assessment.difficult_airway,
            FieldPath::CardiacRisk => &mut self.risk_assessment.cardiac_risk,
            FieldPath::BleedingRisk => &mut self.risk_assessment.bleeding_risk,
        }
    }
}

/// Processing metadata attached once all sub-extractors have run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub processed_timestamp: DateTime<Utc>,
    pub version: String,
    pub extraction_confidence: String,
    /// Where the text came from, e.g. an input file name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Metadata {
    #[must_use]
    pub fn new(processed_timestamp: DateTime<Utc>) -> Self {
        Self {
            processed_timestamp,
            version: crate::SCHEMA_VERSION.to_string(),
            extraction_confidence: crate::CONFIDENCE_NOTE.to_string(),
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// The complete output of one extraction call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightRecord {
    #[serde(flatten)]
    pub findings: Findings,
    pub metadata: Metadata,
}

impl InsightRecord {
    #[must_use]
    pub const fn new(findings: Findings, metadata: Metadata) -> Self {
        Self { findings, metadata }
    }

    /// Shorthand for `self.findings.slot(field)`.
    #[must_use]
    pub fn get(&self, field: FieldPath) -> &Finding {
        self.findings.slot(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::ExtractorKind;
    use chrono::TimeZone;

    #[test]
    fn test_fresh_findings_are_absent() {
        let findings = Findings::default();
        assert!(FieldPath::ALL.iter().all(|f| !findings.slot(*f).is_found()));
    }

    #[test]
    fn test_apply_writes_owned_fields() {
        let mut findings = Findings::default();
        let mut patch = Patch::new(ExtractorKind::Laboratory);
        patch.set(FieldPath::Hemoglobin, "11.8 g/dL");
        patch.set(FieldPath::Creatinine, "1.4 mg/dL");

        assert!(findings.apply(patch).is_ok());
        assert_eq!(
            findings.pre_operative.laboratory_values.hemoglobin.value(),
            Some("11.8 g/dL")
        );
        assert_eq!(findings.slot(FieldPath::Creatinine).value(), Some("1.4 mg/dL"));
    }

    #[test]
    fn test_apply_rejects_foreign_field() {
        let mut findings = Findings::default();
        let mut patch = Patch::new(ExtractorKind::Allergy);
        patch.set(FieldPath::AsaStatus, "ASA II");

        let result = findings.apply(patch);
        assert!(matches!(
            result,
            Err(Error::ForeignField {
                extractor: "allergy",
                ..
            })
        ));
        assert!(!findings.pre_operative.asa_status.is_found());
    }

    #[test]
    fn test_apply_rejects_second_write() {
        let mut findings = Findings::default();
        let mut first = Patch::new(ExtractorKind::Status);
        first.set(FieldPath::AsaStatus, "ASA II");
        let mut second = Patch::new(ExtractorKind::Status);
        second.set(FieldPath::AsaStatus, "ASA III");

        assert!(findings.apply(first).is_ok());
        assert!(matches!(
            findings.apply(second),
            Err(Error::FieldConflict { .. })
        ));
        assert_eq!(findings.pre_operative.asa_status.value(), Some("ASA II"));
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn test_record_serializes_every_leaf() {
        let ts = Utc
            .with_ymd_and_hms(2024, 5, 1, 8, 30, 0)
            .single()
            .expect("timestamp should be valid");
        let record = InsightRecord::new(Findings::default(), Metadata::new(ts));
        let value = serde_json::to_value(&record).expect("record should serialize");

        for field in FieldPath::ALL {
            let leaf = field
                .as_str()
                .split('.')
                .try_fold(&value, |node, key| node.get(key))
                .expect("every leaf should be present");
            assert_eq!(leaf, "Not Found", "{field}");
        }
        assert_eq!(value["metadata"]["version"], "1.0");
        assert!(value["metadata"].get("source").is_none());
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn test_record_round_trips_through_json() {
        let mut findings = Findings::default();
        let mut patch = Patch::new(ExtractorKind::Risk);
        patch.set(FieldPath::CardiacRisk, "High");
        findings.apply(patch).expect("patch should apply");

        let ts = Utc
            .with_ymd_and_hms(2024, 5, 1, 8, 30, 0)
            .single()
            .expect("timestamp should be valid");
        let record = InsightRecord::new(findings, Metadata::new(ts).with_source("a.txt"));
        let json = serde_json::to_string(&record).expect("record should serialize");
        let back: InsightRecord = serde_json::from_str(&json).expect("record should deserialize");

        assert_eq!(back, record);
        assert_eq!(back.get(FieldPath::CardiacRisk).value(), Some("High"));
    }
}
