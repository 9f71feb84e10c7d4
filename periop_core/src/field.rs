//! Addressing of record leaves.
//!
//! Every leaf of the insight record has exactly one `FieldPath`. The dotted
//! string form (`pre_operative.medications.insulin`) is what rule tables and
//! error messages use.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::patch::ExtractorKind;

/// A leaf of the insight record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldPath {
    // patient_info
    Age,
    Weight,
    Height,
    Gender,
    // pre_operative
    AsaStatus,
    Allergies,
    Anticoagulants,
    Insulin,
    CardiacMeds,
    OtherRelevantMeds,
    CardiacComorbidity,
    PulmonaryComorbidity,
    RenalComorbidity,
    HepaticComorbidity,
    NeurologicComorbidity,
    EndocrineComorbidity,
    Mallampati,
    MouthOpening,
    NeckMobility,
    ThyromentalDistance,
    Dentition,
    PredictedDifficulty,
    Hemoglobin,
    PlateletCount,
    InrPtPtt,
    Creatinine,
    Glucose,
    Electrolytes,
    DeviceImplants,
    NpoStatus,
    // surgical_plan
    Procedure,
    SurgicalPosition,
    EstimatedDuration,
    Surgeon,
    Approach,
    // intra_operative
    SpecialMonitoring,
    VascularAccess,
    BloodProducts,
    RegionalAnesthesia,
    TemperatureManagement,
    FluidManagement,
    // post_operative
    PlannedDisposition,
    PainManagement,
    IcuMonitoring,
    VentilatorWeaning,
    // risk_assessment
    AspirationRisk,
    DifficultAirway,
    CardiacRisk,
    BleedingRisk,
}

impl FieldPath {
    /// All leaves in schema order.
    pub const ALL: [Self; 49] = [
        Self::Age,
        Self::Weight,
        Self::Height,
        Self::Gender,
        Self::AsaStatus,
        Self::Allergies,
        Self::Anticoagulants,
        Self::Insulin,
        Self::CardiacMeds,
        Self::OtherRelevantMeds,
        Self::CardiacComorbidity,
        Self::PulmonaryComorbidity,
        Self::RenalComorbidity,
        Self::HepaticComorbidity,
        Self::NeurologicComorbidity,
        Self::EndocrineComorbidity,
        Self::Mallampati,
        Self::MouthOpening,
        Self::NeckMobility,
        Self::ThyromentalDistance,
        Self::Dentition,
        Self::PredictedDifficulty,
        Self::Hemoglobin,
        Self::PlateletCount,
        Self::InrPtPtt,
        Self::Creatinine,
        Self::Glucose,
        Self::Electrolytes,
        Self::DeviceImplants,
        Self::NpoStatus,
        Self::Procedure,
        Self::SurgicalPosition,
        Self::EstimatedDuration,
        Self::Surgeon,
        Self::Approach,
        Self::SpecialMonitoring,
        Self::VascularAccess,
        Self::BloodProducts,
        Self::RegionalAnesthesia,
        Self::TemperatureManagement,
        Self::FluidManagement,
        Self::PlannedDisposition,
        Self::PainManagement,
        Self::IcuMonitoring,
        Self::VentilatorWeaning,
        Self::AspirationRisk,
        Self::DifficultAirway,
        Self::CardiacRisk,
        Self::BleedingRisk,
    ];

    /// Dotted path of this leaf in the serialized record.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Age => "patient_info.age",
            Self::Weight => "patient_info.weight",
            Self::Height => "patient_info.height",
            Self::Gender => "patient_info.gender",
            Self::AsaStatus => "pre_operative.asa_status",
            Self::Allergies => "pre_operative.allergies",
            Self::Anticoagulants => "pre_operative.medications.anticoagulants",
            Self::Insulin => "pre_operative.medications.insulin",
            Self::CardiacMeds => "pre_operative.medications.cardiac_meds",
            Self::OtherRelevantMeds => "pre_operative.medications.other_relevant",
            Self::CardiacComorbidity => "pre_operative.comorbidities.cardiac",
            Self::PulmonaryComorbidity => "pre_operative.comorbidities.pulmonary",
            Self::RenalComorbidity => "pre_operative.comorbidities.renal",
            Self::HepaticComorbidity => "pre_operative.comorbidities.hepatic",
            Self::NeurologicComorbidity => "pre_operative.comorbidities.neurologic",
            Self::EndocrineComorbidity => "pre_operative.comorbidities.endocrine",
            Self::Mallampati => "pre_operative.airway_assessment.mallampati",
            Self::MouthOpening => "pre_operative.airway_assessment.mouth_opening",
            Self::NeckMobility => "pre_operative.airway_assessment.neck_mobility",
            Self::ThyromentalDistance => "pre_operative.airway_assessment.thyromental_distance",
            Self::Dentition => "pre_operative.airway_assessment.dentition",
            Self::PredictedDifficulty => "pre_operative.airway_assessment.predicted_difficulty",
            Self::Hemoglobin => "pre_operative.laboratory_values.hemoglobin",
            Self::PlateletCount => "pre_operative.laboratory_values.platelet_count",
            Self::InrPtPtt => "pre_operative.laboratory_values.inr_pt_ptt",
            Self::Creatinine => "pre_operative.laboratory_values.creatinine",
            Self::Glucose => "pre_operative.laboratory_values.glucose",
            Self::Electrolytes => "pre_operative.laboratory_values.electrolytes",
            Self::DeviceImplants => "pre_operative.device_implants",
            Self::NpoStatus => "pre_operative.npo_status",
            Self::Procedure => "surgical_plan.procedure",
            Self::SurgicalPosition => "surgical_plan.surgical_position",
            Self::EstimatedDuration => "surgical_plan.estimated_duration",
            Self::Surgeon => "surgical_plan.surgeon",
            Self::Approach => "surgical_plan.approach",
            Self::SpecialMonitoring => "intra_operative.special_monitoring",
            Self::VascularAccess => "intra_operative.vascular_access",
            Self::BloodProducts => "intra_operative.blood_products",
            Self::RegionalAnesthesia => "intra_operative.regional_anesthesia",
            Self::TemperatureManagement => "intra_operative.temperature_management",
            Self::FluidManagement => "intra_operative.fluid_management",
            Self::PlannedDisposition => "post_operative.planned_disposition",
            Self::PainManagement => "post_operative.pain_management",
            Self::IcuMonitoring => "post_operative.icu_monitoring",
            Self::VentilatorWeaning => "post_operative.ventilator_weaning",
            Self::AspirationRisk => "risk_assessment.aspiration_risk",
            Self::DifficultAirway => "risk_assessment.difficult_airway",
            Self::CardiacRisk => "risk_assessment.cardiac_risk",
            Self::BleedingRisk => "risk_assessment.bleeding_risk",
        }
    }

    /// The sub-extractor allowed to write this leaf.
    ///
    /// Leaves the default rule table never fills (intra/post-operative plans,
    /// implants, NPO status) still have an owner so custom rules can target
    /// them.
    #[must_use]
    pub const fn owner(&self) -> ExtractorKind {
        match self {
            Self::Age | Self::Weight | Self::Height | Self::Gender => ExtractorKind::Demographics,
            Self::AsaStatus | Self::DeviceImplants | Self::NpoStatus => ExtractorKind::Status,
            Self::Allergies => ExtractorKind::Allergy,
            Self::Anticoagulants | Self::Insulin | Self::CardiacMeds | Self::OtherRelevantMeds => {
                ExtractorKind::Medication
            }
            Self::CardiacComorbidity
            | Self::PulmonaryComorbidity
            | Self::RenalComorbidity
            | Self::HepaticComorbidity
            | Self::NeurologicComorbidity
            | Self::EndocrineComorbidity => ExtractorKind::Comorbidity,
            Self::Hemoglobin
            | Self::PlateletCount
            | Self::InrPtPtt
            | Self::Creatinine
            | Self::Glucose
            | Self::Electrolytes => ExtractorKind::Laboratory,
            Self::Procedure
            | Self::SurgicalPosition
            | Self::EstimatedDuration
            | Self::Surgeon
            | Self::Approach
            | Self::SpecialMonitoring
            | Self::VascularAccess
            | Self::BloodProducts
            | Self::RegionalAnesthesia
            | Self::TemperatureManagement
            | Self::FluidManagement
            | Self::PlannedDisposition
            | Self::PainManagement
            | Self::IcuMonitoring
            | Self::VentilatorWeaning => ExtractorKind::SurgicalPlan,
            Self::Mallampati
            | Self::MouthOpening
            | Self::NeckMobility
            | Self::ThyromentalDistance
            | Self::Dentition
            | Self::PredictedDifficulty => ExtractorKind::Airway,
            Self::AspirationRisk | Self::DifficultAirway | Self::CardiacRisk | Self::BleedingRisk => {
                ExtractorKind::Risk
            }
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|path| path.as_str() == s)
            .ok_or_else(|| Error::UnknownField(s.to_string()))
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
