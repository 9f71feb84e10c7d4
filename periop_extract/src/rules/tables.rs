//! Default rule table for anesthesia pre-operative extraction.
//!
//! Keyword lists are compared verbatim, by substring, against the lower-cased
//! text. Short terms also hit inside longer words (`lateral` in `bilateral`),
//! and the upper-case acronyms (`CAD`, `MI`, `COPD`, ...) never hit on the
//! lower-cased view at all.

use periop_core::{FieldPath, TextView};

use super::{Collect, FormatDef, RuleDef, Transform};

pub const ANTICOAGULANTS: &[&str] = &[
    "warfarin",
    "coumadin",
    "heparin",
    "rivaroxaban",
    "xarelto",
    "apixaban",
    "eliquis",
    "dabigatran",
    "pradaxa",
    "aspirin",
    "plavix",
    "clopidogrel",
];

pub const DIABETES_AGENTS: &[&str] = &["insulin", "metformin", "glipizide", "glyburide"];

pub const CARDIAC_MEDICATIONS: &[&str] = &[
    "beta blocker",
    "ace inhibitor",
    "lisinopril",
    "metoprolol",
    "atenolol",
    "amlodipine",
];

/// Shared by the comorbidity classifier and the moderate cardiac-risk tier.
pub const CARDIAC_CONDITIONS: &[&str] = &[
    "hypertension",
    "CAD",
    "coronary artery disease",
    "MI",
    "myocardial infarction",
    "CHF",
    "heart failure",
    "arrhythmia",
    "atrial fibrillation",
    "valve disease",
];

pub const PULMONARY_CONDITIONS: &[&str] = &[
    "COPD",
    "asthma",
    "sleep apnea",
    "OSA",
    "pulmonary embolism",
    "pneumonia",
    "lung disease",
];

pub const RENAL_CONDITIONS: &[&str] = &[
    "chronic kidney disease",
    "CKD",
    "renal failure",
    "dialysis",
    "kidney disease",
];

pub const ENDOCRINE_TERMS: &[&str] = &["diabetes", "DM", "insulin", "metformin", "diabetic"];

/// Ordered; `trendelenburg` precedes `reverse trendelenburg`, so the latter
/// is reported as plain Trendelenburg.
pub const SURGICAL_POSITIONS: &[&str] = &[
    "supine",
    "prone",
    "lateral",
    "lithotomy",
    "trendelenburg",
    "reverse trendelenburg",
    "sitting",
    "beach chair",
];

pub const AIRWAY_DIFFICULTY_PREDICTORS: &[&str] = &[
    "difficult airway",
    "difficult intubation",
    "short neck",
    "limited neck mobility",
];

pub const ASPIRATION_RISK_TERMS: &[&str] = &[
    "not npo",
    "recent meal",
    "full stomach",
    "gastroparesis",
    "gerd",
];

pub const FASTING_TERMS: &[&str] = &["npo", "fasting"];

pub const HIGH_CARDIAC_RISK_TERMS: &[&str] = &[
    "recent mi",
    "unstable angina",
    "severe aortic stenosis",
    "decompensated chf",
];

pub const BLEEDING_RISK_TERMS: &[&str] = &["anticoagulant", "bleeding disorder", "thrombocytopenia"];

pub const NKDA_TERMS: &[&str] = &["nkda", "nka"];

pub const NKDA: &str = "NKDA (No Known Drug Allergies)";

/// Default rule set, grouped by sub-extractor in engine order.
#[must_use]
pub fn default_rules() -> Vec<RuleDef> {
    let mut rules = Vec::new();
    rules.extend(demographics_rules());
    rules.extend(status_rules());
    rules.extend(allergy_rules());
    rules.extend(medication_rules());
    rules.extend(comorbidity_rules());
    rules.extend(laboratory_rules());
    rules.extend(surgical_plan_rules());
    rules.extend(airway_rules());
    rules.extend(risk_rules());
    rules
}

/// Age, weight, height and gender. Within a field the more explicit
/// (labelled) pattern outranks the bare one.
fn demographics_rules() -> Vec<RuleDef> {
    let whole_span = || FormatDef::template("$0");
    let gender = || FormatDef::lookup(&[("male", "Male"), ("m", "Male")], Some("Female"));

    vec![
        RuleDef::regex(
            "age_years_old",
            FieldPath::Age,
            r"(\d+)[-\s]?(?:year|yr|yo)\s?(?:old)?",
        )
        .with_priority(30)
        .with_format(FormatDef::template("$1 years")),
        RuleDef::regex("age_label", FieldPath::Age, r"age:?\s*(\d+)")
            .with_priority(20)
            .with_format(FormatDef::template("$1 years")),
        RuleDef::regex("age_yo", FieldPath::Age, r"(\d+)\s?y\.?o\.?")
            .with_priority(10)
            .with_format(FormatDef::template("$1 years")),
        RuleDef::regex(
            "weight_label",
            FieldPath::Weight,
            r"weight:?\s*(\d+\.?\d*)\s*(?:kg|pounds?|lbs?)",
        )
        .with_priority(20)
        .with_format(whole_span()),
        RuleDef::regex(
            "weight_unit",
            FieldPath::Weight,
            r"(\d+\.?\d*)\s*(?:kg|pounds?|lbs?)",
        )
        .with_priority(10)
        .with_format(whole_span()),
        RuleDef::regex(
            "height_label",
            FieldPath::Height,
            r"height:?\s*(\d+\.?\d*)\s*(?:cm|inches?|in|ft)",
        )
        .with_priority(20)
        .with_format(whole_span()),
        RuleDef::regex(
            "height_unit",
            FieldPath::Height,
            r"(\d+\.?\d*)\s*(?:cm|inches?|in)",
        )
        .with_priority(10)
        .with_format(whole_span()),
        RuleDef::regex(
            "gender_label",
            FieldPath::Gender,
            r"(?:gender|sex):?\s*(male|female|m|f)",
        )
        .with_priority(20)
        .with_format(gender()),
        RuleDef::regex("gender_word", FieldPath::Gender, r"\b(male|female)\b")
            .with_priority(10)
            .with_format(gender()),
    ]
}

/// ASA physical status. Runs on the upper-cased text so roman numerals and
/// labels match regardless of how they were typed. The emergency suffix
/// (`ASA 3E`) is accepted and left out of the value.
fn status_rules() -> Vec<RuleDef> {
    let asa = || FormatDef::template("ASA $1");

    vec![
        RuleDef::regex(
            "asa_labelled",
            FieldPath::AsaStatus,
            r"\bASA\s*(?:CLASSIFICATION|STATUS|CLASS)\s*:?\s*([IV1-6]+)E?\b",
        )
        .with_priority(30)
        .with_view(TextView::Upper)
        .with_format(asa()),
        RuleDef::regex("asa_bare", FieldPath::AsaStatus, r"\bASA\s*:?\s*([IV1-6]+)E?\b")
            .with_priority(20)
            .with_view(TextView::Upper)
            .with_format(asa()),
        RuleDef::regex(
            "asa_long_form",
            FieldPath::AsaStatus,
            r"AMERICAN SOCIETY.*?\b([IV1-6]+)E?\b",
        )
        .with_priority(10)
        .with_view(TextView::Upper)
        .with_format(asa()),
    ]
}

/// NKDA outranks everything; otherwise the first labelled span longer than
/// two characters.
fn allergy_rules() -> Vec<RuleDef> {
    let span = || {
        FormatDef::template("$1")
            .with_transform(Transform::Title)
            .with_min_len(3)
    };

    vec![
        RuleDef::keywords("allergy_nkda", FieldPath::Allergies, NKDA_TERMS, Collect::First)
            .with_priority(100)
            .with_format(FormatDef::fixed(NKDA)),
        RuleDef::regex(
            "allergy_allergies",
            FieldPath::Allergies,
            r"allergies?:?\s*([^.\n]+)",
        )
        .with_priority(30)
        .with_format(span()),
        RuleDef::regex(
            "allergy_allergic_to",
            FieldPath::Allergies,
            r"allergic to:?\s*([^.\n]+)",
        )
        .with_priority(20)
        .with_format(span()),
        RuleDef::regex("allergy_allergy", FieldPath::Allergies, r"allergy:?\s*([^.\n]+)")
            .with_priority(10)
            .with_format(span()),
    ]
}

fn medication_rules() -> Vec<RuleDef> {
    let title = || FormatDef::template("$0").with_transform(Transform::Title);

    vec![
        RuleDef::keywords(
            "meds_anticoagulants",
            FieldPath::Anticoagulants,
            ANTICOAGULANTS,
            Collect::All,
        )
        .with_format(title()),
        RuleDef::keywords(
            "meds_diabetes",
            FieldPath::Insulin,
            DIABETES_AGENTS,
            Collect::All,
        )
        .with_format(title()),
        RuleDef::keywords(
            "meds_cardiac",
            FieldPath::CardiacMeds,
            CARDIAC_MEDICATIONS,
            Collect::All,
        )
        .with_format(title()),
    ]
}

fn comorbidity_rules() -> Vec<RuleDef> {
    vec![
        RuleDef::keywords(
            "comorbid_cardiac",
            FieldPath::CardiacComorbidity,
            CARDIAC_CONDITIONS,
            Collect::All,
        ),
        RuleDef::keywords(
            "comorbid_pulmonary",
            FieldPath::PulmonaryComorbidity,
            PULMONARY_CONDITIONS,
            Collect::All,
        ),
        RuleDef::keywords(
            "comorbid_renal",
            FieldPath::RenalComorbidity,
            RENAL_CONDITIONS,
            Collect::All,
        ),
        RuleDef::keywords(
            "comorbid_endocrine",
            FieldPath::EndocrineComorbidity,
            ENDOCRINE_TERMS,
            Collect::All,
        ),
    ]
}

fn laboratory_rules() -> Vec<RuleDef> {
    vec![
        RuleDef::regex(
            "lab_hemoglobin",
            FieldPath::Hemoglobin,
            r"(?:hemoglobin|hgb|hb):?\s*(\d+\.?\d*)",
        )
        .with_format(FormatDef::template("$1 g/dL")),
        RuleDef::regex(
            "lab_platelets",
            FieldPath::PlateletCount,
            r"(?:platelets?|plt):?\s*(\d+)",
        )
        .with_format(FormatDef::template("$1 K/uL")),
        RuleDef::regex("lab_inr", FieldPath::InrPtPtt, r"inr:?\s*(\d+\.?\d*)")
            .with_format(FormatDef::template("INR $1")),
        RuleDef::regex(
            "lab_creatinine",
            FieldPath::Creatinine,
            r"(?:creatinine|cr):?\s*(\d+\.?\d*)",
        )
        .with_format(FormatDef::template("$1 mg/dL")),
    ]
}

fn surgical_plan_rules() -> Vec<RuleDef> {
    let procedure = || {
        FormatDef::template("$1")
            .with_transform(Transform::Title)
            .with_min_len(4)
    };

    vec![
        RuleDef::regex(
            "procedure_label",
            FieldPath::Procedure,
            r"(?:procedure|surgery|operation):?\s*([^.\n]+)",
        )
        .with_priority(30)
        .with_format(procedure()),
        RuleDef::regex(
            "procedure_scheduled",
            FieldPath::Procedure,
            r"scheduled for:?\s*([^.\n]+)",
        )
        .with_priority(20)
        .with_format(procedure()),
        RuleDef::regex(
            "procedure_undergoing",
            FieldPath::Procedure,
            r"undergoing:?\s*([^.\n]+)",
        )
        .with_priority(10)
        .with_format(procedure()),
        RuleDef::keywords(
            "surgical_position",
            FieldPath::SurgicalPosition,
            SURGICAL_POSITIONS,
            Collect::First,
        )
        .with_format(FormatDef::template("$0").with_transform(Transform::Title)),
        RuleDef::regex(
            "estimated_duration",
            FieldPath::EstimatedDuration,
            r"(?:duration|time):?\s*(\d+\.?\d*)\s*(?:hours?|hrs?|minutes?|mins?)",
        )
        .with_format(FormatDef::template("$0")),
    ]
}

fn airway_rules() -> Vec<RuleDef> {
    vec![
        RuleDef::regex(
            "mallampati",
            FieldPath::Mallampati,
            r"mallampati(?:\s+class)?:?\s*(iv|i{1,3}|[1-4])\b",
        )
        .with_format(FormatDef::template("Class $1").with_transform(Transform::Upper)),
        RuleDef::regex(
            "mouth_opening",
            FieldPath::MouthOpening,
            r"mouth opening:?\s*(\d+\.?\d*)\s*(?:cm|fingerbreadths?)",
        )
        .with_format(FormatDef::template("$0")),
        RuleDef::keywords(
            "airway_predictors",
            FieldPath::PredictedDifficulty,
            AIRWAY_DIFFICULTY_PREDICTORS,
            Collect::First,
        )
        .with_format(FormatDef::fixed("Potentially difficult")),
    ]
}

/// Each risk is an else-if cascade: the higher tier carries the higher
/// priority and the first tier that hits is kept.
fn risk_rules() -> Vec<RuleDef> {
    vec![
        RuleDef::keywords(
            "aspiration_elevated",
            FieldPath::AspirationRisk,
            ASPIRATION_RISK_TERMS,
            Collect::First,
        )
        .with_priority(20)
        .with_format(FormatDef::fixed("Elevated")),
        RuleDef::keywords(
            "aspiration_standard",
            FieldPath::AspirationRisk,
            FASTING_TERMS,
            Collect::First,
        )
        .with_priority(10)
        .with_format(FormatDef::fixed("Standard")),
        RuleDef::keywords(
            "cardiac_high",
            FieldPath::CardiacRisk,
            HIGH_CARDIAC_RISK_TERMS,
            Collect::First,
        )
        .with_priority(20)
        .with_format(FormatDef::fixed("High")),
        RuleDef::keywords(
            "cardiac_moderate",
            FieldPath::CardiacRisk,
            CARDIAC_CONDITIONS,
            Collect::First,
        )
        .with_priority(10)
        .with_format(FormatDef::fixed("Moderate")),
        RuleDef::keywords(
            "bleeding_elevated",
            FieldPath::BleedingRisk,
            BLEEDING_RISK_TERMS,
            Collect::First,
        )
        .with_format(FormatDef::fixed("Elevated")),
    ]
}
