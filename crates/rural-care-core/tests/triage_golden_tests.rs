//! Golden tests for vitals classification and insight text.
//!
//! These tests pin tiers and messages against known readings.

use proptest::prelude::*;
use rural_care_core::models::{Gender, Patient, VitalKind, VitalSigns};
use rural_care_core::triage::{
    classify, classify_named, generate_insight, InsightThresholds, Tier, VitalValue,
    EMERGENCY_MESSAGE, NORMAL_MESSAGE,
};

/// Classification case from the golden table.
struct GoldenCase {
    id: &'static str,
    vital: &'static str,
    value: VitalValue<'static>,
    expected: Tier,
}

fn get_golden_cases() -> Vec<GoldenCase> {
    use Tier::*;
    use VitalValue::{Number, Pressure};

    vec![
        GoldenCase { id: "bp-normal", vital: "bloodPressure", value: Pressure("120/80"), expected: Normal },
        GoldenCase { id: "bp-systolic-warning", vital: "bloodPressure", value: Pressure("140/80"), expected: Warning },
        GoldenCase { id: "bp-diastolic-warning", vital: "bloodPressure", value: Pressure("130/90"), expected: Warning },
        GoldenCase { id: "bp-systolic-emergency", vital: "bloodPressure", value: Pressure("160/90"), expected: Emergency },
        GoldenCase { id: "bp-diastolic-emergency", vital: "bloodPressure", value: Pressure("120/100"), expected: Emergency },
        GoldenCase { id: "bp-just-below-warning", vital: "bloodPressure", value: Pressure("139/89"), expected: Normal },
        GoldenCase { id: "bp-unreadable", vital: "bloodPressure", value: Pressure("n/a"), expected: Normal },
        GoldenCase { id: "bp-no-separator", vital: "bloodPressure", value: Pressure("165"), expected: Normal },
        GoldenCase { id: "bp-readable-half", vital: "bloodPressure", value: Pressure("165/x"), expected: Emergency },
        GoldenCase { id: "hr-normal", vital: "heartRate", value: Number(75.0), expected: Normal },
        GoldenCase { id: "hr-upper-bound-normal", vital: "heartRate", value: Number(90.0), expected: Normal },
        GoldenCase { id: "hr-warning-high", vital: "heartRate", value: Number(95.0), expected: Warning },
        GoldenCase { id: "hr-warning-low", vital: "heartRate", value: Number(55.0), expected: Warning },
        GoldenCase { id: "hr-emergency-high", vital: "heartRate", value: Number(101.0), expected: Emergency },
        GoldenCase { id: "hr-emergency-low", vital: "heartRate", value: Number(49.0), expected: Emergency },
        GoldenCase { id: "hr-at-100", vital: "heartRate", value: Number(100.0), expected: Warning },
        GoldenCase { id: "bs-normal", vital: "bloodSugar", value: Number(110.0), expected: Normal },
        GoldenCase { id: "bs-warning-high", vital: "bloodSugar", value: Number(170.0), expected: Warning },
        GoldenCase { id: "bs-warning-low", vital: "bloodSugar", value: Number(75.0), expected: Warning },
        GoldenCase { id: "bs-emergency-high", vital: "bloodSugar", value: Number(185.0), expected: Emergency },
        GoldenCase { id: "bs-emergency-low", vital: "bloodSugar", value: Number(65.0), expected: Emergency },
        GoldenCase { id: "temp-normal", vital: "temperature", value: Number(98.6), expected: Normal },
        GoldenCase { id: "temp-at-emergency-bound", vital: "temperature", value: Number(100.4), expected: Warning },
        GoldenCase { id: "temp-emergency", vital: "temperature", value: Number(100.5), expected: Emergency },
        GoldenCase { id: "temp-warning-low", vital: "temperature", value: Number(97.2), expected: Warning },
        GoldenCase { id: "temp-emergency-low", vital: "temperature", value: Number(96.9), expected: Emergency },
        GoldenCase { id: "o2-normal", vital: "oxygenSaturation", value: Number(97.0), expected: Normal },
        GoldenCase { id: "o2-at-warning-bound", vital: "oxygenSaturation", value: Number(95.0), expected: Normal },
        GoldenCase { id: "o2-warning", vital: "oxygenSaturation", value: Number(94.0), expected: Warning },
        GoldenCase { id: "o2-at-emergency-bound", vital: "oxygenSaturation", value: Number(92.0), expected: Warning },
        GoldenCase { id: "o2-emergency", vital: "oxygenSaturation", value: Number(91.0), expected: Emergency },
        GoldenCase { id: "unknown-vital", vital: "respiratoryRate", value: Number(400.0), expected: Normal },
    ]
}

#[test]
fn test_golden_cases() {
    for case in get_golden_cases() {
        assert_eq!(
            classify_named(case.vital, case.value),
            case.expected,
            "case {} failed",
            case.id
        );
    }
}

fn patient_with(vitals: VitalSigns, is_emergency: bool) -> Patient {
    let mut patient = Patient::new("Golden Patient".into(), 50, Gender::Female, "Ranchi".into());
    patient.vitals.push(vitals);
    patient.is_emergency = is_emergency;
    patient
}

fn reading(bp: &str, blood_sugar: u32, oxygen: u32) -> VitalSigns {
    VitalSigns {
        blood_pressure: bp.into(),
        heart_rate: 75,
        blood_sugar,
        temperature: 98.6,
        oxygen_saturation: oxygen,
    }
}

#[test]
fn test_golden_insights() {
    let thresholds = InsightThresholds::default();
    let cases: Vec<(&str, VitalSigns, bool, String)> = vec![
        (
            "flag-wins",
            reading("120/80", 100, 99),
            true,
            EMERGENCY_MESSAGE.to_string(),
        ),
        (
            "pressure-first",
            reading("145/95", 185, 90),
            false,
            "Blood pressure (145/95) is elevated. Consider lifestyle modifications or medication adjustment if this is a consistent pattern.".to_string(),
        ),
        (
            "pressure-at-gate",
            reading("140/90", 150, 97),
            false,
            "Blood sugar reading (150 mg/dL) is above target range. Recommend dietary counseling and monitoring for symptoms of hyperglycemia.".to_string(),
        ),
        (
            "low-oxygen",
            reading("120/80", 140, 94),
            false,
            "Oxygen saturation (94%) is below optimal levels. Consider respiratory assessment and monitoring for symptoms of respiratory distress.".to_string(),
        ),
        (
            "all-normal",
            reading("120/80", 110, 97),
            false,
            NORMAL_MESSAGE.to_string(),
        ),
        (
            "unreadable-pressure-skipped",
            reading("high", 110, 95),
            false,
            NORMAL_MESSAGE.to_string(),
        ),
    ];

    for (id, vitals, is_emergency, expected) in cases {
        let patient = patient_with(vitals, is_emergency);
        assert_eq!(
            generate_insight(&patient, &thresholds).unwrap(),
            expected,
            "case {} failed",
            id
        );
    }
}

#[test]
fn test_insight_gate_differs_from_tier() {
    // Warning tier at 140 systolic, but the insight gate is strictly above 140
    let vitals = reading("140/85", 110, 97);
    assert_eq!(
        classify(VitalKind::BloodPressure, VitalValue::Pressure("140/85")),
        Tier::Warning
    );
    let patient = patient_with(vitals, false);
    assert_eq!(
        generate_insight(&patient, &InsightThresholds::default()).unwrap(),
        NORMAL_MESSAGE
    );
}

proptest! {
    #[test]
    fn prop_oxygen_tiers_monotonic(a in 0u32..=100, b in 0u32..=100) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let tier_low = classify(VitalKind::OxygenSaturation, VitalValue::from(low));
        let tier_high = classify(VitalKind::OxygenSaturation, VitalValue::from(high));
        prop_assert!(tier_low >= tier_high);
    }

    #[test]
    fn prop_pressure_tier_matches_worse_half(sys in 1u32..260, dia in 1u32..160) {
        let raw = format!("{}/{}", sys, dia);
        let tier = classify(VitalKind::BloodPressure, VitalValue::Pressure(&raw));
        let expected = if sys >= 160 || dia >= 100 {
            Tier::Emergency
        } else if sys >= 140 || dia >= 90 {
            Tier::Warning
        } else {
            Tier::Normal
        };
        prop_assert_eq!(tier, expected);
    }

    #[test]
    fn prop_heart_rate_normal_band(rate in 60u32..=90) {
        prop_assert_eq!(classify(VitalKind::HeartRate, VitalValue::from(rate)), Tier::Normal);
    }

    #[test]
    fn prop_classify_never_panics(name in "[a-zA-Z]{0,20}", raw in ".{0,12}") {
        let _ = classify_named(&name, VitalValue::Pressure(&raw));
    }
}
