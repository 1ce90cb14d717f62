//! Synthesized reading history for trend charts.
//!
//! Each chart date gets one multiplier drawn from [0.9, 1.1] that scales
//! every field of the patient's latest reading. The randomness is injected
//! through [`JitterSource`] so series can be pinned in tests.

use std::str::FromStr;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::models::{BloodPressure, HistoricalReading, Patient, VitalSigns};

/// Lowest multiplier a random source may produce.
pub const JITTER_MIN: f64 = 0.9;
/// Highest multiplier a random source may produce.
pub const JITTER_MAX: f64 = 1.1;

/// Oxygen saturation never charts above this.
pub const MAX_CHARTED_OXYGEN: u32 = 99;

/// Source of per-date scale factors.
pub trait JitterSource {
    fn next_multiplier(&mut self) -> f64;
}

/// Uniform multipliers from the closed interval [`JITTER_MIN`, `JITTER_MAX`].
pub struct RandomJitter<R> {
    rng: R,
}

impl<R: Rng> RandomJitter<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomJitter<StdRng> {
    /// Reproducible jitter for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> JitterSource for RandomJitter<R> {
    fn next_multiplier(&mut self) -> f64 {
        self.rng.gen_range(JITTER_MIN..=JITTER_MAX)
    }
}

/// The same multiplier for every date.
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn next_multiplier(&mut self) -> f64 {
        self.0
    }
}

/// Build one reading per date, anchored on the patient's latest vitals.
///
/// Patients without readings are anchored on `fallback` instead.
pub fn synthesize_history<J: JitterSource>(
    patient: &Patient,
    dates: &[NaiveDate],
    fallback: &VitalSigns,
    jitter: &mut J,
) -> Vec<HistoricalReading> {
    let anchor = patient.latest_vitals().unwrap_or(fallback);
    debug!(
        patient_id = %patient.id,
        points = dates.len(),
        anchored_on_fallback = !patient.has_vitals(),
        "synthesizing vitals history"
    );

    dates
        .iter()
        .map(|&date| HistoricalReading {
            date,
            vitals: scale_reading(anchor, jitter.next_multiplier()),
        })
        .collect()
}

/// Scale every field of a reading by one multiplier.
///
/// Integer fields round half away from zero, temperature keeps one decimal
/// and oxygen is capped at [`MAX_CHARTED_OXYGEN`]. A blood pressure that
/// does not parse is carried through unchanged.
pub fn scale_reading(vitals: &VitalSigns, multiplier: f64) -> VitalSigns {
    let blood_pressure = match BloodPressure::from_str(&vitals.blood_pressure) {
        Ok(bp) => format!(
            "{}/{}",
            scale_count(bp.systolic, multiplier),
            scale_count(bp.diastolic, multiplier)
        ),
        Err(_) => vitals.blood_pressure.clone(),
    };

    VitalSigns {
        blood_pressure,
        heart_rate: scale_count(vitals.heart_rate, multiplier),
        blood_sugar: scale_count(vitals.blood_sugar, multiplier),
        temperature: (vitals.temperature * multiplier * 10.0).round() / 10.0,
        oxygen_saturation: scale_count(vitals.oxygen_saturation, multiplier)
            .min(MAX_CHARTED_OXYGEN),
    }
}

fn scale_count(value: u32, multiplier: f64) -> u32 {
    (f64::from(value) * multiplier).round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;

    struct SequenceJitter(Vec<f64>);

    impl JitterSource for SequenceJitter {
        fn next_multiplier(&mut self) -> f64 {
            self.0.remove(0)
        }
    }

    fn dates() -> Vec<NaiveDate> {
        ["2025-03-10", "2025-03-17", "2025-03-24", "2025-03-31"]
            .iter()
            .map(|d| d.parse().unwrap())
            .collect()
    }

    fn patient_with(vitals: VitalSigns) -> Patient {
        let mut patient = Patient::new("Test Patient".into(), 40, Gender::Other, "Ranchi".into());
        patient.vitals.push(vitals);
        patient
    }

    fn latest() -> VitalSigns {
        VitalSigns {
            blood_pressure: "145/95".into(),
            heart_rate: 82,
            blood_sugar: 185,
            temperature: 98.8,
            oxygen_saturation: 95,
        }
    }

    #[test]
    fn test_unit_multiplier_reproduces_latest() {
        let patient = patient_with(latest());
        let history =
            synthesize_history(&patient, &dates(), &VitalSigns::default(), &mut FixedJitter(1.0));

        assert_eq!(history.len(), 4);
        for (reading, date) in history.iter().zip(dates()) {
            assert_eq!(reading.date, date);
            assert_eq!(reading.vitals, latest());
        }
    }

    #[test]
    fn test_oxygen_clamped() {
        let vitals = VitalSigns {
            oxygen_saturation: 100,
            ..latest()
        };
        assert_eq!(scale_reading(&vitals, 1.0).oxygen_saturation, 99);
        assert_eq!(scale_reading(&latest(), 1.1).oxygen_saturation, 99);
        assert_eq!(scale_reading(&latest(), 0.9).oxygen_saturation, 86);
    }

    #[test]
    fn test_one_multiplier_per_date() {
        let patient = patient_with(latest());
        let mut jitter = SequenceJitter(vec![0.9, 1.1, 1.0, 0.95]);
        let history = synthesize_history(&patient, &dates(), &VitalSigns::default(), &mut jitter);

        let first = &history[0].vitals;
        assert_eq!(first.blood_pressure, "131/86"); // 130.5 -> 131, 85.5 -> 86
        assert_eq!(first.heart_rate, 74); // 73.8
        assert_eq!(first.blood_sugar, 167); // 166.5
        assert_eq!(first.temperature, 88.9); // 88.92
        assert_eq!(first.oxygen_saturation, 86); // 85.5

        let second = &history[1].vitals;
        assert_eq!(second.blood_pressure, "160/105"); // 159.5, 104.5
        assert_eq!(second.heart_rate, 90); // 90.2
        assert_eq!(second.temperature, 108.7); // 108.68
    }

    #[test]
    fn test_fallback_when_no_vitals() {
        let patient = Patient::new("New".into(), 30, Gender::Female, "Ranchi".into());
        let history =
            synthesize_history(&patient, &dates(), &VitalSigns::default(), &mut FixedJitter(1.0));
        assert!(history.iter().all(|r| r.vitals == VitalSigns::default()));
    }

    #[test]
    fn test_unparsable_pressure_carried_through() {
        let vitals = VitalSigns {
            blood_pressure: "n/a".into(),
            ..latest()
        };
        assert_eq!(scale_reading(&vitals, 1.05).blood_pressure, "n/a");
    }

    #[test]
    fn test_seeded_jitter_reproducible_and_bounded() {
        let patient = patient_with(latest());
        let a = synthesize_history(&patient, &dates(), &VitalSigns::default(), &mut RandomJitter::seeded(7));
        let b = synthesize_history(&patient, &dates(), &VitalSigns::default(), &mut RandomJitter::seeded(7));
        assert_eq!(a, b);

        let mut jitter = RandomJitter::seeded(42);
        for _ in 0..1000 {
            let m = jitter.next_multiplier();
            assert!((JITTER_MIN..=JITTER_MAX).contains(&m));
        }
    }
}
