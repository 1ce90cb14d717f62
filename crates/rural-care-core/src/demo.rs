//! Demo population for the dashboards and the report tool.

use chrono::NaiveDate;
use tracing::info;

use crate::db::{Database, DbResult};
use crate::models::{Gender, Patient, PrecomputedInsights, VitalSigns};

/// Stored insights shipped with the demo patients.
pub const DEMO_INSIGHTS: [(&str, &str); 3] = [
    (
        "P002",
        "Blood pressure readings indicate Stage 2 hypertension. Recommend medication adjustment and follow-up within 48 hours.",
    ),
    (
        "P004",
        "Blood sugar level (185 mg/dL) indicates poor glycemic control. Consider adjusting insulin dose and dietary counseling.",
    ),
    (
        "P006",
        "Combined symptoms (chest pain, elevated BP, fever, low O2) suggest possible cardiovascular event or respiratory infection. Immediate evaluation recommended.",
    ),
];

fn reading(bp: &str, heart_rate: u32, blood_sugar: u32, temperature: f64, oxygen: u32) -> VitalSigns {
    VitalSigns {
        blood_pressure: bp.to_string(),
        heart_rate,
        blood_sugar,
        temperature,
        oxygen_saturation: oxygen,
    }
}

struct DemoPatient {
    id: &'static str,
    name: &'static str,
    age: u32,
    gender: Gender,
    village: &'static str,
    phone: Option<&'static str>,
    notes: Option<&'static str>,
    last_checkup: (i32, u32, u32),
    is_emergency: bool,
}

impl DemoPatient {
    fn build(self, vitals: Vec<VitalSigns>) -> Patient {
        let mut patient = Patient::new(self.name.into(), self.age, self.gender, self.village.into());
        patient.id = self.id.into();
        patient.phone = self.phone.map(String::from);
        patient.notes = self.notes.map(String::from);
        let (y, m, d) = self.last_checkup;
        patient.last_checkup = NaiveDate::from_ymd_opt(y, m, d);
        patient.is_emergency = self.is_emergency;
        patient.vitals = vitals;
        patient
    }
}

/// The six demo patients, readings most recent first.
pub fn demo_patients() -> Vec<Patient> {
    vec![
        DemoPatient {
            id: "P001",
            name: "Anita Devi",
            age: 32,
            gender: Gender::Female,
            village: "Ranchi",
            phone: Some("9845123456"),
            notes: Some("Patient reported mild headaches in the evening"),
            last_checkup: (2025, 4, 5),
            is_emergency: false,
        }
        .build(vec![
            reading("120/80", 72, 110, 98.6, 97),
            reading("118/78", 75, 115, 98.4, 98),
        ]),
        DemoPatient {
            id: "P002",
            name: "Rajesh Kumar",
            age: 45,
            gender: Gender::Male,
            village: "Hazaribagh",
            phone: Some("8765432198"),
            notes: Some("Patient has a history of hypertension. Needs immediate attention."),
            last_checkup: (2025, 4, 6),
            is_emergency: true,
        }
        .build(vec![reading("160/100", 88, 170, 99.2, 94)]),
        DemoPatient {
            id: "P003",
            name: "Meena Singh",
            age: 28,
            gender: Gender::Female,
            village: "Dhanbad",
            phone: None,
            notes: None,
            last_checkup: (2025, 4, 4),
            is_emergency: false,
        }
        .build(vec![reading("115/75", 68, 105, 98.2, 99)]),
        DemoPatient {
            id: "P004",
            name: "Sanjay Prasad",
            age: 52,
            gender: Gender::Male,
            village: "Bokaro",
            phone: Some("7788990011"),
            notes: Some("Diabetic patient. Blood sugar levels are high."),
            last_checkup: (2025, 4, 6),
            is_emergency: false,
        }
        .build(vec![reading("145/95", 82, 185, 98.8, 95)]),
        DemoPatient {
            id: "P005",
            name: "Kavita Sharma",
            age: 35,
            gender: Gender::Female,
            village: "Jamshedpur",
            phone: None,
            notes: None,
            last_checkup: (2025, 4, 3),
            is_emergency: false,
        }
        .build(vec![reading("110/70", 65, 100, 98.0, 98)]),
        DemoPatient {
            id: "P006",
            name: "Mohan Lal",
            age: 62,
            gender: Gender::Male,
            village: "Dumka",
            phone: Some("9876543210"),
            notes: Some(
                "Patient experiencing chest pain and shortness of breath. Immediate attention required.",
            ),
            last_checkup: (2025, 4, 7),
            is_emergency: true,
        }
        .build(vec![reading("170/110", 92, 200, 100.4, 92)]),
    ]
}

pub fn demo_insights() -> PrecomputedInsights {
    DEMO_INSIGHTS
        .iter()
        .map(|(id, text)| (id.to_string(), text.to_string()))
        .collect()
}

/// Insert the demo population. Patients already present are left alone.
///
/// Returns the number of patients inserted.
pub fn seed_demo(db: &Database) -> DbResult<usize> {
    let mut inserted = 0;
    for patient in demo_patients() {
        if db.get_patient(&patient.id)?.is_some() {
            continue;
        }
        db.insert_patient(&patient)?;
        inserted += 1;
    }
    for (patient_id, text) in DEMO_INSIGHTS {
        db.upsert_insight(patient_id, text)?;
    }

    info!(inserted, "demo data seeded");
    Ok(inserted)
}
