use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rural_care_core::triage::{count_emergencies, emergency_banner};
use rural_care_core::{demo, Database, RandomJitter, TriageConfig, TriageEngine, VitalKind};

#[derive(Parser)]
#[command(name = "triage-report")]
#[command(about = "Print the doctor dashboard for a rural care database")]
struct Cli {
    /// SQLite database file
    #[arg(long)]
    db: PathBuf,
    /// JSON config overriding thresholds, villages and chart dates
    #[arg(long)]
    config: Option<PathBuf>,
    /// Only show patients from this village
    #[arg(long)]
    village: Option<String>,
    /// Print synthesized history, seeded for reproducible output
    #[arg(long)]
    seed: Option<u64>,
    /// Load the demo patients before reporting
    #[arg(long)]
    seed_demo: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rural_care_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TriageConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TriageConfig::default(),
    };
    if let Some(village) = &cli.village {
        if !config.is_known_village(village) {
            bail!("unknown village: {}", village);
        }
    }

    let db = Database::open(&cli.db)
        .with_context(|| format!("opening database {}", cli.db.display()))?;
    if cli.seed_demo {
        let inserted = demo::seed_demo(&db).context("seeding demo data")?;
        println!("Seeded {} demo patients", inserted);
    }

    let patients = match &cli.village {
        Some(village) => db.search_patients("", Some(village))?,
        None => db.list_patients()?,
    };
    let stored = db.load_insights()?;
    let engine = TriageEngine::new(&config, &stored);

    if let Some(banner) = emergency_banner(count_emergencies(&patients)) {
        println!("!! {}", banner);
        println!();
    }
    if patients.is_empty() {
        println!("No patients found.");
        return Ok(());
    }

    for (patient, triage) in patients.iter().zip(engine.triage_all(&patients)) {
        let marker = if triage.is_emergency { " [EMERGENCY]" } else { "" };
        let checkup = triage
            .last_checkup
            .map(|d| d.to_string())
            .unwrap_or_else(|| "never".to_string());
        println!(
            "{} {} ({}, {}){} last checkup: {}",
            patient.id, patient.name, patient.age, patient.village, marker, checkup
        );

        match (patient.latest_vitals(), &triage.assessment) {
            (Some(vitals), Some(assessment)) => {
                for kind in VitalKind::ALL {
                    let value = match kind {
                        VitalKind::BloodPressure => vitals.blood_pressure.clone(),
                        VitalKind::HeartRate => vitals.heart_rate.to_string(),
                        VitalKind::BloodSugar => vitals.blood_sugar.to_string(),
                        VitalKind::Temperature => format!("{:.1}", vitals.temperature),
                        VitalKind::OxygenSaturation => vitals.oxygen_saturation.to_string(),
                    };
                    println!(
                        "    {:<18} {:>8} {:<6} {}",
                        kind.display_name(),
                        value,
                        kind.unit(),
                        assessment.tier(kind)
                    );
                }
            }
            _ => println!("    no vitals recorded"),
        }

        if let Some(insight) = &triage.insight {
            println!("    Insight: {}", insight.text);
            for recommendation in &insight.recommendations {
                println!("      - {}", recommendation);
            }
        }

        if let Some(seed) = cli.seed {
            let mut jitter = RandomJitter::seeded(seed);
            for point in engine.history(patient, &mut jitter) {
                let v = point.vitals;
                println!(
                    "    {}  BP {:>7}  HR {:>3}  BS {:>3}  T {:>5.1}  O2 {:>2}",
                    point.date,
                    v.blood_pressure,
                    v.heart_rate,
                    v.blood_sugar,
                    v.temperature,
                    v.oxygen_saturation
                );
            }
        }
        println!();
    }

    Ok(())
}
