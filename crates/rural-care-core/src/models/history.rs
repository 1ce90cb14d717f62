//! Synthesized chart history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::vitals::VitalSigns;

/// A dated reading for trend charts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoricalReading {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub vitals: VitalSigns,
}
