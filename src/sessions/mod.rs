//! Session domain model: readings, validation, batch averaging.

pub mod export;
pub mod filter;
pub mod store;

use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

/// Cap on readings a single session can hold.
pub const MAX_READINGS_PER_SESSION: usize = 10;

const SYSTOLIC_MIN: u16 = 70;
const SYSTOLIC_MAX: u16 = 200;
const DIASTOLIC_MIN: u16 = 40;
const DIASTOLIC_MAX: u16 = 130;
const PULSE_MIN: u16 = 40;
const PULSE_MAX: u16 = 200;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Systolic value must be between 70 and 200 mmHg")]
    SystolicRange,
    #[error("Diastolic value must be between 40 and 130 mmHg")]
    DiastolicRange,
    #[error("Pulse value must be between 40 and 200 bpm")]
    PulseRange,
    #[error("Systolic value must be greater than diastolic value")]
    SystolicNotAboveDiastolic,
    #[error("Enter whole numbers for the reading values")]
    NotANumber,
    #[error("Maximum {MAX_READINGS_PER_SESSION} readings per session reached")]
    BatchFull,
    #[error("Please add at least one reading before saving")]
    EmptyBatch,
}

/// One systolic/diastolic(/pulse) measurement. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub systolic: u16,
    pub diastolic: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulse: Option<u16>,
}

impl Reading {
    pub fn new(
        systolic: u16,
        diastolic: u16,
        pulse: Option<u16>,
    ) -> Result<Self, ValidationError> {
        if !(SYSTOLIC_MIN..=SYSTOLIC_MAX).contains(&systolic) {
            return Err(ValidationError::SystolicRange);
        }
        if !(DIASTOLIC_MIN..=DIASTOLIC_MAX).contains(&diastolic) {
            return Err(ValidationError::DiastolicRange);
        }
        if let Some(pulse) = pulse {
            if !(PULSE_MIN..=PULSE_MAX).contains(&pulse) {
                return Err(ValidationError::PulseRange);
            }
        }
        if systolic <= diastolic {
            return Err(ValidationError::SystolicNotAboveDiastolic);
        }
        Ok(Self {
            systolic,
            diastolic,
            pulse,
        })
    }

    /// "132/85 • 70 bpm", pulse part only when present.
    pub fn display(&self) -> String {
        match self.pulse {
            Some(pulse) => format!("{}/{} • {} bpm", self.systolic, self.diastolic, pulse),
            None => format!("{}/{}", self.systolic, self.diastolic),
        }
    }
}

/// Reduce a batch of readings to a single average reading.
///
/// Systolic and diastolic are averaged over the whole batch; pulse only
/// over the readings that define it, and the result omits pulse entirely
/// when none do. Rounding is half-up to the nearest integer.
pub fn average(readings: &[Reading]) -> Result<Reading, ValidationError> {
    if readings.is_empty() {
        return Err(ValidationError::EmptyBatch);
    }

    let count = readings.len() as f64;
    let systolic_sum: u32 = readings.iter().map(|r| r.systolic as u32).sum();
    let diastolic_sum: u32 = readings.iter().map(|r| r.diastolic as u32).sum();

    let pulses: Vec<u32> = readings
        .iter()
        .filter_map(|r| r.pulse.map(u32::from))
        .collect();
    let pulse = if pulses.is_empty() {
        None
    } else {
        let sum: u32 = pulses.iter().sum();
        Some((sum as f64 / pulses.len() as f64).round() as u16)
    };

    Ok(Reading {
        systolic: (systolic_sum as f64 / count).round() as u16,
        diastolic: (diastolic_sum as f64 / count).round() as u16,
        pulse,
    })
}

/// One user-committed batch of readings with its precomputed average.
///
/// `id` is the creation timestamp in milliseconds and doubles as the unique
/// key; sessions are never mutated after creation, only deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub readings: Vec<Reading>,
    pub average: Reading,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Session {
    pub fn new(
        readings: Vec<Reading>,
        notes: Option<String>,
        date: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if readings.len() > MAX_READINGS_PER_SESSION {
            return Err(ValidationError::BatchFull);
        }
        let average = average(&readings)?;
        Ok(Self {
            id: date.timestamp_millis(),
            date,
            readings,
            average,
            notes: notes
                .map(|n| n.trim().to_owned())
                .filter(|n| !n.is_empty()),
        })
    }
}
