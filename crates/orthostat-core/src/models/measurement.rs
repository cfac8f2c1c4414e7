use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::clock::format_clock;
use crate::error::CoreError;
use crate::models::blood_pressure::parse_whole;

pub const PULSE_RATE_MIN: u32 = 30;
pub const PULSE_RATE_MAX: u32 = 200;

/// Symptom tags offered as one-tap choices; free text is accepted as well.
pub const COMMON_SYMPTOMS: [&str; 6] = [
    "Dizziness",
    "Nausea",
    "Fatigue",
    "Palpitations",
    "Weakness",
    "Blurred vision",
];

/// One heart-rate sample. `total_seconds` is the ledger key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Measurement {
    pub total_seconds: u32,
    pub pulse_rate: u32,
    /// Normalized, comma-joined symptom tags. Empty when none were noted.
    pub symptoms: String,
}

impl Measurement {
    pub fn new<I, S>(total_seconds: u32, pulse_rate: u32, symptoms: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            total_seconds,
            pulse_rate: validate_pulse_rate(pulse_rate)?,
            symptoms: normalize_symptoms(symptoms),
        })
    }

    pub fn time_minutes(&self) -> u32 {
        self.total_seconds / 60
    }

    pub fn time_seconds(&self) -> u32 {
        self.total_seconds % 60
    }

    /// Display label, `M:SS`.
    pub fn label(&self) -> String {
        format_clock(self.total_seconds)
    }

    /// X-axis coordinate in fractional minutes.
    pub fn chart_time(&self) -> f64 {
        f64::from(self.total_seconds) / 60.0
    }

    pub fn symptom_list(&self) -> Vec<&str> {
        split_symptoms(&self.symptoms)
    }

    pub fn has_symptoms(&self) -> bool {
        !self.symptoms.is_empty()
    }
}

pub fn validate_pulse_rate(value: u32) -> Result<u32, CoreError> {
    if (PULSE_RATE_MIN..=PULSE_RATE_MAX).contains(&value) {
        Ok(value)
    } else {
        Err(CoreError::InvalidPulseRate {
            value,
            min: PULSE_RATE_MIN,
            max: PULSE_RATE_MAX,
        })
    }
}

/// Parse and range-check a pulse rate typed by the operator.
pub fn parse_pulse_rate(field: &str, input: &str) -> Result<u32, CoreError> {
    if input.trim().is_empty() {
        return Err(CoreError::MissingField(field.to_string()));
    }
    validate_pulse_rate(parse_whole(field, input)?)
}

/// Trim tags, drop empties and case-insensitive repeats, join with `", "`.
pub fn normalize_symptoms<I, S>(tags: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut kept: Vec<String> = Vec::new();
    let mut seen: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        let folded = tag.to_lowercase();
        if tag.is_empty() || seen.contains(&folded) {
            continue;
        }
        seen.push(folded);
        kept.push(tag.to_string());
    }
    kept.join(", ")
}

/// Split a stored symptom string back into tags.
pub fn split_symptoms(joined: &str) -> Vec<&str> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
