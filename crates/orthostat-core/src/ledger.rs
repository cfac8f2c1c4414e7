use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::format_clock;
use crate::error::CoreError;
use crate::models::measurement::{Measurement, validate_pulse_rate};

/// Recorded heart-rate samples for one run, keyed by `total_seconds`.
///
/// Iteration is always ascending by time and no two entries share a time.
/// Every mutating operation validates fully before touching the map, so a
/// failed call leaves the ledger as it was.
///
/// Serialized as the ascending list of measurements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<Measurement>", try_from = "Vec<Measurement>")]
pub struct Ledger {
    entries: BTreeMap<u32, Measurement>,
}

impl From<Ledger> for Vec<Measurement> {
    fn from(ledger: Ledger) -> Self {
        ledger.entries.into_values().collect()
    }
}

impl TryFrom<Vec<Measurement>> for Ledger {
    type Error = CoreError;

    fn try_from(measurements: Vec<Measurement>) -> Result<Self, Self::Error> {
        let mut entries = BTreeMap::new();
        for measurement in measurements {
            validate_pulse_rate(measurement.pulse_rate)?;
            if entries.contains_key(&measurement.total_seconds) {
                return Err(CoreError::DuplicateTime {
                    label: format_clock(measurement.total_seconds),
                });
            }
            entries.insert(measurement.total_seconds, measurement);
        }
        Ok(Self { entries })
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new measurement at `total_seconds`.
    pub fn add<I, S>(
        &mut self,
        total_seconds: u32,
        pulse_rate: u32,
        symptoms: I,
    ) -> Result<&Measurement, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let measurement = Measurement::new(total_seconds, pulse_rate, symptoms)?;
        if self.entries.contains_key(&total_seconds) {
            return Err(CoreError::DuplicateTime {
                label: format_clock(total_seconds),
            });
        }

        debug!(total_seconds, pulse_rate, "measurement added");
        Ok(self.entries.entry(total_seconds).or_insert(measurement))
    }

    /// Replace the pulse rate and symptoms at `key`. The time is unchanged.
    pub fn update<I, S>(
        &mut self,
        key: u32,
        pulse_rate: u32,
        symptoms: I,
    ) -> Result<&Measurement, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let replacement = Measurement::new(key, pulse_rate, symptoms)?;
        let entry = self
            .entries
            .get_mut(&key)
            .ok_or_else(|| not_found(key))?;
        *entry = replacement;

        debug!(total_seconds = key, pulse_rate, "measurement updated");
        Ok(entry)
    }

    pub fn remove(&mut self, key: u32) -> Result<Measurement, CoreError> {
        let removed = self.entries.remove(&key).ok_or_else(|| not_found(key))?;
        debug!(total_seconds = key, "measurement removed");
        Ok(removed)
    }

    /// Store a measurement at `new_total_seconds`, moving it from
    /// `previous_key` when given.
    ///
    /// Uniqueness is checked against the ledger without the entry being
    /// moved, so relocating onto its own time succeeds.
    pub fn add_or_relocate<I, S>(
        &mut self,
        new_total_seconds: u32,
        pulse_rate: u32,
        symptoms: I,
        previous_key: Option<u32>,
    ) -> Result<&Measurement, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let measurement = Measurement::new(new_total_seconds, pulse_rate, symptoms)?;

        if let Some(previous) = previous_key
            && !self.entries.contains_key(&previous)
        {
            return Err(not_found(previous));
        }
        if previous_key != Some(new_total_seconds) && self.entries.contains_key(&new_total_seconds)
        {
            return Err(CoreError::DuplicateTime {
                label: format_clock(new_total_seconds),
            });
        }

        if let Some(previous) = previous_key {
            self.entries.remove(&previous);
        }
        debug!(
            from = ?previous_key,
            to = new_total_seconds,
            pulse_rate,
            "measurement relocated"
        );
        Ok(self.entries.entry(new_total_seconds).or_insert(measurement))
    }

    pub fn get(&self, key: u32) -> Option<&Measurement> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: u32) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ascending by time.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Measurement> + '_ {
        self.entries.values()
    }

    pub fn all(&self) -> Vec<&Measurement> {
        self.iter().collect()
    }

    /// The last `n` measurements by time, most recent first.
    pub fn recent(&self, n: usize) -> Vec<&Measurement> {
        self.iter().rev().take(n).collect()
    }

    pub fn pulse_rates(&self) -> impl Iterator<Item = u32> + '_ {
        self.iter().map(|m| m.pulse_rate)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Measurement;
    type IntoIter = std::collections::btree_map::Values<'a, u32, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

fn not_found(key: u32) -> CoreError {
    CoreError::MeasurementNotFound {
        label: format_clock(key),
    }
}

