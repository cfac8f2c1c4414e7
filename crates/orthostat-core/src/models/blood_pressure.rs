use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// Supine blood pressure captured once during setup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BloodPressure {
    pub systolic: Option<u32>,
    pub diastolic: Option<u32>,
}

impl BloodPressure {
    pub fn new(systolic: u32, diastolic: u32) -> Self {
        Self {
            systolic: Some(systolic),
            diastolic: Some(diastolic),
        }
    }

    /// Both readings are present.
    pub fn is_complete(&self) -> bool {
        self.systolic.is_some() && self.diastolic.is_some()
    }

    /// Parse operator input of the form `120/80`.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let (systolic, diastolic) =
            input
                .trim()
                .split_once('/')
                .ok_or_else(|| CoreError::InvalidNumber {
                    field: "blood pressure".to_string(),
                    input: input.to_string(),
                })?;

        Ok(Self::new(
            parse_whole("systolic pressure", systolic)?,
            parse_whole("diastolic pressure", diastolic)?,
        ))
    }
}

impl fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let part = |v: Option<u32>| v.map(|v| v.to_string()).unwrap_or_default();
        write!(f, "{}/{}", part(self.systolic), part(self.diastolic))
    }
}

/// Parse a non-negative whole number typed by the operator.
pub fn parse_whole(field: &str, input: &str) -> Result<u32, CoreError> {
    input
        .trim()
        .parse::<u32>()
        .map_err(|_| CoreError::InvalidNumber {
            field: field.to_string(),
            input: input.to_string(),
        })
}
