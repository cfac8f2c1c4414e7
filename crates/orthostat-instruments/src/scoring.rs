use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// One multiple-choice question. Options are numbered from 1.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    /// Points awarded for each option, in option order.
    pub points_key: Vec<u32>,
}

impl Question {
    /// Points for a 1-based option number, or `None` when out of range.
    pub fn points_for(&self, option: i32) -> Option<u32> {
        let index = usize::try_from(option).ok()?.checked_sub(1)?;
        self.points_key.get(index).copied()
    }

    pub fn max_points(&self) -> u32 {
        self.points_key.iter().copied().max().unwrap_or(0)
    }

    pub fn option_count(&self) -> usize {
        self.points_key.len()
    }
}

/// A scored group of questions.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Domain {
    pub id: String,
    pub name: String,
    pub questions: Vec<Question>,
    pub description: Option<String>,
}

impl Domain {
    pub fn max_score(&self) -> u32 {
        self.questions.iter().map(Question::max_points).sum()
    }
}

/// An answer given by the patient: the 1-based option chosen.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Answer {
    pub question_id: String,
    pub option: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DomainScore {
    pub domain_id: String,
    pub name: String,
    pub score: u32,
    pub max_score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InstrumentScore {
    pub domains: Vec<DomainScore>,
    pub total: u32,
    pub max_total: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.answered as f64 / self.total as f64 * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.answered == self.total
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, Error)]
#[ts(export)]
#[error("{message}")]
pub struct ValidationError {
    pub question_id: String,
    pub option: i32,
    pub option_count: usize,
    pub message: String,
}
