//! orthostat-instruments
//!
//! Symptom questionnaires that accompany a lean test. Pure data: each
//! instrument defines its domains, questions and points keys, and the trait
//! supplies validation and scoring.

pub mod error;
pub mod instruments;
pub mod scoring;

use error::InstrumentError;
use scoring::{Answer, Domain, DomainScore, InstrumentScore, Progress, Question, ValidationError};

/// Trait implemented by each questionnaire.
pub trait Instrument: Send + Sync {
    /// Unique identifier (e.g., "compass31").
    fn id(&self) -> &str;

    /// Human-readable name (e.g., "COMPASS-31").
    fn name(&self) -> &str;

    fn domains(&self) -> &[Domain];

    fn questions(&self) -> Vec<&Question> {
        self.domains().iter().flat_map(|d| &d.questions).collect()
    }

    fn question(&self, question_id: &str) -> Result<&Question, InstrumentError> {
        self.domains()
            .iter()
            .flat_map(|d| &d.questions)
            .find(|q| q.id == question_id)
            .ok_or_else(|| InstrumentError::UnknownQuestion {
                instrument_id: self.id().to_string(),
                question_id: question_id.to_string(),
            })
    }

    /// Check each answer's option number against its question. Answers to
    /// unknown questions are ignored here.
    fn validate_answers(&self, answers: &[Answer]) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for answer in answers {
            if let Ok(question) = self.question(&answer.question_id)
                && question.points_for(answer.option).is_none()
            {
                errors.push(ValidationError {
                    question_id: answer.question_id.clone(),
                    option: answer.option,
                    option_count: question.option_count(),
                    message: format!(
                        "{}: answer {} to question {} is outside options [1, {}]",
                        self.name(),
                        answer.option,
                        question.id,
                        question.option_count(),
                    ),
                });
            }
        }
        errors
    }

    /// Per-domain and total scores. Out-of-range answers contribute nothing;
    /// when a question is answered twice the last answer counts.
    fn score(&self, answers: &[Answer]) -> InstrumentScore {
        let domains: Vec<DomainScore> = self
            .domains()
            .iter()
            .map(|domain| {
                let score = domain
                    .questions
                    .iter()
                    .filter_map(|q| {
                        answers
                            .iter()
                            .rev()
                            .find(|a| a.question_id == q.id)
                            .and_then(|a| q.points_for(a.option))
                    })
                    .sum();
                DomainScore {
                    domain_id: domain.id.clone(),
                    name: domain.name.clone(),
                    score,
                    max_score: domain.max_score(),
                }
            })
            .collect();

        InstrumentScore {
            total: domains.iter().map(|d| d.score).sum(),
            max_total: domains.iter().map(|d| d.max_score).sum(),
            domains,
        }
    }

    /// How many questions have a valid answer.
    fn progress(&self, answers: &[Answer]) -> Progress {
        let questions = self.questions();
        let answered = questions
            .iter()
            .filter(|q| {
                answers
                    .iter()
                    .any(|a| a.question_id == q.id && q.points_for(a.option).is_some())
            })
            .count();
        Progress {
            answered,
            total: questions.len(),
        }
    }

    /// Format answers and scores as structured text for a report.
    fn to_structured_input(&self, answers: &[Answer]) -> String {
        let score = self.score(answers);
        let mut output = format!("## {}\n\n", self.name());
        for (domain, domain_score) in self.domains().iter().zip(&score.domains) {
            output.push_str(&format!(
                "### {} ({}/{})\n",
                domain.name, domain_score.score, domain_score.max_score
            ));
            for question in &domain.questions {
                let chosen = answers
                    .iter()
                    .rev()
                    .find(|a| a.question_id == question.id)
                    .and_then(|a| {
                        let index = usize::try_from(a.option).ok()?.checked_sub(1)?;
                        question.options.get(index)
                    });
                if let Some(option) = chosen {
                    output.push_str(&format!("- {}: {}\n", question.text, option));
                }
            }
            output.push('\n');
        }
        output.push_str(&format!("Total: {}/{}\n", score.total, score.max_total));
        output
    }
}

/// Return all registered instruments.
pub fn all_instruments() -> Vec<Box<dyn Instrument>> {
    vec![Box::new(instruments::compass31::Compass31)]
}

/// Look up an instrument by ID.
pub fn get_instrument(id: &str) -> Result<Box<dyn Instrument>, InstrumentError> {
    all_instruments()
        .into_iter()
        .find(|i| i.id() == id)
        .ok_or_else(|| InstrumentError::UnknownInstrument(id.to_string()))
}
