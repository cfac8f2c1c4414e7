use thiserror::Error;

use orthostat_core::clock::{parse_clock, parse_elapsed};
use orthostat_core::error::CoreError;
use orthostat_core::models::blood_pressure::BloodPressure;
use orthostat_core::models::measurement::{parse_pulse_rate, split_symptoms};

/// One operator instruction typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Name(String),
    Date(jiff::civil::Date),
    BloodPressure(BloodPressure),
    PulseRate(u32),
    Start,
    Lowest(u32),
    Stand,
    Record {
        pulse_rate: u32,
        symptoms: Vec<String>,
    },
    Missed {
        time: String,
        pulse_rate: u32,
        symptoms: Vec<String>,
    },
    Edit {
        key: u32,
        time: String,
        pulse_rate: u32,
        symptoms: Vec<String>,
    },
    Delete(u32),
    Pause,
    Resume,
    Toggle,
    Complete,
    Stop,
    Reset,
    Status,
    List,
    /// Latest readings, newest first.
    Recent(usize),
    Symptoms,
    Summary,
    Chart,
    Report,
    Compass,
    Answer {
        question_id: String,
        option: i32,
    },
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid answer '{0}', expected an option number")]
    InvalidOption(String),

    #[error("invalid count '{0}', expected a positive number")]
    InvalidCount(String),

    #[error(transparent)]
    Invalid(#[from] CoreError),
}

/// Readings shown by a bare `recent`.
pub const DEFAULT_RECENT: usize = 5;

pub const HELP: &str = "\
setup:     name <patient> | date <YYYY-MM-DD> | bp <sys/dia> | pr <bpm> | start
supine:    lowest <bpm> | stand
standing:  hr <bpm> [symptom, ...] | missed <M:SS> <bpm> [symptom, ...]
           edit <M:SS> <M:SS> <bpm> [symptom, ...] | delete <M:SS>
           complete
timer:     pause | resume | toggle
any time:  status | list | recent [n] | symptoms | stop | reset | help | quit
export:    summary | chart | report
COMPASS:   compass | answer <question> <option>";

/// Parse one input line.
pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(w, r)| (w, r.trim()))
        .unwrap_or((line, ""));

    let command = match word.to_ascii_lowercase().as_str() {
        "" => return Err(ParseError::Empty),
        "name" => Command::Name(required(rest, "name", "a patient name")?.to_string()),
        "date" => {
            let input = required(rest, "date", "a date")?;
            Command::Date(
                input
                    .parse()
                    .map_err(|_| ParseError::InvalidDate(input.to_string()))?,
            )
        }
        "bp" => Command::BloodPressure(BloodPressure::parse(required(rest, "bp", "systolic/diastolic")?)?),
        "pr" => Command::PulseRate(parse_pulse_rate("pulse rate", rest)?),
        "start" => Command::Start,
        "lowest" => Command::Lowest(parse_pulse_rate("lowest supine pulse rate", rest)?),
        "stand" => Command::Stand,
        "hr" => {
            let (rate, symptoms) = next_word(rest);
            Command::Record {
                pulse_rate: parse_pulse_rate("heart rate", rate)?,
                symptoms: symptom_args(symptoms),
            }
        }
        "missed" => {
            let (time, rest) = next_word(rest);
            let (rate, symptoms) = next_word(rest);
            let time = required(time, "missed", "a time and a heart rate")?;
            parse_clock(time)?;
            Command::Missed {
                time: time.to_string(),
                pulse_rate: parse_pulse_rate("heart rate", rate)?,
                symptoms: symptom_args(symptoms),
            }
        }
        "edit" => {
            let (key, rest) = next_word(rest);
            let (time, rest) = next_word(rest);
            let (rate, symptoms) = next_word(rest);
            let key = parse_elapsed(required(key, "edit", "the current time")?)?;
            let time = required(time, "edit", "a new time and heart rate")?;
            parse_elapsed(time)?;
            Command::Edit {
                key,
                time: time.to_string(),
                pulse_rate: parse_pulse_rate("heart rate", rate)?,
                symptoms: symptom_args(symptoms),
            }
        }
        "delete" => Command::Delete(parse_elapsed(required(rest, "delete", "a time")?)?),
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "toggle" => Command::Toggle,
        "complete" => Command::Complete,
        "stop" => Command::Stop,
        "reset" => Command::Reset,
        "status" => Command::Status,
        "list" => Command::List,
        "recent" => Command::Recent(if rest.is_empty() {
            DEFAULT_RECENT
        } else {
            rest.parse()
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| ParseError::InvalidCount(rest.to_string()))?
        }),
        "symptoms" => Command::Symptoms,
        "summary" => Command::Summary,
        "chart" => Command::Chart,
        "report" => Command::Report,
        "compass" => Command::Compass,
        "answer" => {
            let (question_id, option) = next_word(rest);
            let question_id = required(question_id, "answer", "a question and an option")?;
            let option = required(option, "answer", "an option number")?;
            Command::Answer {
                question_id: question_id.to_string(),
                option: option
                    .parse()
                    .map_err(|_| ParseError::InvalidOption(option.to_string()))?,
            }
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(command)
}

fn required<'a>(
    value: &'a str,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, ParseError> {
    if value.is_empty() {
        Err(ParseError::MissingArgument { command, argument })
    } else {
        Ok(value)
    }
}

fn next_word(input: &str) -> (&str, &str) {
    input
        .split_once(char::is_whitespace)
        .map(|(w, r)| (w, r.trim()))
        .unwrap_or((input, ""))
}

fn symptom_args(input: &str) -> Vec<String> {
    split_symptoms(input).into_iter().map(str::to_string).collect()
}
