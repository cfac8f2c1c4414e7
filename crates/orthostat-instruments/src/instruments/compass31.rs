use crate::scoring::{Domain, Question};
use crate::Instrument;

/// COMPASS-31: Composite Autonomic Symptom Score.
/// Orthostatic intolerance and vasomotor domains. Higher = more symptoms.
pub struct Compass31;

impl Instrument for Compass31 {
    fn id(&self) -> &str {
        "compass31"
    }

    fn name(&self) -> &str {
        "COMPASS-31"
    }

    fn domains(&self) -> &[Domain] {
        static DOMAINS: std::sync::LazyLock<Vec<Domain>> = std::sync::LazyLock::new(|| {
            let trend = [
                "Gotten much worse",
                "Gotten somewhat worse",
                "Stayed about the same",
                "Gotten somewhat better",
                "Gotten much better",
                "Completely gone",
            ];

            vec![
                Domain {
                    id: "orthostatic_intolerance".to_string(),
                    name: "Orthostatic Intolerance".to_string(),
                    questions: vec![
                        question(
                            "oi_1",
                            "In the past year, have you ever felt faint, dizzy, \"goofy\", or had difficulty thinking soon after standing up from a sitting or lying position?",
                            &["Yes", "No"],
                            &[1, 0],
                        ),
                        question(
                            "oi_2",
                            "When standing up, how frequently do you get these feelings or symptoms?",
                            &["Rarely", "Occasionally", "Frequently", "Almost always"],
                            &[0, 1, 2, 3],
                        ),
                        question(
                            "oi_3",
                            "How would you rate the severity of these feelings or symptoms?",
                            &["Mild", "Moderate", "Severe"],
                            &[1, 2, 3],
                        ),
                        question(
                            "oi_4",
                            "In the past year, have these feelings or symptoms that you have experienced",
                            &trend,
                            &[3, 2, 1, 0, 0, 0],
                        ),
                    ],
                    description: Some("Lightheadedness on standing, its frequency, severity and course".to_string()),
                },
                Domain {
                    id: "vasomotor".to_string(),
                    name: "Vasomotor".to_string(),
                    questions: vec![
                        question(
                            "vm_1",
                            "In the past year, have you ever noticed color changes in your skin, such as red, white, or purple?",
                            &["Yes", "No"],
                            &[1, 0],
                        ),
                        question(
                            "vm_2",
                            "What parts of your body are affected by these color changes?",
                            &["Hands", "Feet"],
                            &[1, 1],
                        ),
                        question(
                            "vm_3",
                            "Are these changes in your skin color:",
                            &[
                                "Getting much worse",
                                "Getting somewhat worse",
                                "Staying about the same",
                                "Getting better",
                            ],
                            &[3, 2, 1, 0],
                        ),
                    ],
                    description: None,
                },
            ]
        });
        &DOMAINS
    }
}

fn question(id: &str, text: &str, options: &[&str], points_key: &[u32]) -> Question {
    Question {
        id: id.to_string(),
        text: text.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        points_key: points_key.to_vec(),
    }
}
