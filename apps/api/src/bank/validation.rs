//! Pre-layout batch validation.
//!
//! Every problem is collected and reported together so the caller can fix the
//! whole bank in one round trip. A batch that fails here never reaches the
//! shuffle or layout stages, so no partial documents are produced.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::generation::generator::OutputSelection;
use crate::models::{Question, SetName, TestDetails};

/// Options are lettered A-Z, so a question cannot carry more than 26 of them.
pub const MAX_CHOICES: usize = 26;
pub const MIN_CHOICES: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Dotted path of the offending input, e.g. `questions[3].answer`.
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validates a whole generation request.
///
/// FAIL conditions:
/// - `num_sets` outside `1..=26`
/// - any blank test-detail field
/// - empty question bank, or any question failing `validate_question`
/// - no output selected
pub fn validate_batch(
    questions: &[Question],
    num_sets: usize,
    details: &TestDetails,
    outputs: &OutputSelection,
) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if num_sets < 1 || num_sets > SetName::MAX_SETS {
        issues.push(ValidationIssue::new(
            "num_sets",
            format!(
                "must be between 1 and {} (got {num_sets})",
                SetName::MAX_SETS
            ),
        ));
    }

    issues.extend(validate_test_details(details));

    if questions.is_empty() {
        issues.push(ValidationIssue::new(
            "questions",
            "question bank is empty; upload questions first",
        ));
    }

    for (index, question) in questions.iter().enumerate() {
        issues.extend(validate_question(index, question));
    }

    if !outputs.any() {
        issues.push(ValidationIssue::new(
            "outputs",
            "select at least one output (question papers, answer papers or answer key)",
        ));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

pub fn validate_test_details(details: &TestDetails) -> Vec<ValidationIssue> {
    [
        ("test_details.college_name", &details.college_name),
        ("test_details.college_address", &details.college_address),
        ("test_details.test_name", &details.test_name),
        ("test_details.test_number", &details.test_number),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| ValidationIssue::new(field, "is required"))
    .collect()
}

/// Checks a single question's invariants.
pub fn validate_question(index: usize, question: &Question) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let path = format!("questions[{index}]");

    if question.question.trim().is_empty() {
        issues.push(ValidationIssue::new(
            format!("{path}.question"),
            "question text is empty",
        ));
    }

    let count = question.choices.len();
    if count < MIN_CHOICES {
        issues.push(ValidationIssue::new(
            format!("{path}.choices"),
            format!("needs at least {MIN_CHOICES} choices (got {count})"),
        ));
    } else if count > MAX_CHOICES {
        issues.push(ValidationIssue::new(
            format!("{path}.choices"),
            format!("at most {MAX_CHOICES} choices can be lettered (got {count})"),
        ));
    }

    let mut seen = HashSet::new();
    for (choice_index, choice) in question.choices.iter().enumerate() {
        if choice.trim().is_empty() {
            issues.push(ValidationIssue::new(
                format!("{path}.choices[{choice_index}]"),
                "choice is empty",
            ));
        } else if !seen.insert(choice.as_str()) {
            issues.push(ValidationIssue::new(
                format!("{path}.choices[{choice_index}]"),
                format!("duplicate choice '{choice}'"),
            ));
        }
    }

    if question.answer_index().is_none() {
        issues.push(ValidationIssue::new(
            format!("{path}.answer"),
            format!("answer '{}' is not one of the choices", question.answer),
        ));
    }

    issues
}
