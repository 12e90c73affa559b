use std::fmt;

use serde::{Deserialize, Serialize};

/// A single multiple-choice question as supplied by the caller.
///
/// `answer` must match one entry of `choices` exactly; `bank::validation`
/// rejects the batch before any layout work if it does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub choices: Vec<String>,
    pub answer: String,
}

impl Question {
    /// Index of the correct choice in the original (unshuffled) order.
    pub fn answer_index(&self) -> Option<usize> {
        self.choices.iter().position(|c| c == &self.answer)
    }
}

/// Free text printed verbatim in the first-page header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDetails {
    #[serde(alias = "collegeName")]
    pub college_name: String,
    #[serde(alias = "collegeAddress")]
    pub college_address: String,
    #[serde(alias = "testName")]
    pub test_name: String,
    #[serde(alias = "testNumber")]
    pub test_number: String,
}

/// Single-letter set identifier, `A` through `Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct SetName(char);

impl SetName {
    pub const MAX_SETS: usize = 26;

    /// Returns the name of the set at `index` (0 → `A`), or `None` past `Z`.
    pub fn from_index(index: usize) -> Option<Self> {
        if index < Self::MAX_SETS {
            Some(SetName(char::from(b'A' + index as u8)))
        } else {
            None
        }
    }

    pub fn letter(self) -> char {
        self.0
    }

    /// Column label used by the answer key, e.g. `Set A`.
    pub fn label(self) -> String {
        format!("Set {}", self.0)
    }
}

#[cfg(test)]
impl SetName {
    /// Zero-based position of this set in generation order.
    pub fn index(self) -> usize {
        (self.0 as u8 - b'A') as usize
    }
}

impl fmt::Display for SetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<char> for SetName {
    type Error = String;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        let upper = c.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Ok(SetName(upper))
        } else {
            Err(format!("'{c}' is not a set name (expected A-Z)"))
        }
    }
}

impl From<SetName> for char {
    fn from(name: SetName) -> char {
        name.0
    }
}

/// A question after option shuffling, carrying a link back to the bank.
///
/// `shuffled_choices[correct_index()]` is always the bank question's `answer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShuffledQuestion {
    pub original_index: usize,
    pub text: String,
    pub shuffled_choices: Vec<String>,
    pub correct_letter: char,
}

impl ShuffledQuestion {
    pub fn correct_index(&self) -> usize {
        option_index(self.correct_letter)
    }
}

/// Letter printed in front of the option at `index` (0 → `A`).
pub fn option_letter(index: usize) -> char {
    char::from(b'A' + index as u8)
}

pub fn option_index(letter: char) -> usize {
    (letter as u8).saturating_sub(b'A') as usize
}

/// One randomized arrangement of the whole bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamSet {
    pub name: SetName,
    pub questions: Vec<ShuffledQuestion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_name_from_index_covers_a_to_z() {
        assert_eq!(SetName::from_index(0).map(SetName::letter), Some('A'));
        assert_eq!(SetName::from_index(25).map(SetName::letter), Some('Z'));
        assert!(SetName::from_index(26).is_none());
    }

    #[test]
    fn test_set_name_label_and_index() {
        let name = SetName::from_index(2).unwrap();
        assert_eq!(name.label(), "Set C");
        assert_eq!(name.index(), 2);
        assert_eq!(name.to_string(), "C");
    }

    #[test]
    fn test_set_name_deserializes_lowercase() {
        let name: SetName = serde_json::from_str("\"b\"").unwrap();
        assert_eq!(name.letter(), 'B');
        assert!(serde_json::from_str::<SetName>("\"7\"").is_err());
    }

    #[test]
    fn test_answer_index_finds_exact_match() {
        let q = Question {
            question: "2 + 2?".to_string(),
            choices: vec!["3".to_string(), "4".to_string()],
            answer: "4".to_string(),
        };
        assert_eq!(q.answer_index(), Some(1));
    }

    #[test]
    fn test_test_details_accepts_camel_case_aliases() {
        let json = serde_json::json!({
            "collegeName": "Riverside College",
            "collegeAddress": "Hill Road",
            "testName": "Weekly Test",
            "testNumber": "12"
        });
        let details: TestDetails = serde_json::from_value(json).unwrap();
        assert_eq!(details.college_name, "Riverside College");
        assert_eq!(details.test_number, "12");
    }

    #[test]
    fn test_option_letter_round_trips_index() {
        assert_eq!(option_letter(3), 'D');
        assert_eq!(option_index('D'), 3);
    }
}
