//! Download file names for generated documents.

use crate::generation::generator::DocumentFormat;
use crate::layout::Paper;
use crate::models::{SetName, TestDetails};

/// `{college}_{test}_Set{X}.pdf`, or `..._Set{X}_answers.pdf` for the answer paper.
pub fn paper_file_name(
    details: &TestDetails,
    set_name: SetName,
    paper: Paper,
    format: DocumentFormat,
) -> String {
    let suffix = match paper {
        Paper::Question => "",
        Paper::Answer => "_answers",
    };
    format!(
        "{}_Set{}{}.{}",
        prefix(details),
        set_name,
        suffix,
        format.extension()
    )
}

/// `{college}_{test}_answer_key.csv`
pub fn answer_key_file_name(details: &TestDetails) -> String {
    format!("{}_answer_key.csv", prefix(details))
}

fn prefix(details: &TestDetails) -> String {
    format!(
        "{}_{}",
        sanitize(&details.college_name),
        sanitize(&details.test_name)
    )
}

/// Keeps names ASCII-safe inside a `Content-Disposition` header and on disk.
fn sanitize(part: &str) -> String {
    part.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> TestDetails {
        TestDetails {
            college_name: "Riverside College".to_string(),
            college_address: "12 Hill Road".to_string(),
            test_name: "Mid/Term \"1\"".to_string(),
            test_number: "4".to_string(),
        }
    }

    #[test]
    fn test_question_and_answer_paper_names() {
        let set = SetName::from_index(1).unwrap();
        assert_eq!(
            paper_file_name(&details(), set, Paper::Question, DocumentFormat::Pdf),
            "Riverside_College_Mid_Term__1__SetB.pdf"
        );
        assert_eq!(
            paper_file_name(&details(), set, Paper::Answer, DocumentFormat::Pdf),
            "Riverside_College_Mid_Term__1__SetB_answers.pdf"
        );
    }

    #[test]
    fn test_draw_ops_use_json_extension() {
        let set = SetName::from_index(0).unwrap();
        let name = paper_file_name(&details(), set, Paper::Question, DocumentFormat::DrawOps);
        assert!(name.ends_with("_SetA.json"));
    }

    #[test]
    fn test_answer_key_name() {
        assert_eq!(
            answer_key_file_name(&details()),
            "Riverside_College_Mid_Term__1__answer_key.csv"
        );
    }
}
