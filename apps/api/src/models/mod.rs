pub mod question;

pub use question::{
    option_index, option_letter, ExamSet, Question, SetName, ShuffledQuestion, TestDetails,
};
