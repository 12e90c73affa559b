// Question bank checks that must pass before any shuffle or layout work starts.

pub mod validation;

pub use validation::{validate_batch, ValidationIssue};
