//! Question bank loading from JSON.
//!
//! ```json
//! { "courses": [ { "code": "CSC204", "title": "...", "questions": [
//!     { "prompt": "...", "options": ["a", "b", "c", "d"], "answer": 2 } ] } ] }
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use quiz_core::model::{BankError, Course, CourseError, Question, QuestionBank};

use crate::error::BankLoadError;

const DEFAULT_BANK_JSON: &str = include_str!("../assets/default_bank.json");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BankFile {
    courses: Vec<CourseRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CourseRecord {
    code: String,
    title: String,
    questions: Vec<QuestionRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct QuestionRecord {
    prompt: String,
    options: Vec<String>,
    answer: usize,
}

impl CourseRecord {
    fn into_course(self) -> Result<Course, CourseError> {
        let code = self.code;
        let questions = self
            .questions
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                Question::new(record.prompt, record.options, record.answer).map_err(|source| {
                    CourseError::Question {
                        code: code.clone(),
                        number: i + 1,
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Course::new(code, self.title, questions)
    }
}

/// Parse and validate a bank from JSON text.
///
/// # Errors
///
/// Returns `BankLoadError::Json` for malformed input and `BankLoadError::Bank`
/// when a course or question fails validation.
pub fn load_bank_from_str(json: &str) -> Result<QuestionBank, BankLoadError> {
    let file: BankFile = serde_json::from_str(json)?;
    let courses = file
        .courses
        .into_iter()
        .map(CourseRecord::into_course)
        .collect::<Result<Vec<_>, _>>()
        .map_err(BankError::from)?;
    let bank = QuestionBank::new(courses)?;
    debug!(courses = bank.len(), "question bank loaded");
    Ok(bank)
}

/// Read a bank file from disk.
///
/// # Errors
///
/// Returns `BankLoadError::Io` if the file cannot be read, otherwise see
/// [`load_bank_from_str`].
pub fn load_bank_from_path(path: impl AsRef<Path>) -> Result<QuestionBank, BankLoadError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| BankLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_bank_from_str(&json)
}

/// The built-in bank of six second-year courses.
///
/// # Errors
///
/// Only fails if the embedded asset is corrupt.
pub fn default_bank() -> Result<QuestionBank, BankLoadError> {
    load_bank_from_str(DEFAULT_BANK_JSON)
}
