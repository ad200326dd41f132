use thiserror::Error;

use crate::model::question::{Question, QuestionError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course code cannot be empty")]
    EmptyCode,

    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("course {code} has no questions")]
    NoQuestions { code: String },

    #[error("course {code}, question {number}: {source}")]
    Question {
        code: String,
        number: usize,
        #[source]
        source: QuestionError,
    },
}

/// A named bank of questions for one subject. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    code: String,
    title: String,
    questions: Vec<Question>,
}

impl Course {
    /// Build a validated course.
    ///
    /// # Errors
    ///
    /// Returns `CourseError` when the code or title is blank or there are no questions.
    pub fn new(
        code: impl Into<String>,
        title: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, CourseError> {
        let code = code.into().trim().to_owned();
        if code.is_empty() {
            return Err(CourseError::EmptyCode);
        }
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(CourseError::EmptyTitle);
        }
        if questions.is_empty() {
            return Err(CourseError::NoQuestions { code });
        }

        Ok(Self {
            code,
            title,
            questions,
        })
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Never zero: construction rejects empty courses.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}
