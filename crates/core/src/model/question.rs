use thiserror::Error;

/// Every question in the bank offers exactly this many options.
pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("expected {OPTIONS_PER_QUESTION} options, got {len}")]
    OptionCount { len: usize },

    #[error("option {index} cannot be empty")]
    EmptyOption { index: usize },

    #[error("answer key {answer} is outside the option range")]
    AnswerOutOfRange { answer: usize },
}

/// A single multiple-choice question with its answer key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    options: [String; OPTIONS_PER_QUESTION],
    answer: usize,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt or an option is blank, the option
    /// count is not `OPTIONS_PER_QUESTION`, or the answer key is out of range.
    pub fn new(
        prompt: impl Into<String>,
        options: Vec<String>,
        answer: usize,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into().trim().to_owned();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if let Some(index) = options.iter().position(|opt| opt.trim().is_empty()) {
            return Err(QuestionError::EmptyOption { index });
        }
        let len = options.len();
        let options: [String; OPTIONS_PER_QUESTION] = options
            .try_into()
            .map_err(|_| QuestionError::OptionCount { len })?;
        if answer >= OPTIONS_PER_QUESTION {
            return Err(QuestionError::AnswerOutOfRange { answer });
        }

        Ok(Self {
            prompt,
            options,
            answer,
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    /// Index of the correct option.
    #[must_use]
    pub fn answer(&self) -> usize {
        self.answer
    }

    #[must_use]
    pub fn is_correct(&self, choice: Option<usize>) -> bool {
        choice == Some(self.answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn builds_valid_question() {
        let q = Question::new("  2 + 2?  ", opts(&["1", "2", "3", "4"]), 3).unwrap();
        assert_eq!(q.prompt(), "2 + 2?");
        assert_eq!(q.option(3), Some("4"));
        assert!(q.is_correct(Some(3)));
        assert!(!q.is_correct(Some(0)));
        assert!(!q.is_correct(None));
    }

    #[test]
    fn rejects_wrong_option_count() {
        let err = Question::new("Q", opts(&["a", "b", "c"]), 0).unwrap_err();
        assert_eq!(err, QuestionError::OptionCount { len: 3 });
    }

    #[test]
    fn rejects_blank_option_and_prompt() {
        let err = Question::new("Q", opts(&["a", " ", "c", "d"]), 0).unwrap_err();
        assert_eq!(err, QuestionError::EmptyOption { index: 1 });

        let err = Question::new("   ", opts(&["a", "b", "c", "d"]), 0).unwrap_err();
        assert_eq!(err, QuestionError::EmptyPrompt);
    }

    #[test]
    fn rejects_answer_out_of_range() {
        let err = Question::new("Q", opts(&["a", "b", "c", "d"]), 4).unwrap_err();
        assert_eq!(err, QuestionError::AnswerOutOfRange { answer: 4 });
    }
}
