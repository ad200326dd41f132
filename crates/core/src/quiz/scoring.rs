use std::fmt;

use serde::Serialize;

use crate::model::Course;

/// Count answers that match the key. Missing or unanswered slots count as wrong.
#[must_use]
pub fn score(course: &Course, answers: &[Option<usize>]) -> u32 {
    let mut correct = 0_u32;
    for (i, question) in course.questions().iter().enumerate() {
        if question.is_correct(answers.get(i).copied().flatten()) {
            correct = correct.saturating_add(1);
        }
    }
    correct
}

/// Final result of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    pub score: u32,
    pub total: u32,
}

impl ScoreReport {
    #[must_use]
    pub fn for_course(course: &Course, answers: &[Option<usize>]) -> Self {
        Self {
            score: score(course, answers),
            total: u32::try_from(course.question_count()).unwrap_or(u32::MAX),
        }
    }

    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.score) / f64::from(self.total) * 100.0
    }
}

impl fmt::Display for ScoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.score, self.total)
    }
}

/// Presentation class of a single option in the review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OptionMark {
    /// The answer key. Always marked, whatever the learner picked.
    Correct,
    /// The learner's pick, when it differs from the key.
    IncorrectSelected,
    Neutral,
}

#[must_use]
pub fn classify_option(option: usize, correct: usize, user: Option<usize>) -> OptionMark {
    if option == correct {
        OptionMark::Correct
    } else if user == Some(option) {
        OptionMark::IncorrectSelected
    } else {
        OptionMark::Neutral
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewOption {
    pub text: String,
    pub mark: OptionMark,
}

/// One annotated question of the post-submission review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewItem {
    /// 1-based question number.
    pub number: usize,
    pub prompt: String,
    pub options: Vec<ReviewOption>,
    pub correct_index: usize,
    pub user_index: Option<usize>,
}

impl ReviewItem {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.user_index == Some(self.correct_index)
    }
}

#[must_use]
pub fn review(course: &Course, answers: &[Option<usize>]) -> Vec<ReviewItem> {
    course
        .questions()
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let user_index = answers.get(i).copied().flatten();
            let options = question
                .options()
                .iter()
                .enumerate()
                .map(|(opt, text)| ReviewOption {
                    text: text.clone(),
                    mark: classify_option(opt, question.answer(), user_index),
                })
                .collect();
            ReviewItem {
                number: i + 1,
                prompt: question.prompt().to_owned(),
                options,
                correct_index: question.answer(),
                user_index,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Question;

    fn course_with_keys(keys: &[usize]) -> Course {
        let questions = keys
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let options = ["a", "b", "c", "d"].map(String::from).to_vec();
                Question::new(format!("Q{i}"), options, *key).unwrap()
            })
            .collect();
        Course::new("T100", "Test", questions).unwrap()
    }

    fn marks(item: &ReviewItem) -> Vec<OptionMark> {
        item.options.iter().map(|o| o.mark).collect()
    }

    #[test]
    fn score_counts_exact_matches() {
        let course = course_with_keys(&[0, 1, 2]);
        assert_eq!(score(&course, &[Some(0), Some(1), Some(0)]), 2);
        assert_eq!(score(&course, &[None, None, None]), 0);
        assert_eq!(score(&course, &[Some(0)]), 1);
    }

    #[test]
    fn report_display_and_percent() {
        let course = course_with_keys(&[1, 0]);
        let report = ScoreReport::for_course(&course, &[Some(1), None]);
        assert_eq!(report.to_string(), "1 / 2");
        assert!((report.percent() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn wrong_answer_marks_key_and_pick() {
        let course = course_with_keys(&[2]);
        let items = review(&course, &[Some(0)]);
        use OptionMark::{Correct, IncorrectSelected, Neutral};
        assert_eq!(marks(&items[0]), vec![IncorrectSelected, Neutral, Correct, Neutral]);
        assert!(!items[0].is_correct());
    }

    #[test]
    fn right_answer_only_marks_key() {
        let course = course_with_keys(&[1]);
        let items = review(&course, &[Some(1)]);
        use OptionMark::{Correct, Neutral};
        assert_eq!(marks(&items[0]), vec![Neutral, Correct, Neutral, Neutral]);
        assert!(items[0].is_correct());
    }

    #[test]
    fn unanswered_question_has_no_incorrect_mark() {
        let course = course_with_keys(&[1, 0]);
        let items = review(&course, &[Some(1), None]);
        assert_eq!(items[1].number, 2);
        assert_eq!(items[1].user_index, None);
        assert_eq!(items[1].options[0].mark, OptionMark::Correct);
        assert!(
            items[1]
                .options
                .iter()
                .all(|o| o.mark != OptionMark::IncorrectSelected)
        );
    }
}
