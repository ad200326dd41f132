use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::model::course::{Course, CourseError};
use crate::model::ids::CourseIndex;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BankError {
    #[error("duplicate course code: {code}")]
    DuplicateCode { code: String },

    #[error(transparent)]
    Course(#[from] CourseError),
}

/// One row of the course listing shown before a quiz is picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseListing {
    pub index: CourseIndex,
    pub code: String,
    pub title: String,
    pub question_count: usize,
}

/// Read-only, ordered collection of courses.
///
/// Built once at startup and shared (usually behind an `Arc`) with every session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuestionBank {
    courses: Vec<Course>,
}

impl QuestionBank {
    /// Build a bank from already-validated courses.
    ///
    /// # Errors
    ///
    /// Returns `BankError::DuplicateCode` if two courses share a code.
    pub fn new(courses: Vec<Course>) -> Result<Self, BankError> {
        let mut seen = HashSet::with_capacity(courses.len());
        for course in &courses {
            if !seen.insert(course.code()) {
                return Err(BankError::DuplicateCode {
                    code: course.code().to_owned(),
                });
            }
        }
        Ok(Self { courses })
    }

    #[must_use]
    pub fn get_course(&self, index: CourseIndex) -> Option<&Course> {
        self.courses.get(index.value())
    }

    #[must_use]
    pub fn find_by_code(&self, code: &str) -> Option<CourseIndex> {
        let code = code.trim();
        self.courses
            .iter()
            .position(|course| course.code().eq_ignore_ascii_case(code))
            .map(CourseIndex::new)
    }

    #[must_use]
    pub fn list_courses(&self) -> Vec<CourseListing> {
        self.courses
            .iter()
            .enumerate()
            .map(|(i, course)| CourseListing {
                index: CourseIndex::new(i),
                code: course.code().to_owned(),
                title: course.title().to_owned(),
                question_count: course.question_count(),
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Question;

    fn course(code: &str, questions: usize) -> Course {
        let questions = (0..questions)
            .map(|i| {
                let options = ["a", "b", "c", "d"].map(String::from).to_vec();
                Question::new(format!("Q{i}"), options, i % 4).unwrap()
            })
            .collect();
        Course::new(code, format!("{code} title"), questions).unwrap()
    }

    #[test]
    fn listing_preserves_order_and_counts() {
        let bank = QuestionBank::new(vec![course("CSC204", 3), course("GST202", 1)]).unwrap();
        let listing = bank.list_courses();

        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].index, CourseIndex::new(0));
        assert_eq!(listing[0].code, "CSC204");
        assert_eq!(listing[0].question_count, 3);
        assert_eq!(listing[1].title, "GST202 title");
    }

    #[test]
    fn out_of_range_lookup_is_none() {
        let bank = QuestionBank::new(vec![course("CSC204", 1)]).unwrap();
        assert!(bank.get_course(CourseIndex::new(0)).is_some());
        assert!(bank.get_course(CourseIndex::new(1)).is_none());
    }

    #[test]
    fn duplicate_codes_are_rejected() {
        let err = QuestionBank::new(vec![course("CSC204", 1), course("CSC204", 2)]).unwrap_err();
        assert_eq!(
            err,
            BankError::DuplicateCode {
                code: "CSC204".into()
            }
        );
    }

    #[test]
    fn find_by_code_ignores_case() {
        let bank = QuestionBank::new(vec![course("CSC204", 1), course("GST202", 1)]).unwrap();
        assert_eq!(bank.find_by_code("gst202"), Some(CourseIndex::new(1)));
        assert_eq!(bank.find_by_code("MTH101"), None);
    }
}
