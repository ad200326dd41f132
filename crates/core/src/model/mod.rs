mod bank;
mod course;
mod ids;
mod question;

pub use ids::{CourseIndex, ParseIdError};

pub use bank::{BankError, CourseListing, QuestionBank};
pub use course::{Course, CourseError};
pub use question::{OPTIONS_PER_QUESTION, Question, QuestionError};
