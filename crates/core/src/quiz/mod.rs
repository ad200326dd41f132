//! Timed multiple-choice quiz: answer storage, countdown, scoring and the
//! session state machine that ties them together.

mod answers;
mod config;
mod countdown;
mod scoring;
mod session;

pub use answers::AnswerSheet;
pub use config::{DEFAULT_TIME_LIMIT_SECS, SessionConfig, SessionConfigError};
pub use countdown::{Countdown, format_clock};
pub use scoring::{OptionMark, ReviewItem, ReviewOption, ScoreReport, classify_option, review, score};
pub use session::{
    QuizEvent, QuizOutcome, QuizPhase, QuizSession, SessionError, SubmitCheck,
};
