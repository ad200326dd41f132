use chrono::{DateTime, Utc};
use serde::Serialize;

use quiz_core::quiz::ScoreReport;

/// Outcome of a finished attempt, kept in memory for the result screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizSummary {
    pub course_code: String,
    pub course_title: String,
    pub report: ScoreReport,
    /// True when the countdown ran out rather than the learner confirming.
    pub auto_submitted: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Seconds of the time budget consumed, counted from ticks.
    pub time_used_secs: u32,
}

impl QuizSummary {
    #[must_use]
    pub fn score(&self) -> u32 {
        self.report.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.report.total
    }
}
