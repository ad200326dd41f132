use serde::Serialize;

use quiz_core::quiz::{QuizPhase, QuizSession, ScoreReport, format_clock};

/// Countdown state broadcast to the host after every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerStatus {
    pub phase: QuizPhase,
    pub remaining_secs: u32,
    pub running: bool,
}

impl TimerStatus {
    #[must_use]
    pub fn of(session: &QuizSession) -> Self {
        Self {
            phase: session.phase(),
            remaining_secs: session.remaining_seconds(),
            running: session.is_timed(),
        }
    }

    #[must_use]
    pub fn clock(&self) -> String {
        format_clock(self.remaining_secs)
    }
}

/// Presentation-agnostic picture of a session.
///
/// No styling or localisation; the host decides how to render it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizSnapshot {
    #[serde(serialize_with = "serialize_phase")]
    pub phase: QuizPhase,
    pub course_code: Option<String>,
    pub course_title: Option<String>,
    /// 1-based; 0 when no course is selected.
    pub question_number: usize,
    pub question_total: usize,
    pub prompt: Option<String>,
    pub options: Vec<String>,
    pub selected_option: Option<usize>,
    /// One flag per question, for the number pad.
    pub answered_mask: Vec<bool>,
    /// 0-based indices still waiting for an answer.
    pub unanswered: Vec<usize>,
    pub answered: usize,
    pub progress_percent: f64,
    pub remaining_secs: u32,
    pub clock: String,
    pub score: Option<ScoreReport>,
}

fn serialize_phase<S: serde::Serializer>(phase: &QuizPhase, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(phase.as_str())
}

impl QuizSnapshot {
    #[must_use]
    pub fn of(session: &QuizSession) -> Self {
        let course = session.course();
        let question = session.current_question();
        let answers = session.answers();
        let current = session.current_question_index();

        Self {
            phase: session.phase(),
            course_code: course.map(|c| c.code().to_owned()),
            course_title: course.map(|c| c.title().to_owned()),
            question_number: if course.is_some() { current + 1 } else { 0 },
            question_total: answers.len(),
            prompt: question.map(|q| q.prompt().to_owned()),
            options: question.map(|q| q.options().to_vec()).unwrap_or_default(),
            selected_option: answers.get(current),
            answered_mask: answers.as_slice().iter().map(Option::is_some).collect(),
            unanswered: answers.unanswered(),
            answered: answers.answered_count(),
            progress_percent: answers.progress_percent(),
            remaining_secs: session.remaining_seconds(),
            clock: session.countdown().to_string(),
            score: session.score_report(),
        }
    }
}
