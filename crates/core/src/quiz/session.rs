use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::model::{Course, CourseIndex, Question, QuestionBank};
use crate::quiz::answers::AnswerSheet;
use crate::quiz::config::SessionConfig;
use crate::quiz::countdown::Countdown;
use crate::quiz::scoring::{ReviewItem, ScoreReport, review};

//
// ─── PHASES & EVENTS ───────────────────────────────────────────────────────────
//

/// Where an attempt currently stands.
///
/// `CourseSelect -> Rules -> InProgress -> Confirm* -> Result -> Review -> CourseSelect`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuizPhase {
    CourseSelect,
    Rules,
    InProgress,
    ConfirmPartialSubmit,
    ConfirmFullSubmit,
    Result,
    Review,
}

impl QuizPhase {
    /// Phases during which the countdown runs.
    ///
    /// Confirmation prompts overlay a running quiz, so the clock keeps going.
    #[must_use]
    pub fn is_timed(self) -> bool {
        matches!(
            self,
            Self::InProgress | Self::ConfirmPartialSubmit | Self::ConfirmFullSubmit
        )
    }

    #[must_use]
    pub fn is_submitted(self) -> bool {
        matches!(self, Self::Result | Self::Review)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CourseSelect => "course-select",
            Self::Rules => "rules",
            Self::InProgress => "in-progress",
            Self::ConfirmPartialSubmit => "confirm-partial-submit",
            Self::ConfirmFullSubmit => "confirm-full-submit",
            Self::Result => "result",
            Self::Review => "review",
        }
    }
}

impl fmt::Display for QuizPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that can happen to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizEvent {
    SelectCourse(CourseIndex),
    Start,
    SelectAnswer(usize),
    GoTo(usize),
    Next,
    Previous,
    RequestSubmit,
    CancelSubmit,
    ConfirmSubmit,
    Tick,
    OpenReview,
    TakeAnotherQuiz,
}

impl fmt::Display for QuizEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectCourse(index) => write!(f, "select-course({index})"),
            Self::Start => f.write_str("start"),
            Self::SelectAnswer(option) => write!(f, "select-answer({option})"),
            Self::GoTo(index) => write!(f, "go-to({index})"),
            Self::Next => f.write_str("next"),
            Self::Previous => f.write_str("previous"),
            Self::RequestSubmit => f.write_str("request-submit"),
            Self::CancelSubmit => f.write_str("cancel-submit"),
            Self::ConfirmSubmit => f.write_str("confirm-submit"),
            Self::Tick => f.write_str("tick"),
            Self::OpenReview => f.write_str("open-review"),
            Self::TakeAnotherQuiz => f.write_str("take-another-quiz"),
        }
    }
}

/// Completeness check driving which confirmation prompt is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitCheck {
    pub complete: bool,
    pub answered: usize,
    pub total: usize,
}

/// What a successfully applied event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizOutcome {
    Updated,
    SubmitRequested(SubmitCheck),
    Submitted(ScoreReport),
    Ticked { remaining: u32 },
    AutoSubmitted(ScoreReport),
    /// A tick arrived while the clock was not running.
    TickIgnored,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("course {index} is not in the question bank")]
    UnknownCourse { index: CourseIndex },

    #[error("option {option} is out of range")]
    OptionOutOfRange { option: usize },

    #[error("question {index} is out of range (course has {total})")]
    QuestionOutOfRange { index: usize, total: usize },

    #[error("{event} is not allowed during {phase}")]
    InvalidTransition { phase: QuizPhase, event: QuizEvent },
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One learner's attempt at a course quiz.
///
/// All transitions go through [`QuizSession::apply`]. A rejected event leaves
/// the session exactly as it was.
#[derive(Clone)]
pub struct QuizSession {
    bank: Arc<QuestionBank>,
    config: SessionConfig,
    phase: QuizPhase,
    selected: Option<CourseIndex>,
    answers: AnswerSheet,
    current: usize,
    countdown: Countdown,
    final_score: Option<u32>,
}

impl QuizSession {
    /// Fresh session showing the course list.
    #[must_use]
    pub fn new(bank: Arc<QuestionBank>, config: SessionConfig) -> Self {
        Self {
            bank,
            config,
            phase: QuizPhase::CourseSelect,
            selected: None,
            answers: AnswerSheet::default(),
            current: 0,
            countdown: Countdown::new(config.time_limit_secs()),
            final_score: None,
        }
    }

    /// Fresh session with `index` already picked, waiting on the rules screen.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownCourse` if the bank has no such course.
    pub fn with_course(
        bank: Arc<QuestionBank>,
        config: SessionConfig,
        index: CourseIndex,
    ) -> Result<Self, SessionError> {
        let mut session = Self::new(bank, config);
        session.apply(QuizEvent::SelectCourse(index))?;
        Ok(session)
    }

    /// Apply one event.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` when the event is not legal in
    /// the current phase, and range errors for bad course/question/option indices.
    pub fn apply(&mut self, event: QuizEvent) -> Result<QuizOutcome, SessionError> {
        match event {
            QuizEvent::SelectCourse(index) => self.select_course(index),
            QuizEvent::Start => {
                self.expect_phase(event, &[QuizPhase::Rules])?;
                self.phase = QuizPhase::InProgress;
                Ok(QuizOutcome::Updated)
            }
            QuizEvent::SelectAnswer(option) => {
                self.expect_phase(event, &[QuizPhase::InProgress])?;
                let options = self.current_question().map_or(0, |q| q.options().len());
                if option >= options {
                    return Err(SessionError::OptionOutOfRange { option });
                }
                self.answers.set(self.current, option);
                Ok(QuizOutcome::Updated)
            }
            QuizEvent::GoTo(index) => {
                self.expect_phase(event, &[QuizPhase::InProgress])?;
                let total = self.answers.len();
                if index >= total {
                    return Err(SessionError::QuestionOutOfRange { index, total });
                }
                self.current = index;
                Ok(QuizOutcome::Updated)
            }
            QuizEvent::Next => {
                self.expect_phase(event, &[QuizPhase::InProgress])?;
                if self.current + 1 < self.answers.len() {
                    self.current += 1;
                }
                Ok(QuizOutcome::Updated)
            }
            QuizEvent::Previous => {
                self.expect_phase(event, &[QuizPhase::InProgress])?;
                self.current = self.current.saturating_sub(1);
                Ok(QuizOutcome::Updated)
            }
            QuizEvent::RequestSubmit => {
                self.expect_phase(event, &[QuizPhase::InProgress])?;
                let check = self.submit_check();
                self.phase = if check.complete {
                    QuizPhase::ConfirmFullSubmit
                } else {
                    QuizPhase::ConfirmPartialSubmit
                };
                Ok(QuizOutcome::SubmitRequested(check))
            }
            QuizEvent::CancelSubmit => {
                self.expect_phase(
                    event,
                    &[QuizPhase::ConfirmPartialSubmit, QuizPhase::ConfirmFullSubmit],
                )?;
                self.phase = QuizPhase::InProgress;
                Ok(QuizOutcome::Updated)
            }
            QuizEvent::ConfirmSubmit => {
                self.expect_phase(
                    event,
                    &[QuizPhase::ConfirmPartialSubmit, QuizPhase::ConfirmFullSubmit],
                )?;
                Ok(QuizOutcome::Submitted(self.finish()?))
            }
            QuizEvent::Tick => self.tick(),
            QuizEvent::OpenReview => {
                self.expect_phase(event, &[QuizPhase::Result])?;
                self.phase = QuizPhase::Review;
                Ok(QuizOutcome::Updated)
            }
            QuizEvent::TakeAnotherQuiz => {
                self.expect_phase(event, &[QuizPhase::Review])?;
                self.teardown();
                Ok(QuizOutcome::Updated)
            }
        }
    }

    fn expect_phase(&self, event: QuizEvent, allowed: &[QuizPhase]) -> Result<(), SessionError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                phase: self.phase,
                event,
            })
        }
    }

    // Picking a course, even the same one again, always starts over.
    fn select_course(&mut self, index: CourseIndex) -> Result<QuizOutcome, SessionError> {
        let len = self
            .bank
            .get_course(index)
            .map(Course::question_count)
            .ok_or(SessionError::UnknownCourse { index })?;

        self.selected = Some(index);
        self.answers = AnswerSheet::new(len);
        self.current = 0;
        self.countdown.reset();
        self.final_score = None;
        self.phase = QuizPhase::Rules;
        Ok(QuizOutcome::Updated)
    }

    fn tick(&mut self) -> Result<QuizOutcome, SessionError> {
        if !self.phase.is_timed() {
            return Ok(QuizOutcome::TickIgnored);
        }
        let remaining = self.countdown.tick();
        if self.countdown.is_expired() {
            return Ok(QuizOutcome::AutoSubmitted(self.finish()?));
        }
        Ok(QuizOutcome::Ticked { remaining })
    }

    fn finish(&mut self) -> Result<ScoreReport, SessionError> {
        let report = {
            let course = self.course().ok_or(SessionError::InvalidTransition {
                phase: self.phase,
                event: QuizEvent::ConfirmSubmit,
            })?;
            ScoreReport::for_course(course, self.answers.as_slice())
        };
        self.final_score = Some(report.score);
        self.phase = QuizPhase::Result;
        Ok(report)
    }

    fn teardown(&mut self) {
        self.selected = None;
        self.answers = AnswerSheet::default();
        self.current = 0;
        self.countdown.reset();
        self.final_score = None;
        self.phase = QuizPhase::CourseSelect;
    }

    //
    // ─── READ ACCESS ───────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn selected_course(&self) -> Option<CourseIndex> {
        self.selected
    }

    #[must_use]
    pub fn course(&self) -> Option<&Course> {
        self.selected.and_then(|index| self.bank.get_course(index))
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    #[must_use]
    pub fn current_question_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.course().and_then(|course| course.question(self.current))
    }

    #[must_use]
    pub fn countdown(&self) -> Countdown {
        self.countdown
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.countdown.remaining()
    }

    /// True once the learner pressed start, until the session is torn down.
    #[must_use]
    pub fn is_started(&self) -> bool {
        !matches!(self.phase, QuizPhase::CourseSelect | QuizPhase::Rules)
    }

    #[must_use]
    pub fn is_timed(&self) -> bool {
        self.phase.is_timed()
    }

    #[must_use]
    pub fn final_score(&self) -> Option<u32> {
        self.final_score
    }

    #[must_use]
    pub fn submit_check(&self) -> SubmitCheck {
        SubmitCheck {
            complete: self.answers.is_complete(),
            answered: self.answers.answered_count(),
            total: self.answers.len(),
        }
    }

    #[must_use]
    pub fn score_report(&self) -> Option<ScoreReport> {
        let score = self.final_score?;
        Some(ScoreReport {
            score,
            total: u32::try_from(self.answers.len()).unwrap_or(u32::MAX),
        })
    }

    /// Annotated questions; only available after submission.
    #[must_use]
    pub fn review(&self) -> Option<Vec<ReviewItem>> {
        if !self.phase.is_submitted() {
            return None;
        }
        self.course()
            .map(|course| review(course, self.answers.as_slice()))
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("phase", &self.phase)
            .field("selected", &self.selected)
            .field("answered", &self.answers.answered_count())
            .field("current", &self.current)
            .field("remaining", &self.countdown.remaining())
            .field("final_score", &self.final_score)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
