use std::fmt;
use std::sync::Arc;

use tracing::info;

use quiz_core::Clock;
use quiz_core::model::{CourseIndex, CourseListing, QuestionBank};
use quiz_core::quiz::{QuizSession, SessionConfig};

use super::handle::SessionHandle;
use crate::error::QuizServiceError;
use crate::scheduler::TickScheduler;

/// Entry point for hosts embedding the quiz engine.
///
/// This service owns:
/// - the read-only question bank
/// - the session configuration (time budget)
/// - the tick scheduler and the time source (`Clock`)
///
/// It does **not** own presentation.
#[derive(Clone)]
pub struct QuizService {
    bank: Arc<QuestionBank>,
    config: SessionConfig,
    scheduler: Arc<dyn TickScheduler>,
    clock: Clock,
}

impl QuizService {
    #[must_use]
    pub fn new(bank: Arc<QuestionBank>, scheduler: Arc<dyn TickScheduler>) -> Self {
        Self {
            bank,
            config: SessionConfig::default(),
            scheduler,
            clock: Clock::system(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    #[must_use]
    pub fn list_courses(&self) -> Vec<CourseListing> {
        self.bank.list_courses()
    }

    /// A session on the course list, with nothing picked yet.
    #[must_use]
    pub fn open_session(&self) -> SessionHandle {
        let session = QuizSession::new(Arc::clone(&self.bank), self.config);
        SessionHandle::new(session, Arc::clone(&self.scheduler), self.clock.clone())
    }

    /// Pick a course and land on its rules screen. The clock starts with `begin`.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` if the bank has no such course.
    pub fn start_session(&self, index: CourseIndex) -> Result<SessionHandle, QuizServiceError> {
        let session = QuizSession::with_course(Arc::clone(&self.bank), self.config, index)?;
        if let Some(course) = session.course() {
            info!(
                course = course.code(),
                questions = course.question_count(),
                time_limit = self.config.time_limit_secs(),
                "quiz session opened"
            );
        }
        Ok(SessionHandle::new(
            session,
            Arc::clone(&self.scheduler),
            self.clock.clone(),
        ))
    }
}

impl fmt::Debug for QuizService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizService")
            .field("courses", &self.bank.len())
            .field("config", &self.config)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualTickScheduler;
    use quiz_core::model::{Course, Question};
    use quiz_core::quiz::QuizPhase;

    fn service() -> QuizService {
        let options = ["a", "b", "c", "d"].map(String::from).to_vec();
        let course = Course::new(
            "T100",
            "Test",
            vec![Question::new("Q", options, 1).unwrap()],
        )
        .unwrap();
        let bank = Arc::new(QuestionBank::new(vec![course]).unwrap());
        QuizService::new(bank, Arc::new(ManualTickScheduler::new()))
    }

    #[test]
    fn start_session_lands_on_rules() {
        let handle = service().start_session(CourseIndex::new(0)).unwrap();
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.phase, QuizPhase::Rules);
        assert_eq!(snapshot.clock, "20:00");
        assert!(!handle.is_timer_armed());
    }

    #[test]
    fn start_session_rejects_unknown_course() {
        let err = service().start_session(CourseIndex::new(3)).unwrap_err();
        assert!(matches!(err, QuizServiceError::Session(_)));
    }

    #[test]
    fn open_session_starts_on_course_list() {
        let svc = service();
        assert_eq!(svc.list_courses().len(), 1);
        let snapshot = svc.open_session().snapshot();
        assert_eq!(snapshot.phase, QuizPhase::CourseSelect);
        assert_eq!(snapshot.question_number, 0);
    }
}
