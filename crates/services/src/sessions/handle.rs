use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use quiz_core::Clock;
use quiz_core::model::CourseIndex;
use quiz_core::quiz::{
    QuizEvent, QuizOutcome, QuizSession, ReviewItem, ScoreReport, SessionError, SubmitCheck,
};

use super::summary::QuizSummary;
use super::view::{QuizSnapshot, TimerStatus};
use crate::error::QuizServiceError;
use crate::scheduler::{TickCallback, TickGuard, TickScheduler, lock};

//
// ─── SHARED STATE ──────────────────────────────────────────────────────────────
//

/// Session plus the resources tied to its running phases.
///
/// Everything lives behind one mutex so a transition and the release of the
/// tick guard happen in the same critical section.
struct Inner {
    session: QuizSession,
    timer: Option<TickGuard>,
    /// Bumped on every `begin`; a tick carrying an older value is dropped.
    timer_generation: u64,
    started_at: Option<DateTime<Utc>>,
    summary: Option<QuizSummary>,
    status: watch::Sender<TimerStatus>,
}

impl Inner {
    fn dispatch(&mut self, event: QuizEvent, clock: &Clock) -> Result<QuizOutcome, SessionError> {
        let was_timed = self.session.is_timed();
        let outcome = self.session.apply(event).inspect_err(|err| {
            warn!(%event, phase = %self.session.phase(), error = %err, "quiz event rejected");
        })?;

        if was_timed && !self.session.is_timed() {
            if let Some(guard) = self.timer.take() {
                guard.cancel();
                debug!(phase = %self.session.phase(), "quiz timer released");
            }
        }

        match outcome {
            QuizOutcome::TickIgnored => return Ok(outcome),
            QuizOutcome::Ticked { .. } => {}
            QuizOutcome::Submitted(report) => {
                info!(%report, "quiz submitted");
                self.record_summary(report, false, clock);
            }
            QuizOutcome::AutoSubmitted(report) => {
                info!(%report, "quiz time expired, submitted automatically");
                self.record_summary(report, true, clock);
            }
            QuizOutcome::Updated | QuizOutcome::SubmitRequested(_) => {
                debug!(%event, phase = %self.session.phase(), "quiz event applied");
            }
        }

        if matches!(
            event,
            QuizEvent::SelectCourse(_) | QuizEvent::TakeAnotherQuiz
        ) {
            self.started_at = None;
            self.summary = None;
        }

        self.status.send_replace(TimerStatus::of(&self.session));
        Ok(outcome)
    }

    fn record_summary(&mut self, report: ScoreReport, auto_submitted: bool, clock: &Clock) {
        let Some(course) = self.session.course() else {
            return;
        };
        let completed_at = clock.now();
        self.summary = Some(QuizSummary {
            course_code: course.code().to_owned(),
            course_title: course.title().to_owned(),
            report,
            auto_submitted,
            started_at: self.started_at.unwrap_or(completed_at),
            completed_at,
            time_used_secs: self.session.countdown().elapsed(),
        });
    }
}

// A tick may already be waiting on the lock when its guard is cancelled, so
// the callback checks that its own arming is still the live one.
fn tick_callback(inner: Weak<Mutex<Inner>>, generation: u64, clock: Clock) -> TickCallback {
    Box::new(move || {
        let Some(inner) = inner.upgrade() else {
            return;
        };
        let mut inner = lock(&inner);
        if inner.timer.is_none() || inner.timer_generation != generation {
            debug!(generation, "stale quiz tick dropped");
            return;
        }
        let _ = inner.dispatch(QuizEvent::Tick, &clock);
    })
}

//
// ─── HANDLE ────────────────────────────────────────────────────────────────────
//

/// Host-facing handle to one quiz session.
///
/// `begin` arms the injected scheduler; the timer is released synchronously on
/// submission, expiry, course switch, teardown, or when the handle is dropped.
pub struct SessionHandle {
    inner: Arc<Mutex<Inner>>,
    scheduler: Arc<dyn TickScheduler>,
    clock: Clock,
}

impl SessionHandle {
    pub(crate) fn new(
        session: QuizSession,
        scheduler: Arc<dyn TickScheduler>,
        clock: Clock,
    ) -> Self {
        let (status, _) = watch::channel(TimerStatus::of(&session));
        Self {
            inner: Arc::new(Mutex::new(Inner {
                session,
                timer: None,
                timer_generation: 0,
                started_at: None,
                summary: None,
                status,
            })),
            scheduler,
            clock,
        }
    }

    fn dispatch(&self, event: QuizEvent) -> Result<QuizOutcome, QuizServiceError> {
        Ok(lock(&self.inner).dispatch(event, &self.clock)?)
    }

    /// Pick (or re-pick) a course. Always resets the attempt.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` for an unknown course index.
    pub fn select_course(&self, index: CourseIndex) -> Result<(), QuizServiceError> {
        self.dispatch(QuizEvent::SelectCourse(index)).map(drop)
    }

    /// Leave the rules screen and start the countdown.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` unless the session is on the rules screen.
    pub fn begin(&self) -> Result<(), QuizServiceError> {
        let mut inner = lock(&self.inner);
        inner.dispatch(QuizEvent::Start, &self.clock)?;
        inner.started_at = Some(self.clock.now());
        inner.timer_generation += 1;
        let callback = tick_callback(
            Arc::downgrade(&self.inner),
            inner.timer_generation,
            self.clock.clone(),
        );
        inner.timer = Some(self.scheduler.every_second(callback));
        info!(
            course = inner.session.course().map_or("", |c| c.code()),
            remaining = inner.session.remaining_seconds(),
            "quiz started"
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` outside `InProgress` or for a bad option.
    pub fn answer(&self, option: usize) -> Result<(), QuizServiceError> {
        self.dispatch(QuizEvent::SelectAnswer(option)).map(drop)
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` outside `InProgress` or for a bad index.
    pub fn go_to(&self, index: usize) -> Result<(), QuizServiceError> {
        self.dispatch(QuizEvent::GoTo(index)).map(drop)
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` outside `InProgress`.
    pub fn next(&self) -> Result<(), QuizServiceError> {
        self.dispatch(QuizEvent::Next).map(drop)
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` outside `InProgress`.
    pub fn previous(&self) -> Result<(), QuizServiceError> {
        self.dispatch(QuizEvent::Previous).map(drop)
    }

    /// Ask to submit; the answer tells the host which confirmation to show.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` outside `InProgress`.
    pub fn request_submit(&self) -> Result<SubmitCheck, QuizServiceError> {
        let mut inner = lock(&self.inner);
        match inner.dispatch(QuizEvent::RequestSubmit, &self.clock)? {
            QuizOutcome::SubmitRequested(check) => Ok(check),
            _ => Ok(inner.session.submit_check()),
        }
    }

    /// Back out of a confirmation prompt.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` when no confirmation is showing.
    pub fn cancel_submit(&self) -> Result<(), QuizServiceError> {
        self.dispatch(QuizEvent::CancelSubmit).map(drop)
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` when no confirmation is showing.
    pub fn confirm_submit(&self) -> Result<ScoreReport, QuizServiceError> {
        let mut inner = lock(&self.inner);
        inner.dispatch(QuizEvent::ConfirmSubmit, &self.clock)?;
        inner
            .session
            .score_report()
            .ok_or(QuizServiceError::NotSubmitted {
                phase: inner.session.phase(),
            })
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` outside the result screen.
    pub fn open_review(&self) -> Result<(), QuizServiceError> {
        self.dispatch(QuizEvent::OpenReview).map(drop)
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::ReviewUnavailable` before submission.
    pub fn get_review(&self) -> Result<Vec<ReviewItem>, QuizServiceError> {
        let inner = lock(&self.inner);
        inner
            .session
            .review()
            .ok_or(QuizServiceError::ReviewUnavailable {
                phase: inner.session.phase(),
            })
    }

    /// Deliver one tick from a host-driven scheduler.
    ///
    /// Returns `true` only when this tick ran the clock out and submitted.
    pub fn tick(&self) -> bool {
        matches!(
            self.dispatch(QuizEvent::Tick),
            Ok(QuizOutcome::AutoSubmitted(_))
        )
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` outside the review screen.
    pub fn take_another_quiz(&self) -> Result<(), QuizServiceError> {
        self.dispatch(QuizEvent::TakeAnotherQuiz).map(drop)
    }

    #[must_use]
    pub fn snapshot(&self) -> QuizSnapshot {
        QuizSnapshot::of(&lock(&self.inner).session)
    }

    #[must_use]
    pub fn summary(&self) -> Option<QuizSummary> {
        lock(&self.inner).summary.clone()
    }

    /// Subscribe to countdown updates, including expiry-driven submission.
    #[must_use]
    pub fn timer_updates(&self) -> watch::Receiver<TimerStatus> {
        lock(&self.inner).status.subscribe()
    }

    /// True while a tick source is armed for this session.
    #[must_use]
    pub fn is_timer_armed(&self) -> bool {
        lock(&self.inner).timer.is_some()
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        drop(lock(&self.inner).timer.take());
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("SessionHandle")
            .field("session", &inner.session)
            .field("timer_armed", &inner.timer.is_some())
            .finish_non_exhaustive()
    }
}
