use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use quiz_core::model::{Course, CourseIndex, Question, QuestionBank};
use quiz_core::quiz::{OptionMark, QuizPhase, SessionConfig};
use quiz_core::time::{fixed_clock, fixed_now};
use services::{
    ManualTickScheduler, QuizService, TickCallback, TickGuard, TickScheduler, TokioTickScheduler,
    default_bank,
};

fn course(code: &str, keys: &[usize]) -> Course {
    let questions = keys
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let options = ["w", "x", "y", "z"].map(String::from).to_vec();
            Question::new(format!("{code} question {}", i + 1), options, *key).unwrap()
        })
        .collect();
    Course::new(code, format!("{code} course"), questions).unwrap()
}

fn bank() -> Arc<QuestionBank> {
    Arc::new(
        QuestionBank::new(vec![course("TWO", &[1, 0]), course("THREE", &[0, 1, 2])]).unwrap(),
    )
}

fn manual_service(limit: u32) -> (QuizService, ManualTickScheduler) {
    let scheduler = ManualTickScheduler::new();
    let service = QuizService::new(bank(), Arc::new(scheduler.clone()))
        .with_config(SessionConfig::new(limit).unwrap())
        .with_clock(fixed_clock());
    (service, scheduler)
}

#[test]
fn expiry_submits_partial_answers_and_review_marks_them() {
    let (service, scheduler) = manual_service(1200);
    let handle = service.start_session(CourseIndex::new(0)).unwrap();
    handle.begin().unwrap();
    handle.answer(1).unwrap();

    assert_eq!(scheduler.fire_n(1199), 1199);
    assert_eq!(handle.snapshot().clock, "00:01");
    assert_eq!(handle.snapshot().phase, QuizPhase::InProgress);

    scheduler.fire();

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.phase, QuizPhase::Result);
    assert_eq!(snapshot.remaining_secs, 0);
    assert_eq!(snapshot.score.unwrap().to_string(), "1 / 2");
    assert!(!handle.is_timer_armed());
    assert_eq!(scheduler.armed(), 0);

    let summary = handle.summary().unwrap();
    assert!(summary.auto_submitted);
    assert_eq!(summary.time_used_secs, 1200);
    assert_eq!(summary.course_code, "TWO");

    handle.open_review().unwrap();
    let review = handle.get_review().unwrap();
    assert_eq!(review[0].options[1].mark, OptionMark::Correct);
    assert_eq!(review[0].user_index, Some(1));
    assert_eq!(review[1].options[0].mark, OptionMark::Correct);
    assert!(
        review[1]
            .options
            .iter()
            .all(|o| o.mark != OptionMark::IncorrectSelected)
    );
}

#[test]
fn ticks_after_voluntary_submit_change_nothing() {
    let (service, scheduler) = manual_service(1200);
    let handle = service.start_session(CourseIndex::new(1)).unwrap();
    handle.begin().unwrap();
    scheduler.fire_n(10);

    for (i, option) in [0, 1, 2].into_iter().enumerate() {
        handle.go_to(i).unwrap();
        handle.answer(option).unwrap();
    }
    let check = handle.request_submit().unwrap();
    assert!(check.complete);
    assert_eq!(handle.snapshot().phase, QuizPhase::ConfirmFullSubmit);

    let report = handle.confirm_submit().unwrap();
    assert_eq!((report.score, report.total), (3, 3));
    assert!(!handle.is_timer_armed());

    assert_eq!(scheduler.fire_n(5), 0);
    assert!(!handle.tick());
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.remaining_secs, 1190);
    assert_eq!(snapshot.phase, QuizPhase::Result);
    assert_eq!(snapshot.score.unwrap().score, 3);
    assert!(!handle.summary().unwrap().auto_submitted);
}

#[test]
fn partial_submit_can_be_withdrawn() {
    let (service, scheduler) = manual_service(1200);
    let handle = service.start_session(CourseIndex::new(1)).unwrap();
    handle.begin().unwrap();
    handle.answer(0).unwrap();

    let check = handle.request_submit().unwrap();
    assert!(!check.complete);
    assert_eq!((check.answered, check.total), (1, 3));
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.phase, QuizPhase::ConfirmPartialSubmit);
    assert_eq!(snapshot.unanswered, vec![1, 2]);

    // The clock keeps running behind the prompt.
    scheduler.fire();
    assert!(handle.is_timer_armed());

    handle.cancel_submit().unwrap();
    handle.next().unwrap();
    handle.answer(1).unwrap();
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.phase, QuizPhase::InProgress);
    assert_eq!(snapshot.answered_mask, vec![true, true, false]);
    assert_eq!(snapshot.unanswered, vec![2]);
    assert_eq!(snapshot.remaining_secs, 1199);
}

#[test]
fn switching_course_mid_quiz_releases_timer_and_resets() {
    let (service, scheduler) = manual_service(1200);
    let handle = service.start_session(CourseIndex::new(0)).unwrap();
    handle.begin().unwrap();
    handle.answer(0).unwrap();
    scheduler.fire_n(42);

    handle.select_course(CourseIndex::new(1)).unwrap();
    assert!(!handle.is_timer_armed());
    assert_eq!(scheduler.fire(), 0);

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.phase, QuizPhase::Rules);
    assert_eq!(snapshot.remaining_secs, 1200);
    assert_eq!(snapshot.question_total, 3);
    assert_eq!(snapshot.answered, 0);
    assert_eq!(snapshot.question_number, 1);

    handle.begin().unwrap();
    assert_eq!(scheduler.armed(), 1);
}

#[test]
fn dropping_handle_releases_timer() {
    let (service, scheduler) = manual_service(1200);
    let handle = service.start_session(CourseIndex::new(0)).unwrap();
    handle.begin().unwrap();
    assert_eq!(scheduler.armed(), 1);

    drop(handle);
    assert_eq!(scheduler.fire(), 0);
}

#[test]
fn take_another_quiz_returns_to_course_list() {
    let (service, _scheduler) = manual_service(5);
    let handle = service.start_session(CourseIndex::new(0)).unwrap();
    handle.begin().unwrap();
    for _ in 0..4 {
        assert!(!handle.tick());
    }
    assert!(handle.tick());
    assert!(handle.get_review().is_ok());

    handle.open_review().unwrap();
    handle.take_another_quiz().unwrap();

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.phase, QuizPhase::CourseSelect);
    assert!(snapshot.course_code.is_none());
    assert_eq!(snapshot.remaining_secs, 5);
    assert!(handle.summary().is_none());
    assert!(handle.get_review().is_err());
}

#[test]
fn summary_timestamps_follow_the_injected_clock() {
    let clock = fixed_clock();
    let scheduler = ManualTickScheduler::new();
    let service = QuizService::new(bank(), Arc::new(scheduler.clone()))
        .with_config(SessionConfig::new(60).unwrap())
        .with_clock(clock.clone());
    let handle = service.start_session(CourseIndex::new(0)).unwrap();
    handle.begin().unwrap();

    scheduler.fire_n(45);
    clock.advance_secs(45);
    handle.request_submit().unwrap();
    handle.confirm_submit().unwrap();

    let summary = handle.summary().unwrap();
    assert_eq!(summary.started_at, fixed_now());
    assert_eq!(summary.completed_at, fixed_now() + ChronoDuration::seconds(45));
    assert_eq!(summary.time_used_secs, 45);
    assert_eq!(summary.score(), 0);
    assert_eq!(summary.total(), 2);
}

/// Keeps every callback it was given, even after the guard is released, like
/// a tick that was already on its way when the timer was cancelled.
#[derive(Clone, Default)]
struct LateTickScheduler {
    callbacks: Arc<Mutex<Vec<TickCallback>>>,
}

impl LateTickScheduler {
    fn deliver(&self, arming: usize) {
        let mut callbacks = self.callbacks.lock().unwrap();
        let on_tick = &mut callbacks[arming];
        on_tick();
    }
}

impl TickScheduler for LateTickScheduler {
    fn every_second(&self, on_tick: TickCallback) -> TickGuard {
        self.callbacks.lock().unwrap().push(on_tick);
        TickGuard::new(|| {})
    }
}

#[test]
fn late_tick_from_a_released_timer_is_dropped() {
    let scheduler = LateTickScheduler::default();
    let service = QuizService::new(bank(), Arc::new(scheduler.clone()))
        .with_config(SessionConfig::new(60).unwrap());
    let handle = service.start_session(CourseIndex::new(0)).unwrap();
    handle.begin().unwrap();
    scheduler.deliver(0);
    assert_eq!(handle.snapshot().remaining_secs, 59);

    // Switching course releases the first timer while its tick is still pending.
    handle.select_course(CourseIndex::new(1)).unwrap();
    scheduler.deliver(0);
    assert_eq!(handle.snapshot().remaining_secs, 60);

    handle.begin().unwrap();
    scheduler.deliver(0);
    assert_eq!(handle.snapshot().remaining_secs, 60);

    scheduler.deliver(1);
    assert_eq!(handle.snapshot().remaining_secs, 59);
}

#[tokio::test(start_paused = true)]
async fn tokio_timer_auto_submits_and_notifies() {
    let scheduler = TokioTickScheduler::current().unwrap();
    let service = QuizService::new(bank(), Arc::new(scheduler))
        .with_config(SessionConfig::new(3).unwrap());
    let handle = service.start_session(CourseIndex::new(0)).unwrap();
    let mut updates = handle.timer_updates();

    handle.begin().unwrap();
    handle.answer(1).unwrap();

    tokio::time::sleep(Duration::from_millis(3500)).await;

    let status = *updates.borrow_and_update();
    assert_eq!(status.phase, QuizPhase::Result);
    assert_eq!(status.remaining_secs, 0);
    assert!(!status.running);
    assert_eq!(handle.snapshot().score.unwrap().score, 1);
    assert!(!handle.is_timer_armed());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(handle.snapshot().phase, QuizPhase::Result);
}

#[test]
fn default_bank_runs_a_full_attempt() {
    let scheduler = ManualTickScheduler::new();
    let service = QuizService::new(Arc::new(default_bank().unwrap()), Arc::new(scheduler));
    let index = service.bank().find_by_code("CSC204").unwrap();
    let handle = service.start_session(index).unwrap();
    handle.begin().unwrap();

    let total = handle.snapshot().question_total;
    for i in 0..total {
        handle.go_to(i).unwrap();
        handle.answer(0).unwrap();
    }
    assert!(handle.request_submit().unwrap().complete);
    let report = handle.confirm_submit().unwrap();
    assert_eq!(report.total, 30);
    assert!(report.score <= 30);
}
