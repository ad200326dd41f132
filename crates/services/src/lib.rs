#![forbid(unsafe_code)]

pub mod bank_loader;
pub mod error;
pub mod scheduler;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use bank_loader::{default_bank, load_bank_from_path, load_bank_from_str};
pub use error::{BankLoadError, QuizServiceError, SchedulerError};
pub use scheduler::{ManualTickScheduler, TickCallback, TickGuard, TickScheduler, TokioTickScheduler};

pub use sessions::{QuizService, QuizSnapshot, QuizSummary, SessionHandle, TimerStatus};
