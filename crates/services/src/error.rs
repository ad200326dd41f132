//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use quiz_core::model::BankError;
use quiz_core::quiz::{QuizPhase, SessionError};

/// Errors emitted while loading a question bank.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankLoadError {
    #[error("failed to read question bank {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed question bank: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Bank(#[from] BankError),
}

/// Errors emitted by the tick scheduler.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SchedulerError {
    #[error("no tokio runtime is available to drive the quiz timer")]
    NoRuntime,
}

/// Errors emitted by `QuizService` and `SessionHandle`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("review is not available during {phase}")]
    ReviewUnavailable { phase: QuizPhase },
    #[error("no score has been recorded during {phase}")]
    NotSubmitted { phase: QuizPhase },
}
