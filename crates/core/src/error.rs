use thiserror::Error;

use crate::gpa::GpaError;
use crate::model::BankError;
use crate::quiz::{SessionConfigError, SessionError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Config(#[from] SessionConfigError),
    #[error(transparent)]
    Gpa(#[from] GpaError),
}
