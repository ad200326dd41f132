use thiserror::Error;

/// Default time budget for one attempt: 20 minutes.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 20 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionConfigError {
    #[error("time limit must be > 0 seconds")]
    ZeroTimeLimit,
}

/// Settings applied to every session created from the same service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    time_limit_secs: u32,
}

impl SessionConfig {
    /// # Errors
    ///
    /// Returns `SessionConfigError::ZeroTimeLimit` for a zero budget.
    pub fn new(time_limit_secs: u32) -> Result<Self, SessionConfigError> {
        if time_limit_secs == 0 {
            return Err(SessionConfigError::ZeroTimeLimit);
        }
        Ok(Self { time_limit_secs })
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_twenty_minutes() {
        assert_eq!(SessionConfig::default().time_limit_secs(), 1200);
    }

    #[test]
    fn zero_limit_is_rejected() {
        assert_eq!(
            SessionConfig::new(0).unwrap_err(),
            SessionConfigError::ZeroTimeLimit
        );
        assert_eq!(SessionConfig::new(90).unwrap().time_limit_secs(), 90);
    }
}
