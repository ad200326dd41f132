use std::fmt;

/// Render whole seconds as zero-padded `MM:SS`.
#[must_use]
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Remaining time for one attempt, floored at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    budget: u32,
    remaining: u32,
}

impl Countdown {
    #[must_use]
    pub fn new(budget: u32) -> Self {
        Self {
            budget,
            remaining: budget,
        }
    }

    /// Consume one second and return what is left.
    pub fn tick(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    pub fn reset(&mut self) {
        self.remaining = self.budget;
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn budget(&self) -> u32 {
        self.budget
    }

    #[must_use]
    pub fn elapsed(&self) -> u32 {
        self.budget - self.remaining
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_clock(self.remaining))
    }
}
