//! Grade-point average calculator on a five-point scale (A = 5 … F = 0).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GpaError {
    #[error("unknown grade: {raw}")]
    UnknownGrade { raw: String },

    #[error("course code cannot be empty")]
    EmptyCode,

    #[error("credit units must be > 0 for {code}")]
    ZeroCreditUnits { code: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Grade {
    #[must_use]
    pub fn points(self) -> u32 {
        match self {
            Self::A => 5,
            Self::B => 4,
            Self::C => 3,
            Self::D => 2,
            Self::E => 1,
            Self::F => 0,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::F => "F",
        };
        f.write_str(letter)
    }
}

impl FromStr for Grade {
    type Err = GpaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            "E" => Ok(Self::E),
            "F" => Ok(Self::F),
            _ => Err(GpaError::UnknownGrade { raw: s.to_owned() }),
        }
    }
}

/// A course taken in one semester together with the grade earned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradedCourse {
    code: String,
    grade: Grade,
    credit_units: u32,
}

impl GradedCourse {
    /// # Errors
    ///
    /// Returns `GpaError` for a blank code or zero credit units.
    pub fn new(code: impl Into<String>, grade: Grade, credit_units: u32) -> Result<Self, GpaError> {
        let code = code.into().trim().to_owned();
        if code.is_empty() {
            return Err(GpaError::EmptyCode);
        }
        if credit_units == 0 {
            return Err(GpaError::ZeroCreditUnits { code });
        }
        Ok(Self {
            code,
            grade,
            credit_units,
        })
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn grade(&self) -> Grade {
        self.grade
    }

    #[must_use]
    pub fn credit_units(&self) -> u32 {
        self.credit_units
    }

    #[must_use]
    pub fn quality_points(&self) -> u64 {
        u64::from(self.grade.points()) * u64::from(self.credit_units)
    }
}

/// Totals for one semester: quality points, credit units and the resulting GPA.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SemesterResult {
    pub tqp: u64,
    pub tcu: u64,
    pub gpa: f64,
}

impl SemesterResult {
    #[must_use]
    pub fn from_courses(courses: &[GradedCourse]) -> Self {
        let tqp = total(courses.iter().map(GradedCourse::quality_points));
        let tcu = total(courses.iter().map(|c| u64::from(c.credit_units())));
        Self {
            tqp,
            tcu,
            gpa: ratio(tqp, tcu),
        }
    }
}

/// Cumulative GPA across semesters, weighted by credit units.
#[must_use]
pub fn cumulative_gpa(semesters: &[SemesterResult]) -> f64 {
    let tqp = total(semesters.iter().map(|s| s.tqp));
    let tcu = total(semesters.iter().map(|s| s.tcu));
    ratio(tqp, tcu)
}

fn total(values: impl Iterator<Item = u64>) -> u64 {
    values.fold(0, u64::saturating_add)
}

#[allow(clippy::cast_precision_loss)]
fn ratio(tqp: u64, tcu: u64) -> f64 {
    if tcu == 0 {
        return 0.0;
    }
    round2(tqp as f64 / tcu as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
