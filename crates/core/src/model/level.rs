use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown quiz level: {0}")]
pub struct ParseQuizLevelError(pub String);

/// Age-derived difficulty tier attached to a quiz result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl QuizLevel {
    /// Youngest age placed at `Intermediate`.
    pub const INTERMEDIATE_FROM_AGE: i64 = 14;
    /// Youngest age placed at `Advanced`.
    pub const ADVANCED_FROM_AGE: i64 = 20;

    /// Tier for the given age. Total over every integer.
    #[must_use]
    pub fn from_age(age: i64) -> Self {
        if age < Self::INTERMEDIATE_FROM_AGE {
            QuizLevel::Beginner
        } else if age >= Self::ADVANCED_FROM_AGE {
            QuizLevel::Advanced
        } else {
            QuizLevel::Intermediate
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuizLevel::Beginner => "beginner",
            QuizLevel::Intermediate => "intermediate",
            QuizLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for QuizLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuizLevel {
    type Err = ParseQuizLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(QuizLevel::Beginner),
            "intermediate" => Ok(QuizLevel::Intermediate),
            "advanced" => Ok(QuizLevel::Advanced),
            _ => Err(ParseQuizLevelError(s.to_owned())),
        }
    }
}
