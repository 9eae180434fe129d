use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classifier;
use crate::model::{Modality, ModalityScores, QuizLevel, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizResultError {
    #[error("total score ({total}) does not match modality scores ({sum})")]
    TotalMismatch { total: u64, sum: u64 },
}

/// Permanent record of one completed assessment attempt.
///
/// Created once at submission and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    user_id: UserId,
    scores: ModalityScores,
    total_score: u64,
    quiz_level: QuizLevel,
    time_taken_seconds: u64,
    dominant_style: Modality,
    dominance_percentage: f64,
    completed_at: DateTime<Utc>,
}

impl QuizResult {
    /// Classify the final scores and build the result for a submission.
    ///
    /// A `completed_at` earlier than `started_at` yields zero elapsed time.
    #[must_use]
    pub fn compute(
        user_id: UserId,
        scores: ModalityScores,
        age: i64,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let classification = classifier::classify_detailed(&scores);
        let elapsed = (completed_at - started_at).num_seconds().max(0);

        Self {
            user_id,
            scores,
            total_score: scores.total(),
            quiz_level: classifier::quiz_level(age),
            time_taken_seconds: u64::try_from(elapsed).unwrap_or(0),
            dominant_style: classification.dominant,
            dominance_percentage: classification.dominance_percentage,
            completed_at,
        }
    }

    /// Rehydrate a result from persisted storage.
    ///
    /// The stored dominant style is kept as-is, even if the classifier would
    /// pick differently today.
    ///
    /// # Errors
    ///
    /// Returns `QuizResultError::TotalMismatch` if the total disagrees with the scores.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        user_id: UserId,
        scores: ModalityScores,
        total_score: u64,
        quiz_level: QuizLevel,
        time_taken_seconds: u64,
        dominant_style: Modality,
        dominance_percentage: f64,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, QuizResultError> {
        let sum = scores.total();
        if sum != total_score {
            return Err(QuizResultError::TotalMismatch {
                total: total_score,
                sum,
            });
        }

        Ok(Self {
            user_id,
            scores,
            total_score,
            quiz_level,
            time_taken_seconds,
            dominant_style,
            dominance_percentage,
            completed_at,
        })
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn scores(&self) -> ModalityScores {
        self.scores
    }

    #[must_use]
    pub fn total_score(&self) -> u64 {
        self.total_score
    }

    #[must_use]
    pub fn quiz_level(&self) -> QuizLevel {
        self.quiz_level
    }

    #[must_use]
    pub fn time_taken_seconds(&self) -> u64 {
        self.time_taken_seconds
    }

    #[must_use]
    pub fn dominant_style(&self) -> Modality {
        self.dominant_style
    }

    #[must_use]
    pub fn dominance_percentage(&self) -> f64 {
        self.dominance_percentage
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn compute_fills_every_field() {
        let start = fixed_now();
        let end = start + Duration::seconds(754);
        let result = QuizResult::compute(
            UserId::new(7),
            ModalityScores::new(8, 6, 4, 9),
            16,
            start,
            end,
        );

        assert_eq!(result.dominant_style(), Modality::Kinesthetic);
        assert_eq!(result.quiz_level(), QuizLevel::Intermediate);
        assert_eq!(result.total_score(), 27);
        assert_eq!(result.time_taken_seconds(), 754);
        assert_eq!(result.completed_at(), end);
        assert!((result.dominance_percentage() - (1.0 / 9.0 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn clock_skew_never_yields_negative_duration() {
        let start = fixed_now();
        let result = QuizResult::compute(
            UserId::new(1),
            ModalityScores::default(),
            30,
            start,
            start - Duration::seconds(5),
        );
        assert_eq!(result.time_taken_seconds(), 0);
        assert_eq!(result.dominant_style(), Modality::Visual);
        assert_eq!(result.dominance_percentage(), 0.0);
    }

    #[test]
    fn from_persisted_checks_total() {
        let err = QuizResult::from_persisted(
            UserId::new(1),
            ModalityScores::new(1, 1, 1, 1),
            5,
            QuizLevel::Advanced,
            10,
            Modality::Visual,
            0.0,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, QuizResultError::TotalMismatch { total: 5, sum: 4 });
    }

    #[test]
    fn from_persisted_keeps_stored_style() {
        let result = QuizResult::from_persisted(
            UserId::new(1),
            ModalityScores::new(3, 3, 0, 0),
            6,
            QuizLevel::Beginner,
            10,
            Modality::Auditory,
            0.0,
            fixed_now(),
        )
        .unwrap();
        assert_eq!(result.dominant_style(), Modality::Auditory);
    }
}
