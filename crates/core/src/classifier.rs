use serde::{Deserialize, Serialize};

use crate::model::{Modality, ModalityScores, QuizLevel};

//
// ─── CLASSIFICATION ────────────────────────────────────────────────────────────
//

/// Outcome of classifying a set of modality scores.
///
/// `dominance_percentage` is informational: it never changes `dominant`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub dominant: Modality,
    pub max_score: u32,
    pub second_score: u32,
    pub dominance_percentage: f64,
}

//
// ─── CLASSIFIER ────────────────────────────────────────────────────────────────
//

/// Maps per-modality correct-answer counts to a single dominant learning style.
///
/// Scores are walked in [`Modality::PRIORITY`] order and the running maximum
/// is replaced only on a strictly greater score, so ties go to the modality
/// listed first.
///
/// # Examples
///
/// ```
/// # use style_core::classifier::classify;
/// # use style_core::model::{Modality, ModalityScores};
/// assert_eq!(classify(&ModalityScores::new(5, 5, 0, 0)), Modality::Visual);
/// assert_eq!(classify(&ModalityScores::new(3, 7, 2, 1)), Modality::Auditory);
/// ```
#[must_use]
pub fn classify(scores: &ModalityScores) -> Modality {
    let mut best = Modality::PRIORITY[0];
    let mut best_score = scores.get(best);
    for modality in &Modality::PRIORITY[1..] {
        let score = scores.get(*modality);
        if score > best_score {
            best = *modality;
            best_score = score;
        }
    }
    best
}

/// Second-highest score among the four (equal to the max on a tie).
#[must_use]
pub fn second_highest(scores: &ModalityScores) -> u32 {
    let mut sorted = [
        scores.visual,
        scores.auditory,
        scores.reading_writing,
        scores.kinesthetic,
    ];
    sorted.sort_unstable();
    sorted[2]
}

/// Margin between the top and second-highest score as a percentage of the top.
///
/// Returns `0.0` when every score is zero.
#[must_use]
pub fn dominance_percentage(scores: &ModalityScores) -> f64 {
    let max = scores.get(classify(scores));
    if max == 0 {
        return 0.0;
    }
    let second = second_highest(scores);
    f64::from(max - second) / f64::from(max) * 100.0
}

/// Full classification including the dominance margin.
#[must_use]
pub fn classify_detailed(scores: &ModalityScores) -> Classification {
    let dominant = classify(scores);
    Classification {
        dominant,
        max_score: scores.get(dominant),
        second_score: second_highest(scores),
        dominance_percentage: dominance_percentage(scores),
    }
}

/// Difficulty tier for a user's age. See [`QuizLevel::from_age`].
#[must_use]
pub fn quiz_level(age: i64) -> QuizLevel {
    QuizLevel::from_age(age)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
