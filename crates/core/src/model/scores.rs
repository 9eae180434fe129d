use serde::{Deserialize, Serialize};

use crate::model::Modality;

/// Correct-answer counters, one per modality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModalityScores {
    pub visual: u32,
    pub auditory: u32,
    pub reading_writing: u32,
    pub kinesthetic: u32,
}

/// Scores built from signed input, with a record of whether anything was clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampedScores {
    pub scores: ModalityScores,
    pub clamped: bool,
}

impl ModalityScores {
    #[must_use]
    pub fn new(visual: u32, auditory: u32, reading_writing: u32, kinesthetic: u32) -> Self {
        Self {
            visual,
            auditory,
            reading_writing,
            kinesthetic,
        }
    }

    /// Build scores from signed counters, clamping negatives to zero.
    ///
    /// Values above `u32::MAX` saturate.
    #[must_use]
    pub fn from_signed(
        visual: i64,
        auditory: i64,
        reading_writing: i64,
        kinesthetic: i64,
    ) -> ClampedScores {
        let raw = [visual, auditory, reading_writing, kinesthetic];
        let clamped = raw.iter().any(|v| *v < 0);
        let [v, a, r, k] = raw.map(|v| u32::try_from(v.max(0)).unwrap_or(u32::MAX));
        ClampedScores {
            scores: Self::new(v, a, r, k),
            clamped,
        }
    }

    #[must_use]
    pub fn get(&self, modality: Modality) -> u32 {
        match modality {
            Modality::Visual => self.visual,
            Modality::Auditory => self.auditory,
            Modality::ReadingWriting => self.reading_writing,
            Modality::Kinesthetic => self.kinesthetic,
        }
    }

    /// Add one point to the given modality.
    pub fn increment(&mut self, modality: Modality) {
        let slot = match modality {
            Modality::Visual => &mut self.visual,
            Modality::Auditory => &mut self.auditory,
            Modality::ReadingWriting => &mut self.reading_writing,
            Modality::Kinesthetic => &mut self.kinesthetic,
        };
        *slot = slot.saturating_add(1);
    }

    /// Sum of all four counters, widened so it never overflows.
    #[must_use]
    pub fn total(&self) -> u64 {
        Modality::PRIORITY
            .iter()
            .map(|m| u64::from(self.get(*m)))
            .sum()
    }

    /// Scores paired with their modality, in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (Modality, u32)> + '_ {
        Modality::PRIORITY.into_iter().map(|m| (m, self.get(m)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_touches_one_counter() {
        let mut scores = ModalityScores::default();
        scores.increment(Modality::Kinesthetic);
        scores.increment(Modality::Kinesthetic);
        scores.increment(Modality::Auditory);
        assert_eq!(scores, ModalityScores::new(0, 1, 0, 2));
        assert_eq!(scores.total(), 3);
    }

    #[test]
    fn from_signed_clamps_negatives() {
        let out = ModalityScores::from_signed(-3, 4, 0, 2);
        assert!(out.clamped);
        assert_eq!(out.scores, ModalityScores::new(0, 4, 0, 2));

        let out = ModalityScores::from_signed(1, 2, 3, 4);
        assert!(!out.clamped);
    }

    #[test]
    fn total_does_not_overflow() {
        let scores = ModalityScores::new(u32::MAX, u32::MAX, u32::MAX, u32::MAX);
        assert_eq!(scores.total(), 4 * u64::from(u32::MAX));
    }

    #[test]
    fn iter_follows_priority_order() {
        let scores = ModalityScores::new(1, 2, 3, 4);
        let seen: Vec<_> = scores.iter().collect();
        assert_eq!(
            seen,
            vec![
                (Modality::Visual, 1),
                (Modality::Auditory, 2),
                (Modality::ReadingWriting, 3),
                (Modality::Kinesthetic, 4),
            ]
        );
    }
}
