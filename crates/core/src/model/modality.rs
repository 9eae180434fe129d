use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown learning modality: {0}")]
pub struct ParseModalityError(pub String);

/// One of the four learning-style categories measured by the assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Visual,
    Auditory,
    ReadingWriting,
    Kinesthetic,
}

impl Modality {
    /// Tie-break order for classification: when scores are equal, the
    /// modality listed first wins.
    pub const PRIORITY: [Modality; 4] = [
        Modality::Visual,
        Modality::Auditory,
        Modality::ReadingWriting,
        Modality::Kinesthetic,
    ];

    /// Stable storage key, also used on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Modality::Visual => "visual",
            Modality::Auditory => "auditory",
            Modality::ReadingWriting => "reading_writing",
            Modality::Kinesthetic => "kinesthetic",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Modality::Visual => "Visual",
            Modality::Auditory => "Auditory",
            Modality::ReadingWriting => "Reading/Writing",
            Modality::Kinesthetic => "Kinesthetic",
        }
    }

    /// Position of this modality in [`Modality::PRIORITY`].
    #[must_use]
    pub fn priority_rank(self) -> usize {
        match self {
            Modality::Visual => 0,
            Modality::Auditory => 1,
            Modality::ReadingWriting => 2,
            Modality::Kinesthetic => 3,
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = ParseModalityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "visual" => Ok(Modality::Visual),
            "auditory" => Ok(Modality::Auditory),
            "reading_writing" | "reading-writing" | "reading/writing" => {
                Ok(Modality::ReadingWriting)
            }
            "kinesthetic" => Ok(Modality::Kinesthetic),
            _ => Err(ParseModalityError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_rank_matches_priority_list() {
        for (idx, modality) in Modality::PRIORITY.iter().enumerate() {
            assert_eq!(modality.priority_rank(), idx);
        }
    }

    #[test]
    fn parses_storage_keys_and_aliases() {
        for m in Modality::PRIORITY {
            assert_eq!(m.as_str().parse::<Modality>().unwrap(), m);
        }
        assert_eq!(
            "Reading/Writing".parse::<Modality>().unwrap(),
            Modality::ReadingWriting
        );
        assert!("tactile".parse::<Modality>().is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Modality::ReadingWriting).unwrap();
        assert_eq!(json, "\"reading_writing\"");
    }
}
