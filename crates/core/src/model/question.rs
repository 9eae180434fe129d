use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::{Modality, PairId, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("multiple choice question needs at least two options, got {count}")]
    TooFewOptions { count: usize },

    #[error("correct option {index} is out of range for {count} options")]
    CorrectIndexOutOfRange { index: usize, count: usize },

    #[error("matching question needs at least two pairs, got {count}")]
    TooFewPairs { count: usize },

    #[error("duplicate pair id {0} in matching question")]
    DuplicatePairId(PairId),

    #[error("answer kind does not match question {0}")]
    AnswerKindMismatch(QuestionId),

    #[error("selected option {index} is out of range for {count} options")]
    OptionOutOfRange { index: usize, count: usize },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One left/right association in a matching question.
///
/// The canonical pairing is the identity: the left item with id `n` belongs
/// with the right item with id `n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
    pub id: PairId,
    pub left: String,
    pub right: String,
}

impl MatchPair {
    #[must_use]
    pub fn new(id: u32, left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            id: PairId::new(id),
            left: left.into(),
            right: right.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice {
        options: Vec<String>,
        correct_index: usize,
    },
    Matching {
        pairs: Vec<MatchPair>,
    },
}

/// A validated assessment question tagged with the modality it measures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    modality: Modality,
    prompt: String,
    kind: QuestionKind,
}

impl Question {
    /// Build a question, validating its shape.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` for an empty prompt, fewer than two options or
    /// pairs, an out-of-range correct index, or duplicate pair ids.
    pub fn new(
        id: QuestionId,
        modality: Modality,
        prompt: impl Into<String>,
        kind: QuestionKind,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }

        match &kind {
            QuestionKind::MultipleChoice {
                options,
                correct_index,
            } => {
                if options.len() < 2 {
                    return Err(QuestionError::TooFewOptions {
                        count: options.len(),
                    });
                }
                if *correct_index >= options.len() {
                    return Err(QuestionError::CorrectIndexOutOfRange {
                        index: *correct_index,
                        count: options.len(),
                    });
                }
            }
            QuestionKind::Matching { pairs } => {
                if pairs.len() < 2 {
                    return Err(QuestionError::TooFewPairs { count: pairs.len() });
                }
                let mut seen = HashSet::with_capacity(pairs.len());
                for pair in pairs {
                    if !seen.insert(pair.id) {
                        return Err(QuestionError::DuplicatePairId(pair.id));
                    }
                }
            }
        }

        Ok(Self {
            id,
            modality,
            prompt,
            kind,
        })
    }

    /// Build a question from crate-owned static data without re-validating.
    pub(crate) fn from_trusted(
        id: QuestionId,
        modality: Modality,
        prompt: &str,
        kind: QuestionKind,
    ) -> Self {
        Self {
            id,
            modality,
            prompt: prompt.to_owned(),
            kind,
        }
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn modality(&self) -> Modality {
        self.modality
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    #[must_use]
    pub fn is_matching(&self) -> bool {
        matches!(self.kind, QuestionKind::Matching { .. })
    }

    /// Check whether `answer` is correct for this question.
    ///
    /// Matching questions are all-or-nothing: every left id must be linked
    /// exactly once, to the right id sharing its identifier. Links naming
    /// unknown ids make the answer incorrect rather than invalid.
    ///
    /// # Errors
    ///
    /// Returns `AnswerKindMismatch` when the answer kind does not fit the
    /// question, or `OptionOutOfRange` for a choice past the last option.
    pub fn evaluate(&self, answer: &Answer) -> Result<bool, QuestionError> {
        match (&self.kind, answer) {
            (
                QuestionKind::MultipleChoice {
                    options,
                    correct_index,
                },
                Answer::Choice(selected),
            ) => {
                if *selected >= options.len() {
                    return Err(QuestionError::OptionOutOfRange {
                        index: *selected,
                        count: options.len(),
                    });
                }
                Ok(selected == correct_index)
            }
            (QuestionKind::Matching { pairs }, Answer::Matching(links)) => {
                if links.len() != pairs.len() {
                    return Ok(false);
                }
                let mut linked_left = HashSet::with_capacity(links.len());
                for link in links {
                    if link.left != link.right || !linked_left.insert(link.left) {
                        return Ok(false);
                    }
                }
                Ok(pairs.iter().all(|p| linked_left.contains(&p.id)))
            }
            _ => Err(QuestionError::AnswerKindMismatch(self.id)),
        }
    }
}

//
// ─── ANSWERS ───────────────────────────────────────────────────────────────────
//

/// A user-submitted association between a left item and a right item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairLink {
    pub left: PairId,
    pub right: PairId,
}

impl PairLink {
    #[must_use]
    pub fn new(left: u32, right: u32) -> Self {
        Self {
            left: PairId::new(left),
            right: PairId::new(right),
        }
    }
}

/// A committed answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Answer {
    /// Index of the selected option.
    Choice(usize),
    /// Associations made in a matching question.
    Matching(Vec<PairLink>),
}
