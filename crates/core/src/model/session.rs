use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::bank::QuestionBank;
use crate::model::{
    Answer, Modality, ModalityScores, Question, QuestionError, QuestionId, QuizResult, UserId,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSessionError {
    #[error("every question has already been answered")]
    Completed,

    #[error("cannot submit: {answered} of {total} questions answered")]
    Incomplete { answered: usize, total: usize },

    #[error(transparent)]
    Question(#[from] QuestionError),

    #[error("snapshot has {found} answer slots, bank has {expected} questions")]
    SnapshotLength { expected: usize, found: usize },

    #[error("snapshot index {index} is past the end of a {len}-question bank")]
    SnapshotIndex { index: usize, len: usize },

    #[error("snapshot slot {slot} disagrees with current index {index}")]
    SnapshotGap { slot: usize, index: usize },
}

/// Result of committing one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub question_id: QuestionId,
    pub modality: Modality,
    pub correct: bool,
    pub is_complete: bool,
}

/// Serializable state of an in-progress session, used to resume later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub current_question_index: usize,
    pub answers: Vec<Option<Answer>>,
    pub started_at: DateTime<Utc>,
}

/// An in-progress assessment.
///
/// The index only moves forward: each call to [`QuizSession::answer_current`]
/// commits one slot, scores it, and advances. Every slot before the current
/// index is answered; every slot from it onward is not. Submitting consumes
/// the session.
#[derive(Debug, Clone)]
pub struct QuizSession {
    bank: Arc<QuestionBank>,
    current_question_index: usize,
    answers: Vec<Option<Answer>>,
    scores: ModalityScores,
    started_at: DateTime<Utc>,
}

impl QuizSession {
    #[must_use]
    pub fn start(bank: Arc<QuestionBank>, now: DateTime<Utc>) -> Self {
        let answers = vec![None; bank.len()];
        Self {
            bank,
            current_question_index: 0,
            answers,
            scores: ModalityScores::default(),
            started_at: now,
        }
    }

    /// Rebuild a session from a snapshot, re-scoring every stored answer.
    ///
    /// # Errors
    ///
    /// Returns a `Snapshot*` error if the snapshot does not fit the bank or
    /// breaks the answered-prefix invariant, or `Question` if a stored answer
    /// no longer fits its question.
    pub fn restore(
        bank: Arc<QuestionBank>,
        snapshot: SessionSnapshot,
    ) -> Result<Self, QuizSessionError> {
        let len = bank.len();
        if snapshot.answers.len() != len {
            return Err(QuizSessionError::SnapshotLength {
                expected: len,
                found: snapshot.answers.len(),
            });
        }
        let index = snapshot.current_question_index;
        if index > len {
            return Err(QuizSessionError::SnapshotIndex { index, len });
        }

        let mut scores = ModalityScores::default();
        for (slot, (question, answer)) in bank.questions().iter().zip(&snapshot.answers).enumerate()
        {
            match (slot < index, answer) {
                (true, Some(answer)) => {
                    if question.evaluate(answer)? {
                        scores.increment(question.modality());
                    }
                }
                (false, None) => {}
                _ => return Err(QuizSessionError::SnapshotGap { slot, index }),
            }
        }

        Ok(Self {
            bank,
            current_question_index: index,
            answers: snapshot.answers,
            scores,
            started_at: snapshot.started_at,
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_question_index: self.current_question_index,
            answers: self.answers.clone(),
            started_at: self.started_at,
        }
    }

    /// Score and commit `answer` for the current question, then advance.
    ///
    /// On error the session is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `Completed` once every question is answered, or `Question` if
    /// the answer does not fit the current question.
    pub fn answer_current(&mut self, answer: Answer) -> Result<AnswerOutcome, QuizSessionError> {
        let question = self
            .bank
            .get(self.current_question_index)
            .ok_or(QuizSessionError::Completed)?;
        let correct = question.evaluate(&answer)?;
        let question_id = question.id();
        let modality = question.modality();

        if correct {
            self.scores.increment(modality);
        }
        self.answers[self.current_question_index] = Some(answer);
        self.current_question_index += 1;

        Ok(AnswerOutcome {
            question_id,
            modality,
            correct,
            is_complete: self.is_complete(),
        })
    }

    /// Finish the session and build its result.
    ///
    /// # Errors
    ///
    /// Returns `Incomplete` if any question is still unanswered.
    pub fn submit(
        self,
        user_id: UserId,
        age: i64,
        now: DateTime<Utc>,
    ) -> Result<QuizResult, QuizSessionError> {
        if !self.is_complete() {
            return Err(QuizSessionError::Incomplete {
                answered: self.answered_count(),
                total: self.total_questions(),
            });
        }
        Ok(QuizResult::compute(
            user_id,
            self.scores,
            age,
            self.started_at,
            now,
        ))
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.bank.get(self.current_question_index)
    }

    #[must_use]
    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<Answer>] {
        &self.answers
    }

    #[must_use]
    pub fn scores(&self) -> ModalityScores {
        self.scores
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.current_question_index
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.bank.len()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current_question_index >= self.bank.len()
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }
}
