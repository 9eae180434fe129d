use std::sync::Arc;

use storage::repository::{
    ProfileRepository, QuizDraftRepository, QuizResultRepository, StorageError,
};
use style_core::bank::QuestionBank;
use style_core::model::{
    Answer, AnswerOutcome, QuizResult, QuizSession, QuizSessionError, UserId, UserProfile,
};
use tracing::{debug, info, warn};

use crate::Clock;
use crate::error::{QuizServiceError, SubmitError};
use crate::history::{ResultStores, StoredResult, WritePath};
use crate::retry::RetryPolicy;

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub result_id: i64,
    pub result: QuizResult,
    pub written_to: WritePath,
    /// `false` when the result was saved but the profile update failed.
    /// `ProfileService::sync_from_latest_result` repairs it later.
    pub profile_updated: bool,
}

/// Runs quiz sessions for learners and persists their results.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    bank: Arc<QuestionBank>,
    results: ResultStores,
    profiles: Arc<dyn ProfileRepository>,
    drafts: Arc<dyn QuizDraftRepository>,
    retry: RetryPolicy,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        bank: Arc<QuestionBank>,
        results: Arc<dyn QuizResultRepository>,
        profiles: Arc<dyn ProfileRepository>,
        drafts: Arc<dyn QuizDraftRepository>,
    ) -> Self {
        Self {
            clock,
            bank,
            results: ResultStores::new(results),
            profiles,
            drafts,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn QuizResultRepository>) -> Self {
        self.results.fallback = Some(fallback);
        self
    }

    #[must_use]
    pub fn bank(&self) -> Arc<QuestionBank> {
        Arc::clone(&self.bank)
    }

    /// Resume the user's saved draft, or start a fresh session.
    ///
    /// A draft that no longer fits the question bank is discarded.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::UnknownUser` if the user has no profile.
    /// Returns `QuizServiceError::Storage` if repository access fails.
    pub async fn start_or_resume(&self, user_id: UserId) -> Result<QuizSession, QuizServiceError> {
        self.require_profile(user_id).await?;

        if let Some(snapshot) = self.drafts.load_draft(user_id).await? {
            match QuizSession::restore(Arc::clone(&self.bank), snapshot) {
                Ok(session) => {
                    info!(
                        user_id = %user_id,
                        answered = session.answered_count(),
                        "resuming quiz draft"
                    );
                    return Ok(session);
                }
                Err(err) => {
                    warn!(user_id = %user_id, error = %err, "discarding unusable quiz draft");
                    self.drafts.clear_draft(user_id).await?;
                }
            }
        }

        debug!(user_id = %user_id, "starting new quiz session");
        Ok(QuizSession::start(Arc::clone(&self.bank), self.clock.now()))
    }

    /// Answer the current question and save a draft of the session.
    ///
    /// A failed draft save is logged and does not fail the answer.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` if the answer is rejected; the
    /// session is unchanged in that case.
    pub async fn answer(
        &self,
        user_id: UserId,
        session: &mut QuizSession,
        answer: Answer,
    ) -> Result<AnswerOutcome, QuizServiceError> {
        let outcome = session.answer_current(answer)?;
        if let Err(err) = self
            .drafts
            .save_draft(user_id, &session.snapshot(), self.clock.now())
            .await
        {
            warn!(user_id = %user_id, error = %err, "failed to save quiz draft");
        }
        Ok(outcome)
    }

    /// Finish a completed session: compute the result once, persist it, and
    /// record the dominant style on the profile.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::Session` if questions remain unanswered.
    /// Returns `SubmitError::UnknownUser` if the user has no profile.
    /// Returns `SubmitError::Persistence` if no write path accepted the result.
    pub async fn submit(
        &self,
        user_id: UserId,
        session: QuizSession,
    ) -> Result<SubmissionReceipt, SubmitError> {
        if !session.is_complete() {
            return Err(SubmitError::Session(QuizSessionError::Incomplete {
                answered: session.answered_count(),
                total: session.total_questions(),
            }));
        }

        let profile = self
            .profiles
            .get_profile(user_id)
            .await?
            .ok_or(SubmitError::UnknownUser(user_id))?;

        let result = session.submit(user_id, i64::from(profile.age()), self.clock.now())?;
        let (result_id, written_to) = self.persist_result(&result).await?;

        let style = result.dominant_style();
        let completed_at = result.completed_at();
        let profile_updated = match self
            .retry
            .run("record_assessment", || {
                self.profiles.record_assessment(user_id, style, completed_at)
            })
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    user_id = %user_id,
                    result_id,
                    error = %err,
                    "result saved but profile update failed"
                );
                false
            }
        };

        if let Err(err) = self.drafts.clear_draft(user_id).await {
            warn!(user_id = %user_id, error = %err, "failed to clear quiz draft");
        }

        info!(
            user_id = %user_id,
            result_id,
            style = %style,
            level = %result.quiz_level(),
            total = result.total_score(),
            "quiz submitted"
        );

        Ok(SubmissionReceipt {
            result_id,
            result,
            written_to,
            profile_updated,
        })
    }

    /// Drop the user's in-progress session without recording anything.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if the draft cannot be removed.
    pub async fn abandon(&self, user_id: UserId) -> Result<(), QuizServiceError> {
        self.drafts.clear_draft(user_id).await?;
        debug!(user_id = %user_id, "quiz abandoned");
        Ok(())
    }

    /// The user's past results from every result store, newest first.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if no store can be read.
    pub async fn history(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<StoredResult>, QuizServiceError> {
        Ok(self.results.newest_first(user_id, limit).await?)
    }

    async fn require_profile(&self, user_id: UserId) -> Result<UserProfile, QuizServiceError> {
        self.profiles
            .get_profile(user_id)
            .await?
            .ok_or(QuizServiceError::UnknownUser(user_id))
    }

    async fn persist_result(&self, result: &QuizResult) -> Result<(i64, WritePath), SubmitError> {
        let primary_err = match self
            .retry
            .run("insert_result", || self.results.primary.insert_result(result))
            .await
        {
            Ok(id) => return Ok((id, WritePath::Primary)),
            Err(err) => err,
        };

        let Some(fallback) = &self.results.fallback else {
            return Err(SubmitError::Persistence(primary_err));
        };

        warn!(error = %primary_err, "primary result store failed, using fallback");
        self.retry
            .run("insert_result_fallback", || fallback.insert_result(result))
            .await
            .map(|id| (id, WritePath::Fallback))
            .map_err(|err: StorageError| {
                warn!(error = %err, "fallback result store failed");
                SubmitError::Persistence(err)
            })
    }
}
