use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use style_core::model::{Modality, QuizResult, SessionSnapshot, UserId, UserProfile};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("query error: {0}")]
    Query(String),
}

impl StorageError {
    /// Whether retrying the same call could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Connection(_))
    }
}

/// A persisted quiz result with its storage id.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizResultRow {
    pub id: i64,
    pub result: QuizResult,
}

impl QuizResultRow {
    #[must_use]
    pub fn new(id: i64, result: QuizResult) -> Self {
        Self { id, result }
    }
}

/// Append-only store of completed assessments.
#[async_trait]
pub trait QuizResultRepository: Send + Sync {
    /// Insert a result and return its id.
    ///
    /// A result is identified by `(user_id, completed_at)`: inserting the same
    /// one again returns the existing id instead of creating a duplicate, so
    /// callers may retry safely.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the result cannot be stored.
    async fn insert_result(&self, result: &QuizResult) -> Result<i64, StorageError>;

    /// Fetch a result by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_result(&self, id: i64) -> Result<QuizResult, StorageError>;

    /// List a user's results, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query or mapping failures.
    async fn list_results(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<QuizResultRow>, StorageError>;
}

/// Learner profiles, keyed by user id.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Insert or replace a profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be stored.
    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), StorageError>;

    /// Fetch a profile, or `None` if the user has none.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query or mapping failures.
    async fn get_profile(&self, id: UserId) -> Result<Option<UserProfile>, StorageError>;

    /// Set `learning_style` and mark the quiz completed for an existing profile.
    ///
    /// Idempotent: repeating the call with the same style is harmless.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the profile does not exist.
    async fn record_assessment(
        &self,
        id: UserId,
        style: Modality,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError>;
}

/// One resumable in-progress session per user.
#[async_trait]
pub trait QuizDraftRepository: Send + Sync {
    /// Save the user's draft, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the draft cannot be stored.
    async fn save_draft(
        &self,
        user_id: UserId,
        snapshot: &SessionSnapshot,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on query or decoding failures.
    async fn load_draft(&self, user_id: UserId) -> Result<Option<SessionSnapshot>, StorageError>;

    /// Remove the user's draft. Succeeds when there is none.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn clear_draft(&self, user_id: UserId) -> Result<(), StorageError>;
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    results: Arc<Mutex<Vec<QuizResultRow>>>,
    profiles: Arc<Mutex<HashMap<UserId, UserProfile>>>,
    drafts: Arc<Mutex<HashMap<UserId, SessionSnapshot>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizResultRepository for InMemoryRepository {
    async fn insert_result(&self, result: &QuizResult) -> Result<i64, StorageError> {
        let mut guard = self.results.lock().map_err(poisoned)?;
        if let Some(existing) = guard.iter().find(|row| {
            row.result.user_id() == result.user_id()
                && row.result.completed_at() == result.completed_at()
        }) {
            return Ok(existing.id);
        }
        let id = i64::try_from(guard.len())
            .map_err(|_| StorageError::Serialization("result id overflow".into()))?
            + 1;
        guard.push(QuizResultRow::new(id, result.clone()));
        Ok(id)
    }

    async fn get_result(&self, id: i64) -> Result<QuizResult, StorageError> {
        let guard = self.results.lock().map_err(poisoned)?;
        guard
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.result.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn list_results(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<QuizResultRow>, StorageError> {
        let guard = self.results.lock().map_err(poisoned)?;
        let mut rows: Vec<QuizResultRow> = guard
            .iter()
            .filter(|row| row.result.user_id() == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.result
                .completed_at()
                .cmp(&a.result.completed_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        let mut guard = self.profiles.lock().map_err(poisoned)?;
        guard.insert(profile.id(), profile.clone());
        Ok(())
    }

    async fn get_profile(&self, id: UserId) -> Result<Option<UserProfile>, StorageError> {
        let guard = self.profiles.lock().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }

    async fn record_assessment(
        &self,
        id: UserId,
        style: Modality,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self.profiles.lock().map_err(poisoned)?;
        let profile = guard.get_mut(&id).ok_or(StorageError::NotFound)?;
        profile.record_assessment(style, at);
        Ok(())
    }
}

#[async_trait]
impl QuizDraftRepository for InMemoryRepository {
    async fn save_draft(
        &self,
        user_id: UserId,
        snapshot: &SessionSnapshot,
        _saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self.drafts.lock().map_err(poisoned)?;
        guard.insert(user_id, snapshot.clone());
        Ok(())
    }

    async fn load_draft(&self, user_id: UserId) -> Result<Option<SessionSnapshot>, StorageError> {
        let guard = self.drafts.lock().map_err(poisoned)?;
        Ok(guard.get(&user_id).cloned())
    }

    async fn clear_draft(&self, user_id: UserId) -> Result<(), StorageError> {
        let mut guard = self.drafts.lock().map_err(poisoned)?;
        guard.remove(&user_id);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub results: Arc<dyn QuizResultRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub drafts: Arc<dyn QuizDraftRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let results: Arc<dyn QuizResultRepository> = Arc::new(repo.clone());
        let profiles: Arc<dyn ProfileRepository> = Arc::new(repo.clone());
        let drafts: Arc<dyn QuizDraftRepository> = Arc::new(repo);
        Self {
            results,
            profiles,
            drafts,
        }
    }
}
