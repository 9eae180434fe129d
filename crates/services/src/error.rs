//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use style_core::bank::QuestionBankError;
use style_core::model::{ProfileError, QuizSessionError, UserId};

/// Errors emitted by `ProfileService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileServiceError {
    #[error("no profile for user {0}")]
    UnknownUser(UserId),
    #[error("user {0} has no completed assessment")]
    NoAssessment(UserId),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while running a quiz session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("no profile for user {0}")]
    UnknownUser(UserId),
    #[error(transparent)]
    Session(#[from] QuizSessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while submitting a finished session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmitError {
    #[error("no profile for user {0}")]
    UnknownUser(UserId),
    #[error(transparent)]
    Session(#[from] QuizSessionError),
    #[error("could not save quiz result on any write path: {0}")]
    Persistence(#[source] StorageError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `RecommendationService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecommendationError {
    #[error("no profile for user {0}")]
    UnknownUser(UserId),
    #[error("user {0} has not completed the assessment yet")]
    NoLearningStyle(UserId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors raised while reading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{key} must not be empty")]
    Empty { key: &'static str },
    #[error("invalid value for {key}: {raw}")]
    Invalid { key: &'static str, raw: String },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot read question bank {path}: {source}")]
    BankFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    QuestionBank(#[from] QuestionBankError),
}
