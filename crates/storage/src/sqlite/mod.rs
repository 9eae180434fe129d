//! SQLite backend for quiz results, learner profiles and drafts.

use std::sync::Arc;
use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;
use tracing::debug;

use crate::repository::{ProfileRepository, QuizDraftRepository, QuizResultRepository, Storage};

mod draft_repo;
mod mapping;
mod migrate;
mod profile_repo;
mod quiz_result_repo;

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
/// A writer waits this long on a locked database before `SQLITE_BUSY`.
const BUSY_TIMEOUT_PRAGMA: &str = "PRAGMA busy_timeout = 5000;";

/// One pool serving all three repository traits.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteRepository {
    /// Open a pool on `database_url` with WAL journaling, so history reads
    /// do not block a submission being written.
    ///
    /// The schema is not touched; call [`SqliteRepository::migrate`] before use.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the database cannot be opened or a
    /// per-connection pragma is rejected.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        debug!(database_url, "opening quiz database");
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA journal_mode = WAL;")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query(BUSY_TIMEOUT_PRAGMA)
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Bring the profile, result and draft tables up to the latest schema
    /// version. Safe to run on every start.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if a migration step fails.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Open and migrate a quiz database, sharing one pool across results,
    /// profiles and drafts.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the database cannot be opened or migrated.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        repo.migrate().await?;
        Ok(Self {
            results: Arc::new(repo.clone()) as Arc<dyn QuizResultRepository>,
            profiles: Arc::new(repo.clone()) as Arc<dyn ProfileRepository>,
            drafts: Arc::new(repo) as Arc<dyn QuizDraftRepository>,
        })
    }
}
