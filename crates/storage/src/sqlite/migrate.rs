use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use super::SqliteInitError;

/// Applies pending schema migrations.
///
/// Version 1 creates profiles, quiz results and quiz drafts.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS profiles (
                    id INTEGER PRIMARY KEY,
                    display_name TEXT NOT NULL,
                    age INTEGER NOT NULL CHECK (age >= 0),
                    learning_style TEXT CHECK (
                        learning_style IS NULL OR learning_style IN
                        ('visual', 'auditory', 'reading_writing', 'kinesthetic')
                    ),
                    quiz_completed INTEGER NOT NULL CHECK (quiz_completed IN (0, 1)),
                    updated_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        // No foreign key to profiles: a secondary write path may hold results
        // for users it has never seen.
        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS quiz_results (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    visual INTEGER NOT NULL CHECK (visual >= 0),
                    auditory INTEGER NOT NULL CHECK (auditory >= 0),
                    reading_writing INTEGER NOT NULL CHECK (reading_writing >= 0),
                    kinesthetic INTEGER NOT NULL CHECK (kinesthetic >= 0),
                    total_score INTEGER NOT NULL CHECK (total_score >= 0),
                    quiz_level TEXT NOT NULL,
                    time_taken_seconds INTEGER NOT NULL CHECK (time_taken_seconds >= 0),
                    dominant_style TEXT NOT NULL,
                    dominance_percentage REAL NOT NULL,
                    completed_at TEXT NOT NULL,
                    UNIQUE (user_id, completed_at)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS quiz_drafts (
                    user_id INTEGER PRIMARY KEY,
                    snapshot TEXT NOT NULL,
                    saved_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_quiz_results_user_completed
                    ON quiz_results (user_id, completed_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(version = 1, "applied schema migration");
    }

    Ok(())
}
