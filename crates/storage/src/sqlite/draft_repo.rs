use chrono::{DateTime, Utc};
use style_core::model::{SessionSnapshot, UserId};

use super::SqliteRepository;
use super::mapping::{db_err, ser, user_id_to_i64};
use crate::repository::{QuizDraftRepository, StorageError};

#[async_trait::async_trait]
impl QuizDraftRepository for SqliteRepository {
    async fn save_draft(
        &self,
        user_id: UserId,
        snapshot: &SessionSnapshot,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(snapshot).map_err(ser)?;
        sqlx::query(
            r"
                INSERT INTO quiz_drafts (user_id, snapshot, saved_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(user_id) DO UPDATE SET
                    snapshot = excluded.snapshot,
                    saved_at = excluded.saved_at
            ",
        )
        .bind(user_id_to_i64(user_id)?)
        .bind(encoded)
        .bind(saved_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn load_draft(&self, user_id: UserId) -> Result<Option<SessionSnapshot>, StorageError> {
        let encoded: Option<String> =
            sqlx::query_scalar("SELECT snapshot FROM quiz_drafts WHERE user_id = ?1")
                .bind(user_id_to_i64(user_id)?)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        encoded
            .map(|json| serde_json::from_str(&json).map_err(ser))
            .transpose()
    }

    async fn clear_draft(&self, user_id: UserId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM quiz_drafts WHERE user_id = ?1")
            .bind(user_id_to_i64(user_id)?)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
