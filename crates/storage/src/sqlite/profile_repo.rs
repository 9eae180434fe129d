use chrono::{DateTime, Utc};
use style_core::model::{Modality, UserId, UserProfile};

use super::SqliteRepository;
use super::mapping::{db_err, map_profile_row, user_id_to_i64};
use crate::repository::{ProfileRepository, StorageError};

#[async_trait::async_trait]
impl ProfileRepository for SqliteRepository {
    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO profiles (
                    id, display_name, age, learning_style, quiz_completed, updated_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    display_name = excluded.display_name,
                    age = excluded.age,
                    learning_style = excluded.learning_style,
                    quiz_completed = excluded.quiz_completed,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(user_id_to_i64(profile.id())?)
        .bind(profile.display_name())
        .bind(i64::from(profile.age()))
        .bind(profile.learning_style().map(Modality::as_str))
        .bind(i64::from(profile.quiz_completed()))
        .bind(profile.updated_at())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_profile(&self, id: UserId) -> Result<Option<UserProfile>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, display_name, age, learning_style, quiz_completed, updated_at
                FROM profiles
                WHERE id = ?1
            ",
        )
        .bind(user_id_to_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_profile_row).transpose()
    }

    async fn record_assessment(
        &self,
        id: UserId,
        style: Modality,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
                UPDATE profiles
                SET learning_style = ?2, quiz_completed = 1, updated_at = ?3
                WHERE id = ?1
            ",
        )
        .bind(user_id_to_i64(id)?)
        .bind(style.as_str())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
