use style_core::model::{QuizResult, UserId};
use tracing::debug;

use super::SqliteRepository;
use super::mapping::{db_err, map_result_row, u64_to_i64, user_id_to_i64};
use crate::repository::{QuizResultRepository, QuizResultRow, StorageError};

const RESULT_COLUMNS: &str = r"
    id, user_id, visual, auditory, reading_writing, kinesthetic,
    total_score, quiz_level, time_taken_seconds, dominant_style,
    dominance_percentage, completed_at
";

#[async_trait::async_trait]
impl QuizResultRepository for SqliteRepository {
    async fn insert_result(&self, result: &QuizResult) -> Result<i64, StorageError> {
        let user_id = user_id_to_i64(result.user_id())?;
        let scores = result.scores();

        let res = sqlx::query(
            r"
                INSERT INTO quiz_results (
                    user_id, visual, auditory, reading_writing, kinesthetic,
                    total_score, quiz_level, time_taken_seconds, dominant_style,
                    dominance_percentage, completed_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                ON CONFLICT(user_id, completed_at) DO NOTHING
            ",
        )
        .bind(user_id)
        .bind(i64::from(scores.visual))
        .bind(i64::from(scores.auditory))
        .bind(i64::from(scores.reading_writing))
        .bind(i64::from(scores.kinesthetic))
        .bind(u64_to_i64("total_score", result.total_score())?)
        .bind(result.quiz_level().as_str())
        .bind(u64_to_i64("time_taken_seconds", result.time_taken_seconds())?)
        .bind(result.dominant_style().as_str())
        .bind(result.dominance_percentage())
        .bind(result.completed_at())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if res.rows_affected() > 0 {
            return Ok(res.last_insert_rowid());
        }

        debug!(%user_id, "quiz result already stored, returning existing id");
        let id: i64 = sqlx::query_scalar(
            r"
                SELECT id FROM quiz_results
                WHERE user_id = ?1 AND completed_at = ?2
            ",
        )
        .bind(user_id)
        .bind(result.completed_at())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(id)
    }

    async fn get_result(&self, id: i64) -> Result<QuizResult, StorageError> {
        let sql = format!("SELECT {RESULT_COLUMNS} FROM quiz_results WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or(StorageError::NotFound)?;

        Ok(map_result_row(&row)?.result)
    }

    async fn list_results(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<QuizResultRow>, StorageError> {
        let sql = format!(
            "SELECT {RESULT_COLUMNS} FROM quiz_results
             WHERE user_id = ?1
             ORDER BY completed_at DESC, id DESC
             LIMIT ?2"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id_to_i64(user_id)?)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_result_row(&row)?);
        }
        Ok(out)
    }
}
