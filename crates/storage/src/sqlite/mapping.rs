use sqlx::Row;
use sqlx::error::ErrorKind;
use style_core::model::{Modality, ModalityScores, QuizLevel, QuizResult, UserId, UserProfile};

use crate::repository::{QuizResultRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// SQLite primary result codes that clear up once the other writer is done.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Map a driver error onto the storage taxonomy. Only failures that a later
/// attempt could get past become `Connection`.
pub(crate) fn db_err(e: sqlx::Error) -> StorageError {
    match e {
        sqlx::Error::RowNotFound => StorageError::NotFound,
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StorageError::Connection(e.to_string()),
        sqlx::Error::Database(ref db) => {
            let busy = db
                .code()
                .and_then(|code| code.parse::<i32>().ok())
                .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED));
            if busy {
                StorageError::Connection(e.to_string())
            } else if matches!(
                db.kind(),
                ErrorKind::UniqueViolation
                    | ErrorKind::ForeignKeyViolation
                    | ErrorKind::NotNullViolation
                    | ErrorKind::CheckViolation
            ) {
                StorageError::Conflict
            } else {
                StorageError::Query(e.to_string())
            }
        }
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::TypeNotFound { .. } => StorageError::Serialization(e.to_string()),
        other => StorageError::Query(other.to_string()),
    }
}

pub(crate) fn user_id_to_i64(id: UserId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("user_id overflow".into()))
}

pub(crate) fn user_id_from_i64(v: i64) -> Result<UserId, StorageError> {
    u64::try_from(v)
        .map(UserId::new)
        .map_err(|_| StorageError::Serialization("user_id sign overflow".into()))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn u64_from_i64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn u64_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn parse_modality(s: &str) -> Result<Modality, StorageError> {
    s.parse::<Modality>().map_err(ser)
}

pub(crate) fn parse_quiz_level(s: &str) -> Result<QuizLevel, StorageError> {
    s.parse::<QuizLevel>().map_err(ser)
}

pub(crate) fn map_result_row(row: &sqlx::sqlite::SqliteRow) -> Result<QuizResultRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let scores = ModalityScores::new(
        u32_from_i64("visual", row.try_get("visual").map_err(ser)?)?,
        u32_from_i64("auditory", row.try_get("auditory").map_err(ser)?)?,
        u32_from_i64("reading_writing", row.try_get("reading_writing").map_err(ser)?)?,
        u32_from_i64("kinesthetic", row.try_get("kinesthetic").map_err(ser)?)?,
    );
    let level: String = row.try_get("quiz_level").map_err(ser)?;
    let style: String = row.try_get("dominant_style").map_err(ser)?;

    let result = QuizResult::from_persisted(
        user_id_from_i64(row.try_get("user_id").map_err(ser)?)?,
        scores,
        u64_from_i64("total_score", row.try_get("total_score").map_err(ser)?)?,
        parse_quiz_level(&level)?,
        u64_from_i64(
            "time_taken_seconds",
            row.try_get("time_taken_seconds").map_err(ser)?,
        )?,
        parse_modality(&style)?,
        row.try_get("dominance_percentage").map_err(ser)?,
        row.try_get("completed_at").map_err(ser)?,
    )
    .map_err(ser)?;

    Ok(QuizResultRow::new(id, result))
}

pub(crate) fn map_profile_row(row: &sqlx::sqlite::SqliteRow) -> Result<UserProfile, StorageError> {
    let style: Option<String> = row.try_get("learning_style").map_err(ser)?;
    let learning_style = style.as_deref().map(parse_modality).transpose()?;
    let completed: i64 = row.try_get("quiz_completed").map_err(ser)?;

    UserProfile::from_persisted(
        user_id_from_i64(row.try_get("id").map_err(ser)?)?,
        row.try_get("display_name").map_err(ser)?,
        u32_from_i64("age", row.try_get("age").map_err(ser)?)?,
        learning_style,
        completed != 0,
        row.try_get("updated_at").map_err(ser)?,
    )
    .map_err(ser)
}
