//! Reading quiz results back across the primary and fallback stores.

use std::sync::Arc;

use serde::Serialize;
use storage::repository::{QuizResultRepository, QuizResultRow, StorageError};
use style_core::model::{QuizResult, UserId};
use tracing::warn;

/// Which result store holds a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePath {
    Primary,
    Fallback,
}

/// A result and where it lives. Ids are only unique within one store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredResult {
    pub id: i64,
    pub store: WritePath,
    pub result: QuizResult,
}

impl StoredResult {
    fn from_row(row: QuizResultRow, store: WritePath) -> Self {
        Self {
            id: row.id,
            store,
            result: row.result,
        }
    }
}

/// The result stores a submission may have written to.
#[derive(Clone)]
pub(crate) struct ResultStores {
    pub(crate) primary: Arc<dyn QuizResultRepository>,
    pub(crate) fallback: Option<Arc<dyn QuizResultRepository>>,
}

impl ResultStores {
    pub(crate) fn new(primary: Arc<dyn QuizResultRepository>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    /// A user's results from every store, newest `completed_at` first.
    ///
    /// With a fallback configured, one unreachable store is logged and
    /// skipped. A result present in both stores is reported once, from the
    /// primary.
    pub(crate) async fn newest_first(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<StoredResult>, StorageError> {
        let primary = self.primary.list_results(user_id, limit).await;
        let Some(fallback) = &self.fallback else {
            return Ok(tag(primary?, WritePath::Primary));
        };
        let secondary = fallback.list_results(user_id, limit).await;

        let mut merged = match (primary, secondary) {
            (Ok(p), Ok(f)) => {
                let mut all = tag(p, WritePath::Primary);
                all.extend(tag(f, WritePath::Fallback));
                all
            }
            (Ok(p), Err(err)) => {
                warn!(user_id = %user_id, error = %err, "fallback result store unreadable");
                tag(p, WritePath::Primary)
            }
            (Err(err), Ok(f)) => {
                warn!(user_id = %user_id, error = %err, "primary result store unreadable");
                tag(f, WritePath::Fallback)
            }
            (Err(err), Err(_)) => return Err(err),
        };

        merged.sort_by(|a, b| {
            b.result
                .completed_at()
                .cmp(&a.result.completed_at())
                .then(a.store.rank().cmp(&b.store.rank()))
                .then(b.id.cmp(&a.id))
        });
        merged.dedup_by(|later, earlier| {
            later.result.completed_at() == earlier.result.completed_at()
        });
        merged.truncate(limit as usize);
        Ok(merged)
    }
}

impl WritePath {
    fn rank(self) -> u8 {
        match self {
            WritePath::Primary => 0,
            WritePath::Fallback => 1,
        }
    }
}

fn tag(rows: Vec<QuizResultRow>, store: WritePath) -> Vec<StoredResult> {
    rows.into_iter()
        .map(|row| StoredResult::from_row(row, store))
        .collect()
}
