use std::path::Path;
use std::sync::Arc;

use storage::repository::{QuizResultRepository, Storage};
use style_core::bank::QuestionBank;
use tracing::info;

use crate::Clock;
use crate::config::AppConfig;
use crate::error::AppServicesError;
use crate::profile_service::ProfileService;
use crate::quiz_service::QuizService;
use crate::recommendation_service::RecommendationService;
use crate::retry::RetryPolicy;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    quiz: Arc<QuizService>,
    profiles: Arc<ProfileService>,
    recommendations: Arc<RecommendationService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage, with an optional second
    /// database for quiz results and an optional custom question bank.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if a database cannot be opened or migrated,
    /// or the question bank file cannot be read or is invalid.
    pub async fn new_sqlite(config: &AppConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let bank = match &config.question_bank_path {
            Some(path) => load_bank(path)?,
            None => QuestionBank::standard(),
        };
        let storage = Storage::sqlite(&config.database_url).await?;
        let fallback = match &config.fallback_database_url {
            Some(url) => {
                info!(url = %url, "fallback result store enabled");
                Some(Storage::sqlite(url).await?.results)
            }
            None => None,
        };
        Ok(Self::from_storage(
            &storage,
            fallback,
            Arc::new(bank),
            clock,
            config.retry,
        ))
    }

    /// Build services over an existing storage aggregate.
    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        fallback_results: Option<Arc<dyn QuizResultRepository>>,
        bank: Arc<QuestionBank>,
        clock: Clock,
        retry: RetryPolicy,
    ) -> Self {
        let mut quiz = QuizService::new(
            clock,
            bank,
            Arc::clone(&storage.results),
            Arc::clone(&storage.profiles),
            Arc::clone(&storage.drafts),
        )
        .with_retry(retry);
        let mut profiles = ProfileService::new(
            clock,
            Arc::clone(&storage.profiles),
            Arc::clone(&storage.results),
        );
        if let Some(fallback) = fallback_results {
            quiz = quiz.with_fallback(Arc::clone(&fallback));
            profiles = profiles.with_fallback(fallback);
        }
        let recommendations = RecommendationService::new(Arc::clone(&storage.profiles));

        Self {
            quiz: Arc::new(quiz),
            profiles: Arc::new(profiles),
            recommendations: Arc::new(recommendations),
        }
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn profiles(&self) -> Arc<ProfileService> {
        Arc::clone(&self.profiles)
    }

    #[must_use]
    pub fn recommendations(&self) -> Arc<RecommendationService> {
        Arc::clone(&self.recommendations)
    }
}

fn load_bank(path: &Path) -> Result<QuestionBank, AppServicesError> {
    let json = std::fs::read_to_string(path).map_err(|source| AppServicesError::BankFile {
        path: path.to_path_buf(),
        source,
    })?;
    let bank = QuestionBank::from_json(&json)?;
    info!(path = %path.display(), questions = bank.len(), "custom question bank loaded");
    Ok(bank)
}
