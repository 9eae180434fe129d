use std::sync::Arc;

use storage::repository::{ProfileRepository, QuizResultRepository, StorageError};
use style_core::model::{Modality, UserId, UserProfile};
use tracing::info;

use crate::Clock;
use crate::error::ProfileServiceError;
use crate::history::ResultStores;

/// Creates and updates learner profiles.
#[derive(Clone)]
pub struct ProfileService {
    clock: Clock,
    profiles: Arc<dyn ProfileRepository>,
    results: ResultStores,
}

impl ProfileService {
    #[must_use]
    pub fn new(
        clock: Clock,
        profiles: Arc<dyn ProfileRepository>,
        results: Arc<dyn QuizResultRepository>,
    ) -> Self {
        Self {
            clock,
            profiles,
            results: ResultStores::new(results),
        }
    }

    /// Also consult `fallback` when looking for the newest result.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn QuizResultRepository>) -> Self {
        self.results.fallback = Some(fallback);
        self
    }

    /// Create a profile for a new learner.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Profile` for validation failures.
    /// Returns `ProfileServiceError::Storage` with `StorageError::Conflict` if
    /// the id is taken, or for other repository failures.
    pub async fn create_profile(
        &self,
        id: UserId,
        display_name: &str,
        age: u32,
    ) -> Result<UserProfile, ProfileServiceError> {
        let profile = UserProfile::new(id, display_name, age, self.clock.now())?;
        if self.profiles.get_profile(id).await?.is_some() {
            return Err(StorageError::Conflict.into());
        }
        self.profiles.upsert_profile(&profile).await?;
        info!(user_id = %id, "profile created");
        Ok(profile)
    }

    /// # Errors
    ///
    /// Returns `ProfileServiceError::UnknownUser` if there is no profile.
    pub async fn get_profile(&self, id: UserId) -> Result<UserProfile, ProfileServiceError> {
        self.profiles
            .get_profile(id)
            .await?
            .ok_or(ProfileServiceError::UnknownUser(id))
    }

    /// Change a learner's age. Later quizzes use the new age for their level.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::UnknownUser`, `Profile` for an invalid
    /// age, or `Storage`.
    pub async fn update_age(
        &self,
        id: UserId,
        age: u32,
    ) -> Result<UserProfile, ProfileServiceError> {
        let mut profile = self.get_profile(id).await?;
        profile.set_age(age, self.clock.now())?;
        self.profiles.upsert_profile(&profile).await?;
        Ok(profile)
    }

    /// # Errors
    ///
    /// Returns `ProfileServiceError::UnknownUser`, `Profile` for an invalid
    /// name, or `Storage`.
    pub async fn rename(
        &self,
        id: UserId,
        display_name: &str,
    ) -> Result<UserProfile, ProfileServiceError> {
        let mut profile = self.get_profile(id).await?;
        profile.rename(display_name, self.clock.now())?;
        self.profiles.upsert_profile(&profile).await?;
        Ok(profile)
    }

    /// Copy the dominant style of the user's newest result, from any result
    /// store, onto the profile.
    ///
    /// Used after a submission whose profile update failed.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::UnknownUser` if there is no profile,
    /// `NoAssessment` if the user has no stored result, or `Storage`.
    pub async fn sync_from_latest_result(
        &self,
        id: UserId,
    ) -> Result<Modality, ProfileServiceError> {
        let profile = self.get_profile(id).await?;
        let latest = self
            .results
            .newest_first(id, 1)
            .await?
            .into_iter()
            .next()
            .ok_or(ProfileServiceError::NoAssessment(id))?;

        let style = latest.result.dominant_style();
        if profile.learning_style() != Some(style) || !profile.quiz_completed() {
            self.profiles
                .record_assessment(id, style, latest.result.completed_at())
                .await?;
            info!(user_id = %id, style = %style, "profile synced from latest result");
        }
        Ok(style)
    }
}
