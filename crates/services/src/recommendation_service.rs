use std::sync::Arc;

use serde::Serialize;
use storage::repository::ProfileRepository;
use style_core::keywords::{Keyword, extract_keywords};
use style_core::model::{Modality, UserId};
use style_core::study::StudyPlan;

use crate::error::RecommendationError;

/// Study guidance for one learner and a set of materials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub style: Modality,
    pub plan: &'static StudyPlan,
    pub keywords: Vec<Keyword>,
}

/// Pairs a learner's assessed style with the topics of their materials.
#[derive(Clone)]
pub struct RecommendationService {
    profiles: Arc<dyn ProfileRepository>,
}

impl RecommendationService {
    #[must_use]
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Build a recommendation from the stored style and the top `limit`
    /// keywords across `materials`.
    ///
    /// # Errors
    ///
    /// Returns `RecommendationError::UnknownUser` if there is no profile,
    /// `NoLearningStyle` if the quiz was never completed, or `Storage`.
    pub async fn recommend(
        &self,
        user_id: UserId,
        materials: &[String],
        limit: usize,
    ) -> Result<Recommendation, RecommendationError> {
        let profile = self
            .profiles
            .get_profile(user_id)
            .await?
            .ok_or(RecommendationError::UnknownUser(user_id))?;
        let style = profile
            .learning_style()
            .ok_or(RecommendationError::NoLearningStyle(user_id))?;

        let text = materials.join("\n");
        Ok(Recommendation {
            style,
            plan: StudyPlan::for_style(style),
            keywords: extract_keywords(&text, limit),
        })
    }
}
