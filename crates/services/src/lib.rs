#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod history;
pub mod profile_service;
pub mod quiz_service;
pub mod recommendation_service;
pub mod retry;

pub use style_core::Clock;

pub use app_services::AppServices;
pub use config::AppConfig;
pub use error::{
    AppServicesError, ConfigError, ProfileServiceError, QuizServiceError, RecommendationError,
    SubmitError,
};
pub use history::{StoredResult, WritePath};
pub use profile_service::ProfileService;
pub use quiz_service::{QuizService, SubmissionReceipt};
pub use recommendation_service::{Recommendation, RecommendationService};
pub use retry::RetryPolicy;
