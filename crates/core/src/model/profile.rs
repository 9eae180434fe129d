use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Modality, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("display name cannot be empty")]
    EmptyName,

    #[error("display name is too long: {len} characters (max {max})")]
    NameTooLong { len: usize, max: usize },

    #[error("age {0} is out of range")]
    InvalidAge(u32),
}

/// Account-level learner profile.
///
/// `learning_style` and `quiz_completed` always reflect the most recent
/// submitted assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    id: UserId,
    display_name: String,
    age: u32,
    learning_style: Option<Modality>,
    quiz_completed: bool,
    updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub const MAX_NAME_LEN: usize = 80;
    pub const MAX_AGE: u32 = 130;

    /// Create a profile that has not taken the assessment yet.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if the name is empty or too long, or the age is implausible.
    pub fn new(
        id: UserId,
        display_name: impl Into<String>,
        age: u32,
        now: DateTime<Utc>,
    ) -> Result<Self, ProfileError> {
        let display_name = validate_name(display_name.into())?;
        validate_age(age)?;
        Ok(Self {
            id,
            display_name,
            age,
            learning_style: None,
            quiz_completed: false,
            updated_at: now,
        })
    }

    /// Rehydrate a profile from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if stored values fail validation.
    pub fn from_persisted(
        id: UserId,
        display_name: String,
        age: u32,
        learning_style: Option<Modality>,
        quiz_completed: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, ProfileError> {
        let display_name = validate_name(display_name)?;
        validate_age(age)?;
        Ok(Self {
            id,
            display_name,
            age,
            learning_style,
            quiz_completed,
            updated_at,
        })
    }

    /// Record the dominant style from a submitted assessment.
    ///
    /// Applying the same style twice leaves the profile unchanged apart from
    /// the timestamp.
    pub fn record_assessment(&mut self, style: Modality, now: DateTime<Utc>) {
        self.learning_style = Some(style);
        self.quiz_completed = true;
        self.updated_at = now;
    }

    /// # Errors
    ///
    /// Returns `ProfileError::InvalidAge` if `age` exceeds `MAX_AGE`.
    pub fn set_age(&mut self, age: u32, now: DateTime<Utc>) -> Result<(), ProfileError> {
        validate_age(age)?;
        self.age = age;
        self.updated_at = now;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ProfileError` if the name is empty or too long.
    pub fn rename(
        &mut self,
        display_name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), ProfileError> {
        self.display_name = validate_name(display_name.into())?;
        self.updated_at = now;
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn age(&self) -> u32 {
        self.age
    }

    #[must_use]
    pub fn learning_style(&self) -> Option<Modality> {
        self.learning_style
    }

    #[must_use]
    pub fn quiz_completed(&self) -> bool {
        self.quiz_completed
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

fn validate_name(raw: String) -> Result<String, ProfileError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ProfileError::EmptyName);
    }
    let len = trimmed.chars().count();
    if len > UserProfile::MAX_NAME_LEN {
        return Err(ProfileError::NameTooLong {
            len,
            max: UserProfile::MAX_NAME_LEN,
        });
    }
    Ok(trimmed.to_owned())
}

fn validate_age(age: u32) -> Result<(), ProfileError> {
    if age > UserProfile::MAX_AGE {
        return Err(ProfileError::InvalidAge(age));
    }
    Ok(())
}
