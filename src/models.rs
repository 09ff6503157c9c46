use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder shown when an author has no usable initials
pub const UNKNOWN_INITIALS: &str = "U";

/// Errors raised while building domain values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("subject identifier must not be empty")]
    EmptySubjectId,
}

/// Opaque key naming the app whose reviews are loaded
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ModelError::EmptySubjectId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for SubjectId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SubjectId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SubjectId> for String {
    fn from(id: SubjectId) -> Self {
        id.0
    }
}

/// A single user review of an app
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Nominally 1 to 5
    pub rating: i64,
    pub text: String,
    pub date: NaiveDate,
}

impl Review {
    /// Avatar image, if the review carries a non-empty one
    pub fn avatar(&self) -> Option<&str> {
        self.avatar_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn initials(&self) -> String {
        initials(&self.author)
    }
}

/// Derive up to two uppercase initials from a display name
pub fn initials(name: &str) -> String {
    let initials: String = name
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect();

    if initials.is_empty() {
        UNKNOWN_INITIALS.to_string()
    } else {
        initials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initials() {
        assert_eq!(initials("Jane Doe"), "JD");
        assert_eq!(initials("Cher"), "C");
        assert_eq!(initials("alice mary johnson"), "AM");
    }

    #[test]
    fn test_initials_fallback() {
        assert_eq!(initials(""), "U");
        assert_eq!(initials("   "), "U");
    }

    #[test]
    fn test_subject_id_rejects_empty() {
        assert_eq!(SubjectId::new(""), Err(ModelError::EmptySubjectId));
        assert_eq!(SubjectId::new("  "), Err(ModelError::EmptySubjectId));
        assert_eq!(SubjectId::new("photo-editor-pro").unwrap().as_str(), "photo-editor-pro");
    }

    #[test]
    fn test_avatar_empty_is_absent() {
        let json = r#"{
            "id": "2",
            "author": "John Smith",
            "avatarUrl": "",
            "rating": 4,
            "text": "Great app",
            "date": "2024-05-12"
        }"#;

        let review: Review = serde_json::from_str(json).unwrap();
        assert_eq!(review.avatar(), None);
        assert_eq!(review.initials(), "JS");
        assert_eq!(review.date, NaiveDate::from_ymd_opt(2024, 5, 12).unwrap());
    }

    #[test]
    fn test_subject_id_deserialize_rejects_empty() {
        let result: Result<SubjectId, _> = serde_json::from_str(r#""""#);
        assert!(result.is_err());
    }
}
