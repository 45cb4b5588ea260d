use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

use super::Language;

/// How a knowledge entry came into being
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Auto,
    Qa,
    Manual,
}

impl Source {
    pub fn all() -> &'static [Source] {
        &[Source::Auto, Source::Qa, Source::Manual]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Auto => "auto",
            Source::Qa => "qa",
            Source::Manual => "manual",
        }
    }
}

impl FromStr for Source {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Source::all()
            .iter()
            .find(|v| v.as_str() == s)
            .copied()
            .ok_or_else(|| StoreError::validation("source", format!("unknown source `{s}`")))
    }
}

/// Whether the user considers an entry learned
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LearnStatus {
    NotMastered,
    Mastered,
}

impl LearnStatus {
    pub fn all() -> &'static [LearnStatus] {
        &[LearnStatus::NotMastered, LearnStatus::Mastered]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LearnStatus::NotMastered => "not_mastered",
            LearnStatus::Mastered => "mastered",
        }
    }
}

impl Default for LearnStatus {
    fn default() -> Self {
        LearnStatus::NotMastered
    }
}

impl FromStr for LearnStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LearnStatus::all()
            .iter()
            .find(|v| v.as_str() == s)
            .copied()
            .ok_or_else(|| {
                StoreError::validation("learn_status", format!("unknown learn status `{s}`"))
            })
    }
}

/// Normalized `language::category::subtype` identifier for a grammar
/// rule, used to recognize the same grammar point across display
/// wordings. Every component must be non-empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalKey {
    language: String,
    category: String,
    subtype: String,
}

impl CanonicalKey {
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        let parts: Vec<&str> = s.split("::").collect();
        if parts.len() != 3 {
            return Err(StoreError::validation(
                "canonical_key",
                format!("expected `language::category::subtype`, got `{s}`"),
            ));
        }
        for (name, part) in ["language", "category", "subtype"].iter().zip(&parts) {
            if part.trim().is_empty() {
                return Err(StoreError::validation(
                    "canonical_key",
                    format!("empty {name} component in `{s}`"),
                ));
            }
        }
        Ok(Self {
            language: parts[0].trim().to_lowercase(),
            category: parts[1].trim().to_lowercase(),
            subtype: parts[2].trim().to_lowercase(),
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.language, self.category, self.subtype)
    }
}

impl TryFrom<String> for CanonicalKey {
    type Error = StoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        CanonicalKey::parse(&s)
    }
}

impl From<CanonicalKey> for String {
    fn from(key: CanonicalKey) -> Self {
        key.to_string()
    }
}

/// A reusable vocabulary explanation owned by one user.
///
/// Unique per `(user_id, body)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    pub source: Source,
    #[serde(default)]
    pub starred: bool,
    #[serde(default)]
    pub learn_status: LearnStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VocabularyEntry {
    pub fn new(user_id: Uuid, body: String, explanation: String, source: Source) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            body,
            explanation,
            language: None,
            source,
            starred: false,
            learn_status: LearnStatus::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A reusable grammar rule owned by one user.
///
/// Unique per `(user_id, name)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarRule {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_key: Option<CanonicalKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    pub source: Source,
    #[serde(default)]
    pub starred: bool,
    #[serde(default)]
    pub learn_status: LearnStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GrammarRule {
    pub fn new(user_id: Uuid, name: String, explanation: String, source: Source) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            explanation,
            canonical_key: None,
            language: None,
            source,
            starred: false,
            learn_status: LearnStatus::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_key_round_trip() {
        let key = CanonicalKey::parse("zh::clause::relative").unwrap();
        assert_eq!(key.language(), "zh");
        assert_eq!(key.category(), "clause");
        assert_eq!(key.subtype(), "relative");
        assert_eq!(key.to_string(), "zh::clause::relative");
    }

    #[test]
    fn canonical_key_rejects_empty_components() {
        assert!(CanonicalKey::parse("zh::::relative").is_err());
        assert!(CanonicalKey::parse("zh::clause").is_err());
        assert!(CanonicalKey::parse("::clause::relative").is_err());
    }

    #[test]
    fn canonical_key_normalizes_case_and_whitespace() {
        let key = CanonicalKey::parse("ZH:: Clause ::Relative").unwrap();
        assert_eq!(key.to_string(), "zh::clause::relative");
    }

    #[test]
    fn source_parse_fails_closed() {
        assert_eq!("qa".parse::<Source>().unwrap(), Source::Qa);
        assert!("imported".parse::<Source>().is_err());
    }
}
