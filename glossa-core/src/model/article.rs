use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

use super::Sentence;

/// Language tag for an article or knowledge entry.
///
/// Codes are stored lowercased. Whether a language delimits words with
/// whitespace decides if the word-aggregation stage applies to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Language(String);

/// Languages whose scripts do not separate words with whitespace
const NON_SPACE_CODES: &[&str] = &["zh", "ja", "th", "km", "lo", "my"];

impl Language {
    pub fn new(code: &str) -> Result<Self, StoreError> {
        let code = code.trim().to_lowercase();
        if code.is_empty() {
            return Err(StoreError::validation("language", "empty language code"));
        }
        Ok(Self(code))
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// Whether words are delimited by whitespace in this language
    pub fn is_space_delimited(&self) -> bool {
        let base = self.0.split('-').next().unwrap_or(&self.0);
        !NON_SPACE_CODES.contains(&base)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Language {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::new(s)
    }
}

/// Processing state of an imported article
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn all() -> &'static [ProcessingStatus] {
        &[
            ProcessingStatus::Processing,
            ProcessingStatus::Completed,
            ProcessingStatus::Failed,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        }
    }
}

impl FromStr for ProcessingStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProcessingStatus::all()
            .iter()
            .find(|v| v.as_str() == s)
            .copied()
            .ok_or_else(|| {
                StoreError::validation("status", format!("unknown processing status `{s}`"))
            })
    }
}

/// An article with its segmented sentences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub language: Language,
    pub status: ProcessingStatus,
    pub sentences: Vec<Sentence>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    pub fn new(user_id: Uuid, title: String, language: Language) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            language,
            status: ProcessingStatus::Processing,
            sentences: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn sentence(&self, sentence_id: u32) -> Option<&Sentence> {
        self.sentences.iter().find(|s| s.sentence_id == sentence_id)
    }

    pub(crate) fn sentence_mut(&mut self, sentence_id: u32) -> Option<&mut Sentence> {
        self.sentences
            .iter_mut()
            .find(|s| s.sentence_id == sentence_id)
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(|s| s.tokens.len()).sum()
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_is_lowercased_and_trimmed() {
        let lang = Language::new("  EN ").unwrap();
        assert_eq!(lang.code(), "en");
        assert!(lang.is_space_delimited());
    }

    #[test]
    fn empty_language_is_rejected() {
        assert!(Language::new("   ").is_err());
    }

    #[test]
    fn regional_variants_share_spacing_rules() {
        assert!(!Language::new("zh-Hans").unwrap().is_space_delimited());
        assert!(Language::new("pt-BR").unwrap().is_space_delimited());
    }

    #[test]
    fn status_parse_fails_closed() {
        assert_eq!(
            "completed".parse::<ProcessingStatus>().unwrap(),
            ProcessingStatus::Completed
        );
        assert!("done".parse::<ProcessingStatus>().is_err());
    }
}
