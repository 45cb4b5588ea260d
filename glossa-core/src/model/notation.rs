use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

use super::{SentenceAddress, TokenAddress};

/// A vocabulary meaning attached to one token position.
///
/// Unique per `(user_id, article_id, sentence_id, token_id)` — a
/// position holds at most one vocabulary annotation per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabNotation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub article_id: Uuid,
    pub sentence_id: u32,
    pub token_id: u32,
    /// Word-token address for non-space languages, fixed at creation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_index: Option<u32>,
    /// Linked vocabulary entry; entry deletion removes the notation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocab_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl VocabNotation {
    pub fn new(user_id: Uuid, address: TokenAddress, word_index: Option<u32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            article_id: address.article_id,
            sentence_id: address.sentence_id,
            token_id: address.token_id,
            word_index,
            vocab_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn address(&self) -> TokenAddress {
        TokenAddress::new(self.article_id, self.sentence_id, self.token_id)
    }
}

/// A grammar rule attached to one sentence, covering a set of marked
/// token positions.
///
/// Unique per `(user_id, article_id, sentence_id, rule_id)` — one
/// sentence may carry several grammar points, one per distinct rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarNotation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub article_id: Uuid,
    pub sentence_id: u32,
    pub rule_id: Uuid,
    #[serde(default)]
    pub marked_token_ids: Vec<u32>,
    pub created_at: DateTime<Utc>,
}

impl GrammarNotation {
    pub fn new(
        user_id: Uuid,
        address: SentenceAddress,
        rule_id: Uuid,
        marked_token_ids: Vec<u32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            article_id: address.article_id,
            sentence_id: address.sentence_id,
            rule_id,
            marked_token_ids,
            created_at: Utc::now(),
        }
    }

    pub fn address(&self) -> SentenceAddress {
        SentenceAddress::new(self.article_id, self.sentence_id)
    }
}

/// One concrete occurrence justifying a vocabulary entry.
///
/// Deduplicated per `(entry_id, article_id, sentence_id, token set)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabExample {
    pub id: Uuid,
    pub entry_id: Uuid,
    pub article_id: Uuid,
    pub sentence_id: u32,
    pub explanation: String,
    pub token_indices: Vec<u32>,
    pub created_at: DateTime<Utc>,
}

impl VocabExample {
    pub fn address(&self) -> SentenceAddress {
        SentenceAddress::new(self.article_id, self.sentence_id)
    }
}

/// One concrete occurrence justifying a grammar rule.
///
/// The token-index set may be empty when the whole sentence is the
/// example.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarExample {
    pub id: Uuid,
    pub rule_id: Uuid,
    pub article_id: Uuid,
    pub sentence_id: u32,
    pub explanation: String,
    #[serde(default)]
    pub token_indices: Vec<u32>,
    pub created_at: DateTime<Utc>,
}

impl GrammarExample {
    pub fn address(&self) -> SentenceAddress {
        SentenceAddress::new(self.article_id, self.sentence_id)
    }
}

/// Granularity of an asked-token record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AskedKind {
    Token,
    Sentence,
}

impl AskedKind {
    pub fn all() -> &'static [AskedKind] {
        &[AskedKind::Token, AskedKind::Sentence]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AskedKind::Token => "token",
            AskedKind::Sentence => "sentence",
        }
    }

    /// Resolve an optionally-omitted kind. Older clients send a token
    /// id without a kind; a supplied token id means a token-level ask,
    /// otherwise the ask covers the whole sentence.
    pub fn resolve(kind: Option<AskedKind>, token_id: Option<u32>) -> AskedKind {
        kind.unwrap_or(if token_id.is_some() {
            AskedKind::Token
        } else {
            AskedKind::Sentence
        })
    }
}

impl FromStr for AskedKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AskedKind::all()
            .iter()
            .find(|v| v.as_str() == s)
            .copied()
            .ok_or_else(|| StoreError::validation("kind", format!("unknown asked kind `{s}`")))
    }
}

/// The fact that a user already asked about an address.
///
/// Unique per `(user_id, article_id, sentence_id, token_id, kind)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskedToken {
    pub user_id: Uuid,
    pub article_id: Uuid,
    pub sentence_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<u32>,
    pub kind: AskedKind,
    pub created_at: DateTime<Utc>,
}
