use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

/// Granularity class of a token
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Text,
    Punctuation,
    Space,
}

impl TokenType {
    pub fn all() -> &'static [TokenType] {
        &[TokenType::Text, TokenType::Punctuation, TokenType::Space]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Text => "text",
            TokenType::Punctuation => "punctuation",
            TokenType::Space => "space",
        }
    }
}

impl FromStr for TokenType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TokenType::all()
            .iter()
            .find(|v| v.as_str() == s)
            .copied()
            .ok_or_else(|| {
                StoreError::validation("token_type", format!("unknown token type `{s}`"))
            })
    }
}

/// Difficulty tag assigned by the tokenizer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn all() -> &'static [Difficulty] {
        &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::all()
            .iter()
            .find(|v| v.as_str() == s)
            .copied()
            .ok_or_else(|| {
                StoreError::validation("difficulty", format!("unknown difficulty `{s}`"))
            })
    }
}

/// A character/unit-granularity segment of a sentence.
///
/// `sentence_token_id` positions the token within its sentence,
/// `global_token_id` within the whole article. Annotation addresses are
/// defined in terms of these ids, so both are fixed at import time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub sentence_token_id: u32,
    pub global_token_id: u32,
    pub body: String,
    pub token_type: TokenType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lemma: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    /// Weak link to a vocabulary entry this token has been bound to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocab_id: Option<Uuid>,
    /// Weak link to the word token subsuming this token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_index: Option<u32>,
}

impl Token {
    /// Only text tokens are eligible for selection and annotation
    pub fn is_selectable(&self) -> bool {
        self.token_type == TokenType::Text
    }
}

/// A word composed of one or more contiguous tokens.
///
/// Member tokens are referenced by `sentence_token_id`, not by storage
/// key, so the grouping survives as long as addresses are stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordToken {
    pub word_index: u32,
    pub token_ids: Vec<u32>,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lemma: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocab_id: Option<Uuid>,
}

impl WordToken {
    /// Check if this word covers the given token position
    pub fn covers(&self, token_id: u32) -> bool {
        self.token_ids.contains(&token_id)
    }
}

/// A sentence with its ordered tokens and optional word groupings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    pub sentence_id: u32,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    pub tokens: Vec<Token>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub word_tokens: Vec<WordToken>,
}

impl Sentence {
    pub fn token(&self, sentence_token_id: u32) -> Option<&Token> {
        self.tokens
            .iter()
            .find(|t| t.sentence_token_id == sentence_token_id)
    }

    pub(crate) fn token_mut(&mut self, sentence_token_id: u32) -> Option<&mut Token> {
        self.tokens
            .iter_mut()
            .find(|t| t.sentence_token_id == sentence_token_id)
    }

    /// Tokens eligible for selection, in sentence order
    pub fn text_tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| t.is_selectable())
    }

    pub fn word_token(&self, word_index: u32) -> Option<&WordToken> {
        self.word_tokens.iter().find(|w| w.word_index == word_index)
    }

    pub(crate) fn word_token_mut(&mut self, word_index: u32) -> Option<&mut WordToken> {
        self.word_tokens
            .iter_mut()
            .find(|w| w.word_index == word_index)
    }

    /// The word token whose member set covers the given token position
    pub fn word_token_covering(&self, token_id: u32) -> Option<&WordToken> {
        self.word_tokens.iter().find(|w| w.covers(token_id))
    }
}
