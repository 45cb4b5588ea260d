//! Tokenizer input contract.
//!
//! The NLP tokenizer is an external collaborator; this module only
//! describes the shape of its output. Token ids may be supplied by the
//! tokenizer or left out, in which case the store assigns positional
//! ids at import time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::model::{Difficulty, Language, TokenType};

/// One token as produced by the tokenizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawToken {
    pub token_body: String,
    pub token_type: TokenType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lemma: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence_token_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_token_id: Option<u32>,
}

impl RawToken {
    pub fn text(body: &str) -> Self {
        Self::of_type(body, TokenType::Text)
    }

    pub fn of_type(body: &str, token_type: TokenType) -> Self {
        Self {
            token_body: body.to_string(),
            token_type,
            pos_tag: None,
            lemma: None,
            difficulty: None,
            sentence_token_id: None,
            global_token_id: None,
        }
    }
}

/// One sentence of tokenizer output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentedSentence {
    pub sentence_body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    pub tokens: Vec<RawToken>,
}

/// A complete tokenized article ready for import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentedArticle {
    pub title: String,
    pub user_id: Uuid,
    pub language: Language,
    pub sentences: Vec<SegmentedSentence>,
}

impl SegmentedArticle {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_contract_json() {
        let json = r#"{
            "title": "First steps",
            "user_id": "6f2c1fd2-8d3a-4ab7-9f6e-3f9a43b1c001",
            "language": "en",
            "sentences": [
                {
                    "sentence_body": "Hello world.",
                    "tokens": [
                        { "token_body": "Hello", "token_type": "text", "pos_tag": "UH" },
                        { "token_body": " ", "token_type": "space" },
                        { "token_body": "world", "token_type": "text" },
                        { "token_body": ".", "token_type": "punctuation" }
                    ]
                }
            ]
        }"#;
        let article = SegmentedArticle::from_json(json).unwrap();
        assert_eq!(article.sentences.len(), 1);
        assert_eq!(article.sentences[0].tokens.len(), 4);
        assert_eq!(article.sentences[0].tokens[0].pos_tag.as_deref(), Some("UH"));
        assert!(article.sentences[0].tokens[0].sentence_token_id.is_none());
    }

    #[test]
    fn unknown_token_type_is_rejected() {
        let json = r#"{
            "title": "Bad",
            "user_id": "6f2c1fd2-8d3a-4ab7-9f6e-3f9a43b1c001",
            "language": "en",
            "sentences": [
                {
                    "sentence_body": "x",
                    "tokens": [ { "token_body": "x", "token_type": "word" } ]
                }
            ]
        }"#;
        assert!(SegmentedArticle::from_json(json).is_err());
    }
}
