use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one sentence within one article
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct SentenceAddress {
    pub article_id: Uuid,
    pub sentence_id: u32,
}

impl SentenceAddress {
    pub fn new(article_id: Uuid, sentence_id: u32) -> Self {
        Self {
            article_id,
            sentence_id,
        }
    }

    /// Extend with a token position to form a token-level address
    pub fn token(&self, token_id: u32) -> TokenAddress {
        TokenAddress {
            article_id: self.article_id,
            sentence_id: self.sentence_id,
            token_id,
        }
    }
}

impl fmt::Display for SentenceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.article_id, self.sentence_id)
    }
}

/// Identifies one token position within one sentence of one article
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct TokenAddress {
    pub article_id: Uuid,
    pub sentence_id: u32,
    pub token_id: u32,
}

impl TokenAddress {
    pub fn new(article_id: Uuid, sentence_id: u32, token_id: u32) -> Self {
        Self {
            article_id,
            sentence_id,
            token_id,
        }
    }

    /// Drop the token position, keeping the sentence-level address
    pub fn sentence(&self) -> SentenceAddress {
        SentenceAddress {
            article_id: self.article_id,
            sentence_id: self.sentence_id,
        }
    }
}

impl fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.article_id, self.sentence_id, self.token_id)
    }
}
