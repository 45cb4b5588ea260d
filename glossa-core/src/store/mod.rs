//! The annotation store.
//!
//! One `Store` owns every collection; operations take `&mut Store` (or
//! `&Store` for reads) explicitly — the store reference is the
//! transaction handle. Create-if-absent operations look up by the full
//! uniqueness key and insert under the same exclusive borrow, so a key
//! can never gain a second row.

mod asked;
mod knowledge;
mod notation;
mod segmentation;
mod words;

pub use notation::Upserted;
pub use words::PartitionViolation;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::model::{
    Article, AskedToken, GrammarExample, GrammarNotation, GrammarRule, Sentence, Token,
    TokenAddress, VocabExample, VocabNotation, VocabularyEntry,
};

/// Owned collections backing the annotation engine
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Store {
    articles: Vec<Article>,
    vocab_entries: Vec<VocabularyEntry>,
    grammar_rules: Vec<GrammarRule>,
    vocab_notations: Vec<VocabNotation>,
    grammar_notations: Vec<GrammarNotation>,
    asked_tokens: Vec<AskedToken>,
    vocab_examples: Vec<VocabExample>,
    grammar_examples: Vec<GrammarExample>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize the full store state
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restore a store from a serialized snapshot
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    // Scope resolution helpers shared by the component operations.

    pub(crate) fn require_article(&self, article_id: Uuid) -> Result<&Article> {
        self.articles
            .iter()
            .find(|a| a.id == article_id)
            .ok_or(StoreError::ArticleNotFound(article_id))
    }

    pub(crate) fn require_article_mut(&mut self, article_id: Uuid) -> Result<&mut Article> {
        self.articles
            .iter_mut()
            .find(|a| a.id == article_id)
            .ok_or(StoreError::ArticleNotFound(article_id))
    }

    pub(crate) fn require_sentence(&self, article_id: Uuid, sentence_id: u32) -> Result<&Sentence> {
        self.require_article(article_id)?
            .sentence(sentence_id)
            .ok_or(StoreError::SentenceNotFound {
                article_id,
                sentence_id,
            })
    }

    pub(crate) fn require_sentence_mut(
        &mut self,
        article_id: Uuid,
        sentence_id: u32,
    ) -> Result<&mut Sentence> {
        self.require_article_mut(article_id)?
            .sentence_mut(sentence_id)
            .ok_or(StoreError::SentenceNotFound {
                article_id,
                sentence_id,
            })
    }

    /// Resolve a token-level address to a selectable token
    pub(crate) fn require_text_token(&self, address: TokenAddress) -> Result<&Token> {
        let sentence = self.require_sentence(address.article_id, address.sentence_id)?;
        let token = sentence
            .token(address.token_id)
            .ok_or_else(|| StoreError::referential("token", address))?;
        if !token.is_selectable() {
            return Err(StoreError::validation(
                "token_id",
                format!("token at {address} is {}, not text", token.token_type.as_str()),
            ));
        }
        Ok(token)
    }
}
