//! Asked-token tracker: remembers which addresses a user has already
//! queried about.

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::model::{AskedKind, AskedToken, SentenceAddress};

use super::notation::Upserted;
use super::Store;

impl Store {
    /// Record that a user asked about an address, or return the
    /// existing record.
    ///
    /// `kind` may be omitted: a supplied `token_id` means a token-level
    /// ask, otherwise the ask covers the sentence. Token-level asks
    /// require a resolvable text token; sentence-level asks carry no
    /// token id.
    pub fn mark_asked(
        &mut self,
        user_id: Uuid,
        address: SentenceAddress,
        token_id: Option<u32>,
        kind: Option<AskedKind>,
    ) -> Result<Upserted<AskedToken>> {
        let kind = AskedKind::resolve(kind, token_id);
        match kind {
            AskedKind::Token => {
                let token_id = token_id.ok_or_else(|| {
                    StoreError::validation("token_id", "token-level ask without a token id")
                })?;
                self.require_text_token(address.token(token_id))?;
            }
            AskedKind::Sentence => {
                if token_id.is_some() {
                    return Err(StoreError::validation(
                        "token_id",
                        "sentence-level ask must not carry a token id",
                    ));
                }
                self.require_sentence(address.article_id, address.sentence_id)?;
            }
        }

        if let Some(existing) = self.asked_tokens.iter().find(|a| {
            a.user_id == user_id
                && a.article_id == address.article_id
                && a.sentence_id == address.sentence_id
                && a.token_id == token_id
                && a.kind == kind
        }) {
            return Ok(Upserted {
                record: existing.clone(),
                created: false,
            });
        }

        let asked = AskedToken {
            user_id,
            article_id: address.article_id,
            sentence_id: address.sentence_id,
            token_id,
            kind,
            created_at: Utc::now(),
        };
        debug!(user = %user_id, %address, kind = kind.as_str(), "marked asked");
        self.asked_tokens.push(asked.clone());
        Ok(Upserted {
            record: asked,
            created: true,
        })
    }

    pub fn was_asked(
        &self,
        user_id: Uuid,
        address: SentenceAddress,
        token_id: Option<u32>,
        kind: AskedKind,
    ) -> bool {
        self.asked_tokens.iter().any(|a| {
            a.user_id == user_id
                && a.article_id == address.article_id
                && a.sentence_id == address.sentence_id
                && a.token_id == token_id
                && a.kind == kind
        })
    }

    pub fn asked_for_sentence(&self, user_id: Uuid, address: SentenceAddress) -> Vec<&AskedToken> {
        self.asked_tokens
            .iter()
            .filter(|a| {
                a.user_id == user_id
                    && a.article_id == address.article_id
                    && a.sentence_id == address.sentence_id
            })
            .collect()
    }

    pub fn asked_for_article(&self, user_id: Uuid, article_id: Uuid) -> Vec<&AskedToken> {
        self.asked_tokens
            .iter()
            .filter(|a| a.user_id == user_id && a.article_id == article_id)
            .collect()
    }
}
