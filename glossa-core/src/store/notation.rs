//! Annotation overlay: vocabulary and grammar notations keyed on
//! segmentation-store addresses.

use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::model::{GrammarNotation, SentenceAddress, TokenAddress, VocabNotation};

use super::Store;

/// Result of a create-if-absent operation: the persisted record, and
/// whether this call created it
#[derive(Debug, Clone)]
pub struct Upserted<T> {
    pub record: T,
    pub created: bool,
}

impl Store {
    /// Attach a vocabulary annotation to a token position, or return
    /// the one already there.
    ///
    /// The word-token address is captured at creation time from the
    /// word covering the token, if any. The notation starts unlinked;
    /// `link_vocab_notation` binds it to an entry.
    pub fn notate_vocab(
        &mut self,
        user_id: Uuid,
        address: TokenAddress,
    ) -> Result<Upserted<VocabNotation>> {
        self.require_text_token(address)?;

        if let Some(existing) = self
            .vocab_notations
            .iter()
            .find(|n| n.user_id == user_id && n.address() == address)
        {
            return Ok(Upserted {
                record: existing.clone(),
                created: false,
            });
        }

        let word_index = self
            .require_sentence(address.article_id, address.sentence_id)?
            .word_token_covering(address.token_id)
            .map(|w| w.word_index);
        let notation = VocabNotation::new(user_id, address, word_index);
        debug!(user = %user_id, %address, "created vocab notation");
        self.vocab_notations.push(notation.clone());
        Ok(Upserted {
            record: notation,
            created: true,
        })
    }

    pub fn vocab_notation(&self, user_id: Uuid, address: TokenAddress) -> Option<&VocabNotation> {
        self.vocab_notations
            .iter()
            .find(|n| n.user_id == user_id && n.address() == address)
    }

    pub fn has_vocab_notation(&self, user_id: Uuid, address: TokenAddress) -> bool {
        self.vocab_notation(user_id, address).is_some()
    }

    pub fn vocab_notations_for_sentence(
        &self,
        address: SentenceAddress,
        user_id: Option<Uuid>,
    ) -> Vec<&VocabNotation> {
        self.vocab_notations
            .iter()
            .filter(|n| n.address().sentence() == address)
            .filter(|n| user_id.map_or(true, |u| n.user_id == u))
            .collect()
    }

    pub fn vocab_notations_for_article(
        &self,
        article_id: Uuid,
        user_id: Option<Uuid>,
    ) -> Vec<&VocabNotation> {
        self.vocab_notations
            .iter()
            .filter(|n| n.article_id == article_id)
            .filter(|n| user_id.map_or(true, |u| n.user_id == u))
            .collect()
    }

    /// Remove the vocabulary notation at an address. No-op when absent.
    pub fn delete_vocab_notation(&mut self, user_id: Uuid, address: TokenAddress) -> bool {
        let before = self.vocab_notations.len();
        self.vocab_notations
            .retain(|n| !(n.user_id == user_id && n.address() == address));
        let removed = self.vocab_notations.len() < before;
        if removed {
            debug!(user = %user_id, %address, "deleted vocab notation");
        }
        removed
    }

    /// Bind the notation at an address to a vocabulary entry, updating
    /// the token's and covering word's weak links as well.
    pub fn link_vocab_notation(
        &mut self,
        user_id: Uuid,
        address: TokenAddress,
        entry_id: Uuid,
    ) -> Result<VocabNotation> {
        let entry = self
            .vocab_entries
            .iter()
            .find(|e| e.id == entry_id)
            .ok_or(StoreError::EntryNotFound(entry_id))?;
        if entry.user_id != user_id {
            return Err(StoreError::validation(
                "vocab_id",
                "entry belongs to another user",
            ));
        }

        let notation = self
            .vocab_notations
            .iter_mut()
            .find(|n| n.user_id == user_id && n.address() == address)
            .ok_or_else(|| StoreError::referential("vocab notation", address))?;
        notation.vocab_id = Some(entry_id);
        let updated = notation.clone();

        self.set_token_links(address, updated.word_index, Some(entry_id))?;
        debug!(user = %user_id, %address, entry = %entry_id, "linked vocab notation");
        Ok(updated)
    }

    /// Clear the entry link on the notation at an address
    pub fn unlink_vocab_notation(
        &mut self,
        user_id: Uuid,
        address: TokenAddress,
    ) -> Result<VocabNotation> {
        let notation = self
            .vocab_notations
            .iter_mut()
            .find(|n| n.user_id == user_id && n.address() == address)
            .ok_or_else(|| StoreError::referential("vocab notation", address))?;
        notation.vocab_id = None;
        let updated = notation.clone();

        self.set_token_links(address, updated.word_index, None)?;
        Ok(updated)
    }

    fn set_token_links(
        &mut self,
        address: TokenAddress,
        word_index: Option<u32>,
        entry_id: Option<Uuid>,
    ) -> Result<()> {
        let sentence = self.require_sentence_mut(address.article_id, address.sentence_id)?;
        if let Some(token) = sentence.token_mut(address.token_id) {
            token.vocab_id = entry_id;
        }
        if let Some(word_index) = word_index {
            if let Some(word) = sentence.word_token_mut(word_index) {
                word.vocab_id = entry_id;
            }
        }
        Ok(())
    }

    /// Attach a grammar rule to a sentence, or return the notation
    /// already holding that rule there.
    ///
    /// Distinct rules coexist on one sentence; a repeated call for the
    /// same rule returns the existing notation unchanged, marked token
    /// ids included.
    pub fn notate_grammar(
        &mut self,
        user_id: Uuid,
        address: SentenceAddress,
        rule_id: Uuid,
        marked_token_ids: &[u32],
    ) -> Result<Upserted<GrammarNotation>> {
        let rule = self
            .grammar_rules
            .iter()
            .find(|r| r.id == rule_id)
            .ok_or(StoreError::RuleNotFound(rule_id))?;
        if rule.user_id != user_id {
            return Err(StoreError::validation(
                "rule_id",
                "rule belongs to another user",
            ));
        }
        let marked = self.normalized_token_set(address, marked_token_ids)?;

        if let Some(existing) = self.grammar_notations.iter().find(|n| {
            n.user_id == user_id && n.address() == address && n.rule_id == rule_id
        }) {
            return Ok(Upserted {
                record: existing.clone(),
                created: false,
            });
        }

        let notation = GrammarNotation::new(user_id, address, rule_id, marked);
        debug!(user = %user_id, %address, rule = %rule_id, "created grammar notation");
        self.grammar_notations.push(notation.clone());
        Ok(Upserted {
            record: notation,
            created: true,
        })
    }

    pub fn grammar_notation(
        &self,
        user_id: Uuid,
        address: SentenceAddress,
        rule_id: Uuid,
    ) -> Option<&GrammarNotation> {
        self.grammar_notations
            .iter()
            .find(|n| n.user_id == user_id && n.address() == address && n.rule_id == rule_id)
    }

    pub fn has_grammar_notation(
        &self,
        user_id: Uuid,
        address: SentenceAddress,
        rule_id: Uuid,
    ) -> bool {
        self.grammar_notation(user_id, address, rule_id).is_some()
    }

    pub fn grammar_notations_for_sentence(
        &self,
        address: SentenceAddress,
        user_id: Option<Uuid>,
    ) -> Vec<&GrammarNotation> {
        self.grammar_notations
            .iter()
            .filter(|n| n.address() == address)
            .filter(|n| user_id.map_or(true, |u| n.user_id == u))
            .collect()
    }

    pub fn grammar_notations_for_article(
        &self,
        article_id: Uuid,
        user_id: Option<Uuid>,
    ) -> Vec<&GrammarNotation> {
        self.grammar_notations
            .iter()
            .filter(|n| n.article_id == article_id)
            .filter(|n| user_id.map_or(true, |u| n.user_id == u))
            .collect()
    }

    /// Remove one grammar notation by its full key. No-op when absent.
    pub fn delete_grammar_notation(
        &mut self,
        user_id: Uuid,
        address: SentenceAddress,
        rule_id: Uuid,
    ) -> bool {
        let before = self.grammar_notations.len();
        self.grammar_notations
            .retain(|n| !(n.user_id == user_id && n.address() == address && n.rule_id == rule_id));
        let removed = self.grammar_notations.len() < before;
        if removed {
            debug!(user = %user_id, %address, rule = %rule_id, "deleted grammar notation");
        }
        removed
    }

    /// Replace the marked token set of an existing grammar notation
    pub fn set_marked_tokens(
        &mut self,
        user_id: Uuid,
        address: SentenceAddress,
        rule_id: Uuid,
        marked_token_ids: &[u32],
    ) -> Result<GrammarNotation> {
        let marked = self.normalized_token_set(address, marked_token_ids)?;
        let notation = self
            .grammar_notations
            .iter_mut()
            .find(|n| n.user_id == user_id && n.address() == address && n.rule_id == rule_id)
            .ok_or_else(|| StoreError::referential("grammar notation", address))?;
        notation.marked_token_ids = marked;
        Ok(notation.clone())
    }

    /// Resolve a token-id set against a sentence address and normalize
    /// it to sorted, deduplicated order for set-equality comparison
    pub(crate) fn normalized_token_set(
        &self,
        address: SentenceAddress,
        token_ids: &[u32],
    ) -> Result<Vec<u32>> {
        self.require_sentence(address.article_id, address.sentence_id)?;
        let mut normalized: Vec<u32> = token_ids.to_vec();
        normalized.sort_unstable();
        normalized.dedup();
        for &token_id in &normalized {
            self.require_text_token(address.token(token_id))?;
        }
        Ok(normalized)
    }
}
