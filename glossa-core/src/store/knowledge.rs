//! Reusable knowledge entries and the example/dedup index linking them
//! to concrete sentence occurrences.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::model::{
    CanonicalKey, GrammarExample, GrammarRule, Language, LearnStatus, SentenceAddress, Source,
    VocabExample, VocabularyEntry,
};

use super::notation::Upserted;
use super::Store;

impl Store {
    /// Fetch or create the vocabulary entry for `(user, body)`.
    ///
    /// An existing entry is returned unchanged except that an unset
    /// `language` is filled in; the stored explanation is never
    /// overwritten by a repeated create.
    pub fn get_or_create_vocab_entry(
        &mut self,
        user_id: Uuid,
        body: &str,
        explanation: &str,
        language: Option<Language>,
        source: Source,
    ) -> Result<Upserted<VocabularyEntry>> {
        let body = body.trim();
        if body.is_empty() {
            return Err(StoreError::validation("body", "empty vocabulary body"));
        }

        if let Some(existing) = self
            .vocab_entries
            .iter_mut()
            .find(|e| e.user_id == user_id && e.body == body)
        {
            if existing.language.is_none() && language.is_some() {
                existing.language = language;
                existing.touch();
            }
            return Ok(Upserted {
                record: existing.clone(),
                created: false,
            });
        }

        let mut entry =
            VocabularyEntry::new(user_id, body.to_string(), explanation.to_string(), source);
        entry.language = language;
        debug!(user = %user_id, body, "created vocabulary entry");
        self.vocab_entries.push(entry.clone());
        Ok(Upserted {
            record: entry,
            created: true,
        })
    }

    /// Fetch or create the grammar rule for `(user, name)`.
    ///
    /// Same fill-if-unset behavior as vocabulary entries, applied to
    /// `language` and `canonical_key`.
    pub fn get_or_create_grammar_rule(
        &mut self,
        user_id: Uuid,
        name: &str,
        explanation: &str,
        canonical_key: Option<CanonicalKey>,
        language: Option<Language>,
        source: Source,
    ) -> Result<Upserted<GrammarRule>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::validation("name", "empty rule name"));
        }

        if let Some(existing) = self
            .grammar_rules
            .iter_mut()
            .find(|r| r.user_id == user_id && r.name == name)
        {
            let mut touched = false;
            if existing.language.is_none() && language.is_some() {
                existing.language = language;
                touched = true;
            }
            if existing.canonical_key.is_none() && canonical_key.is_some() {
                existing.canonical_key = canonical_key;
                touched = true;
            }
            if touched {
                existing.touch();
            }
            return Ok(Upserted {
                record: existing.clone(),
                created: false,
            });
        }

        let mut rule = GrammarRule::new(user_id, name.to_string(), explanation.to_string(), source);
        rule.canonical_key = canonical_key;
        rule.language = language;
        debug!(user = %user_id, name, "created grammar rule");
        self.grammar_rules.push(rule.clone());
        Ok(Upserted {
            record: rule,
            created: true,
        })
    }

    pub fn vocab_entry(&self, entry_id: Uuid) -> Option<&VocabularyEntry> {
        self.vocab_entries.iter().find(|e| e.id == entry_id)
    }

    pub fn vocab_entry_by_body(&self, user_id: Uuid, body: &str) -> Option<&VocabularyEntry> {
        self.vocab_entries
            .iter()
            .find(|e| e.user_id == user_id && e.body == body)
    }

    pub fn vocab_entries_for_user(&self, user_id: Uuid) -> Vec<&VocabularyEntry> {
        self.vocab_entries
            .iter()
            .filter(|e| e.user_id == user_id)
            .collect()
    }

    pub fn grammar_rule(&self, rule_id: Uuid) -> Option<&GrammarRule> {
        self.grammar_rules.iter().find(|r| r.id == rule_id)
    }

    pub fn grammar_rule_by_name(&self, user_id: Uuid, name: &str) -> Option<&GrammarRule> {
        self.grammar_rules
            .iter()
            .find(|r| r.user_id == user_id && r.name == name)
    }

    pub fn grammar_rules_for_user(&self, user_id: Uuid) -> Vec<&GrammarRule> {
        self.grammar_rules
            .iter()
            .filter(|r| r.user_id == user_id)
            .collect()
    }

    // Enumerated per-field updates; identity fields are not mutable.

    pub fn set_vocab_explanation(&mut self, entry_id: Uuid, explanation: &str) -> Result<()> {
        let entry = self.require_vocab_entry_mut(entry_id)?;
        entry.explanation = explanation.to_string();
        entry.touch();
        Ok(())
    }

    pub fn set_vocab_starred(&mut self, entry_id: Uuid, starred: bool) -> Result<()> {
        let entry = self.require_vocab_entry_mut(entry_id)?;
        entry.starred = starred;
        entry.touch();
        Ok(())
    }

    pub fn set_vocab_learn_status(&mut self, entry_id: Uuid, status: LearnStatus) -> Result<()> {
        let entry = self.require_vocab_entry_mut(entry_id)?;
        entry.learn_status = status;
        entry.touch();
        Ok(())
    }

    pub fn set_rule_explanation(&mut self, rule_id: Uuid, explanation: &str) -> Result<()> {
        let rule = self.require_grammar_rule_mut(rule_id)?;
        rule.explanation = explanation.to_string();
        rule.touch();
        Ok(())
    }

    pub fn set_rule_starred(&mut self, rule_id: Uuid, starred: bool) -> Result<()> {
        let rule = self.require_grammar_rule_mut(rule_id)?;
        rule.starred = starred;
        rule.touch();
        Ok(())
    }

    pub fn set_rule_learn_status(&mut self, rule_id: Uuid, status: LearnStatus) -> Result<()> {
        let rule = self.require_grammar_rule_mut(rule_id)?;
        rule.learn_status = status;
        rule.touch();
        Ok(())
    }

    /// Delete a vocabulary entry, cascading to notations that reference
    /// it and to its examples, and clearing weak token links
    pub fn delete_vocab_entry(&mut self, entry_id: Uuid) -> bool {
        let before = self.vocab_entries.len();
        self.vocab_entries.retain(|e| e.id != entry_id);
        if self.vocab_entries.len() == before {
            return false;
        }

        self.vocab_notations.retain(|n| n.vocab_id != Some(entry_id));
        self.vocab_examples.retain(|e| e.entry_id != entry_id);
        for article in &mut self.articles {
            for sentence in &mut article.sentences {
                for token in &mut sentence.tokens {
                    if token.vocab_id == Some(entry_id) {
                        token.vocab_id = None;
                    }
                }
                for word in &mut sentence.word_tokens {
                    if word.vocab_id == Some(entry_id) {
                        word.vocab_id = None;
                    }
                }
            }
        }
        info!(entry = %entry_id, "deleted vocabulary entry and its references");
        true
    }

    /// Delete a grammar rule, cascading to its notations and examples
    pub fn delete_grammar_rule(&mut self, rule_id: Uuid) -> bool {
        let before = self.grammar_rules.len();
        self.grammar_rules.retain(|r| r.id != rule_id);
        if self.grammar_rules.len() == before {
            return false;
        }

        self.grammar_notations.retain(|n| n.rule_id != rule_id);
        self.grammar_examples.retain(|e| e.rule_id != rule_id);
        info!(rule = %rule_id, "deleted grammar rule and its references");
        true
    }

    /// Link a vocabulary entry to one concrete occurrence.
    ///
    /// A second example for the same `(entry, article, sentence)` with
    /// the same token-index set (in any order) is not appended; a
    /// different set is a new example.
    pub fn add_vocab_example(
        &mut self,
        entry_id: Uuid,
        address: SentenceAddress,
        explanation: &str,
        token_indices: &[u32],
    ) -> Result<Upserted<VocabExample>> {
        if self.vocab_entry(entry_id).is_none() {
            return Err(StoreError::EntryNotFound(entry_id));
        }
        if token_indices.is_empty() {
            return Err(StoreError::validation(
                "token_indices",
                "empty span for vocabulary example",
            ));
        }
        let indices = self.normalized_token_set(address, token_indices)?;

        if let Some(existing) = self.vocab_examples.iter().find(|e| {
            e.entry_id == entry_id && e.address() == address && e.token_indices == indices
        }) {
            return Ok(Upserted {
                record: existing.clone(),
                created: false,
            });
        }

        let example = VocabExample {
            id: Uuid::new_v4(),
            entry_id,
            article_id: address.article_id,
            sentence_id: address.sentence_id,
            explanation: explanation.to_string(),
            token_indices: indices,
            created_at: Utc::now(),
        };
        debug!(entry = %entry_id, %address, "added vocabulary example");
        self.vocab_examples.push(example.clone());
        Ok(Upserted {
            record: example,
            created: true,
        })
    }

    /// Link a grammar rule to one concrete occurrence. The token-index
    /// set may be empty when the whole sentence is the example.
    pub fn add_grammar_example(
        &mut self,
        rule_id: Uuid,
        address: SentenceAddress,
        explanation: &str,
        token_indices: &[u32],
    ) -> Result<Upserted<GrammarExample>> {
        if self.grammar_rule(rule_id).is_none() {
            return Err(StoreError::RuleNotFound(rule_id));
        }
        let indices = self.normalized_token_set(address, token_indices)?;

        if let Some(existing) = self.grammar_examples.iter().find(|e| {
            e.rule_id == rule_id && e.address() == address && e.token_indices == indices
        }) {
            return Ok(Upserted {
                record: existing.clone(),
                created: false,
            });
        }

        let example = GrammarExample {
            id: Uuid::new_v4(),
            rule_id,
            article_id: address.article_id,
            sentence_id: address.sentence_id,
            explanation: explanation.to_string(),
            token_indices: indices,
            created_at: Utc::now(),
        };
        debug!(rule = %rule_id, %address, "added grammar example");
        self.grammar_examples.push(example.clone());
        Ok(Upserted {
            record: example,
            created: true,
        })
    }

    pub fn vocab_examples_for_entry(&self, entry_id: Uuid) -> Vec<&VocabExample> {
        self.vocab_examples
            .iter()
            .filter(|e| e.entry_id == entry_id)
            .collect()
    }

    pub fn grammar_examples_for_rule(&self, rule_id: Uuid) -> Vec<&GrammarExample> {
        self.grammar_examples
            .iter()
            .filter(|e| e.rule_id == rule_id)
            .collect()
    }

    fn require_vocab_entry_mut(&mut self, entry_id: Uuid) -> Result<&mut VocabularyEntry> {
        self.vocab_entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .ok_or(StoreError::EntryNotFound(entry_id))
    }

    fn require_grammar_rule_mut(&mut self, rule_id: Uuid) -> Result<&mut GrammarRule> {
        self.grammar_rules
            .iter_mut()
            .find(|r| r.id == rule_id)
            .ok_or(StoreError::RuleNotFound(rule_id))
    }
}
