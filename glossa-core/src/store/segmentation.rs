//! Segmentation store: persists tokenizer output under stable addresses.

use std::collections::HashSet;

use tracing::info;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::model::{Article, ProcessingStatus, Sentence, Token};
use crate::tokenizer::{SegmentedArticle, SegmentedSentence};

use super::Store;

impl Store {
    /// Import a tokenized article under a fresh id.
    ///
    /// Token addresses are fixed here: tokenizer-supplied ids are
    /// honored and validated for uniqueness within their scope, missing
    /// ids are filled positionally. Any validation failure rejects the
    /// whole import.
    pub fn import_article(&mut self, input: &SegmentedArticle) -> Result<Uuid> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(StoreError::validation("title", "empty article title"));
        }

        let sentences = build_sentences(&input.sentences)?;

        let mut article = Article::new(input.user_id, title.to_string(), input.language.clone());
        article.sentences = sentences;
        article.status = ProcessingStatus::Completed;

        let article_id = article.id;
        info!(
            article = %article_id,
            sentences = article.sentence_count(),
            tokens = article.token_count(),
            "imported article"
        );
        self.articles.push(article);
        Ok(article_id)
    }

    /// Replace an article's sentence subtree with fresh tokenizer
    /// output, all-or-nothing.
    ///
    /// The replacement tree is fully built and validated before the old
    /// one is dropped; a failed re-import leaves the article unchanged.
    /// Existing notations are left in place and keep whatever meaning
    /// the new addresses give them.
    pub fn reimport_article(
        &mut self,
        article_id: Uuid,
        sentences: &[SegmentedSentence],
    ) -> Result<()> {
        self.require_article(article_id)?;
        let rebuilt = build_sentences(sentences)?;

        let article = self.require_article_mut(article_id)?;
        article.sentences = rebuilt;
        article.status = ProcessingStatus::Completed;
        article.touch();
        info!(
            article = %article_id,
            sentences = article.sentence_count(),
            tokens = article.token_count(),
            "re-imported article"
        );
        Ok(())
    }

    /// Record the outcome of an external processing step
    pub fn set_status(&mut self, article_id: Uuid, status: ProcessingStatus) -> Result<()> {
        let article = self.require_article_mut(article_id)?;
        article.status = status;
        article.touch();
        Ok(())
    }

    /// Delete an article and everything addressed under it
    pub fn delete_article(&mut self, article_id: Uuid) -> bool {
        let before = self.articles.len();
        self.articles.retain(|a| a.id != article_id);
        if self.articles.len() == before {
            return false;
        }

        self.vocab_notations.retain(|n| n.article_id != article_id);
        self.grammar_notations.retain(|n| n.article_id != article_id);
        self.asked_tokens.retain(|a| a.article_id != article_id);
        self.vocab_examples.retain(|e| e.article_id != article_id);
        self.grammar_examples.retain(|e| e.article_id != article_id);
        info!(article = %article_id, "deleted article and its annotations");
        true
    }

    /// Fetch an article with its full sentence/token tree
    pub fn article(&self, article_id: Uuid) -> Option<&Article> {
        self.articles.iter().find(|a| a.id == article_id)
    }

    pub fn articles(&self) -> impl Iterator<Item = &Article> {
        self.articles.iter()
    }

    pub fn articles_for_user(&self, user_id: Uuid) -> Vec<&Article> {
        self.articles.iter().filter(|a| a.user_id == user_id).collect()
    }

    /// Fetch one sentence with its tokens and word tokens
    pub fn sentence(&self, article_id: Uuid, sentence_id: u32) -> Option<&Sentence> {
        self.article(article_id)?.sentence(sentence_id)
    }
}

/// Build the owned sentence tree, assigning and validating addresses
fn build_sentences(sentences: &[SegmentedSentence]) -> Result<Vec<Sentence>> {
    let mut built = Vec::with_capacity(sentences.len());
    let mut global_seen: HashSet<u32> = HashSet::new();
    let mut position: u32 = 0;

    for (sentence_pos, input) in sentences.iter().enumerate() {
        let sentence_id = sentence_pos as u32;
        if input.sentence_body.trim().is_empty() {
            return Err(StoreError::validation(
                "sentence_body",
                format!("empty body for sentence {sentence_id}"),
            ));
        }

        let mut local_seen: HashSet<u32> = HashSet::new();
        let mut tokens = Vec::with_capacity(input.tokens.len());

        for (token_pos, raw) in input.tokens.iter().enumerate() {
            if raw.token_body.is_empty() {
                return Err(StoreError::validation(
                    "token_body",
                    format!("empty token body in sentence {sentence_id}"),
                ));
            }

            let sentence_token_id = raw.sentence_token_id.unwrap_or(token_pos as u32);
            if !local_seen.insert(sentence_token_id) {
                return Err(StoreError::validation(
                    "sentence_token_id",
                    format!("duplicate id {sentence_token_id} in sentence {sentence_id}"),
                ));
            }

            let global_token_id = raw.global_token_id.unwrap_or(position);
            if !global_seen.insert(global_token_id) {
                return Err(StoreError::validation(
                    "global_token_id",
                    format!("duplicate id {global_token_id} in sentence {sentence_id}"),
                ));
            }
            position += 1;

            tokens.push(Token {
                sentence_token_id,
                global_token_id,
                body: raw.token_body.clone(),
                token_type: raw.token_type,
                pos_tag: raw.pos_tag.clone(),
                lemma: raw.lemma.clone(),
                difficulty: raw.difficulty,
                vocab_id: None,
                word_index: None,
            });
        }

        built.push(Sentence {
            sentence_id,
            text: input.sentence_body.clone(),
            difficulty: input.difficulty,
            tokens,
            word_tokens: Vec::new(),
        });
    }

    Ok(built)
}

#[cfg(test)]
mod tests {
    use super::super::tests::english_fixture;
    use super::*;
    use crate::tokenizer::RawToken;

    #[test]
    fn global_ids_are_pairwise_distinct() {
        let mut store = Store::new();
        let article_id = store.import_article(&english_fixture(Uuid::new_v4())).unwrap();

        let article = store.article(article_id).unwrap();
        let mut seen = HashSet::new();
        for sentence in &article.sentences {
            for token in &sentence.tokens {
                assert!(seen.insert(token.global_token_id));
            }
        }
        assert_eq!(seen.len(), article.token_count());
    }

    #[test]
    fn supplied_ids_round_trip() {
        let mut input = english_fixture(Uuid::new_v4());
        // Tokenizer counts from 10 in the second sentence.
        for (i, raw) in input.sentences[1].tokens.iter_mut().enumerate() {
            raw.sentence_token_id = Some(10 + i as u32);
            raw.global_token_id = Some(100 + i as u32);
        }

        let mut store = Store::new();
        let article_id = store.import_article(&input).unwrap();
        let sentence = store.sentence(article_id, 1).unwrap();
        let ids: Vec<u32> = sentence.tokens.iter().map(|t| t.sentence_token_id).collect();
        assert_eq!(ids, vec![10, 11, 12, 13, 14]);
        assert_eq!(sentence.tokens[0].global_token_id, 100);
    }

    #[test]
    fn duplicate_sentence_token_ids_reject_import() {
        let mut input = english_fixture(Uuid::new_v4());
        input.sentences[0].tokens[0].sentence_token_id = Some(1);
        input.sentences[0].tokens[1].sentence_token_id = Some(1);

        let mut store = Store::new();
        let err = store.import_article(&input).unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "sentence_token_id", .. }));
        assert_eq!(store.articles().count(), 0);
    }

    #[test]
    fn empty_title_rejects_import() {
        let mut input = english_fixture(Uuid::new_v4());
        input.title = "   ".to_string();
        let mut store = Store::new();
        assert!(store.import_article(&input).is_err());
    }

    #[test]
    fn failed_reimport_leaves_subtree_untouched() {
        let user_id = Uuid::new_v4();
        let mut store = Store::new();
        let article_id = store.import_article(&english_fixture(user_id)).unwrap();

        let mut replacement = english_fixture(user_id).sentences;
        replacement[0].tokens.push(RawToken::text(""));
        assert!(store.reimport_article(article_id, &replacement).is_err());

        let article = store.article(article_id).unwrap();
        assert_eq!(article.sentence_count(), 2);
        assert_eq!(article.sentences[0].tokens.len(), 6);
    }

    #[test]
    fn reimport_replaces_subtree() {
        let user_id = Uuid::new_v4();
        let mut store = Store::new();
        let article_id = store.import_article(&english_fixture(user_id)).unwrap();

        let replacement = vec![english_fixture(user_id).sentences.remove(0)];
        store.reimport_article(article_id, &replacement).unwrap();

        let article = store.article(article_id).unwrap();
        assert_eq!(article.sentence_count(), 1);
        assert_eq!(article.status, ProcessingStatus::Completed);
    }

    #[test]
    fn reimport_of_missing_article_fails() {
        let mut store = Store::new();
        let err = store.reimport_article(Uuid::new_v4(), &[]).unwrap_err();
        assert!(matches!(err, StoreError::ArticleNotFound(_)));
    }
}
