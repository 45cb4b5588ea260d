//! Word aggregator: groups character tokens into word tokens for
//! languages without whitespace word boundaries.

use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::model::{Token, WordToken};

use super::Store;

/// A defect found by the word-partition consistency check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionViolation {
    /// A token position claimed by more than one word
    Overlap { token_id: u32 },
    /// A text token not covered by any word
    Gap { token_id: u32 },
    /// A claimed position that does not resolve to a text token
    Unresolved { token_id: u32 },
}

impl Store {
    /// Group a sentence's text tokens into word tokens.
    ///
    /// `segment` is the external word-segmentation function: it sees the
    /// sentence's text tokens and returns groups of `sentence_token_id`s,
    /// one group per word. Each group must be a non-empty contiguous run
    /// of the text-token sequence and no position may be claimed twice.
    /// For space-delimited languages this is a no-op. Re-aggregation
    /// replaces the sentence's previous word tokens.
    ///
    /// Full coverage is not enforced here; `check_word_partition`
    /// exposes gaps separately.
    pub fn aggregate_words<F>(
        &mut self,
        article_id: Uuid,
        sentence_id: u32,
        segment: F,
    ) -> Result<usize>
    where
        F: FnOnce(&[&Token]) -> Vec<Vec<u32>>,
    {
        let article = self.require_article(article_id)?;
        if article.language.is_space_delimited() {
            return Ok(0);
        }

        let words = {
            let sentence = self.require_sentence(article_id, sentence_id)?;
            let text_tokens: Vec<&Token> = sentence.text_tokens().collect();
            let groups = segment(&text_tokens);
            build_word_tokens(article_id, sentence_id, &text_tokens, groups)?
        };

        let count = words.len();
        let sentence = self.require_sentence_mut(article_id, sentence_id)?;
        for token in &mut sentence.tokens {
            token.word_index = None;
        }
        for word in &words {
            for &token_id in &word.token_ids {
                if let Some(token) = sentence.token_mut(token_id) {
                    token.word_index = Some(word.word_index);
                }
            }
        }
        sentence.word_tokens = words;

        debug!(article = %article_id, sentence = sentence_id, words = count, "aggregated words");
        Ok(count)
    }

    /// Check the word-partition property for one sentence: every text
    /// token covered exactly once. Returns the violations found; a
    /// sentence with no word tokens is vacuously consistent.
    pub fn check_word_partition(
        &self,
        article_id: Uuid,
        sentence_id: u32,
    ) -> Result<Vec<PartitionViolation>> {
        let sentence = self.require_sentence(article_id, sentence_id)?;
        if sentence.word_tokens.is_empty() {
            return Ok(Vec::new());
        }

        let mut claims: HashMap<u32, usize> = HashMap::new();
        for word in &sentence.word_tokens {
            for &token_id in &word.token_ids {
                *claims.entry(token_id).or_insert(0) += 1;
            }
        }

        let mut violations = Vec::new();
        for (&token_id, &count) in &claims {
            match sentence.token(token_id) {
                Some(token) if token.is_selectable() => {
                    if count > 1 {
                        violations.push(PartitionViolation::Overlap { token_id });
                    }
                }
                _ => violations.push(PartitionViolation::Unresolved { token_id }),
            }
        }
        for token in sentence.text_tokens() {
            if !claims.contains_key(&token.sentence_token_id) {
                violations.push(PartitionViolation::Gap {
                    token_id: token.sentence_token_id,
                });
            }
        }
        violations.sort_by_key(|v| match *v {
            PartitionViolation::Overlap { token_id } => (0, token_id),
            PartitionViolation::Gap { token_id } => (1, token_id),
            PartitionViolation::Unresolved { token_id } => (2, token_id),
        });
        Ok(violations)
    }
}

/// Validate segmentation groups and build the word-token records
fn build_word_tokens(
    article_id: Uuid,
    sentence_id: u32,
    text_tokens: &[&Token],
    groups: Vec<Vec<u32>>,
) -> Result<Vec<WordToken>> {
    // Positions of each text token id within the sentence's text-token
    // sequence, for the contiguity check.
    let sequence: HashMap<u32, usize> = text_tokens
        .iter()
        .enumerate()
        .map(|(pos, t)| (t.sentence_token_id, pos))
        .collect();

    let mut claimed: HashMap<u32, u32> = HashMap::new();
    let mut words = Vec::with_capacity(groups.len());

    for (word_pos, mut token_ids) in groups.into_iter().enumerate() {
        let word_index = word_pos as u32;
        if token_ids.is_empty() {
            return Err(StoreError::validation(
                "token_ids",
                format!("empty word group {word_index} in sentence {sentence_id}"),
            ));
        }
        token_ids.sort_unstable();

        let mut positions = Vec::with_capacity(token_ids.len());
        for &token_id in &token_ids {
            let position = sequence.get(&token_id).copied().ok_or_else(|| {
                StoreError::referential(
                    "word token member",
                    format!("{article_id}/{sentence_id}/{token_id}"),
                )
            })?;
            if claimed.insert(token_id, word_index).is_some() {
                return Err(StoreError::validation(
                    "token_ids",
                    format!("token {token_id} claimed by more than one word"),
                ));
            }
            positions.push(position);
        }
        if positions.windows(2).any(|pair| pair[1] != pair[0] + 1) {
            return Err(StoreError::validation(
                "token_ids",
                format!("word group {word_index} is not contiguous in sentence {sentence_id}"),
            ));
        }

        let body: String = token_ids
            .iter()
            .map(|id| text_tokens[sequence[id]].body.as_str())
            .collect();
        words.push(WordToken {
            word_index,
            token_ids,
            body,
            pos_tag: None,
            lemma: None,
            vocab_id: None,
        });
    }

    Ok(words)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::super::tests::english_fixture;
    use super::*;
    use crate::model::Language;
    use crate::tokenizer::{RawToken, SegmentedArticle, SegmentedSentence};

    pub(crate) fn chinese_fixture(user_id: Uuid) -> SegmentedArticle {
        SegmentedArticle {
            title: "中文阅读".to_string(),
            user_id,
            language: Language::new("zh").unwrap(),
            sentences: vec![SegmentedSentence {
                sentence_body: "我喜欢学习".to_string(),
                difficulty: None,
                tokens: vec![
                    RawToken::text("我"),
                    RawToken::text("喜"),
                    RawToken::text("欢"),
                    RawToken::text("学"),
                    RawToken::text("习"),
                ],
            }],
        }
    }

    fn segmented_store() -> (Store, Uuid) {
        let mut store = Store::new();
        let article_id = store.import_article(&chinese_fixture(Uuid::new_v4())).unwrap();
        store
            .aggregate_words(article_id, 0, |_| vec![vec![0], vec![1, 2], vec![3, 4]])
            .unwrap();
        (store, article_id)
    }

    #[test]
    fn aggregation_partitions_the_sentence() {
        let (store, article_id) = segmented_store();
        let sentence = store.sentence(article_id, 0).unwrap();
        assert_eq!(sentence.word_tokens.len(), 3);
        assert_eq!(sentence.word_tokens[1].body, "喜欢");
        assert_eq!(sentence.word_tokens[1].token_ids, vec![1, 2]);
        assert!(store.check_word_partition(article_id, 0).unwrap().is_empty());
    }

    #[test]
    fn member_tokens_link_back_to_their_word() {
        let (store, article_id) = segmented_store();
        let sentence = store.sentence(article_id, 0).unwrap();
        assert_eq!(sentence.token(2).unwrap().word_index, Some(1));
        assert_eq!(sentence.word_token_covering(2).unwrap().token_ids, vec![1, 2]);
    }

    #[test]
    fn space_delimited_language_is_a_noop() {
        let mut store = Store::new();
        let article_id = store.import_article(&english_fixture(Uuid::new_v4())).unwrap();
        let count = store
            .aggregate_words(article_id, 0, |_| vec![vec![0]])
            .unwrap();
        assert_eq!(count, 0);
        assert!(store.sentence(article_id, 0).unwrap().word_tokens.is_empty());
    }

    #[test]
    fn overlapping_groups_are_rejected() {
        let mut store = Store::new();
        let article_id = store.import_article(&chinese_fixture(Uuid::new_v4())).unwrap();
        let err = store
            .aggregate_words(article_id, 0, |_| vec![vec![0, 1], vec![1, 2]])
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "token_ids", .. }));
        assert!(store.sentence(article_id, 0).unwrap().word_tokens.is_empty());
    }

    #[test]
    fn unresolved_members_are_rejected() {
        let mut store = Store::new();
        let article_id = store.import_article(&chinese_fixture(Uuid::new_v4())).unwrap();
        let err = store
            .aggregate_words(article_id, 0, |_| vec![vec![0], vec![9]])
            .unwrap_err();
        assert!(matches!(err, StoreError::Referential { .. }));
    }

    #[test]
    fn non_contiguous_groups_are_rejected() {
        let mut store = Store::new();
        let article_id = store.import_article(&chinese_fixture(Uuid::new_v4())).unwrap();
        let err = store
            .aggregate_words(article_id, 0, |_| vec![vec![0, 2]])
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));
    }

    #[test]
    fn partition_check_reports_gaps() {
        let mut store = Store::new();
        let article_id = store.import_article(&chinese_fixture(Uuid::new_v4())).unwrap();
        store
            .aggregate_words(article_id, 0, |_| vec![vec![0], vec![1, 2]])
            .unwrap();
        let violations = store.check_word_partition(article_id, 0).unwrap();
        assert_eq!(
            violations,
            vec![
                PartitionViolation::Gap { token_id: 3 },
                PartitionViolation::Gap { token_id: 4 },
            ]
        );
    }

    #[test]
    fn reaggregation_replaces_previous_words() {
        let (mut store, article_id) = segmented_store();
        store
            .aggregate_words(article_id, 0, |_| vec![vec![0, 1], vec![2, 3], vec![4]])
            .unwrap();
        let sentence = store.sentence(article_id, 0).unwrap();
        assert_eq!(sentence.word_tokens.len(), 3);
        assert_eq!(sentence.token(1).unwrap().word_index, Some(0));
        assert!(store.check_word_partition(article_id, 0).unwrap().is_empty());
    }
}
