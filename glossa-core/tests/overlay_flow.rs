//! End-to-end tests for the annotation overlay: import, word
//! aggregation, notation idempotence, and cascade behavior.

use uuid::Uuid;

use glossa_core::{
    Language, RawToken, SegmentedArticle, SegmentedSentence, SentenceAddress, Source, Store,
    TokenAddress, TokenType,
};

fn english_article(user_id: Uuid) -> SegmentedArticle {
    SegmentedArticle {
        title: "Short walk".to_string(),
        user_id,
        language: Language::new("en").unwrap(),
        sentences: vec![
            SegmentedSentence {
                sentence_body: "The dog runs fast.".to_string(),
                difficulty: None,
                tokens: vec![
                    RawToken::text("The"),
                    RawToken::text("dog"),
                    RawToken::text("runs"),
                    RawToken::text("fast"),
                    RawToken::of_type(".", TokenType::Punctuation),
                ],
            },
            SegmentedSentence {
                sentence_body: "It stops at the gate.".to_string(),
                difficulty: None,
                tokens: vec![
                    RawToken::text("It"),
                    RawToken::text("stops"),
                    RawToken::text("at"),
                    RawToken::text("the"),
                    RawToken::of_type(".", TokenType::Punctuation),
                ],
            },
        ],
    }
}

fn chinese_article(user_id: Uuid) -> SegmentedArticle {
    SegmentedArticle {
        title: "一句话".to_string(),
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

// Scenario A: a two-sentence English article with eight text tokens;
// repeated vocabulary notation at one address stays a single unlinked
// row until explicitly linked.
#[test]
fn repeated_vocab_notation_converges_to_one_unlinked_row() {
    let user_id = Uuid::new_v4();
    let mut store = Store::new();
    let article_id = store.import_article(&english_article(user_id)).unwrap();

    let article = store.article(article_id).unwrap();
    let text_tokens: usize = article
        .sentences
        .iter()
        .map(|s| s.text_tokens().count())
        .sum();
    assert_eq!(text_tokens, 8);

    let address = TokenAddress::new(article_id, 1, 3);
    let first = store.notate_vocab(user_id, address).unwrap();
    let second = store.notate_vocab(user_id, address).unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.record.id, second.record.id);
    assert_eq!(first.record.vocab_id, None);
    assert_eq!(second.record.vocab_id, None);
    assert_eq!(store.vocab_notations_for_article(article_id, None).len(), 1);

    let entry = store
        .get_or_create_vocab_entry(user_id, "the", "definite article", None, Source::Qa)
        .unwrap();
    let linked = store
        .link_vocab_notation(user_id, address, entry.record.id)
        .unwrap();
    assert_eq!(linked.vocab_id, Some(entry.record.id));
}

// Scenario B: a char-tokenized Chinese sentence segmented into three
// words; the partition property holds and a notation resolves to the
// word covering its token.
#[test]
fn chinese_word_aggregation_and_notation_resolution() {
    let user_id = Uuid::new_v4();
    let mut store = Store::new();
    let article_id = store.import_article(&chinese_article(user_id)).unwrap();

    let words = store
        .aggregate_words(article_id, 0, |_| vec![vec![0], vec![1, 2], vec![3, 4]])
        .unwrap();
    assert_eq!(words, 3);
    assert!(store.check_word_partition(article_id, 0).unwrap().is_empty());

    let sentence = store.sentence(article_id, 0).unwrap();
    let bodies: Vec<&str> = sentence.word_tokens.iter().map(|w| w.body.as_str()).collect();
    assert_eq!(bodies, vec!["我", "喜欢", "学习"]);

    let notation = store
        .notate_vocab(user_id, TokenAddress::new(article_id, 0, 1))
        .unwrap();
    let word_index = notation.record.word_index.expect("covered by a word");
    let covering = store
        .sentence(article_id, 0)
        .unwrap()
        .word_token(word_index)
        .unwrap();
    assert_eq!(covering.token_ids, vec![1, 2]);
}

// Scenario C: two distinct grammar rules coexist on one sentence; a
// repeated notation for one of them creates no new row.
#[test]
fn grammar_rules_coexist_and_collapse_per_rule() {
    let user_id = Uuid::new_v4();
    let mut store = Store::new();
    let article_id = store.import_article(&english_article(user_id)).unwrap();
    let address = SentenceAddress::new(article_id, 1);

    let relative = store
        .get_or_create_grammar_rule(
            user_id,
            "relative clause",
            "a clause modifying a noun",
            None,
            None,
            Source::Qa,
        )
        .unwrap();
    let passive = store
        .get_or_create_grammar_rule(
            user_id,
            "passive voice",
            "subject receives the action",
            None,
            None,
            Source::Qa,
        )
        .unwrap();

    assert!(store
        .notate_grammar(user_id, address, relative.record.id, &[0, 1])
        .unwrap()
        .created);
    assert!(store
        .notate_grammar(user_id, address, passive.record.id, &[1, 2])
        .unwrap()
        .created);
    let repeat = store
        .notate_grammar(user_id, address, relative.record.id, &[2])
        .unwrap();
    assert!(!repeat.created);
    assert_eq!(store.grammar_notations_for_sentence(address, None).len(), 2);
}

#[test]
fn deleting_an_article_removes_only_its_own_annotations() {
    let user_id = Uuid::new_v4();
    let mut store = Store::new();
    let doomed = store.import_article(&english_article(user_id)).unwrap();
    let kept = store.import_article(&english_article(user_id)).unwrap();

    for article_id in [doomed, kept] {
        let address = TokenAddress::new(article_id, 0, 1);
        store.notate_vocab(user_id, address).unwrap();
        store
            .mark_asked(user_id, address.sentence(), Some(1), None)
            .unwrap();
        let rule = store
            .get_or_create_grammar_rule(user_id, "word order", "", None, None, Source::Qa)
            .unwrap();
        store
            .notate_grammar(user_id, address.sentence(), rule.record.id, &[])
            .unwrap();
        let entry = store
            .get_or_create_vocab_entry(user_id, "dog", "an animal", None, Source::Qa)
            .unwrap();
        store
            .add_vocab_example(entry.record.id, address.sentence(), "", &[1])
            .unwrap();
    }

    assert!(store.delete_article(doomed));
    assert!(store.article(doomed).is_none());
    assert!(store.vocab_notations_for_article(doomed, None).is_empty());
    assert!(store.grammar_notations_for_article(doomed, None).is_empty());
    assert!(store.asked_for_article(user_id, doomed).is_empty());

    // The sibling article keeps its overlay.
    assert_eq!(store.vocab_notations_for_article(kept, None).len(), 1);
    assert_eq!(store.grammar_notations_for_article(kept, None).len(), 1);
    assert_eq!(store.asked_for_article(user_id, kept).len(), 1);

    // The reusable entry survives; only the doomed article's example is gone.
    let entry = store.vocab_entry_by_body(user_id, "dog").unwrap();
    let examples = store.vocab_examples_for_entry(entry.id);
    assert_eq!(examples.len(), 1);
    assert_eq!(examples[0].article_id, kept);

    assert!(!store.delete_article(doomed));
}

#[test]
fn snapshot_preserves_the_full_overlay() {
    let user_id = Uuid::new_v4();
    let mut store = Store::new();
    let article_id = store.import_article(&chinese_article(user_id)).unwrap();
    store
        .aggregate_words(article_id, 0, |_| vec![vec![0], vec![1, 2], vec![3, 4]])
        .unwrap();
    let address = TokenAddress::new(article_id, 0, 3);
    store.notate_vocab(user_id, address).unwrap();
    store
        .mark_asked(user_id, address.sentence(), None, None)
        .unwrap();

    let restored = Store::from_json(&store.to_json().unwrap()).unwrap();
    assert!(restored.has_vocab_notation(user_id, address));
    assert!(restored.was_asked(
        user_id,
        address.sentence(),
        None,
        glossa_core::AskedKind::Sentence
    ));
    let sentence = restored.sentence(article_id, 0).unwrap();
    assert_eq!(sentence.word_tokens.len(), 3);
    assert_eq!(sentence.token(4).unwrap().word_index, Some(2));
}
