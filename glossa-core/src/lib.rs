//! Glossa Core - text indexing and annotation-overlay engine
//!
//! This crate provides the data model and storage logic for the Glossa
//! annotated-reading tool: stable addresses for sentences and tokens,
//! word aggregation for languages without whitespace word boundaries,
//! and the user-scoped annotation overlay built on those addresses.

pub mod error;
pub mod model;
pub mod store;
pub mod tokenizer;

pub use error::{Result, StoreError};
pub use model::{
    Article, AskedKind, AskedToken, CanonicalKey, Difficulty, GrammarExample, GrammarNotation,
    GrammarRule, Language, LearnStatus, ProcessingStatus, Sentence, SentenceAddress, Source, Token,
    TokenAddress, TokenType, VocabExample, VocabNotation, VocabularyEntry, WordToken,
};
pub use store::{PartitionViolation, Store, Upserted};
pub use tokenizer::{RawToken, SegmentedArticle, SegmentedSentence};
