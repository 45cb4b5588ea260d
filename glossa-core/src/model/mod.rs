pub mod address;
pub mod article;
pub mod entry;
pub mod notation;
pub mod sentence;

pub use address::{SentenceAddress, TokenAddress};
pub use article::{Article, Language, ProcessingStatus};
pub use entry::{CanonicalKey, GrammarRule, LearnStatus, Source, VocabularyEntry};
pub use notation::{
    AskedKind, AskedToken, GrammarExample, GrammarNotation, VocabExample, VocabNotation,
};
pub use sentence::{Difficulty, Sentence, Token, TokenType, WordToken};
