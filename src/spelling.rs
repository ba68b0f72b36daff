//! Spelling correction in front of concept matching.
//!
//! The concept trie only matches exact words, so raw sentences are first
//! normalized by a [`Corrector`](corrector::Corrector). The built-in
//! corrector combines a general word-frequency list with the vocabulary of
//! the concept dictionary.

pub mod corrector;
pub mod dictionary;

pub use corrector::{Corrector, SpellingConfig, SpellingCorrector, Suggestion, WhitespaceCorrector};
pub use dictionary::SpellingDictionary;
