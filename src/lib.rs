//! # medconcept
//!
//! Finds medical concepts in free text and encodes them as concept
//! identifiers (CUIs).
//!
//! ## Features
//!
//! - Word trie of dictionary terms with synonym slots
//! - Greedy longest-match concept scanning
//! - Spelling correction of input sentences before matching
//! - Newline-delimited batch protocol over stdin/stdout
//! - Concept dictionary builder for UMLS tables

pub mod cli;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod finder;
pub mod matcher;
pub mod protocol;
pub mod spelling;
pub mod term_index;
pub mod umls;

pub mod prelude {
    pub use crate::config::FinderConfig;
    pub use crate::dictionary::{ConceptDictionary, DictionaryLoader};
    pub use crate::error::{ConceptError, Result};
    pub use crate::finder::ConceptFinder;
    pub use crate::matcher::{ConceptMatch, ConceptMatcher};
    pub use crate::protocol::{Method, ProtocolClient, ProtocolServer};
    pub use crate::spelling::{Corrector, SpellingCorrector, WhitespaceCorrector};
    pub use crate::term_index::{Term, TermIndex};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
