//! Concept dictionary loading.
//!
//! A concept dictionary has one term per line:
//!
//! ```text
//! C0018681 1 headache,headaches
//! C0008031 1 chest,thorax pain
//! ```
//!
//! The first field is the CUI, the second is ignored (the UMLS builder
//! writes a source priority there) and the remainder is the term: slots
//! separated by spaces, synonyms within a slot separated by commas.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

use ahash::AHashSet;
use log::{debug, info, warn};

use crate::error::{ConceptError, Result};
use crate::term_index::{Slot, Term, TermIndex};

/// Immutable lookup context built once at startup.
///
/// Holds the term trie and the vocabulary of every word appearing in any
/// term, which is used to seed the spelling corrector.
#[derive(Debug, Clone, Default)]
pub struct ConceptDictionary {
    index: TermIndex,
    vocabulary: AHashSet<String>,
}

impl ConceptDictionary {
    /// Build a dictionary from already parsed terms.
    pub fn from_terms<I: IntoIterator<Item = Term>>(terms: I) -> Self {
        let mut dictionary = ConceptDictionary::default();
        for term in terms {
            dictionary.add(&term);
        }
        dictionary
    }

    fn add(&mut self, term: &Term) {
        for word in term.words() {
            if !self.vocabulary.contains(word) {
                self.vocabulary.insert(word.to_string());
            }
        }
        self.index.insert(term);
    }

    /// The term trie.
    pub fn index(&self) -> &TermIndex {
        &self.index
    }

    /// Whether `word` occurs in any loaded term.
    pub fn contains_word(&self, word: &str) -> bool {
        self.vocabulary.contains(word)
    }

    /// Every distinct word of every loaded term, sorted.
    pub fn vocabulary(&self) -> Vec<&str> {
        let mut words: Vec<&str> = self.vocabulary.iter().map(String::as_str).collect();
        words.sort_unstable();
        words
    }

    /// Number of distinct vocabulary words.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Number of loaded terms.
    pub fn term_count(&self) -> usize {
        self.index.term_count()
    }
}

/// Parser for concept dictionary files.
pub struct DictionaryLoader;

impl DictionaryLoader {
    /// Load a dictionary from a file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ConceptDictionary> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConceptError::not_found(path.display().to_string())
            } else {
                ConceptError::Io(e)
            }
        })?;
        let dictionary = Self::load(BufReader::new(file))?;

        info!(
            "Loaded {} terms ({} distinct words, {} trie nodes) from {}",
            dictionary.term_count(),
            dictionary.vocabulary_size(),
            dictionary.index().node_count(),
            path.display()
        );

        Ok(dictionary)
    }

    /// Load a dictionary from in-memory text.
    pub fn load_from_str(text: &str) -> Result<ConceptDictionary> {
        Self::load(Cursor::new(text))
    }

    /// Load a dictionary from any buffered reader.
    ///
    /// Loading is all-or-nothing: the first malformed line aborts it.
    pub fn load<R: BufRead>(reader: R) -> Result<ConceptDictionary> {
        let mut dictionary = ConceptDictionary::default();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            match Self::parse_line(&line, line_num + 1)? {
                Some(term) => dictionary.add(&term),
                None => warn!("Skipping term without words on line {}", line_num + 1),
            }
        }

        debug!(
            "Parsed {} terms into {} trie nodes",
            dictionary.term_count(),
            dictionary.index().node_count()
        );

        Ok(dictionary)
    }

    /// Parse one `CUI <ignored> term` line.
    ///
    /// Returns `Ok(None)` when the term field holds no words at all.
    pub fn parse_line(line: &str, line_num: usize) -> Result<Option<Term>> {
        let line = line.trim_end_matches(['\r', '\n']);
        let parts: Vec<&str> = line.splitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(ConceptError::dictionary(format!(
                "line {line_num}: expected 'CUI <field> term', found {} field(s): {line:?}",
                parts.len()
            )));
        }

        let slots = Self::parse_term(parts[2]);
        if slots.is_empty() {
            return Ok(None);
        }

        Ok(Some(Term::new(parts[0], slots)))
    }

    /// Split term text into slots of comma-separated synonyms.
    pub fn parse_term(text: &str) -> Vec<Slot> {
        text.split_whitespace()
            .map(|slot| {
                slot.split(',')
                    .filter(|word| !word.is_empty())
                    .map(str::to_string)
                    .collect::<Slot>()
            })
            .filter(|slot| !slot.is_empty())
            .collect()
    }
}
