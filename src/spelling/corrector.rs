//! Sentence-level spelling correction.
//!
//! [`Corrector`] is the seam the concept finder depends on. The built-in
//! [`SpellingCorrector`] wraps a SymSpell index: candidates within
//! `max_edit_distance` are found through the deletes of each word's prefix,
//! and whole sentences are corrected with `lookup_compound`, which may merge
//! two adjacent words or split one word in two.

use log::debug;
use serde::{Deserialize, Serialize};
use symspell::{SymSpell, SymSpellBuilder, UnicodeStringStrategy, Verbosity};

pub use symspell::Suggestion;

use crate::error::{ConceptError, Result};
use crate::spelling::dictionary::SpellingDictionary;

/// Maps a raw sentence to its best corrected token sequence.
pub trait Corrector {
    /// Correct `sentence` and return its tokens, none of them empty.
    fn correct(&self, sentence: &str) -> Vec<String>;
}

/// Corrector that only splits on whitespace.
///
/// Useful when the input is already normalized.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceCorrector;

impl Corrector for WhitespaceCorrector {
    fn correct(&self, sentence: &str) -> Vec<String> {
        sentence.split_whitespace().map(str::to_string).collect()
    }
}

/// Search bounds of the spelling corrector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellingConfig {
    /// Maximum edit distance between a word and its correction.
    pub max_edit_distance: usize,
    /// Number of leading characters used to index candidates.
    pub prefix_length: usize,
}

impl Default for SpellingConfig {
    fn default() -> Self {
        SpellingConfig {
            max_edit_distance: 2,
            prefix_length: 7,
        }
    }
}

/// Frequency-dictionary spelling corrector backed by SymSpell.
pub struct SpellingCorrector {
    symspell: SymSpell<UnicodeStringStrategy>,
    config: SpellingConfig,
    word_count: usize,
    total_frequency: u64,
}

impl SpellingCorrector {
    /// Build the SymSpell index over every word of `dictionary`.
    pub fn new(dictionary: &SpellingDictionary, config: SpellingConfig) -> Result<Self> {
        let mut symspell: SymSpell<UnicodeStringStrategy> = SymSpellBuilder::default()
            .max_dictionary_edit_distance(config.max_edit_distance as i64)
            .prefix_length(config.prefix_length as i64)
            .count_threshold(1)
            .build()
            .map_err(|e| ConceptError::config(format!("Invalid spelling bounds: {e}")))?;

        let mut loaded = 0usize;
        for (word, frequency) in dictionary.iter() {
            if symspell.load_dictionary_line(&format!("{word} {frequency}"), 0, 1, " ") {
                loaded += 1;
            }
        }
        debug!(
            "Indexed {} of {} words for correction",
            loaded,
            dictionary.word_count()
        );

        Ok(SpellingCorrector {
            symspell,
            config,
            word_count: dictionary.word_count(),
            total_frequency: dictionary.total_frequency(),
        })
    }

    /// The search bounds.
    pub fn config(&self) -> &SpellingConfig {
        &self.config
    }

    /// Closest dictionary words for a single word, most frequent first.
    pub fn lookup(&self, word: &str) -> Vec<Suggestion> {
        self.symspell
            .lookup(&word.to_lowercase(), Verbosity::Closest, self.max_distance())
    }

    /// Best correction of a whole sentence, lowercased with words separated
    /// by single spaces.
    pub fn lookup_compound(&self, sentence: &str) -> String {
        if sentence.trim().is_empty() {
            return String::new();
        }
        self.symspell
            .lookup_compound(sentence, self.max_distance())
            .into_iter()
            .next()
            .map(|suggestion| suggestion.term)
            .unwrap_or_default()
    }

    /// Number of words and total frequency of the source dictionary.
    pub fn dictionary_stats(&self) -> (usize, u64) {
        (self.word_count, self.total_frequency)
    }

    fn max_distance(&self) -> i64 {
        self.config.max_edit_distance as i64
    }
}

impl Corrector for SpellingCorrector {
    fn correct(&self, sentence: &str) -> Vec<String> {
        self.lookup_compound(sentence)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corrector() -> SpellingCorrector {
        let mut dict = SpellingDictionary::new();
        for (word, freq) in [
            ("chest", 5000),
            ("pain", 9000),
            ("today", 20000),
            ("heart", 7000),
            ("attack", 4000),
            ("the", 100000),
            ("headache", 800),
        ] {
            dict.add_word(word, freq);
        }
        dict.add_word_if_absent("thorax", 1);
        SpellingCorrector::new(&dict, SpellingConfig::default()).unwrap()
    }

    #[test]
    fn test_whitespace_corrector() {
        let tokens = WhitespaceCorrector.correct("  chest   pain today ");
        assert_eq!(tokens, vec!["chest", "pain", "today"]);
        assert!(WhitespaceCorrector.correct("   ").is_empty());
    }

    #[test]
    fn test_lookup_exact_and_near() {
        let corrector = corrector();

        let exact = corrector.lookup("pain");
        assert_eq!(exact[0].term, "pain");
        assert_eq!(exact[0].distance, 0);

        let near = corrector.lookup("pian");
        assert_eq!(near[0].term, "pain");
        assert_eq!(near[0].distance, 1);

        assert_eq!(corrector.lookup("thorx")[0].term, "thorax");
        assert!(corrector.lookup("zzzzzz").is_empty());
    }

    #[test]
    fn test_correct_sentence() {
        let corrector = corrector();
        assert_eq!(
            corrector.correct("Chest pian todya"),
            vec!["chest", "pain", "today"]
        );
        assert!(corrector.correct("  ").is_empty());
    }

    #[test]
    fn test_compound_merge_and_split() {
        let corrector = corrector();
        assert_eq!(corrector.correct("hea rt attack"), vec!["heart", "attack"]);
        assert_eq!(corrector.correct("chestpain"), vec!["chest", "pain"]);
    }

    #[test]
    fn test_unknown_words_pass_through() {
        let corrector = corrector();
        assert_eq!(corrector.correct("qwxzv pain"), vec!["qwxzv", "pain"]);
    }

    #[test]
    fn test_dictionary_stats() {
        let corrector = corrector();
        let (words, total) = corrector.dictionary_stats();
        assert_eq!(words, 8);
        assert_eq!(total, 145801);
    }
}
