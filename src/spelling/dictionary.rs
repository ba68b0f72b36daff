//! Word-frequency dictionary backing the spelling corrector.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::AHashMap;
use log::warn;

use crate::error::{ConceptError, Result};

/// Words and their corpus frequencies, all stored lowercase.
#[derive(Debug, Clone, Default)]
pub struct SpellingDictionary {
    words: AHashMap<String, u64>,
    total_count: u64,
}

impl SpellingDictionary {
    /// Create a new empty dictionary.
    pub fn new() -> Self {
        SpellingDictionary {
            words: AHashMap::new(),
            total_count: 0,
        }
    }

    /// Add a word with the given frequency, replacing any previous entry.
    pub fn add_word(&mut self, word: &str, frequency: u64) {
        let normalized = word.to_lowercase();
        let old_freq = self.words.insert(normalized, frequency).unwrap_or(0);
        self.total_count = self.total_count - old_freq + frequency;
    }

    /// Add a word only if it is not already present.
    ///
    /// Used for low-priority seeding: an entry loaded from the general
    /// frequency list is never overridden. Returns whether the word was added.
    pub fn add_word_if_absent(&mut self, word: &str, frequency: u64) -> bool {
        let normalized = word.to_lowercase();
        if self.words.contains_key(&normalized) {
            return false;
        }
        self.words.insert(normalized, frequency);
        self.total_count += frequency;
        true
    }

    /// Check if a word exists in the dictionary.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(&word.to_lowercase())
    }

    /// Get the frequency of a word, 0 when absent.
    pub fn frequency(&self, word: &str) -> u64 {
        self.words.get(&word.to_lowercase()).copied().unwrap_or(0)
    }

    /// Iterate over `(word, frequency)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.words.iter().map(|(word, freq)| (word.as_str(), *freq))
    }

    /// Get the total number of unique words.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Get the total frequency count.
    pub fn total_frequency(&self) -> u64 {
        self.total_count
    }

    /// Load `word frequency` lines from a file.
    ///
    /// A missing file is reported as [`ConceptError::NotFound`]. Lines that
    /// do not carry a word and a numeric frequency are skipped.
    pub fn load_from_frequency_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConceptError::not_found(path.display().to_string())
            } else {
                ConceptError::Io(e)
            }
        })?;

        let mut dictionary = SpellingDictionary::new();
        dictionary.extend_from_reader(BufReader::new(file))?;
        Ok(dictionary)
    }

    /// Add `word frequency` lines from a reader, overriding existing entries.
    pub fn extend_from_reader<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let mut added = 0;
        let mut skipped = 0;

        for line in reader.lines() {
            let line = line?;
            let mut parts = line.split_whitespace();

            match (parts.next(), parts.next().map(str::parse::<u64>)) {
                (Some(word), Some(Ok(frequency))) => {
                    self.add_word(word, frequency);
                    added += 1;
                }
                (None, _) => {}
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!("Skipped {skipped} malformed frequency dictionary lines");
        }

        Ok(added)
    }
}
