//! Concept extraction and encoding over raw sentences.
//!
//! [`ConceptFinder`] ties together the spelling corrector and the concept
//! matcher. Each sentence is corrected into tokens, scanned for concepts,
//! and then either reported (`extract`) or rewritten with concept spans
//! replaced by their CUIs (`encode`).

use log::{debug, info};

use crate::config::FinderConfig;
use crate::dictionary::{ConceptDictionary, DictionaryLoader};
use crate::error::Result;
use crate::matcher::{ConceptMatch, ConceptMatcher};
use crate::spelling::{Corrector, SpellingCorrector, SpellingDictionary, WhitespaceCorrector};

/// Concept extraction service over an immutable concept dictionary.
pub struct ConceptFinder {
    dictionary: ConceptDictionary,
    corrector: Box<dyn Corrector>,
}

impl ConceptFinder {
    /// Create a finder from a loaded dictionary and a corrector.
    pub fn new(dictionary: ConceptDictionary, corrector: Box<dyn Corrector>) -> Self {
        ConceptFinder {
            dictionary,
            corrector,
        }
    }

    /// Load the concept dictionary and build the spelling corrector
    /// described by `config`.
    ///
    /// The general frequency list takes priority; concept vocabulary words
    /// are only added when missing from it.
    pub fn from_config(config: &FinderConfig) -> Result<Self> {
        config.validate()?;
        let dictionary = DictionaryLoader::load_from_file(&config.concept_dictionary)?;

        if config.disable_correction {
            info!("Spelling correction disabled");
            return Ok(Self::new(dictionary, Box::new(WhitespaceCorrector)));
        }

        let spelling = build_spelling_dictionary(&dictionary, config)?;
        info!(
            "Spelling dictionary holds {} words (max edit distance {}, prefix length {})",
            spelling.word_count(),
            config.spelling.max_edit_distance,
            config.spelling.prefix_length
        );
        let corrector = SpellingCorrector::new(&spelling, config.spelling.clone())?;

        Ok(Self::new(dictionary, Box::new(corrector)))
    }

    /// The concept dictionary.
    pub fn dictionary(&self) -> &ConceptDictionary {
        &self.dictionary
    }

    /// A matcher over the concept dictionary.
    pub fn matcher(&self) -> ConceptMatcher<'_> {
        ConceptMatcher::new(self.dictionary.index())
    }

    /// Corrected, non-empty tokens of `sentence`.
    pub fn corrected_tokens(&self, sentence: &str) -> Vec<String> {
        self.corrector
            .correct(sentence.trim())
            .into_iter()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .collect()
    }

    /// Corrected tokens of `sentence` and the concepts found in them.
    pub fn find(&self, sentence: &str) -> (Vec<String>, Vec<ConceptMatch>) {
        let tokens = self.corrected_tokens(sentence);
        let matches = self.matcher().find_concepts(&tokens);
        debug!(
            "Found {} concept(s) in {} token(s)",
            matches.len(),
            tokens.len()
        );
        (tokens, matches)
    }

    /// Report every concept of every sentence as `"<cui> <length>"`.
    ///
    /// The records of all sentences form one flat list; ambiguous spans
    /// produce one record per CUI.
    pub fn extract<S: AsRef<str>>(&self, sentences: &[S]) -> Vec<String> {
        let mut concepts = Vec::new();
        for sentence in sentences {
            let (_, matches) = self.find(sentence.as_ref());
            concepts.extend(
                matches
                    .iter()
                    .map(|m| format!("{} {}", m.cui, m.length)),
            );
        }
        concepts
    }

    /// Rewrite each sentence with concept spans replaced by their CUIs.
    ///
    /// Exactly one line is produced per input sentence.
    pub fn encode<S: AsRef<str>>(&self, sentences: &[S]) -> Vec<String> {
        sentences
            .iter()
            .map(|sentence| {
                let (tokens, matches) = self.find(sentence.as_ref());
                substitute_concepts(&tokens, &matches)
            })
            .collect()
    }
}

/// Join `tokens` with matched spans collapsed into their CUIs.
///
/// The match cursor advances by exactly one match per substituted span.
/// After an ambiguous span the cursor rests on a sibling match whose start
/// is already behind the token index, so only the first CUI of that span
/// is substituted and later spans of the sentence stay as plain tokens.
/// Tokens outside substituted spans are kept verbatim and in order.
pub fn substitute_concepts<S: AsRef<str>>(tokens: &[S], matches: &[ConceptMatch]) -> String {
    let mut words: Vec<&str> = Vec::with_capacity(tokens.len());
    let mut next = 0;
    let mut index = 0;

    while index < tokens.len() {
        match matches.get(next) {
            Some(m) if m.start == index => {
                words.push(&m.cui);
                index += m.length;
                next += 1;
            }
            _ => {
                words.push(tokens[index].as_ref());
                index += 1;
            }
        }
    }

    words.join(" ")
}

fn build_spelling_dictionary(
    dictionary: &ConceptDictionary,
    config: &FinderConfig,
) -> Result<SpellingDictionary> {
    let mut spelling = match &config.frequency_dictionary {
        Some(path) => SpellingDictionary::load_from_frequency_file(path)?,
        None => SpellingDictionary::new(),
    };

    let mut seeded = 0;
    for word in dictionary.vocabulary() {
        if spelling.add_word_if_absent(word, config.vocabulary_frequency) {
            seeded += 1;
        }
    }
    debug!("Seeded {seeded} concept words into the spelling dictionary");

    Ok(spelling)
}
