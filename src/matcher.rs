//! Longest-match concept scanning over token sequences.

use serde::{Deserialize, Serialize};

use crate::term_index::TermIndex;

/// A concept found in a token sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptMatch {
    /// Concept unique identifier.
    pub cui: String,
    /// Index of the first token of the span.
    pub start: usize,
    /// Number of tokens in the span.
    pub length: usize,
}

impl ConceptMatch {
    /// Create a new match.
    pub fn new<S: Into<String>>(cui: S, start: usize, length: usize) -> Self {
        ConceptMatch {
            cui: cui.into(),
            start,
            length,
        }
    }

    /// One past the last token of the span.
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Scans token sequences against a [`TermIndex`].
///
/// The walk is forward-only: from a start position it follows transitions
/// until one is missing and keeps the longest prefix that ended on a node
/// carrying CUIs. Shorter alternatives are never revisited.
#[derive(Debug, Clone, Copy)]
pub struct ConceptMatcher<'a> {
    index: &'a TermIndex,
}

impl<'a> ConceptMatcher<'a> {
    /// Create a matcher reading from `index`.
    pub fn new(index: &'a TermIndex) -> Self {
        ConceptMatcher { index }
    }

    /// Longest CUI-bearing prefix of `tokens[start..]`.
    ///
    /// Returns the CUIs of that prefix and its length in tokens, or an empty
    /// slice and 0 when no prefix ends on a CUI-bearing node.
    pub fn match_at<S: AsRef<str>>(&self, tokens: &[S], start: usize) -> (&'a [String], usize) {
        let mut best: (&'a [String], usize) = (&[], 0);
        let mut node = self.index.root();

        for (offset, token) in tokens.iter().enumerate().skip(start) {
            match self.index.follow_word(node, token.as_ref()) {
                Some(next) => {
                    node = next;
                    let cuis = self.index.cuis(node);
                    if !cuis.is_empty() {
                        best = (cuis, offset + 1 - start);
                    }
                }
                None => break,
            }
        }

        best
    }

    /// Find every concept in `tokens`, left to right.
    ///
    /// A span carrying several CUIs yields one match per CUI, all sharing
    /// the same start and length. Spans never overlap.
    pub fn find_concepts<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<ConceptMatch> {
        let mut matches = Vec::new();
        let mut index = 0;

        while index < tokens.len() {
            let (cuis, length) = self.match_at(tokens, index);
            if length == 0 {
                index += 1;
                continue;
            }

            matches.extend(
                cuis.iter()
                    .map(|cui| ConceptMatch::new(cui.as_str(), index, length)),
            );
            index += length;
        }

        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::DictionaryLoader;

    fn index(text: &str) -> TermIndex {
        DictionaryLoader::load_from_str(text).unwrap().index().clone()
    }

    #[test]
    fn test_longest_match_wins() {
        let index = index("C1 n heart\nC2 n heart attack\n");
        let matcher = ConceptMatcher::new(&index);

        let (cuis, length) = matcher.match_at(&["heart", "attack", "now"], 0);
        assert_eq!(length, 2);
        assert_eq!(cuis, ["C2".to_string()]);

        let matches = matcher.find_concepts(&["heart", "attack", "now"]);
        assert_eq!(matches, vec![ConceptMatch::new("C2", 0, 2)]);
    }

    #[test]
    fn test_falls_back_to_last_labelled_prefix() {
        // "heart attack" is only a path, not a term, so the scan keeps "heart".
        let index = index("C1 n heart\nC2 n heart attack severe\n");
        let matcher = ConceptMatcher::new(&index);

        let (cuis, length) = matcher.match_at(&["heart", "attack", "now"], 0);
        assert_eq!(length, 1);
        assert_eq!(cuis, ["C1".to_string()]);
    }

    #[test]
    fn test_no_match_returns_zero() {
        let index = index("C1 n chest pain\n");
        let matcher = ConceptMatcher::new(&index);

        let (cuis, length) = matcher.match_at(&["chest", "today"], 0);
        assert_eq!(length, 0);
        assert!(cuis.is_empty());
        assert_eq!(matcher.match_at(&["chest"], 1).1, 0);
        assert!(matcher.find_concepts::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_scenario_chest_pain() {
        let index = index("C001 noun chest,thorax pain\n");
        let matcher = ConceptMatcher::new(&index);

        assert_eq!(
            matcher.find_concepts(&["chest", "pain", "today"]),
            vec![ConceptMatch::new("C001", 0, 2)]
        );
        assert_eq!(
            matcher.find_concepts(&["no", "thorax", "pain"]),
            vec![ConceptMatch::new("C001", 1, 2)]
        );
    }

    #[test]
    fn test_ambiguous_span_fans_out() {
        let index = index("A n cold\nB n cold\n");
        let matcher = ConceptMatcher::new(&index);

        let matches = matcher.find_concepts(&["a", "cold", "day"]);
        assert_eq!(
            matches,
            vec![ConceptMatch::new("A", 1, 1), ConceptMatch::new("B", 1, 1)]
        );
    }

    #[test]
    fn test_matches_are_ordered_and_disjoint() {
        let index = index("C1 n a b\nC2 n b c\nC3 n c\nC4 n d\n");
        let matcher = ConceptMatcher::new(&index);

        let tokens = ["a", "b", "c", "x", "d", "c"];
        let matches = matcher.find_concepts(&tokens);
        assert_eq!(
            matches,
            vec![
                ConceptMatch::new("C1", 0, 2),
                ConceptMatch::new("C3", 2, 1),
                ConceptMatch::new("C4", 4, 1),
                ConceptMatch::new("C3", 5, 1),
            ]
        );
        for pair in matches.windows(2) {
            assert!(pair[0].end() <= pair[1].start);
        }
    }
}
