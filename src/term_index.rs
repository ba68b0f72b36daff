//! Word-level trie mapping concept terms to their CUIs.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. A term is a
//! sequence of slots, and every synonym word of a slot transitions to the
//! same child node, so `"chest,thorax pain"` produces a single path that
//! can be entered through either spelling.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Index of a node inside a [`TermIndex`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// The root node of every index.
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// One position of a term: the synonym words accepted there.
pub type Slot = Vec<String>;

/// A parsed dictionary term bound to one concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Concept unique identifier.
    pub cui: String,
    /// Ordered slots of synonym words.
    pub slots: Vec<Slot>,
}

impl Term {
    /// Create a new term.
    pub fn new<S: Into<String>>(cui: S, slots: Vec<Slot>) -> Self {
        Term {
            cui: cui.into(),
            slots,
        }
    }

    /// Iterate over every word of every slot.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().flatten().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    transitions: AHashMap<String, NodeId>,
    // Insertion ordered, no duplicates.
    cuis: Vec<String>,
}

/// Arena trie over word sequences.
#[derive(Debug, Clone)]
pub struct TermIndex {
    nodes: Vec<Node>,
    term_count: usize,
}

impl TermIndex {
    /// Create an index holding only the root node.
    pub fn new() -> Self {
        TermIndex {
            nodes: vec![Node::default()],
            term_count: 0,
        }
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Insert a term given as slots of synonym words.
    ///
    /// If no word of a slot transitions from the current node yet, a single
    /// new child is created and every word of the slot is registered to it.
    /// Otherwise the existing child is followed and any synonym not yet
    /// registered is attached to that same child. Once the slots are
    /// consumed, `cui` is added to the node's CUI set.
    pub fn add_term<S: AsRef<str>>(&mut self, slots: &[Vec<S>], cui: &str) {
        let mut current = NodeId::ROOT;

        for slot in slots {
            let existing = slot
                .iter()
                .find_map(|word| self.follow_word(current, word.as_ref()));

            let child = match existing {
                Some(child) => child,
                None => {
                    self.nodes.push(Node::default());
                    NodeId(self.nodes.len() - 1)
                }
            };

            let transitions = &mut self.nodes[current.0].transitions;
            for word in slot {
                transitions.entry(word.as_ref().to_string()).or_insert(child);
            }

            current = child;
        }

        let cuis = &mut self.nodes[current.0].cuis;
        if !cuis.iter().any(|c| c == cui) {
            cuis.push(cui.to_string());
        }
        self.term_count += 1;
    }

    /// Insert a parsed [`Term`].
    pub fn insert(&mut self, term: &Term) {
        self.add_term(&term.slots, &term.cui);
    }

    /// Follow the transition labelled `word` out of `node`.
    ///
    /// The lookup is an exact string comparison.
    pub fn follow_word(&self, node: NodeId, word: &str) -> Option<NodeId> {
        self.nodes.get(node.0)?.transitions.get(word).copied()
    }

    /// CUIs of terms ending exactly at `node`, in insertion order.
    pub fn cuis(&self, node: NodeId) -> &[String] {
        self.nodes
            .get(node.0)
            .map(|n| n.cuis.as_slice())
            .unwrap_or(&[])
    }

    /// Whether at least one term ends at `node`.
    pub fn is_terminal(&self, node: NodeId) -> bool {
        !self.cuis(node).is_empty()
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of terms inserted so far.
    pub fn term_count(&self) -> usize {
        self.term_count
    }

    /// Total number of word transitions, aliases included.
    pub fn transition_count(&self) -> usize {
        self.nodes.iter().map(|n| n.transitions.len()).sum()
    }

    /// Whether no term has been inserted.
    pub fn is_empty(&self) -> bool {
        self.term_count == 0
    }
}

impl Default for TermIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(text: &str) -> Vec<Vec<String>> {
        text.split_whitespace()
            .map(|slot| slot.split(',').map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_synonyms_share_child() {
        let mut index = TermIndex::new();
        index.add_term(&slots("chest,thorax pain"), "C001");

        let chest = index.follow_word(index.root(), "chest").unwrap();
        let thorax = index.follow_word(index.root(), "thorax").unwrap();
        assert_eq!(chest, thorax);

        let pain = index.follow_word(chest, "pain").unwrap();
        assert_eq!(index.cuis(pain), ["C001".to_string()]);
        assert!(index.cuis(chest).is_empty());
    }

    #[test]
    fn test_shared_prefix_reuses_nodes() {
        let mut index = TermIndex::new();
        index.add_term(&slots("heart"), "C1");
        index.add_term(&slots("heart attack"), "C2");
        index.add_term(&slots("heart failure"), "C3");

        // root + heart + attack + failure
        assert_eq!(index.node_count(), 4);
        assert_eq!(index.term_count(), 3);

        let heart = index.follow_word(index.root(), "heart").unwrap();
        assert!(index.is_terminal(heart));
        assert_eq!(index.cuis(heart), ["C1".to_string()]);
    }

    #[test]
    fn test_cuis_accumulate_without_duplicates() {
        let mut index = TermIndex::new();
        index.add_term(&slots("cold"), "A");
        index.add_term(&slots("cold"), "B");
        index.add_term(&slots("cold"), "A");

        let cold = index.follow_word(index.root(), "cold").unwrap();
        assert_eq!(index.cuis(cold), ["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_partial_synonym_overlap_joins_existing_child() {
        let mut index = TermIndex::new();
        index.add_term(&slots("headache pain"), "A");
        index.add_term(&slots("cephalgia,headache"), "B");

        let headache = index.follow_word(index.root(), "headache").unwrap();
        let cephalgia = index.follow_word(index.root(), "cephalgia").unwrap();
        assert_eq!(headache, cephalgia);
        assert_eq!(index.cuis(headache), ["B".to_string()]);
        assert!(index.follow_word(cephalgia, "pain").is_some());
    }

    #[test]
    fn test_follow_word_is_exact() {
        let mut index = TermIndex::new();
        index.add_term(&slots("fever"), "C9");

        assert!(index.follow_word(index.root(), "Fever").is_none());
        assert!(index.follow_word(index.root(), "fevers").is_none());
        assert!(index.follow_word(NodeId(42), "fever").is_none());
        assert!(index.cuis(NodeId(42)).is_empty());
    }

    #[test]
    fn test_insertion_order_independent_structure() {
        let mut a = TermIndex::new();
        a.add_term(&slots("heart attack"), "C2");
        a.add_term(&slots("heart"), "C1");

        let mut b = TermIndex::new();
        b.add_term(&slots("heart"), "C1");
        b.add_term(&slots("heart attack"), "C2");

        assert_eq!(a.node_count(), b.node_count());
        assert_eq!(a.transition_count(), b.transition_count());

        for index in [&a, &b] {
            let heart = index.follow_word(index.root(), "heart").unwrap();
            assert_eq!(index.cuis(heart), ["C1"]);

            let attack = index.follow_word(heart, "attack").unwrap();
            assert_eq!(index.cuis(attack), ["C2"]);
            assert!(index.follow_word(attack, "heart").is_none());
        }
    }
}
