//! Phrase search over constituency trees
//!
//! Heuristic searches used by downstream consumers to find the subject,
//! object and verbs related to a node:
//! 1. `nearest_object`: shallowest NP below a head, ties by lexical distance
//! 2. `nearest_subject` / `dependent_verb`: nearest "cousin" found by
//!    climbing the tree and scanning sibling subtrees
//! 3. `governing_verb`: nearest VP above a node
//!
//! Subtrees are contiguous in the pre-order arena, so "all descendants of P
//! except the current subtree" is two id ranges.

use std::ops::Range;

use tracing::trace;

use crate::token::{TokenId, is_nominal_tag, is_verbal_tag};
use crate::tree::{NodeId, ParseTree, TreeNode};

impl ParseTree {
    /// Descendants of `node` accepted by `filter`, paired with their depth
    /// relative to `node`, in pre-order
    pub fn descendants_with_depth<F>(&self, node: NodeId, filter: F) -> Vec<(NodeId, usize)>
    where
        F: Fn(&TreeNode) -> bool,
    {
        let base = self.depth(node);
        self.descendants(node)
            .filter(|&id| filter(&self.nodes()[id]))
            .map(|id| (id, self.depth(id) - base))
            .collect()
    }

    /// Token ranges of NP nodes that contain at least one nominal POS tag
    pub fn noun_phrases(&self) -> Vec<Range<TokenId>> {
        self.confirmed_phrases(TreeNode::is_noun_phrase, is_nominal_tag)
    }

    /// Token ranges of VP nodes that contain at least one verbal POS tag
    pub fn verb_phrases(&self) -> Vec<Range<TokenId>> {
        self.confirmed_phrases(TreeNode::is_verb_phrase, is_verbal_tag)
    }

    /// Phrase ranges whose leaves confirm the phrase type; guards against
    /// mislabeled chunks. Identical ranges are reported once.
    fn confirmed_phrases<P, C>(&self, is_phrase: P, confirms: C) -> Vec<Range<TokenId>>
    where
        P: Fn(&TreeNode) -> bool,
        C: Fn(&str) -> bool,
    {
        let mut phrases: Vec<Range<TokenId>> = Vec::new();
        for (id, node) in self.nodes().iter().enumerate() {
            if !is_phrase(node) {
                continue;
            }
            let confirmed = self
                .descendants(id)
                .map(|d| &self.nodes()[d])
                .any(|d| d.is_leaf() && confirms(d.label()));
            let span = self.span(id);
            if confirmed && !phrases.contains(&span) {
                phrases.push(span);
            }
        }
        phrases
    }

    /// NP below `head` closest to it: shallowest first, then smallest
    /// distance between its first token and `head`'s first token
    pub fn nearest_object(&self, head: NodeId) -> Option<NodeId> {
        let position = self.first_token(head);
        self.descendants_with_depth(head, TreeNode::is_noun_phrase)
            .into_iter()
            .min_by_key(|&(id, depth)| (depth, self.first_token(id).abs_diff(position)))
            .map(|(id, _)| id)
    }

    /// Nearest NP outside `head`'s own subtree, not looking inside VPs
    pub fn nearest_subject(&self, head: NodeId) -> Option<NodeId> {
        self.nearest_cousin(head, TreeNode::is_noun_phrase, TreeNode::is_verb_phrase)
    }

    /// Nearest VP outside `head`'s own subtree, climbing through NPs
    pub fn dependent_verb(&self, head: NodeId) -> Option<NodeId> {
        self.nearest_cousin(head, TreeNode::is_verb_phrase, TreeNode::is_noun_phrase)
    }

    /// Nearest VP ancestor of `head`
    pub fn governing_verb(&self, head: NodeId) -> Option<NodeId> {
        self.ancestors(head)
            .find(|&id| self.nodes()[id].is_verb_phrase())
    }

    /// Climb from `head`; at each step look at the parent `P`. Parents that
    /// match `ignore` are climbed through. Otherwise the first descendant of
    /// `P` outside the subtree we came from that matches `target` wins.
    fn nearest_cousin<T, I>(&self, head: NodeId, target: T, ignore: I) -> Option<NodeId>
    where
        T: Fn(&TreeNode) -> bool,
        I: Fn(&TreeNode) -> bool,
    {
        let mut current = head;
        while let Some(parent) = self.parent(current) {
            if ignore(&self.nodes()[parent]) {
                trace!(node = current, parent, "climbing through ignored parent");
                current = parent;
                continue;
            }

            let visited = self.index().subtree(current);
            let found = self
                .descendants(parent)
                .filter(|id| !visited.contains(id))
                .find(|&id| target(&self.nodes()[id]));
            if found.is_some() {
                return found;
            }
            current = parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse_tree;
    use crate::tree::ParseTree;

    const TEST_TREE: &str = "(ROOT (S (NP (DT This)) (VP (VBZ is) (NP (DT a) (NN test))) (. .)))";

    /// 0 ROOT, 1 S, 2 NP, 3 PRP, 4 VP, 5 VBD, 6 NP, 7 DT, 8 NN, 9 PP, 10 IN,
    /// 11 NP, 12 DT, 13 NN
    const SAW_TREE: &str = "(ROOT (S (NP (PRP She)) (VP (VBD saw) (NP (DT the) (NN dog)) (PP (IN in) (NP (DT the) (NN park))))))";

    fn labels(tree: &ParseTree, ids: &[usize]) -> Vec<String> {
        ids.iter().map(|&id| tree.label(id).to_string()).collect()
    }

    #[test]
    fn test_noun_phrases_simple() {
        let tree = parse_tree("(ROOT (NP (DT The) (NN dog)))").unwrap();
        assert_eq!(tree.noun_phrases(), vec![1..3]);
        assert!(tree.clauses().is_empty());
        assert!(tree.verb_phrases().is_empty());
    }

    #[test]
    fn test_noun_phrases_require_confirmation() {
        // Chunk labelled NP but holding only a determiner
        let tree = parse_tree("(ROOT (S (NP (DT This)) (VP (VBZ is) (NP (DT a) (NN test)))))").unwrap();
        assert_eq!(tree.noun_phrases(), vec![3..5]);
        assert_eq!(tree.verb_phrases(), vec![2..5]);
    }

    #[test]
    fn test_noun_phrases_deduplicated() {
        let tree = parse_tree("(ROOT (NP (NP (NNP John))))").unwrap();
        assert_eq!(tree.noun_phrases(), vec![1..2]);
    }

    #[test]
    fn test_descendants_with_depth() {
        let tree = parse_tree(SAW_TREE).unwrap();
        let nps = tree.descendants_with_depth(4, |n| n.is_noun_phrase());
        assert_eq!(nps, vec![(6, 1), (11, 2)]);
    }

    #[test]
    fn test_nearest_object_prefers_shallow() {
        let tree = parse_tree(SAW_TREE).unwrap();
        // From the VP, "the dog" (depth 1) beats "the park" (depth 2)
        assert_eq!(tree.nearest_object(4), Some(6));
        assert_eq!(tree.text(6), "the dog");
    }

    #[test]
    fn test_nearest_object_ties_by_distance() {
        // Both NPs sit at depth 1 below the VP; "him" starts one token after
        // "gave", "a book" two
        let tree = parse_tree("(ROOT (VP (VBD gave) (NP (PRP him)) (NP (DT a) (NN book))))").unwrap();
        let object = tree.nearest_object(1).unwrap();
        assert_eq!(tree.text(object), "him");
    }

    #[test]
    fn test_nearest_object_none() {
        let tree = parse_tree(SAW_TREE).unwrap();
        assert_eq!(tree.nearest_object(5), None); // leaf
    }

    #[test]
    fn test_nearest_subject() {
        let tree = parse_tree(SAW_TREE).unwrap();
        let verb = tree.leaf(2).unwrap();

        // Climb out of the VP (ignored) and find "She" under S
        let subject = tree.nearest_subject(verb).unwrap();
        assert_eq!(tree.text(subject), "She");
        assert_eq!(labels(&tree, &[subject]), vec!["NP"]);
    }

    #[test]
    fn test_nearest_subject_none_at_root() {
        let tree = parse_tree("(ROOT (VP (VB Go)))").unwrap();
        let verb = tree.leaf(1).unwrap();
        assert_eq!(tree.nearest_subject(verb), None);
    }

    #[test]
    fn test_nearest_subject_skips_own_subtree() {
        let tree = parse_tree(TEST_TREE).unwrap();
        // Starting from the object NP, the VP parent is climbed through and
        // the subject NP "This" is found under S
        let subject = tree.nearest_subject(6).unwrap();
        assert_eq!(tree.text(subject), "This");
    }

    #[test]
    fn test_dependent_verb() {
        let tree = parse_tree(SAW_TREE).unwrap();
        let verb_phrase = tree.dependent_verb(2).unwrap();
        assert_eq!(verb_phrase, 4);
        assert_eq!(tree.text(verb_phrase), "saw the dog in the park");
    }

    #[test]
    fn test_governing_verb() {
        let tree = parse_tree(SAW_TREE).unwrap();
        let park = tree.leaf(6).unwrap();
        assert_eq!(tree.governing_verb(park), Some(4));

        let she = tree.leaf(1).unwrap();
        assert_eq!(tree.governing_verb(she), None);
    }
}
