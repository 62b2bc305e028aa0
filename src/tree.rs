//! Constituency tree data structures
//!
//! Nodes are stored in an arena in pre-order: the root is node 0 and every
//! subtree occupies a contiguous run of node ids. Parent links are not
//! stored on the nodes; they live in the derived [`TreeIndex`].

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::index::TreeIndex;
use crate::parser::{ParseError, parse_tree};
use crate::token::TokenId;

/// Arena index of a node; stable for the lifetime of the tree
pub type NodeId = usize;

/// The root always sits at the front of the arena
pub const ROOT: NodeId = 0;

/// Base labels that mark a clause
pub const CLAUSE_LABELS: [&str; 2] = ["S", "SBAR"];

pub const NOUN_PHRASE: &str = "NP";
pub const VERB_PHRASE: &str = "VP";

/// A node in a constituency tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    /// Phrase node with its children in left-to-right order
    Internal { label: String, children: Vec<NodeId> },
    /// Pre-terminal: POS label, word, and the 1-based token it stands for
    Leaf {
        label: String,
        text: String,
        token: TokenId,
    },
}

impl TreeNode {
    pub fn label(&self) -> &str {
        match self {
            TreeNode::Internal { label, .. } | TreeNode::Leaf { label, .. } => label,
        }
    }

    /// Label with function tags and co-indices stripped (`NP-SBJ-1` -> `NP`).
    /// Labels that start with `-` (`-NONE-`, `-LRB-`) are returned whole.
    pub fn base_label(&self) -> &str {
        base_label(self.label())
    }

    pub fn has_base_label(&self, label: &str) -> bool {
        self.base_label() == label
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    pub fn is_clause(&self) -> bool {
        !self.is_leaf() && CLAUSE_LABELS.contains(&self.base_label())
    }

    pub fn is_noun_phrase(&self) -> bool {
        !self.is_leaf() && self.has_base_label(NOUN_PHRASE)
    }

    pub fn is_verb_phrase(&self) -> bool {
        !self.is_leaf() && self.has_base_label(VERB_PHRASE)
    }

    pub fn children(&self) -> &[NodeId] {
        match self {
            TreeNode::Internal { children, .. } => children,
            TreeNode::Leaf { .. } => &[],
        }
    }

    pub fn token(&self) -> Option<TokenId> {
        match self {
            TreeNode::Leaf { token, .. } => Some(*token),
            TreeNode::Internal { .. } => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            TreeNode::Leaf { text, .. } => Some(text),
            TreeNode::Internal { .. } => None,
        }
    }
}

pub(crate) fn base_label(label: &str) -> &str {
    if label.starts_with('-') {
        return label;
    }
    match label.find(['-', '=']) {
        Some(cut) if cut > 0 => &label[..cut],
        _ => label,
    }
}

/// A constituency tree plus the indices derived from it
///
/// Built once, never mutated. All lookups that take a [`NodeId`] expect an
/// id obtained from this tree; ids from another tree give meaningless (but
/// memory-safe) answers or `None`.
#[derive(Debug, Clone)]
pub struct ParseTree {
    nodes: Vec<TreeNode>,
    index: TreeIndex,
}

impl ParseTree {
    /// Wrap a pre-order arena produced by the parser
    pub(crate) fn from_nodes(nodes: Vec<TreeNode>) -> Self {
        let index = TreeIndex::build(&nodes);
        Self { nodes, index }
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    /// All nodes in pre-order (root first)
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn index(&self) -> &TreeIndex {
        &self.index
    }

    /// Label of a node, or `""` for an unknown id
    pub fn label(&self, id: NodeId) -> &str {
        self.node(id).map(TreeNode::label).unwrap_or("")
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.index.parent(id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(TreeNode::children).unwrap_or(&[])
    }

    /// Proper ancestors of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// Distance from the root (root is 0)
    pub fn depth(&self, id: NodeId) -> usize {
        self.index.depth(id)
    }

    /// True if `node` lies in the subtree rooted at `ancestor` (inclusive)
    pub fn dominates(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.index.subtree(ancestor).contains(&node)
    }

    /// Proper descendants of a node in pre-order
    pub fn descendants(&self, id: NodeId) -> Range<NodeId> {
        let subtree = self.index.subtree(id);
        if subtree.is_empty() {
            subtree
        } else {
            subtree.start + 1..subtree.end
        }
    }

    /// Leaf node for a token id
    pub fn leaf(&self, token: TokenId) -> Option<NodeId> {
        self.index.leaf(token)
    }

    /// Leaf nodes, left to right
    pub fn leaves(&self) -> &[NodeId] {
        self.index.leaves()
    }

    pub fn token_count(&self) -> usize {
        self.index.leaves().len()
    }

    /// Contiguous token range `[first, last + 1)` covered by a node
    pub fn span(&self, id: NodeId) -> Range<TokenId> {
        self.index.span(id)
    }

    /// First token covered by a node, used as its lexical position
    pub fn first_token(&self, id: NodeId) -> TokenId {
        self.index.span(id).start
    }

    /// Words of the tokens covered by a node, space-joined
    pub fn text(&self, id: NodeId) -> String {
        self.descendants_inclusive(id)
            .filter_map(|n| self.nodes[n].text())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn descendants_inclusive(&self, id: NodeId) -> Range<NodeId> {
        self.index.subtree(id)
    }

    /// Clause nodes (`S`, `SBAR`) in pre-order
    pub fn clauses(&self) -> &[NodeId] {
        self.index.clauses()
    }

    /// Clauses that directly own a token, i.e. without another clause
    /// between them and the token
    pub fn clauses_containing(&self, token: TokenId) -> &[NodeId] {
        self.index.clauses_containing(token)
    }

    /// Every clause above a token, innermost first
    pub fn enclosing_clauses(&self, token: TokenId) -> Vec<NodeId> {
        match self.leaf(token) {
            Some(leaf) => self
                .ancestors(leaf)
                .filter(|&n| self.nodes[n].is_clause())
                .collect(),
            None => Vec::new(),
        }
    }

    /// True if both tokens are directly owned by a common clause
    pub fn share_clause(&self, a: TokenId, b: TokenId) -> bool {
        let left = self.clauses_containing(a);
        self.clauses_containing(b).iter().any(|c| left.contains(c))
    }

    /// Lowest node dominating both `a` and `b`
    pub fn lowest_common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        if a >= self.nodes.len() || b >= self.nodes.len() {
            return None;
        }
        std::iter::once(a)
            .chain(self.ancestors(a))
            .find(|&n| self.dominates(n, b))
    }

    /// Smallest node whose span contains every token in `tokens`
    pub fn smallest_phrase_covering(&self, tokens: Range<TokenId>) -> Option<NodeId> {
        if tokens.is_empty() {
            return None;
        }
        let first = self.leaf(tokens.start)?;
        let last = self.leaf(tokens.end - 1)?;
        self.lowest_common_ancestor(first, last)
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId) -> fmt::Result {
        match &self.nodes[id] {
            TreeNode::Leaf { label, text, .. } => write!(f, "({} {})", label, text),
            TreeNode::Internal { label, children } => {
                write!(f, "({}", label)?;
                for &child in children {
                    write!(f, " ")?;
                    self.write_node(f, child)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Renders the tree back into single-line bracket notation
impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nodes.is_empty() {
            return Ok(());
        }
        self.write_node(f, ROOT)
    }
}

impl FromStr for ParseTree {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_tree(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_TREE: &str = "(ROOT (S (NP (DT This)) (VP (VBZ is) (NP (DT a) (NN test))) (. .)))";

    #[test]
    fn test_base_label() {
        assert_eq!(base_label("NP"), "NP");
        assert_eq!(base_label("NP-SBJ"), "NP");
        assert_eq!(base_label("NP-SBJ-1"), "NP");
        assert_eq!(base_label("NP=2"), "NP");
        assert_eq!(base_label("-NONE-"), "-NONE-");
        assert_eq!(base_label("-LRB-"), "-LRB-");
    }

    #[test]
    fn test_arena_is_preorder() {
        let tree: ParseTree = TEST_TREE.parse().unwrap();

        let labels: Vec<_> = tree.nodes().iter().map(TreeNode::label).collect();
        assert_eq!(
            labels,
            vec!["ROOT", "S", "NP", "DT", "VP", "VBZ", "NP", "DT", "NN", "."]
        );
        assert_eq!(tree.root(), 0);
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn test_parent_and_children() {
        let tree: ParseTree = TEST_TREE.parse().unwrap();

        assert_eq!(tree.children(1), &[2, 4, 9]);
        for id in 1..tree.len() {
            let parent = tree.parent(id).unwrap();
            assert!(tree.children(parent).contains(&id));
        }
    }

    #[test]
    fn test_spans_and_text() {
        let tree: ParseTree = TEST_TREE.parse().unwrap();

        assert_eq!(tree.span(tree.root()), 1..6);
        assert_eq!(tree.span(4), 2..5); // VP
        assert_eq!(tree.span(6), 3..5); // object NP
        assert_eq!(tree.text(4), "is a test");
        assert_eq!(tree.first_token(6), 3);
    }

    #[test]
    fn test_depth_and_dominance() {
        let tree: ParseTree = TEST_TREE.parse().unwrap();

        assert_eq!(tree.depth(0), 0);
        assert_eq!(tree.depth(8), 4); // NN test
        assert!(tree.dominates(4, 8));
        assert!(tree.dominates(4, 4));
        assert!(!tree.dominates(2, 8));
        assert_eq!(tree.descendants(4), 5..9);
        assert_eq!(tree.ancestors(8).collect::<Vec<_>>(), vec![6, 4, 1, 0]);
    }

    #[test]
    fn test_lowest_common_ancestor() {
        let tree: ParseTree = TEST_TREE.parse().unwrap();

        let this = tree.leaf(1).unwrap();
        let test = tree.leaf(4).unwrap();
        assert_eq!(tree.lowest_common_ancestor(this, test), Some(1));
        assert_eq!(tree.lowest_common_ancestor(test, test), Some(test));
        assert_eq!(tree.smallest_phrase_covering(3..5), Some(6));
        assert_eq!(tree.smallest_phrase_covering(3..3), None);
    }

    #[test]
    fn test_clauses() {
        let tree: ParseTree = "(ROOT (S (NP (PRP I)) (VP (VBP hope) (SBAR (S (NP (PRP it)) (VP (VBZ works)))))))"
            .parse()
            .unwrap();

        let labels: Vec<_> = tree.clauses().iter().map(|&c| tree.label(c)).collect();
        assert_eq!(labels, vec!["S", "SBAR", "S"]);

        // "I" and "hope" belong to the outer clause only
        assert_eq!(tree.clauses_containing(1), &[1]);
        assert_eq!(tree.clauses_containing(2), &[1]);
        // "it" is owned by the innermost S, not by SBAR or the outer S
        let inner = tree.clauses()[2];
        assert_eq!(tree.clauses_containing(3), &[inner]);
        assert_eq!(tree.enclosing_clauses(3).len(), 3);

        assert!(tree.share_clause(1, 2));
        assert!(tree.share_clause(3, 4));
        assert!(!tree.share_clause(2, 3));
    }

    #[test]
    fn test_display_round_trip() {
        let tree: ParseTree = TEST_TREE.parse().unwrap();
        assert_eq!(tree.to_string(), TEST_TREE);
    }
}
