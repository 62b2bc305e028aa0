//! Derived indices over a constituency tree
//!
//! Everything here is computed eagerly in a couple of linear passes over the
//! pre-order arena, so that parent, span and clause lookups are O(1) once a
//! [`ParseTree`](crate::tree::ParseTree) exists.

use std::ops::Range;

use rustc_hash::FxHashMap;

use crate::token::TokenId;
use crate::tree::{NodeId, TreeNode};

/// Parent map, leaf map, spans and clause index for one tree
#[derive(Debug, Clone, Default)]
pub struct TreeIndex {
    /// Inverse of the children relation
    parents: Vec<Option<NodeId>>,
    depths: Vec<usize>,
    /// Exclusive end of each node's subtree in the arena
    subtree_ends: Vec<NodeId>,
    /// Token range covered by each node
    spans: Vec<Range<TokenId>>,
    /// Leaf node per token, at position `token - 1`
    leaves: Vec<NodeId>,
    clauses: Vec<NodeId>,
    /// Token -> clauses that own it without an intervening clause
    by_clause: FxHashMap<TokenId, Vec<NodeId>>,
}

impl TreeIndex {
    /// Build all indices from a pre-order arena
    pub fn build(nodes: &[TreeNode]) -> Self {
        let n = nodes.len();
        let mut index = Self {
            parents: vec![None; n],
            depths: vec![0; n],
            subtree_ends: vec![0; n],
            spans: vec![0..0; n],
            leaves: Vec::new(),
            clauses: Vec::new(),
            by_clause: FxHashMap::default(),
        };

        // Forward pass: parents are always visited before their children
        for (id, node) in nodes.iter().enumerate() {
            for &child in node.children() {
                index.parents[child] = Some(id);
                index.depths[child] = index.depths[id] + 1;
            }
            match node {
                TreeNode::Leaf { .. } => index.leaves.push(id),
                TreeNode::Internal { .. } if node.is_clause() => index.clauses.push(id),
                TreeNode::Internal { .. } => {}
            }
        }

        // Backward pass: children are finished before their parents
        for id in (0..n).rev() {
            match &nodes[id] {
                TreeNode::Leaf { token, .. } => {
                    index.subtree_ends[id] = id + 1;
                    index.spans[id] = *token..*token + 1;
                }
                TreeNode::Internal { children, .. } => {
                    match (children.first(), children.last()) {
                        (Some(&first), Some(&last)) => {
                            index.subtree_ends[id] = index.subtree_ends[last];
                            index.spans[id] = index.spans[first].start..index.spans[last].end;
                        }
                        _ => {
                            index.subtree_ends[id] = id + 1;
                        }
                    }
                }
            }
        }

        index.index_clauses(nodes);
        index
    }

    /// For every clause, map the leaves it owns directly (skipping nested
    /// clauses) back to that clause
    fn index_clauses(&mut self, nodes: &[TreeNode]) {
        for &clause in &self.clauses {
            let end = self.subtree_ends[clause];
            let mut id = clause + 1;
            while id < end {
                match &nodes[id] {
                    node if node.is_clause() => {
                        id = self.subtree_ends[id];
                        continue;
                    }
                    TreeNode::Leaf { token, .. } => {
                        self.by_clause.entry(*token).or_default().push(clause);
                    }
                    TreeNode::Internal { .. } => {}
                }
                id += 1;
            }
        }
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id).copied().flatten()
    }

    #[inline]
    pub fn depth(&self, id: NodeId) -> usize {
        self.depths.get(id).copied().unwrap_or(0)
    }

    /// Arena range of the subtree rooted at `id` (inclusive of `id`)
    #[inline]
    pub fn subtree(&self, id: NodeId) -> Range<NodeId> {
        match self.subtree_ends.get(id) {
            Some(&end) => id..end,
            None => 0..0,
        }
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Range<TokenId> {
        self.spans.get(id).cloned().unwrap_or(0..0)
    }

    #[inline]
    pub fn leaf(&self, token: TokenId) -> Option<NodeId> {
        token.checked_sub(1).and_then(|i| self.leaves.get(i)).copied()
    }

    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    pub fn clauses(&self) -> &[NodeId] {
        &self.clauses
    }

    pub fn clauses_containing(&self, token: TokenId) -> &[NodeId] {
        self.by_clause.get(&token).map(|v| v.as_slice()).unwrap_or(&[])
    }
}
