//! Dependency graph of a single sentence
//!
//! Each dependent has at most one governor; governor `0` is the virtual
//! ROOT and is not a token. The structure is validated once at
//! construction (ids in range, one governor and relation per dependent,
//! no cycles), after which every query is total: unknown or detached tokens
//! give empty results.

use rustc_hash::FxHashSet;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::token::TokenId;

/// Governor id of the virtual ROOT
pub const ROOT_GOVERNOR: TokenId = 0;

/// Relation substrings used by the role predicates
pub const SUBJECT: &str = "subj";
pub const OBJECT: &str = "obj";
pub const MODIFIER: &str = "mod";

/// A labelled governor -> dependent edge as delivered by the loader
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DependencyEdge {
    pub governor: TokenId,
    pub dependent: TokenId,
    pub relation: String,
}

impl DependencyEdge {
    pub fn new(governor: TokenId, dependent: TokenId, relation: &str) -> Self {
        Self {
            governor,
            dependent,
            relation: relation.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Head {
    relation: String,
    governor: TokenId,
}

/// Dependent -> (relation, governor) map plus its inverse
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Head of each token, at position `token - 1`
    heads: Vec<Option<Head>>,
    /// Dependents of each token in ascending order, at position `token - 1`
    children: Vec<Vec<TokenId>>,
    /// Tokens attached to the virtual ROOT
    roots: Vec<TokenId>,
}

impl DependencyGraph {
    /// Build the graph for a sentence of `size` tokens
    pub fn new<I>(size: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = DependencyEdge>,
    {
        let mut heads: Vec<Option<Head>> = vec![None; size];

        for edge in edges {
            if edge.dependent == ROOT_GOVERNOR || edge.dependent > size {
                return Err(Error::out_of_range(edge.dependent, size));
            }
            if edge.governor > size {
                return Err(Error::out_of_range(edge.governor, size));
            }
            let slot = edge.dependent - 1;
            match &heads[slot] {
                Some(existing) if existing.governor != edge.governor => {
                    return Err(Error::MultipleGovernors {
                        dependent: edge.dependent,
                        first: existing.governor,
                        second: edge.governor,
                    });
                }
                Some(existing) if existing.relation != edge.relation => {
                    return Err(Error::ConflictingRelation {
                        dependent: edge.dependent,
                        first: existing.relation.clone(),
                        second: edge.relation,
                    });
                }
                Some(_) => {
                    debug!(
                        governor = edge.governor,
                        dependent = edge.dependent,
                        relation = %edge.relation,
                        "ignoring repeated dependency edge"
                    );
                }
                None => {
                    heads[slot] = Some(Head {
                        relation: edge.relation,
                        governor: edge.governor,
                    });
                }
            }
        }

        let mut children = vec![Vec::new(); size];
        let mut roots = Vec::new();
        for (i, head) in heads.iter().enumerate() {
            match head {
                Some(Head { governor: ROOT_GOVERNOR, .. }) => roots.push(i + 1),
                Some(Head { governor, .. }) => children[governor - 1].push(i + 1),
                None => {}
            }
        }

        let graph = Self {
            heads,
            children,
            roots,
        };
        graph.check_acyclic()?;
        Ok(graph)
    }

    /// A chain of governors longer than the sentence must revisit a token
    fn check_acyclic(&self) -> Result<()> {
        let size = self.len();
        for token in 1..=size {
            let mut current = token;
            let mut steps = 0;
            while let Some(parent) = self.parent(current) {
                steps += 1;
                if steps > size {
                    return Err(Error::DependencyCycle(token));
                }
                current = parent;
            }
        }
        Ok(())
    }

    /// Number of tokens the graph spans
    pub fn len(&self) -> usize {
        self.heads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }

    /// Edges ordered by dependent, as `(governor, dependent, relation)`
    pub fn edges(&self) -> impl Iterator<Item = (TokenId, TokenId, &str)> + '_ {
        self.heads.iter().enumerate().filter_map(|(i, head)| {
            head.as_ref()
                .map(|h| (h.governor, i + 1, h.relation.as_str()))
        })
    }

    fn head(&self, token: TokenId) -> Option<&Head> {
        token
            .checked_sub(1)
            .and_then(|i| self.heads.get(i))
            .and_then(Option::as_ref)
    }

    /// True if the token has an edge, including an edge from ROOT
    pub fn has_entry(&self, token: TokenId) -> bool {
        self.head(token).is_some()
    }

    /// Governing token; `None` for ROOT-attached and detached tokens
    pub fn parent(&self, token: TokenId) -> Option<TokenId> {
        self.head(token)
            .map(|h| h.governor)
            .filter(|&g| g != ROOT_GOVERNOR)
    }

    /// Label of the edge governing the token
    pub fn relation(&self, token: TokenId) -> Option<&str> {
        self.head(token).map(|h| h.relation.as_str())
    }

    /// Tokens attached to the virtual ROOT
    pub fn roots(&self) -> &[TokenId] {
        &self.roots
    }

    /// First ROOT-attached token
    pub fn root(&self) -> Option<TokenId> {
        self.roots.first().copied()
    }

    /// Direct dependents, ascending
    pub fn children(&self, token: TokenId) -> &[TokenId] {
        token
            .checked_sub(1)
            .and_then(|i| self.children.get(i))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Direct dependents whose relation contains `needle`
    pub fn children_with_relation(&self, token: TokenId, needle: &str) -> Vec<TokenId> {
        self.children(token)
            .iter()
            .copied()
            .filter(|&c| self.relation_contains(c, needle))
            .collect()
    }

    /// Chain from the top of the token's tree down to the token itself.
    /// Always contains the token (a detached token is its own chain);
    /// empty only for ids outside the sentence.
    pub fn ancestors(&self, token: TokenId) -> Vec<TokenId> {
        if token == ROOT_GOVERNOR || token > self.len() {
            return Vec::new();
        }
        let mut chain: Vec<TokenId> =
            std::iter::successors(Some(token), |&t| self.parent(t)).collect();
        chain.reverse();
        chain
    }

    /// All tokens below `token`, ascending. Uses an explicit work-list and
    /// a visited set rather than recursion.
    pub fn descendants(&self, token: TokenId) -> Vec<TokenId> {
        let mut visited = FxHashSet::default();
        let mut pending: Vec<TokenId> = self.children(token).to_vec();
        while let Some(next) = pending.pop() {
            if visited.insert(next) {
                pending.extend_from_slice(self.children(next));
            }
        }
        let mut found: Vec<TokenId> = visited.into_iter().collect();
        found.sort_unstable();
        found
    }

    /// Distance from the top of the token's tree
    pub fn depth(&self, token: TokenId) -> Option<usize> {
        self.ancestors(token).len().checked_sub(1)
    }

    /// True if `ancestor` lies on the chain from the top down to `token`
    /// (a token dominates itself)
    pub fn dominates(&self, ancestor: TokenId, token: TokenId) -> bool {
        self.ancestors(token).contains(&ancestor)
    }

    /// Lowest common ancestor: the last element of the longest common prefix
    /// of the two ancestor chains
    pub fn common_ancestor(&self, a: TokenId, b: TokenId) -> Option<TokenId> {
        let left = self.ancestors(a);
        let right = self.ancestors(b);
        left.iter()
            .zip(right.iter())
            .take_while(|(x, y)| x == y)
            .last()
            .map(|(x, _)| *x)
    }

    /// Number of edges between two tokens through their common ancestor
    pub fn syntactic_distance(&self, a: TokenId, b: TokenId) -> Option<usize> {
        let lca = self.common_ancestor(a, b)?;
        let top = self.depth(lca)?;
        Some(self.depth(a)? + self.depth(b)? - 2 * top)
    }

    /// Tokens from `a` up to the common ancestor and down to `b`
    pub fn path(&self, a: TokenId, b: TokenId) -> Option<Vec<TokenId>> {
        let left = self.ancestors(a);
        let right = self.ancestors(b);
        let shared = left
            .iter()
            .zip(right.iter())
            .take_while(|(x, y)| x == y)
            .count();
        if shared == 0 {
            return None;
        }

        let mut path: Vec<TokenId> = left[shared - 1..].iter().rev().copied().collect();
        path.extend_from_slice(&right[shared..]);
        Some(path)
    }

    /// True if one token directly governs the other
    pub fn has_edge(&self, a: TokenId, b: TokenId) -> bool {
        self.parent(a) == Some(b) || self.parent(b) == Some(a)
    }

    /// Substring match on the governing relation. `"mod"` matches `amod`,
    /// `nmod:poss`, `advmod` and so on.
    pub fn relation_contains(&self, token: TokenId, needle: &str) -> bool {
        self.relation(token).is_some_and(|r| r.contains(needle))
    }

    pub fn is_subject(&self, token: TokenId) -> bool {
        self.relation_contains(token, SUBJECT)
    }

    pub fn is_object(&self, token: TokenId) -> bool {
        self.relation_contains(token, OBJECT)
    }

    pub fn is_modifier(&self, token: TokenId) -> bool {
        self.relation_contains(token, MODIFIER)
    }

    /// Token whose relation contains `label` that is syntactically closest to
    /// `seed`, optionally restricted to `subset`. The seed itself is never
    /// returned; ties go to the lowest token id.
    pub fn nearest_token_with_type(
        &self,
        seed: TokenId,
        label: &str,
        subset: Option<&[TokenId]>,
    ) -> Option<TokenId> {
        (1..=self.len())
            .filter(|&t| t != seed)
            .filter(|t| subset.is_none_or(|s| s.contains(t)))
            .filter(|&t| self.relation_contains(t, label))
            .filter_map(|t| self.syntactic_distance(seed, t).map(|d| (d, t)))
            .min()
            .map(|(_, t)| t)
    }
}
