//! A sentence: tokens, dependency graph and constituency tree over the same
//! token ids `1..=N`

use std::ops::Range;

use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dependency::{DependencyEdge, DependencyGraph};
use crate::error::{Error, Result};
use crate::parser::parse_tree;
use crate::token::{SentenceId, Token, TokenId, TokenRecord};
use crate::tree::{NodeId, ParseTree};

/// Raw annotations for one sentence as delivered by the loader
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SentenceAnnotation {
    pub tokens: Vec<TokenRecord>,
    pub dependencies: Vec<DependencyEdge>,
    /// Constituency parse in bracket notation
    pub parse: String,
}

/// An annotated sentence
#[derive(Debug, Clone)]
pub struct Sentence {
    id: SentenceId,
    tokens: Vec<Token>,
    graph: DependencyGraph,
    tree: ParseTree,
}

impl Sentence {
    /// Build a sentence from raw annotations
    pub fn new(id: SentenceId, annotation: SentenceAnnotation) -> Result<Self> {
        let tree = parse_tree(&annotation.parse)?;
        Self::from_parts(id, annotation.tokens, annotation.dependencies, tree)
    }

    /// Build a sentence from token records, edges and an already parsed tree
    pub fn from_parts(
        id: SentenceId,
        records: Vec<TokenRecord>,
        edges: Vec<DependencyEdge>,
        tree: ParseTree,
    ) -> Result<Self> {
        for (position, record) in records.iter().enumerate() {
            if record.index != position + 1 {
                return Err(Error::TokenOrder {
                    expected: position + 1,
                    found: record.index,
                });
            }
        }
        if tree.token_count() != records.len() {
            return Err(Error::LeafCountMismatch {
                leaves: tree.token_count(),
                tokens: records.len(),
            });
        }

        let graph = DependencyGraph::new(records.len(), edges)?;
        let tokens: Vec<Token> = records
            .into_iter()
            .map(|record| Token::from_record(id, record))
            .collect();

        debug!(
            sentence = id,
            tokens = tokens.len(),
            edges = graph.edges().count(),
            "built sentence"
        );

        Ok(Self {
            id,
            tokens,
            graph,
            tree,
        })
    }

    pub fn id(&self) -> SentenceId {
        self.id
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn min_token_id(&self) -> TokenId {
        1
    }

    pub fn max_token_id(&self) -> TokenId {
        self.tokens.len()
    }

    /// Token by id, or `None` outside `1..=N`
    pub fn get(&self, id: TokenId) -> Option<&Token> {
        id.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    /// Token by id, failing with [`Error::OutOfRange`] outside `1..=N`
    pub fn token(&self, id: TokenId) -> Result<&Token> {
        self.get(id)
            .ok_or_else(|| Error::out_of_range(id, self.max_token_id()))
    }

    /// Tokens with ids in `range`, clamped to the sentence
    pub fn tokens_in(&self, range: Range<TokenId>) -> &[Token] {
        let start = range.start.max(1).min(self.len() + 1);
        let end = range.end.max(start).min(self.len() + 1);
        &self.tokens[start - 1..end - 1]
    }

    pub fn dependencies(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn parse_tree(&self) -> &ParseTree {
        &self.tree
    }

    /// Words joined by single spaces
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.word.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Words of the tokens in `range`, joined by single spaces
    pub fn phrase_text(&self, range: Range<TokenId>) -> String {
        self.tokens_in(range)
            .iter()
            .map(|t| t.word.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Character span from the first token's start to the last token's end
    pub fn char_span(&self) -> Option<Range<usize>> {
        match (self.tokens.first(), self.tokens.last()) {
            (Some(first), Some(last)) => Some(first.char_start..last.char_end),
            _ => None,
        }
    }

    /// Tokens from `id - radius` to `id + radius`, clamped to the sentence
    pub fn window(&self, id: TokenId, radius: usize) -> Result<&[Token]> {
        self.token(id)?;
        let end = id.saturating_add(radius).saturating_add(1);
        Ok(self.tokens_in(id.saturating_sub(radius)..end))
    }

    /// Up to `radius` tokens on each side of `id`, excluding `id`
    pub fn context(&self, id: TokenId, radius: usize) -> Result<(&[Token], &[Token])> {
        self.token(id)?;
        let left = self.tokens_in(id.saturating_sub(radius)..id);
        let right = self.tokens_in(id + 1..id.saturating_add(radius).saturating_add(1));
        Ok((left, right))
    }

    /// Lowest common ancestor of two tokens in the dependency graph
    pub fn common_ancestor(&self, a: TokenId, b: TokenId) -> Option<&Token> {
        self.graph
            .common_ancestor(a, b)
            .and_then(|id| self.get(id))
    }

    pub fn syntactic_distance(&self, a: TokenId, b: TokenId) -> Option<usize> {
        self.graph.syntactic_distance(a, b)
    }

    /// Tokens on the dependency path from `a` to `b`
    pub fn path(&self, a: TokenId, b: TokenId) -> Option<Vec<&Token>> {
        let ids = self.graph.path(a, b)?;
        ids.into_iter().map(|id| self.get(id)).collect()
    }

    pub fn nearest_token_with_type(
        &self,
        seed: TokenId,
        label: &str,
        subset: Option<&[TokenId]>,
    ) -> Option<&Token> {
        self.graph
            .nearest_token_with_type(seed, label, subset)
            .and_then(|id| self.get(id))
    }

    /// Syntactic head of a token range: the token whose governor lies
    /// outside the range. Tokens with a dependency entry are preferred, then
    /// the shallowest, then the leftmost.
    pub fn head_of(&self, range: Range<TokenId>) -> Option<&Token> {
        let inside = |t: TokenId| range.contains(&t);
        self.tokens_in(range.clone())
            .iter()
            .filter(|t| self.graph.parent(t.id).is_none_or(|p| !inside(p)))
            .min_by_key(|t| {
                (
                    !self.graph.has_entry(t.id),
                    self.graph.depth(t.id).unwrap_or(0),
                    t.id,
                )
            })
    }

    /// Noun phrase ranges of the constituency tree
    pub fn noun_phrases(&self) -> Vec<Range<TokenId>> {
        self.tree.noun_phrases()
    }

    /// Verb phrase ranges of the constituency tree
    pub fn verb_phrases(&self) -> Vec<Range<TokenId>> {
        self.tree.verb_phrases()
    }

    fn phrase_from_leaf<F>(&self, token: TokenId, search: F) -> Option<Range<TokenId>>
    where
        F: FnOnce(&ParseTree, NodeId) -> Option<NodeId>,
    {
        let leaf = self.tree.leaf(token)?;
        search(&self.tree, leaf).map(|node| self.tree.span(node))
    }

    /// Nearest NP that could be the subject of the token's clause
    pub fn nearest_subject(&self, token: TokenId) -> Option<Range<TokenId>> {
        self.phrase_from_leaf(token, |tree, leaf| tree.nearest_subject(leaf))
    }

    /// Nearest NP inside the VP that governs the token. Unlike
    /// [`ParseTree::nearest_object`], the search starts from that VP rather
    /// than from the token's own leaf.
    pub fn nearest_object(&self, token: TokenId) -> Option<Range<TokenId>> {
        self.phrase_from_leaf(token, |tree, leaf| {
            tree.governing_verb(leaf)
                .and_then(|verb| tree.nearest_object(verb))
        })
    }

    /// VP that dominates the token
    pub fn governing_verb(&self, token: TokenId) -> Option<Range<TokenId>> {
        self.phrase_from_leaf(token, |tree, leaf| tree.governing_verb(leaf))
    }

    /// Nearest VP outside the phrase containing the token
    pub fn dependent_verb(&self, token: TokenId) -> Option<Range<TokenId>> {
        self.phrase_from_leaf(token, |tree, leaf| tree.dependent_verb(leaf))
    }

    /// True if both tokens are owned by the same clause
    pub fn share_clause(&self, a: TokenId, b: TokenId) -> bool {
        self.tree.share_clause(a, b)
    }
}
