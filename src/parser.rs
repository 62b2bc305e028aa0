//! Bracket-notation tree parser
//!
//! Parses Penn-Treebank style strings such as
//! `(ROOT (S (NP (DT This)) (VP (VBZ is) (NP (DT a) (NN test))) (. .)))`
//! into a [`ParseTree`]. The input is first split into atoms, then a
//! recursive-descent pass builds the node arena in pre-order. One forward
//! pass, no backtracking.

use bstr::ByteSlice;
use thiserror::Error;
use tracing::debug;

use crate::token::TokenId;
use crate::tree::{NodeId, ParseTree, TreeNode};

/// Bytes that end a text atom
const DELIMITERS: &[u8] = b"() \t\n\r\x0c";

/// Structural error in a bracketed tree string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed tree at atom {position}: {message}")]
pub struct ParseError {
    /// Index of the offending atom in the tokenized input
    pub position: usize,
    pub message: String,
}

impl ParseError {
    fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Atom<'a> {
    Left,
    Right,
    Text(&'a str),
}

/// Split the input on parentheses and whitespace
pub(crate) fn tokenize(input: &str) -> Vec<Atom<'_>> {
    let bytes = input.as_bytes();
    let mut atoms = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'(' => {
                atoms.push(Atom::Left);
                pos += 1;
            }
            b')' => {
                atoms.push(Atom::Right);
                pos += 1;
            }
            b if b.is_ascii_whitespace() => pos += 1,
            _ => {
                let len = bytes[pos..]
                    .find_byteset(DELIMITERS)
                    .unwrap_or(bytes.len() - pos);
                // Delimiters are ASCII, so both ends are char boundaries
                atoms.push(Atom::Text(&input[pos..pos + len]));
                pos += len;
            }
        }
    }

    atoms
}

/// Number the terminal words: a text atom directly followed by `)`.
/// Indices are 1-based and increase in discovery order.
fn number_terminals(atoms: &[Atom<'_>]) -> Vec<Option<TokenId>> {
    let mut next = 1;
    atoms
        .iter()
        .zip(atoms.iter().skip(1).map(Some).chain(std::iter::once(None)))
        .map(|(atom, following)| match (atom, following) {
            (Atom::Text(_), Some(Atom::Right)) => {
                let id = next;
                next += 1;
                Some(id)
            }
            _ => None,
        })
        .collect()
}

struct TreeBuilder<'a> {
    atoms: Vec<Atom<'a>>,
    terminals: Vec<Option<TokenId>>,
    pos: usize,
    nodes: Vec<TreeNode>,
}

impl<'a> TreeBuilder<'a> {
    fn new(input: &'a str) -> Self {
        let atoms = tokenize(input);
        let terminals = number_terminals(&atoms);
        Self {
            atoms,
            terminals,
            pos: 0,
            nodes: Vec::new(),
        }
    }

    fn peek(&self) -> Option<Atom<'a>> {
        self.atoms.get(self.pos).copied()
    }

    fn peek_second(&self) -> Option<Atom<'a>> {
        self.atoms.get(self.pos + 1).copied()
    }

    fn build(mut self) -> Result<Vec<TreeNode>, ParseError> {
        if self.atoms.is_empty() {
            return Err(ParseError::new(0, "empty input"));
        }
        if self.peek() != Some(Atom::Left) {
            return Err(ParseError::new(0, "tree must start with '('"));
        }

        self.parse_node()?;

        let trailing = &self.atoms[self.pos..];
        if let Some(offset) = trailing.iter().position(|a| *a != Atom::Right) {
            return Err(ParseError::new(
                self.pos + offset,
                "unexpected input after the root node",
            ));
        }
        if !trailing.is_empty() {
            debug!(count = trailing.len(), "dropping stray closing brackets");
        }

        Ok(self.nodes)
    }

    /// `( label child+ )` or `( label word )`
    fn parse_node(&mut self) -> Result<NodeId, ParseError> {
        let start = self.pos;
        match self.peek() {
            Some(Atom::Left) => self.pos += 1,
            _ => return Err(ParseError::new(start, "expected '('")),
        }

        let label = match self.peek() {
            Some(Atom::Text(label)) => label.to_string(),
            Some(_) => return Err(ParseError::new(self.pos, "expected a node label")),
            None => return Err(ParseError::new(self.pos, "input ends before node label")),
        };
        self.pos += 1;

        match (self.peek(), self.peek_second()) {
            (Some(Atom::Left), _) => {
                let id = self.nodes.len();
                self.nodes.push(TreeNode::Internal {
                    label,
                    children: Vec::new(),
                });
                let children = self.parse_children()?;
                if let TreeNode::Internal { children: slot, .. } = &mut self.nodes[id] {
                    *slot = children;
                }
                Ok(id)
            }
            (Some(Atom::Text(text)), Some(Atom::Right)) => {
                let token = self.terminals[self.pos].ok_or_else(|| {
                    ParseError::new(self.pos, "terminal word was not numbered")
                })?;
                let id = self.nodes.len();
                self.nodes.push(TreeNode::Leaf {
                    label,
                    text: text.to_string(),
                    token,
                });
                self.pos += 2;
                Ok(id)
            }
            (None, _) => Err(ParseError::new(self.pos, "input ends inside node")),
            _ => Err(ParseError::new(
                self.pos,
                format!("node '{}' needs either children or a single word", label),
            )),
        }
    }

    /// Children up to and including the closing `)` of the current node
    fn parse_children(&mut self) -> Result<Vec<NodeId>, ParseError> {
        let mut children = Vec::new();
        loop {
            match self.peek() {
                Some(Atom::Left) => children.push(self.parse_node()?),
                Some(Atom::Right) => {
                    self.pos += 1;
                    return Ok(children);
                }
                Some(Atom::Text(text)) => {
                    return Err(ParseError::new(
                        self.pos,
                        format!("stray word '{}' between children", text),
                    ));
                }
                None => return Err(ParseError::new(self.pos, "unbalanced parentheses")),
            }
        }
    }
}

/// Parse a bracketed constituency string into a [`ParseTree`]
pub fn parse_tree(input: &str) -> Result<ParseTree, ParseError> {
    let nodes = TreeBuilder::new(input).build()?;
    let tree = ParseTree::from_nodes(nodes);
    debug!(
        nodes = tree.len(),
        tokens = tree.token_count(),
        clauses = tree.clauses().len(),
        "built constituency tree"
    );
    Ok(tree)
}
