//! Annotree: navigable structures over pre-computed sentence annotations
//!
//! Turns tokens, dependency edges, a bracketed constituency parse and
//! coreference mentions into read-only in-memory structures, and provides
//! the tree and graph queries used by downstream classifiers.

// Core modules
pub mod dependency; // Dependency graph and its queries
pub mod error;
pub mod index; // Derived constituency indices (parents, spans, clauses)
pub mod parser; // Bracket-notation tree parser
pub mod searcher; // Phrase search over constituency trees
pub mod token;
pub mod tree; // Constituency node arena

// Assembly
pub mod coref;
pub mod document;
pub mod render; // Graphviz output for debugging
pub mod sentence;

// Re-exports for convenience
pub use coref::{CorefCluster, Mention, MentionRecord};
pub use dependency::{DependencyEdge, DependencyGraph};
pub use document::{Document, DocumentBuilder, Phrase};
pub use error::{Error, Result};
pub use parser::{ParseError, parse_tree};
pub use render::to_dot;
pub use sentence::{Sentence, SentenceAnnotation};
pub use token::{SentenceId, Token, TokenId, TokenRecord};
pub use tree::{NodeId, ParseTree, TreeNode};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_structures_are_send_sync() {
        assert_send_sync::<Token>();
        assert_send_sync::<TreeNode>();
        assert_send_sync::<ParseTree>();
        assert_send_sync::<DependencyGraph>();
        assert_send_sync::<Sentence>();
        assert_send_sync::<CorefCluster>();
        assert_send_sync::<Document>();
        assert_send_sync::<Error>();
    }
}
