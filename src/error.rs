//! Error types for building and querying annotated documents

use thiserror::Error;

use crate::parser::ParseError;
use crate::token::{SentenceId, TokenId};

/// Result type for fallible operations in this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while assembling structures or looking up ids.
///
/// Queries that simply find nothing (no common ancestor, no path, tokens in
/// different sentences) return `None` or an empty collection instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    MalformedTree(#[from] ParseError),

    #[error("token id {id} out of range {min}..={max}")]
    OutOfRange {
        id: TokenId,
        min: TokenId,
        max: TokenId,
    },

    #[error("sentence id {id} out of range 1..={count}")]
    SentenceOutOfRange { id: SentenceId, count: usize },

    #[error("token ids must run 1..=N in order: expected {expected}, found {found}")]
    TokenOrder { expected: TokenId, found: TokenId },

    #[error("parse tree has {leaves} leaves but the sentence has {tokens} tokens")]
    LeafCountMismatch { leaves: usize, tokens: usize },

    #[error("token {dependent} has more than one governor ({first} and {second})")]
    MultipleGovernors {
        dependent: TokenId,
        first: TokenId,
        second: TokenId,
    },

    #[error("token {dependent} has conflicting relations ({first} and {second})")]
    ConflictingRelation {
        dependent: TokenId,
        first: String,
        second: String,
    },

    #[error("dependency edges form a cycle through token {0}")]
    DependencyCycle(TokenId),

    #[error("empty token span in sentence {sentence}")]
    EmptySpan { sentence: SentenceId },

    #[error("invalid mention: {0}")]
    InvalidMention(String),

    #[error("sentence {sentence}: {source}")]
    Sentence {
        sentence: SentenceId,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn out_of_range(id: TokenId, max: TokenId) -> Self {
        Self::OutOfRange { id, min: 1, max }
    }

    /// Attach the sentence being assembled to an error
    pub(crate) fn in_sentence(self, sentence: SentenceId) -> Self {
        Self::Sentence {
            sentence,
            source: Box::new(self),
        }
    }

    pub(crate) fn invalid_mention(msg: impl Into<String>) -> Self {
        Self::InvalidMention(msg.into())
    }
}
