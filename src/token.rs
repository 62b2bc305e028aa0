//! Per-word annotation records
//!
//! A [`Token`] is immutable once a sentence has been built. Identity,
//! equality, hashing and ordering all go through `(sentence_id, id)`, so two
//! tokens with the same position compare equal even if their annotations
//! differ.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 1-based position of a token within its sentence
pub type TokenId = usize;

/// 1-based position of a sentence within its document
pub type SentenceId = usize;

/// Token annotation as delivered by the annotation loader
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TokenRecord {
    pub index: TokenId,
    pub word: String,
    pub lemma: String,
    pub char_start: usize,
    pub char_end: usize,
    pub pos: String,
    pub ner: String,
}

impl TokenRecord {
    pub fn new(index: TokenId, word: &str, lemma: &str, pos: &str) -> Self {
        Self {
            index,
            word: word.to_string(),
            lemma: lemma.to_string(),
            char_start: 0,
            char_end: 0,
            pos: pos.to_string(),
            ner: "O".to_string(),
        }
    }

    /// Set the character offsets `[start, end)` of the token
    pub fn with_offsets(mut self, start: usize, end: usize) -> Self {
        self.char_start = start;
        self.char_end = end;
        self
    }

    /// Set the named-entity tag
    pub fn with_ner(mut self, ner: &str) -> Self {
        self.ner = ner.to_string();
        self
    }
}

/// A word of a sentence together with its annotations
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Token {
    pub id: TokenId,
    pub sentence_id: SentenceId,
    pub word: String,
    pub lemma: String,
    pub char_start: usize,
    pub char_end: usize,
    pub pos: String,
    pub ner: String,
}

impl Token {
    pub fn from_record(sentence_id: SentenceId, record: TokenRecord) -> Self {
        Self {
            id: record.index,
            sentence_id,
            word: record.word,
            lemma: record.lemma,
            char_start: record.char_start,
            char_end: record.char_end,
            pos: record.pos,
            ner: record.ner,
        }
    }

    /// Identity key: `(sentence_id, id)`
    #[inline]
    pub fn key(&self) -> (SentenceId, TokenId) {
        (self.sentence_id, self.id)
    }

    /// True if the character offset falls inside `[char_start, char_end)`
    #[inline]
    pub fn covers(&self, offset: usize) -> bool {
        self.char_start <= offset && offset < self.char_end
    }

    pub fn is_noun(&self) -> bool {
        is_nominal_tag(&self.pos) && !self.is_pronoun()
    }

    pub fn is_pronoun(&self) -> bool {
        self.pos.starts_with("PRP")
    }

    pub fn is_verb(&self) -> bool {
        is_verbal_tag(&self.pos)
    }

    /// Punctuation tags consist only of punctuation characters, plus the
    /// bracket escapes `-LRB-` and `-RRB-`.
    pub fn is_punctuation(&self) -> bool {
        matches!(self.pos.as_str(), "-LRB-" | "-RRB-")
            || (!self.pos.is_empty() && self.pos.chars().all(|c| c.is_ascii_punctuation()))
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// POS tags that confirm a noun phrase: `NN*`, `PRP*`, `CD`
pub fn is_nominal_tag(pos: &str) -> bool {
    pos.starts_with("NN") || pos.starts_with("PRP") || pos == "CD"
}

/// POS tags that confirm a verb phrase: `VB*`, `MD`
pub fn is_verbal_tag(pos: &str) -> bool {
    pos.starts_with("VB") || pos == "MD"
}
