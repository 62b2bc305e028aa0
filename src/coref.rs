//! Coreference mentions and clusters

use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::token::{SentenceId, TokenId};

/// A mention as delivered by the loader. Sentence and token indices are
/// 1-based; `span_end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MentionRecord {
    pub sentence_index: SentenceId,
    pub span_start: TokenId,
    pub span_end: TokenId,
    pub head_index: TokenId,
    pub is_representative: bool,
}

impl MentionRecord {
    pub fn new(sentence_index: SentenceId, span: Range<TokenId>, head_index: TokenId) -> Self {
        Self {
            sentence_index,
            span_start: span.start,
            span_end: span.end,
            head_index,
            is_representative: false,
        }
    }

    pub fn representative(mut self) -> Self {
        self.is_representative = true;
        self
    }
}

/// A validated mention: a non-empty token span inside one sentence
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mention {
    pub sentence_id: SentenceId,
    pub tokens: Range<TokenId>,
    pub head: TokenId,
    pub representative: bool,
}

impl Mention {
    /// Validate a record against the token counts of the document's
    /// sentences (`sizes[i]` is the length of sentence `i + 1`)
    pub(crate) fn from_record(record: &MentionRecord, sizes: &[usize]) -> Result<Self> {
        let sentence = record.sentence_index;
        let size = sentence
            .checked_sub(1)
            .and_then(|i| sizes.get(i))
            .copied()
            .ok_or(Error::SentenceOutOfRange {
                id: sentence,
                count: sizes.len(),
            })?;

        let tokens = record.span_start..record.span_end;
        if tokens.is_empty() {
            return Err(Error::EmptySpan { sentence });
        }
        if tokens.start == 0 || tokens.end > size + 1 {
            return Err(Error::invalid_mention(format!(
                "span {}..{} outside sentence {} of {} tokens",
                tokens.start, tokens.end, sentence, size
            )));
        }
        if !tokens.contains(&record.head_index) {
            return Err(Error::invalid_mention(format!(
                "head {} outside span {}..{}",
                record.head_index, tokens.start, tokens.end
            )));
        }

        Ok(Self {
            sentence_id: sentence,
            tokens,
            head: record.head_index,
            representative: record.is_representative,
        })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains(&self, sentence: SentenceId, token: TokenId) -> bool {
        self.sentence_id == sentence && self.tokens.contains(&token)
    }
}

/// Mentions referring to the same entity, one of them canonical
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorefCluster {
    id: usize,
    mentions: Vec<Mention>,
    canonical: usize,
}

impl CorefCluster {
    /// The first mention flagged representative is canonical; without any
    /// flag the first mention is.
    pub fn new(id: usize, mentions: Vec<Mention>) -> Result<Self> {
        if mentions.is_empty() {
            return Err(Error::invalid_mention(format!("cluster {} has no mentions", id)));
        }
        let canonical = mentions.iter().position(|m| m.representative).unwrap_or(0);
        Ok(Self {
            id,
            mentions,
            canonical,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn mentions(&self) -> &[Mention] {
        &self.mentions
    }

    pub fn canonical(&self) -> &Mention {
        &self.mentions[self.canonical]
    }

    /// First mention whose span holds the token
    pub fn mention_containing(&self, sentence: SentenceId, token: TokenId) -> Option<&Mention> {
        self.mentions.iter().find(|m| m.contains(sentence, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZES: &[usize] = &[5, 5];

    fn mention(sentence: SentenceId, span: Range<TokenId>, head: TokenId) -> Mention {
        Mention::from_record(&MentionRecord::new(sentence, span, head), SIZES).unwrap()
    }

    #[test]
    fn test_from_record() {
        let m = mention(1, 3..5, 4);
        assert_eq!(m.sentence_id, 1);
        assert_eq!(m.tokens, 3..5);
        assert_eq!(m.len(), 2);
        assert!(m.contains(1, 3));
        assert!(!m.contains(1, 5));
        assert!(!m.contains(2, 3));

        // A span may end one past the last token
        assert_eq!(mention(2, 5..6, 5).tokens, 5..6);
    }

    #[test]
    fn test_invalid_records() {
        let check = |record: MentionRecord| Mention::from_record(&record, SIZES).unwrap_err();

        assert!(matches!(
            check(MentionRecord::new(3, 1..2, 1)),
            Error::SentenceOutOfRange { id: 3, count: 2 }
        ));
        assert!(matches!(
            check(MentionRecord::new(0, 1..2, 1)),
            Error::SentenceOutOfRange { id: 0, .. }
        ));
        assert!(matches!(
            check(MentionRecord::new(1, 2..2, 2)),
            Error::EmptySpan { sentence: 1 }
        ));
        assert!(matches!(
            check(MentionRecord::new(1, 4..7, 4)),
            Error::InvalidMention(_)
        ));
        assert!(matches!(
            check(MentionRecord::new(1, 1..3, 3)),
            Error::InvalidMention(_)
        ));
    }

    #[test]
    fn test_canonical_defaults_to_first() {
        let cluster = CorefCluster::new(1, vec![mention(1, 1..2, 1), mention(2, 3..4, 3)]).unwrap();
        assert_eq!(cluster.canonical().sentence_id, 1);
    }

    #[test]
    fn test_canonical_first_flagged() {
        let record = MentionRecord::new(2, 3..4, 3).representative();
        let flagged = Mention::from_record(&record, SIZES).unwrap();
        let record = MentionRecord::new(2, 1..2, 1).representative();
        let also_flagged = Mention::from_record(&record, SIZES).unwrap();

        let cluster =
            CorefCluster::new(7, vec![mention(1, 1..2, 1), flagged, also_flagged]).unwrap();
        assert_eq!(cluster.id(), 7);
        assert_eq!(cluster.canonical().tokens, 3..4);
        assert_eq!(cluster.mentions().len(), 3);
    }

    #[test]
    fn test_mention_containing() {
        let cluster = CorefCluster::new(1, vec![mention(1, 1..2, 1), mention(2, 3..4, 3)]).unwrap();
        assert_eq!(cluster.mention_containing(2, 3).map(|m| m.head), Some(3));
        assert!(cluster.mention_containing(2, 1).is_none());
    }

    #[test]
    fn test_empty_cluster_rejected() {
        assert!(matches!(
            CorefCluster::new(1, Vec::new()),
            Err(Error::InvalidMention(_))
        ));
    }
}
