//! Documents: ordered sentences plus coreference clusters
//!
//! Sentence ids are 1-based positions. Cross-sentence queries work on a
//! global token position, `start[s] + t`, where `start[s]` is the number of
//! tokens in the sentences before `s`.

use std::ops::Range;

use tracing::debug;

use crate::coref::{CorefCluster, Mention, MentionRecord};
use crate::error::{Error, Result};
use crate::sentence::{Sentence, SentenceAnnotation};
use crate::token::{SentenceId, Token, TokenId};

/// A contiguous, non-empty token span inside one sentence
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Phrase {
    pub sentence_id: SentenceId,
    pub tokens: Range<TokenId>,
}

impl Phrase {
    pub fn new(sentence_id: SentenceId, tokens: Range<TokenId>) -> Self {
        Self {
            sentence_id,
            tokens,
        }
    }

    /// One-token phrase
    pub fn of(token: &Token) -> Self {
        Self::new(token.sentence_id, token.id..token.id + 1)
    }

    fn first(&self) -> TokenId {
        self.tokens.start
    }

    fn last(&self) -> TokenId {
        self.tokens.end - 1
    }
}

impl From<&Mention> for Phrase {
    fn from(mention: &Mention) -> Self {
        Self::new(mention.sentence_id, mention.tokens.clone())
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    sentences: Vec<Sentence>,
    /// Global position of the token before each sentence's first token
    starts: Vec<usize>,
    clusters: Vec<CorefCluster>,
}

impl Document {
    fn new(sentences: Vec<Sentence>, clusters: Vec<CorefCluster>) -> Self {
        let starts = sentences
            .iter()
            .scan(0, |total, sentence| {
                let start = *total;
                *total += sentence.len();
                Some(start)
            })
            .collect();
        Self {
            sentences,
            starts,
            clusters,
        }
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// All tokens in document order
    pub fn tokens(&self) -> impl Iterator<Item = &Token> + '_ {
        self.sentences.iter().flat_map(|s| s.tokens().iter())
    }

    pub fn sentence(&self, id: SentenceId) -> Result<&Sentence> {
        id.checked_sub(1)
            .and_then(|i| self.sentences.get(i))
            .ok_or(Error::SentenceOutOfRange {
                id,
                count: self.sentences.len(),
            })
    }

    pub fn token(&self, sentence: SentenceId, id: TokenId) -> Result<&Token> {
        self.sentence(sentence)?.token(id)
    }

    /// First token whose character span holds `offset`
    pub fn token_at_offset(&self, offset: usize) -> Option<&Token> {
        self.sentences
            .iter()
            .filter(|s| s.char_span().is_some_and(|span| span.contains(&offset)))
            .find_map(|s| s.tokens().iter().find(|t| t.covers(offset)))
    }

    /// First token whose character span holds all of `start..end`
    pub fn token_that_covers(&self, start: usize, end: usize) -> Option<&Token> {
        self.tokens()
            .find(|t| t.char_start <= start && end <= t.char_end)
    }

    /// Tokens within `radius` of `token` in its sentence, including it
    pub fn window(&self, token: &Token, radius: usize) -> Result<&[Token]> {
        self.sentence(token.sentence_id)?.window(token.id, radius)
    }

    /// Neighbours within `radius` on each side of `token`, excluding it
    pub fn context(&self, token: &Token, radius: usize) -> Result<(&[Token], &[Token])> {
        self.sentence(token.sentence_id)?.context(token.id, radius)
    }

    pub fn share_sentence(&self, a: &Token, b: &Token) -> bool {
        a.sentence_id == b.sentence_id
    }

    /// True if one token directly governs the other
    pub fn has_dep_relationship(&self, a: &Token, b: &Token) -> bool {
        self.share_sentence(a, b)
            && self
                .sentence(a.sentence_id)
                .is_ok_and(|s| s.dependencies().has_edge(a.id, b.id))
    }

    pub fn common_ancestor(&self, a: &Token, b: &Token) -> Option<&Token> {
        if !self.share_sentence(a, b) {
            return None;
        }
        self.sentence(a.sentence_id).ok()?.common_ancestor(a.id, b.id)
    }

    pub fn syntactic_distance(&self, a: &Token, b: &Token) -> Option<usize> {
        if !self.share_sentence(a, b) {
            return None;
        }
        self.sentence(a.sentence_id)
            .ok()?
            .syntactic_distance(a.id, b.id)
    }

    fn check_phrase(&self, phrase: &Phrase) -> Result<usize> {
        let sentence = self.sentence(phrase.sentence_id)?;
        if phrase.tokens.is_empty() {
            return Err(Error::EmptySpan {
                sentence: phrase.sentence_id,
            });
        }
        sentence.token(phrase.first())?;
        sentence.token(phrase.last())?;
        Ok(self.starts[phrase.sentence_id - 1])
    }

    /// Tokens between two phrases: 0 when they overlap, otherwise the gap
    /// from the end of the earlier phrase to the start of the later one,
    /// counted across sentence boundaries. Adjacent tokens give 1 whether
    /// or not a sentence boundary lies between them.
    pub fn lexical_distance(&self, a: &Phrase, b: &Phrase) -> Result<usize> {
        let a_start = self.check_phrase(a)?;
        let b_start = self.check_phrase(b)?;

        let (first, first_start, second, second_start) =
            if (a.sentence_id, a.first()) <= (b.sentence_id, b.first()) {
                (a, a_start, b, b_start)
            } else {
                (b, b_start, a, a_start)
            };

        let end = first_start + first.last();
        let begin = second_start + second.first();
        Ok(begin.saturating_sub(end))
    }

    pub fn phrase_text(&self, phrase: &Phrase) -> Result<String> {
        self.check_phrase(phrase)?;
        Ok(self
            .sentence(phrase.sentence_id)?
            .phrase_text(phrase.tokens.clone()))
    }

    pub fn clusters(&self) -> &[CorefCluster] {
        &self.clusters
    }

    /// First cluster with a mention that holds the token
    pub fn cluster_of(&self, token: &Token) -> Option<&CorefCluster> {
        self.clusters
            .iter()
            .find(|c| c.mention_containing(token.sentence_id, token.id).is_some())
    }

    /// Canonical mention of the entity the token refers to
    pub fn canonical_mention(&self, token: &Token) -> Option<&Mention> {
        self.cluster_of(token).map(CorefCluster::canonical)
    }

    /// Mentions in one sentence, in cluster order
    pub fn mentions_in(&self, sentence: SentenceId) -> Vec<&Mention> {
        self.clusters
            .iter()
            .flat_map(|c| c.mentions())
            .filter(|m| m.sentence_id == sentence)
            .collect()
    }

    pub fn mention_text(&self, mention: &Mention) -> Result<String> {
        self.phrase_text(&Phrase::from(mention))
    }
}

/// Collects raw annotations and validates them into a [`Document`]
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    sentences: Vec<SentenceAnnotation>,
    clusters: Vec<Vec<MentionRecord>>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next sentence; its id is its 1-based position
    pub fn sentence(mut self, annotation: SentenceAnnotation) -> Self {
        self.sentences.push(annotation);
        self
    }

    /// Add a coreference cluster; cluster ids are 1-based positions
    pub fn cluster(mut self, mentions: Vec<MentionRecord>) -> Self {
        self.clusters.push(mentions);
        self
    }

    /// Build every sentence and cluster, stopping at the first failure
    pub fn build(self) -> Result<Document> {
        let sentences = self
            .sentences
            .into_iter()
            .enumerate()
            .map(|(i, annotation)| {
                Sentence::new(i + 1, annotation).map_err(|e| e.in_sentence(i + 1))
            })
            .collect::<Result<Vec<_>>>()?;

        let sizes: Vec<usize> = sentences.iter().map(Sentence::len).collect();
        let clusters = self
            .clusters
            .iter()
            .enumerate()
            .map(|(i, records)| {
                let mentions = records
                    .iter()
                    .map(|r| Mention::from_record(r, &sizes))
                    .collect::<Result<Vec<_>>>()?;
                CorefCluster::new(i + 1, mentions)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            sentences = sentences.len(),
            tokens = sizes.iter().sum::<usize>(),
            clusters = clusters.len(),
            "built document"
        );

        Ok(Document::new(sentences, clusters))
    }
}
