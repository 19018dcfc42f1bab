//! Approximate matching of a query against document titles and contents.
//!
//! Scores are normalized distances in `[0, 1]`: `0.0` is a perfect match
//! and a document is kept when its score does not exceed the threshold.
//! A field scores `0.0` when it contains the query verbatim (after
//! lowercasing and whitespace collapse). Otherwise the field score is the
//! better of two measures:
//!
//! - the edit distance between the query and the closest substring of the
//!   field, divided by the query length (insertions, deletions,
//!   substitutions and adjacent transpositions all cost one);
//! - one minus the Jaro-Winkler similarity between the query and the
//!   closest run of field tokens with as many tokens as the query.
//!
//! A document's score is the best of its field scores.

use rayon::prelude::*;
use serde::Serialize;
use tantivy::tokenizer::{
    LowerCaser, SimpleTokenizer, TextAnalyzer, TokenStream,
};

use crate::{
    document::Document,
    error::{Error, Result},
    text_util::normalize,
};

/// Maximum normalized distance a match may have.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    pub const DEFAULT: f64 = 0.3;

    pub fn new(value: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::Validation(format!(
                "threshold must be between 0 and 1, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// The document field that produced a hit's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    Title,
    Content,
}

impl std::fmt::Display for MatchField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            MatchField::Title => "title",
            MatchField::Content => "content",
        })
    }
}

/// One search result. `score` and `field` are `None` for the unranked
/// listing returned for an empty query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub document: Document,
    pub score: Option<f64>,
    pub field: Option<MatchField>,
}

/// Immutable search structure over a snapshot of documents.
///
/// Cheap enough to rebuild after every mutation.
#[derive(Debug, Default)]
pub struct FuzzyIndex {
    entries: Vec<Entry>,
}

#[derive(Debug)]
struct Entry {
    document: Document,
    title: PreparedText,
    content: PreparedText,
}

#[derive(Debug)]
struct PreparedText {
    normalized: String,
    chars: Vec<char>,
    tokens: Vec<Vec<char>>,
}

impl PreparedText {
    fn new(analyzer: &mut TextAnalyzer, text: &str) -> Self {
        let normalized = normalize(text);
        Self {
            chars: normalized.chars().collect(),
            tokens: tokenize(analyzer, text),
            normalized,
        }
    }

    /// Distance of `query` to this text, in `[0, 1]`.
    fn score(&self, query: &PreparedText) -> f64 {
        if self.normalized.contains(&query.normalized) {
            return 0.0;
        }

        let edits = substring_distance(&query.chars, &self.chars);
        let by_edits = (edits as f64 / query.chars.len() as f64).min(1.0);
        if query.tokens.is_empty() {
            return by_edits;
        }

        let by_tokens =
            1.0 - best_window_similarity(&self.tokens, &query.tokens);
        by_edits.min(by_tokens)
    }
}

fn analyzer() -> TextAnalyzer {
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .build()
}

fn tokenize(analyzer: &mut TextAnalyzer, text: &str) -> Vec<Vec<char>> {
    let mut stream = analyzer.token_stream(text);
    let mut tokens = Vec::new();
    while stream.advance() {
        tokens.push(stream.token().text.chars().collect());
    }
    tokens
}

impl FuzzyIndex {
    /// Build an index over `documents`, keeping their order for
    /// tie-breaking.
    pub fn build(documents: Vec<Document>) -> Self {
        let mut analyzer = analyzer();
        let entries = documents
            .into_iter()
            .map(|document| Entry {
                title: PreparedText::new(&mut analyzer, &document.title),
                content: PreparedText::new(&mut analyzer, &document.content),
                document,
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank documents against `query`, best first.
    ///
    /// An empty or whitespace-only query returns every document unranked,
    /// in index order, regardless of `threshold`.
    pub fn search(&self, query: &str, threshold: Threshold) -> Vec<SearchHit> {
        let query = PreparedText::new(&mut analyzer(), query);
        if query.chars.is_empty() {
            return self
                .entries
                .iter()
                .map(|e| SearchHit {
                    document: e.document.clone(),
                    score: None,
                    field: None,
                })
                .collect();
        }

        let mut scored: Vec<(f64, MatchField, &Entry)> = self
            .entries
            .par_iter()
            .filter_map(|entry| {
                let title = entry.title.score(&query);
                let content = entry.content.score(&query);
                let (score, field) = if title <= content {
                    (title, MatchField::Title)
                } else {
                    (content, MatchField::Content)
                };
                (score <= threshold.get()).then_some((score, field, entry))
            })
            .collect();

        // Stable: equal scores keep index order.
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        scored
            .into_iter()
            .map(|(score, field, entry)| SearchHit {
                document: entry.document.clone(),
                score: Some(score),
                field: Some(field),
            })
            .collect()
    }
}

/// Smallest edit distance between `pattern` and any substring of `text`.
///
/// Sellers' semi-global variant of the optimal string alignment
/// distance: the match may start and end anywhere in `text`.
fn substring_distance(pattern: &[char], text: &[char]) -> usize {
    let m = pattern.len();
    if m == 0 {
        return 0;
    }

    // Columns over `text`, rows over `pattern`.
    let mut before_prev: Vec<usize> = (0..=m).collect();
    let mut prev: Vec<usize> = (0..=m).collect();
    let mut cur = vec![0; m + 1];
    let mut best = m;

    for j in 1..=text.len() {
        cur[0] = 0;
        for i in 1..=m {
            let cost = usize::from(pattern[i - 1] != text[j - 1]);
            let mut value = (prev[i - 1] + cost)
                .min(prev[i] + 1)
                .min(cur[i - 1] + 1);
            if i > 1
                && j > 1
                && pattern[i - 1] == text[j - 2]
                && pattern[i - 2] == text[j - 1]
            {
                value = value.min(before_prev[i - 2] + 1);
            }
            cur[i] = value;
        }
        best = best.min(cur[m]);
        if best == 0 {
            break;
        }
        std::mem::swap(&mut before_prev, &mut prev);
        std::mem::swap(&mut prev, &mut cur);
    }

    best
}

/// Best Jaro-Winkler similarity between the query tokens and any run of
/// the same number of consecutive field tokens.
fn best_window_similarity(
    tokens: &[Vec<char>],
    query_tokens: &[Vec<char>],
) -> f64 {
    let query = join_tokens(query_tokens);
    let k = query_tokens.len().min(tokens.len());
    if k == 0 {
        return 0.0;
    }

    let mut best: f64 = 0.0;
    for window in tokens.windows(k) {
        let candidate = join_tokens(window);
        if !comparable_lengths(candidate.len(), query.len()) {
            continue;
        }
        best = best.max(jaro_winkler(&candidate, &query));
        if best >= 1.0 {
            break;
        }
    }
    best
}

fn join_tokens(tokens: &[Vec<char>]) -> Vec<char> {
    let mut joined = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            joined.push(' ');
        }
        joined.extend_from_slice(token);
    }
    joined
}

/// Jaro-Winkler rewards short strings that share a few characters, so
/// candidates of very different length are not compared at all.
fn comparable_lengths(a: usize, b: usize) -> bool {
    a * 2 >= b && b * 2 >= a
}

fn jaro_winkler(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return if a.len() == b.len() { 1.0 } else { 0.0 };
    }

    let window = (a.len().max(b.len()) / 2).saturating_sub(1);
    let mut a_matched = vec![false; a.len()];
    let mut b_matched = vec![false; b.len()];
    let mut matches = 0usize;

    for (i, ca) in a.iter().enumerate() {
        let lo = i.saturating_sub(window);
        let hi = (i + window + 1).min(b.len());
        for j in lo..hi {
            if !b_matched[j] && b[j] == *ca {
                a_matched[i] = true;
                b_matched[j] = true;
                matches += 1;
                break;
            }
        }
    }

    if matches == 0 {
        return 0.0;
    }

    let a_seq = a.iter().zip(&a_matched).filter(|(_, m)| **m);
    let b_seq = b.iter().zip(&b_matched).filter(|(_, m)| **m);
    let half_transpositions =
        a_seq.zip(b_seq).filter(|((x, _), (y, _))| x != y).count();

    let m = matches as f64;
    let t = half_transpositions as f64 / 2.0;
    let jaro = (m / a.len() as f64 + m / b.len() as f64 + (m - t) / m) / 3.0;

    let prefix = a
        .iter()
        .zip(b)
        .take(4)
        .take_while(|(x, y)| x == y)
        .count();
    jaro + prefix as f64 * 0.1 * (1.0 - jaro)
}
