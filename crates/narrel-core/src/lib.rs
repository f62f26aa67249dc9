//! narrel Core - Annotated document model, errors and configuration
//!
//! This crate defines the structures the relation extractor reads:
//! - Annotated tokens, sentences and documents produced by an external
//!   linguistic pipeline (POS tags, dependency trees, named entities)
//! - Spans over a sentence with an explicit root token
//! - Common error types
//! - Configuration management
//! - Document loaders (JSON, CoNLL-U)

pub mod config;
pub mod loader;

pub use config::{AppConfig, ConfigError, ExtractionConfig, LoggingConfig};
pub use loader::{load_document, parse_conllu, parse_json, InputFormat};

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for narrel operations
#[derive(Error, Debug)]
pub enum NarrelError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, NarrelError>;

// ============================================================================
// Tokens
// ============================================================================

/// Position of a token inside a named entity (IOB scheme)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityIob {
    /// Beginning of an entity
    #[serde(rename = "B")]
    Begin,
    /// Inside (continuation of) an entity
    #[serde(rename = "I")]
    Inside,
    /// Explicitly outside any entity
    #[serde(rename = "O")]
    Outside,
    /// No entity annotation was provided
    #[default]
    #[serde(rename = "")]
    Unset,
}

impl EntityIob {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Begin => "B",
            Self::Inside => "I",
            Self::Outside => "O",
            Self::Unset => "",
        }
    }
}

impl fmt::Display for EntityIob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single annotated token
///
/// Tokens are produced by the external pipeline and are never modified
/// by the extractor. The `head` index is sentence-relative; the root of
/// the dependency tree points at itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Sentence-relative index
    pub i: usize,

    /// Raw text
    pub text: String,

    /// Lowercased text
    pub lower: String,

    /// Coarse part-of-speech tag (UPOS)
    pub pos: String,

    /// Fine-grained tag (XPOS), may be empty
    pub tag: String,

    /// Dependency label
    pub dep: String,

    /// Index of the syntactic head within the sentence
    pub head: usize,

    /// Morphological features (e.g. `Tense` -> `Past`)
    pub morph: BTreeMap<String, String>,

    /// Entity IOB tag
    pub ent_iob: EntityIob,

    /// Entity label, if the token is part of an entity
    pub ent_type: Option<String>,
}

impl Token {
    /// Create a token with the mandatory annotations
    pub fn new(
        i: usize,
        text: impl Into<String>,
        pos: impl Into<String>,
        dep: impl Into<String>,
        head: usize,
    ) -> Self {
        let text = text.into();
        Self {
            i,
            lower: text.to_lowercase(),
            text,
            pos: pos.into(),
            tag: String::new(),
            dep: dep.into(),
            head,
            morph: BTreeMap::new(),
            ent_iob: EntityIob::Unset,
            ent_type: None,
        }
    }

    /// Set the fine-grained tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Add a morphological feature
    pub fn with_feature(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.morph.insert(key.into(), value.into());
        self
    }

    /// Set the entity annotation
    pub fn with_entity(mut self, iob: EntityIob, label: Option<&str>) -> Self {
        self.ent_iob = iob;
        self.ent_type = label.map(str::to_string);
        self
    }

    /// Look up a morphological feature
    pub fn feature(&self, key: &str) -> Option<&str> {
        self.morph.get(key).map(String::as_str)
    }

    /// Whether this token is the root of its dependency tree
    pub fn is_root(&self) -> bool {
        self.head == self.i
    }

    /// Morphology in the UD `Key=Value|Key=Value` notation
    pub fn morph_string(&self) -> String {
        self.morph
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("|")
    }
}

// ============================================================================
// Sentences and Documents
// ============================================================================

/// A named entity recognized in a sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// First token index
    pub start: usize,
    /// Exclusive end token index
    pub end: usize,
    /// Entity label (e.g. PER, ORG)
    pub label: String,
}

/// An annotated sentence: tokens plus recognized entities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    index: usize,
    tokens: Vec<Token>,
    ents: Vec<Entity>,
}

impl Sentence {
    /// Build a sentence, checking that the dependency tree and entity
    /// bounds are consistent with the token sequence.
    ///
    /// Token indices are reassigned from position.
    pub fn new(mut tokens: Vec<Token>, ents: Vec<Entity>) -> Result<Self> {
        let len = tokens.len();
        for (i, token) in tokens.iter_mut().enumerate() {
            token.i = i;
            if token.head >= len {
                return Err(NarrelError::InvalidDocument(format!(
                    "token {} ({:?}) has head {} outside sentence of length {}",
                    i, token.text, token.head, len
                )));
            }
        }
        for ent in &ents {
            if ent.start >= ent.end || ent.end > len {
                return Err(NarrelError::InvalidDocument(format!(
                    "entity {} has invalid bounds {}..{} in sentence of length {}",
                    ent.label, ent.start, ent.end, len
                )));
            }
        }

        Ok(Self {
            index: 0,
            tokens,
            ents,
        })
    }

    /// Position of this sentence within its document
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, i: usize) -> Option<&Token> {
        self.tokens.get(i)
    }

    /// Recognized entities
    pub fn ents(&self) -> &[Entity] {
        &self.ents
    }

    /// Token at a relative offset from `i`, or `None` past either boundary
    pub fn nbor(&self, i: usize, offset: isize) -> Option<&Token> {
        let target = i.checked_add_signed(offset)?;
        self.tokens.get(target)
    }

    /// Dependency children of token `i`, in index order
    pub fn children(&self, i: usize) -> impl Iterator<Item = &Token> + '_ {
        self.tokens
            .iter()
            .filter(move |t| t.head == i && t.i != i)
    }

    /// Entity with exactly the given bounds
    pub fn entity(&self, start: usize, end: usize) -> Option<&Entity> {
        self.ents.iter().find(|e| e.start == start && e.end == end)
    }

    /// Number of head links between token `i` and the tree root.
    ///
    /// Bounded by the sentence length so a cyclic tree cannot loop forever.
    pub fn depth(&self, i: usize) -> usize {
        let mut depth = 0;
        let mut current = i;
        while let Some(token) = self.tokens.get(current) {
            if token.is_root() || depth >= self.tokens.len() {
                break;
            }
            current = token.head;
            depth += 1;
        }
        depth
    }

    /// Plain text of the sentence (tokens joined by spaces)
    pub fn text(&self) -> String {
        join_tokens(&self.tokens)
    }
}

impl Index<usize> for Sentence {
    type Output = Token;

    fn index(&self, i: usize) -> &Token {
        &self.tokens[i]
    }
}

/// A document: sentences plus the language code used for tense detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lang: String,
    sentences: Vec<Sentence>,
}

impl Document {
    pub fn new(lang: impl Into<String>, mut sentences: Vec<Sentence>) -> Self {
        for (index, sentence) in sentences.iter_mut().enumerate() {
            sentence.index = index;
        }
        Self {
            lang: lang.into(),
            sentences,
        }
    }

    /// Language code (e.g. "en", "ru")
    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// Total number of tokens across all sentences
    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(Sentence::len).sum()
    }
}

// ============================================================================
// Spans
// ============================================================================

/// A contiguous run of tokens inside one sentence with a designated root.
///
/// Spans borrow the sentence; they never copy token data. The root is the
/// token of the span that sits highest in the dependency tree (leftmost on
/// ties). Invariant: `start <= root < end <= sentence.len()`.
#[derive(Debug, Clone, Copy)]
pub struct Span<'s> {
    sentence: &'s Sentence,
    start: usize,
    end: usize,
    root: usize,
}

impl<'s> Span<'s> {
    /// Create a span over `start..end`; `None` if empty or out of bounds
    pub fn new(sentence: &'s Sentence, start: usize, end: usize) -> Option<Self> {
        if start >= end || end > sentence.len() {
            return None;
        }
        let root = (start..end)
            .min_by_key(|&i| sentence.depth(i))
            .unwrap_or(start);

        Some(Self {
            sentence,
            start,
            end,
            root,
        })
    }

    /// Single-token span
    pub fn token(sentence: &'s Sentence, i: usize) -> Option<Self> {
        Self::new(sentence, i, i + 1)
    }

    pub fn sentence(&self) -> &'s Sentence {
        self.sentence
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// Exclusive end
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false; spans are non-empty by construction
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Root token of the span
    pub fn root(&self) -> &'s Token {
        &self.sentence[self.root]
    }

    pub fn root_index(&self) -> usize {
        self.root
    }

    pub fn tokens(&self) -> &'s [Token] {
        &self.sentence.tokens()[self.start..self.end]
    }

    pub fn contains(&self, i: usize) -> bool {
        (self.start..self.end).contains(&i)
    }

    pub fn text(&self) -> String {
        join_tokens(self.tokens())
    }
}

impl PartialEq for Span<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.sentence, other.sentence)
            && self.start == other.start
            && self.end == other.end
    }
}

impl Eq for Span<'_> {}

impl fmt::Display for Span<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

fn join_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Tests
// ============================================================================
