//! Tense and mood detection
//!
//! Detectors are keyed by language code in a [`TenseRegistry`]. Every
//! detector looks at the first token of a compound verb: a closed list of
//! future auxiliaries first, then the morphological `Tense` feature.
//! Unknown languages get `(Present, Normal)`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use narrel_core::{NarrelError, Span, Token};

// ============================================================================
// Taxonomy
// ============================================================================

/// Grammatical tense of a verb phrase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tense {
    #[default]
    Present,
    Past,
    Future,
}

impl Tense {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "PRESENT",
            Self::Past => "PAST",
            Self::Future => "FUTURE",
        }
    }
}

impl fmt::Display for Tense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tense {
    type Err = NarrelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PRESENT" => Ok(Self::Present),
            "PAST" => Ok(Self::Past),
            "FUTURE" => Ok(Self::Future),
            _ => Err(NarrelError::InvalidDocument(format!("unknown tense {s:?}"))),
        }
    }
}

/// Grammatical mood of a verb phrase.
///
/// `Modal` is part of the taxonomy but no built-in detector produces it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    #[default]
    Normal,
    Modal,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Modal => "MODAL",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Detectors
// ============================================================================

/// Trait for language-specific tense detectors
pub trait TenseDetector: Send + Sync {
    /// Tense and mood of a compound verb given as its tokens (may be empty)
    fn detect(&self, verb: &[Token]) -> (Tense, Mode);
}

/// Fallback detector used for languages without rules
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTenseDetector;

impl TenseDetector for DefaultTenseDetector {
    fn detect(&self, _verb: &[Token]) -> (Tense, Mode) {
        (Tense::Present, Mode::Normal)
    }
}

/// Future-marker words plus morphology, with optional past-tense tags
#[derive(Debug, Clone)]
pub struct LexicalTenseDetector {
    future_words: &'static [&'static str],
    past_tags: &'static [&'static str],
}

const EN_FUTURE_WORDS: &[&str] = &["will", "shall", "'ll", "wo"];
const EN_PAST_TAGS: &[&str] = &["VBD", "VBN"];
const RU_FUTURE_WORDS: &[&str] = &["буду", "будешь", "будет", "будем", "будете", "будут"];

impl LexicalTenseDetector {
    pub fn new(future_words: &'static [&'static str], past_tags: &'static [&'static str]) -> Self {
        Self {
            future_words,
            past_tags,
        }
    }

    pub fn english() -> Self {
        Self::new(EN_FUTURE_WORDS, EN_PAST_TAGS)
    }

    pub fn russian() -> Self {
        Self::new(RU_FUTURE_WORDS, &[])
    }
}

impl TenseDetector for LexicalTenseDetector {
    fn detect(&self, verb: &[Token]) -> (Tense, Mode) {
        let mode = Mode::Normal;
        let Some(first) = verb.first() else {
            return (Tense::Present, mode);
        };

        if self.future_words.contains(&first.lower.as_str()) {
            return (Tense::Future, mode);
        }

        let tense = match first.feature("Tense") {
            Some("Pres") => Tense::Present,
            Some("Fut") => Tense::Future,
            Some("Past") => Tense::Past,
            _ if self.past_tags.contains(&first.tag.as_str()) => Tense::Past,
            _ => Tense::Present,
        };

        (tense, mode)
    }
}

// ============================================================================
// Registry
// ============================================================================

static DEFAULT_DETECTOR: DefaultTenseDetector = DefaultTenseDetector;

/// Language code -> detector table with a default entry for unknown codes
pub struct TenseRegistry {
    detectors: HashMap<String, Box<dyn TenseDetector>>,
}

impl TenseRegistry {
    /// Registry with no language rules; every lookup hits the default
    pub fn empty() -> Self {
        Self {
            detectors: HashMap::new(),
        }
    }

    /// Registry with the built-in English and Russian detectors
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("en", LexicalTenseDetector::english());
        registry.register("ru", LexicalTenseDetector::russian());
        registry
    }

    /// Register (or replace) the detector for a language
    pub fn register(&mut self, lang: &str, detector: impl TenseDetector + 'static) {
        self.detectors
            .insert(lang.to_lowercase(), Box::new(detector));
    }

    /// Whether a language has its own rules
    pub fn supports(&self, lang: &str) -> bool {
        self.lookup(lang).is_some()
    }

    /// Detector for a language, falling back to the default
    pub fn get(&self, lang: &str) -> &dyn TenseDetector {
        match self.lookup(lang) {
            Some(detector) => detector,
            None => {
                tracing::debug!("No tense detector for language {:?}, using default", lang);
                &DEFAULT_DETECTOR
            }
        }
    }

    /// Tense and mood of a compound verb span
    pub fn detect(&self, lang: &str, verb: &Span<'_>) -> (Tense, Mode) {
        self.get(lang).detect(verb.tokens())
    }

    /// Exact code first, then the primary subtag ("en-US" -> "en")
    fn lookup(&self, lang: &str) -> Option<&dyn TenseDetector> {
        let lang = lang.to_lowercase();
        let primary = lang.split(['-', '_']).next().unwrap_or_default();
        self.detectors
            .get(&lang)
            .or_else(|| self.detectors.get(primary))
            .map(|d| d.as_ref())
    }
}

impl Default for TenseRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TenseRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut langs: Vec<&String> = self.detectors.keys().collect();
        langs.sort();
        f.debug_struct("TenseRegistry")
            .field("languages", &langs)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
