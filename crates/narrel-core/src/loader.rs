//! Document loaders
//!
//! Builds [`Document`]s from the output of an external annotation
//! pipeline. Two formats are supported:
//! - JSON: `{ "lang": "en", "sentences": [{ "tokens": [...], "ents": [...] }] }`
//! - CoNLL-U, with entity tags in the MISC column (`NER=B-PER`)
//!
//! Both loaders reject structurally inconsistent input, so the extractor
//! can trust every head index it sees.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use regex::Regex;
use serde::Deserialize;

use crate::{Document, Entity, EntityIob, NarrelError, Result, Sentence, Token};

// ============================================================================
// Input formats
// ============================================================================

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Conllu,
}

impl InputFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "conllu" | "conll" => Some(Self::Conllu),
            _ => None,
        }
    }
}

impl FromStr for InputFormat {
    type Err = NarrelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "conllu" | "conll" => Ok(Self::Conllu),
            _ => Err(NarrelError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Load a document from disk.
///
/// When `format` is `None` it is inferred from the file extension.
/// `default_lang` is used when the file does not declare a language.
pub fn load_document(
    path: impl AsRef<Path>,
    format: Option<InputFormat>,
    default_lang: &str,
) -> Result<Document> {
    let path = path.as_ref();
    let format = match format {
        Some(format) => format,
        None => InputFormat::from_path(path)
            .ok_or_else(|| NarrelError::UnsupportedFormat(path.display().to_string()))?,
    };

    let content = std::fs::read_to_string(path).map_err(|e| NarrelError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let doc = match format {
        InputFormat::Json => parse_json(&content, default_lang)?,
        InputFormat::Conllu => parse_conllu(&content, default_lang)?,
    };

    tracing::debug!(
        "Loaded {} sentences ({} tokens) from {}",
        doc.sentences().len(),
        doc.token_count(),
        path.display()
    );

    Ok(doc)
}

// ============================================================================
// JSON
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    lang: Option<String>,
    sentences: Vec<RawSentence>,
}

#[derive(Debug, Deserialize)]
struct RawSentence {
    tokens: Vec<RawToken>,
    #[serde(default)]
    ents: Vec<Entity>,
}

#[derive(Debug, Deserialize)]
struct RawToken {
    text: String,
    pos: String,
    #[serde(default)]
    tag: String,
    dep: String,
    head: usize,
    #[serde(default)]
    morph: RawMorph,
    #[serde(default)]
    ent_iob: EntityIob,
    #[serde(default)]
    ent_type: Option<String>,
}

/// Morphology given either as a map or in UD `Key=Value|...` notation
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawMorph {
    Map(BTreeMap<String, String>),
    Ud(String),
}

impl Default for RawMorph {
    fn default() -> Self {
        Self::Map(BTreeMap::new())
    }
}

impl RawMorph {
    fn into_map(self) -> BTreeMap<String, String> {
        match self {
            Self::Map(map) => map,
            Self::Ud(s) => parse_feats(&s),
        }
    }
}

/// Parse a JSON document
pub fn parse_json(content: &str, default_lang: &str) -> Result<Document> {
    let raw: RawDocument = serde_json::from_str(content)?;

    let sentences = raw
        .sentences
        .into_iter()
        .map(|s| {
            let tokens = s
                .tokens
                .into_iter()
                .enumerate()
                .map(|(i, t)| {
                    let mut token = Token::new(i, t.text, t.pos, t.dep, t.head).with_tag(t.tag);
                    token.morph = t.morph.into_map();
                    token.ent_iob = t.ent_iob;
                    token.ent_type = t.ent_type;
                    token
                })
                .collect();
            Sentence::new(tokens, s.ents)
        })
        .collect::<Result<Vec<_>>>()?;

    let lang = raw.lang.unwrap_or_else(|| default_lang.to_string());
    Ok(Document::new(lang, sentences))
}

// ============================================================================
// CoNLL-U
// ============================================================================

/// Parse CoNLL-U content into a document.
///
/// Multiword-token ranges (`1-2`) and empty nodes (`1.1`) are skipped.
/// A `# lang = xx` comment overrides `default_lang`.
pub fn parse_conllu(content: &str, default_lang: &str) -> Result<Document> {
    let comment_re = Regex::new(r"^#\s*([\w.:-]+)\s*=\s*(.*)$").map_err(anyhow::Error::from)?;
    let ner_re = Regex::new(r"^([BIO])(?:-(.+))?$").map_err(anyhow::Error::from)?;

    let mut lang: Option<String> = None;
    let mut sentences = Vec::new();
    let mut tokens: Vec<Token> = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line.trim_end();

        if line.is_empty() {
            if !tokens.is_empty() {
                sentences.push(finish_sentence(std::mem::take(&mut tokens))?);
            }
            continue;
        }

        if line.starts_with('#') {
            if let Some(caps) = comment_re.captures(line) {
                if &caps[1] == "lang" && lang.is_none() {
                    lang = Some(caps[2].trim().to_string());
                }
            }
            continue;
        }

        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() != 10 {
            return Err(NarrelError::Parse {
                line: line_no,
                message: format!("expected 10 columns, found {}", cols.len()),
            });
        }
        if cols[0].contains('-') || cols[0].contains('.') {
            continue;
        }

        let id: usize = cols[0].parse().map_err(|_| NarrelError::Parse {
            line: line_no,
            message: format!("invalid token id {:?}", cols[0]),
        })?;
        if id != tokens.len() + 1 {
            return Err(NarrelError::Parse {
                line: line_no,
                message: format!("expected token id {}, found {}", tokens.len() + 1, id),
            });
        }
        let i = id - 1;

        let head: usize = cols[6].parse().map_err(|_| NarrelError::Parse {
            line: line_no,
            message: format!("invalid head {:?}", cols[6]),
        })?;
        let head = if head == 0 { i } else { head - 1 };

        let dep = if cols[7] == "root" { "ROOT" } else { cols[7] };
        let tag = if cols[4] == "_" { "" } else { cols[4] };

        let mut token = Token::new(i, cols[1], cols[3], dep, head).with_tag(tag);
        token.morph = parse_feats(cols[5]);

        for item in cols[9].split('|') {
            if let Some(value) = item.strip_prefix("NER=") {
                if let Some(caps) = ner_re.captures(value) {
                    token.ent_iob = match &caps[1] {
                        "B" => EntityIob::Begin,
                        "I" => EntityIob::Inside,
                        _ => EntityIob::Outside,
                    };
                    token.ent_type = caps.get(2).map(|m| m.as_str().to_string());
                }
            }
        }

        tokens.push(token);
    }

    if !tokens.is_empty() {
        sentences.push(finish_sentence(tokens)?);
    }

    let lang = lang.unwrap_or_else(|| default_lang.to_string());
    Ok(Document::new(lang, sentences))
}

/// Parse UD features (`Tense=Past|VerbForm=Fin`); `_` means none
fn parse_feats(feats: &str) -> BTreeMap<String, String> {
    feats
        .split('|')
        .filter_map(|item| item.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Assemble entities from IOB runs and build the sentence
fn finish_sentence(tokens: Vec<Token>) -> Result<Sentence> {
    let mut ents = Vec::new();
    let mut open: Option<(usize, String)> = None;

    for token in &tokens {
        match token.ent_iob {
            EntityIob::Inside if open.is_some() => {}
            EntityIob::Begin | EntityIob::Inside => {
                if let Some((start, label)) = open.take() {
                    ents.push(Entity {
                        start,
                        end: token.i,
                        label,
                    });
                }
                let label = token.ent_type.clone().unwrap_or_default();
                open = Some((token.i, label));
            }
            EntityIob::Outside | EntityIob::Unset => {
                if let Some((start, label)) = open.take() {
                    ents.push(Entity {
                        start,
                        end: token.i,
                        label,
                    });
                }
            }
        }
    }
    if let Some((start, label)) = open {
        ents.push(Entity {
            start,
            end: tokens.len(),
            label,
        });
    }

    Sentence::new(tokens, ents)
}

// ============================================================================
// Tests
// ============================================================================
