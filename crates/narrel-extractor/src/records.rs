//! Flat records for export
//!
//! Converts borrowed relations into owned, serializable rows: one row per
//! relation, subject–verb–object triples, and per-token annotations.

use serde::{Deserialize, Serialize};

use narrel_core::{Document, Span};

use crate::classify;
use crate::relation::{Relation, RelationType};
use crate::tense::{Mode, Tense};

// ============================================================================
// Record types
// ============================================================================

/// Owned copy of a span's position and text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanRecord {
    pub text: String,
    pub start: usize,
    pub end: usize,
    /// Text of the root token
    pub root: String,
}

impl From<&Span<'_>> for SpanRecord {
    fn from(span: &Span<'_>) -> Self {
        Self {
            text: span.text(),
            start: span.start(),
            end: span.end(),
            root: span.root().text.clone(),
        }
    }
}

/// One relation as a flat row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub sentence: usize,
    pub tense: Tense,
    pub mode: Mode,
    pub rel: String,
    pub rtype: RelationType,
    pub head: SpanRecord,
    pub sub: SpanRecord,
}

impl From<&Relation<'_>> for RelationRecord {
    fn from(relation: &Relation<'_>) -> Self {
        Self {
            sentence: relation.head.sentence().index(),
            tense: relation.tense,
            mode: relation.mode,
            rel: relation.rel.clone(),
            rtype: relation.rtype,
            head: SpanRecord::from(&relation.head),
            sub: SpanRecord::from(&relation.sub),
        }
    }
}

/// Subject–verb–object triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SvoRecord {
    pub sentence: usize,
    pub tense: Tense,
    pub mode: Mode,
    pub subject: SpanRecord,
    pub verb: SpanRecord,
    /// Missing for intransitive uses
    pub object: Option<SpanRecord>,
}

/// Token annotations together with the classifier's view of the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub sentence: usize,
    pub i: usize,
    pub text: String,
    pub lower: String,
    pub pos: String,
    pub tag: String,
    pub dep: String,
    pub head: usize,
    pub morph: String,
    pub ent_iob: String,
    pub ent_type: Option<String>,
    pub is_verb: bool,
    pub is_noun: bool,
    pub is_adp: bool,
    pub is_subj_dep: bool,
    pub is_obj_dep: bool,
    pub is_loc_dep: bool,
    pub is_in_compound_noun: bool,
}

// ============================================================================
// Conversion utilities
// ============================================================================

/// One row per relation, in input order
pub fn relation_records(relations: &[Relation<'_>]) -> Vec<RelationRecord> {
    relations.iter().map(RelationRecord::from).collect()
}

/// Subject–verb–object triples.
///
/// Each `subject-verb` relation is joined with every `verb-object`
/// relation whose verb span is the same; a subject with no object still
/// yields one triple with `object: None`.
pub fn svo_records(relations: &[Relation<'_>]) -> Vec<SvoRecord> {
    let mut records = Vec::new();

    for subject in relations
        .iter()
        .filter(|r| r.rtype == RelationType::SubjectVerb)
    {
        let verb = &subject.sub;
        let objects: Vec<&Relation<'_>> = relations
            .iter()
            .filter(|r| r.rtype == RelationType::VerbObject && r.head == *verb)
            .collect();

        let make = |object: Option<SpanRecord>| SvoRecord {
            sentence: verb.sentence().index(),
            tense: subject.tense,
            mode: subject.mode,
            subject: SpanRecord::from(&subject.head),
            verb: SpanRecord::from(verb),
            object,
        };

        if objects.is_empty() {
            records.push(make(None));
        } else {
            records.extend(
                objects
                    .into_iter()
                    .map(|o| make(Some(SpanRecord::from(&o.sub)))),
            );
        }
    }

    records
}

/// One row per token of the document
pub fn token_records(doc: &Document) -> Vec<TokenRecord> {
    doc.sentences()
        .iter()
        .flat_map(|sentence| {
            sentence.tokens().iter().map(move |t| TokenRecord {
                sentence: sentence.index(),
                i: t.i,
                text: t.text.clone(),
                lower: t.lower.clone(),
                pos: t.pos.clone(),
                tag: t.tag.clone(),
                dep: t.dep.clone(),
                head: t.head,
                morph: t.morph_string(),
                ent_iob: t.ent_iob.to_string(),
                ent_type: t.ent_type.clone(),
                is_verb: classify::is_verb(t),
                is_noun: classify::is_noun(t),
                is_adp: classify::is_adp(t),
                is_subj_dep: classify::is_subj_dep(t),
                is_obj_dep: classify::is_obj_dep(t),
                is_loc_dep: classify::is_loc_dep(t),
                is_in_compound_noun: classify::is_in_compound_noun(t),
            })
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
