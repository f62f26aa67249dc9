//! narrel Extractor - Relation extraction over dependency trees
//!
//! Consumes documents already annotated with part-of-speech tags,
//! dependency trees and named entities, and produces typed relations
//! (subject-verb, verb-object, adpositional links, compound nouns, ...)
//! with the tense and mood of the verb phrase involved.

use narrel_core::{Document, Result};

/// Trait for relation extractors
pub trait RelationExtractor: Send + Sync {
    fn extract<'d>(&self, doc: &'d Document) -> Result<Vec<relation::Relation<'d>>>;
}

pub mod classify;
pub mod records;
pub mod reduce;
pub mod relation;
pub mod span;
pub mod tense;

pub use records::{
    relation_records, svo_records, token_records, RelationRecord, SvoRecord, TokenRecord,
};
pub use reduce::reduce_relations;
pub use relation::{DependencyExtractor, Relation, RelationType};
pub use span::{compound_noun, compound_verb, entity_span, resolve};
pub use tense::{Mode, Tense, TenseDetector, TenseRegistry};
