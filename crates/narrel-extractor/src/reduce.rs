//! Relation reducer
//!
//! Collapses a document's relation list to one relation per
//! `(rtype, head root, sub root)`, keeping first-seen order.

use std::collections::HashSet;

use crate::relation::{Relation, RelationType};

/// Identity of a relation for deduplication: type plus both root tokens
/// (sentence index, token index)
type RelationKey = (RelationType, (usize, usize), (usize, usize));

fn key(relation: &Relation<'_>) -> RelationKey {
    (
        relation.rtype,
        (relation.head.sentence().index(), relation.head.root_index()),
        (relation.sub.sentence().index(), relation.sub.root_index()),
    )
}

/// Drop relations that repeat an earlier `(rtype, head.root, sub.root)`.
///
/// The result is a subsequence of `relations` and reducing it again is a
/// no-op.
pub fn reduce_relations<'d>(relations: &[Relation<'d>]) -> Vec<Relation<'d>> {
    let mut seen: HashSet<RelationKey> = HashSet::new();
    let reduced: Vec<Relation<'d>> = relations
        .iter()
        .filter(|r| seen.insert(key(r)))
        .cloned()
        .collect();

    tracing::debug!(
        "Reduced {} relations to {}",
        relations.len(),
        reduced.len()
    );

    reduced
}
