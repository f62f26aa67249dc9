//! Span merger
//!
//! Walks left and right from a seed token to rebuild multi-token
//! constructs: compound verbs ("has been running", "is happy"),
//! compound nouns ("school president") and named-entity mentions.
//!
//! Every scan is bounds-checked against the sentence length; running
//! into a sentence boundary simply ends the scan.

use narrel_core::{EntityIob, Sentence, Span, Token};

use crate::classify::{
    is_adj, is_aux, is_aux_dep, is_compound_dep, is_det, is_ent, is_in_compound_noun, is_verb_or_aux,
    is_verblike,
};

/// Compound verb containing the verb-like token `i`.
///
/// Returns `None` only when `i` is outside the sentence. The result always
/// satisfies `start <= i < end`.
pub fn compound_verb(sentence: &Sentence, i: usize) -> Option<Span<'_>> {
    let len = sentence.len();
    if i >= len {
        return None;
    }

    let in_phrase = |t: &Token| is_verblike(t) || is_aux_dep(t) || is_aux(t);
    let verbal_or_adj = |t: &Token| is_verblike(t) || is_adj(t);

    let mut end = i;
    while end < len && in_phrase(&sentence[end]) {
        end += 1;
    }
    // predicate adjective ("is happy")
    if end < len && is_adj(&sentence[end]) {
        end += 1;
    }
    let end = end.max(i + 1);

    let mut prev = i;
    while prev > 0 && verbal_or_adj(&sentence[prev]) {
        prev -= 1;
    }
    while !is_verb_or_aux(&sentence[prev]) {
        if prev + 1 >= len {
            break;
        }
        prev += 1;
        if prev == i {
            break;
        }
    }

    let mut start = prev;
    while !is_verb_or_aux(&sentence[start]) && start + 1 < end {
        start += 1;
    }

    Span::new(sentence, start.min(i), end)
}

/// Compound noun containing the token `i`, with leading determiners trimmed.
///
/// Neighbouring nominals join the group only when the dependency tree ties
/// them together (see [`joins_compound`]), so every member of a group
/// yields the same span.
pub fn compound_noun(sentence: &Sentence, i: usize) -> Option<Span<'_>> {
    let len = sentence.len();
    if i >= len {
        return None;
    }

    let mut end = i + 1;
    while end < len && joins_compound(&sentence[end - 1], &sentence[end]) {
        end += 1;
    }

    let mut start = i;
    while start > 0 && joins_compound(&sentence[start - 1], &sentence[start]) {
        start -= 1;
    }

    while is_det(&sentence[start]) && start + 1 < end {
        start += 1;
    }

    Span::new(sentence, start.min(i), end)
}

/// Whether two adjacent tokens belong to one compound noun group.
///
/// Both must be compound noun material, and the pair must be linked: a
/// determiner or compound/flat label on either side, or a direct
/// dependency edge between them. "gave him books" keeps `him` and
/// `books` apart.
pub fn joins_compound(left: &Token, right: &Token) -> bool {
    is_in_compound_noun(left)
        && is_in_compound_noun(right)
        && (is_det(left)
            || is_compound_dep(left)
            || is_compound_dep(right)
            || left.head == right.i
            || right.head == left.i)
}

/// Named entity overlapping `span`, if one aligns exactly.
///
/// Starts from the first entity-tagged token of the span, extends forward
/// over `I` tokens and, when that token is itself an `I`, backward to the
/// nearest `B`. The resulting bounds must match one of the sentence's
/// entities; otherwise there is no entity and `None` is returned.
pub fn entity_span<'s>(span: &Span<'s>) -> Option<Span<'s>> {
    let sentence = span.sentence();
    let first = span.tokens().iter().find(|t| is_ent(t))?;

    let mut start = first.i;
    let mut end = first.i + 1;
    while end < sentence.len() && sentence[end].ent_iob == EntityIob::Inside {
        end += 1;
    }

    if first.ent_iob == EntityIob::Inside {
        loop {
            if start == 0 {
                return None;
            }
            start -= 1;
            match sentence[start].ent_iob {
                EntityIob::Begin => break,
                EntityIob::Inside => continue,
                EntityIob::Outside | EntityIob::Unset => return None,
            }
        }
    }

    sentence.entity(start, end)?;
    Span::new(sentence, start, end)
}

/// Semantic span for token `i`: its compound verb, its compound noun, or
/// the token alone.
pub fn resolve(sentence: &Sentence, i: usize) -> Option<Span<'_>> {
    let token = sentence.token(i)?;
    if is_verblike(token) {
        compound_verb(sentence, i)
    } else if is_in_compound_noun(token) && !is_det(token) {
        compound_noun(sentence, i)
    } else {
        Span::token(sentence, i)
    }
}

// ============================================================================
// Tests
// ============================================================================
