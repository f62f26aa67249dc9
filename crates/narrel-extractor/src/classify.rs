//! Token classifier
//!
//! Pure predicates over a single token. Each one looks only at the
//! token's own part-of-speech tag, dependency label and morphology,
//! never at its neighbours.

use narrel_core::{EntityIob, Token};

// ============================================================================
// Tag sets
// ============================================================================

pub const VERB_POS: &[&str] = &["VERB", "AUX"];
pub const NOUN_POS: &[&str] = &["NOUN", "PROPN", "PRON"];

pub const OBJECT_DEPS: &[&str] = &["obj", "iobj"];
pub const SUBJECT_DEPS: &[&str] = &["nsubj", "nsubj:pass"];
pub const PREDICATE_DEPS: &[&str] = &["ROOT", "root", "aux", "xcomp"];
pub const LOCATION_DEPS: &[&str] = &["obl", "obl:agent"];
pub const AUX_DEPS: &[&str] = &["aux", "aux:pass"];
pub const COMPOUND_DEPS: &[&str] = &["compound", "flat", "flat:name", "flat:foreign", "fixed"];
pub const DESCRIPTION_DEPS: &[&str] = &["amod", "appos", "acl", "acl:relcl", "nummod", "advmod"];

// ============================================================================
// Part of speech
// ============================================================================

/// Verb or auxiliary
pub fn is_verb(token: &Token) -> bool {
    VERB_POS.contains(&token.pos.as_str())
}

pub fn is_aux(token: &Token) -> bool {
    token.pos == "AUX"
}

pub fn is_adj(token: &Token) -> bool {
    token.pos == "ADJ"
}

/// Adjective carrying a verb form (participle, converb)
pub fn is_adj_verb(token: &Token) -> bool {
    is_adj(token) && token.feature("VerbForm").is_some()
}

/// Verb or adjectival verb form
pub fn is_verblike(token: &Token) -> bool {
    is_verb(token) || is_adj_verb(token)
}

/// Noun, proper noun or pronoun
pub fn is_noun(token: &Token) -> bool {
    NOUN_POS.contains(&token.pos.as_str())
}

/// Adposition
pub fn is_adp(token: &Token) -> bool {
    token.pos == "ADP"
}

pub fn is_det(token: &Token) -> bool {
    token.pos == "DET"
}

pub fn is_punct(token: &Token) -> bool {
    token.pos == "PUNCT"
}

// ============================================================================
// Dependency labels
// ============================================================================

pub fn is_aux_dep(token: &Token) -> bool {
    AUX_DEPS.contains(&token.dep.as_str())
}

pub fn is_subj_dep(token: &Token) -> bool {
    SUBJECT_DEPS.contains(&token.dep.as_str())
}

pub fn is_obj_dep(token: &Token) -> bool {
    OBJECT_DEPS.contains(&token.dep.as_str())
}

/// Predicate complement: sentence root, auxiliary or open clausal complement
pub fn is_comp_dep(token: &Token) -> bool {
    PREDICATE_DEPS.contains(&token.dep.as_str())
}

/// Oblique (locative/agentive) dependent
pub fn is_loc_dep(token: &Token) -> bool {
    LOCATION_DEPS.contains(&token.dep.as_str())
}

// ============================================================================
// Composite predicates
// ============================================================================

/// Verb, auxiliary tag or auxiliary dependency
pub fn is_verb_or_aux(token: &Token) -> bool {
    is_verb(token) || is_aux_dep(token) || is_aux(token)
}

/// Part of a named entity
pub fn is_ent(token: &Token) -> bool {
    matches!(token.ent_iob, EntityIob::Begin | EntityIob::Inside)
}

/// Compound, flat or fixed multiword label
pub fn is_compound_dep(token: &Token) -> bool {
    COMPOUND_DEPS.contains(&token.dep.as_str())
}

/// Token that may belong to a compound noun group
pub fn is_in_compound_noun(token: &Token) -> bool {
    is_noun(token) || is_det(token) || is_compound_dep(token)
}

/// Token that describes its head (modifier, apposition, relative clause)
pub fn is_description(token: &Token) -> bool {
    is_adj(token) || DESCRIPTION_DEPS.contains(&token.dep.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_predicates() {
        let verb = Token::new(0, "runs", "VERB", "ROOT", 0);
        let aux = Token::new(0, "has", "AUX", "aux", 1);
        let participle = Token::new(0, "broken", "ADJ", "amod", 1).with_feature("VerbForm", "Part");
        let adj = Token::new(0, "happy", "ADJ", "amod", 1);

        assert!(is_verb(&verb) && is_verblike(&verb));
        assert!(is_verb(&aux) && is_aux_dep(&aux) && is_comp_dep(&aux));
        assert!(!is_verb(&participle) && is_adj_verb(&participle) && is_verblike(&participle));
        assert!(is_adj(&adj) && !is_verblike(&adj));
    }

    #[test]
    fn test_dependency_predicates() {
        let subj = Token::new(0, "she", "PRON", "nsubj", 1);
        let pass = Token::new(0, "it", "PRON", "nsubj:pass", 1);
        let obj = Token::new(0, "it", "PRON", "iobj", 1);
        let obl = Token::new(0, "park", "NOUN", "obl", 1);
        let root = Token::new(0, "go", "VERB", "ROOT", 0);

        assert!(is_subj_dep(&subj) && is_subj_dep(&pass));
        assert!(is_obj_dep(&obj) && !is_subj_dep(&obj));
        assert!(is_loc_dep(&obl));
        assert!(is_comp_dep(&root));
    }

    #[test]
    fn test_compound_noun_membership() {
        assert!(is_in_compound_noun(&Token::new(0, "the", "DET", "det", 1)));
        assert!(is_in_compound_noun(&Token::new(0, "school", "NOUN", "compound", 1)));
        assert!(is_in_compound_noun(&Token::new(0, "Smith", "X", "flat:name", 1)));
        assert!(is_compound_dep(&Token::new(0, "Smith", "X", "flat:name", 1)));
        assert!(!is_compound_dep(&Token::new(0, "him", "PRON", "iobj", 1)));
        assert!(!is_in_compound_noun(&Token::new(0, "run", "VERB", "ROOT", 0)));
    }

    #[test]
    fn test_entity_and_description() {
        let ent = Token::new(0, "Paris", "PROPN", "obl", 1).with_entity(EntityIob::Begin, Some("GPE"));
        let outside = Token::new(0, "city", "NOUN", "obl", 1).with_entity(EntityIob::Outside, None);
        assert!(is_ent(&ent));
        assert!(!is_ent(&outside));

        assert!(is_description(&Token::new(0, "red", "ADJ", "amod", 1)));
        assert!(is_description(&Token::new(0, "who", "VERB", "acl:relcl", 1)));
        assert!(!is_description(&Token::new(0, "on", "ADP", "case", 1)));
    }
}
