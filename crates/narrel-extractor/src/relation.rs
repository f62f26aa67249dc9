//! Relation classification
//!
//! Turns a pair of spans joined by a dependency edge into a typed
//! [`Relation`]: the pair is oriented so the structurally dominant span
//! comes first, classified by an ordered cascade of predicates, labelled
//! with a `POS.dep=>POS.dep` descriptor and given a tense.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use narrel_core::{Document, ExtractionConfig, NarrelError, Result, Sentence, Span};

use crate::classify::{
    is_adj_verb, is_adp, is_comp_dep, is_description, is_in_compound_noun, is_noun, is_obj_dep,
    is_punct, is_subj_dep, is_verb,
};
use crate::span::{compound_noun, resolve};
use crate::tense::{Mode, Tense, TenseRegistry};
use crate::RelationExtractor;

// ============================================================================
// Relation Types
// ============================================================================

/// Relation types, in classification precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelationType {
    /// Superordinate verb -> subordinate verb
    #[serde(rename = "verb-verb")]
    VerbVerb,
    /// Subject performing an action
    #[serde(rename = "subject-verb")]
    SubjectVerb,
    /// Action attached to a complement
    #[serde(rename = "complement-verb")]
    ComplementVerb,
    /// Object of an action
    #[serde(rename = "verb-object")]
    VerbObject,
    /// Complement of an action
    #[serde(rename = "verb-complement")]
    VerbComplement,
    /// Adposition as head, linked to anything
    #[serde(rename = "left_adposition")]
    LeftAdposition,
    /// Adposition as dependent
    #[serde(rename = "right_adposition")]
    RightAdposition,
    /// Two parts of one compound noun
    #[serde(rename = "compound")]
    Compound,
    /// Two nouns in a descriptive relation ("John Smith, school president")
    #[serde(rename = "noun-noun")]
    NounNoun,
    /// Head described by the dependent
    #[serde(rename = "description")]
    Description,
    /// Anything else
    #[serde(rename = "misc")]
    Misc,
}

impl RelationType {
    pub const ALL: [RelationType; 11] = [
        Self::VerbVerb,
        Self::SubjectVerb,
        Self::ComplementVerb,
        Self::VerbObject,
        Self::VerbComplement,
        Self::LeftAdposition,
        Self::RightAdposition,
        Self::Compound,
        Self::NounNoun,
        Self::Description,
        Self::Misc,
    ];

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VerbVerb => "verb-verb",
            Self::SubjectVerb => "subject-verb",
            Self::ComplementVerb => "complement-verb",
            Self::VerbObject => "verb-object",
            Self::VerbComplement => "verb-complement",
            Self::LeftAdposition => "left_adposition",
            Self::RightAdposition => "right_adposition",
            Self::Compound => "compound",
            Self::NounNoun => "noun-noun",
            Self::Description => "description",
            Self::Misc => "misc",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RelationType {
    type Err = NarrelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| NarrelError::InvalidDocument(format!("unknown relation type {s:?}")))
    }
}

// ============================================================================
// Relations
// ============================================================================

/// A typed relation between two spans of one sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation<'d> {
    pub tense: Tense,
    pub mode: Mode,
    /// `"{head_pos}.{head_dep}=>{sub_pos}.{sub_dep}"` of the two roots
    pub rel: String,
    pub rtype: RelationType,
    pub head: Span<'d>,
    pub sub: Span<'d>,
}

/// Put the structurally dominant span first.
///
/// A nominal subject, or any subject hanging off a verb, is moved into
/// the head slot. A head that is already a subject stays put, so orienting
/// an oriented pair changes nothing.
pub fn orient<'d>(head: Span<'d>, sub: Span<'d>) -> (Span<'d>, Span<'d>) {
    let ht = head.root();
    let st = sub.root();
    if is_subj_dep(ht) {
        return (head, sub);
    }
    if (is_noun(st) && is_subj_dep(st)) || (is_verb(ht) && is_subj_dep(st)) {
        (sub, head)
    } else {
        (head, sub)
    }
}

/// Relation type of an already oriented pair; first matching rule wins
pub fn relation_type(head: &Span<'_>, sub: &Span<'_>) -> RelationType {
    let ht = head.root();
    let st = sub.root();

    if is_verb(ht) && is_verb(st) {
        RelationType::VerbVerb
    } else if (is_noun(ht) || is_subj_dep(ht)) && is_verb(st) {
        RelationType::SubjectVerb
    } else if is_comp_dep(ht) && is_verb(st) {
        RelationType::ComplementVerb
    } else if (is_verb(ht) || is_adj_verb(ht)) && (is_noun(st) || is_obj_dep(st)) {
        RelationType::VerbObject
    } else if is_verb(ht) && is_comp_dep(st) {
        RelationType::VerbComplement
    } else if is_adp(ht) {
        RelationType::LeftAdposition
    } else if is_adp(st) {
        RelationType::RightAdposition
    } else if is_in_compound_noun(ht) && same_compound(head, sub) {
        RelationType::Compound
    } else if is_noun(ht) && is_noun(st) {
        RelationType::NounNoun
    } else if is_description(st) {
        RelationType::Description
    } else {
        RelationType::Misc
    }
}

/// Whether both roots belong to the same compound noun group
fn same_compound(head: &Span<'_>, sub: &Span<'_>) -> bool {
    fn group<'s>(span: &Span<'s>) -> Option<Span<'s>> {
        compound_noun(span.sentence(), span.root_index())
    }
    match (group(head), group(sub)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// `POS.dep=>POS.dep` descriptor of the two roots
pub fn descriptor(head: &Span<'_>, sub: &Span<'_>) -> String {
    let h = head.root();
    let s = sub.root();
    format!("{}.{}=>{}.{}", h.pos, h.dep, s.pos, s.dep)
}

// ============================================================================
// Dependency-based extractor
// ============================================================================

/// Extracts relations by walking every dependency edge of a document
#[derive(Debug, Default)]
pub struct DependencyExtractor {
    tenses: TenseRegistry,
    config: ExtractionConfig,
}

impl DependencyExtractor {
    /// Create an extractor with the built-in tense detectors
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: ExtractionConfig) -> Self {
        Self {
            tenses: TenseRegistry::new(),
            config,
        }
    }

    /// Replace the tense detector registry
    pub fn with_tenses(mut self, tenses: TenseRegistry) -> Self {
        self.tenses = tenses;
        self
    }

    pub fn tenses(&self) -> &TenseRegistry {
        &self.tenses
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Classify a head/sub pair joined by a dependency edge
    pub fn relation<'d>(&self, lang: &str, head: Span<'d>, sub: Span<'d>) -> Relation<'d> {
        let (head, sub) = orient(head, sub);
        let rtype = relation_type(&head, &sub);
        let rel = descriptor(&head, &sub);

        let (tense, mode) = if is_verb(head.root()) || !is_verb(sub.root()) {
            self.tenses.detect(lang, &head)
        } else {
            self.tenses.detect(lang, &sub)
        };

        Relation {
            tense,
            mode,
            rel,
            rtype,
            head,
            sub,
        }
    }

    /// All relations of one sentence, in token order
    pub fn sentence_relations<'d>(&self, lang: &str, sentence: &'d Sentence) -> Vec<Relation<'d>> {
        let mut relations = Vec::new();

        for token in sentence.tokens() {
            let Some(head_span) = resolve(sentence, token.i) else {
                continue;
            };

            for child in sentence.children(token.i) {
                if self.config.skip_punct && is_punct(child) {
                    continue;
                }
                let Some(sub_span) = resolve(sentence, child.i) else {
                    continue;
                };

                let internal = head_span == sub_span
                    || head_span.root_index() == sub_span.root_index()
                    || head_span.contains(child.i)
                    || sub_span.contains(token.i);
                if internal {
                    // parts of one compound noun are related token to token;
                    // edges inside a compound verb carry no relation
                    if is_in_compound_noun(token) && !is_verb(token) {
                        if let (Some(h), Some(s)) =
                            (Span::token(sentence, token.i), Span::token(sentence, child.i))
                        {
                            relations.push(self.relation(lang, h, s));
                        }
                    }
                    continue;
                }

                relations.push(self.relation(lang, head_span, sub_span));
            }
        }

        tracing::debug!(
            "Sentence {}: {} tokens, {} relations",
            sentence.index(),
            sentence.len(),
            relations.len()
        );

        relations
    }

    /// All relations of a document, sentence by sentence
    pub fn relations<'d>(&self, doc: &'d Document) -> Vec<Relation<'d>> {
        doc.sentences()
            .iter()
            .flat_map(|sentence| self.sentence_relations(doc.lang(), sentence))
            .collect()
    }
}

impl RelationExtractor for DependencyExtractor {
    fn extract<'d>(&self, doc: &'d Document) -> Result<Vec<Relation<'d>>> {
        let relations = self.relations(doc);
        tracing::info!(
            "Extracted {} relations from {} sentences",
            relations.len(),
            doc.sentences().len()
        );
        Ok(relations)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use narrel_core::Token;

    fn sentence(tokens: Vec<Token>) -> Sentence {
        Sentence::new(tokens, vec![]).unwrap()
    }

    // "John eats apples"
    fn svo() -> Sentence {
        sentence(vec![
            Token::new(0, "John", "PROPN", "nsubj", 1),
            Token::new(1, "eats", "VERB", "ROOT", 1).with_feature("Tense", "Pres"),
            Token::new(2, "apples", "NOUN", "obj", 1),
        ])
    }

    fn span(sent: &Sentence, i: usize) -> Span<'_> {
        Span::token(sent, i).unwrap()
    }

    #[test]
    fn test_relation_type_strings() {
        assert_eq!(RelationType::SubjectVerb.to_string(), "subject-verb");
        assert_eq!(RelationType::LeftAdposition.as_str(), "left_adposition");
        assert_eq!(
            "noun-noun".parse::<RelationType>().unwrap(),
            RelationType::NounNoun
        );
        assert!("unknown".parse::<RelationType>().is_err());
        for rtype in RelationType::ALL {
            assert_eq!(rtype.as_str().parse::<RelationType>().unwrap(), rtype);
        }
    }

    #[test]
    fn test_subject_swapped_into_head() {
        let sent = svo();
        let extractor = DependencyExtractor::new();
        let rel = extractor.relation("en", span(&sent, 1), span(&sent, 0));
        assert_eq!(rel.head.root().text, "John");
        assert_eq!(rel.sub.root().text, "eats");
        assert_eq!(rel.rtype, RelationType::SubjectVerb);
        assert_eq!(rel.rel, "PROPN.nsubj=>VERB.ROOT");
    }

    #[test]
    fn test_orientation_idempotent() {
        let sent = svo();
        let once = orient(span(&sent, 1), span(&sent, 0));
        let twice = orient(once.0, once.1);
        assert_eq!(once, twice);

        let object = orient(span(&sent, 1), span(&sent, 2));
        assert_eq!(object.0.root().text, "eats");
        assert_eq!(orient(object.0, object.1), object);
    }

    #[test]
    fn test_orientation_keeps_subject_head() {
        // "John , he left": both roots carry a subject label
        let sent = sentence(vec![
            Token::new(0, "John", "PROPN", "nsubj", 2),
            Token::new(1, "he", "PRON", "nsubj", 0),
            Token::new(2, "left", "VERB", "ROOT", 2),
        ]);
        let once = orient(span(&sent, 0), span(&sent, 1));
        assert_eq!(once.0.root().text, "John");
        assert_eq!(orient(once.0, once.1), once);

        let reversed = orient(span(&sent, 1), span(&sent, 0));
        assert_eq!(orient(reversed.0, reversed.1), reversed);
    }

    #[test]
    fn test_verb_object() {
        let sent = svo();
        let rel = DependencyExtractor::new().relation("en", span(&sent, 1), span(&sent, 2));
        assert_eq!(rel.rtype, RelationType::VerbObject);
        assert_eq!(rel.rel, "VERB.ROOT=>NOUN.obj");
        assert_eq!(rel.tense, Tense::Present);
    }

    #[test]
    fn test_adposition_head_is_left_adposition() {
        // "in Paris" with the adposition as head, sub of any category
        let sent = sentence(vec![
            Token::new(0, "in", "ADP", "prep", 0),
            Token::new(1, "Paris", "PROPN", "pobj", 0),
            Token::new(2, "quickly", "ADV", "advmod", 0),
        ]);
        let extractor = DependencyExtractor::new();
        for sub in [1, 2] {
            let rel = extractor.relation("en", span(&sent, 0), span(&sent, sub));
            assert_eq!(rel.rtype, RelationType::LeftAdposition);
        }

        let rel = extractor.relation("en", span(&sent, 1), span(&sent, 0));
        assert_eq!(rel.rtype, RelationType::RightAdposition);
    }

    #[test]
    fn test_compound_versus_noun_noun() {
        // "school president Smith , teacher"
        let sent = sentence(vec![
            Token::new(0, "school", "NOUN", "compound", 1),
            Token::new(1, "president", "NOUN", "ROOT", 1),
            Token::new(2, ",", "PUNCT", "punct", 3),
            Token::new(3, "teacher", "NOUN", "appos", 1),
        ]);
        let extractor = DependencyExtractor::new();

        let compound = extractor.relation("en", span(&sent, 1), span(&sent, 0));
        assert_eq!(compound.rtype, RelationType::Compound);

        let group = compound_noun(&sent, 1).unwrap();
        let other = compound_noun(&sent, 3).unwrap();
        let noun_noun = extractor.relation("en", group, other);
        assert_eq!(noun_noun.rtype, RelationType::NounNoun);
    }

    #[test]
    fn test_description_and_misc() {
        // "very red car"
        let sent = sentence(vec![
            Token::new(0, "very", "ADV", "advmod", 1),
            Token::new(1, "red", "ADJ", "amod", 2),
            Token::new(2, "car", "NOUN", "ROOT", 2),
        ]);
        let extractor = DependencyExtractor::new();
        let desc = extractor.relation("en", span(&sent, 2), span(&sent, 1));
        assert_eq!(desc.rtype, RelationType::Description);

        let sent = sentence(vec![
            Token::new(0, "oh", "INTJ", "discourse", 1),
            Token::new(1, "well", "INTJ", "ROOT", 1),
        ]);
        let misc = extractor.relation("en", span(&sent, 1), span(&sent, 0));
        assert_eq!(misc.rtype, RelationType::Misc);
    }

    #[test]
    fn test_verb_verb_and_complements() {
        // "She wants to leave" (wants -> leave: xcomp)
        let sent = sentence(vec![
            Token::new(0, "She", "PRON", "nsubj", 1),
            Token::new(1, "wants", "VERB", "ROOT", 1).with_feature("Tense", "Pres"),
            Token::new(2, "to", "PART", "mark", 3),
            Token::new(3, "leave", "VERB", "xcomp", 1),
            Token::new(4, "home", "ADV", "xcomp", 3),
        ]);
        let extractor = DependencyExtractor::new();
        let vv = extractor.relation("en", span(&sent, 1), span(&sent, 3));
        assert_eq!(vv.rtype, RelationType::VerbVerb);

        let vc = extractor.relation("en", span(&sent, 3), span(&sent, 4));
        assert_eq!(vc.rtype, RelationType::VerbComplement);

        let cv = extractor.relation("en", span(&sent, 4), span(&sent, 3));
        assert_eq!(cv.rtype, RelationType::ComplementVerb);
    }

    #[test]
    fn test_tense_taken_from_verbal_side() {
        // "Anna will read" with the noun as head: tense comes from the verb span
        let sent = sentence(vec![
            Token::new(0, "Anna", "PROPN", "ROOT", 0),
            Token::new(1, "will", "AUX", "aux", 2),
            Token::new(2, "read", "VERB", "acl", 0),
        ]);
        let extractor = DependencyExtractor::new();
        let head = span(&sent, 0);
        let sub = Span::new(&sent, 1, 3).unwrap();
        let rel = extractor.relation("en", head, sub);
        assert_eq!(rel.rtype, RelationType::SubjectVerb);
        assert_eq!(rel.tense, Tense::Future);
    }

    #[test]
    fn test_sentence_relations_end_to_end() {
        let sent = svo();
        let doc = Document::new("en", vec![sent]);
        let relations = DependencyExtractor::new().extract(&doc).unwrap();

        assert_eq!(relations.len(), 2);
        let subject: Vec<_> = relations
            .iter()
            .filter(|r| r.rtype == RelationType::SubjectVerb)
            .collect();
        let object: Vec<_> = relations
            .iter()
            .filter(|r| r.rtype == RelationType::VerbObject)
            .collect();
        assert_eq!(subject.len(), 1);
        assert_eq!(object.len(), 1);
        assert_eq!(subject[0].rel, "PROPN.nsubj=>VERB.ROOT");
        assert_eq!(object[0].rel, "VERB.ROOT=>NOUN.obj");
    }

    #[test]
    fn test_compound_verb_internal_edges_skipped() {
        // "He has left": has -> left is internal to the compound verb
        let sent = sentence(vec![
            Token::new(0, "He", "PRON", "nsubj", 2),
            Token::new(1, "has", "AUX", "aux", 2).with_feature("Tense", "Pres"),
            Token::new(2, "left", "VERB", "ROOT", 2).with_feature("Tense", "Past"),
        ]);
        let relations = DependencyExtractor::new().sentence_relations("en", &sent);
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].rtype, RelationType::SubjectVerb);
        assert_eq!(relations[0].sub.text(), "has left");
        assert_eq!(relations[0].tense, Tense::Present);
    }

    #[test]
    fn test_copula_edge_inside_verb_phrase_skipped() {
        // "She is happy": "is" resolves to "is happy", which holds its head
        let sent = sentence(vec![
            Token::new(0, "She", "PRON", "nsubj", 2),
            Token::new(1, "is", "AUX", "cop", 2).with_feature("Tense", "Pres"),
            Token::new(2, "happy", "ADJ", "ROOT", 2),
        ]);
        let relations = DependencyExtractor::new().sentence_relations("en", &sent);
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].head.root().text, "She");
        assert_eq!(relations[0].sub.root().text, "happy");
        for rel in &relations {
            assert_ne!(rel.head.root_index(), rel.sub.root_index());
        }
    }

    #[test]
    fn test_adjacent_objects_stay_apart() {
        // "She gave him books"
        let sent = sentence(vec![
            Token::new(0, "She", "PRON", "nsubj", 1),
            Token::new(1, "gave", "VERB", "ROOT", 1),
            Token::new(2, "him", "PRON", "iobj", 1),
            Token::new(3, "books", "NOUN", "obj", 1),
        ]);
        let relations = DependencyExtractor::new().sentence_relations("en", &sent);
        let objects: Vec<String> = relations
            .iter()
            .filter(|r| r.rtype == RelationType::VerbObject)
            .map(|r| r.sub.text())
            .collect();
        assert_eq!(objects, vec!["him", "books"]);
    }

    #[test]
    fn test_skip_punct_config() {
        let sent = sentence(vec![
            Token::new(0, "Go", "VERB", "ROOT", 0),
            Token::new(1, "!", "PUNCT", "punct", 0),
        ]);
        let all = DependencyExtractor::new().sentence_relations("en", &sent);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].rtype, RelationType::Misc);

        let config = ExtractionConfig {
            skip_punct: true,
            ..ExtractionConfig::default()
        };
        let filtered = DependencyExtractor::with_config(config).sentence_relations("en", &sent);
        assert!(filtered.is_empty());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        const POS: &[&str] = &["VERB", "AUX", "ADJ", "NOUN", "PROPN", "PRON", "DET", "ADP", "ADV", "PUNCT", "X"];
        const DEPS: &[&str] = &["ROOT", "aux", "nsubj", "nsubj:pass", "obj", "iobj", "compound", "amod", "det", "case", "xcomp", "appos"];

        fn arb_sentence() -> impl Strategy<Value = Sentence> {
            (1usize..10).prop_flat_map(|len| {
                prop::collection::vec((0..POS.len(), 0..DEPS.len(), 0..len), len).prop_map(
                    move |rows| {
                        let tokens = rows
                            .into_iter()
                            .enumerate()
                            .map(|(i, (p, d, h))| Token::new(i, format!("w{i}"), POS[p], DEPS[d], h))
                            .collect();
                        Sentence::new(tokens, vec![]).unwrap()
                    },
                )
            })
        }

        proptest! {
            #[test]
            fn extraction_is_total(sent in arb_sentence()) {
                let extractor = DependencyExtractor::new();
                for rel in extractor.sentence_relations("en", &sent) {
                    prop_assert!(RelationType::ALL.contains(&rel.rtype));
                    prop_assert!(rel.rel.contains("=>"));
                }
            }

            #[test]
            fn relations_never_link_a_root_to_itself(sent in arb_sentence()) {
                for rel in DependencyExtractor::new().sentence_relations("en", &sent) {
                    prop_assert_ne!(rel.head.root_index(), rel.sub.root_index());
                }
            }

            #[test]
            fn orientation_is_idempotent(sent in arb_sentence()) {
                let spans: Vec<Span<'_>> = (0..sent.len())
                    .filter_map(|i| resolve(&sent, i))
                    .collect();
                for &head in &spans {
                    for &sub in &spans {
                        let once = orient(head, sub);
                        prop_assert_eq!(orient(once.0, once.1), once);
                    }
                }
            }
        }
    }
}
