//! Reference concept catalogue
//!
//! The catalogue is immutable once loaded. Concepts introduced by a workbook
//! are collected in a [`VocabularyDelta`] and folded into a run-scoped
//! [`CatalogueView`](super::CatalogueView), never into the catalogue itself.

use crate::namespaces::{rdf, skos};
use anyhow::{Context, Result};
use indexmap::{IndexMap, IndexSet};
use oxigraph::io::RdfFormat;
use oxigraph::model::{NamedNode, NamedOrBlankNode, Term};
use oxigraph::store::Store;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// A controlled vocabulary term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concept {
    pub iri: NamedNode,
    pub notation: String,
    /// Notations of the code-lists this concept belongs to
    pub code_lists: IndexSet<String>,
}

impl Concept {
    pub fn new(iri: NamedNode, notation: impl Into<String>) -> Self {
        Self {
            iri,
            notation: notation.into(),
            code_lists: IndexSet::new(),
        }
    }

    pub fn in_list(mut self, code_list: impl Into<String>) -> Self {
        self.code_lists.insert(code_list.into());
        self
    }
}

/// Concepts and code-lists indexed by notation.
#[derive(Debug, Clone, Default)]
pub struct ConceptIndex {
    concepts: Vec<Concept>,
    by_notation: HashMap<String, Vec<usize>>,
    code_lists: IndexMap<String, NamedNode>,
}

impl ConceptIndex {
    pub fn add_concept(&mut self, concept: Concept) {
        let position = self.concepts.len();
        self.by_notation
            .entry(concept.notation.clone())
            .or_default()
            .push(position);
        self.concepts.push(concept);
    }

    pub fn add_code_list(&mut self, notation: impl Into<String>, iri: NamedNode) {
        self.code_lists.entry(notation.into()).or_insert(iri);
    }

    pub fn find_by_notation<'a>(&'a self, notation: &str) -> impl Iterator<Item = &'a Concept> {
        self.by_notation
            .get(notation)
            .into_iter()
            .flatten()
            .filter_map(|position| self.concepts.get(*position))
    }

    pub fn code_list(&self, notation: &str) -> Option<&NamedNode> {
        self.code_lists.get(notation)
    }

    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    pub fn code_lists(&self) -> impl Iterator<Item = (&String, &NamedNode)> {
        self.code_lists.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty() && self.code_lists.is_empty()
    }
}

/// The reference catalogue loaded once per process.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    index: ConceptIndex,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code_list(mut self, notation: &str, iri: NamedNode) -> Self {
        self.index.add_code_list(notation, iri);
        self
    }

    pub fn with_concept(mut self, concept: Concept) -> Self {
        self.index.add_concept(concept);
        self
    }

    pub fn index(&self) -> &ConceptIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.index.concepts().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)
            .with_context(|| format!("Failed to open catalogue file: {:?}", path))?;
        Self::load_from_reader(file)
            .with_context(|| format!("Failed to load catalogue file: {:?}", path))
    }

    /// Builds the catalogue from SKOS Turtle.
    ///
    /// Code-lists are the `skos:ConceptScheme`s and `skos:Collection`s that
    /// carry a notation. Membership comes from `skos:inScheme`,
    /// `skos:member`, `skos:hasTopConcept` and `skos:topConceptOf`.
    pub fn load_from_reader(reader: impl Read) -> Result<Self> {
        let store = Store::new()?;
        store
            .load_from_reader(RdfFormat::Turtle, reader)
            .context("Failed to parse Turtle content")?;

        let mut notations: IndexMap<NamedNode, String> = IndexMap::new();
        for quad in store.quads_for_pattern(None, Some(skos::NOTATION), None, None) {
            let quad = quad?;
            if let (NamedOrBlankNode::NamedNode(subject), Term::Literal(literal)) =
                (quad.subject, quad.object)
            {
                notations
                    .entry(subject)
                    .or_insert_with(|| literal.value().trim().to_string());
            }
        }

        let mut lists: IndexSet<NamedNode> = IndexSet::new();
        for class in [skos::CONCEPT_SCHEME, skos::COLLECTION] {
            for quad in store.quads_for_pattern(None, Some(rdf::TYPE), Some(class.into()), None) {
                if let NamedOrBlankNode::NamedNode(subject) = quad?.subject {
                    lists.insert(subject);
                }
            }
        }

        // (concept, list) pairs from all four membership predicates
        let mut membership: Vec<(NamedNode, NamedNode)> = Vec::new();
        for (predicate, concept_is_subject) in [
            (skos::IN_SCHEME, true),
            (skos::TOP_CONCEPT_OF, true),
            (skos::MEMBER, false),
            (skos::HAS_TOP_CONCEPT, false),
        ] {
            for quad in store.quads_for_pattern(None, Some(predicate), None, None) {
                let quad = quad?;
                if let (NamedOrBlankNode::NamedNode(subject), Term::NamedNode(object)) =
                    (quad.subject, quad.object)
                {
                    if concept_is_subject {
                        membership.push((subject, object));
                    } else {
                        membership.push((object, subject));
                    }
                }
            }
        }

        let mut catalogue = Catalogue::new();
        for list in &lists {
            if let Some(notation) = notations.get(list) {
                catalogue.index.add_code_list(notation.clone(), list.clone());
            }
        }

        let mut concept_lists: IndexMap<NamedNode, IndexSet<String>> = IndexMap::new();
        for (concept, list) in membership {
            if let Some(list_notation) = notations.get(&list).filter(|_| lists.contains(&list)) {
                concept_lists
                    .entry(concept)
                    .or_default()
                    .insert(list_notation.clone());
            }
        }

        for (iri, notation) in notations {
            if lists.contains(&iri) {
                continue;
            }
            let code_lists = concept_lists.swap_remove(&iri).unwrap_or_default();
            catalogue.index.add_concept(Concept {
                iri,
                notation,
                code_lists,
            });
        }

        debug!(
            concepts = catalogue.len(),
            code_lists = catalogue.index.code_lists.len(),
            "catalogue loaded"
        );
        Ok(catalogue)
    }
}

/// Run-scoped vocabulary additions produced by one extractor.
#[derive(Debug, Clone, Default)]
pub struct VocabularyDelta {
    pub(crate) index: ConceptIndex,
}

impl VocabularyDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_concept(&mut self, concept: Concept) {
        self.index.add_concept(concept);
    }

    pub fn add_code_list(&mut self, notation: impl Into<String>, iri: NamedNode) {
        self.index.add_code_list(notation, iri);
    }

    pub fn len(&self) -> usize {
        self.index.concepts().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn merge(&mut self, other: VocabularyDelta) {
        for (notation, iri) in other.index.code_lists {
            self.index.add_code_list(notation, iri);
        }
        for concept in other.index.concepts {
            self.index.add_concept(concept);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: &str = r#"
        @prefix skos: <http://www.w3.org/2004/02/skos/core#> .
        @prefix ex: <http://example.org/> .

        ex:drill-type a skos:ConceptScheme ;
            skos:notation "DRILL_TYPE" ;
            skos:hasTopConcept ex:dd .
        ex:dd a skos:Concept ; skos:notation "DD" .
        ex:rc a skos:Concept ; skos:notation "RC" ; skos:inScheme ex:drill-type .

        ex:diameters a skos:Collection ;
            skos:notation "DRILL_DIAMETER" ;
            skos:member ex:hq .
        ex:hq a skos:Concept ; skos:notation "HQ" .
        ex:orphan a skos:Concept ; skos:notation "ORPHAN" .
    "#;

    #[test]
    fn loads_notations_and_membership() -> Result<()> {
        let catalogue = Catalogue::load_from_reader(TTL.as_bytes())?;
        assert_eq!(catalogue.len(), 4);
        assert!(catalogue.index().code_list("DRILL_TYPE").is_some());
        assert!(catalogue.index().code_list("DRILL_DIAMETER").is_some());

        let dd: Vec<_> = catalogue.index().find_by_notation("DD").collect();
        assert_eq!(dd.len(), 1);
        assert!(dd[0].code_lists.contains("DRILL_TYPE"));

        let rc: Vec<_> = catalogue.index().find_by_notation("RC").collect();
        assert!(rc[0].code_lists.contains("DRILL_TYPE"));

        let hq: Vec<_> = catalogue.index().find_by_notation("HQ").collect();
        assert!(hq[0].code_lists.contains("DRILL_DIAMETER"));

        let orphan: Vec<_> = catalogue.index().find_by_notation("ORPHAN").collect();
        assert!(orphan[0].code_lists.is_empty());
        Ok(())
    }
}
