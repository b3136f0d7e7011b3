//! Graph fragments emitted by sheet extractors.
//!
//! Blank nodes are labelled `{prefix}{n}` from a per-fragment counter so that
//! the same workbook always yields the same labels.

use crate::model::{format_number, Measurement};
use crate::namespaces::{prov, rdf, sdo, sosa, xsd};
use chrono::NaiveDate;
use indexmap::IndexSet;
use oxigraph::model::{
    BlankNode, Graph, Literal, NamedNode, NamedNodeRef, NamedOrBlankNode, Term, Triple,
};

#[derive(Debug, Clone)]
pub struct GraphFragment {
    prefix: String,
    next_blank: u64,
    graph: Graph,
    /// Entities to be linked to the Dataset with `sdo:hasPart`
    parts: IndexSet<NamedOrBlankNode>,
}

impl GraphFragment {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase(),
            next_blank: 0,
            graph: Graph::new(),
            parts: IndexSet::new(),
        }
    }

    pub fn blank(&mut self) -> BlankNode {
        self.next_blank += 1;
        BlankNode::new_unchecked(format!("{}{}", self.prefix, self.next_blank))
    }

    pub fn add(
        &mut self,
        subject: impl Into<NamedOrBlankNode>,
        predicate: NamedNodeRef<'_>,
        object: impl Into<Term>,
    ) {
        let triple = Triple::new(subject, predicate.into_owned(), object);
        self.graph.insert(&triple);
    }

    pub fn typed(&mut self, subject: impl Into<NamedOrBlankNode>, class: NamedNodeRef<'_>) {
        self.add(subject, rdf::TYPE, class.into_owned());
    }

    /// Links `subject` to a fresh `prov:qualifiedAttribution` naming `agent`
    /// in `role`.
    pub fn attribution(
        &mut self,
        subject: impl Into<NamedOrBlankNode>,
        agent: impl Into<Term>,
        role: NamedNodeRef<'_>,
    ) {
        let qualified = self.blank();
        self.add(subject, prov::QUALIFIED_ATTRIBUTION, qualified.clone());
        self.add(qualified.clone(), prov::AGENT, agent);
        self.add(qualified, prov::HAD_ROLE, role.into_owned());
    }

    /// Adds a `sosa:Observation` of `property` on `feature` as a member of
    /// `collection`, returning the result node for the caller to decorate.
    pub fn observation(
        &mut self,
        collection: &NamedOrBlankNode,
        feature: &NamedOrBlankNode,
        property: NamedNodeRef<'_>,
        value: impl Into<Term>,
        unit: Option<NamedNodeRef<'_>>,
    ) -> BlankNode {
        let observation = self.blank();
        let result = self.blank();
        self.typed(observation.clone(), sosa::OBSERVATION);
        self.add(collection.clone(), sosa::HAS_MEMBER, observation.clone());
        self.add(observation.clone(), sosa::OBSERVED_PROPERTY, property.into_owned());
        self.add(observation.clone(), sosa::HAS_FEATURE_OF_INTEREST, feature.clone());
        self.add(observation, sosa::HAS_RESULT, result.clone());
        self.add(result.clone(), sdo::VALUE, value);
        if let Some(unit) = unit {
            self.add(result.clone(), sdo::UNIT_CODE, unit.into_owned());
        }
        result
    }

    pub fn mark_part(&mut self, node: impl Into<NamedOrBlankNode>) {
        self.parts.insert(node.into());
    }

    pub fn parts(&self) -> impl Iterator<Item = &NamedOrBlankNode> {
        self.parts.iter()
    }

    pub fn merge(&mut self, other: GraphFragment) {
        for triple in other.graph.iter() {
            self.graph.insert(triple);
        }
        for part in other.parts {
            self.parts.insert(part);
        }
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }
}

// =============================================================================
// LITERALS
// =============================================================================

pub fn text(value: impl Into<String>) -> Literal {
    Literal::new_simple_literal(value)
}

pub fn english(value: impl Into<String>) -> Literal {
    Literal::new_language_tagged_literal_unchecked(value, "en")
}

pub fn decimal(value: f64) -> Literal {
    Literal::new_typed_literal(format_number(value), xsd::DECIMAL)
}

pub fn integer(value: i64) -> Literal {
    Literal::new_typed_literal(value.to_string(), xsd::INTEGER)
}

pub fn date(value: NaiveDate) -> Literal {
    Literal::new_typed_literal(value.format("%Y-%m-%d").to_string(), xsd::DATE)
}

pub fn boolean(value: bool) -> Literal {
    Literal::new_typed_literal(value.to_string(), xsd::BOOLEAN)
}

pub fn measurement(value: &Measurement) -> Literal {
    decimal(value.value)
}

/// Converts an IRI constant into an object term.
pub fn iri(node: NamedNodeRef<'_>) -> NamedNode {
    node.into_owned()
}
