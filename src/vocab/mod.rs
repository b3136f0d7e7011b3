//! Controlled vocabulary: the reference catalogue, run-scoped deltas and
//! the code resolver that sheet extractors call for every coded field.

pub mod catalogue;

pub use catalogue::{Catalogue, Concept, ConceptIndex, VocabularyDelta};

use crate::error::{ConversionError, Provenance};
use oxigraph::model::NamedNode;
use thiserror::Error;

/// Why a code failed to resolve. The caller attaches provenance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("code {code} is not a known notation")]
    NotFound { code: String, code_list: String },

    #[error("code {code} is not in {code_list} (found in {found})")]
    Mismatch {
        code: String,
        code_list: String,
        found: String,
    },
}

impl ResolveError {
    pub fn at(self, at: Provenance) -> ConversionError {
        match self {
            ResolveError::NotFound { code, code_list } => ConversionError::CodeNotFound {
                at,
                code,
                code_list,
            },
            ResolveError::Mismatch {
                code,
                code_list,
                found,
            } => ConversionError::CodeListMismatch {
                at,
                code,
                code_list,
                found,
            },
        }
    }
}

/// The reference catalogue plus every delta folded in during this run.
///
/// Lookups consult the catalogue first, then the run's own concepts.
#[derive(Debug, Clone)]
pub struct CatalogueView<'a> {
    base: &'a Catalogue,
    delta: VocabularyDelta,
}

impl<'a> CatalogueView<'a> {
    pub fn new(base: &'a Catalogue) -> Self {
        Self {
            base,
            delta: VocabularyDelta::new(),
        }
    }

    pub fn fold(&mut self, delta: VocabularyDelta) {
        self.delta.merge(delta);
    }

    pub fn delta(&self) -> &VocabularyDelta {
        &self.delta
    }

    fn indexes(&self) -> [&ConceptIndex; 2] {
        [self.base.index(), &self.delta.index]
    }

    fn find<'s>(&'s self, code: &'s str) -> impl Iterator<Item = &'s Concept> + 's {
        self.indexes()
            .into_iter()
            .flat_map(move |index| index.find_by_notation(code))
    }

    /// Resolves `code` to the IRI of a concept that belongs to `code_list`.
    pub fn resolve(&self, code: &str, code_list: &str) -> Result<NamedNode, ResolveError> {
        let code = code.trim();
        let mut found_in: Vec<String> = Vec::new();
        for concept in self.find(code) {
            if concept.code_lists.contains(code_list) {
                return Ok(concept.iri.clone());
            }
            for list in &concept.code_lists {
                if !found_in.contains(list) {
                    found_in.push(list.clone());
                }
            }
        }

        if self.find(code).next().is_none() {
            return Err(ResolveError::NotFound {
                code: code.to_string(),
                code_list: code_list.to_string(),
            });
        }
        let found = if found_in.is_empty() {
            "no code list".to_string()
        } else {
            found_in.join(", ")
        };
        Err(ResolveError::Mismatch {
            code: code.to_string(),
            code_list: code_list.to_string(),
            found,
        })
    }

    /// Resolves `code` without a code-list constraint.
    pub fn resolve_any(&self, code: &str) -> Option<NamedNode> {
        self.find(code.trim()).next().map(|concept| concept.iri.clone())
    }

    pub fn has_code_list(&self, notation: &str) -> bool {
        self.code_list(notation).is_some()
    }

    pub fn code_list(&self, notation: &str) -> Option<&NamedNode> {
        self.indexes()
            .into_iter()
            .find_map(|index| index.code_list(notation))
    }

    pub fn has_notation(&self, code: &str) -> bool {
        self.find(code.trim()).next().is_some()
    }
}
