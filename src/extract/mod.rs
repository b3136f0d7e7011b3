//! Sheet extractors
//!
//! Each extractor walks one worksheet layout, turns every validated row into
//! triples and registers the keys later sheets may reference. Extractors
//! never read the workbook directly; they only see [`Row`]s produced by the
//! row walker.

pub mod drillhole;
pub mod geochemistry;
pub mod lithology;
pub mod metadata;
pub mod preparation;
pub mod sample;
pub mod tenement;
pub mod user_codes;

use crate::error::{ConversionError, ConversionResult};
use crate::geometry::{self, UtmZone};
use crate::graph::{self, GraphFragment};
use crate::namespaces::{mint, rdfs, skos};
use crate::registry::Registries;
use crate::rows::{Row, RowWalker};
use crate::template::{SheetLayout, TemplateSchema};
use crate::vocab::CatalogueView;
use crate::workbook::CellSource;
use oxigraph::model::{Literal, NamedNode, NamedNodeRef, NamedOrBlankNode};
use tracing::{debug, info, info_span};

/// What every extractor after the metadata stage shares.
#[derive(Clone, Copy)]
pub struct SheetInput<'a> {
    pub source: &'a dyn CellSource,
    pub schema: &'static TemplateSchema,
    pub dataset: &'a NamedNode,
    pub crs: &'a UtmZone,
}

impl SheetInput<'_> {
    /// `{dataset}/{path}`
    pub fn collection(&self, path: &str) -> NamedNode {
        NamedNode::new_unchecked(format!(
            "{}/{path}",
            self.dataset.as_str().trim_end_matches('/')
        ))
    }

    /// `{dataset}/{path}/{key}` with `key` percent-encoded.
    pub fn scoped(&self, path: &str, key: &str) -> NamedNode {
        mint(&format!("{}/", self.collection(path).as_str()), key)
    }
}

/// Walks `layout` and hands each validated row to `build`.
pub(crate) fn walk_sheet<F>(
    layout: &SheetLayout,
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
    mut build: F,
) -> ConversionResult<GraphFragment>
where
    F: FnMut(&Row, &mut GraphFragment, &mut Registries) -> ConversionResult<()>,
{
    let span = info_span!("extract_sheet", sheet = layout.name);
    let _guard = span.enter();

    let mut fragment = GraphFragment::new(layout.name);
    let mut walker = RowWalker::new(layout, input.source);
    while let Some(row) = walker.next_row(view, registries)? {
        build(&row, &mut fragment, registries)?;
        debug!(row = row.number, "row committed");
    }

    if walker.rows_read() == 0 {
        debug!("no data rows");
    } else {
        info!(
            rows = walker.rows_read(),
            triples = fragment.len(),
            "sheet extracted"
        );
    }
    Ok(fragment)
}

// =============================================================================
// SHARED ROW HELPERS
// =============================================================================

pub(crate) fn remark(fragment: &mut GraphFragment, subject: impl Into<NamedOrBlankNode>, row: &Row) {
    if let Some(remark) = row.text("REMARK") {
        fragment.add(subject, rdfs::COMMENT, graph::text(remark));
    }
}

pub(crate) fn decimal_if_present(
    fragment: &mut GraphFragment,
    subject: impl Into<NamedOrBlankNode>,
    predicate: NamedNodeRef<'_>,
    row: &Row,
    field: &str,
) {
    if let Some(value) = row.number(field) {
        fragment.add(subject, predicate, graph::decimal(value));
    }
}

pub(crate) fn concept_if_present(
    fragment: &mut GraphFragment,
    subject: impl Into<NamedOrBlankNode>,
    predicate: NamedNodeRef<'_>,
    row: &Row,
    field: &str,
) {
    if let Some(concept) = row.concept(field) {
        fragment.add(subject, predicate, concept.clone());
    }
}

pub(crate) fn date_if_present(
    fragment: &mut GraphFragment,
    subject: impl Into<NamedOrBlankNode>,
    predicate: NamedNodeRef<'_>,
    row: &Row,
    field: &str,
) {
    if let Some(date) = row.date(field) {
        fragment.add(subject, predicate, graph::date(date));
    }
}

pub(crate) fn concept_scheme(fragment: &mut GraphFragment, scheme: &NamedNode, title: &str) {
    fragment.typed(scheme.clone(), skos::CONCEPT_SCHEME);
    fragment.add(scheme.clone(), skos::PREF_LABEL, graph::english(title));
}

/// Projects the `easting`/`northing` (and optional `elevation`) fields of
/// `row`, reporting projection failures against the easting cell.
pub(crate) fn point(
    row: &Row,
    crs: &UtmZone,
    easting: &str,
    northing: &str,
    elevation: Option<&str>,
) -> ConversionResult<Literal> {
    let x = row.require_number(easting)?;
    let y = row.require_number(northing)?;
    let z = elevation.and_then(|field| row.number(field));
    geometry::build_point(x, y, z, crs).map_err(|err| ConversionError::Projection {
        at: row.at(easting),
        reason: err.reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TEMPLATE_V3_0;
    use crate::workbook::MemoryWorkbook;

    #[test]
    fn scoped_iris_hang_off_the_dataset() {
        let book = MemoryWorkbook::new();
        let dataset = NamedNode::new_unchecked("http://example.com/dataset/abc/");
        let crs = UtmZone::default();
        let input = SheetInput {
            source: &book,
            schema: &TEMPLATE_V3_0,
            dataset: &dataset,
            crs: &crs,
        };
        assert_eq!(
            input.collection("user-vocab").as_str(),
            "http://example.com/dataset/abc/user-vocab"
        );
        assert_eq!(
            input.scoped("job", "JOB 1").as_str(),
            "http://example.com/dataset/abc/job/JOB-1"
        );
    }
}
