//! DATASET_METADATA: the `sdo:Dataset` node the rest of the graph hangs off.

use crate::error::{ConversionError, ConversionResult};
use crate::graph::{self, GraphFragment};
use crate::namespaces::{is_http_iri, prov, rdfs, sdo};
use crate::registry::Registries;
use crate::rows::read_fixed;
use crate::template::TemplateSchema;
use crate::vocab::CatalogueView;
use crate::workbook::CellSource;
use chrono::NaiveDate;
use oxigraph::model::NamedNode;
use tracing::{info, info_span, warn};
use uuid::Uuid;

/// Reads the fixed metadata cells and returns the Dataset fragment together
/// with the Dataset IRI.
///
/// The IRI is taken from `DATASET_IRI` when it is an http(s) IRI; otherwise
/// it is a UUIDv5 of the dataset name and creation date under `namespace`,
/// so reconverting the same workbook mints the same IRI.
pub fn extract(
    schema: &TemplateSchema,
    source: &dyn CellSource,
    view: &CatalogueView<'_>,
    namespace: &str,
) -> ConversionResult<(GraphFragment, NamedNode)> {
    let layout = &schema.dataset_metadata;
    let _span = info_span!("extract_sheet", sheet = layout.name).entered();
    if !source.has_sheet(layout.name) {
        return Err(ConversionError::MissingSheet {
            sheet: layout.name.to_string(),
        });
    }

    let row = read_fixed(layout, source, view, &Registries::new())?;
    let name = row.require_text("NAME")?;
    let created = row.require_date("DATE_CREATED")?;

    let dataset = match row.text("DATASET_IRI") {
        Some(iri) if is_http_iri(iri) => NamedNode::new(iri)
            .map_err(|_| ConversionError::invalid(row.at("DATASET_IRI"), iri, "an http(s) IRI"))?,
        Some(other) => {
            warn!(value = other, "DATASET_IRI is not an http(s) IRI, minting one");
            mint_dataset_iri(namespace, name, created)
        }
        None => mint_dataset_iri(namespace, name, created),
    };

    let mut fragment = GraphFragment::new(layout.name);
    fragment.typed(dataset.clone(), sdo::DATASET);
    fragment.add(dataset.clone(), sdo::NAME, graph::text(name));
    fragment.add(
        dataset.clone(),
        sdo::DESCRIPTION,
        graph::text(row.require_text("DESCRIPTION")?),
    );
    fragment.add(dataset.clone(), sdo::DATE_CREATED, graph::date(created));
    fragment.add(
        dataset.clone(),
        sdo::DATE_MODIFIED,
        graph::date(row.require_date("DATE_MODIFIED")?),
    );

    let author = row.require_text("AUTHOR")?;
    match view.resolve_any(author) {
        Some(agent) => fragment.add(dataset.clone(), sdo::CREATOR, agent),
        None => {
            warn!(author, "AUTHOR is not a known agent code, recording it by name");
            let agent = fragment.blank();
            fragment.typed(agent.clone(), prov::AGENT_CLASS);
            fragment.add(agent.clone(), rdfs::LABEL, graph::text(author));
            fragment.add(dataset.clone(), sdo::CREATOR, agent);
        }
    }

    info!(dataset = dataset.as_str(), "dataset metadata extracted");
    Ok((fragment, dataset))
}

fn mint_dataset_iri(namespace: &str, name: &str, created: NaiveDate) -> NamedNode {
    let separator = if namespace.ends_with('/') || namespace.ends_with('#') {
        ""
    } else {
        "/"
    };
    let seed = format!("{namespace}{separator}{name}|{created}");
    let id = Uuid::new_v5(&Uuid::NAMESPACE_URL, seed.as_bytes());
    NamedNode::new_unchecked(format!("{namespace}{separator}{id}"))
}
