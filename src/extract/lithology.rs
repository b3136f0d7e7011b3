//! DRILLHOLE_LITHOLOGY and DRILLHOLE_STRUCTURE: downhole logging.
//!
//! Every logged interval (or structure depth) is an observation collection
//! on the bore; each populated attribute column becomes one member
//! observation.

use super::{SheetInput, remark, walk_sheet};
use crate::error::ConversionResult;
use crate::graph::{self, GraphFragment};
use crate::namespaces::{bore, ex, geosample, sdo, sosa, units};
use crate::registry::{Registries, RegistryKind};
use crate::rows::Row;
use crate::vocab::CatalogueView;
use oxigraph::model::{NamedNodeRef, NamedOrBlankNode};

/// Coded attribute columns and the property each one observes.
const LITHOLOGY_ATTRIBUTES: &[(&str, NamedNodeRef<'static>)] = &[
    ("WEATHERING", geosample::WEATHERING),
    ("COLOUR", geosample::COLOUR),
    ("GRAIN_SIZE", geosample::GRAIN_SIZE),
    ("TEXTURE", geosample::TEXTURE),
    ("ALT_TYPE", ex::ALTERATION_TYPE),
    ("ALT_INTENSITY", ex::ALTERATION_INTENSITY),
];

const ROCK_TYPES: &[&str] = &["ROCK_TYPE_CODE_1", "ROCK_TYPE_CODE_2"];

const MINERALS: &[(&str, &str)] = &[
    ("MINERAL_CODE_1", "MINERAL_PERCENT_1"),
    ("MINERAL_CODE_2", "MINERAL_PERCENT_2"),
];

pub fn lithology(
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
) -> ConversionResult<GraphFragment> {
    let layout = &input.schema.drillhole_lithology;
    walk_sheet(layout, input, view, registries, |row, fragment, registries| {
        let (hole, interval) = open_collection(fragment, row, registries)?;
        fragment.typed(interval.clone(), bore::BOREHOLE_INTERVAL);
        fragment.add(
            interval.clone(),
            ex::FROM_DEPTH,
            graph::decimal(row.require_number("FROM")?),
        );
        fragment.add(
            interval.clone(),
            ex::TO_DEPTH,
            graph::decimal(row.require_number("TO")?),
        );
        fragment.add(interval.clone(), sdo::UNIT_CODE, graph::iri(units::M));

        for field in ROCK_TYPES {
            let Some(code) = row.text(field) else {
                continue;
            };
            let rock = registries
                .lookup(RegistryKind::LithCode, code, || row.at(field))?
                .clone();
            fragment.observation(&interval, &hole, ex::ROCK_TYPE, rock, None);
        }
        for (field, property) in LITHOLOGY_ATTRIBUTES {
            if let Some(concept) = row.concept(field) {
                fragment.observation(&interval, &hole, *property, concept.clone(), None);
            }
        }
        for (code_field, percent_field) in MINERALS {
            let Some(code) = row.text(code_field) else {
                continue;
            };
            let mineral = registries
                .lookup(RegistryKind::MineralCode, code, || row.at(code_field))?
                .clone();
            let result = fragment.observation(&interval, &hole, ex::MINERAL, mineral, None);
            if let Some(percent) = row.number(percent_field) {
                fragment.add(result, ex::MINERAL_PERCENT, graph::decimal(percent));
            }
        }

        remark(fragment, interval, row);
        Ok(())
    })
}

pub fn structure(
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
) -> ConversionResult<GraphFragment> {
    let layout = &input.schema.drillhole_structure;
    walk_sheet(layout, input, view, registries, |row, fragment, registries| {
        let (hole, collection) = open_collection(fragment, row, registries)?;
        fragment.add(
            collection.clone(),
            ex::DEPTH,
            graph::decimal(row.require_number("DEPTH")?),
        );
        fragment.add(collection.clone(), sdo::UNIT_CODE, graph::iri(units::M));
        fragment.observation(
            &collection,
            &hole,
            geosample::STRUCTURE,
            row.require_concept("STRUCTURE_TYPE")?.clone(),
            None,
        );
        for (field, property) in [
            ("ALPHA_ANGLE", bore::HAS_ALPHA_ANGLE),
            ("BETA_ANGLE", bore::HAS_BETA_ANGLE),
            ("DIP", bore::HAS_DIP),
            ("DIP_DIRECTION", bore::HAS_DIP_DIRECTION),
        ] {
            if let Some(angle) = row.number(field) {
                fragment.observation(
                    &collection,
                    &hole,
                    property,
                    graph::decimal(angle),
                    Some(units::DEG),
                );
            }
        }
        remark(fragment, collection, row);
        Ok(())
    })
}

/// A new observation collection about the bore the row names.
fn open_collection(
    fragment: &mut GraphFragment,
    row: &Row,
    registries: &Registries,
) -> ConversionResult<(NamedOrBlankNode, NamedOrBlankNode)> {
    let hole: NamedOrBlankNode = registries
        .lookup(RegistryKind::Drillhole, row.require_text("DRILLHOLE_ID")?, || {
            row.at("DRILLHOLE_ID")
        })?
        .clone()
        .into();
    let collection: NamedOrBlankNode = fragment.blank().into();
    fragment.typed(collection.clone(), sosa::OBSERVATION_COLLECTION);
    fragment.add(collection.clone(), sosa::HAS_FEATURE_OF_INTEREST, hole.clone());
    Ok((hole, collection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConversionError, Provenance};
    use crate::geometry::UtmZone;
    use crate::model::CellValue;
    use crate::template::{DRILLHOLE_LITHOLOGY, DRILLHOLE_STRUCTURE, TEMPLATE_V3_0};
    use crate::vocab::catalogue::{Catalogue, Concept};
    use crate::workbook::MemoryWorkbook;
    use assert_matches::assert_matches;
    use oxigraph::model::{NamedNode, TermRef};

    fn iri(s: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.org/{s}"))
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn registries() -> Registries {
        let mut registries = Registries::new();
        for (kind, key) in [
            (RegistryKind::Drillhole, "DD1"),
            (RegistryKind::LithCode, "GRN"),
            (RegistryKind::MineralCode, "QZ"),
        ] {
            registries
                .register(kind, key, iri(key), Provenance::new("SEED", 1, "KEY"))
                .expect("seed registries");
        }
        registries
    }

    fn input<'a>(book: &'a MemoryWorkbook, dataset: &'a NamedNode, crs: &'a UtmZone) -> SheetInput<'a> {
        SheetInput {
            source: book,
            schema: &TEMPLATE_V3_0,
            dataset,
            crs,
        }
    }

    #[test]
    fn lithology_interval_observations() -> ConversionResult<()> {
        let catalogue =
            Catalogue::new().with_concept(Concept::new(iri("fresh"), "FR").in_list("WEATHERING"));
        let view = CatalogueView::new(&catalogue);
        let mut book = MemoryWorkbook::new();
        book.set(DRILLHOLE_LITHOLOGY, "B9", text("DD1"))
            .set(DRILLHOLE_LITHOLOGY, "C9", CellValue::Number(0.0))
            .set(DRILLHOLE_LITHOLOGY, "D9", CellValue::Number(4.5))
            .set(DRILLHOLE_LITHOLOGY, "E9", text("GRN"))
            .set(DRILLHOLE_LITHOLOGY, "G9", text("FR"))
            .set(DRILLHOLE_LITHOLOGY, "M9", text("QZ"))
            .set(DRILLHOLE_LITHOLOGY, "N9", CellValue::Number(20.0));
        let (dataset, crs) = (iri("ds"), UtmZone::default());
        let fragment = lithology(&input(&book, &dataset, &crs), &view, &mut registries())?;
        let members = fragment
            .graph()
            .iter()
            .filter(|triple| triple.predicate == sosa::HAS_MEMBER)
            .count();
        assert_eq!(members, 3);
        Ok(())
    }

    #[test]
    fn mineral_without_percentage_is_incomplete() {
        let catalogue = Catalogue::new();
        let view = CatalogueView::new(&catalogue);
        let mut book = MemoryWorkbook::new();
        book.set(DRILLHOLE_LITHOLOGY, "B9", text("DD1"))
            .set(DRILLHOLE_LITHOLOGY, "C9", CellValue::Number(0.0))
            .set(DRILLHOLE_LITHOLOGY, "D9", CellValue::Number(4.5))
            .set(DRILLHOLE_LITHOLOGY, "E9", text("GRN"))
            .set(DRILLHOLE_LITHOLOGY, "M9", text("QZ"));
        let (dataset, crs) = (iri("ds"), UtmZone::default());
        assert_matches!(
            lithology(&input(&book, &dataset, &crs), &view, &mut registries()),
            Err(ConversionError::MissingRequiredField { at }) if at.field == "MINERAL_PERCENT_1"
        );
    }

    #[test]
    fn structure_angles_are_degrees() -> ConversionResult<()> {
        let catalogue = Catalogue::new()
            .with_concept(Concept::new(iri("fault"), "FLT").in_list("STRUCTURE_TYPE"));
        let view = CatalogueView::new(&catalogue);
        let mut book = MemoryWorkbook::new();
        book.set(DRILLHOLE_STRUCTURE, "B9", text("DD1"))
            .set(DRILLHOLE_STRUCTURE, "C9", CellValue::Number(12.0))
            .set(DRILLHOLE_STRUCTURE, "D9", text("FLT"))
            .set(DRILLHOLE_STRUCTURE, "E9", CellValue::Number(45.0))
            .set(DRILLHOLE_STRUCTURE, "H9", CellValue::Number(270.0));
        let (dataset, crs) = (iri("ds"), UtmZone::default());
        let fragment = structure(&input(&book, &dataset, &crs), &view, &mut registries())?;
        let degrees = fragment
            .graph()
            .iter()
            .filter(|triple| triple.predicate == sdo::UNIT_CODE && triple.object == TermRef::NamedNode(units::DEG))
            .count();
        assert_eq!(degrees, 2);
        Ok(())
    }
}
