//! TENEMENT: mining tenements, their holders, operators and areas.

use super::{SheetInput, point, remark, walk_sheet};
use crate::error::ConversionResult;
use crate::graph::{self, GraphFragment};
use crate::namespaces::{TENEMENTS, geo, mint, rdfs, roles, sdo, tenement};
use crate::registry::{Registries, RegistryKind};
use crate::vocab::CatalogueView;
use oxigraph::model::Literal;

pub fn extract(
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
) -> ConversionResult<GraphFragment> {
    let layout = &input.schema.tenement;
    walk_sheet(layout, input, view, registries, |row, fragment, registries| {
        let number = row.require_text("TENEMENT_NO")?;
        let iri = mint(TENEMENTS, number);

        fragment.typed(iri.clone(), tenement::TENEMENT);
        fragment.add(
            iri.clone(),
            sdo::ADDITIONAL_TYPE,
            row.require_concept("TENEMENT_TYPE")?.clone(),
        );
        fragment.attribution(
            iri.clone(),
            graph::text(row.require_text("TENEMENT_HOLDER")?),
            roles::TENEMENT_HOLDER,
        );
        fragment.attribution(
            iri.clone(),
            graph::text(row.require_text("TENEMENT_OPERATOR")?),
            roles::TENEMENT_OPERATOR,
        );
        fragment.add(
            iri.clone(),
            tenement::HAS_PROJECT,
            graph::text(row.require_text("PROJECT_NAME")?),
        );

        let area = fragment.blank();
        fragment.typed(area.clone(), geo::FEATURE);
        fragment.typed(area.clone(), tenement::TENEMENT_AREA);
        fragment.add(iri.clone(), sdo::LOCATION, area.clone());

        let geometry = fragment.blank();
        fragment.typed(geometry.clone(), geo::GEOMETRY);
        fragment.add(area, geo::HAS_GEOMETRY, geometry.clone());
        fragment.add(
            geometry.clone(),
            rdfs::COMMENT,
            graph::text(format!("CRS is {}", row.require_text("GEODETIC_DATUM")?)),
        );
        // map sheet numbers may be a comma separated list
        for sheet in row
            .require_text("MAP_SHEET_NO")?
            .split(',')
            .map(str::trim)
            .filter(|sheet| !sheet.is_empty())
        {
            fragment.add(
                geometry.clone(),
                sdo::IDENTIFIER,
                Literal::new_typed_literal(sheet, tenement::MAP_SHEET),
            );
        }
        if row.has("EASTING") {
            let wkt = point(row, input.crs, "EASTING", "NORTHING", None)?;
            fragment.add(geometry, geo::AS_WKT, wkt);
        }

        remark(fragment, iri.clone(), row);
        fragment.mark_part(iri.clone());
        registries.register(RegistryKind::Tenement, number, iri, row.at("TENEMENT_NO"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConversionError;
    use crate::geometry::UtmZone;
    use crate::model::CellValue;
    use crate::template::{TEMPLATE_V3_0, TENEMENT};
    use crate::vocab::catalogue::{Catalogue, Concept};
    use crate::workbook::MemoryWorkbook;
    use assert_matches::assert_matches;
    use oxigraph::model::NamedNode;

    fn iri(s: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.org/{s}"))
    }

    fn book() -> MemoryWorkbook {
        let mut book = MemoryWorkbook::new();
        for (column, value) in [
            ("B", "EPM"),
            ("C", "EPM 26000"),
            ("D", "Holder Pty Ltd"),
            ("E", "Project X"),
            ("F", "Operator Pty Ltd"),
            ("G", "GDA94"),
            ("H", "7560, 7561"),
        ] {
            book.set(TENEMENT, &format!("{column}9"), CellValue::Text(value.into()));
        }
        book
    }

    fn catalogue() -> Catalogue {
        Catalogue::new()
            .with_concept(Concept::new(iri("epm"), "EPM").in_list("LEASE_NAME"))
            .with_concept(Concept::new(iri("gda94"), "GDA94").in_list("COORD_SYS_ID"))
    }

    #[test]
    fn tenement_becomes_a_dataset_part() -> ConversionResult<()> {
        let catalogue = catalogue();
        let view = CatalogueView::new(&catalogue);
        let book = book();
        let dataset = iri("ds");
        let crs = UtmZone::default();
        let input = SheetInput {
            source: &book,
            schema: &TEMPLATE_V3_0,
            dataset: &dataset,
            crs: &crs,
        };
        let mut registries = Registries::new();
        let fragment = extract(&input, &view, &mut registries)?;

        let tenement = mint(TENEMENTS, "EPM 26000");
        assert_eq!(tenement.as_str(), format!("{TENEMENTS}EPM-26000"));
        assert_eq!(fragment.parts().count(), 1);
        assert!(registries.get(RegistryKind::Tenement).contains("EPM 26000"));
        Ok(())
    }

    #[test]
    fn half_a_coordinate_is_missing_the_other_half() {
        let catalogue = catalogue();
        let view = CatalogueView::new(&catalogue);
        let mut book = book();
        book.set(TENEMENT, "J9", CellValue::Number(500_000.0));
        let dataset = iri("ds");
        let crs = UtmZone::default();
        let input = SheetInput {
            source: &book,
            schema: &TEMPLATE_V3_0,
            dataset: &dataset,
            crs: &crs,
        };
        assert_matches!(
            extract(&input, &view, &mut Registries::new()),
            Err(ConversionError::MissingRequiredField { at }) if at.field == "NORTHING"
        );
    }
}
