//! DRILLHOLE_LOCATION and DRILLHOLE_SURVEY.

use super::{SheetInput, concept_if_present, decimal_if_present, point, remark, walk_sheet};
use crate::error::ConversionResult;
use crate::graph::{self, GraphFragment};
use crate::namespaces::{QLDBORES, bore, ex, geo, mint, prov, roles, sdo, sosa, time, units};
use crate::registry::{Registries, RegistryKind};
use crate::vocab::CatalogueView;
use oxigraph::model::NamedOrBlankNode;

/// Bores, their collar geometry and drilling history.
pub fn locations(
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
) -> ConversionResult<GraphFragment> {
    let layout = &input.schema.drillhole_location;
    walk_sheet(layout, input, view, registries, |row, fragment, registries| {
        let id = row.require_text("DRILLHOLE_ID")?;
        let hole = mint(QLDBORES, id);
        let wkt = point(row, input.crs, "EASTING", "NORTHING", Some("ELEVATION"))?;

        fragment.typed(hole.clone(), bore::BORE);
        fragment.typed(hole.clone(), sosa::FEATURE_OF_INTEREST);
        fragment.add(hole.clone(), sdo::IDENTIFIER, graph::text(id));

        let geometry = fragment.blank();
        fragment.typed(geometry.clone(), geo::GEOMETRY);
        fragment.add(geometry.clone(), geo::AS_WKT, wkt);
        fragment.add(hole.clone(), geo::HAS_GEOMETRY, geometry);

        fragment.add(
            hole.clone(),
            sdo::DEPTH,
            graph::decimal(row.require_number("TOTAL_DEPTH")?),
        );
        decimal_if_present(fragment, hole.clone(), bore::HAS_TOTAL_DEPTH_LOGGER, row, "TOTAL_DEPTH_LOGGER");
        fragment.add(
            hole.clone(),
            bore::HAD_DRILLING_METHOD,
            row.require_concept("DRILL_TYPE")?.clone(),
        );
        fragment.add(
            hole.clone(),
            bore::HAS_DIAMETER,
            row.require_concept("DRILL_DIAMETER")?.clone(),
        );
        fragment.add(hole.clone(), bore::HAS_DIP, graph::decimal(row.require_number("DIP")?));
        fragment.add(
            hole.clone(),
            bore::HAS_AZIMUTH,
            graph::decimal(row.require_number("AZIMUTH")?),
        );
        concept_if_present(fragment, hole.clone(), bore::HAS_PURPOSE, row, "CURRENT_CLASS");

        let drilling = fragment.blank();
        fragment.typed(drilling.clone(), bore::DRILLING_TIME);
        fragment.add(
            drilling.clone(),
            prov::STARTED_AT_TIME,
            graph::date(row.require_date("DRILL_START_DATE")?),
        );
        fragment.add(
            drilling.clone(),
            prov::ENDED_AT_TIME,
            graph::date(row.require_date("DRILL_END_DATE")?),
        );
        fragment.add(hole.clone(), time::HAS_TIME, drilling);

        fragment.add(
            hole.clone(),
            ex::LOCATION_SURVEY_TYPE,
            row.require_concept("LOCATION_SURVEY_TYPE")?.clone(),
        );
        if let Some(company) = row.text("SURVEY_COMPANY") {
            fragment.attribution(hole.clone(), graph::text(company), roles::SURVEYER);
        }
        fragment.add(
            hole.clone(),
            ex::PRE_COLLAR_METHOD,
            row.require_concept("PRE_COLLAR_METHOD")?.clone(),
        );
        fragment.add(
            hole.clone(),
            ex::PRE_COLLAR_DEPTH,
            graph::decimal(row.require_number("PRE_COLLAR_DEPTH")?),
        );
        fragment.attribution(
            hole.clone(),
            graph::text(row.require_text("DRILL_CONTRACTOR")?),
            roles::DRILLER,
        );
        remark(fragment, hole.clone(), row);

        fragment.mark_part(hole.clone());
        registries.register(RegistryKind::Drillhole, id, hole, row.at("DRILLHOLE_ID"))
    })
}

/// Downhole surveys. Each row is one `bore:Survey` observation collection
/// holding a depth, azimuth, dip and optional magnetic field observation.
pub fn surveys(
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
) -> ConversionResult<GraphFragment> {
    let layout = &input.schema.drillhole_survey;
    walk_sheet(layout, input, view, registries, |row, fragment, registries| {
        let hole: NamedOrBlankNode = registries
            .lookup(RegistryKind::Drillhole, row.require_text("DRILLHOLE_ID")?, || {
                row.at("DRILLHOLE_ID")
            })?
            .clone()
            .into();

        let survey: NamedOrBlankNode = fragment.blank().into();
        fragment.typed(survey.clone(), bore::SURVEY);
        fragment.typed(survey.clone(), sosa::OBSERVATION_COLLECTION);
        fragment.add(hole.clone(), bore::HAD_SURVEY, survey.clone());
        fragment.add(survey.clone(), sosa::HAS_FEATURE_OF_INTEREST, hole.clone());
        fragment.add(
            survey.clone(),
            sosa::MADE_BY_SENSOR,
            row.require_concept("SURVEY_INSTRUMENT")?.clone(),
        );
        if let Some(company) = row.text("SURVEY_COMPANY") {
            fragment.attribution(survey.clone(), graph::text(company), roles::SURVEYER);
        }
        if let Some(date) = row.date("SURVEY_DATE") {
            let instant = fragment.blank();
            fragment.typed(instant.clone(), time::INSTANT);
            fragment.add(instant.clone(), time::IN_XSD_DATE, graph::date(date));
            fragment.add(survey.clone(), time::HAS_TIME, instant);
        }

        fragment.observation(
            &survey,
            &hole,
            bore::HAS_TOTAL_DEPTH,
            graph::decimal(row.require_number("SURVEY_DEPTH")?),
            Some(units::M),
        );
        let azimuth = fragment.observation(
            &survey,
            &hole,
            bore::HAS_AZIMUTH,
            graph::decimal(row.require_number("AZIMUTH")?),
            Some(units::DEG),
        );
        decimal_if_present(fragment, azimuth, sdo::MARGIN_OF_ERROR, row, "AZIMUTH_ACCURACY");
        let dip = fragment.observation(
            &survey,
            &hole,
            bore::HAS_DIP,
            graph::decimal(row.require_number("DIP")?),
            Some(units::DEG),
        );
        decimal_if_present(fragment, dip, sdo::MARGIN_OF_ERROR, row, "INCLINATION_ACCURACY");
        if let Some(field) = row.number("MAGNETIC_FIELD") {
            fragment.observation(
                &survey,
                &hole,
                ex::HAS_MAGNETIC_FIELD_STRENGTH,
                graph::decimal(field),
                Some(units::NANO_T),
            );
        }
        remark(fragment, survey, row);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConversionError;
    use crate::geometry::UtmZone;
    use crate::model::CellValue;
    use crate::template::{DRILLHOLE_LOCATION, DRILLHOLE_SURVEY, TEMPLATE_V3_0};
    use crate::vocab::catalogue::{Catalogue, Concept};
    use crate::workbook::MemoryWorkbook;
    use assert_matches::assert_matches;
    use oxigraph::model::NamedNode;

    fn iri(s: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.org/{s}"))
    }

    fn catalogue() -> Catalogue {
        Catalogue::new()
            .with_concept(Concept::new(iri("dd"), "DD").in_list("DRILL_TYPE"))
            .with_concept(Concept::new(iri("hq"), "HQ").in_list("DRILL_DIAMETER"))
            .with_concept(Concept::new(iri("gps"), "GPS").in_list("LOC_SURVEY_TYPE"))
            .with_concept(Concept::new(iri("gyro"), "GYRO").in_list("RPT_SURVEY_TYPE"))
    }

    fn location(book: &mut MemoryWorkbook, row: u32, id: &str) {
        let text = |s: &str| CellValue::Text(s.to_string());
        for (column, value) in [
            ("B", text(id)),
            ("C", CellValue::Number(500_000.0)),
            ("D", CellValue::Number(7_000_000.0)),
            ("E", CellValue::Number(250.0)),
            ("F", CellValue::Number(300.0)),
            ("H", text("DD")),
            ("I", text("HQ")),
            ("J", CellValue::Number(-60.0)),
            ("K", CellValue::Number(90.0)),
            ("M", text("2023-01-01")),
            ("N", text("2023-01-10")),
            ("O", text("GPS")),
            ("Q", text("DD")),
            ("R", CellValue::Number(0.0)),
            ("S", text("Drillers Ltd")),
        ] {
            book.set(DRILLHOLE_LOCATION, &format!("{column}{row}"), value);
        }
    }

    fn run(
        book: &MemoryWorkbook,
        registries: &mut Registries,
    ) -> ConversionResult<(GraphFragment, GraphFragment)> {
        let catalogue = catalogue();
        let view = CatalogueView::new(&catalogue);
        let dataset = iri("ds");
        let crs = UtmZone::default();
        let input = SheetInput {
            source: book,
            schema: &TEMPLATE_V3_0,
            dataset: &dataset,
            crs: &crs,
        };
        let holes = locations(&input, &view, registries)?;
        let surveys = surveys(&input, &view, registries)?;
        Ok((holes, surveys))
    }

    #[test]
    fn bores_carry_a_3d_collar() -> ConversionResult<()> {
        let mut book = MemoryWorkbook::new();
        location(&mut book, 9, "DD1");
        let mut registries = Registries::new();
        let (holes, _) = run(&book, &mut registries)?;
        let wkt = holes
            .graph()
            .iter()
            .find(|triple| triple.predicate == geo::AS_WKT)
            .map(|triple| triple.object.to_string());
        assert_matches!(wkt, Some(ref text) if text.contains("POINT Z (147 "));
        assert!(registries.get(RegistryKind::Drillhole).contains("DD1"));
        Ok(())
    }

    #[test]
    fn surveys_must_name_a_known_bore() {
        let mut book = MemoryWorkbook::new();
        location(&mut book, 9, "DD1");
        let text = |s: &str| CellValue::Text(s.to_string());
        book.set(DRILLHOLE_SURVEY, "B9", text("DD999"))
            .set(DRILLHOLE_SURVEY, "C9", text("GYRO"))
            .set(DRILLHOLE_SURVEY, "F9", CellValue::Number(50.0))
            .set(DRILLHOLE_SURVEY, "G9", CellValue::Number(91.0))
            .set(DRILLHOLE_SURVEY, "I9", CellValue::Number(-59.0));
        let err = run(&book, &mut Registries::new()).expect_err("dangling bore");
        assert_eq!(
            err.to_string(),
            "The value DD999 for DRILLHOLE_ID in row 9 of sheet DRILLHOLE_SURVEY is not present on the DRILLHOLE_LOCATION worksheet as required"
        );
    }

    #[test]
    fn missing_drill_type_is_reported_by_row() {
        let mut book = MemoryWorkbook::new();
        location(&mut book, 9, "DD1");
        book.clear(DRILLHOLE_LOCATION, "H9");
        assert_matches!(
            run(&book, &mut Registries::new()),
            Err(ConversionError::MissingRequiredField { at })
                if at.sheet == "DRILLHOLE_LOCATION" && at.row == 9 && at.field == "DRILL_TYPE"
        );
    }
}
