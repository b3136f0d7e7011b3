//! DRILLHOLE_SAMPLE and SURFACE_SAMPLE.
//!
//! Both sheets register into the same sample registry, so a sample ID used
//! on either sheet may be defined only once across the pair.

use super::{
    SheetInput, concept_if_present, date_if_present, decimal_if_present, point, remark,
    walk_sheet,
};
use crate::error::ConversionResult;
use crate::graph::{self, GraphFragment};
use crate::namespaces::{SAMPLES, bore, ex, geo, geosample, mint, sdo, sosa, units};
use crate::registry::{Registries, RegistryKind};
use crate::rows::Row;
use crate::vocab::CatalogueView;
use oxigraph::model::NamedNode;

pub fn drillhole_samples(
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
) -> ConversionResult<GraphFragment> {
    let layout = &input.schema.drillhole_sample;
    walk_sheet(layout, input, view, registries, |row, fragment, registries| {
        let id = row.require_text("SAMPLE_ID")?;
        let sample = mint(SAMPLES, id);
        let hole = registries
            .lookup(RegistryKind::Drillhole, row.require_text("DRILLHOLE_ID")?, || {
                row.at("DRILLHOLE_ID")
            })?
            .clone();

        fragment.typed(sample.clone(), sosa::SAMPLE);
        fragment.typed(sample.clone(), sosa::FEATURE_OF_INTEREST);
        fragment.add(sample.clone(), sdo::IDENTIFIER, graph::text(id));
        fragment.add(sample.clone(), sosa::IS_SAMPLE_OF, hole);
        fragment.add(
            sample.clone(),
            ex::SAMPLE_TYPE,
            row.require_concept("SAMPLE_TYPE")?.clone(),
        );

        let interval = fragment.blank();
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
        fragment.add(sample.clone(), sdo::LOCATION, interval);

        shared(fragment, &sample, row)?;
        fragment.mark_part(sample.clone());
        registries.register(RegistryKind::Sample, id, sample, row.at("SAMPLE_ID"))
    })
}

pub fn surface_samples(
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
) -> ConversionResult<GraphFragment> {
    let layout = &input.schema.surface_sample;
    walk_sheet(layout, input, view, registries, |row, fragment, registries| {
        let id = row.require_text("SAMPLE_ID")?;
        let sample = mint(SAMPLES, id);
        let wkt = point(row, input.crs, "EASTING", "NORTHING", Some("ELEVATION"))?;

        fragment.typed(sample.clone(), sosa::SAMPLE);
        fragment.typed(sample.clone(), sosa::FEATURE_OF_INTEREST);
        fragment.add(sample.clone(), sdo::IDENTIFIER, graph::text(id));
        fragment.add(
            sample.clone(),
            geosample::MATERIAL,
            row.require_concept("SAMPLE_MATERIAL")?.clone(),
        );
        fragment.add(
            sample.clone(),
            ex::SAMPLE_TYPE,
            row.require_concept("SAMPLE_TYPE_SURFACE")?.clone(),
        );
        concept_if_present(fragment, sample.clone(), ex::MESH_SIZE, row, "MESH_SIZE");
        decimal_if_present(fragment, sample.clone(), ex::SAMPLE_DEPTH, row, "SOIL_SAMPLE_DEPTH");
        concept_if_present(fragment, sample.clone(), geosample::COLOUR, row, "SOIL_COLOUR");
        decimal_if_present(fragment, sample.clone(), ex::SOIL_PH, row, "SOIL_PH");

        let geometry = fragment.blank();
        fragment.typed(geometry.clone(), geo::GEOMETRY);
        fragment.add(geometry.clone(), geo::AS_WKT, wkt);
        fragment.add(sample.clone(), geo::HAS_GEOMETRY, geometry);
        fragment.add(
            sample.clone(),
            ex::LOCATION_SURVEY_TYPE,
            row.require_concept("LOCATION_SURVEY_TYPE")?.clone(),
        );

        shared(fragment, &sample, row)?;
        fragment.mark_part(sample.clone());
        registries.register(RegistryKind::Sample, id, sample, row.at("SAMPLE_ID"))
    })
}

/// Columns both sample sheets carry.
fn shared(fragment: &mut GraphFragment, sample: &NamedNode, row: &Row) -> ConversionResult<()> {
    fragment.add(
        sample.clone(),
        ex::COLLECTION_DATE,
        graph::date(row.require_date("COLLECTION_DATE")?),
    );
    date_if_present(fragment, sample.clone(), ex::DISPATCH_DATE, row, "DISPATCH_DATE");
    concept_if_present(fragment, sample.clone(), ex::INSTRUMENT_TYPE, row, "INSTRUMENT_TYPE");
    decimal_if_present(fragment, sample.clone(), ex::SPECIFIC_GRAVITY, row, "SPECIFIC_GRAVITY");
    decimal_if_present(
        fragment,
        sample.clone(),
        ex::MAGNETIC_SUSCEPTIBILITY,
        row,
        "MAGNETIC_SUSCEPTIBILITY",
    );
    remark(fragment, sample.clone(), row);
    Ok(())
}
