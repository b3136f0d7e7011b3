//! GEOCHEMISTRY_META / SAMPLE_GEOCHEMISTRY and QAQC_META / QAQC_GEOCHEMISTRY
//!
//! The meta sheets describe one analytical method per (job, assay code,
//! analyte) triple: its unit, detection limits and accuracy. Result rows must
//! name a method their meta sheet declared; the result is recorded as a
//! `sosa:Observation` in the job's observation collection.

use super::{SheetInput, decimal_if_present, remark, walk_sheet};
use crate::error::{ConversionError, ConversionResult, Provenance};
use crate::graph::{self, GraphFragment};
use crate::model::{Censor, Measurement};
use crate::namespaces::{SAMPLES, encode_segment, ex, mint, roles, sdo, sosa};
use crate::registry::{Registries, RegistryKind};
use crate::rows::Row;
use crate::template::SheetLayout;
use crate::vocab::CatalogueView;
use indexmap::IndexMap;
use oxigraph::model::{NamedNode, NamedOrBlankNode};

type MethodKey = (String, String, String);

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub iri: NamedNode,
    pub unit: NamedNode,
    pub defined_at: Provenance,
}

/// Methods of one meta sheet, keyed by job, assay code and analyte.
#[derive(Debug, Clone)]
pub struct MethodTable {
    sheet: &'static str,
    methods: IndexMap<MethodKey, Method>,
}

impl MethodTable {
    pub fn new(sheet: &'static str) -> Self {
        Self {
            sheet,
            methods: IndexMap::new(),
        }
    }

    pub fn get(&self, job: &str, assay: &str, analyte: &str) -> Option<&Method> {
        self.methods
            .get(&(job.to_string(), assay.to_string(), analyte.to_string()))
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// The method a result row names, or `UnknownReference` against the
    /// meta sheet.
    fn method_for(&self, row: &Row) -> ConversionResult<&Method> {
        let (job, assay, analyte) = method_key(row)?;
        self.get(job, assay, analyte).ok_or_else(|| {
            ConversionError::unknown_reference(
                row.at("ANALYTE_CODE"),
                format!("{job}/{assay}/{analyte}"),
                format!("the {} worksheet", self.sheet),
            )
        })
    }
}

fn method_key(row: &Row) -> ConversionResult<(&str, &str, &str)> {
    Ok((
        row.require_text("JOB_NUMBER")?,
        row.require_text("ASSAY_CODE")?,
        row.require_text("ANALYTE_CODE")?,
    ))
}

// =============================================================================
// META SHEETS
// =============================================================================

pub fn geochemistry_meta(
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
) -> ConversionResult<(GraphFragment, MethodTable)> {
    methods(&input.schema.geochemistry_meta, "method", input, view, registries)
}

pub fn qaqc_meta(
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
) -> ConversionResult<(GraphFragment, MethodTable)> {
    methods(&input.schema.qaqc_meta, "qaqc-method", input, view, registries)
}

fn methods(
    layout: &SheetLayout,
    path: &str,
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
) -> ConversionResult<(GraphFragment, MethodTable)> {
    let mut table = MethodTable::new(layout.name);
    let fragment = walk_sheet(layout, input, view, registries, |row, fragment, registries| {
        let (job_number, assay, analyte) = method_key(row)?;
        let key = (
            job_number.to_string(),
            assay.to_string(),
            analyte.to_string(),
        );
        if let Some(first) = table.methods.get(&key) {
            return Err(ConversionError::DuplicateKey {
                at: row.at("ANALYTE_CODE"),
                value: format!("{job_number}/{assay}/{analyte}"),
                first: first.defined_at.clone(),
            });
        }

        let job = registries
            .lookup(RegistryKind::Job, job_number, || row.at("JOB_NUMBER"))?
            .clone();
        let lab = registries
            .lookup(RegistryKind::Laboratory, row.require_text("LABORATORY_NAME")?, || {
                row.at("LABORATORY_NAME")
            })?
            .clone();
        let assay_code = registries
            .lookup(RegistryKind::AssayCode, assay, || row.at("ASSAY_CODE"))?
            .clone();
        let analyte_code = registries
            .lookup(RegistryKind::Analyte, analyte, || row.at("ANALYTE_CODE"))?
            .clone();
        let unit = row.require_concept("UNIT_CODE")?.clone();

        let method = NamedNode::new_unchecked(format!(
            "{}/{}/{}",
            input.scoped(path, job_number).as_str(),
            encode_segment(assay),
            encode_segment(analyte)
        ));
        fragment.typed(method.clone(), sosa::PROCEDURE);
        fragment.add(
            method.clone(),
            sdo::IDENTIFIER,
            graph::text(format!("{job_number}/{assay}/{analyte}")),
        );
        fragment.add(job, sosa::USED_PROCEDURE, method.clone());
        fragment.add(method.clone(), ex::ASSAY, assay_code);
        fragment.add(method.clone(), sosa::OBSERVED_PROPERTY, analyte_code);
        fragment.add(method.clone(), sdo::UNIT_CODE, unit.clone());
        fragment.add(
            method.clone(),
            ex::DETECTION_LIMIT,
            graph::decimal(row.require_number("DETECTION_LIMIT")?),
        );
        decimal_if_present(
            fragment,
            method.clone(),
            ex::UPPER_DETECTION_LIMIT,
            row,
            "UPPER_DETECTION_LIMIT",
        );
        fragment.add(
            method.clone(),
            ex::ACCURACY,
            graph::decimal(row.require_number("ACCURACY")?),
        );
        decimal_if_present(fragment, method.clone(), ex::PRECISION, row, "PRECISION");
        fragment.attribution(method.clone(), lab, roles::SAMPLE_ANALYSER);
        remark(fragment, method.clone(), row);

        table.methods.insert(
            key,
            Method {
                iri: method,
                unit,
                defined_at: row.at("ANALYTE_CODE"),
            },
        );
        Ok(())
    })?;
    Ok((fragment, table))
}

// =============================================================================
// RESULTS
// =============================================================================

pub fn sample_geochemistry(
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
    methods: &MethodTable,
) -> ConversionResult<GraphFragment> {
    let layout = &input.schema.sample_geochemistry;
    walk_sheet(layout, input, view, registries, |row, fragment, registries| {
        let method = methods.method_for(row)?;
        let sample = registries
            .lookup(RegistryKind::Sample, row.require_text("SAMPLE_ID")?, || {
                row.at("SAMPLE_ID")
            })?
            .clone();
        observe(fragment, row, registries, method, sample.into())
    })
}

pub fn qaqc_geochemistry(
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
    methods: &MethodTable,
) -> ConversionResult<GraphFragment> {
    let layout = &input.schema.qaqc_geochemistry;
    walk_sheet(layout, input, view, registries, |row, fragment, registries| {
        let method = methods.method_for(row)?;
        let sample = mint(SAMPLES, row.require_text("SAMPLE_ID")?);
        fragment.typed(sample.clone(), sosa::SAMPLE);
        fragment.add(
            sample.clone(),
            sosa::IS_SAMPLE_OF,
            mint(SAMPLES, row.require_text("STANDARD_ID")?),
        );
        if let Some(kind) = row.concept("QAQC_TYPE") {
            fragment.add(sample.clone(), ex::QAQC_TYPE, kind.clone());
        }
        observe(fragment, row, registries, method, sample.into())
    })
}

/// Records one result row as an observation in its job's collection.
fn observe(
    fragment: &mut GraphFragment,
    row: &Row,
    registries: &Registries,
    method: &Method,
    feature: NamedOrBlankNode,
) -> ConversionResult<()> {
    let job = registries
        .lookup(RegistryKind::Job, row.require_text("JOB_NUMBER")?, || {
            row.at("JOB_NUMBER")
        })?
        .clone();
    let analyte = registries
        .lookup(RegistryKind::Analyte, row.require_text("ANALYTE_CODE")?, || {
            row.at("ANALYTE_CODE")
        })?
        .clone();
    let measurement: &Measurement = row.require_measurement("RESULT")?;

    let observation = fragment.blank();
    fragment.typed(observation.clone(), sosa::OBSERVATION);
    fragment.add(job, sosa::HAS_MEMBER, observation.clone());
    fragment.add(observation.clone(), sosa::OBSERVED_PROPERTY, analyte);
    fragment.add(observation.clone(), sosa::HAS_FEATURE_OF_INTEREST, feature);
    fragment.add(observation.clone(), sosa::USED_PROCEDURE, method.iri.clone());

    let result = fragment.blank();
    fragment.add(observation.clone(), sosa::HAS_RESULT, result.clone());
    fragment.add(result.clone(), sdo::UNIT_CODE, method.unit.clone());
    let value = graph::measurement(measurement);
    match measurement.censor {
        None => fragment.add(result.clone(), sdo::VALUE, value),
        // below detection: the true value is at most the limit
        Some(Censor::Below) => {
            fragment.add(result.clone(), sdo::MAX_VALUE, value);
            fragment.add(result.clone(), ex::CENSORED, graph::boolean(true));
        }
        Some(Censor::Above) => {
            fragment.add(result.clone(), sdo::MIN_VALUE, value);
            fragment.add(result.clone(), ex::CENSORED, graph::boolean(true));
        }
    }
    remark(fragment, observation, row);
    Ok(())
}
