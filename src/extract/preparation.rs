//! SAMPLE_PREPARATION: laboratory jobs and the samples sent to them.
//!
//! The first row naming a job mints its observation collection and binds it
//! to a laboratory; later rows for the same job must name the same one.

use super::{SheetInput, remark, walk_sheet};
use crate::error::{ConversionError, ConversionResult, Provenance};
use crate::graph::{self, GraphFragment};
use crate::namespaces::{ex, roles, sdo, sosa};
use crate::registry::{Registries, RegistryKind};
use crate::vocab::CatalogueView;
use indexmap::IndexMap;

pub fn extract(
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
) -> ConversionResult<GraphFragment> {
    let layout = &input.schema.sample_preparation;
    let mut laboratory_of: IndexMap<String, (String, Provenance)> = IndexMap::new();

    walk_sheet(layout, input, view, registries, |row, fragment, registries| {
        let job_number = row.require_text("JOB_NUMBER")?;
        let laboratory = row.require_text("LABORATORY_NAME")?;
        let job = input.scoped("job", job_number);

        match laboratory_of.get(job_number) {
            Some((bound, first)) if bound != laboratory => {
                return Err(ConversionError::invalid(
                    row.at("LABORATORY_NAME"),
                    laboratory,
                    format!(
                        "{bound}, the laboratory given for job {job_number} in row {}",
                        first.row
                    ),
                ));
            }
            Some(_) => {}
            None => {
                let lab = registries
                    .lookup(RegistryKind::Laboratory, laboratory, || row.at("LABORATORY_NAME"))?
                    .clone();
                fragment.typed(job.clone(), sosa::OBSERVATION_COLLECTION);
                fragment.add(job.clone(), sdo::IDENTIFIER, graph::text(job_number));
                fragment.attribution(job.clone(), lab, roles::SAMPLE_ANALYSER);
                fragment.mark_part(job.clone());
                registries.register(
                    RegistryKind::Job,
                    job_number,
                    job.clone(),
                    row.at("JOB_NUMBER"),
                )?;
                laboratory_of.insert(
                    job_number.to_string(),
                    (laboratory.to_string(), row.at("LABORATORY_NAME")),
                );
            }
        }

        let sample = registries
            .lookup(RegistryKind::Sample, row.require_text("SAMPLE_ID")?, || {
                row.at("SAMPLE_ID")
            })?
            .clone();
        let prep_code = registries
            .lookup(RegistryKind::PrepCode, row.require_text("PREP_CODE")?, || {
                row.at("PREP_CODE")
            })?
            .clone();
        let assay_code = registries
            .lookup(RegistryKind::AssayCode, row.require_text("ASSAY_CODE")?, || {
                row.at("ASSAY_CODE")
            })?
            .clone();

        let preparation = fragment.blank();
        fragment.typed(preparation.clone(), sosa::SAMPLING);
        fragment.add(job.clone(), ex::PREPARATION, preparation.clone());
        fragment.add(preparation.clone(), sosa::HAS_FEATURE_OF_INTEREST, sample);
        fragment.add(preparation.clone(), sosa::USED_PROCEDURE, prep_code);
        fragment.add(preparation.clone(), ex::ASSAY, assay_code);
        if let Some(received) = row.date("DATE_RECEIVED") {
            fragment.add(preparation.clone(), sdo::DATE_RECEIVED, graph::date(received));
        }
        remark(fragment, preparation, row);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::UtmZone;
    use crate::model::CellValue;
    use crate::template::{SAMPLE_PREPARATION, TEMPLATE_V3_0};
    use crate::vocab::catalogue::Catalogue;
    use crate::workbook::MemoryWorkbook;
    use assert_matches::assert_matches;
    use oxigraph::model::NamedNode;

    fn iri(s: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.org/{s}"))
    }

    fn registries() -> Registries {
        let mut registries = Registries::new();
        let at = || Provenance::new("SEED", 1, "KEY");
        for (kind, key) in [
            (RegistryKind::Sample, "S1"),
            (RegistryKind::Sample, "S2"),
            (RegistryKind::Laboratory, "ALS"),
            (RegistryKind::Laboratory, "SGS"),
            (RegistryKind::PrepCode, "CRU"),
            (RegistryKind::AssayCode, "ICP"),
        ] {
            registries
                .register(kind, key, iri(key), at())
                .expect("seed registries");
        }
        registries
    }

    fn prepared(book: &mut MemoryWorkbook, row: u32, job: &str, sample: &str, lab: &str) {
        for (column, value) in [
            ("B", job),
            ("C", sample),
            ("D", lab),
            ("F", "CRU"),
            ("G", "ICP"),
        ] {
            book.set(
                SAMPLE_PREPARATION,
                &format!("{column}{row}"),
                CellValue::Text(value.to_string()),
            );
        }
    }

    fn run(book: &MemoryWorkbook, registries: &mut Registries) -> ConversionResult<GraphFragment> {
        let catalogue = Catalogue::new();
        let view = CatalogueView::new(&catalogue);
        let dataset = iri("ds");
        let crs = UtmZone::default();
        let input = SheetInput {
            source: book,
            schema: &TEMPLATE_V3_0,
            dataset: &dataset,
            crs: &crs,
        };
        extract(&input, &view, registries)
    }

    #[test]
    fn one_collection_per_job() -> ConversionResult<()> {
        let mut book = MemoryWorkbook::new();
        prepared(&mut book, 9, "J1", "S1", "ALS");
        prepared(&mut book, 10, "J1", "S2", "ALS");
        let mut registries = registries();
        let fragment = run(&book, &mut registries)?;
        assert_eq!(fragment.parts().count(), 1);
        assert_eq!(
            registries.iri(RegistryKind::Job, "J1").map(NamedNode::as_str),
            Some("http://example.org/ds/job/J1")
        );
        Ok(())
    }

    #[test]
    fn a_job_has_one_laboratory() {
        let mut book = MemoryWorkbook::new();
        prepared(&mut book, 9, "J1", "S1", "ALS");
        prepared(&mut book, 10, "J1", "S2", "SGS");
        assert_matches!(
            run(&book, &mut registries()),
            Err(ConversionError::InvalidValue { at, .. }) if at.row == 10 && at.field == "LABORATORY_NAME"
        );
    }

    #[test]
    fn unprepared_sample_is_unknown() {
        let mut book = MemoryWorkbook::new();
        prepared(&mut book, 9, "J1", "S9", "ALS");
        assert_matches!(
            run(&book, &mut registries()),
            Err(ConversionError::UnknownReference { at, .. }) if at.field == "SAMPLE_ID"
        );
    }
}
