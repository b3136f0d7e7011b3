//! Workbook Orchestrator
//!
//! Runs the sheet extractors in dependency order and folds their fragments
//! into one graph anchored to the Dataset.
//!
//! **Valid transitions** (each consumes the previous stage):
//! - `Loaded` -> `MetadataExtracted` (via `extract_metadata()`)
//! - `MetadataExtracted` -> `VocabularyChecked` (via `check_vocabulary()`)
//! - `VocabularyChecked` -> `IndependentSheetsExtracted` (via `extract_independent()`)
//! - `IndependentSheetsExtracted` -> `DrillholesExtracted` (via `extract_drillholes()`)
//! - `DrillholesExtracted` -> `SamplesExtracted` (via `extract_samples()`)
//! - `SamplesExtracted` -> `DependentSheetsExtracted` (via `extract_dependent()`)
//! - `DependentSheetsExtracted` -> `Merged` (via `merge()`)
//! - `Merged` -> [`Converted`] (via `finish()`)
//!
//! A failed transition drops the conversion and its partial graph; there is
//! no way to get a graph out of a run that did not reach `Merged`.

use crate::dictionary;
use crate::error::ConversionResult;
use crate::extract::{
    SheetInput, drillhole, geochemistry, lithology, metadata, preparation, sample, tenement,
    user_codes,
};
use crate::geometry::UtmZone;
use crate::graph::GraphFragment;
use crate::namespaces::{DEFAULT_DATASET_NAMESPACE, sdo};
use crate::registry::{Registries, RegistryKind};
use crate::template::TemplateSchema;
use crate::vocab::{Catalogue, CatalogueView};
use crate::workbook::{CellSource, template_version};
use oxigraph::model::{Graph, NamedNode, NamedOrBlankNode};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

// =============================================================================
// OPTIONS & RESULT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Projection every easting/northing in the workbook is given in
    pub source_crs: UtmZone,
    /// Namespace Dataset IRIs are minted in when the workbook gives none
    pub dataset_namespace: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            source_crs: UtmZone::default(),
            dataset_namespace: DEFAULT_DATASET_NAMESPACE.to_string(),
        }
    }
}

/// Counts reported once a conversion completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    pub template_version: &'static str,
    pub triples: usize,
    pub parts: usize,
    pub tenements: usize,
    pub drillholes: usize,
    pub samples: usize,
    pub jobs: usize,
}

/// A completed conversion.
#[derive(Debug, Clone)]
pub struct Converted {
    pub graph: Graph,
    pub dataset: NamedNode,
    pub summary: ConversionSummary,
}

// =============================================================================
// STATE MARKERS
// =============================================================================

/// Template version checked, nothing extracted yet.
pub struct Loaded;

/// Stages after metadata extraction, which all know the Dataset IRI.
pub trait Anchored {
    fn dataset(&self) -> &NamedNode;
}

macro_rules! anchored_stages {
    ($($(#[$doc:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub struct $name {
                dataset: NamedNode,
            }

            impl Anchored for $name {
                fn dataset(&self) -> &NamedNode {
                    &self.dataset
                }
            }
        )*
    };
}

anchored_stages!(
    /// Dataset node emitted.
    MetadataExtracted,
    /// User vocabulary folded in, embedded dictionaries checked.
    VocabularyChecked,
    /// Tenements and user code tables registered.
    IndependentSheetsExtracted,
    /// Drillhole IDs registered.
    DrillholesExtracted,
    /// Surveys done, sample IDs registered.
    SamplesExtracted,
    /// Preparation, geochemistry and downhole logging done.
    DependentSheetsExtracted,
    /// Parts linked to the Dataset.
    Merged,
);

// =============================================================================
// CONVERSION
// =============================================================================

struct Run<'a> {
    source: &'a dyn CellSource,
    schema: &'static TemplateSchema,
    options: &'a ConvertOptions,
    view: CatalogueView<'a>,
    registries: Registries,
    graph: GraphFragment,
}

pub struct Conversion<'a, State> {
    run: Run<'a>,
    state: State,
}

type Extractor =
    fn(&SheetInput<'_>, &CatalogueView<'_>, &mut Registries) -> ConversionResult<GraphFragment>;

/// Borrows only `state` and the run's `'a` references, so the run itself
/// stays free for mutable use while the input is alive.
macro_rules! sheet_input {
    ($conversion:expr) => {{
        let options: &ConvertOptions = $conversion.run.options;
        SheetInput {
            source: $conversion.run.source,
            schema: $conversion.run.schema,
            dataset: &$conversion.state.dataset,
            crs: &options.source_crs,
        }
    }};
}

impl<'a, S: Anchored> Conversion<'a, S> {
    pub fn dataset(&self) -> &NamedNode {
        self.state.dataset()
    }
}

impl<S> Conversion<'_, S> {
    pub fn registries(&self) -> &Registries {
        &self.run.registries
    }

    pub fn triples(&self) -> usize {
        self.run.graph.len()
    }
}

impl<'a> Conversion<'a, Loaded> {
    /// Checks the declared template version and prepares a run.
    pub fn load(
        source: &'a dyn CellSource,
        catalogue: &'a Catalogue,
        options: &'a ConvertOptions,
    ) -> ConversionResult<Self> {
        let version = template_version(source)?;
        let schema = TemplateSchema::for_version(version.as_deref())?;
        info!(
            version = schema.version,
            concepts = catalogue.len(),
            "template version accepted"
        );
        Ok(Self {
            run: Run {
                source,
                schema,
                options,
                view: CatalogueView::new(catalogue),
                registries: Registries::new(),
                graph: GraphFragment::new("run"),
            },
            state: Loaded,
        })
    }

    pub fn extract_metadata(mut self) -> ConversionResult<Conversion<'a, MetadataExtracted>> {
        let _span = info_span!("stage", stage = "metadata").entered();
        let (fragment, dataset) = metadata::extract(
            self.run.schema,
            self.run.source,
            &self.run.view,
            &self.run.options.dataset_namespace,
        )?;
        self.run.graph.merge(fragment);
        Ok(Conversion {
            run: self.run,
            state: MetadataExtracted { dataset },
        })
    }
}

impl<'a> Conversion<'a, MetadataExtracted> {
    /// Folds the user vocabulary into the run's catalogue view, then checks
    /// the embedded dictionaries against it.
    pub fn check_vocabulary(mut self) -> ConversionResult<Conversion<'a, VocabularyChecked>> {
        let _span = info_span!("stage", stage = "vocabulary").entered();
        let input = sheet_input!(self);

        let (fragment, delta) =
            user_codes::user_dictionary(&input, &self.run.view, &mut self.run.registries)?;
        self.run.graph.merge(fragment);
        self.run.view.fold(delta);

        let (fragment, delta) =
            user_codes::user_units_of_measure(&input, &self.run.view, &mut self.run.registries)?;
        self.run.graph.merge(fragment);
        self.run.view.fold(delta);

        let codes =
            dictionary::check_validation_dictionary(self.run.schema, self.run.source, &self.run.view)?;
        let units =
            dictionary::check_units_of_measure(self.run.schema, self.run.source, &self.run.view)?;
        info!(
            user_concepts = self.run.view.delta().len(),
            codes, units, "vocabulary checked"
        );

        Ok(Conversion {
            run: self.run,
            state: VocabularyChecked {
                dataset: self.state.dataset,
            },
        })
    }
}

impl<'a> Conversion<'a, VocabularyChecked> {
    pub fn extract_independent(
        mut self,
    ) -> ConversionResult<Conversion<'a, IndependentSheetsExtracted>> {
        let _span = info_span!("stage", stage = "independent").entered();
        let input = sheet_input!(self);
        let run = &mut self.run;
        let extractors: [Extractor; 7] = [
            tenement::extract,
            user_codes::sample_prep_codes,
            user_codes::assay_codes,
            user_codes::analytes,
            user_codes::laboratories,
            user_codes::lithology_codes,
            user_codes::mineral_codes,
        ];
        for extractor in extractors {
            let fragment = extractor(&input, &run.view, &mut run.registries)?;
            run.graph.merge(fragment);
        }
        Ok(Conversion {
            run: self.run,
            state: IndependentSheetsExtracted {
                dataset: self.state.dataset,
            },
        })
    }
}

impl<'a> Conversion<'a, IndependentSheetsExtracted> {
    pub fn extract_drillholes(mut self) -> ConversionResult<Conversion<'a, DrillholesExtracted>> {
        let _span = info_span!("stage", stage = "drillholes").entered();
        let input = sheet_input!(self);
        let fragment = drillhole::locations(&input, &self.run.view, &mut self.run.registries)?;
        self.run.graph.merge(fragment);
        Ok(Conversion {
            run: self.run,
            state: DrillholesExtracted {
                dataset: self.state.dataset,
            },
        })
    }
}

impl<'a> Conversion<'a, DrillholesExtracted> {
    pub fn extract_samples(mut self) -> ConversionResult<Conversion<'a, SamplesExtracted>> {
        let _span = info_span!("stage", stage = "samples").entered();
        let input = sheet_input!(self);
        let run = &mut self.run;
        let extractors: [Extractor; 3] = [
            drillhole::surveys,
            sample::drillhole_samples,
            sample::surface_samples,
        ];
        for extractor in extractors {
            let fragment = extractor(&input, &run.view, &mut run.registries)?;
            run.graph.merge(fragment);
        }
        Ok(Conversion {
            run: self.run,
            state: SamplesExtracted {
                dataset: self.state.dataset,
            },
        })
    }
}

impl<'a> Conversion<'a, SamplesExtracted> {
    pub fn extract_dependent(
        mut self,
    ) -> ConversionResult<Conversion<'a, DependentSheetsExtracted>> {
        let _span = info_span!("stage", stage = "dependent").entered();
        let input = sheet_input!(self);
        let run = &mut self.run;

        let fragment = preparation::extract(&input, &run.view, &mut run.registries)?;
        run.graph.merge(fragment);

        let (fragment, methods) =
            geochemistry::geochemistry_meta(&input, &run.view, &mut run.registries)?;
        run.graph.merge(fragment);
        let fragment =
            geochemistry::sample_geochemistry(&input, &run.view, &mut run.registries, &methods)?;
        run.graph.merge(fragment);

        let (fragment, qaqc_methods) =
            geochemistry::qaqc_meta(&input, &run.view, &mut run.registries)?;
        run.graph.merge(fragment);
        let fragment = geochemistry::qaqc_geochemistry(
            &input,
            &run.view,
            &mut run.registries,
            &qaqc_methods,
        )?;
        run.graph.merge(fragment);

        let extractors: [Extractor; 2] = [lithology::lithology, lithology::structure];
        for extractor in extractors {
            let fragment = extractor(&input, &run.view, &mut run.registries)?;
            run.graph.merge(fragment);
        }

        Ok(Conversion {
            run: self.run,
            state: DependentSheetsExtracted {
                dataset: self.state.dataset,
            },
        })
    }
}

impl<'a> Conversion<'a, DependentSheetsExtracted> {
    /// Links every feature of interest and job collection to the Dataset.
    pub fn merge(mut self) -> Conversion<'a, Merged> {
        let parts: Vec<NamedOrBlankNode> = self.run.graph.parts().cloned().collect();
        for part in &parts {
            self.run
                .graph
                .add(self.state.dataset.clone(), sdo::HAS_PART, part.clone());
        }
        info!(parts = parts.len(), "parts linked to dataset");
        Conversion {
            run: self.run,
            state: Merged {
                dataset: self.state.dataset,
            },
        }
    }
}

impl Conversion<'_, Merged> {
    pub fn finish(self) -> Converted {
        let registries = &self.run.registries;
        let summary = ConversionSummary {
            template_version: self.run.schema.version,
            triples: self.run.graph.len(),
            parts: self.run.graph.parts().count(),
            tenements: registries.get(RegistryKind::Tenement).len(),
            drillholes: registries.get(RegistryKind::Drillhole).len(),
            samples: registries.get(RegistryKind::Sample).len(),
            jobs: registries.get(RegistryKind::Job).len(),
        };
        Converted {
            graph: self.run.graph.into_graph(),
            dataset: self.state.dataset,
            summary,
        }
    }
}

/// Converts a workbook in one call, running every stage in order.
pub fn convert(
    source: &dyn CellSource,
    catalogue: &Catalogue,
    options: &ConvertOptions,
) -> ConversionResult<Converted> {
    let _span = info_span!("convert").entered();
    let converted = Conversion::load(source, catalogue, options)?
        .extract_metadata()?
        .check_vocabulary()?
        .extract_independent()?
        .extract_drillholes()?
        .extract_samples()?
        .extract_dependent()?
        .merge()
        .finish();
    info!(
        dataset = converted.dataset.as_str(),
        triples = converted.summary.triples,
        "conversion complete"
    );
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConversionError;
    use crate::model::CellValue;
    use crate::template::DATASET_METADATA;
    use crate::vocab::catalogue::Concept;
    use crate::workbook::{MemoryWorkbook, TEMPLATE_NOTES};
    use assert_matches::assert_matches;

    // `assert_matches!` formats the matched value on failure.
    impl<S> std::fmt::Debug for Conversion<'_, S> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Conversion").finish_non_exhaustive()
        }
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn workbook(version: &str) -> MemoryWorkbook {
        let mut book = MemoryWorkbook::new();
        book.set(TEMPLATE_NOTES, "C7", text(version))
            .set(DATASET_METADATA, "B5", text("https://example.org/dataset/7"))
            .set(DATASET_METADATA, "B6", text("Bores"))
            .set(DATASET_METADATA, "B7", text("Collars only"))
            .set(DATASET_METADATA, "B8", text("2023-01-01"))
            .set(DATASET_METADATA, "B9", text("2023-01-01"))
            .set(DATASET_METADATA, "B10", text("GSQ"));
        book
    }

    fn catalogue() -> Catalogue {
        Catalogue::new().with_concept(Concept::new(
            NamedNode::new_unchecked("http://example.org/agents/gsq"),
            "GSQ",
        ))
    }

    #[test]
    fn unsupported_version_stops_at_load() {
        let book = workbook("VERSION 2.1");
        let catalogue = catalogue();
        let options = ConvertOptions::default();
        assert_matches!(
            Conversion::load(&book, &catalogue, &options),
            Err(ConversionError::UnsupportedTemplateVersion { found, .. }) if found == "2.1"
        );
    }

    #[test]
    fn stages_carry_the_dataset() -> ConversionResult<()> {
        let book = workbook("VERSION 3.0");
        let catalogue = catalogue();
        let options = ConvertOptions::default();
        let conversion = Conversion::load(&book, &catalogue, &options)?
            .extract_metadata()?
            .check_vocabulary()?;
        assert_eq!(conversion.dataset().as_str(), "https://example.org/dataset/7");
        assert!(conversion.triples() > 0);
        Ok(())
    }

    #[test]
    fn metadata_only_workbook_has_no_parts() -> ConversionResult<()> {
        let book = workbook("3.0");
        let converted = convert(&book, &catalogue(), &ConvertOptions::default())?;
        assert_eq!(converted.summary.parts, 0);
        assert_eq!(converted.summary.template_version, "3.0");
        assert_eq!(converted.summary.triples, converted.graph.len());
        Ok(())
    }
}
