//! User-defined vocabulary and code tables
//!
//! USER_DICTIONARY and USER_UNITS_OF_MEASURE extend existing code lists and
//! so produce a [`VocabularyDelta`] that is folded into the catalogue view
//! before any coded field elsewhere is resolved. The other user tables
//! (sample preparation, assay, analyte, laboratory, lithology and mineral
//! codes) are plain registries referenced by later sheets.

use super::{SheetInput, concept_scheme, remark, walk_sheet};
use crate::error::{ConversionError, ConversionResult, Provenance};
use crate::graph::{self, GraphFragment};
use crate::namespaces::{prov, sdo, skos};
use crate::registry::{Registries, RegistryKind};
use crate::template::SheetLayout;
use crate::vocab::CatalogueView;
use crate::vocab::catalogue::{Concept, VocabularyDelta};
use indexmap::IndexMap;

// =============================================================================
// VOCABULARY EXTENSIONS
// =============================================================================

struct Extension {
    path: &'static str,
    title: &'static str,
    list_field: &'static str,
    code_field: &'static str,
    label_field: &'static str,
    definition_field: &'static str,
}

const USER_VOCABULARY: Extension = Extension {
    path: "user-vocab",
    title: "User-defined vocabulary",
    list_field: "CODELIST",
    code_field: "CODE",
    label_field: "CODE",
    definition_field: "DESCRIPTION",
};

const USER_UNITS: Extension = Extension {
    path: "user-units",
    title: "User-defined units of measure",
    list_field: "COLLECTION",
    code_field: "UNIT_CODE",
    label_field: "LABEL",
    definition_field: "DEFINITION",
};

/// USER_DICTIONARY: new codes for existing code lists.
pub fn user_dictionary(
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
) -> ConversionResult<(GraphFragment, VocabularyDelta)> {
    extend(
        &USER_VOCABULARY,
        &input.schema.user_dictionary,
        input,
        view,
        registries,
    )
}

/// USER_UNITS_OF_MEASURE: new units for existing unit collections.
pub fn user_units_of_measure(
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
) -> ConversionResult<(GraphFragment, VocabularyDelta)> {
    extend(
        &USER_UNITS,
        &input.schema.user_units_of_measure,
        input,
        view,
        registries,
    )
}

fn extend(
    extension: &Extension,
    layout: &SheetLayout,
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
) -> ConversionResult<(GraphFragment, VocabularyDelta)> {
    let scheme = input.collection(extension.path);
    let mut delta = VocabularyDelta::new();
    let mut seen: IndexMap<(String, String), Provenance> = IndexMap::new();

    let mut fragment = walk_sheet(layout, input, view, registries, |row, fragment, _| {
        let code_list = row.require_text(extension.list_field)?;
        let code = row.require_text(extension.code_field)?;
        let at = row.at(extension.code_field);

        if view.resolve(code, code_list).is_ok() {
            return Err(ConversionError::invalid(
                at,
                code,
                format!("a new code for the {code_list} code list"),
            ));
        }
        let key = (code_list.to_string(), code.to_string());
        if let Some(first) = seen.get(&key) {
            return Err(ConversionError::DuplicateKey {
                at,
                value: code.to_string(),
                first: first.clone(),
            });
        }
        seen.insert(key, at);

        let concept = input.scoped(extension.path, code);
        fragment.typed(concept.clone(), skos::CONCEPT);
        fragment.add(concept.clone(), skos::NOTATION, graph::text(code));
        fragment.add(
            concept.clone(),
            skos::PREF_LABEL,
            graph::english(row.require_text(extension.label_field)?),
        );
        fragment.add(
            concept.clone(),
            skos::DEFINITION,
            graph::english(row.require_text(extension.definition_field)?),
        );
        fragment.add(concept.clone(), skos::IN_SCHEME, scheme.clone());
        if let Some(list) = view.code_list(code_list) {
            fragment.add(list.clone(), skos::MEMBER, concept.clone());
        }
        delta.add_concept(Concept::new(concept, code).in_list(code_list));
        Ok(())
    })?;

    if !delta.is_empty() {
        concept_scheme(&mut fragment, &scheme, extension.title);
    }
    Ok((fragment, delta))
}

// =============================================================================
// CODE TABLES
// =============================================================================

struct CodeTable {
    kind: RegistryKind,
    path: &'static str,
    scheme: &'static str,
    title: &'static str,
    code_field: &'static str,
}

const PREP_CODES: CodeTable = CodeTable {
    kind: RegistryKind::PrepCode,
    path: "prep-code",
    scheme: "prep-codes",
    title: "Sample preparation codes",
    code_field: "CODE",
};

const ASSAY_CODES: CodeTable = CodeTable {
    kind: RegistryKind::AssayCode,
    path: "assay-code",
    scheme: "assay-codes",
    title: "Assay codes",
    code_field: "CODE",
};

const ANALYTES: CodeTable = CodeTable {
    kind: RegistryKind::Analyte,
    path: "analyte",
    scheme: "analytes",
    title: "Analytes",
    code_field: "CODE",
};

const LITH_CODES: CodeTable = CodeTable {
    kind: RegistryKind::LithCode,
    path: "lith-code",
    scheme: "lith-codes",
    title: "Lithology codes",
    code_field: "USER_CODE",
};

const MINERAL_CODES: CodeTable = CodeTable {
    kind: RegistryKind::MineralCode,
    path: "mineral-code",
    scheme: "mineral-codes",
    title: "Mineral codes",
    code_field: "USER_CODE",
};

pub fn sample_prep_codes(
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
) -> ConversionResult<GraphFragment> {
    code_table(&PREP_CODES, &input.schema.user_sample_prep_codes, input, view, registries)
}

pub fn assay_codes(
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
) -> ConversionResult<GraphFragment> {
    code_table(&ASSAY_CODES, &input.schema.user_assay_codes, input, view, registries)
}

pub fn analytes(
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
) -> ConversionResult<GraphFragment> {
    code_table(&ANALYTES, &input.schema.user_analytes, input, view, registries)
}

/// LITH_DICTIONARY: user lithology codes matched to the reference lithology
/// vocabulary with `skos:exactMatch`.
pub fn lithology_codes(
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
) -> ConversionResult<GraphFragment> {
    code_table(&LITH_CODES, &input.schema.lith_dictionary, input, view, registries)
}

pub fn mineral_codes(
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
) -> ConversionResult<GraphFragment> {
    code_table(&MINERAL_CODES, &input.schema.min_dictionary, input, view, registries)
}

fn code_table(
    table: &CodeTable,
    layout: &SheetLayout,
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
) -> ConversionResult<GraphFragment> {
    let scheme = input.collection(table.scheme);
    let mut fragment = walk_sheet(layout, input, view, registries, |row, fragment, registries| {
        let code = row.require_text(table.code_field)?;
        let concept = input.scoped(table.path, code);
        fragment.typed(concept.clone(), skos::CONCEPT);
        fragment.add(concept.clone(), skos::NOTATION, graph::text(code));
        fragment.add(concept.clone(), skos::PREF_LABEL, graph::english(code));
        if let Some(description) = row.text("DESCRIPTION") {
            fragment.add(concept.clone(), skos::DEFINITION, graph::english(description));
        }
        if let Some(matched) = row.concept("GSQ_CODE_MATCH") {
            fragment.add(concept.clone(), skos::EXACT_MATCH, matched.clone());
        }
        fragment.add(concept.clone(), skos::IN_SCHEME, scheme.clone());
        registries.register(table.kind, code, concept, row.at(table.code_field))
    })?;
    if !fragment.is_empty() {
        concept_scheme(&mut fragment, &scheme, table.title);
    }
    Ok(fragment)
}

/// USER_LABORATORIES: the organisations that analysed samples.
pub fn laboratories(
    input: &SheetInput<'_>,
    view: &CatalogueView<'_>,
    registries: &mut Registries,
) -> ConversionResult<GraphFragment> {
    let layout = &input.schema.user_laboratories;
    walk_sheet(layout, input, view, registries, |row, fragment, registries| {
        let name = row.require_text("LABORATORY_NAME")?;
        let lab = input.scoped("lab", name);
        fragment.typed(lab.clone(), sdo::ORGANIZATION);
        fragment.typed(lab.clone(), prov::AGENT_CLASS);
        fragment.add(lab.clone(), sdo::NAME, graph::text(name));
        fragment.add(
            lab.clone(),
            sdo::LOCATION,
            graph::text(row.require_text("LABORATORY_LOCATION")?),
        );
        remark(fragment, lab.clone(), row);
        registries.register(RegistryKind::Laboratory, name, lab, row.at("LABORATORY_NAME"))
    })
}
