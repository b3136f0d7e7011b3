//! Identifier registries threaded between sheet extractors.

use crate::error::{ConversionError, ConversionResult, Provenance};
use crate::template;
use indexmap::IndexMap;
use oxigraph::model::NamedNode;
use serde::Serialize;
use strum::{AsRefStr, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
pub enum RegistryKind {
    Tenement,
    Drillhole,
    Sample,
    Job,
    Laboratory,
    PrepCode,
    AssayCode,
    Analyte,
    LithCode,
    MineralCode,
}

impl RegistryKind {
    /// Worksheet(s) whose rows define entries of this kind.
    pub fn source(&self) -> &'static str {
        match self {
            RegistryKind::Tenement => template::TENEMENT,
            RegistryKind::Drillhole => template::DRILLHOLE_LOCATION,
            RegistryKind::Sample => "DRILLHOLE_SAMPLE or SURFACE_SAMPLE",
            RegistryKind::Job => template::SAMPLE_PREPARATION,
            RegistryKind::Laboratory => template::USER_LABORATORIES,
            RegistryKind::PrepCode => template::USER_SAMPLE_PREP_CODES,
            RegistryKind::AssayCode => template::USER_ASSAY_CODES,
            RegistryKind::Analyte => template::USER_ANALYTES,
            RegistryKind::LithCode => template::LITH_DICTIONARY,
            RegistryKind::MineralCode => template::MIN_DICTIONARY,
        }
    }

    /// Human-readable target for `UnknownReference` messages.
    pub fn target(&self) -> String {
        format!("the {} worksheet", self.source())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub iri: NamedNode,
    pub defined_at: Provenance,
}

/// Keys of one kind, in definition order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: IndexMap<String, Entry>,
}

impl Registry {
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Entry)> {
        self.entries.iter()
    }

    fn insert(&mut self, key: String, entry: Entry) -> ConversionResult<()> {
        if let Some(first) = self.entries.get(&key) {
            return Err(ConversionError::DuplicateKey {
                at: entry.defined_at,
                value: key,
                first: first.defined_at.clone(),
            });
        }
        self.entries.insert(key, entry);
        Ok(())
    }
}

/// Every registry a run builds up, keyed by kind.
#[derive(Debug, Clone, Default)]
pub struct Registries {
    tenements: Registry,
    drillholes: Registry,
    samples: Registry,
    jobs: Registry,
    laboratories: Registry,
    prep_codes: Registry,
    assay_codes: Registry,
    analytes: Registry,
    lith_codes: Registry,
    mineral_codes: Registry,
}

impl Registries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: RegistryKind) -> &Registry {
        match kind {
            RegistryKind::Tenement => &self.tenements,
            RegistryKind::Drillhole => &self.drillholes,
            RegistryKind::Sample => &self.samples,
            RegistryKind::Job => &self.jobs,
            RegistryKind::Laboratory => &self.laboratories,
            RegistryKind::PrepCode => &self.prep_codes,
            RegistryKind::AssayCode => &self.assay_codes,
            RegistryKind::Analyte => &self.analytes,
            RegistryKind::LithCode => &self.lith_codes,
            RegistryKind::MineralCode => &self.mineral_codes,
        }
    }

    fn get_mut(&mut self, kind: RegistryKind) -> &mut Registry {
        match kind {
            RegistryKind::Tenement => &mut self.tenements,
            RegistryKind::Drillhole => &mut self.drillholes,
            RegistryKind::Sample => &mut self.samples,
            RegistryKind::Job => &mut self.jobs,
            RegistryKind::Laboratory => &mut self.laboratories,
            RegistryKind::PrepCode => &mut self.prep_codes,
            RegistryKind::AssayCode => &mut self.assay_codes,
            RegistryKind::Analyte => &mut self.analytes,
            RegistryKind::LithCode => &mut self.lith_codes,
            RegistryKind::MineralCode => &mut self.mineral_codes,
        }
    }

    /// Registers `key`, failing with `DuplicateKey` if it is already known.
    pub fn register(
        &mut self,
        kind: RegistryKind,
        key: impl Into<String>,
        iri: NamedNode,
        defined_at: Provenance,
    ) -> ConversionResult<()> {
        self.get_mut(kind)
            .insert(key.into(), Entry { iri, defined_at })
    }

    pub fn iri(&self, kind: RegistryKind, key: &str) -> Option<&NamedNode> {
        self.get(kind).get(key).map(|entry| &entry.iri)
    }

    /// Resolves a reference, failing with `UnknownReference` naming the sheet
    /// that should have defined it.
    pub fn lookup(
        &self,
        kind: RegistryKind,
        key: &str,
        at: impl FnOnce() -> Provenance,
    ) -> ConversionResult<&NamedNode> {
        self.iri(kind, key)
            .ok_or_else(|| ConversionError::unknown_reference(at(), key, kind.target()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn iri(s: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.org/{s}"))
    }

    #[test]
    fn duplicate_keys_point_at_the_first_definition() {
        let mut registries = Registries::new();
        registries
            .register(
                RegistryKind::Sample,
                "S1",
                iri("s1"),
                Provenance::new("DRILLHOLE_SAMPLE", 9, "SAMPLE_ID"),
            )
            .expect("first registration");
        let err = registries
            .register(
                RegistryKind::Sample,
                "S1",
                iri("s1"),
                Provenance::new("SURFACE_SAMPLE", 12, "SAMPLE_ID"),
            )
            .expect_err("second registration");
        assert_matches!(
            err,
            ConversionError::DuplicateKey { ref first, .. } if first.sheet == "DRILLHOLE_SAMPLE" && first.row == 9
        );
    }

    #[test]
    fn unknown_reference_names_the_defining_sheet() {
        let registries = Registries::new();
        let err = registries
            .lookup(RegistryKind::Drillhole, "DD999", || {
                Provenance::new("DRILLHOLE_SURVEY", 9, "DRILLHOLE_ID")
            })
            .expect_err("unknown");
        assert_eq!(
            err.to_string(),
            "The value DD999 for DRILLHOLE_ID in row 9 of sheet DRILLHOLE_SURVEY is not present on the DRILLHOLE_LOCATION worksheet as required"
        );
    }
}
