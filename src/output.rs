//! Graph serialization.
//!
//! Triples are written in sorted N-Triples order whatever the syntax, so the
//! same workbook always produces byte-identical output.

use crate::namespaces::PREFIXES;
use anyhow::{Context, Result};
use clap::ValueEnum;
use oxigraph::io::{RdfFormat, RdfSerializer};
use oxigraph::model::{Graph, Triple};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use strum::{AsRefStr, Display, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    AsRefStr,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// Turtle with the converter's prefixes
    #[default]
    #[value(alias = "turtle")]
    #[strum(to_string = "ttl", serialize = "turtle")]
    #[serde(alias = "turtle")]
    Ttl,
    /// N-Triples
    #[value(alias = "ntriples")]
    #[strum(to_string = "nt", serialize = "ntriples")]
    #[serde(alias = "ntriples")]
    Nt,
    /// RDF/XML
    #[value(alias = "rdfxml")]
    #[strum(to_string = "xml", serialize = "rdfxml")]
    #[serde(alias = "rdfxml")]
    Xml,
}

impl OutputFormat {
    fn rdf_format(self) -> RdfFormat {
        match self {
            OutputFormat::Ttl => RdfFormat::Turtle,
            OutputFormat::Nt => RdfFormat::NTriples,
            OutputFormat::Xml => RdfFormat::RdfXml,
        }
    }

    /// Picks a format from a file extension, if it names one.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "ttl" => Some(OutputFormat::Ttl),
            "nt" => Some(OutputFormat::Nt),
            "xml" | "rdf" => Some(OutputFormat::Xml),
            _ => None,
        }
    }
}

fn sorted(graph: &Graph) -> Vec<Triple> {
    let mut triples: Vec<Triple> = graph.iter().map(|triple| triple.into_owned()).collect();
    triples.sort_by_cached_key(|triple| triple.to_string());
    triples
}

pub fn write_graph(graph: &Graph, format: OutputFormat, writer: impl Write) -> Result<()> {
    let mut serializer = RdfSerializer::from_format(format.rdf_format());
    if format != OutputFormat::Nt {
        for (prefix, iri) in PREFIXES {
            serializer = serializer
                .with_prefix(*prefix, *iri)
                .with_context(|| format!("invalid namespace for prefix {prefix}"))?;
        }
    }
    let mut writer = serializer.for_writer(writer);
    for triple in sorted(graph) {
        writer
            .serialize_triple(&triple)
            .context("failed to serialize triple")?;
    }
    writer.finish().context("failed to finish RDF output")?;
    Ok(())
}

pub fn to_string(graph: &Graph, format: OutputFormat) -> Result<String> {
    let mut buffer = Vec::new();
    write_graph(graph, format, &mut buffer)?;
    String::from_utf8(buffer).context("serialized graph is not UTF-8")
}

/// Writes the graph to `path`, creating parent directories as needed.
pub fn write_file(graph: &Graph, format: OutputFormat, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {:?}", parent))?;
    }
    let file =
        fs::File::create(path).with_context(|| format!("failed to create output file {:?}", path))?;
    let mut writer = std::io::BufWriter::new(file);
    write_graph(graph, format, &mut writer)?;
    writer
        .flush()
        .with_context(|| format!("failed to flush output file {:?}", path))
}
