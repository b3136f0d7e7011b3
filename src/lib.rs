pub mod config;
pub mod convert;
pub mod dictionary;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod graph;
pub mod logging;
pub mod model;
pub mod namespaces;
pub mod output;
pub mod registry;
pub mod rows;
pub mod template;
pub mod vocab;
pub mod workbook;

pub use config::{CliArgs, ConverterConfig};
pub use convert::{ConvertOptions, Conversion, ConversionSummary, Converted, convert};
pub use error::{ConversionError, ConversionResult, ErrorKind, Provenance};
pub use logging::{LoggingConfig, init_logging};
pub use output::OutputFormat;
pub use vocab::Catalogue;
pub use workbook::{CellSource, MemoryWorkbook, WorkbookContext};

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{self, Write};
use template::{SUPPORTED_VERSIONS, TemplateSchema};

/// What `--info` reports about a workbook.
#[derive(Debug, Clone, Serialize)]
pub struct WorkbookInfo {
    pub workbook: String,
    pub bytes: u64,
    pub template_version: Option<String>,
    pub supported: bool,
    pub supported_versions: Vec<&'static str>,
    pub sheets: Vec<String>,
}

impl WorkbookInfo {
    pub fn describe(book: &WorkbookContext) -> Result<Self> {
        let template_version = workbook::template_version(book)?;
        let supported = TemplateSchema::for_version(template_version.as_deref()).is_ok();
        Ok(Self {
            workbook: book.path.display().to_string(),
            bytes: book.bytes,
            template_version,
            supported,
            supported_versions: SUPPORTED_VERSIONS.to_vec(),
            sheets: book.sheet_names(),
        })
    }
}

/// Runs the command line: `--info` or a full conversion.
pub fn run(config: &ConverterConfig) -> Result<()> {
    config.validate()?;
    let path = config
        .workbook
        .as_deref()
        .context("no workbook to convert")?;
    let _span = logging::conversion_span(path).entered();
    let workbook = WorkbookContext::load(path)?;

    if config.info {
        let info = WorkbookInfo::describe(&workbook)?;
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &info)?;
        writeln!(stdout)?;
        return Ok(());
    }

    let catalogue = Catalogue::load_from_file(&config.catalogue)?;
    let converted = convert(&workbook, &catalogue, &config.convert_options())?;

    match config.output.as_deref() {
        Some(output) => {
            output::write_file(&converted.graph, config.format, output)?;
            tracing::info!(
                output = %output.display(),
                format = %config.format,
                triples = converted.summary.triples,
                "graph written"
            );
        }
        None => {
            let stdout = io::stdout().lock();
            output::write_graph(&converted.graph, config.format, io::BufWriter::new(stdout))?;
        }
    }
    Ok(())
}
