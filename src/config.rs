use crate::convert::ConvertOptions;
use crate::geometry::{Hemisphere, UtmZone};
use crate::namespaces::{DEFAULT_DATASET_NAMESPACE, is_http_iri};
use crate::output::OutputFormat;
use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CATALOGUE: &str = "catalogue.ttl";
const WORKBOOK_EXTENSION: &str = "xlsx";

#[derive(Debug, Clone)]
pub struct ConverterConfig {
    pub workbook: Option<PathBuf>,
    pub catalogue: PathBuf,
    /// `None` writes the graph to stdout
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub source_crs: UtmZone,
    pub dataset_namespace: String,
    pub info: bool,
}

impl ConverterConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            workbook: cli_workbook,
            catalogue: cli_catalogue,
            output: cli_output,
            format: cli_format,
            utm_zone: cli_utm_zone,
            hemisphere: cli_hemisphere,
            dataset_namespace: cli_dataset_namespace,
            info,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            workbook: file_workbook,
            catalogue: file_catalogue,
            output: file_output,
            format: file_format,
            utm_zone: file_utm_zone,
            hemisphere: file_hemisphere,
            dataset_namespace: file_dataset_namespace,
        } = file_config;

        let output = cli_output.or(file_output);
        let format = cli_format
            .or(file_format)
            .or_else(|| output.as_deref().and_then(OutputFormat::from_extension))
            .unwrap_or_default();

        let defaults = UtmZone::default();
        let source_crs = UtmZone::new(
            cli_utm_zone.or(file_utm_zone).unwrap_or(defaults.zone),
            cli_hemisphere
                .or(file_hemisphere)
                .unwrap_or(defaults.hemisphere),
        );

        let dataset_namespace = cli_dataset_namespace
            .or(file_dataset_namespace)
            .unwrap_or_else(|| DEFAULT_DATASET_NAMESPACE.to_string())
            .trim()
            .to_string();

        Ok(Self {
            workbook: cli_workbook.or(file_workbook),
            catalogue: cli_catalogue
                .or(file_catalogue)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOGUE)),
            output,
            format,
            source_crs,
            dataset_namespace,
            info,
        })
    }

    /// Fails fast on settings the conversion could only discover later.
    pub fn validate(&self) -> Result<()> {
        let workbook = self
            .workbook
            .as_ref()
            .context("no workbook given; pass a WORKBOOK path or set it in the config file")?;
        anyhow::ensure!(
            workbook.is_file(),
            "workbook {:?} does not exist or is not a file",
            workbook
        );
        let extension = workbook
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        anyhow::ensure!(
            extension.as_deref() == Some(WORKBOOK_EXTENSION),
            "workbook {:?} is not an .{} file",
            workbook,
            WORKBOOK_EXTENSION
        );

        if !self.info {
            anyhow::ensure!(
                self.catalogue.is_file(),
                "catalogue {:?} does not exist or is not a file",
                self.catalogue
            );
        }

        anyhow::ensure!(
            (1..=60).contains(&self.source_crs.zone),
            "UTM zone {} is outside 1..=60",
            self.source_crs.zone
        );
        anyhow::ensure!(
            is_http_iri(&self.dataset_namespace),
            "dataset namespace {:?} is not an http(s) IRI",
            self.dataset_namespace
        );
        Ok(())
    }

    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            source_crs: self.source_crs,
            dataset_namespace: self.dataset_namespace.clone(),
        }
    }

    pub fn writes_to_stdout(&self) -> bool {
        self.output.is_none() && !self.info
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(
    name = "geochem-rdf",
    about = "Convert a geochemistry data workbook into RDF",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        env = "GEOCHEM_RDF_WORKBOOK",
        value_name = "WORKBOOK",
        help = "Workbook (.xlsx) to convert"
    )]
    pub workbook: Option<PathBuf>,

    #[arg(
        long,
        env = "GEOCHEM_RDF_CATALOGUE",
        value_name = "FILE",
        help = "Reference vocabulary catalogue (Turtle)"
    )]
    pub catalogue: Option<PathBuf>,

    #[arg(
        short,
        long,
        env = "GEOCHEM_RDF_OUTPUT",
        value_name = "FILE",
        help = "Write the graph to FILE instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        env = "GEOCHEM_RDF_FORMAT",
        value_enum,
        value_name = "FORMAT",
        help = "Output syntax (defaults from the output extension, else ttl)"
    )]
    pub format: Option<OutputFormat>,

    #[arg(
        long,
        env = "GEOCHEM_RDF_UTM_ZONE",
        value_name = "ZONE",
        help = "UTM zone of workbook eastings/northings",
        value_parser = clap::value_parser!(u8).range(1..=60)
    )]
    pub utm_zone: Option<u8>,

    #[arg(
        long,
        env = "GEOCHEM_RDF_HEMISPHERE",
        value_enum,
        value_name = "HEMISPHERE",
        help = "Hemisphere of the UTM zone"
    )]
    pub hemisphere: Option<Hemisphere>,

    #[arg(
        long,
        env = "GEOCHEM_RDF_DATASET_NAMESPACE",
        value_name = "IRI",
        help = "Namespace for minted dataset IRIs"
    )]
    pub dataset_namespace: Option<String>,

    #[arg(long, help = "Print workbook information instead of converting")]
    pub info: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    workbook: Option<PathBuf>,
    catalogue: Option<PathBuf>,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    utm_zone: Option<u8>,
    hemisphere: Option<Hemisphere>,
    dataset_namespace: Option<String>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
