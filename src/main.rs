use clap::Parser;
use geochem_rdf::{CliArgs, ConversionError, ConverterConfig, LoggingConfig, init_logging, run};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = CliArgs::parse();
    let config = ConverterConfig::from_args(cli);

    let graph_on_stdout = config.as_ref().is_ok_and(ConverterConfig::writes_to_stdout);
    let logging_config = LoggingConfig::from_env().keep_stdout_clean(graph_on_stdout);
    let _guard = match init_logging(logging_config) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("failed to initialize logging: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = config.and_then(|config| run(&config));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ConversionError>() {
                Some(conversion) => {
                    let kind = conversion.kind();
                    tracing::error!(
                        code = kind.code(),
                        category = kind.category(),
                        "{conversion}"
                    );
                }
                None => tracing::error!("{err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
