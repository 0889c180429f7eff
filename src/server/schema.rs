//! Dump the OpenAPI schema of the REST API server.

use std::{
    io::{self, Write},
    path::PathBuf,
};

use utoipa::OpenApi as _;

use crate::common::io::std::open_write_maybe_gz;
use crate::server::run::openapi::ApiDoc;

/// Command line arguments for `server schema` sub command.
#[derive(clap::Parser, Debug, Clone)]
#[command(author, version, about = "Dump REST API schema", long_about = None)]
pub struct Args {
    /// Path to the output file.  Use stdout if missing.
    #[arg(long)]
    pub output_file: Option<PathBuf>,
}

impl Args {
    /// Get writeable output file or stdout.
    fn get_output(&self) -> Result<Box<dyn Write>, anyhow::Error> {
        match &self.output_file {
            Some(path) => open_write_maybe_gz(path),
            None => Ok(Box::new(io::stdout())),
        }
    }
}

/// The schema rendered as YAML.
pub fn schema_yaml() -> Result<String, anyhow::Error> {
    ApiDoc::openapi()
        .to_yaml()
        .map_err(|e| anyhow::anyhow!("Failed to convert OpenAPI to YAML: {}", e))
}

/// Main entry point for `server schema` sub command.
///
/// # Errors
///
/// If the schema cannot be rendered or written.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    let schema_yaml = schema_yaml()?;
    let mut output = args
        .get_output()
        .map_err(|e| anyhow::anyhow!("Failed to open output file: {}", e))?;
    write!(output, "{}", &schema_yaml)
        .map_err(|e| anyhow::anyhow!("Failed to write output: {}", e))?;
    output.flush()?;

    tracing::info!("All done. Have a nice day!");
    Ok(())
}
