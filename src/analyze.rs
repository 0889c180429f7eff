//! Implementation of the `analyze` sub command.

use std::io::Write;
use std::path::Path;

use clap::Parser;

use crate::analysis::{AnalysisResult, AnalysisStatus};
use crate::annotate::AnnotationSource;
use crate::common::io::std::{open_read_maybe_gz, open_write_maybe_gz};
use crate::pipeline::{ConfigBuilder, Pipeline};
use crate::report;
use crate::score::{parse_noise_amplitude, Noise, ScoringModel};

/// Output format of `analyze`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, clap::ValueEnum,
)]
#[strum(serialize_all = "kebab-case")]
pub enum OutputFormat {
    /// The full analysis record as JSON.
    #[default]
    Json,
    /// The structured summary as JSON.
    Summary,
    /// The plain text report.
    Report,
}

/// Command line arguments for `analyze` sub command.
#[derive(Parser, Debug)]
#[command(about = "Annotate and score a VCF file", long_about = None)]
pub struct Args {
    /// Path to the input VCF file, may be gzip-compressed.
    #[arg(long)]
    pub path_input_vcf: String,
    /// Path to the output file.  Use stdout if missing.
    #[arg(long)]
    pub path_output: Option<String>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::default())]
    pub format: OutputFormat,
    /// Where annotations come from.
    #[arg(long, value_enum, default_value_t = AnnotationSource::default())]
    pub annotation_source: AnnotationSource,
    /// Scoring formula.
    #[arg(long, value_enum, default_value_t = ScoringModel::default())]
    pub scoring_model: ScoringModel,
    /// Amplitude of uniform noise added to the score, at most `1.0`; no noise if missing.
    #[arg(long, allow_negative_numbers = true, value_parser = parse_noise_amplitude)]
    pub noise_amplitude: Option<f64>,
    /// Seed of the noise generator.
    #[arg(long, requires = "noise_amplitude")]
    pub noise_seed: Option<u64>,
    /// Owner identifier written to the analysis.
    #[arg(long, default_value = "local")]
    pub owner: String,
}

impl Args {
    fn output(&self) -> Result<Box<dyn Write>, anyhow::Error> {
        match &self.path_output {
            Some(path) => open_write_maybe_gz(path)
                .map_err(|e| anyhow::anyhow!("could not open output file {}: {}", path, e)),
            None => Ok(Box::new(std::io::stdout())),
        }
    }
}

/// Write `analysis` to `out` in `format`.
fn write_output(
    out: &mut dyn Write,
    analysis: &AnalysisResult,
    format: OutputFormat,
) -> Result<(), anyhow::Error> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, analysis)?;
            writeln!(out)?;
        }
        OutputFormat::Summary => {
            serde_json::to_writer_pretty(&mut *out, &report::Summary::from_analysis(analysis))?;
            writeln!(out)?;
        }
        OutputFormat::Report => {
            write!(out, "{}", report::render_text(analysis, chrono::Utc::now())?)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Main entry point for `analyze` sub command.
///
/// # Errors
///
/// If the files cannot be read or written, or if the analysis fails.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    let config = ConfigBuilder::default()
        .annotation_source(args.annotation_source)
        .scoring_model(args.scoring_model)
        .noise(Noise::from_args(args.noise_amplitude, args.noise_seed)?)
        .build()?;
    let pipeline = Pipeline::new(config);

    let filename = Path::new(&args.path_input_vcf)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| args.path_input_vcf.clone());
    let mut analysis = AnalysisResult::new(&args.owner, &filename);

    let reader = open_read_maybe_gz(&args.path_input_vcf).map_err(|e| {
        anyhow::anyhow!("could not open input file {}: {}", &args.path_input_vcf, e)
    })?;
    pipeline.analyze(&mut analysis, reader)?;

    let mut out = args.output()?;
    write_output(out.as_mut(), &analysis, args.format)?;

    if analysis.status == AnalysisStatus::Failed {
        anyhow::bail!(
            "analysis failed: {}",
            analysis.error_message.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}
