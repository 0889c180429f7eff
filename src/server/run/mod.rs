use std::path::PathBuf;

use crate::annotate::AnnotationSource;
use crate::pipeline::{ConfigBuilder, Pipeline};
use crate::score::ScoringModel;

/// Implementation of Actix server.
pub mod actix_server;

/// Module with OpenAPI documentation.
pub mod openapi {
    use crate::analysis::{AnalysisResult, AnalysisStatus};
    use crate::annotate::{
        AnnotatedVariant, Annotation, AnnotationSource, Pathogenicity, RiskTier,
    };
    use crate::report::{Share, Summary, VariantSummary};
    use crate::score::{RiskClass, ScoringModel};
    use crate::server::run::actix_server::analyses::UploadResponse;
    use crate::server::run::actix_server::versions::{
        ActiveConfig, SoftwareVersions, VersionsInfoResponse,
    };
    use crate::vcf::VariantRecord;

    use super::actix_server::{analyses, versions, CustomError};

    /// Utoipa-based `OpenAPI` generation helper.
    #[derive(utoipa::OpenApi)]
    #[openapi(
        paths(
            versions::handle,
            analyses::handle_create,
            analyses::handle_list,
            analyses::handle_get,
            analyses::handle_delete,
            analyses::handle_summary,
            analyses::handle_report,
        ),
        components(schemas(
            CustomError,
            VersionsInfoResponse,
            SoftwareVersions,
            ActiveConfig,
            AnnotationSource,
            ScoringModel,
            UploadResponse,
            AnalysisResult,
            AnalysisStatus,
            AnnotatedVariant,
            Annotation,
            VariantRecord,
            RiskTier,
            Pathogenicity,
            RiskClass,
            Summary,
            Share,
            VariantSummary,
        ))
    )]
    pub struct ApiDoc;
}

/// Default upload size limit of 100 MiB.
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 100 * 1024 * 1024;

/// Command line arguments for `server run` command.
#[derive(clap::Parser, Debug)]
#[command(about = "Run GenomeGuard REST API server", long_about = None)]
pub struct Args {
    /// Path to the RocksDB analysis database; analyses are kept in memory if missing.
    #[arg(long, env = "GENOMEGUARD_PATH_DB")]
    pub path_db: Option<PathBuf>,

    /// Maximal size of an uploaded VCF file in bytes.
    #[arg(long, env = "GENOMEGUARD_MAX_UPLOAD_SIZE", default_value_t = DEFAULT_MAX_UPLOAD_SIZE)]
    pub max_upload_size: usize,

    /// Where annotations come from.
    #[arg(long, value_enum, default_value_t = AnnotationSource::default())]
    pub annotation_source: AnnotationSource,

    /// Scoring formula.
    #[arg(long, value_enum, default_value_t = ScoringModel::default())]
    pub scoring_model: ScoringModel,

    /// Whether to suppress printing hints.
    #[arg(long, default_value_t = false)]
    pub suppress_hints: bool,

    /// IP to listen on.
    #[arg(long, env = "GENOMEGUARD_LISTEN_HOST", default_value = "127.0.0.1")]
    pub listen_host: String,

    /// Port to listen on.
    #[arg(long, env = "GENOMEGUARD_LISTEN_PORT", default_value_t = 8080)]
    pub listen_port: u16,
}

/// Print some hints via `tracing::info!`.
fn print_hints(args: &Args) {
    tracing::info!(
        "Launching server main on http://{}:{} ...",
        args.listen_host.as_str(),
        args.listen_port
    );

    // Short-circuit if no hints are to be
    if args.suppress_hints {
        return;
    }

    let base = format!(
        "http://{host}:{port}",
        host = args.listen_host,
        port = args.listen_port
    );
    tracing::info!("  try: {}/swagger-ui/", base);
    tracing::info!("  try: curl {}/api/v1/versionsInfo", base);
    tracing::info!(
        "  try: curl -H 'X-User-Id: alice' --data-binary @sample.vcf '{}{}'",
        base,
        "/api/v1/analyses?filename=sample.vcf"
    );
    tracing::info!("  try: curl -H 'X-User-Id: alice' {}/api/v1/analyses", base);
}

/// Main entry point for `server run` sub command.
///
/// # Errors
///
/// In the case that there is an error running the server.
pub async fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    if let Some(log::Level::Trace | log::Level::Debug) = args_common.verbose.log_level() {
        // SAFETY: This environment variable is set during server initialization,
        // before any worker threads are spawned. At this point, only the main thread
        // is running, making this operation thread-safe.
        unsafe { std::env::set_var("RUST_LOG", "debug") };
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    tracing::info!("Opening analysis store...");
    let before_loading = std::time::Instant::now();
    let store = crate::storage::open_store(args.path_db.as_deref())?;
    let storage_backend = match &args.path_db {
        Some(_) => "rocksdb",
        None => "memory",
    };
    let config = ConfigBuilder::default()
        .annotation_source(args.annotation_source)
        .scoring_model(args.scoring_model)
        .build()?;
    let data = actix_web::web::Data::new(actix_server::WebServerData {
        store,
        storage_backend: storage_backend.to_string(),
        pipeline: Pipeline::new(config),
    });
    tracing::info!("... done opening store {:?}", before_loading.elapsed());

    // Print the server URL and some hints (the latter: unless suppressed).
    print_hints(args);
    // Launch the Actix web server.
    actix_server::main(args, data).await?;

    tracing::info!("All done. Have a nice day!");
    Ok(())
}
