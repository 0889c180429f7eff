//! GenomeGuard library main entry point.
//!
//! Reads VCF files, annotates the variants with disease associations, derives a heuristic
//! risk score and renders reports.  The same pipeline backs the `analyze` CLI command and
//! the REST server.

pub mod analysis;
pub mod analyze;
pub mod annotate;
pub mod common;
pub mod pipeline;
pub mod report;
pub mod score;
pub mod server;
pub mod storage;
pub mod vcf;

/// Information about the build.
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}
