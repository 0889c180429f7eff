use actix_web::{
    get,
    web::{Data, Json},
};

use crate::annotate::AnnotationSource;
use crate::score::ScoringModel;

use super::CustomError;

/// Software version specification.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize, utoipa::ToSchema)]
pub struct SoftwareVersions {
    /// Version of `genomeguard`.
    pub genomeguard: String,
    /// Version of the Rust compiler used for the build.
    pub rustc: String,
}

impl SoftwareVersions {
    /// Create a new `SoftwareVersions` instance.
    pub fn new() -> Self {
        Self {
            genomeguard: crate::common::version().to_string(),
            rustc: crate::built_info::RUSTC_VERSION.to_string(),
        }
    }
}

impl Default for SoftwareVersions {
    fn default() -> Self {
        Self::new()
    }
}

/// Active configuration of the server.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize, utoipa::ToSchema)]
pub struct ActiveConfig {
    /// Where annotations come from.
    pub annotation_source: AnnotationSource,
    /// Scoring formula.
    pub scoring_model: ScoringModel,
    /// Whether scores are perturbed by noise.
    pub noise: bool,
    /// Storage backend of the analyses.
    pub storage_backend: String,
}

/// Response of the `/api/v1/versionsInfo` endpoint.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize, utoipa::ToSchema)]
pub struct VersionsInfoResponse {
    /// Software versions specification.
    pub software: SoftwareVersions,
    /// Configuration specification.
    pub config: ActiveConfig,
}

impl VersionsInfoResponse {
    /// Create a new `VersionsInfoResponse` instance from the given `WebServerData`.
    pub fn from_web_server_data(data: &super::WebServerData) -> Self {
        let config = data.pipeline.config();
        Self {
            software: SoftwareVersions::new(),
            config: ActiveConfig {
                annotation_source: config.annotation_source,
                scoring_model: config.scoring_model,
                noise: config.noise != crate::score::Noise::None,
                storage_backend: data.storage_backend.clone(),
            },
        }
    }
}

/// Query for software version and configuration.
#[allow(clippy::unused_async)]
#[utoipa::path(
    get,
    operation_id = "versionsInfo",
    responses(
        (status = 200, description = "Version information.", body = VersionsInfoResponse),
        (status = 500, description = "Internal server error.", body = CustomError)
    )
)]
#[get("/api/v1/versionsInfo")]
async fn handle(
    data: Data<super::WebServerData>,
) -> actix_web::Result<Json<VersionsInfoResponse>, CustomError> {
    Ok(Json(VersionsInfoResponse::from_web_server_data(
        data.into_inner().as_ref(),
    )))
}
