//! Run the server.

use std::sync::Arc;

use actix_web::{http::StatusCode, web, FromRequest, HttpRequest, HttpResponse, ResponseError};
use utoipa::OpenApi as _;

use crate::pipeline::Pipeline;
use crate::storage::{AnalysisStore, StoreError};

pub mod analyses;
pub mod versions;

/// Header carrying the owner identifier set by the upstream gateway.
pub const OWNER_HEADER: &str = "X-User-Id";

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct CustomError {
    err: String,
    #[serde(skip)]
    status: StatusCode,
}

impl std::fmt::Display for CustomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.err)
    }
}

impl CustomError {
    /// Internal server error.
    fn new(err: anyhow::Error) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    fn with_status(status: StatusCode, err: anyhow::Error) -> Self {
        CustomError {
            err: err.to_string(),
            status,
        }
    }
}

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(self)
    }
}

impl From<StoreError> for CustomError {
    fn from(err: StoreError) -> Self {
        let status = match &err {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Forbidden(_) => StatusCode::FORBIDDEN,
            StoreError::InvalidTransition(_) => StatusCode::CONFLICT,
            StoreError::Backend(_) | StoreError::Serialization(_) => {
                tracing::error!("storage error: {}", &err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::with_status(status, err.into())
    }
}

/// Owner identifier of a request, from the `X-User-Id` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerId(pub String);

impl FromRequest for OwnerId {
    type Error = CustomError;
    type Future = std::future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let owner = req
            .headers()
            .get(OWNER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());
        std::future::ready(match owner {
            Some(owner) => Ok(OwnerId(owner.to_string())),
            None => Err(CustomError::with_status(
                StatusCode::UNAUTHORIZED,
                anyhow::anyhow!("missing {} header", OWNER_HEADER),
            )),
        })
    }
}

/// Data structure for the web server data.
#[derive(derivative::Derivative)]
#[derivative(Debug)]
pub struct WebServerData {
    /// Storage of the analyses.
    #[derivative(Debug = "ignore")]
    pub store: Arc<dyn AnalysisStore>,
    /// Name of the storage backend, for the versions endpoint.
    pub storage_backend: String,
    /// The pipeline run on each upload.
    pub pipeline: Pipeline,
}

/// Register the endpoints.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(analyses::handle_create)
        .service(analyses::handle_list)
        .service(analyses::handle_get)
        .service(analyses::handle_delete)
        .service(analyses::handle_summary)
        .service(analyses::handle_report)
        .service(versions::handle);
}

/// Main entry point for running the REST server.
#[allow(clippy::unused_async)]
pub async fn main(
    args: &super::Args,
    data: actix_web::web::Data<WebServerData>,
) -> std::io::Result<()> {
    let max_upload_size = args.max_upload_size;
    actix_web::HttpServer::new(move || {
        actix_web::App::new()
            .app_data(data.clone())
            .app_data(web::PayloadConfig::new(max_upload_size))
            .configure(configure)
            .service(
                utoipa_swagger_ui::SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", super::openapi::ApiDoc::openapi()),
            )
            .wrap(actix_web::middleware::Logger::default())
    })
    .bind((args.listen_host.as_str(), args.listen_port))?
    .run()
    .await
}
