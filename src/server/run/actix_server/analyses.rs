//! Implementation of the `/api/v1/analyses` endpoints.

use actix_web::{
    delete, get,
    http::{header, StatusCode},
    post,
    web::{self, Data, Json, Path},
    HttpResponse,
};

use crate::analysis::{AnalysisResult, AnalysisStatus};
use crate::report;

use super::{CustomError, OwnerId, WebServerData};

/// Query parameters of the upload endpoint.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadQuery {
    /// Name of the uploaded file, must end in `.vcf`.
    pub filename: String,
}

/// Response of the upload endpoint.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct UploadResponse {
    /// Identifier of the new analysis.
    pub analysis_id: String,
    pub filename: String,
    /// Always `pending`.
    pub status: AnalysisStatus,
}

/// Upload a VCF file and schedule its analysis.
#[utoipa::path(
    post,
    operation_id = "analysesCreate",
    params(
        ("X-User-Id" = String, Header, description = "Owner identifier."),
        UploadQuery,
    ),
    request_body(content = String, description = "VCF file content.", content_type = "text/plain"),
    responses(
        (status = 202, description = "Analysis scheduled.", body = UploadResponse),
        (status = 400, description = "Not a VCF file.", body = CustomError),
        (status = 401, description = "Missing owner.", body = CustomError),
        (status = 413, description = "Upload too large."),
        (status = 500, description = "Internal server error.", body = CustomError)
    )
)]
#[post("/api/v1/analyses")]
async fn handle_create(
    data: Data<WebServerData>,
    owner: OwnerId,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> actix_web::Result<HttpResponse, CustomError> {
    let UploadQuery { filename } = query.into_inner();
    if !filename.ends_with(".vcf") {
        return Err(CustomError::with_status(
            StatusCode::BAD_REQUEST,
            anyhow::anyhow!("only VCF files are allowed: {}", &filename),
        ));
    }

    let analysis = AnalysisResult::new(&owner.0, &filename);
    data.store.put(&analysis)?;
    tracing::info!(
        "Created analysis {} for {} ({} bytes)",
        &analysis.id,
        &filename,
        body.len()
    );

    let response = UploadResponse {
        analysis_id: analysis.id.clone(),
        filename,
        status: analysis.status,
    };

    let store = data.store.clone();
    let pipeline = data.pipeline.clone();
    let id = analysis.id;
    actix_web::rt::spawn(async move {
        let task_id = id.clone();
        let result =
            web::block(move || pipeline.process(store.as_ref(), &owner.0, &id, &body)).await;
        match result {
            Ok(Ok(_)) => (),
            Ok(Err(e)) => tracing::error!("could not store analysis {}: {}", &task_id, e),
            Err(e) => tracing::error!("pipeline task of analysis {} failed: {}", &task_id, e),
        }
    });

    Ok(HttpResponse::Accepted().json(response))
}

/// List the analyses of the owner in creation order.
#[utoipa::path(
    get,
    operation_id = "analysesList",
    params(
        ("X-User-Id" = String, Header, description = "Owner identifier."),
    ),
    responses(
        (status = 200, description = "The owner's analyses.", body = Vec<AnalysisResult>),
        (status = 401, description = "Missing owner.", body = CustomError),
        (status = 500, description = "Internal server error.", body = CustomError)
    )
)]
#[get("/api/v1/analyses")]
async fn handle_list(
    data: Data<WebServerData>,
    owner: OwnerId,
) -> actix_web::Result<Json<Vec<AnalysisResult>>, CustomError> {
    Ok(Json(data.store.list_by_owner(&owner.0)?))
}

/// Fetch one analysis.
#[utoipa::path(
    get,
    operation_id = "analysesGet",
    params(
        ("X-User-Id" = String, Header, description = "Owner identifier."),
        ("id" = String, Path, description = "Analysis identifier."),
    ),
    responses(
        (status = 200, description = "The analysis.", body = AnalysisResult),
        (status = 401, description = "Missing owner.", body = CustomError),
        (status = 403, description = "Analysis of another owner.", body = CustomError),
        (status = 404, description = "Unknown analysis.", body = CustomError),
        (status = 500, description = "Internal server error.", body = CustomError)
    )
)]
#[get("/api/v1/analyses/{id}")]
async fn handle_get(
    data: Data<WebServerData>,
    owner: OwnerId,
    path: Path<String>,
) -> actix_web::Result<Json<AnalysisResult>, CustomError> {
    Ok(Json(data.store.get(&owner.0, &path.into_inner())?))
}

/// Delete one analysis.
#[utoipa::path(
    delete,
    operation_id = "analysesDelete",
    params(
        ("X-User-Id" = String, Header, description = "Owner identifier."),
        ("id" = String, Path, description = "Analysis identifier."),
    ),
    responses(
        (status = 204, description = "Analysis deleted."),
        (status = 401, description = "Missing owner.", body = CustomError),
        (status = 403, description = "Analysis of another owner.", body = CustomError),
        (status = 404, description = "Unknown analysis.", body = CustomError),
        (status = 500, description = "Internal server error.", body = CustomError)
    )
)]
#[delete("/api/v1/analyses/{id}")]
async fn handle_delete(
    data: Data<WebServerData>,
    owner: OwnerId,
    path: Path<String>,
) -> actix_web::Result<HttpResponse, CustomError> {
    let id = path.into_inner();
    data.store.delete(&owner.0, &id)?;
    tracing::info!("Deleted analysis {}", &id);
    Ok(HttpResponse::NoContent().finish())
}

/// Structured summary of one analysis.
#[utoipa::path(
    get,
    operation_id = "analysesSummary",
    params(
        ("X-User-Id" = String, Header, description = "Owner identifier."),
        ("id" = String, Path, description = "Analysis identifier."),
    ),
    responses(
        (status = 200, description = "The summary.", body = report::Summary),
        (status = 401, description = "Missing owner.", body = CustomError),
        (status = 403, description = "Analysis of another owner.", body = CustomError),
        (status = 404, description = "Unknown analysis.", body = CustomError),
        (status = 500, description = "Internal server error.", body = CustomError)
    )
)]
#[get("/api/v1/analyses/{id}/summary")]
async fn handle_summary(
    data: Data<WebServerData>,
    owner: OwnerId,
    path: Path<String>,
) -> actix_web::Result<Json<report::Summary>, CustomError> {
    let analysis = data.store.get(&owner.0, &path.into_inner())?;
    Ok(Json(report::Summary::from_analysis(&analysis)))
}

/// Download the text report of a completed analysis.
#[utoipa::path(
    get,
    operation_id = "analysesReport",
    params(
        ("X-User-Id" = String, Header, description = "Owner identifier."),
        ("id" = String, Path, description = "Analysis identifier."),
    ),
    responses(
        (status = 200, description = "The report.", body = String, content_type = "text/plain"),
        (status = 401, description = "Missing owner.", body = CustomError),
        (status = 403, description = "Analysis of another owner.", body = CustomError),
        (status = 404, description = "Unknown analysis.", body = CustomError),
        (status = 409, description = "Analysis not completed.", body = CustomError),
        (status = 500, description = "Internal server error.", body = CustomError)
    )
)]
#[get("/api/v1/analyses/{id}/report")]
async fn handle_report(
    data: Data<WebServerData>,
    owner: OwnerId,
    path: Path<String>,
) -> actix_web::Result<HttpResponse, CustomError> {
    let analysis = data.store.get(&owner.0, &path.into_inner())?;
    if analysis.status != AnalysisStatus::Completed {
        return Err(CustomError::with_status(
            StatusCode::CONFLICT,
            anyhow::anyhow!("analysis is {}, not completed", analysis.status),
        ));
    }

    let now = chrono::Utc::now();
    let text = report::render_text(&analysis, now).map_err(CustomError::new)?;
    let filename = report::report_filename(&analysis.id, now);
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(text))
}
