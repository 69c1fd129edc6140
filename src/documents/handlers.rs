use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    app_state::AppState, converter::OutputFormat, documents::dtos::ErrorResponse,
};

async fn serve_latest(state: &AppState, format: OutputFormat) -> Response {
    let Some(converter) = state.converters.get(format) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("no converter registered for {}", format),
            }),
        )
            .into_response();
    };

    match state.pipeline.run(converter).await {
        Ok(payload) => payload.into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/latest-pdf",
    tag = "documents",
    responses(
        (status = 200, description = "The latest PDF, unchanged"),
        (status = 500, description = "Listing unavailable or no document links", body = ErrorResponse),
        (status = 502, description = "Document download failed", body = ErrorResponse)
    )
)]
pub async fn latest_pdf(State(state): State<AppState>) -> Response {
    serve_latest(&state, OutputFormat::Pdf).await
}

#[utoipa::path(
    get,
    path = "/api/latest-pdf-excel",
    tag = "documents",
    responses(
        (status = 200, description = "Tables of the latest PDF as an xlsx workbook"),
        (status = 500, description = "Listing, extraction or conversion failure", body = ErrorResponse),
        (status = 502, description = "Document download failed", body = ErrorResponse)
    )
)]
pub async fn latest_table_spreadsheet(State(state): State<AppState>) -> Response {
    serve_latest(&state, OutputFormat::TableSpreadsheet).await
}

#[utoipa::path(
    get,
    path = "/api/latest-pdf-lines-excel",
    tag = "documents",
    responses(
        (status = 200, description = "Text lines of the latest PDF as an xlsx workbook"),
        (status = 500, description = "Listing or conversion failure", body = ErrorResponse),
        (status = 502, description = "Document download failed", body = ErrorResponse)
    )
)]
pub async fn latest_line_spreadsheet(State(state): State<AppState>) -> Response {
    serve_latest(&state, OutputFormat::LineSpreadsheet).await
}

#[utoipa::path(
    get,
    path = "/api/latest-pdf-word",
    tag = "documents",
    responses(
        (status = 200, description = "Text lines of the latest PDF as a docx table"),
        (status = 500, description = "Listing or conversion failure", body = ErrorResponse),
        (status = 502, description = "Document download failed", body = ErrorResponse)
    )
)]
pub async fn latest_line_document(State(state): State<AppState>) -> Response {
    serve_latest(&state, OutputFormat::LineDocument).await
}

#[utoipa::path(
    get,
    path = "/api/latest/{format}",
    tag = "documents",
    params(
        ("format" = String, Path, description = "One of pdf, xlsx, lines-xlsx, docx")
    ),
    responses(
        (status = 200, description = "The latest document in the requested format"),
        (status = 404, description = "Unknown format", body = ErrorResponse),
        (status = 500, description = "Listing, extraction or conversion failure", body = ErrorResponse),
        (status = 502, description = "Document download failed", body = ErrorResponse)
    )
)]
pub async fn latest_in_format(
    State(state): State<AppState>,
    Path(format): Path<String>,
) -> Response {
    match format.parse::<OutputFormat>() {
        Ok(format) => serve_latest(&state, format).await,
        Err(error) => (StatusCode::NOT_FOUND, Json(ErrorResponse { error })).into_response(),
    }
}
