use axum::{Router, routing::get};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    app_state::AppState,
    converter::OutputFormat,
    documents::{dtos::ErrorResponse, handlers},
    health::{self, HealthResponse},
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "latestdoc",
        description = "Serves the newest document from a listing page as PDF, xlsx or docx"
    ),
    paths(
        handlers::latest_pdf,
        handlers::latest_table_spreadsheet,
        handlers::latest_line_spreadsheet,
        handlers::latest_line_document,
        handlers::latest_in_format,
        health::health_check,
    ),
    components(schemas(ErrorResponse, HealthResponse, OutputFormat)),
    tags(
        (name = "documents", description = "Latest document downloads"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

/// Every route the service exposes, with request ids and tracing applied.
///
/// - `GET /api/latest-pdf`
/// - `GET /api/latest-pdf-excel`
/// - `GET /api/latest-pdf-lines-excel`
/// - `GET /api/latest-pdf-word`
/// - `GET /api/latest/{format}`
/// - `GET /healthz`
/// - `GET /api-docs/openapi.json` and `/swagger-ui`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/latest-pdf", get(handlers::latest_pdf))
        .route(
            "/api/latest-pdf-excel",
            get(handlers::latest_table_spreadsheet),
        )
        .route(
            "/api/latest-pdf-lines-excel",
            get(handlers::latest_line_spreadsheet),
        )
        .route("/api/latest-pdf-word", get(handlers::latest_line_document))
        .route("/api/latest/{format}", get(handlers::latest_in_format))
        .route("/healthz", get(health::health_check))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        // Last layer added runs first: the id is set before the trace span opens.
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
