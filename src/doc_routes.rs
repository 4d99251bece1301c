use std::sync::Arc;

use aide::{axum::ApiRouter, openapi::OpenApi, scalar::Scalar};
use axum::{response::IntoResponse, Extension, Json};

pub(crate) fn docs_routes() -> ApiRouter {
    ApiRouter::new()
        .route(
            "/",
            axum::routing::get(
                Scalar::new("/docs/api.json")
                    .with_title("blockduel")
                    .axum_handler(),
            ),
        )
        .route("/api.json", axum::routing::get(serve_docs))
}

async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoResponse {
    Json(api.as_ref().clone())
}
