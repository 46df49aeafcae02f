use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::services::ncm_service;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub tags: Option<String>,
    pub limit: Option<u64>,
}

fn parse_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

fn internal_error(message: &str, err: ncm_service::ServiceError) -> Response {
    tracing::error!("{}: {}", message, err);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "error": message })),
    )
        .into_response()
}

/// Smart search over the NCM master table (minimum 4 characters).
#[utoipa::path(
    get,
    path = "/api/ncms/search",
    responses(
        (status = 200, description = "Matching NCM records")
    )
)]
pub async fn search_ncms(
    State(db): State<DatabaseConnection>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let query = params.query.unwrap_or_default();

    match ncm_service::search_ncms(&db, &query, params.limit).await {
        Ok(data) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": data })),
        )
            .into_response(),
        Err(e) => internal_error("Erro ao buscar NCMs", e),
    }
}

/// List NCM records, optionally filtered by tag membership
/// (`?tags=perishable,chemical`).
#[utoipa::path(
    get,
    path = "/api/ncms",
    responses(
        (status = 200, description = "NCM records, optionally filtered by tags")
    )
)]
pub async fn list_ncms(
    State(db): State<DatabaseConnection>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let tags = parse_tags(params.tags.as_deref());

    match ncm_service::list_ncms(&db, &tags, params.limit).await {
        Ok(data) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": data })),
        )
            .into_response(),
        Err(e) => internal_error("Erro ao listar NCMs", e),
    }
}

/// Total record count, plus the tag-filtered count when `tags` is given.
#[utoipa::path(
    get,
    path = "/api/ncms/count",
    responses(
        (status = 200, description = "NCM record counts")
    )
)]
pub async fn count_ncms(
    State(db): State<DatabaseConnection>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let tags = parse_tags(params.tags.as_deref());

    let total = match ncm_service::count_ncms(&db, &[]).await {
        Ok(n) => n,
        Err(e) => return internal_error("Erro ao contar NCMs", e),
    };

    let mut body = json!({ "success": true, "total": total });

    if !tags.is_empty() {
        match ncm_service::count_ncms(&db, &tags).await {
            Ok(n) => body["filtered"] = json!(n),
            Err(e) => return internal_error("Erro ao contar NCMs", e),
        }
    }

    (StatusCode::OK, Json(body)).into_response()
}

/// Tags in use with per-tag record counts.
#[utoipa::path(
    get,
    path = "/api/ncms/tags",
    responses(
        (status = 200, description = "Tags in use with record counts")
    )
)]
pub async fn list_tag_counts(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match ncm_service::list_tag_counts(&db).await {
        Ok(data) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": data })),
        )
            .into_response(),
        Err(e) => internal_error("Erro ao listar características", e),
    }
}

/// Fetch a single record by its 8-digit code.
#[utoipa::path(
    get,
    path = "/api/ncms/{code}",
    params(
        ("code" = String, Path, description = "8-digit NCM code")
    ),
    responses(
        (status = 200, description = "NCM record"),
        (status = 400, description = "Malformed code"),
        (status = 404, description = "Unknown code")
    )
)]
pub async fn get_ncm(
    State(db): State<DatabaseConnection>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    if code.len() != 8 || !code.chars().all(|c| c.is_ascii_digit()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "Código NCM inválido" })),
        )
            .into_response();
    }

    match ncm_service::get_by_code(&db, &code).await {
        Ok(data) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": data })),
        )
            .into_response(),
        Err(ncm_service::ServiceError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "error": "NCM não encontrado" })),
        )
            .into_response(),
        Err(e) => internal_error("Erro ao buscar NCM", e),
    }
}
