use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::models::Ncm;
use crate::services::ncm_service;

/// CSV download of the full NCM master table, one row per code.
#[utoipa::path(
    get,
    path = "/api/ncms/export/planilha",
    responses(
        (status = 200, description = "CSV spreadsheet of the NCM master table")
    )
)]
pub async fn export_planilha(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    let ncms = match ncm_service::list_all(&db).await {
        Ok(ncms) => ncms,
        Err(e) => {
            tracing::error!("NCM export failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "Erro ao gerar planilha" })),
            )
                .into_response();
        }
    };

    let csv_bytes = match build_csv(&ncms) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("NCM spreadsheet encoding failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "Erro ao gerar planilha" })),
            )
                .into_response();
        }
    };

    let filename = format!("NCMs-MERCOSUL-{}.csv", chrono::Utc::now().format("%Y-%m-%d"));

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, "text/csv; charset=utf-8".parse().unwrap());
    headers.insert(
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{}\"", filename)
            .parse()
            .unwrap(),
    );

    (StatusCode::OK, headers, csv_bytes).into_response()
}

fn build_csv(ncms: &[Ncm]) -> Result<Vec<u8>, String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(["Código NCM", "Descrição", "Classificação", "Características"])
        .map_err(|e| e.to_string())?;

    for ncm in ncms {
        let tags = ncm.tags.join(", ");
        writer
            .write_record([
                ncm.code.as_str(),
                ncm.description.as_str(),
                ncm.classification.as_str(),
                tags.as_str(),
            ])
            .map_err(|e| e.to_string())?;
    }

    writer.into_inner().map_err(|e| e.to_string())
}
