pub mod export;
pub mod health;
pub mod ncm;

use axum::{Router, routing::get};
use sea_orm::DatabaseConnection;

pub fn api_router(db: DatabaseConnection) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // NCM master table
        .route("/ncms", get(ncm::list_ncms))
        .route("/ncms/search", get(ncm::search_ncms))
        .route("/ncms/count", get(ncm::count_ncms))
        .route("/ncms/tags", get(ncm::list_tag_counts))
        .route("/ncms/export/planilha", get(export::export_planilha))
        .route("/ncms/:code", get(ncm::get_ncm))
        .with_state(db)
}
