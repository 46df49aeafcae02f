use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::ncm::search_ncms,
        api::ncm::list_ncms,
        api::ncm::count_ncms,
        api::ncm::list_tag_counts,
        api::ncm::get_ncm,
        api::export::export_planilha,
    ),
    tags(
        (name = "achei-meu-frete", description = "Achei Meu Frete NCM API")
    )
)]
pub struct ApiDoc;
