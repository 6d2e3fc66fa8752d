// src/handlers/dashboard.rs

use axum::{extract::State, Json};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::campus::CampusContext,
    models::dashboard::DashboardSummary,
};

// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Resumo do inventário, empréstimos e chamados", body = DashboardSummary),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Campus fora do escopo")
    ),
    params(
        ("x-campus-id" = Option<Uuid>, Header, description = "Campus selecionado (admin)")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    CampusContext(scope): CampusContext,
) -> Result<Json<DashboardSummary>, AppError> {
    let summary = app_state.dashboard_service.get_summary(scope).await?;
    Ok(Json(summary))
}
