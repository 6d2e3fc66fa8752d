// src/handlers/audit.rs

use axum::{
    extract::{Query, State},
    Json,
};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::Page},
    config::AppState,
    middleware::campus::CampusContext,
    models::audit::{AuditLogEntry, AuditQuery},
};

#[utoipa::path(
    get,
    path = "/api/audit",
    tag = "Audit",
    params(
        AuditQuery,
        ("x-campus-id" = Option<Uuid>, Header, description = "Campus selecionado (admin)")
    ),
    responses((status = 200, description = "Histórico de alterações", body = Page<AuditLogEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_audit_log(
    State(app_state): State<AppState>,
    CampusContext(scope): CampusContext,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Page<AuditLogEntry>>, AppError> {
    Ok(Json(app_state.audit_service.list(scope, &query).await?))
}
