// src/handlers/reports.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, middleware::campus::CampusContext};

fn attachment(content_type: &'static str, filename: String, body: Vec<u8>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        body,
    )
}

#[utoipa::path(
    get,
    path = "/api/reports/inventory.csv",
    tag = "Reports",
    params(("x-campus-id" = Option<Uuid>, Header, description = "Campus selecionado (admin)")),
    responses((status = 200, description = "Inventário em CSV", body = String, content_type = "text/csv")),
    security(("api_jwt" = []))
)]
pub async fn inventory_csv(
    State(app_state): State<AppState>,
    CampusContext(scope): CampusContext,
) -> Result<impl IntoResponse, AppError> {
    let csv = app_state.report_service.inventory_csv(scope).await?;
    Ok(attachment("text/csv; charset=utf-8", "inventario.csv".into(), csv))
}

#[utoipa::path(
    get,
    path = "/api/reports/inventory.pdf",
    tag = "Reports",
    params(("x-campus-id" = Option<Uuid>, Header, description = "Campus selecionado (admin)")),
    responses((status = 200, description = "Relatório de inventário em PDF", body = String, content_type = "application/pdf")),
    security(("api_jwt" = []))
)]
pub async fn inventory_pdf(
    State(app_state): State<AppState>,
    CampusContext(scope): CampusContext,
) -> Result<impl IntoResponse, AppError> {
    let pdf = app_state.report_service.inventory_pdf(scope).await?;
    Ok(attachment("application/pdf", "inventario.pdf".into(), pdf))
}

#[utoipa::path(
    get,
    path = "/api/reports/loans/{id}/receipt.pdf",
    tag = "Reports",
    params(("id" = Uuid, Path, description = "ID do empréstimo")),
    responses(
        (status = 200, description = "Comprovante de empréstimo com QR code", body = String, content_type = "application/pdf"),
        (status = 404, description = "Empréstimo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn loan_receipt_pdf(
    State(app_state): State<AppState>,
    CampusContext(scope): CampusContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let pdf = app_state.report_service.loan_receipt_pdf(scope, id).await?;
    Ok(attachment("application/pdf", format!("emprestimo-{}.pdf", id), pdf))
}
