// src/handlers/loans.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, campus::CampusContext},
    models::loan::{CreateLoanPayload, LoanQuery, LoanView, ReturnLoanPayload},
};

#[utoipa::path(
    get,
    path = "/api/loans",
    tag = "Loans",
    params(
        LoanQuery,
        ("x-campus-id" = Option<Uuid>, Header, description = "Campus selecionado (admin)")
    ),
    responses((status = 200, description = "Empréstimos", body = Vec<LoanView>)),
    security(("api_jwt" = []))
)]
pub async fn list_loans(
    State(app_state): State<AppState>,
    CampusContext(scope): CampusContext,
    Query(query): Query<LoanQuery>,
) -> Result<Json<Vec<LoanView>>, AppError> {
    Ok(Json(app_state.loan_service.list_loans(scope, &query).await?))
}

#[utoipa::path(
    get,
    path = "/api/loans/{id}",
    tag = "Loans",
    params(("id" = Uuid, Path, description = "ID do empréstimo")),
    responses(
        (status = 200, description = "Empréstimo", body = LoanView),
        (status = 404, description = "Empréstimo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_loan(
    State(app_state): State<AppState>,
    CampusContext(scope): CampusContext,
    Path(id): Path<Uuid>,
) -> Result<Json<LoanView>, AppError> {
    Ok(Json(app_state.loan_service.get_loan(scope, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/loans",
    tag = "Loans",
    request_body = CreateLoanPayload,
    responses(
        (status = 201, description = "Empréstimo registrado", body = LoanView),
        (status = 404, description = "Item não encontrado"),
        (status = 409, description = "Item já emprestado ou descartado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_loan(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    CampusContext(scope): CampusContext,
    Json(payload): Json<CreateLoanPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let loan = app_state.loan_service.create_loan(&user, scope, payload).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

#[utoipa::path(
    post,
    path = "/api/loans/{id}/return",
    tag = "Loans",
    params(("id" = Uuid, Path, description = "ID do empréstimo")),
    request_body = ReturnLoanPayload,
    responses(
        (status = 200, description = "Devolução registrada", body = LoanView),
        (status = 409, description = "Empréstimo já devolvido")
    ),
    security(("api_jwt" = []))
)]
pub async fn return_loan(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    CampusContext(scope): CampusContext,
    Path(id): Path<Uuid>,
    payload: Option<Json<ReturnLoanPayload>>,
) -> Result<Json<LoanView>, AppError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let loan = app_state.loan_service.return_loan(&user, scope, id, payload).await?;
    Ok(Json(loan))
}
