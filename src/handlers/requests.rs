// src/handlers/requests.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::Page},
    config::AppState,
    middleware::campus::CampusContext,
    models::request::{CreateRequestPayload, RequestQuery, SupportRequest, UpdateRequestStatusPayload},
};

// Público: qualquer pessoa do campus pode abrir um chamado
#[utoipa::path(
    post,
    path = "/api/requests",
    tag = "Requests",
    request_body = CreateRequestPayload,
    responses(
        (status = 201, description = "Chamado aberto", body = SupportRequest),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Campus ou setor não encontrado")
    )
)]
pub async fn create_request(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateRequestPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let request = app_state.request_service.create_request(&payload).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[utoipa::path(
    get,
    path = "/api/requests",
    tag = "Requests",
    params(
        RequestQuery,
        ("x-campus-id" = Option<Uuid>, Header, description = "Campus selecionado (admin)")
    ),
    responses((status = 200, description = "Chamados", body = Page<SupportRequest>)),
    security(("api_jwt" = []))
)]
pub async fn list_requests(
    State(app_state): State<AppState>,
    CampusContext(scope): CampusContext,
    Query(query): Query<RequestQuery>,
) -> Result<Json<Page<SupportRequest>>, AppError> {
    Ok(Json(app_state.request_service.list_requests(scope, &query).await?))
}

#[utoipa::path(
    get,
    path = "/api/requests/{id}",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "ID do chamado")),
    responses(
        (status = 200, description = "Chamado", body = SupportRequest),
        (status = 404, description = "Chamado não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_request(
    State(app_state): State<AppState>,
    CampusContext(scope): CampusContext,
    Path(id): Path<Uuid>,
) -> Result<Json<SupportRequest>, AppError> {
    Ok(Json(app_state.request_service.get_request(scope, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/requests/{id}/status",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "ID do chamado")),
    request_body = UpdateRequestStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = SupportRequest),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_request_status(
    State(app_state): State<AppState>,
    CampusContext(scope): CampusContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRequestStatusPayload>,
) -> Result<Json<SupportRequest>, AppError> {
    let request = app_state
        .request_service
        .update_status(scope, id, payload.status)
        .await?;
    Ok(Json(request))
}
