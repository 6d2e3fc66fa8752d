// src/handlers/campuses.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        campus::CampusScope,
        rbac::{AdminOnly, RequireRole},
    },
    models::{
        campus::{Campus, CampusPayload},
        catalog::{CatalogEntry, CatalogKind},
    },
};

// Público: a tela de login lista os campi
#[utoipa::path(
    get,
    path = "/api/campuses",
    tag = "Campuses",
    responses((status = 200, description = "Campi cadastrados", body = Vec<Campus>))
)]
pub async fn list_campuses(State(app_state): State<AppState>) -> Result<Json<Vec<Campus>>, AppError> {
    Ok(Json(app_state.campus_service.list_campuses().await?))
}

#[utoipa::path(
    get,
    path = "/api/campuses/{id}",
    tag = "Campuses",
    params(("id" = Uuid, Path, description = "ID do campus")),
    responses(
        (status = 200, description = "Campus", body = Campus),
        (status = 404, description = "Campus não encontrado")
    )
)]
pub async fn get_campus(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Campus>, AppError> {
    Ok(Json(app_state.campus_service.get_campus(id).await?))
}

// Público: o formulário de chamados precisa dos setores do campus
#[utoipa::path(
    get,
    path = "/api/campuses/{id}/sectors",
    tag = "Campuses",
    params(("id" = Uuid, Path, description = "ID do campus")),
    responses((status = 200, description = "Setores do campus", body = Vec<CatalogEntry>))
)]
pub async fn list_campus_sectors(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CatalogEntry>>, AppError> {
    let sectors = app_state
        .catalog_service
        .list(CatalogKind::Sector, CampusScope::Campus(id))
        .await?;
    Ok(Json(sectors))
}

#[utoipa::path(
    post,
    path = "/api/campuses",
    tag = "Campuses",
    request_body = CampusPayload,
    responses(
        (status = 201, description = "Campus criado", body = Campus),
        (status = 409, description = "Nome já existe ou é reservado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_campus(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CampusPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let campus = app_state.campus_service.create_campus(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(campus)))
}

#[utoipa::path(
    put,
    path = "/api/campuses/{id}",
    tag = "Campuses",
    params(("id" = Uuid, Path, description = "ID do campus")),
    request_body = CampusPayload,
    responses(
        (status = 200, description = "Campus renomeado", body = Campus),
        (status = 409, description = "Nome já existe ou é reservado")
    ),
    security(("api_jwt" = []))
)]
pub async fn rename_campus(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CampusPayload>,
) -> Result<Json<Campus>, AppError> {
    payload.validate()?;

    let campus = app_state.campus_service.rename_campus(id, &payload.name).await?;
    Ok(Json(campus))
}

#[utoipa::path(
    delete,
    path = "/api/campuses/{id}",
    tag = "Campuses",
    params(("id" = Uuid, Path, description = "ID do campus")),
    responses(
        (status = 204, description = "Campus excluído"),
        (status = 409, description = "Campus possui itens ou usuários")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_campus(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.campus_service.delete_campus(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
