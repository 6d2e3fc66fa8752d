// src/handlers/catalog.rs

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
    middleware::campus::CampusContext,
    models::catalog::{CatalogEntry, CatalogKind, CreateCatalogPayload, RenameCatalogPayload},
};

// Categorias e setores compartilham o fluxo; cada rota só fixa o CatalogKind.

// ---
// CATEGORIAS
// ---

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Categories",
    params(("x-campus-id" = Option<Uuid>, Header, description = "Campus selecionado (admin)")),
    responses((status = 200, description = "Categorias do escopo", body = Vec<CatalogEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    CampusContext(scope): CampusContext,
) -> Result<Json<Vec<CatalogEntry>>, AppError> {
    Ok(Json(app_state.catalog_service.list(CatalogKind::Category, scope).await?))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Categories",
    request_body = CreateCatalogPayload,
    responses(
        (status = 201, description = "Categoria criada", body = CatalogEntry),
        (status = 409, description = "Nome já existe neste campus")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    CampusContext(scope): CampusContext,
    Json(payload): Json<CreateCatalogPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let entry = app_state
        .catalog_service
        .create(CatalogKind::Category, scope, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path)),
    request_body = RenameCatalogPayload,
    responses(
        (status = 200, description = "Categoria renomeada", body = CatalogEntry),
        (status = 404, description = "Não encontrada no escopo"),
        (status = 409, description = "Nome já existe neste campus")
    ),
    security(("api_jwt" = []))
)]
pub async fn rename_category(
    State(app_state): State<AppState>,
    CampusContext(scope): CampusContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<RenameCatalogPayload>,
) -> Result<Json<CatalogEntry>, AppError> {
    payload.validate()?;

    let entry = app_state
        .catalog_service
        .rename(CatalogKind::Category, scope, id, &payload.name)
        .await?;
    Ok(Json(entry))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path)),
    responses(
        (status = 204, description = "Categoria excluída"),
        (status = 409, description = "Em uso por itens do inventário")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    CampusContext(scope): CampusContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.catalog_service.delete(CatalogKind::Category, scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// SETORES
// ---

#[utoipa::path(
    get,
    path = "/api/sectors",
    tag = "Sectors",
    params(("x-campus-id" = Option<Uuid>, Header, description = "Campus selecionado (admin)")),
    responses((status = 200, description = "Setores do escopo", body = Vec<CatalogEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_sectors(
    State(app_state): State<AppState>,
    CampusContext(scope): CampusContext,
) -> Result<Json<Vec<CatalogEntry>>, AppError> {
    Ok(Json(app_state.catalog_service.list(CatalogKind::Sector, scope).await?))
}

#[utoipa::path(
    post,
    path = "/api/sectors",
    tag = "Sectors",
    request_body = CreateCatalogPayload,
    responses(
        (status = 201, description = "Setor criado", body = CatalogEntry),
        (status = 409, description = "Nome já existe neste campus")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_sector(
    State(app_state): State<AppState>,
    CampusContext(scope): CampusContext,
    Json(payload): Json<CreateCatalogPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let entry = app_state
        .catalog_service
        .create(CatalogKind::Sector, scope, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    put,
    path = "/api/sectors/{id}",
    tag = "Sectors",
    params(("id" = Uuid, Path)),
    request_body = RenameCatalogPayload,
    responses(
        (status = 200, description = "Setor renomeado", body = CatalogEntry),
        (status = 404, description = "Não encontrado no escopo"),
        (status = 409, description = "Nome já existe neste campus")
    ),
    security(("api_jwt" = []))
)]
pub async fn rename_sector(
    State(app_state): State<AppState>,
    CampusContext(scope): CampusContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<RenameCatalogPayload>,
) -> Result<Json<CatalogEntry>, AppError> {
    payload.validate()?;

    let entry = app_state
        .catalog_service
        .rename(CatalogKind::Sector, scope, id, &payload.name)
        .await?;
    Ok(Json(entry))
}

#[utoipa::path(
    delete,
    path = "/api/sectors/{id}",
    tag = "Sectors",
    params(("id" = Uuid, Path)),
    responses(
        (status = 204, description = "Setor excluído"),
        (status = 409, description = "Em uso por itens do inventário")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_sector(
    State(app_state): State<AppState>,
    CampusContext(scope): CampusContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.catalog_service.delete(CatalogKind::Sector, scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
