// src/handlers/inventory.rs

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
    middleware::{
        auth::AuthenticatedUser,
        campus::CampusContext,
        rbac::{AdminOnly, RequireRole},
    },
    models::inventory::{
        CreateItemPayload, InventoryItem, ItemQuery, SyncPayload, SyncResponse, UpdateItemPayload,
    },
};

// ---
// Leitura
// ---

#[utoipa::path(
    get,
    path = "/api/inventory",
    tag = "Inventory",
    params(
        ItemQuery,
        ("x-campus-id" = Option<Uuid>, Header, description = "Campus selecionado (admin)")
    ),
    responses(
        (status = 200, description = "Itens ativos (sem descartados)", body = Page<InventoryItem>),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_items(
    State(app_state): State<AppState>,
    CampusContext(scope): CampusContext,
    Query(query): Query<ItemQuery>,
) -> Result<Json<Page<InventoryItem>>, AppError> {
    Ok(Json(app_state.inventory_service.list_items(scope, &query).await?))
}

#[utoipa::path(
    get,
    path = "/api/inventory/disposed",
    tag = "Inventory",
    params(
        ItemQuery,
        ("x-campus-id" = Option<Uuid>, Header, description = "Campus selecionado (admin)")
    ),
    responses((status = 200, description = "Itens descartados", body = Page<InventoryItem>)),
    security(("api_jwt" = []))
)]
pub async fn list_disposed_items(
    State(app_state): State<AppState>,
    CampusContext(scope): CampusContext,
    Query(query): Query<ItemQuery>,
) -> Result<Json<Page<InventoryItem>>, AppError> {
    Ok(Json(app_state.inventory_service.list_disposed(scope, &query).await?))
}

#[utoipa::path(
    get,
    path = "/api/inventory/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Item", body = InventoryItem),
        (status = 404, description = "Item não encontrado (ITEM_NOT_FOUND)")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_item(
    State(app_state): State<AppState>,
    CampusContext(scope): CampusContext,
    Path(id): Path<Uuid>,
) -> Result<Json<InventoryItem>, AppError> {
    Ok(Json(app_state.inventory_service.get_item(scope, id).await?))
}

// Reconciliação do cache do cliente (itens fantasmas)
#[utoipa::path(
    post,
    path = "/api/inventory/sync",
    tag = "Inventory",
    request_body = SyncPayload,
    responses((status = 200, description = "IDs ausentes e itens alterados", body = SyncResponse)),
    security(("api_jwt" = []))
)]
pub async fn sync_items(
    State(app_state): State<AppState>,
    CampusContext(scope): CampusContext,
    Json(payload): Json<SyncPayload>,
) -> Result<Json<SyncResponse>, AppError> {
    Ok(Json(app_state.inventory_service.sync(scope, &payload).await?))
}

// ---
// Escrita
// ---

#[utoipa::path(
    post,
    path = "/api/inventory",
    tag = "Inventory",
    request_body = CreateItemPayload,
    responses(
        (status = 201, description = "Item criado", body = InventoryItem),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Categoria ou setor fora do campus")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    CampusContext(scope): CampusContext,
    Json(payload): Json<CreateItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let item = app_state.inventory_service.create_item(&user, scope, payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    put,
    path = "/api/inventory/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do item")),
    request_body = UpdateItemPayload,
    responses(
        (status = 200, description = "Item atualizado", body = InventoryItem),
        (status = 404, description = "Item não encontrado (ITEM_NOT_FOUND)"),
        (status = 409, description = "Transição de status inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_item(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    CampusContext(scope): CampusContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemPayload>,
) -> Result<Json<InventoryItem>, AppError> {
    payload.validate()?;

    let item = app_state.inventory_service.update_item(&user, scope, id, payload).await?;
    Ok(Json(item))
}

#[utoipa::path(
    post,
    path = "/api/inventory/{id}/dispose",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Item descartado", body = InventoryItem),
        (status = 409, description = "Item já descartado ou emprestado")
    ),
    security(("api_jwt" = []))
)]
pub async fn dispose_item(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    CampusContext(scope): CampusContext,
    Path(id): Path<Uuid>,
) -> Result<Json<InventoryItem>, AppError> {
    Ok(Json(app_state.inventory_service.dispose_item(&user, scope, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/inventory/{id}/restore",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Item restaurado ao status anterior", body = InventoryItem),
        (status = 409, description = "Item não está descartado")
    ),
    security(("api_jwt" = []))
)]
pub async fn restore_item(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    CampusContext(scope): CampusContext,
    Path(id): Path<Uuid>,
) -> Result<Json<InventoryItem>, AppError> {
    Ok(Json(app_state.inventory_service.restore_item(&user, scope, id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/inventory/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 204, description = "Item excluído definitivamente"),
        (status = 403, description = "Requer administrador"),
        (status = 404, description = "Item não encontrado (ITEM_NOT_FOUND)"),
        (status = 409, description = "Item emprestado ou com histórico de empréstimos")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_item(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    AuthenticatedUser(user): AuthenticatedUser,
    CampusContext(scope): CampusContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.inventory_service.delete_item(&user, scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
