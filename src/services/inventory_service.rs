// src/services/inventory_service.rs

use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::Page, text::non_empty},
    db::{AuditRepository, InventoryRepository},
    middleware::campus::CampusScope,
    models::{
        audit::AuditAction,
        auth::User,
        inventory::{
            CreateItemPayload, InventoryItem, ItemFields, ItemQuery, ItemStatus, SyncPayload,
            SyncResponse, UpdateItemPayload,
        },
    },
    services::audit_service::item_entry,
};

// ---
// Regras puras
// ---

/// Troca manual de status. `descarte` e `emprestado` só entram e saem pelos
/// fluxos de descarte/restauração e empréstimo/devolução.
pub(crate) fn check_manual_transition(from: ItemStatus, to: ItemStatus) -> Result<(), AppError> {
    if from == to {
        return Ok(());
    }
    if from.is_workflow_managed() || to.is_workflow_managed() {
        return Err(AppError::InvalidItemStatus { from, to });
    }
    Ok(())
}

/// Status de volta de um descarte ou de uma devolução.
pub(crate) fn restore_target(previous: Option<ItemStatus>) -> ItemStatus {
    previous
        .filter(|s| !s.is_workflow_managed())
        .unwrap_or(ItemStatus::Funcionando)
}

pub(crate) fn new_item_fields(payload: CreateItemPayload) -> Result<ItemFields, AppError> {
    let status = payload.status.unwrap_or(ItemStatus::Funcionando);
    check_manual_transition(ItemStatus::Funcionando, status)?;

    Ok(ItemFields {
        sector_id: payload.sector_id,
        room: non_empty(payload.room),
        category_id: payload.category_id,
        brand: non_empty(payload.brand),
        serial: non_empty(payload.serial),
        patrimony: non_empty(payload.patrimony),
        status,
        responsible: non_empty(payload.responsible),
        obs: non_empty(payload.obs),
        is_fixed: payload.is_fixed,
    })
}

/// Aplica a atualização parcial sobre o item atual. Texto vazio limpa o campo.
pub(crate) fn apply_update(item: &InventoryItem, payload: UpdateItemPayload) -> Result<ItemFields, AppError> {
    let status = payload.status.unwrap_or(item.status);
    check_manual_transition(item.status, status)?;

    let text = |new: Option<String>, old: &Option<String>| match new {
        Some(value) => non_empty(Some(value)),
        None => old.clone(),
    };

    Ok(ItemFields {
        sector_id: payload.sector_id.unwrap_or(item.sector_id),
        room: text(payload.room, &item.room),
        category_id: payload.category_id.unwrap_or(item.category_id),
        brand: text(payload.brand, &item.brand),
        serial: text(payload.serial, &item.serial),
        patrimony: text(payload.patrimony, &item.patrimony),
        status,
        responsible: text(payload.responsible, &item.responsible),
        obs: text(payload.obs, &item.obs),
        is_fixed: payload.is_fixed.unwrap_or(item.is_fixed),
    })
}

/// IDs do cache do cliente que não existem mais no escopo.
pub(crate) fn missing_ids(requested: &[Uuid], found: &[Uuid]) -> Vec<Uuid> {
    let found: HashSet<&Uuid> = found.iter().collect();
    let mut seen = HashSet::new();
    requested
        .iter()
        .filter(|id| !found.contains(id) && seen.insert(**id))
        .copied()
        .collect()
}

/// Descartados só aparecem na visão de descarte; fora dela contam como inexistentes.
pub(crate) fn active_item(item: Option<InventoryItem>) -> Result<InventoryItem, AppError> {
    item.filter(|item| item.status != ItemStatus::Descarte)
        .ok_or(AppError::ItemNotFound)
}

#[derive(Clone)]
pub struct InventoryService {
    repo: InventoryRepository,
    audit_repo: AuditRepository,
    pool: PgPool,
}

impl InventoryService {
    pub fn new(repo: InventoryRepository, audit_repo: AuditRepository, pool: PgPool) -> Self {
        Self { repo, audit_repo, pool }
    }

    // ---
    // Leitura
    // ---

    async fn list_page(
        &self,
        scope: CampusScope,
        disposed: bool,
        query: &ItemQuery,
    ) -> Result<Page<InventoryItem>, AppError> {
        let (page, per_page, offset) = query.page_query().normalize();
        let items = self
            .repo
            .list_items(scope.campus_id(), disposed, query, Some(per_page), offset)
            .await?;
        let total = self.repo.count_items(scope.campus_id(), disposed, query).await?;
        Ok(Page::new(items, total, page, per_page))
    }

    pub async fn list_items(&self, scope: CampusScope, query: &ItemQuery) -> Result<Page<InventoryItem>, AppError> {
        self.list_page(scope, false, query).await
    }

    pub async fn list_disposed(&self, scope: CampusScope, query: &ItemQuery) -> Result<Page<InventoryItem>, AppError> {
        self.list_page(scope, true, query).await
    }

    /// Tudo no escopo, sem paginação (relatórios).
    pub async fn export_items(&self, scope: CampusScope) -> Result<Vec<InventoryItem>, AppError> {
        self.repo
            .list_items(scope.campus_id(), false, &ItemQuery::default(), None, 0)
            .await
    }

    pub async fn get_item(&self, scope: CampusScope, id: Uuid) -> Result<InventoryItem, AppError> {
        let item = self.repo.find_item(&self.pool, id, scope.campus_id()).await?;
        active_item(item)
    }

    pub async fn sync(&self, scope: CampusScope, payload: &SyncPayload) -> Result<SyncResponse, AppError> {
        // Marca o tempo antes das consultas para não perder alterações concorrentes
        let server_time = Utc::now();

        let found = self.repo.existing_ids(&payload.item_ids, scope.campus_id()).await?;
        let missing = missing_ids(&payload.item_ids, &found);

        let updated = match payload.since {
            Some(since) => self.repo.updated_since(since, scope.campus_id()).await?,
            None => Vec::new(),
        };

        if !missing.is_empty() {
            tracing::debug!(count = missing.len(), "itens fantasmas no cache do cliente");
        }

        Ok(SyncResponse { missing, updated, server_time })
    }

    // ---
    // Escrita (cada uma com sua entrada de auditoria na mesma transação)
    // ---

    pub async fn create_item(
        &self,
        actor: &User,
        scope: CampusScope,
        payload: CreateItemPayload,
    ) -> Result<InventoryItem, AppError> {
        let campus_id = scope.target_campus(payload.campus_id)?;
        let fields = new_item_fields(payload)?;

        let mut tx = self.pool.begin().await?;

        let id = self.repo.insert_item(&mut *tx, campus_id, &fields, Some(actor.id)).await?;
        let item = self
            .repo
            .find_item(&mut *tx, id, None)
            .await?
            .ok_or(AppError::ItemNotFound)?;

        self.audit_repo
            .append(&mut *tx, &item_entry(AuditAction::Create, actor, &item, None)?)
            .await?;

        tx.commit().await?;

        tracing::info!(item = %item.id, campus = %item.campus_name, "item criado");
        Ok(item)
    }

    pub async fn update_item(
        &self,
        actor: &User,
        scope: CampusScope,
        id: Uuid,
        payload: UpdateItemPayload,
    ) -> Result<InventoryItem, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .repo
            .find_item_for_update(&mut *tx, id, scope.campus_id())
            .await?
            .ok_or(AppError::ItemNotFound)?;
        if current.status == ItemStatus::Descarte {
            return Err(AppError::ItemDisposed);
        }

        let fields = apply_update(&current, payload)?;
        self.repo.update_item(&mut *tx, id, &fields).await?;

        let item = self
            .repo
            .find_item(&mut *tx, id, None)
            .await?
            .ok_or(AppError::ItemNotFound)?;

        let details = (current.status != item.status)
            .then(|| format!("status: {} -> {}", current.status, item.status));
        self.audit_repo
            .append(&mut *tx, &item_entry(AuditAction::Update, actor, &item, details)?)
            .await?;

        tx.commit().await?;
        Ok(item)
    }

    pub async fn dispose_item(
        &self,
        actor: &User,
        scope: CampusScope,
        id: Uuid,
    ) -> Result<InventoryItem, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .repo
            .find_item_for_update(&mut *tx, id, scope.campus_id())
            .await?
            .ok_or(AppError::ItemNotFound)?;

        match current.status {
            ItemStatus::Descarte => return Err(AppError::ItemDisposed),
            ItemStatus::Emprestado => return Err(AppError::ItemOnLoan),
            _ => {}
        }

        self.repo
            .set_status(&mut *tx, id, ItemStatus::Descarte, Some(current.status))
            .await?;

        let item = self
            .repo
            .find_item(&mut *tx, id, None)
            .await?
            .ok_or(AppError::ItemNotFound)?;

        self.audit_repo
            .append(
                &mut *tx,
                &item_entry(
                    AuditAction::Dispose,
                    actor,
                    &item,
                    Some(format!("status anterior: {}", current.status)),
                )?,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(item = %id, "item descartado");
        Ok(item)
    }

    pub async fn restore_item(
        &self,
        actor: &User,
        scope: CampusScope,
        id: Uuid,
    ) -> Result<InventoryItem, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .repo
            .find_item_for_update(&mut *tx, id, scope.campus_id())
            .await?
            .ok_or(AppError::ItemNotFound)?;

        if current.status != ItemStatus::Descarte {
            return Err(AppError::ItemNotDisposed);
        }

        let target = restore_target(current.previous_status);
        self.repo.set_status(&mut *tx, id, target, None).await?;

        let item = self
            .repo
            .find_item(&mut *tx, id, None)
            .await?
            .ok_or(AppError::ItemNotFound)?;

        self.audit_repo
            .append(
                &mut *tx,
                &item_entry(AuditAction::Restore, actor, &item, Some(format!("restaurado para: {target}")))?,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(item = %id, status = %target, "item restaurado");
        Ok(item)
    }

    /// Exclusão definitiva. A foto do item fica no log de auditoria.
    pub async fn delete_item(&self, actor: &User, scope: CampusScope, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .repo
            .find_item_for_update(&mut *tx, id, scope.campus_id())
            .await?
            .ok_or(AppError::ItemNotFound)?;

        if current.status == ItemStatus::Emprestado {
            return Err(AppError::ItemOnLoan);
        }

        self.audit_repo
            .append(&mut *tx, &item_entry(AuditAction::Delete, actor, &current, None)?)
            .await?;
        self.repo.delete_item(&mut *tx, id).await?;

        tx.commit().await?;

        tracing::warn!(actor = %actor.username, item = %id, "item excluído definitivamente");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(status: ItemStatus) -> InventoryItem {
        InventoryItem {
            id: Uuid::new_v4(),
            campus_id: Uuid::new_v4(),
            campus_name: "Liberdade".into(),
            sector_id: Some(Uuid::new_v4()),
            sector_name: Some("TI".into()),
            room: Some("Sala 101".into()),
            category_id: None,
            category_name: None,
            brand: Some("Dell".into()),
            serial: None,
            patrimony: Some("PAT-1".into()),
            status,
            previous_status: None,
            responsible: None,
            obs: None,
            is_fixed: false,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn workflow_statuses_are_not_set_by_hand() {
        use ItemStatus::*;
        assert!(check_manual_transition(Funcionando, Defeito).is_ok());
        assert!(check_manual_transition(Manutencao, Emuso).is_ok());
        assert!(check_manual_transition(Emprestado, Emprestado).is_ok());
        assert!(matches!(
            check_manual_transition(Funcionando, Descarte),
            Err(AppError::InvalidItemStatus { from: Funcionando, to: Descarte })
        ));
        assert!(check_manual_transition(Emprestado, Funcionando).is_err());
    }

    #[test]
    fn disposed_items_are_hidden_from_lookup() {
        assert!(matches!(active_item(Some(item(ItemStatus::Descarte))), Err(AppError::ItemNotFound)));
        assert!(matches!(active_item(None), Err(AppError::ItemNotFound)));
        let found = active_item(Some(item(ItemStatus::Emprestado))).unwrap();
        assert_eq!(found.status, ItemStatus::Emprestado);
    }

    #[test]
    fn restore_falls_back_to_funcionando() {
        assert_eq!(restore_target(Some(ItemStatus::Defeito)), ItemStatus::Defeito);
        assert_eq!(restore_target(None), ItemStatus::Funcionando);
        assert_eq!(restore_target(Some(ItemStatus::Emprestado)), ItemStatus::Funcionando);
    }

    #[test]
    fn partial_update_keeps_untouched_fields() {
        let current = item(ItemStatus::Funcionando);
        let payload: UpdateItemPayload =
            serde_json::from_str(r#"{"sectorId": null, "brand": "  ", "obs": "trocar fonte", "status": "defeito"}"#)
                .unwrap();

        let fields = apply_update(&current, payload).unwrap();
        assert_eq!(fields.sector_id, None);
        assert_eq!(fields.brand, None);
        assert_eq!(fields.obs.as_deref(), Some("trocar fonte"));
        assert_eq!(fields.room.as_deref(), Some("Sala 101"));
        assert_eq!(fields.patrimony.as_deref(), Some("PAT-1"));
        assert_eq!(fields.status, ItemStatus::Defeito);
    }

    #[test]
    fn create_rejects_workflow_status() {
        let payload: CreateItemPayload = serde_json::from_str(r#"{"status": "emprestado"}"#).unwrap();
        assert!(matches!(new_item_fields(payload), Err(AppError::InvalidItemStatus { .. })));

        let payload: CreateItemPayload = serde_json::from_str(r#"{"brand": " HP "}"#).unwrap();
        let fields = new_item_fields(payload).unwrap();
        assert_eq!(fields.status, ItemStatus::Funcionando);
        assert_eq!(fields.brand.as_deref(), Some("HP"));
        assert!(!fields.is_fixed);
    }

    #[test]
    fn phantom_ids_are_reported_once() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(missing_ids(&[a, b, c, b], &[a]), vec![b, c]);
        assert!(missing_ids(&[a], &[a]).is_empty());
    }
}
