// src/services/audit_service.rs

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageQuery},
    },
    db::AuditRepository,
    middleware::campus::CampusScope,
    models::{
        audit::{AuditAction, AuditLogEntry, AuditQuery, NewAuditEntry},
        auth::User,
        inventory::InventoryItem,
    },
};

/// Monta a entrada de auditoria de um item, com a foto do item naquele momento.
pub(crate) fn item_entry(
    action: AuditAction,
    actor: &User,
    item: &InventoryItem,
    details: Option<String>,
) -> Result<NewAuditEntry, AppError> {
    let snapshot = serde_json::to_value(item).map_err(anyhow::Error::from)?;

    Ok(NewAuditEntry {
        action,
        user_id: Some(actor.id),
        username: Some(actor.username.clone()),
        campus_id: Some(item.campus_id),
        item_id: Some(item.id),
        item_snapshot: Some(snapshot),
        details,
    })
}

#[derive(Clone)]
pub struct AuditService {
    repo: AuditRepository,
}

impl AuditService {
    pub fn new(repo: AuditRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self, scope: CampusScope, query: &AuditQuery) -> Result<Page<AuditLogEntry>, AppError> {
        let (page, per_page, offset) =
            PageQuery { page: query.page, per_page: query.per_page }.normalize();
        let (entries, total) = self
            .repo
            .list(scope.campus_id(), query, per_page, offset)
            .await?;
        Ok(Page::new(entries, total, page, per_page))
    }
}
