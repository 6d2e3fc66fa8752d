// src/models/inventory.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::pagination::PageQuery;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "item_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Funcionando,
    Defeito,
    Manutencao,
    Backup,
    Descarte,
    Emprestado,
    Emuso,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 7] = [
        ItemStatus::Funcionando,
        ItemStatus::Defeito,
        ItemStatus::Manutencao,
        ItemStatus::Backup,
        ItemStatus::Descarte,
        ItemStatus::Emprestado,
        ItemStatus::Emuso,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Funcionando => "funcionando",
            ItemStatus::Defeito => "defeito",
            ItemStatus::Manutencao => "manutencao",
            ItemStatus::Backup => "backup",
            ItemStatus::Descarte => "descarte",
            ItemStatus::Emprestado => "emprestado",
            ItemStatus::Emuso => "emuso",
        }
    }

    /// Status controlados por fluxo próprio (descarte/restauração e empréstimo).
    pub fn is_workflow_managed(self) -> bool {
        matches!(self, ItemStatus::Descarte | ItemStatus::Emprestado)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Item com os nomes de campus/categoria/setor já resolvidos (LEFT JOIN).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub campus_id: Uuid,
    pub campus_name: String,
    pub sector_id: Option<Uuid>,
    pub sector_name: Option<String>,
    #[schema(example = "Sala 101")]
    pub room: Option<String>,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    #[schema(example = "Dell")]
    pub brand: Option<String>,
    pub serial: Option<String>,
    #[schema(example = "PAT-000123")]
    pub patrimony: Option<String>,
    pub status: ItemStatus,
    pub previous_status: Option<ItemStatus>,
    pub responsible: Option<String>,
    pub obs: Option<String>,
    pub is_fixed: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemPayload {
    /// Obrigatório para administradores sem campus selecionado.
    pub campus_id: Option<Uuid>,
    pub sector_id: Option<Uuid>,
    #[validate(length(max = 120, message = "A sala deve ter no máximo 120 caracteres."))]
    pub room: Option<String>,
    pub category_id: Option<Uuid>,
    pub brand: Option<String>,
    pub serial: Option<String>,
    pub patrimony: Option<String>,
    pub status: Option<ItemStatus>,
    pub responsible: Option<String>,
    #[validate(length(max = 2000, message = "A observação deve ter no máximo 2000 caracteres."))]
    pub obs: Option<String>,
    #[serde(default)]
    pub is_fixed: bool,
}

/// Atualização parcial. Campos de texto vazios limpam o valor;
/// `sectorId`/`categoryId` aceitam `null` para desvincular.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemPayload {
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub sector_id: Option<Option<Uuid>>,
    #[validate(length(max = 120, message = "A sala deve ter no máximo 120 caracteres."))]
    pub room: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub category_id: Option<Option<Uuid>>,
    pub brand: Option<String>,
    pub serial: Option<String>,
    pub patrimony: Option<String>,
    pub status: Option<ItemStatus>,
    pub responsible: Option<String>,
    #[validate(length(max = 2000, message = "A observação deve ter no máximo 2000 caracteres."))]
    pub obs: Option<String>,
    pub is_fixed: Option<bool>,
}

/// Valores finais gravados no banco (após aplicar o payload sobre o item atual).
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFields {
    pub sector_id: Option<Uuid>,
    pub room: Option<String>,
    pub category_id: Option<Uuid>,
    pub brand: Option<String>,
    pub serial: Option<String>,
    pub patrimony: Option<String>,
    pub status: ItemStatus,
    pub responsible: Option<String>,
    pub obs: Option<String>,
    pub is_fixed: bool,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ItemQuery {
    pub status: Option<ItemStatus>,
    pub category_id: Option<Uuid>,
    pub sector_id: Option<Uuid>,
    pub is_fixed: Option<bool>,
    /// Busca em marca, série, patrimônio, responsável, sala e observação.
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ItemQuery {
    pub fn page_query(&self) -> PageQuery {
        PageQuery { page: self.page, per_page: self.per_page }
    }

    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")))
    }
}

// ---
// Reconciliação do cache do cliente
// ---
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    /// IDs que o cliente tem em cache.
    #[serde(default)]
    pub item_ids: Vec<Uuid>,
    /// Último `serverTime` recebido pelo cliente.
    pub since: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    /// IDs em cache que não existem (ou saíram do escopo): devem ser descartados.
    pub missing: Vec<Uuid>,
    /// Itens alterados depois de `since`.
    pub updated: Vec<InventoryItem>,
    pub server_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_as_lowercase_portuguese() {
        assert_eq!(serde_json::to_value(ItemStatus::Manutencao).unwrap(), "manutencao");
        let s: ItemStatus = serde_json::from_str("\"emuso\"").unwrap();
        assert_eq!(s, ItemStatus::Emuso);
        assert!(serde_json::from_str::<ItemStatus>("\"quebrado\"").is_err());
    }

    #[test]
    fn search_pattern_escapes_like_wildcards() {
        let q = ItemQuery { search: Some(" 50%_off ".into()), ..Default::default() };
        assert_eq!(q.search_pattern().as_deref(), Some("%50\\%\\_off%"));
        let q = ItemQuery { search: Some("   ".into()), ..Default::default() };
        assert_eq!(q.search_pattern(), None);
    }

    #[test]
    fn update_payload_can_clear_category() {
        let p: UpdateItemPayload = serde_json::from_str(r#"{"categoryId": null, "isFixed": true}"#).unwrap();
        assert_eq!(p.category_id, Some(None));
        assert_eq!(p.sector_id, None);
        assert_eq!(p.is_fixed, Some(true));
    }
}
