// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{types::Json, FromRow};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "audit_action", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Dispose,
    Restore,
    Loan,
    Return,
}

// Entrada do log de auditoria. Nunca é alterada depois de gravada.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub action: AuditAction,
    pub user_id: Option<Uuid>,
    pub username: Option<String>,
    pub campus_id: Option<Uuid>,
    pub item_id: Option<Uuid>,
    #[schema(value_type = Option<Object>)]
    pub item_snapshot: Option<Json<Value>>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Dados de uma nova entrada; quem grava é sempre o serviço, dentro da transação.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub action: AuditAction,
    pub user_id: Option<Uuid>,
    pub username: Option<String>,
    pub campus_id: Option<Uuid>,
    pub item_id: Option<Uuid>,
    pub item_snapshot: Option<Value>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AuditQuery {
    pub action: Option<AuditAction>,
    pub item_id: Option<Uuid>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
