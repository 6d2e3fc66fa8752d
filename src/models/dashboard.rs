// src/models/dashboard.rs

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use super::inventory::ItemStatus;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: ItemStatus,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Itens ativos (sem os descartados).
    pub total_items: i64,
    pub disposed_items: i64,
    pub fixed_items: i64,
    pub by_status: Vec<StatusCount>,
    pub active_loans: i64,
    pub overdue_loans: i64,
    pub open_requests: i64,
}
