// src/db/dashboard_repo.rs

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::dashboard::StatusCount};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn status_counts(&self, campus_id: Option<Uuid>) -> Result<Vec<StatusCount>, AppError> {
        let rows = sqlx::query_as::<_, StatusCount>(
            r#"
            SELECT status, COUNT(*) AS count
            FROM inventory_items
            WHERE ($1::uuid IS NULL OR campus_id = $1)
            GROUP BY status
            ORDER BY status
            "#,
        )
        .bind(campus_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn fixed_items(&self, campus_id: Option<Uuid>) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM inventory_items
            WHERE ($1::uuid IS NULL OR campus_id = $1)
              AND is_fixed AND status <> 'descarte'
            "#,
        )
        .bind(campus_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// (ativos, em atraso)
    pub async fn loan_counts(
        &self,
        campus_id: Option<Uuid>,
        today: NaiveDate,
    ) -> Result<(i64, i64), AppError> {
        let row: (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'loaned'),
                COUNT(*) FILTER (WHERE status = 'loaned' AND expected_return_date < $2)
            FROM loans
            WHERE ($1::uuid IS NULL OR campus_id = $1)
            "#,
        )
        .bind(campus_id)
        .bind(today)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Chamados ainda não finalizados (aberto ou em-andamento).
    pub async fn open_requests(&self, campus_id: Option<Uuid>) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM requests
            WHERE ($1::uuid IS NULL OR campus_id = $1)
              AND status IN ('aberto', 'em-andamento')
            "#,
        )
        .bind(campus_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
