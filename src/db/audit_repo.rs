// src/db/audit_repo.rs

use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::audit::{AuditLogEntry, AuditQuery, NewAuditEntry},
};

// O log é somente inserção: não existe update nem delete aqui
// (e um trigger no banco rejeita os dois).
#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn append<'e, E>(&self, executor: E, entry: &NewAuditEntry) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO audit_log (action, user_id, username, campus_id, item_id, item_snapshot, details)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.action)
        .bind(entry.user_id)
        .bind(&entry.username)
        .bind(entry.campus_id)
        .bind(entry.item_id)
        .bind(entry.item_snapshot.as_ref().map(Json))
        .bind(&entry.details)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn list(
        &self,
        campus_id: Option<Uuid>,
        filter: &AuditQuery,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<AuditLogEntry>, i64), AppError> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            SELECT id, action, user_id, username, campus_id, item_id, item_snapshot, details, created_at
            FROM audit_log
            WHERE ($1::uuid IS NULL OR campus_id = $1)
              AND ($2::audit_action IS NULL OR action = $2)
              AND ($3::uuid IS NULL OR item_id = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(campus_id)
        .bind(filter.action)
        .bind(filter.item_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM audit_log
            WHERE ($1::uuid IS NULL OR campus_id = $1)
              AND ($2::audit_action IS NULL OR action = $2)
              AND ($3::uuid IS NULL OR item_id = $3)
            "#,
        )
        .bind(campus_id)
        .bind(filter.action)
        .bind(filter.item_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((entries, total))
    }
}
