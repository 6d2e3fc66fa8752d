// src/db/request_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::{map_db_error, scoped_reference_error}, error::AppError},
    models::request::{CreateRequestPayload, RequestStatus, SupportRequest},
};

const REQUEST_COLUMNS: &str = "id, requester_email, requester_name, campus_id, sector_id, room, \
     details, status, created_at, updated_at";

#[derive(Clone)]
pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: &CreateRequestPayload) -> Result<SupportRequest, AppError> {
        sqlx::query_as::<_, SupportRequest>(&format!(
            "INSERT INTO requests (requester_email, requester_name, campus_id, sector_id, room, details) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(payload.requester_email.trim())
        .bind(payload.requester_name.as_deref())
        .bind(payload.campus_id)
        .bind(payload.sector_id)
        .bind(payload.room.as_deref())
        .bind(payload.details.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, scoped_reference_error))
    }

    pub async fn list(
        &self,
        campus_id: Option<Uuid>,
        status: Option<RequestStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<SupportRequest>, i64), AppError> {
        let requests = sqlx::query_as::<_, SupportRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests \
             WHERE ($1::uuid IS NULL OR campus_id = $1) \
               AND ($2::request_status IS NULL OR status = $2) \
             ORDER BY created_at DESC \
             LIMIT $3 OFFSET $4"
        ))
        .bind(campus_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM requests \
             WHERE ($1::uuid IS NULL OR campus_id = $1) \
               AND ($2::request_status IS NULL OR status = $2)",
        )
        .bind(campus_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok((requests, total))
    }

    pub async fn find(&self, id: Uuid, campus_id: Option<Uuid>) -> Result<SupportRequest, AppError> {
        sqlx::query_as::<_, SupportRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests \
             WHERE id = $1 AND ($2::uuid IS NULL OR campus_id = $2)"
        ))
        .bind(id)
        .bind(campus_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::RequestNotFound)
    }

    /// Trava o chamado até o fim da transação.
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        campus_id: Option<Uuid>,
    ) -> Result<SupportRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, SupportRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests \
             WHERE id = $1 AND ($2::uuid IS NULL OR campus_id = $2) FOR UPDATE"
        ))
        .bind(id)
        .bind(campus_id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::RequestNotFound)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: RequestStatus,
    ) -> Result<SupportRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, SupportRequest>(&format!(
            "UPDATE requests SET status = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::RequestNotFound)
    }
}
