// src/db/campus_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_db_error, error::AppError},
    models::campus::Campus,
};

#[derive(Clone)]
pub struct CampusRepository {
    pool: PgPool,
}

fn campus_constraint_error(constraint: &str, name: &str) -> Option<AppError> {
    match constraint {
        "campuses_name_key" => Some(AppError::CampusNameAlreadyExists(name.to_string())),
        "inventory_items_campus_id_fkey" | "loans_campus_id_fkey" => Some(AppError::CampusHasItems),
        "users_campus_id_fkey" => Some(AppError::CampusHasUsers),
        _ => None,
    }
}

impl CampusRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Campus>, AppError> {
        let campuses = sqlx::query_as::<_, Campus>(
            "SELECT id, name, created_at, updated_at FROM campuses ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(campuses)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Campus>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let campus = sqlx::query_as::<_, Campus>(
            "SELECT id, name, created_at, updated_at FROM campuses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(campus)
    }

    pub async fn create<'e, E>(&self, executor: E, name: &str) -> Result<Campus, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Campus>(
            r#"
            INSERT INTO campuses (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(executor)
        .await
        .map_err(|e| map_db_error(e, |c| campus_constraint_error(c, name)))
    }

    pub async fn rename<'e, E>(&self, executor: E, id: Uuid, name: &str) -> Result<Campus, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Campus>(
            r#"
            UPDATE campuses SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_db_error(e, |c| campus_constraint_error(c, name)))?
        .ok_or(AppError::CampusNotFound)
    }

    pub async fn count_items<'e, E>(&self, executor: E, id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory_items WHERE campus_id = $1")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(count)
    }

    pub async fn count_users<'e, E>(&self, executor: E, id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE campus_id = $1")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(count)
    }

    /// Apaga o campus; categorias, setores e chamados vão junto (ON DELETE CASCADE).
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM campuses WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| map_db_error(e, |c| campus_constraint_error(c, "")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::CampusNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restrict_foreign_keys_explain_why_delete_failed() {
        assert!(matches!(
            campus_constraint_error("inventory_items_campus_id_fkey", ""),
            Some(AppError::CampusHasItems)
        ));
        assert!(matches!(
            campus_constraint_error("users_campus_id_fkey", ""),
            Some(AppError::CampusHasUsers)
        ));
        assert!(matches!(
            campus_constraint_error("campuses_name_key", "Centro"),
            Some(AppError::CampusNameAlreadyExists(n)) if n == "Centro"
        ));
    }
}
