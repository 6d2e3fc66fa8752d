// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::{map_db_error, scoped_reference_error}, error::AppError},
    models::auth::{TechnicianCampus, User, UserRole},
};

const USER_COLUMNS: &str =
    "id, username, name, role, campus_id, password_hash, created_at, updated_at";

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

fn user_constraint_error(constraint: &str, username: &str) -> Option<AppError> {
    match constraint {
        "users_username_key" => Some(AppError::UsernameAlreadyExists(username.to_string())),
        "users_tecnico_campus_check" => Some(AppError::InvalidInput(
            "Técnicos precisam estar vinculados a um campus.".into(),
        )),
        other => scoped_reference_error(other),
    }
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca sem diferenciar maiúsculas/minúsculas (o índice único é em lower(username))
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(username) = lower($1)"
        ))
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Técnicos com o nome do campus, para o login por nome de campus.
    /// Trava o usuário até o fim da transação.
    pub async fn find_by_id_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(user)
    }

    pub async fn list_technician_campuses(&self) -> Result<Vec<TechnicianCampus>, AppError> {
        let rows = sqlx::query_as::<_, TechnicianCampus>(
            r#"
            SELECT u.id AS user_id, c.id AS campus_id, c.name AS campus_name
            FROM users u
            JOIN campuses c ON c.id = u.campus_id
            WHERE u.role = 'tecnico'
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list(&self, campus_id: Option<Uuid>) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE ($1::uuid IS NULL OR campus_id = $1) \
             ORDER BY lower(username) ASC"
        ))
        .bind(campus_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn count_all(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        username: &str,
        name: &str,
        role: UserRole,
        campus_id: Option<Uuid>,
        password_hash: &str,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, name, role, campus_id, password_hash) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(name)
        .bind(role)
        .bind(campus_id)
        .bind(password_hash)
        .fetch_one(executor)
        .await
        .map_err(|e| map_db_error(e, |c| user_constraint_error(c, username)))
    }

    pub async fn update_user<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        role: UserRole,
        campus_id: Option<Uuid>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET name = $2, role = $3, campus_id = $4, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(role)
        .bind(campus_id)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_db_error(e, |c| user_constraint_error(c, "")))?
        .ok_or(AppError::UserNotFound)
    }

    pub async fn update_password_hash<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_index_maps_to_conflict() {
        assert!(matches!(
            user_constraint_error("users_username_key", "joao"),
            Some(AppError::UsernameAlreadyExists(name)) if name == "joao"
        ));
        assert!(matches!(
            user_constraint_error("users_campus_id_fkey", "joao"),
            Some(AppError::CampusNotFound)
        ));
    }
}
