// src/db/catalog_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::{map_db_error, scoped_reference_error}, error::AppError},
    models::catalog::{CatalogEntry, CatalogKind},
};

/// Repositório de categorias e setores. As duas tabelas têm o mesmo formato,
/// então o `CatalogKind` escolhe a tabela.
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

fn catalog_constraint_error(kind: CatalogKind, constraint: &str, name: &str) -> Option<AppError> {
    match (kind, constraint) {
        (CatalogKind::Category, "categories_name_campus_key") => {
            Some(AppError::CategoryNameAlreadyExists(name.to_string()))
        }
        (CatalogKind::Sector, "sectors_name_campus_key") => {
            Some(AppError::SectorNameAlreadyExists(name.to_string()))
        }
        (_, "inventory_items_category_campus_fkey" | "inventory_items_sector_campus_fkey") => {
            Some(AppError::ResourceInUse(kind.label().to_string()))
        }
        (_, "categories_campus_id_fkey" | "sectors_campus_id_fkey") => Some(AppError::CampusNotFound),
        (_, other) => scoped_reference_error(other),
    }
}

fn not_found(kind: CatalogKind) -> AppError {
    match kind {
        CatalogKind::Category => AppError::CategoryNotFound,
        CatalogKind::Sector => AppError::SectorNotFound,
    }
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        kind: CatalogKind,
        campus_id: Option<Uuid>,
    ) -> Result<Vec<CatalogEntry>, AppError> {
        let entries = sqlx::query_as::<_, CatalogEntry>(&format!(
            "SELECT id, campus_id, name, created_at, updated_at FROM {} \
             WHERE ($1::uuid IS NULL OR campus_id = $1) \
             ORDER BY name ASC",
            kind.table()
        ))
        .bind(campus_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    pub async fn find_by_id(&self, kind: CatalogKind, id: Uuid) -> Result<CatalogEntry, AppError> {
        sqlx::query_as::<_, CatalogEntry>(&format!(
            "SELECT id, campus_id, name, created_at, updated_at FROM {} WHERE id = $1",
            kind.table()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(kind))
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        kind: CatalogKind,
        campus_id: Uuid,
        name: &str,
    ) -> Result<CatalogEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, CatalogEntry>(&format!(
            "INSERT INTO {} (campus_id, name) VALUES ($1, $2) \
             RETURNING id, campus_id, name, created_at, updated_at",
            kind.table()
        ))
        .bind(campus_id)
        .bind(name)
        .fetch_one(executor)
        .await
        .map_err(|e| map_db_error(e, |c| catalog_constraint_error(kind, c, name)))
    }

    pub async fn rename<'e, E>(
        &self,
        executor: E,
        kind: CatalogKind,
        id: Uuid,
        name: &str,
    ) -> Result<CatalogEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, CatalogEntry>(&format!(
            "UPDATE {} SET name = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING id, campus_id, name, created_at, updated_at",
            kind.table()
        ))
        .bind(id)
        .bind(name)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_db_error(e, |c| catalog_constraint_error(kind, c, name)))?
        .ok_or_else(|| not_found(kind))
    }

    pub async fn delete<'e, E>(&self, executor: E, kind: CatalogKind, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", kind.table()))
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| map_db_error(e, |c| catalog_constraint_error(kind, c, "")))?;

        if result.rows_affected() == 0 {
            return Err(not_found(kind));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_name_error_matches_the_table() {
        assert!(matches!(
            catalog_constraint_error(CatalogKind::Sector, "sectors_name_campus_key", "TI"),
            Some(AppError::SectorNameAlreadyExists(n)) if n == "TI"
        ));
        assert!(matches!(
            catalog_constraint_error(CatalogKind::Category, "categories_name_campus_key", "Notebook"),
            Some(AppError::CategoryNameAlreadyExists(n)) if n == "Notebook"
        ));
    }

    #[test]
    fn referenced_entries_are_in_use() {
        assert!(matches!(
            catalog_constraint_error(CatalogKind::Category, "inventory_items_category_campus_fkey", ""),
            Some(AppError::ResourceInUse(_))
        ));
    }
}
