// src/db/inventory_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::{map_db_error, scoped_reference_error}, error::AppError},
    models::inventory::{InventoryItem, ItemFields, ItemQuery, ItemStatus},
};

// SELECT base: sempre devolve o item com os nomes já resolvidos.
const ITEM_SELECT: &str = r#"
    SELECT
        i.id, i.campus_id, c.name AS campus_name,
        i.sector_id, s.name AS sector_name, i.room,
        i.category_id, cat.name AS category_name,
        i.brand, i.serial, i.patrimony,
        i.status, i.previous_status,
        i.responsible, i.obs, i.is_fixed, i.created_by,
        i.created_at, i.updated_at
    FROM inventory_items i
    JOIN campuses c ON c.id = i.campus_id
    LEFT JOIN sectors s ON s.id = i.sector_id
    LEFT JOIN categories cat ON cat.id = i.category_id
"#;

// Filtros da listagem. $2 separa a visão normal da visão de descarte.
const ITEM_FILTER: &str = r#"
    WHERE ($1::uuid IS NULL OR i.campus_id = $1)
      AND ((i.status = 'descarte') = $2)
      AND ($3::item_status IS NULL OR i.status = $3)
      AND ($4::uuid IS NULL OR i.category_id = $4)
      AND ($5::uuid IS NULL OR i.sector_id = $5)
      AND ($6::boolean IS NULL OR i.is_fixed = $6)
      AND ($7::text IS NULL
           OR i.brand ILIKE $7 OR i.serial ILIKE $7 OR i.patrimony ILIKE $7
           OR i.responsible ILIKE $7 OR i.room ILIKE $7 OR i.obs ILIKE $7)
"#;

fn item_constraint_error(constraint: &str) -> Option<AppError> {
    match constraint {
        "loans_item_id_fkey" => Some(AppError::ItemHasLoans),
        other => scoped_reference_error(other),
    }
}

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    /// Lista itens ativos (`disposed = false`) ou descartados (`disposed = true`).
    /// `limit = None` devolve tudo (exportação).
    pub async fn list_items(
        &self,
        campus_id: Option<Uuid>,
        disposed: bool,
        filter: &ItemQuery,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<InventoryItem>, AppError> {
        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            "{ITEM_SELECT} {ITEM_FILTER} ORDER BY i.updated_at DESC, i.id LIMIT $8 OFFSET $9"
        ))
        .bind(campus_id)
        .bind(disposed)
        .bind(filter.status)
        .bind(filter.category_id)
        .bind(filter.sector_id)
        .bind(filter.is_fixed)
        .bind(filter.search_pattern())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn count_items(
        &self,
        campus_id: Option<Uuid>,
        disposed: bool,
        filter: &ItemQuery,
    ) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM inventory_items i {ITEM_FILTER}"
        ))
        .bind(campus_id)
        .bind(disposed)
        .bind(filter.status)
        .bind(filter.category_id)
        .bind(filter.sector_id)
        .bind(filter.is_fixed)
        .bind(filter.search_pattern())
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    /// Busca um item dentro do escopo (`campus_id = None` = todos os campi),
    /// incluindo descartados: quem decide a visibilidade é o serviço.
    pub async fn find_item<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        campus_id: Option<Uuid>,
    ) -> Result<Option<InventoryItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            "{ITEM_SELECT} WHERE i.id = $1 AND ($2::uuid IS NULL OR i.campus_id = $2)"
        ))
        .bind(id)
        .bind(campus_id)
        .fetch_optional(executor)
        .await?;
        Ok(item)
    }

    /// Igual a `find_item`, mas trava a linha até o fim da transação.
    pub async fn find_item_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        campus_id: Option<Uuid>,
    ) -> Result<Option<InventoryItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            "{ITEM_SELECT} WHERE i.id = $1 AND ($2::uuid IS NULL OR i.campus_id = $2) FOR UPDATE OF i"
        ))
        .bind(id)
        .bind(campus_id)
        .fetch_optional(executor)
        .await?;
        Ok(item)
    }

    /// IDs (dentre os informados) que existem no escopo.
    pub async fn existing_ids(
        &self,
        ids: &[Uuid],
        campus_id: Option<Uuid>,
    ) -> Result<Vec<Uuid>, AppError> {
        let found: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM inventory_items
            WHERE id = ANY($1) AND ($2::uuid IS NULL OR campus_id = $2)
            "#,
        )
        .bind(ids)
        .bind(campus_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(found)
    }

    pub async fn updated_since(
        &self,
        since: DateTime<Utc>,
        campus_id: Option<Uuid>,
    ) -> Result<Vec<InventoryItem>, AppError> {
        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            "{ITEM_SELECT} WHERE i.updated_at > $1 AND ($2::uuid IS NULL OR i.campus_id = $2) \
             ORDER BY i.updated_at ASC"
        ))
        .bind(since)
        .bind(campus_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    // ---
    // Escrita (transacional)
    // ---

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        campus_id: Uuid,
        fields: &ItemFields,
        created_by: Option<Uuid>,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO inventory_items (
                campus_id, sector_id, room, category_id, brand, serial, patrimony,
                status, responsible, obs, is_fixed, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(campus_id)
        .bind(fields.sector_id)
        .bind(&fields.room)
        .bind(fields.category_id)
        .bind(&fields.brand)
        .bind(&fields.serial)
        .bind(&fields.patrimony)
        .bind(fields.status)
        .bind(&fields.responsible)
        .bind(&fields.obs)
        .bind(fields.is_fixed)
        .bind(created_by)
        .fetch_one(executor)
        .await
        .map_err(|e| map_db_error(e, item_constraint_error))
    }

    pub async fn update_item<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        fields: &ItemFields,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE inventory_items SET
                sector_id = $2, room = $3, category_id = $4, brand = $5, serial = $6,
                patrimony = $7, status = $8, responsible = $9, obs = $10, is_fixed = $11,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(fields.sector_id)
        .bind(&fields.room)
        .bind(fields.category_id)
        .bind(&fields.brand)
        .bind(&fields.serial)
        .bind(&fields.patrimony)
        .bind(fields.status)
        .bind(&fields.responsible)
        .bind(&fields.obs)
        .bind(fields.is_fixed)
        .execute(executor)
        .await
        .map_err(|e| map_db_error(e, item_constraint_error))?;

        if result.rows_affected() == 0 {
            return Err(AppError::ItemNotFound);
        }
        Ok(())
    }

    /// Troca o status guardando (ou limpando) o status anterior.
    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: ItemStatus,
        previous_status: Option<ItemStatus>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE inventory_items
            SET status = $2, previous_status = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(previous_status)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ItemNotFound);
        }
        Ok(())
    }

    pub async fn delete_item<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| map_db_error(e, item_constraint_error))?;

        if result.rows_affected() == 0 {
            return Err(AppError::ItemNotFound);
        }
        Ok(())
    }
}
