// src/services/catalog_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CatalogRepository,
    middleware::campus::CampusScope,
    models::catalog::{CatalogEntry, CatalogKind, CreateCatalogPayload},
};

/// Categorias e setores: mesmo fluxo, tabela escolhida pelo `CatalogKind`.
#[derive(Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
    pool: PgPool,
}

fn clean_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("O nome é obrigatório.".into()));
    }
    Ok(name)
}

impl CatalogService {
    pub fn new(repo: CatalogRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn list(&self, kind: CatalogKind, scope: CampusScope) -> Result<Vec<CatalogEntry>, AppError> {
        self.repo.list(kind, scope.campus_id()).await
    }

    // Fora do escopo conta como inexistente
    async fn find_in_scope(
        &self,
        kind: CatalogKind,
        scope: CampusScope,
        id: Uuid,
    ) -> Result<CatalogEntry, AppError> {
        let entry = self.repo.find_by_id(kind, id).await?;
        match scope.campus_id() {
            Some(campus_id) if campus_id != entry.campus_id => Err(match kind {
                CatalogKind::Category => AppError::CategoryNotFound,
                CatalogKind::Sector => AppError::SectorNotFound,
            }),
            _ => Ok(entry),
        }
    }

    pub async fn create(
        &self,
        kind: CatalogKind,
        scope: CampusScope,
        payload: &CreateCatalogPayload,
    ) -> Result<CatalogEntry, AppError> {
        let campus_id = scope.target_campus(payload.campus_id)?;
        let name = clean_name(&payload.name)?;

        let entry = self.repo.create(&self.pool, kind, campus_id, name).await?;
        tracing::info!(table = kind.table(), name = %entry.name, campus = %campus_id, "cadastro criado");
        Ok(entry)
    }

    pub async fn rename(
        &self,
        kind: CatalogKind,
        scope: CampusScope,
        id: Uuid,
        name: &str,
    ) -> Result<CatalogEntry, AppError> {
        self.find_in_scope(kind, scope, id).await?;
        let name = clean_name(name)?;
        self.repo.rename(&self.pool, kind, id, name).await
    }

    pub async fn delete(&self, kind: CatalogKind, scope: CampusScope, id: Uuid) -> Result<(), AppError> {
        self.find_in_scope(kind, scope, id).await?;
        self.repo.delete(&self.pool, kind, id).await
    }
}
