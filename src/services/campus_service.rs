// src/services/campus_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, text::normalize_key},
    db::CampusRepository,
    models::{auth::ADMIN_CAMPUS_NAME, campus::Campus},
};

// "Administrador" é o rótulo das sessões administrativas, não pode virar campus
pub(crate) fn check_campus_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("O nome do campus é obrigatório.".into()));
    }
    if normalize_key(name) == normalize_key(ADMIN_CAMPUS_NAME) {
        return Err(AppError::CampusNameReserved(name.to_string()));
    }
    Ok(name)
}

/// Só campus sem itens e sem técnicos pode ser excluído. Itens têm precedência.
pub(crate) fn check_campus_empty(items: i64, users: i64) -> Result<(), AppError> {
    if items > 0 {
        return Err(AppError::CampusHasItems);
    }
    if users > 0 {
        return Err(AppError::CampusHasUsers);
    }
    Ok(())
}

#[derive(Clone)]
pub struct CampusService {
    repo: CampusRepository,
    pool: PgPool,
}

impl CampusService {
    pub fn new(repo: CampusRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn list_campuses(&self) -> Result<Vec<Campus>, AppError> {
        self.repo.list().await
    }

    pub async fn get_campus(&self, id: Uuid) -> Result<Campus, AppError> {
        self.repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::CampusNotFound)
    }

    pub async fn create_campus(&self, name: &str) -> Result<Campus, AppError> {
        let name = check_campus_name(name)?;
        let campus = self.repo.create(&self.pool, name).await?;
        tracing::info!(campus = %campus.name, "campus criado");
        Ok(campus)
    }

    pub async fn rename_campus(&self, id: Uuid, name: &str) -> Result<Campus, AppError> {
        let name = check_campus_name(name)?;
        self.repo.rename(&self.pool, id, name).await
    }

    /// Recusa a exclusão com itens ou usuários; categorias, setores e chamados vão junto.
    pub async fn delete_campus(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let campus = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::CampusNotFound)?;

        let items = self.repo.count_items(&mut *tx, id).await?;
        let users = self.repo.count_users(&mut *tx, id).await?;
        check_campus_empty(items, users)?;

        self.repo.delete(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(campus = %campus.name, "campus excluído");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn administrador_is_reserved_in_any_spelling() {
        assert!(matches!(check_campus_name("Administrador"), Err(AppError::CampusNameReserved(_))));
        assert!(matches!(check_campus_name("  ADMINISTRADOR "), Err(AppError::CampusNameReserved(_))));
        assert!(matches!(check_campus_name("   "), Err(AppError::InvalidInput(_))));
        assert_eq!(check_campus_name(" Liberdade ").unwrap(), "Liberdade");
    }

    #[test]
    fn campus_with_items_or_users_is_kept() {
        assert!(matches!(check_campus_empty(3, 0), Err(AppError::CampusHasItems)));
        assert!(matches!(check_campus_empty(1, 2), Err(AppError::CampusHasItems)));
        assert!(matches!(check_campus_empty(0, 1), Err(AppError::CampusHasUsers)));
        assert!(check_campus_empty(0, 0).is_ok());
    }
}
