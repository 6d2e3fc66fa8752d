// src/services/user_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    middleware::campus::CampusScope,
    models::auth::{is_reserved_username, CreateUserPayload, UpdateUserPayload, User, UserRole},
    services::auth::hash_password,
};

/// Regras de perfil x campus, aplicadas na criação e na edição.
pub(crate) fn check_user_rules(
    actor_role: UserRole,
    username: &str,
    role: UserRole,
    campus_id: Option<Uuid>,
) -> Result<(), AppError> {
    if role == UserRole::Super && actor_role != UserRole::Super {
        return Err(AppError::Forbidden(
            "Somente um super administrador pode conceder o perfil super.".into(),
        ));
    }

    match (role, campus_id) {
        (UserRole::Tecnico, None) => Err(AppError::InvalidInput(
            "Técnicos precisam estar vinculados a um campus.".into(),
        )),
        (UserRole::Admin | UserRole::Super, Some(_)) => Err(AppError::InvalidInput(
            "Administradores não são vinculados a um campus.".into(),
        )),
        (UserRole::Tecnico, Some(_)) if is_reserved_username(username) => Err(AppError::InvalidInput(
            format!("O usuário '{}' é reservado para administradores.", username.trim()),
        )),
        _ => Ok(()),
    }
}

#[derive(Debug, PartialEq)]
pub(crate) struct UserChanges {
    pub name: String,
    pub role: UserRole,
    pub campus_id: Option<Uuid>,
}

/// Combina o estado atual (já travado) com a edição e aplica as regras.
pub(crate) fn resolve_user_update(
    actor_role: UserRole,
    current: &User,
    payload: &UpdateUserPayload,
) -> Result<UserChanges, AppError> {
    if current.role == UserRole::Super && actor_role != UserRole::Super {
        return Err(AppError::Forbidden(
            "Somente um super administrador pode alterar outro super.".into(),
        ));
    }

    let role = payload.role.unwrap_or(current.role);
    // Promovido a admin sem campus informado: o vínculo cai junto
    let campus_id = match payload.campus_id {
        Some(explicit) => explicit,
        None if role.is_admin() => None,
        None => current.campus_id,
    };
    check_user_rules(actor_role, &current.username, role, campus_id)?;

    let name = payload.name.as_deref().map(str::trim).unwrap_or(current.name.as_str()).to_owned();
    Ok(UserChanges { name, role, campus_id })
}

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
    pool: PgPool,
}

impl UserService {
    pub fn new(repo: UserRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn list_users(&self, scope: CampusScope) -> Result<Vec<User>, AppError> {
        self.repo.list(scope.campus_id()).await
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, AppError> {
        self.repo.find_by_id(id).await?.ok_or(AppError::UserNotFound)
    }

    pub async fn create_user(&self, actor: &User, payload: CreateUserPayload) -> Result<User, AppError> {
        let username = payload.username.trim();
        check_user_rules(actor.role, username, payload.role, payload.campus_id)?;

        let hashed_password = hash_password(&payload.password).await?;

        let user = self
            .repo
            .create_user(
                &self.pool,
                username,
                payload.name.trim(),
                payload.role,
                payload.campus_id,
                &hashed_password,
            )
            .await?;

        tracing::info!(actor = %actor.username, user = %user.username, role = ?user.role, "usuário criado");
        Ok(user)
    }

    pub async fn update_user(
        &self,
        actor: &User,
        id: Uuid,
        payload: UpdateUserPayload,
    ) -> Result<User, AppError> {
        // Hash antes de abrir a transação para não segurar o lock durante o bcrypt
        let new_hash = match payload.password.as_deref() {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };

        let mut tx = self.pool.begin().await?;
        let current = self
            .repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let changes = resolve_user_update(actor.role, &current, &payload)?;

        let mut user = self
            .repo
            .update_user(&mut *tx, id, &changes.name, changes.role, changes.campus_id)
            .await?;
        if let Some(hash) = new_hash {
            self.repo.update_password_hash(&mut *tx, id, &hash).await?;
            user.password_hash = hash;
        }
        tx.commit().await?;

        tracing::info!(actor = %actor.username, user = %user.username, "usuário atualizado");
        Ok(user)
    }

    pub async fn delete_user(&self, actor: &User, id: Uuid) -> Result<(), AppError> {
        if actor.id == id {
            return Err(AppError::Forbidden("Você não pode excluir o próprio usuário.".into()));
        }

        let target = self.get_user(id).await?;
        if target.role == UserRole::Super && actor.role != UserRole::Super {
            return Err(AppError::Forbidden(
                "Somente um super administrador pode excluir outro super.".into(),
            ));
        }

        self.repo.delete_user(id).await?;
        tracing::info!(actor = %actor.username, user = %target.username, "usuário excluído");
        Ok(())
    }

    /// Banco vazio: cria o usuário `admin` (super) com a senha configurada.
    pub async fn bootstrap_admin(&self, password: &str) -> Result<bool, AppError> {
        if self.repo.count_all().await? > 0 {
            return Ok(false);
        }

        let hashed_password = hash_password(password).await?;
        self.repo
            .create_user(&self.pool, "admin", "Administrador", UserRole::Super, None, &hashed_password)
            .await?;

        tracing::warn!("Usuário 'admin' criado a partir de BOOTSTRAP_ADMIN_PASSWORD");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: UserRole, campus_id: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            username: "joana".into(),
            name: "Joana".into(),
            role,
            campus_id,
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn promotion_to_admin_drops_the_campus() {
        let current = user(UserRole::Tecnico, Some(Uuid::new_v4()));
        let payload = UpdateUserPayload { role: Some(UserRole::Admin), ..Default::default() };

        let changes = resolve_user_update(UserRole::Admin, &current, &payload).unwrap();
        assert_eq!(changes.role, UserRole::Admin);
        assert_eq!(changes.campus_id, None);
        assert_eq!(changes.name, "Joana");
    }

    #[test]
    fn rules_run_against_the_current_row() {
        let campus = Some(Uuid::new_v4());
        let current = user(UserRole::Tecnico, campus);
        let payload = UpdateUserPayload { name: Some("  Joana Lima ".into()), ..Default::default() };
        let changes = resolve_user_update(UserRole::Admin, &current, &payload).unwrap();
        assert_eq!(changes, UserChanges { name: "Joana Lima".into(), role: UserRole::Tecnico, campus_id: campus });

        let current = user(UserRole::Super, None);
        assert!(matches!(
            resolve_user_update(UserRole::Admin, &current, &UpdateUserPayload::default()),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn technician_needs_a_campus_and_admins_must_not_have_one() {
        let campus = Some(Uuid::new_v4());
        assert!(check_user_rules(UserRole::Admin, "tec1", UserRole::Tecnico, campus).is_ok());
        assert!(matches!(
            check_user_rules(UserRole::Admin, "tec1", UserRole::Tecnico, None),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            check_user_rules(UserRole::Admin, "maria", UserRole::Admin, campus),
            Err(AppError::InvalidInput(_))
        ));
        assert!(check_user_rules(UserRole::Admin, "maria", UserRole::Admin, None).is_ok());
    }

    #[test]
    fn only_super_grants_super() {
        assert!(matches!(
            check_user_rules(UserRole::Admin, "root", UserRole::Super, None),
            Err(AppError::Forbidden(_))
        ));
        assert!(check_user_rules(UserRole::Super, "root", UserRole::Super, None).is_ok());
    }

    #[test]
    fn reserved_usernames_cannot_be_technicians() {
        assert!(matches!(
            check_user_rules(UserRole::Admin, "Full", UserRole::Tecnico, Some(Uuid::new_v4())),
            Err(AppError::InvalidInput(_))
        ));
        assert!(check_user_rules(UserRole::Admin, "full", UserRole::Admin, None).is_ok());
    }
}
