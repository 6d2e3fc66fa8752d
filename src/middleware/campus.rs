// src/middleware/campus.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    models::auth::{User, UserRole},
};

// Cabeçalho opcional com o campus selecionado no frontend
pub const CAMPUS_ID_HEADER: &str = "x-campus-id";

/// Escopo de dados da requisição.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampusScope {
    /// Administrador sem campus selecionado: enxerga tudo.
    All,
    Campus(Uuid),
}

impl CampusScope {
    /// Técnico: sempre o próprio campus. Admin/super: o campus pedido ou todos.
    pub fn for_user(user: &User, requested: Option<Uuid>) -> Result<Self, AppError> {
        match user.role {
            UserRole::Tecnico => {
                let own = user.campus_id.ok_or_else(|| {
                    AppError::Forbidden("Técnico sem campus vinculado.".into())
                })?;
                match requested {
                    Some(other) if other != own => Err(AppError::Forbidden(
                        "Técnicos só podem acessar o próprio campus.".into(),
                    )),
                    _ => Ok(CampusScope::Campus(own)),
                }
            }
            UserRole::Admin | UserRole::Super => Ok(requested
                .map(CampusScope::Campus)
                .unwrap_or(CampusScope::All)),
        }
    }

    /// Filtro para os repositórios (`None` = todos os campi).
    pub fn campus_id(self) -> Option<Uuid> {
        match self {
            CampusScope::All => None,
            CampusScope::Campus(id) => Some(id),
        }
    }

    /// Campus de destino de uma escrita.
    pub fn target_campus(self, requested: Option<Uuid>) -> Result<Uuid, AppError> {
        match (self, requested) {
            (CampusScope::Campus(own), None) => Ok(own),
            (CampusScope::Campus(own), Some(id)) if id == own => Ok(own),
            (CampusScope::Campus(_), Some(_)) => Err(AppError::Forbidden(
                "O campus informado está fora do seu escopo.".into(),
            )),
            (CampusScope::All, Some(id)) => Ok(id),
            (CampusScope::All, None) => Err(AppError::InvalidInput(
                "Informe o campus (campusId ou cabeçalho X-Campus-Id).".into(),
            )),
        }
    }
}

/// Extrator: precisa do `auth_guard` antes.
#[derive(Debug, Clone, Copy)]
pub struct CampusContext(pub CampusScope);

impl<S> FromRequestParts<S> for CampusContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;

        let requested = match parts.headers.get(CAMPUS_ID_HEADER) {
            Some(value) => {
                let value_str = value.to_str().map_err(|_| {
                    AppError::InvalidInput("Cabeçalho X-Campus-Id contém caracteres inválidos.".into())
                })?;
                let id = Uuid::parse_str(value_str.trim()).map_err(|_| {
                    AppError::InvalidInput("Cabeçalho X-Campus-Id inválido (não é um UUID).".into())
                })?;
                Some(id)
            }
            None => None,
        };

        Ok(CampusContext(CampusScope::for_user(&user, requested)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: UserRole, campus_id: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            username: "u".into(),
            name: "U".into(),
            role,
            campus_id,
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn technician_is_pinned_to_own_campus() {
        let campus = Uuid::new_v4();
        let tec = user(UserRole::Tecnico, Some(campus));

        assert_eq!(CampusScope::for_user(&tec, None).unwrap(), CampusScope::Campus(campus));
        assert_eq!(CampusScope::for_user(&tec, Some(campus)).unwrap(), CampusScope::Campus(campus));
        assert!(matches!(
            CampusScope::for_user(&tec, Some(Uuid::new_v4())),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn technician_without_campus_is_rejected() {
        let tec = user(UserRole::Tecnico, None);
        assert!(matches!(CampusScope::for_user(&tec, None), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn admin_sees_everything_unless_a_campus_is_selected() {
        let admin = user(UserRole::Admin, None);
        let campus = Uuid::new_v4();
        assert_eq!(CampusScope::for_user(&admin, None).unwrap(), CampusScope::All);
        assert_eq!(CampusScope::for_user(&admin, Some(campus)).unwrap(), CampusScope::Campus(campus));
        assert_eq!(CampusScope::All.campus_id(), None);
    }

    #[test]
    fn write_target_resolution() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert_eq!(CampusScope::Campus(a).target_campus(None).unwrap(), a);
        assert_eq!(CampusScope::Campus(a).target_campus(Some(a)).unwrap(), a);
        assert!(matches!(CampusScope::Campus(a).target_campus(Some(b)), Err(AppError::Forbidden(_))));
        assert_eq!(CampusScope::All.target_campus(Some(b)).unwrap(), b);
        assert!(matches!(CampusScope::All.target_campus(None), Err(AppError::InvalidInput(_))));
    }
}
