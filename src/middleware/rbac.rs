// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    models::auth::UserRole,
};

/// 1. O Trait que define quais cargos passam pelo guardião
pub trait RoleDef: Send + Sync + 'static {
    fn allows(role: UserRole) -> bool;
    fn description() -> &'static str;
}

/// 2. O Extractor (Guardião)
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::InvalidToken)?;

        if !T::allows(user.0.role) {
            return Err(AppError::Forbidden(format!(
                "Esta ação requer perfil de {}.",
                T::description()
            )));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS PERFIS (TIPOS)
// ---

pub struct AdminOnly;
impl RoleDef for AdminOnly {
    fn allows(role: UserRole) -> bool {
        role.is_admin()
    }
    fn description() -> &'static str {
        "administrador"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_gate_accepts_admin_and_super() {
        assert!(AdminOnly::allows(UserRole::Admin));
        assert!(AdminOnly::allows(UserRole::Super));
        assert!(!AdminOnly::allows(UserRole::Tecnico));
    }
}
