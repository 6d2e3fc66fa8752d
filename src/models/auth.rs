// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Nome exibido para sessões administrativas (não é um campus real).
pub const ADMIN_CAMPUS_NAME: &str = "Administrador";

/// Usuários que nunca passam pela resolução de campus.
pub const RESERVED_USERNAMES: [&str; 2] = ["admin", "full"];

pub fn is_reserved_username(username: &str) -> bool {
    let username = username.trim();
    RESERVED_USERNAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(username))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Tecnico,
    Super,
}

impl UserRole {
    /// admin e super enxergam todos os campi.
    pub fn is_admin(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Super)
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub role: UserRole,
    pub campus_id: Option<Uuid>,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Técnico com o nome do seu campus, usado na resolução do login.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TechnicianCampus {
    pub user_id: Uuid,
    pub campus_id: Uuid,
    pub campus_name: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(length(min = 1, message = "O usuário é obrigatório."))]
    #[schema(example = "liberdade")]
    pub username: String,

    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub password: String,

    /// Campus escolhido na tela de login (id ou nome). Ignorado para admin.
    pub campus: Option<String>,
}

/// Campus resolvido no login.
#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct ResolvedCampus {
    pub id: Option<Uuid>,
    pub name: String,
}

impl ResolvedCampus {
    pub fn administrador() -> Self {
        Self { id: None, name: ADMIN_CAMPUS_NAME.to_string() }
    }
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
    pub campus: ResolvedCampus,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: UserRole,
    pub campus_id: Option<Uuid>,
    pub exp: usize,
    pub iat: usize,
}

// ---
// Gestão de usuários
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 3, max = 64, message = "O usuário deve ter entre 3 e 64 caracteres."))]
    pub username: String,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    pub role: UserRole,

    pub campus_id: Option<Uuid>,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: Option<String>,

    pub role: Option<UserRole>,

    /// `null` remove o campus; ausente mantém o atual.
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub campus_id: Option<Option<Uuid>>,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_usernames_ignore_case_and_spaces() {
        assert!(is_reserved_username("admin"));
        assert!(is_reserved_username(" ADMIN "));
        assert!(is_reserved_username("Full"));
        assert!(!is_reserved_username("administrador"));
        assert!(!is_reserved_username("liberdade"));
    }

    #[test]
    fn user_json_never_carries_the_hash() {
        let user = User {
            id: Uuid::nil(),
            username: "tec".into(),
            name: "Técnico".into(),
            role: UserRole::Tecnico,
            campus_id: Some(Uuid::nil()),
            password_hash: "$2b$12$abc".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "tecnico");
        assert!(json.get("campusId").is_some());
    }

    #[test]
    fn update_payload_distinguishes_null_from_missing() {
        let p: UpdateUserPayload = serde_json::from_str(r#"{"campusId": null}"#).unwrap();
        assert_eq!(p.campus_id, Some(None));
        let p: UpdateUserPayload = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(p.campus_id, None);
    }
}
