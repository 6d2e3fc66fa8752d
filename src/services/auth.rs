// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, text::normalize_key},
    db::{CampusRepository, UserRepository},
    models::{
        auth::{
            is_reserved_username, AuthResponse, Claims, LoginUserPayload, ResolvedCampus,
            TechnicianCampus, User, UserRole,
        },
        campus::Campus,
    },
};

// Hash bcrypt fora do runtime async
pub(crate) async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

/// Senhas antigas foram gravadas em texto puro; todo hash bcrypt começa com "$2".
pub(crate) fn is_bcrypt_hash(stored: &str) -> bool {
    stored.starts_with("$2")
}

/// Login por nome de campus: o texto digitado precisa bater com o campus de
/// exatamente um técnico.
pub(crate) fn match_technician_by_campus(input: &str, technicians: &[TechnicianCampus]) -> Option<Uuid> {
    let key = normalize_key(input);
    if key.is_empty() {
        return None;
    }

    let mut matches = technicians
        .iter()
        .filter(|t| normalize_key(&t.campus_name) == key);

    match (matches.next(), matches.next()) {
        (Some(only), None) => Some(only.user_id),
        _ => None,
    }
}

/// O campo "campus" do login aceita o id ou o nome. Vazio é aceito.
pub(crate) fn campus_field_matches(field: Option<&str>, campus_id: Uuid, campus_name: &str) -> bool {
    let Some(field) = field.map(str::trim).filter(|f| !f.is_empty()) else {
        return true;
    };

    if let Ok(id) = Uuid::parse_str(field) {
        return id == campus_id;
    }
    normalize_key(field) == normalize_key(campus_name)
}

/// Campus da sessão. Usuários reservados e administradores sempre entram no
/// "Administrador", seja qual for o campus escolhido na tela.
pub(crate) fn session_campus(
    reserved: bool,
    user: &User,
    campus: Option<&Campus>,
    field: Option<&str>,
) -> Result<ResolvedCampus, AppError> {
    if reserved || user.role.is_admin() {
        return Ok(ResolvedCampus::administrador());
    }

    let campus = campus.ok_or(AppError::CampusNotFound)?;
    if !campus_field_matches(field, campus.id, &campus.name) {
        tracing::warn!(user = %user.username, "login recusado: campus divergente");
        return Err(AppError::CampusMismatch);
    }
    Ok(ResolvedCampus { id: Some(campus.id), name: campus.name.clone() })
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    campus_repo: CampusRepository,
    jwt_secret: String,
    jwt_ttl_hours: i64,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        campus_repo: CampusRepository,
        jwt_secret: String,
        jwt_ttl_hours: i64,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, campus_repo, jwt_secret, jwt_ttl_hours, pool }
    }

    pub async fn login_user(&self, payload: &LoginUserPayload) -> Result<AuthResponse, AppError> {
        let reserved = is_reserved_username(&payload.username);

        // 1. Resolve o usuário (nome exato, depois nome do campus)
        let user = match self.user_repo.find_by_username(&payload.username).await? {
            Some(user) => user,
            None if reserved => return Err(AppError::InvalidCredentials),
            None => {
                let technicians = self.user_repo.list_technician_campuses().await?;
                let user_id = match_technician_by_campus(&payload.username, &technicians)
                    .ok_or(AppError::InvalidCredentials)?;
                self.user_repo
                    .find_by_id(user_id)
                    .await?
                    .ok_or(AppError::InvalidCredentials)?
            }
        };

        // 2. Senha
        self.check_password(&user, &payload.password).await?;

        // 3. Campus da sessão
        let own_campus = match user.campus_id {
            Some(campus_id) if !reserved && !user.role.is_admin() => {
                self.campus_repo.find_by_id(&self.pool, campus_id).await?
            }
            _ => None,
        };
        let campus = session_campus(reserved, &user, own_campus.as_ref(), payload.campus.as_deref())?;

        let token = self.create_token(&user)?;
        tracing::info!(user = %user.username, campus = %campus.name, "login efetuado");

        Ok(AuthResponse { token, user, campus })
    }

    async fn check_password(&self, user: &User, password: &str) -> Result<(), AppError> {
        if !is_bcrypt_hash(&user.password_hash) {
            // Senha legada: compara uma vez e já grava o hash
            if user.password_hash != password {
                return Err(AppError::InvalidCredentials);
            }
            let hashed = hash_password(password).await?;
            self.user_repo
                .update_password_hash(&self.pool, user.id, &hashed)
                .await?;
            tracing::info!(user = %user.username, "senha legada convertida para bcrypt");
            return Ok(());
        }

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }
        Ok(())
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        // Usuário removido depois da emissão do token
        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    pub(crate) fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::hours(self.jwt_ttl_hours);

        let claims = Claims {
            sub: user.id,
            role: user.role,
            campus_id: match user.role {
                UserRole::Tecnico => user.campus_id,
                UserRole::Admin | UserRole::Super => None,
            },
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tech(campus_name: &str) -> TechnicianCampus {
        TechnicianCampus { user_id: Uuid::new_v4(), campus_id: Uuid::new_v4(), campus_name: campus_name.into() }
    }

    #[test]
    fn campus_name_login_ignores_accents_and_case() {
        let techs = vec![tech("São Bernardo"), tech("Liberdade")];
        assert_eq!(match_technician_by_campus("sao  bernardo", &techs), Some(techs[0].user_id));
        assert_eq!(match_technician_by_campus("LIBERDADE", &techs), Some(techs[1].user_id));
        assert_eq!(match_technician_by_campus("Vergueiro", &techs), None);
        assert_eq!(match_technician_by_campus("  ", &techs), None);
    }

    #[test]
    fn ambiguous_campus_name_does_not_log_in() {
        let techs = vec![tech("Liberdade"), tech("liberdade")];
        assert_eq!(match_technician_by_campus("liberdade", &techs), None);
    }

    #[test]
    fn campus_field_accepts_id_or_name() {
        let id = Uuid::new_v4();
        assert!(campus_field_matches(None, id, "Vila Maria"));
        assert!(campus_field_matches(Some(""), id, "Vila Maria"));
        assert!(campus_field_matches(Some(&id.to_string()), id, "Vila Maria"));
        assert!(campus_field_matches(Some("vila  MARIA"), id, "Vila Maria"));
        assert!(!campus_field_matches(Some("Liberdade"), id, "Vila Maria"));
        assert!(!campus_field_matches(Some(&Uuid::new_v4().to_string()), id, "Vila Maria"));
    }

    fn user(username: &str, role: UserRole, campus_id: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.into(),
            name: username.into(),
            role,
            campus_id,
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn campus(name: &str) -> Campus {
        Campus { id: Uuid::new_v4(), name: name.into(), created_at: Utc::now(), updated_at: Utc::now() }
    }

    #[test]
    fn reserved_login_is_always_administrador() {
        let admin = user("admin", UserRole::Admin, None);
        let resolved = session_campus(true, &admin, None, Some("Liberdade")).unwrap();
        assert_eq!(resolved.id, None);
        assert_eq!(resolved.name, "Administrador");

        // Usuário reservado gravado com campus continua indo para o Administrador
        let vila = campus("Vila Maria");
        let full = user("FULL", UserRole::Tecnico, Some(vila.id));
        assert!(is_reserved_username("  FULL "));
        let resolved = session_campus(true, &full, Some(&vila), Some("Liberdade")).unwrap();
        assert_eq!(resolved.id, None);
    }

    #[test]
    fn admins_ignore_the_selected_campus() {
        let maria = user("maria", UserRole::Super, None);
        let resolved = session_campus(false, &maria, None, Some(&Uuid::new_v4().to_string())).unwrap();
        assert_eq!(resolved.name, "Administrador");
    }

    #[test]
    fn technician_gets_own_campus_or_mismatch() {
        let vila = campus("Vila Maria");
        let tec = user("tec1", UserRole::Tecnico, Some(vila.id));

        let resolved = session_campus(false, &tec, Some(&vila), None).unwrap();
        assert_eq!(resolved.id, Some(vila.id));
        assert_eq!(resolved.name, "Vila Maria");

        assert!(matches!(
            session_campus(false, &tec, Some(&vila), Some("Liberdade")),
            Err(AppError::CampusMismatch)
        ));
        assert!(matches!(
            session_campus(false, &tec, None, None),
            Err(AppError::CampusNotFound)
        ));
    }

    #[test]
    fn legacy_passwords_are_detected() {
        assert!(is_bcrypt_hash("$2b$12$C6UzMDM.H6dfI/f/IKcEeO"));
        assert!(!is_bcrypt_hash("123456"));
    }

    #[tokio::test]
    async fn issued_token_validates_with_the_same_secret() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let service = AuthService::new(
            UserRepository::new(pool.clone()),
            CampusRepository::new(pool.clone()),
            "segredo".into(),
            1,
            pool,
        );
        let user = User {
            id: Uuid::new_v4(),
            username: "tec".into(),
            name: "Técnico".into(),
            role: UserRole::Tecnico,
            campus_id: Some(Uuid::new_v4()),
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let token = service.create_token(&user).unwrap();
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"segredo"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims.sub, user.id);
        assert_eq!(data.claims.campus_id, user.campus_id);
        assert_eq!(data.claims.role, UserRole::Tecnico);
    }
}
