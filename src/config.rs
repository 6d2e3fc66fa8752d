// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{path::PathBuf, time::Duration};

use crate::{
    db::{
        AuditRepository, CampusRepository, CatalogRepository, DashboardRepository,
        InventoryRepository, LoanRepository, RequestRepository, UserRepository,
    },
    services::{
        audit_service::AuditService, auth::AuthService, campus_service::CampusService,
        catalog_service::CatalogService, dashboard_service::DashboardService,
        inventory_service::InventoryService, loan_service::LoanService,
        report_service::ReportService, request_service::RequestService,
        user_service::UserService,
    },
};

/// Configuração lida das variáveis de ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub jwt_ttl_hours: i64,
    pub report_fonts_dir: PathBuf,
    pub bootstrap_admin_password: Option<String>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    // Separado do ambiente real para poder testar
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let db_max_connections = match var("DB_MAX_CONNECTIONS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: '{}'", v))?,
            None => 5,
        };

        let jwt_ttl_hours: i64 = match var("JWT_TTL_HOURS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("JWT_TTL_HOURS inválido: '{}'", v))?,
            None => 24 * 7,
        };
        if jwt_ttl_hours <= 0 {
            anyhow::bail!("JWT_TTL_HOURS deve ser maior que zero");
        }

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            db_max_connections,
            jwt_ttl_hours,
            report_fonts_dir: var("REPORT_FONTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./fonts")),
            bootstrap_admin_password: var("BOOTSTRAP_ADMIN_PASSWORD"),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub campus_service: CampusService,
    pub catalog_service: CatalogService,
    pub inventory_service: InventoryService,
    pub loan_service: LoanService,
    pub audit_service: AuditService,
    pub request_service: RequestService,
    pub dashboard_service: DashboardService,
    pub report_service: ReportService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, settings))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_pool(db_pool: PgPool, settings: &Settings) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let campus_repo = CampusRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let inventory_repo = InventoryRepository::new(db_pool.clone());
        let loan_repo = LoanRepository::new(db_pool.clone());
        let audit_repo = AuditRepository::new(db_pool.clone());
        let request_repo = RequestRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            campus_repo.clone(),
            settings.jwt_secret.clone(),
            settings.jwt_ttl_hours,
            db_pool.clone(),
        );
        let inventory_service =
            InventoryService::new(inventory_repo.clone(), audit_repo.clone(), db_pool.clone());

        Self {
            auth_service,
            user_service: UserService::new(user_repo, db_pool.clone()),
            campus_service: CampusService::new(campus_repo, db_pool.clone()),
            catalog_service: CatalogService::new(catalog_repo, db_pool.clone()),
            loan_service: LoanService::new(
                loan_repo.clone(),
                inventory_repo.clone(),
                audit_repo.clone(),
                db_pool.clone(),
            ),
            audit_service: AuditService::new(audit_repo),
            request_service: RequestService::new(request_repo, db_pool.clone()),
            dashboard_service: DashboardService::new(dashboard_repo),
            report_service: ReportService::new(
                inventory_service.clone(),
                inventory_repo,
                loan_repo,
                db_pool.clone(),
                settings.report_fonts_dir.clone(),
            ),
            inventory_service,
            db_pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let s = settings(&[("DATABASE_URL", "postgres://db/inv"), ("JWT_SECRET", "x")]).unwrap();
        assert_eq!(s.bind_addr, "0.0.0.0:3000");
        assert_eq!(s.db_max_connections, 5);
        assert_eq!(s.jwt_ttl_hours, 168);
        assert_eq!(s.report_fonts_dir, PathBuf::from("./fonts"));
        assert!(s.bootstrap_admin_password.is_none());
    }

    #[test]
    fn missing_secret_fails() {
        let err = settings(&[("DATABASE_URL", "postgres://db/inv")]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn invalid_numbers_fail_with_context() {
        let err = settings(&[
            ("DATABASE_URL", "postgres://db/inv"),
            ("JWT_SECRET", "x"),
            ("DB_MAX_CONNECTIONS", "muitas"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));

        assert!(settings(&[
            ("DATABASE_URL", "postgres://db/inv"),
            ("JWT_SECRET", "x"),
            ("JWT_TTL_HOURS", "0"),
        ])
        .is_err());
    }

    #[test]
    fn blank_optional_values_are_ignored() {
        let s = settings(&[
            ("DATABASE_URL", "postgres://db/inv"),
            ("JWT_SECRET", "x"),
            ("BOOTSTRAP_ADMIN_PASSWORD", "  "),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ])
        .unwrap();
        assert!(s.bootstrap_admin_password.is_none());
        assert_eq!(s.bind_addr, "127.0.0.1:8080");
    }
}
