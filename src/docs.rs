// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,

        // --- Campuses ---
        handlers::campuses::list_campuses,
        handlers::campuses::get_campus,
        handlers::campuses::list_campus_sectors,
        handlers::campuses::create_campus,
        handlers::campuses::rename_campus,
        handlers::campuses::delete_campus,

        // --- Categories / Sectors ---
        handlers::catalog::list_categories,
        handlers::catalog::create_category,
        handlers::catalog::rename_category,
        handlers::catalog::delete_category,
        handlers::catalog::list_sectors,
        handlers::catalog::create_sector,
        handlers::catalog::rename_sector,
        handlers::catalog::delete_sector,

        // --- INVENTORY ---
        handlers::inventory::list_items,
        handlers::inventory::list_disposed_items,
        handlers::inventory::get_item,
        handlers::inventory::sync_items,
        handlers::inventory::create_item,
        handlers::inventory::update_item,
        handlers::inventory::dispose_item,
        handlers::inventory::restore_item,
        handlers::inventory::delete_item,

        // --- Loans ---
        handlers::loans::list_loans,
        handlers::loans::get_loan,
        handlers::loans::create_loan,
        handlers::loans::return_loan,

        // --- Audit ---
        handlers::audit::list_audit_log,

        // --- Requests ---
        handlers::requests::create_request,
        handlers::requests::list_requests,
        handlers::requests::get_request,
        handlers::requests::update_request_status,

        // --- Dashboard / Reports ---
        handlers::dashboard::get_summary,
        handlers::reports::inventory_csv,
        handlers::reports::inventory_pdf,
        handlers::reports::loan_receipt_pdf,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::LoginUserPayload,
            models::auth::ResolvedCampus,
            models::auth::AuthResponse,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,

            // --- Campus / cadastros ---
            models::campus::Campus,
            models::campus::CampusPayload,
            models::catalog::CatalogEntry,
            models::catalog::CreateCatalogPayload,
            models::catalog::RenameCatalogPayload,

            // --- Inventory ---
            models::inventory::ItemStatus,
            models::inventory::InventoryItem,
            models::inventory::CreateItemPayload,
            models::inventory::UpdateItemPayload,
            models::inventory::SyncPayload,
            models::inventory::SyncResponse,

            // --- Loans ---
            models::loan::LoanStatus,
            models::loan::Loan,
            models::loan::LoanView,
            models::loan::CreateLoanPayload,
            models::loan::ReturnLoanPayload,

            // --- Audit ---
            models::audit::AuditAction,
            models::audit::AuditLogEntry,

            // --- Requests ---
            models::request::RequestStatus,
            models::request::SupportRequest,
            models::request::CreateRequestPayload,
            models::request::UpdateRequestStatusPayload,

            // --- DASHBOARD ---
            models::dashboard::StatusCount,
            models::dashboard::DashboardSummary,
        )
    ),
    tags(
        (name = "Auth", description = "Login e sessão"),
        (name = "Users", description = "Gestão de usuários (administradores)"),
        (name = "Campuses", description = "Campi"),
        (name = "Categories", description = "Categorias de equipamento por campus"),
        (name = "Sectors", description = "Setores por campus"),
        (name = "Inventory", description = "Itens do inventário, descarte e sincronização"),
        (name = "Loans", description = "Empréstimos de equipamentos"),
        (name = "Audit", description = "Histórico de alterações"),
        (name = "Requests", description = "Chamados de suporte"),
        (name = "Dashboard", description = "Indicadores gerenciais"),
        (name = "Reports", description = "Exportações em CSV e PDF")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_the_sync_endpoint_and_jwt_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/inventory/sync"));
        assert!(doc.paths.paths.contains_key("/api/reports/loans/{id}/receipt.pdf"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
