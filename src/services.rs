pub mod audit_service;
pub mod auth;
pub mod campus_service;
pub mod catalog_service;
pub mod dashboard_service;
pub mod inventory_service;
pub mod loan_service;
pub mod report_service;
pub mod request_service;
pub mod user_service;
