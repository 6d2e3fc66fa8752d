pub mod audit_repo;
pub use audit_repo::AuditRepository;
pub mod campus_repo;
pub use campus_repo::CampusRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod loan_repo;
pub use loan_repo::LoanRepository;
pub mod request_repo;
pub use request_repo::RequestRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
