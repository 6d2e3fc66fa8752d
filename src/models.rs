pub mod audit;
pub mod auth;
pub mod campus;
pub mod catalog;
pub mod dashboard;
pub mod inventory;
pub mod loan;
pub mod request;
