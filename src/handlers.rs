pub mod audit;
pub mod auth;
pub mod campuses;
pub mod catalog;
pub mod dashboard;
pub mod inventory;
pub mod loans;
pub mod reports;
pub mod requests;
pub mod users;
