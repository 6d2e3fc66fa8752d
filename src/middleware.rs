pub mod auth;
pub mod campus;
pub mod rbac;
