use crate::common::error::AppError;

/// Converte um erro do sqlx em `AppError`, traduzindo violações de
/// constraint pelo *nome* da constraint (nunca pela mensagem do banco).
pub(crate) fn map_db_error(
    e: sqlx::Error,
    on_constraint: impl FnOnce(&str) -> Option<AppError>,
) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if let Some(constraint) = db_err.constraint() {
            if let Some(mapped) = on_constraint(constraint) {
                return mapped;
            }
            if db_err.is_unique_violation() {
                return AppError::UniqueConstraintViolation(constraint.to_string());
            }
        }
    }
    e.into()
}

/// Constraints compartilhadas pelas tabelas que referenciam campus, categoria
/// e setor. Usada como fallback pelos repositórios.
pub(crate) fn scoped_reference_error(constraint: &str) -> Option<AppError> {
    match constraint {
        "inventory_items_category_campus_fkey" => Some(AppError::CategoryNotFound),
        "inventory_items_sector_campus_fkey" | "requests_sector_campus_fkey" => {
            Some(AppError::SectorNotFound)
        }
        "inventory_items_campus_id_fkey"
        | "requests_campus_id_fkey"
        | "users_campus_id_fkey"
        | "loans_campus_id_fkey" => Some(AppError::CampusNotFound),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_foreign_keys_surface_as_not_found_in_campus() {
        assert!(matches!(
            scoped_reference_error("inventory_items_category_campus_fkey"),
            Some(AppError::CategoryNotFound)
        ));
        assert!(matches!(
            scoped_reference_error("requests_sector_campus_fkey"),
            Some(AppError::SectorNotFound)
        ));
        assert!(scoped_reference_error("some_other_constraint").is_none());
    }

    #[test]
    fn non_database_errors_pass_through() {
        let err = map_db_error(sqlx::Error::RowNotFound, |_| Some(AppError::ItemNotFound));
        assert!(matches!(err, AppError::DatabaseError(sqlx::Error::RowNotFound)));
    }
}
