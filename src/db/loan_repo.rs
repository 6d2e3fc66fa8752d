// src/db/loan_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::{map_db_error, scoped_reference_error}, error::AppError},
    models::loan::{Loan, LoanQuery},
};

const LOAN_COLUMNS: &str = "id, item_id, campus_id, borrower_name, borrower_email, borrower_phone, \
     loan_date, expected_return_date, actual_return_date, status, loaner_id, notes, \
     created_at, updated_at";

fn loan_constraint_error(constraint: &str) -> Option<AppError> {
    match constraint {
        "loans_one_active_per_item" => Some(AppError::ItemAlreadyLoaned),
        "loans_return_after_loan_check" => Some(AppError::InvalidInput(
            "A data prevista de devolução deve ser igual ou posterior à data do empréstimo.".into(),
        )),
        "loans_item_id_fkey" => Some(AppError::ItemNotFound),
        other => scoped_reference_error(other),
    }
}

/// Dados de um novo empréstimo, já resolvidos pelo serviço.
#[derive(Debug, Clone)]
pub struct NewLoan<'a> {
    pub item_id: Uuid,
    pub campus_id: Uuid,
    pub borrower_name: &'a str,
    pub borrower_email: Option<&'a str>,
    pub borrower_phone: Option<&'a str>,
    pub loan_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub loaner_id: Option<Uuid>,
    pub notes: Option<&'a str>,
}

#[derive(Clone)]
pub struct LoanRepository {
    pool: PgPool,
}

impl LoanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        campus_id: Option<Uuid>,
        filter: &LoanQuery,
        today: NaiveDate,
    ) -> Result<Vec<Loan>, AppError> {
        let loans = sqlx::query_as::<_, Loan>(&format!(
            "SELECT {LOAN_COLUMNS} FROM loans \
             WHERE ($1::uuid IS NULL OR campus_id = $1) \
               AND ($2::loan_status IS NULL OR status = $2) \
               AND ($3::uuid IS NULL OR item_id = $3) \
               AND (NOT $4 OR (status = 'loaned' AND expected_return_date < $5)) \
             ORDER BY loan_date DESC, created_at DESC"
        ))
        .bind(campus_id)
        .bind(filter.status)
        .bind(filter.item_id)
        .bind(filter.overdue)
        .bind(today)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    pub async fn find<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        campus_id: Option<Uuid>,
    ) -> Result<Option<Loan>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let loan = sqlx::query_as::<_, Loan>(&format!(
            "SELECT {LOAN_COLUMNS} FROM loans WHERE id = $1 AND ($2::uuid IS NULL OR campus_id = $2)"
        ))
        .bind(id)
        .bind(campus_id)
        .fetch_optional(executor)
        .await?;
        Ok(loan)
    }

    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        campus_id: Option<Uuid>,
    ) -> Result<Option<Loan>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let loan = sqlx::query_as::<_, Loan>(&format!(
            "SELECT {LOAN_COLUMNS} FROM loans \
             WHERE id = $1 AND ($2::uuid IS NULL OR campus_id = $2) FOR UPDATE"
        ))
        .bind(id)
        .bind(campus_id)
        .fetch_optional(executor)
        .await?;
        Ok(loan)
    }

    pub async fn create<'e, E>(&self, executor: E, new_loan: &NewLoan<'_>) -> Result<Loan, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Loan>(&format!(
            "INSERT INTO loans ( \
                 item_id, campus_id, borrower_name, borrower_email, borrower_phone, \
                 loan_date, expected_return_date, loaner_id, notes \
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {LOAN_COLUMNS}"
        ))
        .bind(new_loan.item_id)
        .bind(new_loan.campus_id)
        .bind(new_loan.borrower_name)
        .bind(new_loan.borrower_email)
        .bind(new_loan.borrower_phone)
        .bind(new_loan.loan_date)
        .bind(new_loan.expected_return_date)
        .bind(new_loan.loaner_id)
        .bind(new_loan.notes)
        .fetch_one(executor)
        .await
        .map_err(|e| map_db_error(e, loan_constraint_error))
    }

    pub async fn mark_returned<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        return_date: NaiveDate,
        notes: Option<&str>,
    ) -> Result<Loan, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Loan>(&format!(
            "UPDATE loans SET \
                 status = 'returned', actual_return_date = $2, \
                 notes = COALESCE($3, notes), updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {LOAN_COLUMNS}"
        ))
        .bind(id)
        .bind(return_date)
        .bind(notes)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::LoanNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_unique_index_means_already_loaned() {
        assert!(matches!(
            loan_constraint_error("loans_one_active_per_item"),
            Some(AppError::ItemAlreadyLoaned)
        ));
        assert!(matches!(
            loan_constraint_error("loans_return_after_loan_check"),
            Some(AppError::InvalidInput(_))
        ));
    }
}
