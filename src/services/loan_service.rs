// src/services/loan_service.rs

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, text::non_empty},
    db::{loan_repo::NewLoan, AuditRepository, InventoryRepository, LoanRepository},
    middleware::campus::CampusScope,
    models::{
        audit::AuditAction,
        auth::User,
        inventory::ItemStatus,
        loan::{CreateLoanPayload, LoanQuery, LoanStatus, LoanView, ReturnLoanPayload},
    },
    services::{audit_service::item_entry, inventory_service::restore_target},
};

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Item só pode sair emprestado se estiver ativo e livre.
pub(crate) fn check_loanable(status: ItemStatus) -> Result<(), AppError> {
    match status {
        ItemStatus::Descarte => Err(AppError::ItemDisposed),
        ItemStatus::Emprestado => Err(AppError::ItemAlreadyLoaned),
        _ => Ok(()),
    }
}

pub(crate) fn check_dates(start: NaiveDate, end: NaiveDate, message: &str) -> Result<(), AppError> {
    if end < start {
        return Err(AppError::InvalidInput(message.to_string()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct LoanService {
    repo: LoanRepository,
    inventory_repo: InventoryRepository,
    audit_repo: AuditRepository,
    pool: PgPool,
}

impl LoanService {
    pub fn new(
        repo: LoanRepository,
        inventory_repo: InventoryRepository,
        audit_repo: AuditRepository,
        pool: PgPool,
    ) -> Self {
        Self { repo, inventory_repo, audit_repo, pool }
    }

    pub async fn list_loans(&self, scope: CampusScope, query: &LoanQuery) -> Result<Vec<LoanView>, AppError> {
        let today = today();
        let loans = self.repo.list(scope.campus_id(), query, today).await?;
        Ok(loans.into_iter().map(|loan| LoanView::new(loan, today)).collect())
    }

    pub async fn get_loan(&self, scope: CampusScope, id: Uuid) -> Result<LoanView, AppError> {
        let loan = self
            .repo
            .find(&self.pool, id, scope.campus_id())
            .await?
            .ok_or(AppError::LoanNotFound)?;
        Ok(LoanView::new(loan, today()))
    }

    pub async fn create_loan(
        &self,
        actor: &User,
        scope: CampusScope,
        payload: CreateLoanPayload,
    ) -> Result<LoanView, AppError> {
        let loan_date = payload.loan_date.unwrap_or_else(today);
        check_dates(
            loan_date,
            payload.expected_return_date,
            "A data prevista de devolução deve ser igual ou posterior à data do empréstimo.",
        )?;

        let mut tx = self.pool.begin().await?;

        // Trava o item: dois empréstimos simultâneos do mesmo item não passam daqui
        let item = self
            .inventory_repo
            .find_item_for_update(&mut *tx, payload.item_id, scope.campus_id())
            .await?
            .ok_or(AppError::ItemNotFound)?;
        check_loanable(item.status)?;

        let borrower_name = payload.borrower_name.trim().to_string();
        let borrower_email = non_empty(payload.borrower_email);
        let borrower_phone = non_empty(payload.borrower_phone);
        let notes = non_empty(payload.notes);

        let loan = self
            .repo
            .create(
                &mut *tx,
                &NewLoan {
                    item_id: item.id,
                    campus_id: item.campus_id,
                    borrower_name: &borrower_name,
                    borrower_email: borrower_email.as_deref(),
                    borrower_phone: borrower_phone.as_deref(),
                    loan_date,
                    expected_return_date: payload.expected_return_date,
                    loaner_id: Some(actor.id),
                    notes: notes.as_deref(),
                },
            )
            .await?;

        self.inventory_repo
            .set_status(&mut *tx, item.id, ItemStatus::Emprestado, Some(item.status))
            .await?;

        self.audit_repo
            .append(
                &mut *tx,
                &item_entry(
                    AuditAction::Loan,
                    actor,
                    &item,
                    Some(format!(
                        "emprestado para {} até {}",
                        loan.borrower_name,
                        loan.expected_return_date.format("%d/%m/%Y")
                    )),
                )?,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(loan = %loan.id, item = %item.id, borrower = %loan.borrower_name, "empréstimo registrado");
        Ok(LoanView::new(loan, today()))
    }

    pub async fn return_loan(
        &self,
        actor: &User,
        scope: CampusScope,
        id: Uuid,
        payload: ReturnLoanPayload,
    ) -> Result<LoanView, AppError> {
        let mut tx = self.pool.begin().await?;

        let loan = self
            .repo
            .find_for_update(&mut *tx, id, scope.campus_id())
            .await?
            .ok_or(AppError::LoanNotFound)?;

        if loan.status == LoanStatus::Returned {
            return Err(AppError::LoanAlreadyReturned);
        }

        let return_date = payload.return_date.unwrap_or_else(today);
        check_dates(
            loan.loan_date,
            return_date,
            "A data de devolução não pode ser anterior à data do empréstimo.",
        )?;

        let notes = non_empty(payload.notes);
        let loan = self
            .repo
            .mark_returned(&mut *tx, id, return_date, notes.as_deref())
            .await?;

        let item = self
            .inventory_repo
            .find_item_for_update(&mut *tx, loan.item_id, None)
            .await?
            .ok_or(AppError::ItemNotFound)?;

        // O item volta ao status de antes do empréstimo
        if item.status == ItemStatus::Emprestado {
            self.inventory_repo
                .set_status(&mut *tx, item.id, restore_target(item.previous_status), None)
                .await?;
        }

        self.audit_repo
            .append(
                &mut *tx,
                &item_entry(
                    AuditAction::Return,
                    actor,
                    &item,
                    Some(format!("devolvido por {} em {}", loan.borrower_name, return_date.format("%d/%m/%Y"))),
                )?,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(loan = %loan.id, item = %item.id, "devolução registrada");
        Ok(LoanView::new(loan, today()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_free_active_items_can_be_loaned() {
        assert!(check_loanable(ItemStatus::Funcionando).is_ok());
        assert!(check_loanable(ItemStatus::Backup).is_ok());
        assert!(matches!(check_loanable(ItemStatus::Emprestado), Err(AppError::ItemAlreadyLoaned)));
        assert!(matches!(check_loanable(ItemStatus::Descarte), Err(AppError::ItemDisposed)));
    }

    #[test]
    fn return_date_cannot_precede_loan_date() {
        let d1 = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        let d0 = NaiveDate::from_ymd_opt(2025, 5, 9).unwrap();
        assert!(check_dates(d1, d1, "x").is_ok());
        assert!(matches!(check_dates(d1, d0, "x"), Err(AppError::InvalidInput(_))));
    }
}
