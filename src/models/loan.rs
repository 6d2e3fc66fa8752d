// src/models/loan.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "loan_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Loaned,
    Returned,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: Uuid,
    pub item_id: Uuid,
    pub campus_id: Uuid,
    pub borrower_name: String,
    pub borrower_email: Option<String>,
    pub borrower_phone: Option<String>,
    pub loan_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    pub status: LoanStatus,
    pub loaner_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Loan {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == LoanStatus::Loaned && self.expected_return_date < today
    }
}

/// Empréstimo como exposto pela API, com o atraso já calculado.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanView {
    #[serde(flatten)]
    pub loan: Loan,
    pub overdue: bool,
}

impl LoanView {
    pub fn new(loan: Loan, today: NaiveDate) -> Self {
        let overdue = loan.is_overdue(today);
        Self { loan, overdue }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoanPayload {
    pub item_id: Uuid,

    #[validate(length(min = 1, message = "O nome de quem pegou emprestado é obrigatório."))]
    pub borrower_name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub borrower_email: Option<String>,

    pub borrower_phone: Option<String>,

    /// Padrão: hoje.
    pub loan_date: Option<NaiveDate>,

    pub expected_return_date: NaiveDate,

    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnLoanPayload {
    /// Padrão: hoje.
    pub return_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LoanQuery {
    pub status: Option<LoanStatus>,
    /// Somente empréstimos em atraso.
    #[serde(default)]
    pub overdue: bool,
    pub item_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan(status: LoanStatus, expected: NaiveDate) -> Loan {
        Loan {
            id: Uuid::nil(),
            item_id: Uuid::nil(),
            campus_id: Uuid::nil(),
            borrower_name: "Maria".into(),
            borrower_email: None,
            borrower_phone: None,
            loan_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            expected_return_date: expected,
            actual_return_date: None,
            status,
            loaner_id: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn overdue_only_while_loaned_and_past_due() {
        let due = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let day_after = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();

        assert!(!loan(LoanStatus::Loaned, due).is_overdue(due));
        assert!(loan(LoanStatus::Loaned, due).is_overdue(day_after));
        assert!(!loan(LoanStatus::Returned, due).is_overdue(day_after));
    }

    #[test]
    fn view_flattens_loan_fields() {
        let due = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let view = LoanView::new(loan(LoanStatus::Loaned, due), due);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["borrowerName"], "Maria");
        assert_eq!(json["status"], "loaned");
        assert_eq!(json["overdue"], false);
    }
}
