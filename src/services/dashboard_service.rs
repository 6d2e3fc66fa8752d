// src/services/dashboard_service.rs

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    middleware::campus::CampusScope,
    models::{
        dashboard::{DashboardSummary, StatusCount},
        inventory::ItemStatus,
    },
    services::loan_service::today,
};

/// (ativos, descartados) a partir da contagem por status.
pub(crate) fn split_totals(by_status: &[StatusCount]) -> (i64, i64) {
    by_status.iter().fold((0, 0), |(active, disposed), row| {
        if row.status == ItemStatus::Descarte {
            (active, disposed + row.count)
        } else {
            (active + row.count, disposed)
        }
    })
}

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    pub async fn get_summary(&self, scope: CampusScope) -> Result<DashboardSummary, AppError> {
        let campus_id = scope.campus_id();

        let by_status = self.repo.status_counts(campus_id).await?;
        let (total_items, disposed_items) = split_totals(&by_status);
        let fixed_items = self.repo.fixed_items(campus_id).await?;
        let (active_loans, overdue_loans) = self.repo.loan_counts(campus_id, today()).await?;
        let open_requests = self.repo.open_requests(campus_id).await?;

        Ok(DashboardSummary {
            total_items,
            disposed_items,
            fixed_items,
            by_status,
            active_loans,
            overdue_loans,
            open_requests,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposed_items_are_not_part_of_the_total() {
        let rows = vec![
            StatusCount { status: ItemStatus::Funcionando, count: 10 },
            StatusCount { status: ItemStatus::Emprestado, count: 2 },
            StatusCount { status: ItemStatus::Descarte, count: 3 },
        ];
        assert_eq!(split_totals(&rows), (12, 3));
        assert_eq!(split_totals(&[]), (0, 0));
    }
}
