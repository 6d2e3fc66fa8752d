// src/services/request_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageQuery},
    },
    db::RequestRepository,
    middleware::campus::CampusScope,
    models::request::{CreateRequestPayload, RequestQuery, RequestStatus, SupportRequest},
};

pub(crate) fn check_transition(from: RequestStatus, to: RequestStatus) -> Result<(), AppError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(AppError::InvalidRequestTransition { from, to })
    }
}

#[derive(Clone)]
pub struct RequestService {
    repo: RequestRepository,
    pool: PgPool,
}

impl RequestService {
    pub fn new(repo: RequestRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    /// Aberto ao público: campus e setor são validados pelas chaves do banco.
    pub async fn create_request(&self, payload: &CreateRequestPayload) -> Result<SupportRequest, AppError> {
        let request = self.repo.create(payload).await?;
        tracing::info!(request = %request.id, campus = %request.campus_id, "chamado aberto");
        Ok(request)
    }

    pub async fn list_requests(
        &self,
        scope: CampusScope,
        query: &RequestQuery,
    ) -> Result<Page<SupportRequest>, AppError> {
        let (page, per_page, offset) =
            PageQuery { page: query.page, per_page: query.per_page }.normalize();
        let (requests, total) = self
            .repo
            .list(scope.campus_id(), query.status, per_page, offset)
            .await?;
        Ok(Page::new(requests, total, page, per_page))
    }

    pub async fn get_request(&self, scope: CampusScope, id: Uuid) -> Result<SupportRequest, AppError> {
        self.repo.find(id, scope.campus_id()).await
    }

    pub async fn update_status(
        &self,
        scope: CampusScope,
        id: Uuid,
        status: RequestStatus,
    ) -> Result<SupportRequest, AppError> {
        // A linha fica travada entre a checagem e a escrita
        let mut tx = self.pool.begin().await?;
        let current = self.repo.find_for_update(&mut *tx, id, scope.campus_id()).await?;
        check_transition(current.status, status)?;

        if current.status == status {
            return Ok(current);
        }
        let updated = self.repo.update_status(&mut *tx, id, status).await?;
        tx.commit().await?;

        tracing::info!(request = %id, from = ?current.status, to = ?status, "status do chamado alterado");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_requests_cannot_reopen() {
        assert!(check_transition(RequestStatus::Aberto, RequestStatus::EmAndamento).is_ok());
        assert!(matches!(
            check_transition(RequestStatus::Concluido, RequestStatus::Aberto),
            Err(AppError::InvalidRequestTransition { .. })
        ));
    }

    #[test]
    fn terminal_states_stay_closed() {
        use RequestStatus::*;
        for terminal in [Concluido, Cancelado] {
            for target in [Aberto, EmAndamento] {
                assert!(check_transition(terminal, target).is_err());
            }
            assert!(check_transition(terminal, terminal).is_ok());
        }
        assert!(check_transition(EmAndamento, Concluido).is_ok());
        assert!(check_transition(EmAndamento, Aberto).is_ok());
    }
}
