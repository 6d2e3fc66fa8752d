use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::{inventory::ItemStatus, request::RequestStatus};

// Tipo de erro único da aplicação. Cada variante tem um status HTTP e um
// código estável que o frontend usa (ex.: ITEM_NOT_FOUND para limpar o cache).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("{0}")]
    Forbidden(String),

    #[error("O campus selecionado não corresponde ao campus do técnico")]
    CampusMismatch,

    // --- Não encontrados ---
    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Campus não encontrado")]
    CampusNotFound,

    #[error("Categoria não encontrada neste campus")]
    CategoryNotFound,

    #[error("Setor não encontrado neste campus")]
    SectorNotFound,

    #[error("Item não encontrado")]
    ItemNotFound,

    #[error("Empréstimo não encontrado")]
    LoanNotFound,

    #[error("Chamado não encontrado")]
    RequestNotFound,

    // --- Unicidade ---
    #[error("Já existe um campus com o nome '{0}'")]
    CampusNameAlreadyExists(String),

    #[error("O nome '{0}' é reservado")]
    CampusNameReserved(String),

    #[error("Já existe uma categoria '{0}' neste campus")]
    CategoryNameAlreadyExists(String),

    #[error("Já existe um setor '{0}' neste campus")]
    SectorNameAlreadyExists(String),

    #[error("O usuário '{0}' já existe")]
    UsernameAlreadyExists(String),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    // --- Regras de negócio ---
    #[error("O campus possui itens de inventário e não pode ser excluído")]
    CampusHasItems,

    #[error("O campus possui usuários vinculados e não pode ser excluído")]
    CampusHasUsers,

    #[error("{0} ainda está em uso por itens do inventário")]
    ResourceInUse(String),

    #[error("O item não está descartado")]
    ItemNotDisposed,

    #[error("O item está descartado")]
    ItemDisposed,

    #[error("O item já está emprestado")]
    ItemAlreadyLoaned,

    #[error("O item está emprestado; registre a devolução primeiro")]
    ItemOnLoan,

    #[error("O empréstimo já foi devolvido")]
    LoanAlreadyReturned,

    #[error("O item possui histórico de empréstimos e não pode ser excluído; use o descarte")]
    ItemHasLoans,

    #[error("Transição de status inválida: {from} -> {to}")]
    InvalidItemStatus { from: ItemStatus, to: ItemStatus },

    #[error("Transição de status inválida: {from} -> {to}")]
    InvalidRequestTransition { from: RequestStatus, to: RequestStatus },

    // --- Infraestrutura ---
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) | AppError::CampusMismatch => StatusCode::FORBIDDEN,
            AppError::UserNotFound
            | AppError::CampusNotFound
            | AppError::CategoryNotFound
            | AppError::SectorNotFound
            | AppError::ItemNotFound
            | AppError::LoanNotFound
            | AppError::RequestNotFound => StatusCode::NOT_FOUND,
            AppError::CampusNameAlreadyExists(_)
            | AppError::CampusNameReserved(_)
            | AppError::CategoryNameAlreadyExists(_)
            | AppError::SectorNameAlreadyExists(_)
            | AppError::UsernameAlreadyExists(_)
            | AppError::UniqueConstraintViolation(_)
            | AppError::CampusHasItems
            | AppError::CampusHasUsers
            | AppError::ResourceInUse(_)
            | AppError::ItemNotDisposed
            | AppError::ItemDisposed
            | AppError::ItemAlreadyLoaned
            | AppError::ItemOnLoan
            | AppError::LoanAlreadyReturned
            | AppError::ItemHasLoans
            | AppError::InvalidItemStatus { .. }
            | AppError::InvalidRequestTransition { .. } => StatusCode::CONFLICT,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::CampusMismatch => "CAMPUS_MISMATCH",
            AppError::UserNotFound => "USER_NOT_FOUND",
            AppError::CampusNotFound => "CAMPUS_NOT_FOUND",
            AppError::CategoryNotFound => "CATEGORY_NOT_FOUND",
            AppError::SectorNotFound => "SECTOR_NOT_FOUND",
            AppError::ItemNotFound => "ITEM_NOT_FOUND",
            AppError::LoanNotFound => "LOAN_NOT_FOUND",
            AppError::RequestNotFound => "REQUEST_NOT_FOUND",
            AppError::CampusNameAlreadyExists(_) => "CAMPUS_NAME_EXISTS",
            AppError::CampusNameReserved(_) => "CAMPUS_NAME_RESERVED",
            AppError::CategoryNameAlreadyExists(_) => "CATEGORY_NAME_EXISTS",
            AppError::SectorNameAlreadyExists(_) => "SECTOR_NAME_EXISTS",
            AppError::UsernameAlreadyExists(_) => "USERNAME_EXISTS",
            AppError::UniqueConstraintViolation(_) => "UNIQUE_VIOLATION",
            AppError::CampusHasItems => "CAMPUS_HAS_ITEMS",
            AppError::CampusHasUsers => "CAMPUS_HAS_USERS",
            AppError::ResourceInUse(_) => "RESOURCE_IN_USE",
            AppError::ItemNotDisposed => "ITEM_NOT_DISPOSED",
            AppError::ItemDisposed => "ITEM_DISPOSED",
            AppError::ItemAlreadyLoaned => "ITEM_ALREADY_LOANED",
            AppError::ItemOnLoan => "ITEM_ON_LOAN",
            AppError::LoanAlreadyReturned => "LOAN_ALREADY_RETURNED",
            AppError::ItemHasLoans => "ITEM_HAS_LOANS",
            AppError::InvalidItemStatus { .. } => "INVALID_ITEM_STATUS",
            AppError::InvalidRequestTransition { .. } => "INVALID_STATUS_TRANSITION",
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        if let AppError::ValidationError(errors) = &self {
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                details.insert(field.to_string(), messages);
            }
            let body = Json(json!({
                "error": "Um ou mais campos são inválidos.",
                "code": code,
                "details": details,
            }));
            return (status, body).into_response();
        }

        // Erros internos: loga o detalhe e responde com mensagem genérica.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {}", self);
            "Ocorreu um erro inesperado.".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({ "error": message, "code": code }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn duplicate_sector_is_a_conflict_with_stable_code() {
        let (status, body) = body_json(AppError::SectorNameAlreadyExists("TI".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "SECTOR_NAME_EXISTS");
        assert_eq!(body["error"], "Já existe um setor 'TI' neste campus");
    }

    #[tokio::test]
    async fn missing_item_tells_client_to_purge() {
        let (status, body) = body_json(AppError::ItemNotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "ITEM_NOT_FOUND");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, body) =
            body_json(AppError::InternalServerError(anyhow::anyhow!("senha do banco: x"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Ocorreu um erro inesperado.");
        assert_eq!(body["code"], "INTERNAL_ERROR");
    }

    #[test]
    fn campus_rules_map_to_conflict() {
        assert_eq!(AppError::CampusHasItems.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::CampusMismatch.status_code(), StatusCode::FORBIDDEN);
    }
}
