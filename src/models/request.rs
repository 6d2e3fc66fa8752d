// src/models/request.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "request_status")]
pub enum RequestStatus {
    #[sqlx(rename = "aberto")]
    #[serde(rename = "aberto")]
    Aberto,
    #[sqlx(rename = "em-andamento")]
    #[serde(rename = "em-andamento")]
    EmAndamento,
    #[sqlx(rename = "concluido")]
    #[serde(rename = "concluido")]
    Concluido,
    #[sqlx(rename = "cancelado")]
    #[serde(rename = "cancelado")]
    Cancelado,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Aberto => "aberto",
            RequestStatus::EmAndamento => "em-andamento",
            RequestStatus::Concluido => "concluido",
            RequestStatus::Cancelado => "cancelado",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Concluido | RequestStatus::Cancelado)
    }

    /// aberto -> qualquer; em-andamento -> aberto/concluido/cancelado;
    /// concluido e cancelado são finais.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        if self == next {
            return true;
        }
        !self.is_terminal()
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Chamado de suporte aberto por um solicitante (não precisa de login).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupportRequest {
    pub id: Uuid,
    pub requester_email: String,
    pub requester_name: Option<String>,
    pub campus_id: Uuid,
    pub sector_id: Option<Uuid>,
    pub room: Option<String>,
    pub details: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub requester_email: String,
    pub requester_name: Option<String>,
    pub campus_id: Uuid,
    pub sector_id: Option<Uuid>,
    pub room: Option<String>,
    #[validate(length(min = 1, max = 4000, message = "Descreva o problema."))]
    pub details: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRequestStatusPayload {
    pub status: RequestStatus,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RequestQuery {
    pub status: Option<RequestStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hyphenated_status_round_trips_through_json() {
        let s: RequestStatus = serde_json::from_str("\"em-andamento\"").unwrap();
        assert_eq!(s, RequestStatus::EmAndamento);
        assert_eq!(s.to_string(), "em-andamento");
    }

    #[test]
    fn terminal_statuses_are_final() {
        use RequestStatus::*;
        assert!(Aberto.can_transition_to(Concluido));
        assert!(Aberto.can_transition_to(EmAndamento));
        assert!(EmAndamento.can_transition_to(Aberto));
        assert!(EmAndamento.can_transition_to(Cancelado));
        assert!(!Concluido.can_transition_to(Aberto));
        assert!(!Cancelado.can_transition_to(EmAndamento));
        assert!(Concluido.can_transition_to(Concluido));
    }
}
