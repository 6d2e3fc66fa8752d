// src/models/campus.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---
// Campus (a unidade física)
// ---
// Raiz de todo o escopo: itens, categorias, setores e técnicos pertencem a um campus.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Campus {
    pub id: Uuid,
    #[schema(example = "Liberdade")]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CampusPayload {
    #[validate(length(min = 1, max = 120, message = "O nome do campus é obrigatório."))]
    #[schema(example = "Liberdade")]
    pub name: String,
}
