// src/models/contact.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::weather::WeatherInfo;

// --- CONTATO ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,

    pub name: String,
    // Único no banco, em qualquer estado (ativo ou não)
    pub email: String,

    // Endereço postal
    pub zip_code: String,
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub complement: Option<String>,

    // Soft delete: false = desativado. A API nunca remove a linha.
    pub ativo: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Phone {
    pub id: Uuid,
    pub number: String,
    pub contact_id: Uuid,
}

/// Contato com a lista de telefones anexada (shape padrão das respostas).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactWithPhones {
    #[serde(flatten)]
    pub contact: Contact,
    pub phones: Vec<Phone>,
}

/// Resposta do GET por id: contato + enriquecimento de clima.
/// Uma falha no clima vira dado (`WeatherInfo::Failure`), nunca erro HTTP.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetail {
    #[serde(flatten)]
    pub contact: Contact,
    pub phones: Vec<Phone>,
    pub weather: WeatherInfo,
}

// --- ENTRADAS DO REPOSITÓRIO ---

/// Campos de inserção (id e timestamps ficam por conta do banco).
#[derive(Debug, Clone)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub zip_code: String,
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub complement: Option<String>,
}

/// Atualização parcial: só os campos presentes são tocados.
#[derive(Debug, Clone, Default)]
pub struct UpdateContactFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub zip_code: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub complement: Option<String>,
}

// --- PAGINAÇÃO ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PaginationMeta {
    /// `total` é o conjunto filtrado ANTES da paginação.
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };
        Self {
            total,
            page,
            limit,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactListResponse {
    pub data: Vec<ContactWithPhones>,
    pub meta: PaginationMeta,
}
