// src/handlers/contacts.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    models::contact::{
        ContactDetail, ContactListResponse, ContactWithPhones, NewContact, UpdateContactFields,
    },
    services::contact_service::ListContactsParams,
};

// O formato do número fica livre; só exigimos um tamanho mínimo na borda.
fn validate_phone_numbers(numbers: &Vec<String>) -> Result<(), ValidationError> {
    for number in numbers {
        if number.trim().len() < 8 {
            let mut err = ValidationError::new("length");
            err.message = Some("Cada telefone deve ter no mínimo 8 caracteres.".into());
            return Err(err);
        }
    }
    Ok(())
}

// ---
// Payload: CreateContact
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Maria da Silva")]
    pub name: String,

    #[validate(email(message = "E-mail inválido."))]
    #[schema(example = "maria@exemplo.com")]
    pub email: String,

    #[validate(length(min = 1, message = "O CEP é obrigatório."))]
    pub zip_code: String,

    #[validate(length(min = 1, message = "A rua é obrigatória."))]
    pub street: String,

    #[validate(length(min = 1, message = "O número é obrigatório."))]
    pub number: String,

    #[validate(length(min = 1, message = "O bairro é obrigatório."))]
    pub neighborhood: String,

    #[validate(length(min = 1, message = "A cidade é obrigatória."))]
    #[schema(example = "São Paulo")]
    pub city: String,

    #[validate(length(min = 1, message = "O estado é obrigatório."))]
    #[schema(example = "SP")]
    pub state: String,

    pub complement: Option<String>,

    // Telefones iniciais, inseridos na mesma transação do contato
    #[validate(custom(function = "validate_phone_numbers"))]
    #[serde(default)]
    pub phones: Vec<String>,
}

// ---
// Payload: UpdateContact (tudo opcional; só o que vier é alterado)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactPayload {
    #[validate(length(min = 1, message = "O nome não pode ser vazio."))]
    pub name: Option<String>,

    #[validate(email(message = "E-mail inválido."))]
    pub email: Option<String>,

    pub zip_code: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub complement: Option<String>,

    // Telefones a adicionar
    #[validate(custom(function = "validate_phone_numbers"))]
    #[serde(default)]
    pub add_phone_numbers: Vec<String>,

    // Ids de telefones a remover. Ids de telefones de OUTRO contato
    // são ignorados em silêncio, não é erro.
    #[serde(default)]
    pub delete_phone_numbers: Vec<Uuid>,
}

impl UpdateContactPayload {
    fn into_parts(self) -> (UpdateContactFields, Vec<String>, Vec<Uuid>) {
        let fields = UpdateContactFields {
            name: self.name,
            email: self.email,
            zip_code: self.zip_code,
            street: self.street,
            number: self.number,
            neighborhood: self.neighborhood,
            city: self.city,
            state: self.state,
            complement: self.complement,
        };
        (fields, self.add_phone_numbers, self.delete_phone_numbers)
    }
}

// ---
// Query string da listagem
// ---
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListContactsQuery {
    /// Busca livre sobre nome, e-mail, endereço e números de telefone
    pub search: Option<String>,
    /// Quando ausente, lista apenas os ativos
    pub ativo: Option<bool>,
    /// Padrão: 1
    pub page: Option<i64>,
    /// Padrão: 10, máximo: 100
    pub limit: Option<i64>,
}

// POST /api/contatos
#[utoipa::path(
    post,
    path = "/api/contatos",
    tag = "Contatos",
    request_body = CreateContactPayload,
    responses(
        (status = 201, description = "Contato criado", body = ContactWithPhones),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail já cadastrado")
    )
)]
pub async fn create_contact(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateContactPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let data = NewContact {
        name: payload.name,
        email: payload.email,
        zip_code: payload.zip_code,
        street: payload.street,
        number: payload.number,
        neighborhood: payload.neighborhood,
        city: payload.city,
        state: payload.state,
        complement: payload.complement,
    };

    let contact = app_state
        .contact_service
        .create(data, payload.phones)
        .await?;

    Ok((StatusCode::CREATED, Json(contact)))
}

// GET /api/contatos
#[utoipa::path(
    get,
    path = "/api/contatos",
    tag = "Contatos",
    params(ListContactsQuery),
    responses(
        (status = 200, description = "Lista paginada de contatos", body = ContactListResponse)
    )
)]
pub async fn list_contacts(
    State(app_state): State<AppState>,
    Query(query): Query<ListContactsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let response = app_state
        .contact_service
        .list(ListContactsParams {
            search: query.search,
            ativo: query.ativo,
            page: query.page,
            limit: query.limit,
        })
        .await?;

    Ok(Json(response))
}

// GET /api/contatos/{id}
#[utoipa::path(
    get,
    path = "/api/contatos/{id}",
    tag = "Contatos",
    params(("id" = Uuid, Path, description = "ID do contato")),
    responses(
        (status = 200, description = "Contato com enriquecimento de clima", body = ContactDetail),
        (status = 404, description = "Contato inexistente ou desativado")
    )
)]
pub async fn get_contact(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state.contact_service.get_with_weather(id).await?;
    Ok(Json(detail))
}

// PUT /api/contatos/{id}
#[utoipa::path(
    put,
    path = "/api/contatos/{id}",
    tag = "Contatos",
    params(("id" = Uuid, Path, description = "ID do contato")),
    request_body = UpdateContactPayload,
    responses(
        (status = 200, description = "Contato atualizado", body = ContactWithPhones),
        (status = 404, description = "Contato não encontrado"),
        (status = 409, description = "E-mail já cadastrado")
    )
)]
pub async fn update_contact(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContactPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (fields, add_phone_numbers, delete_phone_ids) = payload.into_parts();

    let contact = app_state
        .contact_service
        .update(id, fields, add_phone_numbers, delete_phone_ids)
        .await?;

    Ok(Json(contact))
}

// DELETE /api/contatos/{id} (soft delete)
#[utoipa::path(
    delete,
    path = "/api/contatos/{id}",
    tag = "Contatos",
    params(("id" = Uuid, Path, description = "ID do contato")),
    responses(
        (status = 200, description = "Contato desativado"),
        (status = 404, description = "Contato não encontrado"),
        (status = 409, description = "Contato já estava inativo")
    )
)]
pub async fn delete_contact(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.contact_service.soft_delete(id).await?;

    Ok(Json(json!({ "mensagem": "Contato desativado com sucesso." })))
}
