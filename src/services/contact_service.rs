// src/services/contact_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ContactRepository,
    models::contact::{
        ContactDetail, ContactListResponse, ContactWithPhones, NewContact, PaginationMeta,
        UpdateContactFields,
    },
    services::weather_service::WeatherProvider,
};

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// Parâmetros crus de listagem, como chegam da query string.
#[derive(Debug, Clone, Default)]
pub struct ListContactsParams {
    pub search: Option<String>,
    pub ativo: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Clone)]
pub struct ContactService {
    repo: ContactRepository,
    weather: Arc<dyn WeatherProvider>,
}

impl ContactService {
    pub fn new(repo: ContactRepository, weather: Arc<dyn WeatherProvider>) -> Self {
        Self { repo, weather }
    }

    // =========================================================================
    //  CRIAÇÃO
    // =========================================================================

    /// A unicidade de e-mail é garantida pela constraint do banco; o
    /// repositório já traduz a violação para `DuplicateEmail`.
    pub async fn create(
        &self,
        data: NewContact,
        phone_numbers: Vec<String>,
    ) -> Result<ContactWithPhones, AppError> {
        self.repo.create(&data, &phone_numbers).await
    }

    // =========================================================================
    //  LISTAGEM
    // =========================================================================

    pub async fn list(&self, params: ListContactsParams) -> Result<ContactListResponse, AppError> {
        let (page, limit) = normalize_pagination(params.page, params.limit);
        let offset = (page - 1) * limit;

        // Sem filtro explícito, a listagem mostra só os ativos
        let ativo = Some(params.ativo.unwrap_or(true));
        let search = params.search.as_deref().filter(|s| !s.trim().is_empty());

        let (data, total) = self.repo.list(search, ativo, limit, offset).await?;

        Ok(ContactListResponse {
            data,
            meta: PaginationMeta::new(total, page, limit),
        })
    }

    // =========================================================================
    //  BUSCA POR ID + ENRIQUECIMENTO DE CLIMA
    // =========================================================================

    /// Contato inexistente e contato desativado são indistinguíveis aqui:
    /// ambos respondem `ContactNotFound`, e o provedor de clima nem é
    /// consultado no segundo caso.
    pub async fn get_with_weather(&self, id: Uuid) -> Result<ContactDetail, AppError> {
        let found = self
            .repo
            .find_by_id(id)
            .await?
            .filter(|c| c.contact.ativo)
            .ok_or(AppError::ContactNotFound)?;

        // Melhor esforço: qualquer falha aqui vira dado na resposta
        let weather = self.weather.forecast_for_city(&found.contact.city).await;

        Ok(ContactDetail {
            contact: found.contact,
            phones: found.phones,
            weather,
        })
    }

    // =========================================================================
    //  ATUALIZAÇÃO PARCIAL
    // =========================================================================

    /// Exige existência, mas NÃO exige `ativo` — atualizar um contato
    /// desativado é permitido (comportamento herdado do contrato).
    pub async fn update(
        &self,
        id: Uuid,
        fields: UpdateContactFields,
        add_phone_numbers: Vec<String>,
        delete_phone_ids: Vec<Uuid>,
    ) -> Result<ContactWithPhones, AppError> {
        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::ContactNotFound)?;

        // Se o e-mail está mudando, verifica unicidade ANTES de escrever
        if let Some(new_email) = &fields.email {
            if new_email != &current.contact.email && self.repo.exists_by_email(new_email).await? {
                return Err(AppError::DuplicateEmail);
            }
        }

        let updated = self
            .repo
            .update(id, &fields, &add_phone_numbers, &delete_phone_ids)
            .await?;
        if !updated {
            // A linha sumiu entre a checagem e o UPDATE
            return Err(AppError::ContactNotFound);
        }

        self.repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::ContactNotFound)
    }

    // =========================================================================
    //  SOFT DELETE
    // =========================================================================

    /// A segunda chamada para o mesmo id responde `ContactAlreadyInactive`
    /// em vez de sucesso silencioso — a idempotência é observável.
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), AppError> {
        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::ContactNotFound)?;

        if !current.contact.ativo {
            return Err(AppError::ContactAlreadyInactive);
        }

        let deactivated = self.repo.soft_delete(id).await?;
        if !deactivated {
            return Err(AppError::ContactNotFound);
        }

        Ok(())
    }
}

/// Normaliza página e limite: página mínima 1, limite padrão 10, teto 100.
fn normalize_pagination(page: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(DEFAULT_PAGE).max(1);
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    (page, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginacao_usa_padroes_quando_ausente() {
        assert_eq!(normalize_pagination(None, None), (1, 10));
    }

    #[test]
    fn limite_acima_do_teto_e_capado_em_cem() {
        assert_eq!(normalize_pagination(Some(2), Some(150)), (2, 100));
    }

    #[test]
    fn valores_invalidos_sao_corrigidos() {
        assert_eq!(normalize_pagination(Some(0), Some(0)), (1, 1));
        assert_eq!(normalize_pagination(Some(-3), Some(-10)), (1, 1));
    }
}
