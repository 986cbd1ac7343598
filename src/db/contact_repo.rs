// src/db/contact_repo.rs

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::contact::{Contact, ContactWithPhones, NewContact, Phone, UpdateContactFields},
};

/// Colunas dos SELECTs/RETURNINGs de contatos.
const CONTACT_COLUMNS: &str = "\
    id, name, email, zip_code, street, number, \
    neighborhood, city, state, complement, ativo, \
    created_at, updated_at";

const PHONE_COLUMNS: &str = "id, number, contact_id";

#[derive(Clone)]
pub struct ContactRepository {
    pool: PgPool,
}

impl ContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CRIAÇÃO (contato + telefones em uma única transação)
    // =========================================================================

    /// Insere o contato e todos os telefones iniciais de forma atômica:
    /// ou tudo fica visível, ou nada (falha em telefone desfaz o contato).
    pub async fn create(
        &self,
        data: &NewContact,
        phone_numbers: &[String],
    ) -> Result<ContactWithPhones, AppError> {
        let mut tx = self.pool.begin().await?;

        let insert_sql = format!(
            "INSERT INTO contacts \
                (name, email, zip_code, street, number, neighborhood, city, state, complement) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {CONTACT_COLUMNS}"
        );

        let contact = sqlx::query_as::<_, Contact>(&insert_sql)
            .bind(&data.name)
            .bind(&data.email)
            .bind(&data.zip_code)
            .bind(&data.street)
            .bind(&data.number)
            .bind(&data.neighborhood)
            .bind(&data.city)
            .bind(&data.state)
            .bind(&data.complement)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_unique_email)?;

        let mut phones = Vec::with_capacity(phone_numbers.len());
        for number in phone_numbers {
            let phone = sqlx::query_as::<_, Phone>(&format!(
                "INSERT INTO phones (number, contact_id) VALUES ($1, $2) \
                 RETURNING {PHONE_COLUMNS}"
            ))
            .bind(number)
            .bind(contact.id)
            .fetch_one(&mut *tx)
            .await?;
            phones.push(phone);
        }

        tx.commit().await?;

        Ok(ContactWithPhones { contact, phones })
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    /// Busca por id SEM filtrar por `ativo` — a política de esconder
    /// contatos desativados é do serviço, não do repositório.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ContactWithPhones>, AppError> {
        let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts c WHERE c.id = $1");

        let Some(contact) = sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let phones = sqlx::query_as::<_, Phone>(&format!(
            "SELECT {PHONE_COLUMNS} FROM phones WHERE contact_id = $1 ORDER BY created_at ASC"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(ContactWithPhones { contact, phones }))
    }

    pub async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        // Match exato, independente de `ativo`
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM contacts WHERE email = $1)",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    // =========================================================================
    //  LISTAGEM COM BUSCA + PAGINAÇÃO
    // =========================================================================

    /// Lista contatos com filtro opcional de busca livre e de `ativo`.
    /// Retorna a página pedida e o total do conjunto filtrado (pré-paginação).
    pub async fn list(
        &self,
        search: Option<&str>,
        ativo: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ContactWithPhones>, i64), AppError> {
        let term = search.map(|s| format!("%{s}%"));
        let (where_clause, next_idx) = build_list_filter(term.is_some(), ativo.is_some());

        // Total ANTES do LIMIT/OFFSET, com o mesmo WHERE
        let count_sql = format!("SELECT COUNT(*) FROM contacts c {where_clause}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(t) = &term {
            count_query = count_query.bind(t);
        }
        if let Some(flag) = ativo {
            count_query = count_query.bind(flag);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        // Ordenação estável por criação (ordem de inserção)
        let page_sql = format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts c {where_clause} \
             ORDER BY c.created_at ASC \
             LIMIT ${next_idx} OFFSET ${offset_idx}",
            offset_idx = next_idx + 1,
        );
        let mut page_query = sqlx::query_as::<_, Contact>(&page_sql);
        if let Some(t) = &term {
            page_query = page_query.bind(t);
        }
        if let Some(flag) = ativo {
            page_query = page_query.bind(flag);
        }
        let contacts = page_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let items = self.attach_phones(contacts).await?;

        Ok((items, total))
    }

    /// Anexa os telefones de uma página de contatos em uma única query.
    async fn attach_phones(
        &self,
        contacts: Vec<Contact>,
    ) -> Result<Vec<ContactWithPhones>, AppError> {
        if contacts.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = contacts.iter().map(|c| c.id).collect();
        let phones = sqlx::query_as::<_, Phone>(&format!(
            "SELECT {PHONE_COLUMNS} FROM phones \
             WHERE contact_id = ANY($1) ORDER BY created_at ASC"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_contact: HashMap<Uuid, Vec<Phone>> = HashMap::new();
        for phone in phones {
            by_contact.entry(phone.contact_id).or_default().push(phone);
        }

        Ok(contacts
            .into_iter()
            .map(|contact| {
                let phones = by_contact.remove(&contact.id).unwrap_or_default();
                ContactWithPhones { contact, phones }
            })
            .collect())
    }

    // =========================================================================
    //  ATUALIZAÇÃO
    // =========================================================================

    /// Atualização parcial: só os campos presentes entram no SET, e
    /// `updated_at` é sempre renovado. Telefones são aplicados depois do
    /// UPDATE (sem transação — comportamento observável do contrato).
    /// Retorna `false` quando nenhum contato casa com o id.
    pub async fn update(
        &self,
        id: Uuid,
        fields: &UpdateContactFields,
        add_phone_numbers: &[String],
        delete_phone_ids: &[Uuid],
    ) -> Result<bool, AppError> {
        let mut sets: Vec<String> = Vec::new();
        let mut bind_idx = 1u32;

        // A ordem aqui precisa casar com a ordem dos .bind() abaixo
        for (column, present) in [
            ("name", fields.name.is_some()),
            ("email", fields.email.is_some()),
            ("zip_code", fields.zip_code.is_some()),
            ("street", fields.street.is_some()),
            ("number", fields.number.is_some()),
            ("neighborhood", fields.neighborhood.is_some()),
            ("city", fields.city.is_some()),
            ("state", fields.state.is_some()),
            ("complement", fields.complement.is_some()),
        ] {
            if present {
                sets.push(format!("{column} = ${bind_idx}"));
                bind_idx += 1;
            }
        }
        sets.push("updated_at = NOW()".to_string());

        let sql = format!(
            "UPDATE contacts SET {} WHERE id = ${bind_idx}",
            sets.join(", "),
        );

        let mut query = sqlx::query(&sql);
        for value in [
            &fields.name,
            &fields.email,
            &fields.zip_code,
            &fields.street,
            &fields.number,
            &fields.neighborhood,
            &fields.city,
            &fields.state,
            &fields.complement,
        ]
        .into_iter()
        .flatten()
        {
            query = query.bind(value);
        }

        let result = query
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_unique_email)?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        for number in add_phone_numbers {
            sqlx::query("INSERT INTO phones (number, contact_id) VALUES ($1, $2)")
                .bind(number)
                .bind(id)
                .execute(&self.pool)
                .await?;
        }

        if !delete_phone_ids.is_empty() {
            // O filtro por contact_id descarta em silêncio ids de telefones
            // que pertencem a OUTRO contato.
            sqlx::query("DELETE FROM phones WHERE id = ANY($1) AND contact_id = $2")
                .bind(delete_phone_ids)
                .bind(id)
                .execute(&self.pool)
                .await?;
        }

        Ok(true)
    }

    // =========================================================================
    //  SOFT DELETE
    // =========================================================================

    /// Marca o contato como inativo; a linha e os telefones permanecem.
    pub async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE contacts SET ativo = FALSE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Traduz violação da unique constraint de e-mail para o erro de negócio.
fn map_unique_email(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::DuplicateEmail;
        }
    }
    e.into()
}

/// Monta o WHERE da listagem com placeholders numerados.
///
/// A busca livre é um OR sobre os campos textuais do contato (complement
/// NULL nunca casa) e sobre o número de qualquer telefone do contato.
/// O filtro de `ativo` é AND-ado quando presente. Devolve também o índice
/// do próximo placeholder (usado para LIMIT/OFFSET).
fn build_list_filter(has_search: bool, has_ativo: bool) -> (String, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;

    if has_search {
        conditions.push(format!(
            "(c.name ILIKE ${i} \
              OR c.email ILIKE ${i} \
              OR c.street ILIKE ${i} \
              OR c.neighborhood ILIKE ${i} \
              OR c.city ILIKE ${i} \
              OR c.state ILIKE ${i} \
              OR c.zip_code ILIKE ${i} \
              OR c.complement ILIKE ${i} \
              OR EXISTS (SELECT 1 FROM phones p \
                         WHERE p.contact_id = c.id AND p.number ILIKE ${i}))",
            i = bind_idx,
        ));
        bind_idx += 1;
    }

    if has_ativo {
        conditions.push(format!("c.ativo = ${bind_idx}"));
        bind_idx += 1;
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_idx)
}
