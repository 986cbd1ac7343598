// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Contatos ---
        handlers::contacts::create_contact,
        handlers::contacts::list_contacts,
        handlers::contacts::get_contact,
        handlers::contacts::update_contact,
        handlers::contacts::delete_contact,
    ),
    components(
        schemas(
            handlers::contacts::CreateContactPayload,
            handlers::contacts::UpdateContactPayload,
            models::contact::Contact,
            models::contact::Phone,
            models::contact::ContactWithPhones,
            models::contact::ContactDetail,
            models::contact::ContactListResponse,
            models::contact::PaginationMeta,
            models::weather::WeatherInfo,
            models::weather::WeatherReading,
            models::weather::WeatherFailure,
            models::weather::WeatherErrorKind,
        )
    ),
    tags(
        (name = "Contatos", description = "CRUD de contatos com busca, paginação e clima")
    )
)]
pub struct ApiDoc;
