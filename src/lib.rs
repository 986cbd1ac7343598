// src/lib.rs

use axum::{
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod models;
pub mod services;

use crate::config::AppState;

/// Monta o router completo da aplicação (também usado pelos testes de
/// integração, por isso vive na lib e não no main).
pub fn build_app(app_state: AppState) -> Router {
    let contatos_routes = Router::new()
        .route(
            "/",
            post(handlers::contacts::create_contact).get(handlers::contacts::list_contacts),
        )
        .route(
            "/{id}",
            get(handlers::contacts::get_contact)
                .put(handlers::contacts::update_contact)
                .delete(handlers::contacts::delete_contact),
        );

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/contatos", contatos_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state)
}
