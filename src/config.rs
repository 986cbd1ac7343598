// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::ContactRepository,
    services::{ContactService, WeatherClient, WeatherProvider},
};

const DEFAULT_WEATHER_URL: &str = "https://api.hgbrasil.com/weather";

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub contact_service: ContactService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let weather_url =
            env::var("HG_WEATHER_URL").unwrap_or_else(|_| DEFAULT_WEATHER_URL.to_string());
        // Sem chave a HG Brasil ainda responde, com limites menores
        let weather_key = env::var("HG_WEATHER_KEY").ok();

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let weather = Arc::new(WeatherClient::new(weather_url, weather_key)?);

        Ok(Self::with_pool(db_pool, weather))
    }

    /// Monta o gráfico de dependências a partir de uma pool já criada.
    /// Os testes injetam aqui um provedor de clima dublê.
    pub fn with_pool(db_pool: PgPool, weather: Arc<dyn WeatherProvider>) -> Self {
        let contact_repo = ContactRepository::new(db_pool.clone());
        let contact_service = ContactService::new(contact_repo, weather);

        Self {
            db_pool,
            contact_service,
        }
    }
}
