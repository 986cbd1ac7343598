// src/models/weather.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Resultado do enriquecimento de clima. Sempre embutido como dado na
// resposta do contato; nenhuma variante vira falha da requisição.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum WeatherInfo {
    Reading(WeatherReading),
    Failure(WeatherFailure),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReading {
    pub temperature: f64,
    pub condition_code: String,
    pub condition_text: String,
    pub day_period: String,
    pub city_label: String,
    // Gerada a partir de (temperature, condition_text)
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherFailure {
    pub error: WeatherErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeatherErrorKind {
    WeatherApiError,
    CityNotFound,
    WeatherServiceUnavailable,
}

impl WeatherInfo {
    pub fn failure(error: WeatherErrorKind, message: impl Into<String>) -> Self {
        WeatherInfo::Failure(WeatherFailure {
            error,
            message: message.into(),
        })
    }
}
