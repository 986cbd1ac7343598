use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use contatos_backend::build_app;
use contatos_backend::config::AppState;
use contatos_backend::models::weather::{WeatherInfo, WeatherReading};
use contatos_backend::services::weather_service::{WeatherProvider, SUGGESTION_OUTDOOR};

/// Dublê do provedor de clima: resposta fixa + contador de chamadas,
/// para verificar quando o serviço consulta (ou não) o clima.
pub struct FakeWeather {
    pub calls: AtomicUsize,
    pub info: WeatherInfo,
}

impl Default for FakeWeather {
    fn default() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            info: WeatherInfo::Reading(WeatherReading {
                temperature: 25.0,
                condition_code: "28".to_string(),
                condition_text: "Tempo limpo".to_string(),
                day_period: "dia".to_string(),
                city_label: "São Paulo, SP".to_string(),
                suggestion: SUGGESTION_OUTDOOR.to_string(),
            }),
        }
    }
}

impl FakeWeather {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherProvider for FakeWeather {
    async fn forecast_for_city(&self, _city: &str) -> WeatherInfo {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.info.clone()
    }
}

/// Monta a aplicação completa sobre a pool de teste, com o clima dublê.
pub fn build_test_app(pool: PgPool) -> (Router, Arc<FakeWeather>) {
    let weather = Arc::new(FakeWeather::default());
    let state = AppState::with_pool(pool, weather.clone());
    (build_app(state), weather)
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send_json(app, "POST", uri, body).await
}

pub async fn put_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send_json(app, "PUT", uri, body).await
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Payload mínimo válido de criação, com e-mail e cidade parametrizáveis.
pub fn contact_payload(name: &str, email: &str, city: &str, phones: Vec<&str>) -> Value {
    serde_json::json!({
        "name": name,
        "email": email,
        "zipCode": "01310-100",
        "street": "Avenida Paulista",
        "number": "1000",
        "neighborhood": "Bela Vista",
        "city": city,
        "state": "SP",
        "phones": phones,
    })
}

/// Cria um contato via API e devolve o JSON da resposta 201.
pub async fn create_contact(app: &Router, payload: Value) -> Value {
    let response = post_json(app, "/api/contatos", payload).await;
    assert_eq!(
        response.status(),
        axum::http::StatusCode::CREATED,
        "criação de contato de teste falhou"
    );
    body_json(response).await
}
