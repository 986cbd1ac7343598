// src/services/weather_service.rs

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::weather::{WeatherErrorKind, WeatherInfo, WeatherReading};

// =============================================================================
//  SUGESTÃO DE ATIVIDADE (função pura, sem I/O)
// =============================================================================

pub const SUGGESTION_HOT_CHOCOLATE: &str =
    "Ofereça um chocolate quente ao seu contato";
pub const SUGGESTION_ICE_CREAM: &str = "Convide seu contato para tomar um sorvete";
pub const SUGGESTION_BEACH: &str = "Convide seu contato para ir à praia";
pub const SUGGESTION_MOVIE: &str = "Convide seu contato para ver um filme";
pub const SUGGESTION_OUTDOOR: &str =
    "Convide seu contato para fazer alguma atividade ao ar livre";

// Cobrem o vocabulário do provedor em inglês e português.
// "precipita" casa tanto "precipitation" quanto "precipitação".
const RAINY_KEYWORDS: &[&str] = &[
    "rain", "drizzle", "mist", "precipita", "chuva", "chuvisco", "garoa",
];
const SUNNY_KEYWORDS: &[&str] = &[
    "clear", "sun", "limpo", "sol", "ensolarado", "claro",
];

/// Deriva a sugestão social a partir de (temperatura, condição textual).
///
/// Frio domina tudo (<= 18, inclusive); calor começa em 30 (inclusive).
/// Condição não classificada cai no default de cada faixa.
pub fn suggest_activity(temperature: f64, condition: &str) -> String {
    let normalized = condition.to_lowercase();
    let rainy = RAINY_KEYWORDS.iter().any(|k| normalized.contains(k));
    let sunny = SUNNY_KEYWORDS.iter().any(|k| normalized.contains(k));

    let suggestion = if temperature <= 18.0 {
        SUGGESTION_HOT_CHOCOLATE
    } else if temperature >= 30.0 {
        if rainy {
            SUGGESTION_ICE_CREAM
        } else if sunny {
            SUGGESTION_BEACH
        } else {
            SUGGESTION_ICE_CREAM
        }
    } else if rainy {
        SUGGESTION_MOVIE
    } else {
        // Ensolarado e não classificado compartilham o default moderado
        SUGGESTION_OUTDOOR
    };

    suggestion.to_string()
}

// =============================================================================
//  CLIENTE DA API DE CLIMA (HG Brasil Weather)
// =============================================================================

/// Abstração sobre o provedor de clima. O serviço de contatos depende só
/// disso, então o provedor real pode ser trocado (inclusive por um dublê
/// de teste) sem tocar na lógica de negócio.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Nunca falha para o chamador: todo caminho de erro vira uma variante
    /// de `WeatherInfo`, embutida como dado na resposta.
    async fn forecast_for_city(&self, city: &str) -> WeatherInfo;
}

#[derive(Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherClient {
    pub fn new(base_url: String, api_key: Option<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }
}

// Shape da resposta da HG Brasil. `by` informa como a consulta foi
// resolvida: quando a cidade pedida não existe o provedor cai para outra
// estratégia (ex.: geoip) em vez de retornar 404.
#[derive(Debug, Deserialize)]
struct HgWeatherResponse {
    by: Option<String>,
    valid_key: Option<bool>,
    results: Option<HgWeatherResults>,
}

#[derive(Debug, Deserialize)]
struct HgWeatherResults {
    temp: f64,
    condition_code: Option<String>,
    description: String,
    currently: Option<String>,
    city_name: Option<String>,
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    async fn forecast_for_city(&self, city: &str) -> WeatherInfo {
        // `.query()` cuida do percent-encoding de espaços e acentos
        let mut params: Vec<(&str, String)> =
            vec![("format", "json".to_string()), ("city_name", city.to_string())];
        if let Some(key) = &self.api_key {
            params.push(("key", key.clone()));
        }

        let response = match self.http.get(&self.base_url).query(&params).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Falha de rede ao consultar o clima: {}", e);
                return WeatherInfo::failure(
                    WeatherErrorKind::WeatherServiceUnavailable,
                    "Serviço de clima indisponível no momento.",
                );
            }
        };

        let status = response.status();
        if !status.is_success() {
            return WeatherInfo::failure(
                WeatherErrorKind::WeatherApiError,
                format!("A API de clima respondeu com status {}.", status.as_u16()),
            );
        }

        let body: HgWeatherResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("Resposta de clima ilegível: {}", e);
                return WeatherInfo::failure(
                    WeatherErrorKind::WeatherServiceUnavailable,
                    "Serviço de clima indisponível no momento.",
                );
            }
        };

        if body.valid_key == Some(false) {
            return WeatherInfo::failure(
                WeatherErrorKind::WeatherApiError,
                "A API de clima recusou a chave de acesso.",
            );
        }

        // Resolução por qualquer coisa que não seja o nome pedido
        // significa que a cidade não foi encontrada.
        let found_by_city = body.by.as_deref().is_none_or(|by| by == "city_name");
        let results = match body.results {
            Some(r) if found_by_city => r,
            _ => {
                return WeatherInfo::failure(
                    WeatherErrorKind::CityNotFound,
                    format!("Cidade '{city}' não encontrada no provedor de clima."),
                );
            }
        };

        let suggestion = suggest_activity(results.temp, &results.description);

        WeatherInfo::Reading(WeatherReading {
            temperature: results.temp,
            condition_code: results.condition_code.unwrap_or_default(),
            condition_text: results.description,
            day_period: results.currently.unwrap_or_default(),
            city_label: results.city_name.unwrap_or_else(|| city.to_string()),
            suggestion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::weather::WeatherFailure;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // --- Sugestão (pura) ---

    #[test]
    fn frio_domina_qualquer_condicao() {
        for condicao in ["chuva", "ensolarado", "nublado", "Clear sky", ""] {
            assert_eq!(suggest_activity(10.0, condicao), SUGGESTION_HOT_CHOCOLATE);
        }
        // Limite inclusivo: exatamente 18 ainda é frio
        assert_eq!(suggest_activity(18.0, "ensolarado"), SUGGESTION_HOT_CHOCOLATE);
    }

    #[test]
    fn calor_comeca_exatamente_em_trinta() {
        assert_eq!(suggest_activity(30.0, "chuva"), SUGGESTION_ICE_CREAM);
        assert_eq!(suggest_activity(30.0, "ensolarado"), SUGGESTION_BEACH);
        assert_eq!(suggest_activity(29.9, "ensolarado"), SUGGESTION_OUTDOOR);
    }

    #[test]
    fn calor_com_chuva_ou_sem_classificacao_sugere_sorvete() {
        assert_eq!(suggest_activity(35.0, "Chuvas esparsas"), SUGGESTION_ICE_CREAM);
        assert_eq!(suggest_activity(35.0, "garoa fina"), SUGGESTION_ICE_CREAM);
        // Condição desconhecida no calor cai no default de sorvete
        assert_eq!(suggest_activity(35.0, "nublado"), SUGGESTION_ICE_CREAM);
    }

    #[test]
    fn calor_com_sol_sugere_praia() {
        for condicao in ["Tempo limpo", "SOL", "Ensolarado", "céu claro", "Sunny"] {
            assert_eq!(suggest_activity(32.0, condicao), SUGGESTION_BEACH);
        }
    }

    #[test]
    fn temperatura_amena_com_chuva_sugere_filme() {
        for condicao in ["chuvisco", "Drizzle", "Light rain", "precipitação"] {
            assert_eq!(suggest_activity(22.0, condicao), SUGGESTION_MOVIE);
        }
    }

    #[test]
    fn temperatura_amena_com_sol_ou_sem_classificacao_sugere_ar_livre() {
        assert_eq!(suggest_activity(25.0, "ensolarado"), SUGGESTION_OUTDOOR);
        assert_eq!(suggest_activity(25.0, "neblina densa"), SUGGESTION_OUTDOOR);
    }

    #[test]
    fn classificacao_ignora_caixa() {
        assert_eq!(suggest_activity(22.0, "CHUVA FORTE"), SUGGESTION_MOVIE);
        assert_eq!(suggest_activity(32.0, "TEMPO LIMPO"), SUGGESTION_BEACH);
    }

    // --- Cliente HTTP (wiremock) ---

    fn client_for(server: &MockServer) -> WeatherClient {
        WeatherClient::new(format!("{}/weather", server.uri()), Some("chave".into()))
            .expect("cliente de teste")
    }

    fn failure_of(info: WeatherInfo) -> WeatherFailure {
        match info {
            WeatherInfo::Failure(f) => f,
            WeatherInfo::Reading(r) => panic!("esperava falha, veio leitura: {r:?}"),
        }
    }

    #[tokio::test]
    async fn caminho_feliz_monta_leitura_com_sugestao() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("city_name", "São Paulo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "by": "city_name",
                "valid_key": true,
                "results": {
                    "temp": 31.0,
                    "condition_code": "28",
                    "description": "Tempo limpo",
                    "currently": "dia",
                    "city_name": "São Paulo, SP"
                }
            })))
            .mount(&server)
            .await;

        let info = client_for(&server).forecast_for_city("São Paulo").await;
        match info {
            WeatherInfo::Reading(r) => {
                assert_eq!(r.temperature, 31.0);
                assert_eq!(r.city_label, "São Paulo, SP");
                assert_eq!(r.suggestion, SUGGESTION_BEACH);
            }
            WeatherInfo::Failure(f) => panic!("esperava leitura, veio falha: {f:?}"),
        }
    }

    #[tokio::test]
    async fn status_nao_sucesso_vira_weather_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let failure = failure_of(client_for(&server).forecast_for_city("Recife").await);
        assert_eq!(failure.error, WeatherErrorKind::WeatherApiError);
        assert!(failure.message.contains("500"), "mensagem: {}", failure.message);
    }

    #[tokio::test]
    async fn resolucao_por_geoip_vira_city_not_found() {
        let server = MockServer::start().await;
        // Cidade inexistente: o provedor resolve por outro meio
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "by": "ip",
                "valid_key": true,
                "results": {
                    "temp": 20.0,
                    "condition_code": "28",
                    "description": "Tempo limpo",
                    "currently": "dia",
                    "city_name": "São Paulo, SP"
                }
            })))
            .mount(&server)
            .await;

        let failure = failure_of(client_for(&server).forecast_for_city("Xyzville").await);
        assert_eq!(failure.error, WeatherErrorKind::CityNotFound);
    }

    #[tokio::test]
    async fn resposta_sem_results_vira_city_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "by": "city_name",
                "valid_key": true
            })))
            .mount(&server)
            .await;

        let failure = failure_of(client_for(&server).forecast_for_city("Atlântida").await);
        assert_eq!(failure.error, WeatherErrorKind::CityNotFound);
    }

    #[tokio::test]
    async fn corpo_ilegivel_vira_service_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let failure = failure_of(client_for(&server).forecast_for_city("Natal").await);
        assert_eq!(failure.error, WeatherErrorKind::WeatherServiceUnavailable);
    }

    #[tokio::test]
    async fn falha_de_conexao_vira_service_unavailable() {
        // Porta sem ninguém escutando
        let client = WeatherClient::new("http://127.0.0.1:9".to_string(), None)
            .expect("cliente de teste");

        let failure = failure_of(client.forecast_for_city("Manaus").await);
        assert_eq!(failure.error, WeatherErrorKind::WeatherServiceUnavailable);
    }

    #[tokio::test]
    async fn chave_invalida_vira_weather_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "by": "city_name",
                "valid_key": false,
                "results": null
            })))
            .mount(&server)
            .await;

        let failure = failure_of(client_for(&server).forecast_for_city("Curitiba").await);
        assert_eq!(failure.error, WeatherErrorKind::WeatherApiError);
    }
}
