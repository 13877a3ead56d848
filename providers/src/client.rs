//! GraphQL Pokémon lookup client.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use pokedex_core::{FetchFut, Fetcher, truncate_with_ellipsis};
use pokedex_types::{FailureInfo, Pokemon, QueryKey};

use crate::retry::{RetryConfig, RetryOutcome, send_with_retry};

/// Public Pokémon GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://graphql-pokemon2.vercel.app/";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;
const MAX_ERROR_BODY_CHARS: usize = 300;

const POKEMON_QUERY: &str = "query PokemonInfo($name: String) {
  pokemon(name: $name) {
    id
    number
    name
    image
    attacks {
      special {
        name
        type
        damage
      }
    }
  }
}";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub endpoint: String,
    /// Whole-request timeout, per attempt.
    pub timeout: Duration,
    /// Artificial latency added before each lookup.
    pub delay: Duration,
    pub retry: RetryConfig,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            delay: Duration::ZERO,
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<PokemonData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct PokemonData {
    pokemon: Option<Pokemon>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

fn joined_errors(errors: &[GraphQlError]) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    Some(
        errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

struct ClientInner {
    http: reqwest::Client,
    options: ClientOptions,
}

/// Looks up Pokémon by name. Cheap to clone.
#[derive(Clone)]
pub struct PokemonClient {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for PokemonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PokemonClient")
            .field("endpoint", &self.inner.options.endpoint)
            .finish_non_exhaustive()
    }
}

impl PokemonClient {
    pub fn new(options: ClientOptions) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(options.timeout)
            .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
            .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
            .build()?;
        Ok(Self {
            inner: Arc::new(ClientInner { http, options }),
        })
    }

    pub async fn fetch_pokemon(&self, name: &str) -> Result<Pokemon, FailureInfo> {
        let options = &self.inner.options;
        if !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }

        let body = json!({
            "query": POKEMON_QUERY,
            "variables": { "name": name },
        });
        let outcome = send_with_retry(
            || self.inner.http.post(&options.endpoint).json(&body),
            &options.retry,
        )
        .await;

        match outcome {
            RetryOutcome::Success(response) => {
                let text = response
                    .text()
                    .await
                    .map_err(|e| FailureInfo::new("Network error").with_cause(e))?;
                parse_lookup(name, &text)
            }
            RetryOutcome::HttpError(response) => {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                Err(http_failure(status, &text))
            }
            RetryOutcome::ConnectionError { attempts, source } => {
                Err(FailureInfo::new("Network error")
                    .with_cause(format!("{source} (after {attempts} attempts)")))
            }
        }
    }
}

impl Fetcher<Pokemon> for PokemonClient {
    fn fetch(&self, key: QueryKey) -> FetchFut<Pokemon> {
        let client = self.clone();
        Box::pin(async move { client.fetch_pokemon(key.as_str()).await })
    }
}

fn parse_lookup(name: &str, text: &str) -> Result<Pokemon, FailureInfo> {
    let parsed: GraphQlResponse = serde_json::from_str(text).map_err(|e| {
        FailureInfo::new("Malformed response from the Pokémon service").with_cause(e)
    })?;

    if let Some(message) = joined_errors(&parsed.errors) {
        return Err(FailureInfo::new(message));
    }

    match parsed.data.and_then(|data| data.pokemon) {
        Some(mut pokemon) => {
            pokemon.fetched_at = Some(chrono::Local::now().format("%H:%M:%S%.3f").to_string());
            Ok(pokemon)
        }
        None => Err(FailureInfo::new(format!("No pokemon with the name \"{name}\""))),
    }
}

fn http_failure(status: reqwest::StatusCode, text: &str) -> FailureInfo {
    let from_body = serde_json::from_str::<GraphQlResponse>(text)
        .ok()
        .and_then(|parsed| joined_errors(&parsed.errors));
    if let Some(message) = from_body {
        return FailureInfo::new(message);
    }

    let info = FailureInfo::new(format!("Request failed ({status})"));
    let body = text.trim();
    if body.is_empty() {
        info
    } else {
        info.with_cause(truncate_with_ellipsis(body, MAX_ERROR_BODY_CHARS))
    }
}
