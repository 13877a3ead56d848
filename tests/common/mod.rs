//! Shared test utilities and fixtures
//!
//! A mock GraphQL endpoint plus helpers to build and drive an `App` against it.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pokedex_engine::{App, UiSettings};
use pokedex_providers::{ClientOptions, PokemonClient, RetryConfig};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

pub fn pokemon_json(number: &str, name: &str) -> Value {
    json!({
        "id": format!("UG9rZW1vbjo{number}"),
        "number": number,
        "name": name,
        "image": format!("https://img.pokemondb.net/artwork/{}.jpg", name.to_lowercase()),
        "attacks": {
            "special": [
                { "name": "Swift", "type": "Normal", "damage": 60 }
            ]
        }
    })
}

/// Start a mock server that knows pikachu and mew; every other name is null.
pub async fn start_pokemon_mock() -> MockServer {
    let server = MockServer::start().await;
    mount_pokemon(&server, "pikachu", pokemon_json("025", "Pikachu")).await;
    mount_pokemon(&server, "mew", pokemon_json("151", "Mew")).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "pokemon": null } })))
        .with_priority(10)
        .mount(&server)
        .await;
    server
}

pub async fn mount_pokemon(server: &MockServer, name: &str, pokemon: Value) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "name": name } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "pokemon": pokemon } })))
        .with_priority(1)
        .mount(server)
        .await;
}

pub fn client_for(server: &MockServer) -> PokemonClient {
    PokemonClient::new(ClientOptions {
        endpoint: format!("{}/", server.uri()),
        timeout: Duration::from_secs(5),
        delay: Duration::ZERO,
        retry: RetryConfig::default()
            .with_max_retries(0)
            .with_initial_delay(Duration::from_millis(1)),
    })
    .expect("client builds")
}

pub fn app_for(server: &MockServer) -> App {
    App::new(Arc::new(client_for(server)), &UiSettings::default())
}

/// Ticks the app until every fetch it started has been applied.
pub async fn settle(app: &mut App) {
    let deadline = Instant::now() + SETTLE_TIMEOUT;
    while app.in_flight() > 0 {
        assert!(Instant::now() < deadline, "fetch did not settle: {app:?}");
        tokio::time::sleep(Duration::from_millis(5)).await;
        app.tick();
    }
}

pub fn submit(app: &mut App, name: &str) {
    app.input_mut().set_text(name);
    app.submit();
}

/// Lookup requests the mock server has received, in order.
pub async fn requested_names(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|request| {
            let body: Value = serde_json::from_slice(&request.body).ok()?;
            body["variables"]["name"].as_str().map(ToString::to_string)
        })
        .collect()
}
