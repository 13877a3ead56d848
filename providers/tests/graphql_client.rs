//! Integration tests for the Pokémon GraphQL client against a mock server.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pokedex_core::{AsyncResource, Fetcher, QueryKey, RequestStatus, SettleOutcome};
use pokedex_providers::{ClientOptions, PokemonClient, RetryConfig};
use pokedex_types::Pokemon;

fn pikachu_body() -> Value {
    json!({
        "data": {
            "pokemon": {
                "id": "UG9rZW1vbjowMjU=",
                "number": "025",
                "name": "Pikachu",
                "image": "https://img.pokemondb.net/artwork/pikachu.jpg",
                "attacks": {
                    "special": [
                        { "name": "Discharge", "type": "Electric", "damage": 35 },
                        { "name": "Thunder", "type": "Electric", "damage": 100 },
                        { "name": "Thunderbolt", "type": "Electric", "damage": 55 }
                    ]
                }
            }
        }
    })
}

fn client_for(server: &MockServer, max_retries: u32) -> PokemonClient {
    PokemonClient::new(ClientOptions {
        endpoint: format!("{}/", server.uri()),
        timeout: Duration::from_secs(5),
        delay: Duration::ZERO,
        retry: RetryConfig::default()
            .with_max_retries(max_retries)
            .with_initial_delay(Duration::from_millis(1)),
    })
    .expect("client builds")
}

#[tokio::test]
async fn resolves_known_pokemon() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({ "variables": { "name": "pikachu" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(pikachu_body()))
        .expect(1)
        .mount(&server)
        .await;

    let pokemon = client_for(&server, 0)
        .fetch_pokemon("pikachu")
        .await
        .expect("pikachu resolves");

    assert_eq!(pokemon.name, "Pikachu");
    assert_eq!(pokemon.number, "025");
    assert_eq!(pokemon.attacks.special.len(), 3);
    assert!(pokemon.fetched_at.is_some());
}

#[tokio::test]
async fn unknown_pokemon_rejects_with_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "pokemon": null } })))
        .mount(&server)
        .await;

    let err = client_for(&server, 0)
        .fetch_pokemon("not-a-real-pokemon")
        .await
        .unwrap_err();

    assert_eq!(
        err.message(),
        "No pokemon with the name \"not-a-real-pokemon\""
    );
}

#[tokio::test]
async fn retries_unavailable_service_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pikachu_body()))
        .expect(1)
        .mount(&server)
        .await;

    let pokemon = client_for(&server, 2).fetch_pokemon("pikachu").await;
    assert_eq!(pokemon.map(|p| p.name).ok().as_deref(), Some("Pikachu"));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [{ "message": "Syntax Error: Unexpected Name" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server, 2)
        .fetch_pokemon("pikachu")
        .await
        .unwrap_err();
    assert_eq!(err.message(), "Syntax Error: Unexpected Name");
}

#[tokio::test]
async fn exhausted_retries_report_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(2)
        .mount(&server)
        .await;

    let err = client_for(&server, 1)
        .fetch_pokemon("pikachu")
        .await
        .unwrap_err();
    assert_eq!(err.message(), "Request failed (500 Internal Server Error)");
    assert_eq!(err.cause(), Some("upstream down"));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_network_error() {
    let client = PokemonClient::new(ClientOptions {
        endpoint: "http://127.0.0.1:1/".to_string(),
        timeout: Duration::from_secs(2),
        retry: RetryConfig::default().with_max_retries(0),
        ..ClientOptions::default()
    })
    .expect("client builds");

    let err = client.fetch_pokemon("pikachu").await.unwrap_err();
    assert_eq!(err.message(), "Network error");
    assert!(err.cause().is_some_and(|cause| cause.contains("after 1 attempts")));
}

#[tokio::test]
async fn drives_async_resource_to_resolved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pikachu_body()))
        .mount(&server)
        .await;

    let fetcher: Arc<dyn Fetcher<Pokemon>> = Arc::new(client_for(&server, 0));
    let mut resource = AsyncResource::new(fetcher);
    resource.observe(&QueryKey::from("pikachu"));
    assert_eq!(resource.status(), RequestStatus::Pending);

    let outcome = resource.settle_next().await;

    assert_eq!(
        outcome,
        Some(SettleOutcome::Applied(RequestStatus::Resolved))
    );
    assert_eq!(
        resource.state().data().map(|p| p.name.as_str()),
        Some("Pikachu")
    );
}
