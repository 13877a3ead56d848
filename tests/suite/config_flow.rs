//! Configuration file driving client and app setup.

use std::fs;
use std::sync::Arc;

use pokedex_config::PokedexConfig;
use pokedex_engine::{App, RequestStatus};
use pokedex_providers::PokemonClient;

use crate::common::{settle, start_pokemon_mock};

#[tokio::test]
async fn initial_query_from_config_is_fetched_on_start() {
    let server = start_pokemon_mock().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        format!(
            "[app]\ninitial_query = \"mew\"\nascii_only = true\n\n[api]\nendpoint = \"{}/\"\nmax_retries = 0\n",
            server.uri()
        ),
    )
    .unwrap();

    let config = PokedexConfig::load_from(&path).unwrap();
    let client = PokemonClient::new(config.api_settings().client_options()).unwrap();
    let mut app = App::new(Arc::new(client), &config.ui_settings());

    assert!(app.ui_options().ascii_only);
    assert_eq!(app.request_status(), RequestStatus::Pending);

    settle(&mut app).await;
    let name = app.request_state().data().map(|pokemon| pokemon.name.clone());
    assert_eq!(name.as_deref(), Some("Mew"));
}
