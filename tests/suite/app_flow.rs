//! End-to-end request lifecycle through the app and a mock GraphQL server.

use pokedex_engine::{BoundaryState, Pokemon, QueryKey, RenderError, Renderer, RequestStatus};

use crate::common::{app_for, requested_names, settle, start_pokemon_mock, submit};

/// Renders each state as one line of plain text.
struct Summary;

impl Renderer<Pokemon> for Summary {
    type Output = String;

    fn render_idle(&mut self) -> String {
        "Submit a pokemon".to_string()
    }

    fn render_pending(&mut self, key: &QueryKey) -> String {
        format!("{key} #XXX loading...")
    }

    fn render_resolved(&mut self, data: &Pokemon) -> String {
        format!("{} #{}", data.name, data.number)
    }

    fn render_rejected(&mut self, error: &RenderError) -> String {
        format!("There was an error: {}", error.message())
    }
}

#[tokio::test]
async fn known_pokemon_resolves() {
    let server = start_pokemon_mock().await;
    let mut app = app_for(&server);

    submit(&mut app, "pikachu");
    assert_eq!(app.render_info(&mut Summary), "pikachu #XXX loading...");

    settle(&mut app).await;
    assert_eq!(app.request_status(), RequestStatus::Resolved);
    assert_eq!(app.render_info(&mut Summary), "Pikachu #025");
    let fetched_at = app
        .request_state()
        .data()
        .and_then(|pokemon| pokemon.fetched_at.clone());
    assert!(fetched_at.is_some());
}

#[tokio::test]
async fn unknown_pokemon_is_isolated_until_a_new_name() {
    let server = start_pokemon_mock().await;
    let mut app = app_for(&server);

    submit(&mut app, "not-a-real-pokemon");
    settle(&mut app).await;

    let fallback = "There was an error: No pokemon with the name \"not-a-real-pokemon\"";
    assert_eq!(app.render_info(&mut Summary), fallback);
    assert_eq!(app.boundary_state(), BoundaryState::Failed);

    // Unrelated frames keep the fallback without refetching.
    for _ in 0..10 {
        app.tick();
        assert_eq!(app.render_info(&mut Summary), fallback);
    }

    submit(&mut app, "pikachu");
    assert_eq!(app.boundary_state(), BoundaryState::Healthy);
    assert_eq!(app.render_info(&mut Summary), "pikachu #XXX loading...");
    settle(&mut app).await;
    assert_eq!(app.render_info(&mut Summary), "Pikachu #025");

    assert_eq!(
        requested_names(&server).await,
        vec!["not-a-real-pokemon", "pikachu"]
    );
}

#[tokio::test]
async fn try_again_returns_to_the_prompt() {
    let server = start_pokemon_mock().await;
    let mut app = app_for(&server);

    submit(&mut app, "missingno");
    settle(&mut app).await;
    app.render_info(&mut Summary);

    assert!(app.try_again());
    assert_eq!(app.render_info(&mut Summary), "Submit a pokemon");
    assert_eq!(app.request_status(), RequestStatus::Idle);
    assert_eq!(requested_names(&server).await, vec!["missingno"]);
}

#[tokio::test]
async fn only_the_latest_submission_is_shown() {
    let server = start_pokemon_mock().await;
    let mut app = app_for(&server);

    submit(&mut app, "pikachu");
    submit(&mut app, "mew");
    settle(&mut app).await;

    assert_eq!(app.render_info(&mut Summary), "Mew #151");
    assert_eq!(app.submitted().as_str(), "mew");
}
