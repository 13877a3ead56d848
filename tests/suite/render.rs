//! Full-screen rendering of each panel state.

use insta::assert_snapshot;
use ratatui::{Terminal, backend::TestBackend};

use pokedex_engine::App;
use pokedex_tui::draw;

use crate::common::{app_for, settle, start_pokemon_mock, submit};

fn screen(app: &mut App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
    terminal.draw(|frame| draw(frame, app)).unwrap();
    let buffer = terminal.backend().buffer();
    (0..buffer.area.height)
        .map(|y| {
            (0..buffer.area.width)
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn info_line(screen: &str, needle: &str) -> String {
    screen
        .lines()
        .find(|line| line.contains(needle))
        .map(|line| line.trim_matches(|c: char| c == '│' || c.is_whitespace()).to_string())
        .unwrap_or_default()
}

#[tokio::test]
async fn fallback_then_recovery_on_screen() {
    let server = start_pokemon_mock().await;
    let mut app = app_for(&server);

    submit(&mut app, "not-a-real-pokemon");
    settle(&mut app).await;
    let failed = screen(&mut app);
    assert_snapshot!(info_line(&failed, "There was"), @"✗ There was an error:");
    assert!(failed.contains("No pokemon with the name \"not-a-real-pokemon\""));
    assert!(failed.contains("Ctrl+R Try again"));

    submit(&mut app, "pikachu");
    let pending = screen(&mut app);
    assert_snapshot!(info_line(&pending, "#XXX"), @"pikachu  #XXX");
    assert!(!pending.contains("There was an error:"));

    settle(&mut app).await;
    let resolved = screen(&mut app);
    assert_snapshot!(info_line(&resolved, "#025"), @"Pikachu  #025");
    assert!(resolved.contains("Swift"));
    assert!(resolved.contains("fetched at"));
}
