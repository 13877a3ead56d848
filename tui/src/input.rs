//! Input handling for the Pokedex TUI.

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::mpsc;
use tracing::debug;

use pokedex_engine::App;

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 1024; // bounded: no OOM
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

enum InputMsg {
    Event(Event),
    Error(String),
}

/// Reads terminal events on a blocking thread and hands them to the frame loop.
pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = tokio::task::spawn_blocking(move || input_loop(stop2, tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        // Unblock the reader if it is waiting on channel capacity.
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Best-effort stop; do not block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: Arc<AtomicBool>, tx: mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Applies queued terminal events. Returns whether the app should quit.
pub fn handle_events(app: &mut App, input: &mut InputPump) -> Result<bool> {
    for _ in 0..MAX_EVENTS_PER_FRAME {
        let ev = match input.rx.try_recv() {
            Ok(InputMsg::Event(ev)) => ev,
            Ok(InputMsg::Error(msg)) => return Err(anyhow!("input error: {msg}")),
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(anyhow!("input pump disconnected"));
            }
        };

        if apply_event(app, ev) {
            return Ok(true);
        }
    }
    Ok(app.should_quit())
}

fn apply_event(app: &mut App, ev: Event) -> bool {
    match ev {
        Event::Key(key) if key.kind != KeyEventKind::Release => apply_key(app, key),
        Event::Paste(text) => {
            app.input_mut().enter_text(&text);
            false
        }
        _ => false,
    }
}

fn apply_key(app: &mut App, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.request_quit(),
        KeyCode::Char('c') if ctrl => app.request_quit(),
        KeyCode::Char('r') if ctrl => {
            if !app.try_again() {
                debug!("try again ignored: panel is not showing an error");
            }
        }
        KeyCode::Char('w') if ctrl => app.input_mut().delete_word_backwards(),
        KeyCode::Char('u') if ctrl => app.input_mut().clear(),
        KeyCode::Char(c) if !ctrl => app.input_mut().enter_char(c),
        KeyCode::Enter => app.submit(),
        KeyCode::Tab => app.cycle_example(),
        KeyCode::Backspace => app.input_mut().delete_char(),
        KeyCode::Left => app.input_mut().move_cursor_left(),
        KeyCode::Right => app.input_mut().move_cursor_right(),
        KeyCode::Home => app.input_mut().move_cursor_home(),
        KeyCode::End => app.input_mut().move_cursor_end(),
        _ => {}
    }
    app.should_quit()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pokedex_core::FetchFut;
    use pokedex_engine::{
        BoundaryState, FailureInfo, Fetcher, Pokemon, QueryKey, RequestStatus, UiSettings,
    };

    use super::*;

    struct RejectingFetcher;

    impl Fetcher<Pokemon> for RejectingFetcher {
        fn fetch(&self, key: QueryKey) -> FetchFut<Pokemon> {
            Box::pin(async move {
                Err(FailureInfo::new(format!(
                    "No pokemon with the name \"{key}\""
                )))
            })
        }
    }

    fn test_app() -> App {
        App::new(Arc::new(RejectingFetcher), &UiSettings::default())
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        apply_event(app, Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn ctrl(app: &mut App, c: char) -> bool {
        apply_event(
            app,
            Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)),
        )
    }

    #[tokio::test]
    async fn typing_then_enter_submits() {
        let mut app = test_app();
        for c in "mew".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Char('w'));
        assert!(!press(&mut app, KeyCode::Enter));

        assert_eq!(app.submitted().as_str(), "mew");
        assert_eq!(app.request_status(), RequestStatus::Pending);
    }

    #[tokio::test]
    async fn tab_cycles_examples() {
        let mut app = test_app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.submitted().as_str(), "pikachu");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.submitted().as_str(), "charizard");
    }

    #[tokio::test]
    async fn ctrl_r_tries_again_only_after_failure() {
        let mut app = test_app();
        app.input_mut().set_text("missingno");
        app.submit();
        ctrl(&mut app, 'r');
        assert_eq!(app.submitted().as_str(), "missingno");

        for _ in 0..64 {
            tokio::task::yield_now().await;
            app.tick();
            if app.in_flight() == 0 {
                break;
            }
        }
        let mut view =
            crate::PokemonView::new(crate::Palette::standard(), crate::glyphs(app.ui_options()), "|");
        app.render_info(&mut view);
        assert_eq!(app.boundary_state(), BoundaryState::Failed);

        ctrl(&mut app, 'r');
        assert!(app.submitted().is_empty());
        assert_eq!(app.boundary_state(), BoundaryState::Healthy);
        assert_eq!(app.request_status(), RequestStatus::Idle);
    }

    #[tokio::test]
    async fn esc_and_ctrl_c_quit() {
        let mut app = test_app();
        assert!(press(&mut app, KeyCode::Esc));

        let mut app = test_app();
        assert!(ctrl(&mut app, 'c'));
    }

    #[tokio::test]
    async fn paste_and_word_delete_edit_input() {
        let mut app = test_app();
        apply_event(&mut app, Event::Paste("mr mime".to_string()));
        assert_eq!(app.input().text(), "mr mime");
        ctrl(&mut app, 'w');
        assert_eq!(app.input().text(), "mr ");
        ctrl(&mut app, 'u');
        assert_eq!(app.input().text(), "");
    }
}
