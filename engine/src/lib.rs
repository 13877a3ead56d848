//! Core engine for Pokedex - application state and orchestration.
//!
//! This crate contains the App state machine without TUI dependencies.
//!
//! The app is a search form over a boundary-wrapped info panel. The submitted
//! key is both the query key of the panel's `AsyncResource` and the identity of
//! the `KeyedBoundary` around it, so submitting a different name is what
//! clears a captured failure.

mod input;

use std::sync::Arc;

pub use input::SearchInput;
pub use pokedex_config::{PokedexConfig, UiSettings};
pub use pokedex_core::{
    AsyncResource, BoundaryState, FailureInfo, Fetcher, KeyedBoundary, MountId, QueryKey,
    RenderError, Renderer, RequestState, RequestStatus,
};
pub use pokedex_types::{EXAMPLE_POKEMON, Pokemon};

/// UI configuration options derived from config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
}

type InfoPanel = KeyedBoundary<QueryKey, AsyncResource<Pokemon>>;

pub struct App {
    input: SearchInput,
    submitted: QueryKey,
    info: InfoPanel,
    /// Index into `EXAMPLE_POKEMON` of the last quick pick.
    example: Option<usize>,
    ui_options: UiOptions,
    should_quit: bool,
    tick: usize,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("input", &self.input)
            .field("submitted", &self.submitted)
            .field("info", &self.info)
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Builds the app; a non-empty `initial_query` is submitted right away.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(fetcher: Arc<dyn Fetcher<Pokemon>>, settings: &UiSettings) -> Self {
        let mut app = Self {
            input: SearchInput::default(),
            submitted: QueryKey::empty(),
            info: KeyedBoundary::new(QueryKey::empty(), move || {
                AsyncResource::new(Arc::clone(&fetcher))
            }),
            example: None,
            ui_options: UiOptions {
                ascii_only: settings.ascii_only,
                high_contrast: settings.high_contrast,
            },
            should_quit: false,
            tick: 0,
        };

        if !settings.initial_query.trim().is_empty() {
            app.input.set_text(settings.initial_query.trim());
            app.submit();
        }
        app
    }

    #[must_use]
    pub fn input(&self) -> &SearchInput {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut SearchInput {
        &mut self.input
    }

    #[must_use]
    pub fn submitted(&self) -> &QueryKey {
        &self.submitted
    }

    #[must_use]
    pub fn request_state(&self) -> &RequestState<Pokemon> {
        self.info.subtree().state()
    }

    #[must_use]
    pub fn request_status(&self) -> RequestStatus {
        self.info.subtree().status()
    }

    #[must_use]
    pub fn boundary_state(&self) -> BoundaryState {
        self.info.state()
    }

    #[must_use]
    pub fn mount_id(&self) -> MountId {
        self.info.mount_id()
    }

    /// Fetches issued by the currently mounted resource.
    #[must_use]
    pub fn fetches_issued(&self) -> u64 {
        self.info.subtree().fetches_issued()
    }

    /// Fetches whose settlement has not been applied yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.info.subtree().in_flight()
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.ui_options
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.tick
    }

    /// Submits the search form's current text.
    pub fn submit(&mut self) {
        self.set_submitted(QueryKey::new(self.input.text()));
    }

    /// Fills the form with an example name and submits it.
    pub fn select_example(&mut self, name: &str) {
        self.input.set_text(name);
        self.submit();
    }

    /// Submits the next example name, wrapping around.
    pub fn cycle_example(&mut self) {
        let next = self
            .example
            .map_or(0, |idx| (idx + 1) % EXAMPLE_POKEMON.len());
        self.example = Some(next);
        self.select_example(EXAMPLE_POKEMON[next]);
    }

    /// Clears the submitted key so a failed panel starts over.
    ///
    /// Returns false (and does nothing) unless the panel is showing its fallback.
    pub fn try_again(&mut self) -> bool {
        if self.info.state() != BoundaryState::Failed {
            return false;
        }
        self.set_submitted(QueryKey::empty());
        true
    }

    fn set_submitted(&mut self, key: QueryKey) {
        tracing::debug!(key = %key, "search submitted");
        self.submitted = key;
        self.sync();
    }

    /// Brings the boundary identity and the resource key in line with the
    /// submitted key. Both steps are no-ops when nothing changed.
    fn sync(&mut self) {
        self.info.reset(&self.submitted);
        self.info.subtree_mut().observe(&self.submitted);
    }

    /// Advances one frame: re-sync and apply any settled fetches.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        self.sync();
        self.info.subtree_mut().process_settlements();
    }

    /// Renders the info panel through its boundary.
    pub fn render_info<R: Renderer<Pokemon>>(&mut self, renderer: &mut R) -> R::Output {
        self.info.render(renderer)
    }
}
