//! Fetch collaborators for Pokedex.
//!
//! - [`client`] - GraphQL Pokémon lookup implementing [`pokedex_core::Fetcher`]
//! - [`retry`] - Backoff policy applied to every HTTP attempt
//!
//! Retrying lives here and only here. The request state machine in
//! `pokedex-core` issues exactly one fetch per key and never retries; whatever
//! attempts the client makes are invisible to it and settle as a single outcome.

pub mod client;
pub mod retry;

pub use client::{ClientOptions, DEFAULT_ENDPOINT, PokemonClient};
pub use retry::RetryConfig;
