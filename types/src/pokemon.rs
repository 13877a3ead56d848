//! Pokémon payload returned by the lookup service.

use serde::{Deserialize, Serialize};

/// Names offered as quick picks in the search form.
pub const EXAMPLE_POKEMON: [&str; 4] = ["pikachu", "charizard", "ninetales", "mew"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: String,
    pub number: String,
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub attacks: Attacks,
    /// Local time the record was fetched, stamped by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attacks {
    #[serde(default)]
    pub special: Vec<Attack>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attack {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub damage: u32,
}
