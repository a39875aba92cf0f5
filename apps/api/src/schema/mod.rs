// LocalBusiness JSON-LD generation and publishing.
// Flow: prior document + menu outline → prompt → completion → store → <head>.
// All completion calls go through llm_client.

pub mod generator;
pub mod handlers;
pub mod prior;
pub mod prompts;
pub mod publisher;

/// Substituted whenever a real document cannot be obtained.
pub const PLACEHOLDER_DOCUMENT: &str = "{}";
