//! Document store and publisher: owns the stored document and the `<head>` script tag.
//!
//! States:
//! - `Unset`: nothing stored. A render runs the generator (only then) and,
//!   when `persist_generated` is on, stores a usable result so the next
//!   render is `Set`.
//! - `Set`: the stored text is emitted as-is, with no outbound calls.
//!
//! Every emitted document passes `sanitize_document` first.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::generator::{GeneratedDocument, SchemaGenerator};
use super::PLACEHOLDER_DOCUMENT;
use crate::llm_client::strip_json_fences;
use crate::settings::{SettingsStore, StoreError, SCHEMA_KEY};

pub const SCRIPT_OPEN: &str = r#"<script type="application/ld+json">"#;
pub const SCRIPT_CLOSE: &str = "</script>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreState {
    Unset,
    Set(String),
}

/// Result of an explicit regeneration.
#[derive(Debug, Clone, Serialize)]
pub struct Regenerated {
    pub document: GeneratedDocument,
    pub stored: bool,
}

/// Makes model output safe to place inside a script element.
///
/// Strips code fences, then requires the text to parse as JSON; anything
/// else becomes the placeholder. Every `<` is rewritten as the JSON escape
/// `\u003c`. In valid JSON a `<` can only sit inside a string, so no
/// `</script>` or `<!--` survives and the parsed value is unchanged.
pub fn sanitize_document(raw: &str) -> String {
    let text = strip_json_fences(raw);
    if let Err(e) = serde_json::from_str::<serde::de::IgnoredAny>(text) {
        warn!("Document is not valid JSON, emitting placeholder: {e}");
        return PLACEHOLDER_DOCUMENT.to_string();
    }
    text.replace('<', "\\u003c")
}

pub fn wrap_script(document: &str) -> String {
    format!("{SCRIPT_OPEN}{document}{SCRIPT_CLOSE}")
}

pub struct Publisher {
    settings: Arc<dyn SettingsStore>,
    generator: Arc<SchemaGenerator>,
    persist_generated: bool,
}

impl Publisher {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        generator: Arc<SchemaGenerator>,
        persist_generated: bool,
    ) -> Self {
        Self {
            settings,
            generator,
            persist_generated,
        }
    }

    pub fn generator(&self) -> &SchemaGenerator {
        &self.generator
    }

    /// A blank stored value counts as `Unset`.
    pub async fn state(&self) -> Result<StoreState, StoreError> {
        Ok(match self.settings.get(SCHEMA_KEY).await? {
            Some(stored) if !stored.trim().is_empty() => StoreState::Set(stored),
            _ => StoreState::Unset,
        })
    }

    /// The render hook: the script tag to inject into the page head.
    pub async fn render_head(&self) -> String {
        let document = self.current_document().await;
        wrap_script(&sanitize_document(&document))
    }

    /// Stored text when `Set`; a fresh generation only on a genuine miss.
    async fn current_document(&self) -> String {
        match self.state().await {
            Ok(StoreState::Set(stored)) => {
                debug!("Serving stored schema ({} bytes)", stored.len());
                stored
            }
            Ok(StoreState::Unset) => {
                info!("No stored schema; generating during render");
                let document = self.generator.generate().await;
                if self.persist_generated {
                    self.persist(&document).await;
                }
                document.raw_text
            }
            Err(e) => {
                // No generation while the store is unreadable
                error!("Failed to read stored schema, emitting placeholder: {e}");
                PLACEHOLDER_DOCUMENT.to_string()
            }
        }
    }

    /// Stores a generated document if it is usable. Returns whether it was stored.
    async fn persist(&self, document: &GeneratedDocument) -> bool {
        if document.is_placeholder() {
            debug!("Not storing placeholder document");
            return false;
        }
        if sanitize_document(&document.raw_text) == PLACEHOLDER_DOCUMENT {
            warn!("Not storing generated document: not valid JSON");
            return false;
        }

        let text = strip_json_fences(&document.raw_text);
        match self.settings.set(SCHEMA_KEY, text).await {
            Ok(()) => {
                info!("Stored generated schema ({} bytes)", text.len());
                true
            }
            Err(e) => {
                error!("Failed to store generated schema: {e}");
                false
            }
        }
    }

    /// Always generates, storing the result when usable (admin "regenerate").
    pub async fn regenerate(&self) -> Regenerated {
        let document = self.generator.generate().await;
        let stored = self.persist(&document).await;
        Regenerated { document, stored }
    }

    /// The admin settings-save path.
    pub async fn save(&self, document: &str) -> Result<(), StoreError> {
        self.settings.set(SCHEMA_KEY, document).await?;
        info!("Saved schema from settings ({} bytes)", document.len());
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.settings.delete(SCHEMA_KEY).await?;
        info!("Cleared stored schema");
        Ok(())
    }
}
