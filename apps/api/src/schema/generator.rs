//! Schema Generation: orchestrates the synthesis pipeline.
//!
//! Flow: fetch prior document → read menus → render outline →
//!       build prompt → completion call → GeneratedDocument.
//!
//! The pipeline always completes. Failed steps degrade to the placeholder
//! document or an empty outline and are logged as warnings.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::prior::PriorDocumentSource;
use super::prompts::{build_prompt, PromptContext};
use super::PLACEHOLDER_DOCUMENT;
use crate::llm_client::CompletionClient;
use crate::menus::outline::render_menus;
use crate::menus::store::MenuSource;

/// Text produced by one completion call. Not validated here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedDocument {
    pub raw_text: String,
}

impl GeneratedDocument {
    pub fn placeholder() -> Self {
        Self {
            raw_text: PLACEHOLDER_DOCUMENT.to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.raw_text.trim() == PLACEHOLDER_DOCUMENT
    }
}

pub struct SchemaGenerator {
    menus: Arc<dyn MenuSource>,
    prior: Arc<dyn PriorDocumentSource>,
    llm: Arc<dyn CompletionClient>,
}

impl SchemaGenerator {
    pub fn new(
        menus: Arc<dyn MenuSource>,
        prior: Arc<dyn PriorDocumentSource>,
        llm: Arc<dyn CompletionClient>,
    ) -> Self {
        Self { menus, prior, llm }
    }

    /// Collects the prior document and the menu outline.
    pub async fn build_context(&self) -> PromptContext {
        let prior_document = self.prior.fetch().await;

        let menu_outline = match self.menus.menus().await {
            Ok(menus) => render_menus(&menus),
            Err(e) => {
                warn!("Failed to read navigation menus, using empty outline: {e}");
                String::new()
            }
        };

        PromptContext {
            prior_document,
            menu_outline,
        }
    }

    /// The prompt a generation would send right now.
    pub async fn preview_prompt(&self) -> String {
        build_prompt(&self.build_context().await)
    }

    /// Runs the full pipeline. Never fails; any completion error yields the placeholder.
    pub async fn generate(&self) -> GeneratedDocument {
        let context = self.build_context().await;
        info!(
            "Generating schema: prior_document={} bytes, menu_outline={} lines",
            context.prior_document.len(),
            context.menu_outline.lines().count()
        );

        let prompt = build_prompt(&context);

        match self.llm.complete(&prompt).await {
            Ok(raw_text) => {
                info!("Schema generated ({} bytes)", raw_text.len());
                GeneratedDocument { raw_text }
            }
            Err(e) => {
                warn!("Schema generation failed, using placeholder: {e}");
                GeneratedDocument::placeholder()
            }
        }
    }
}
