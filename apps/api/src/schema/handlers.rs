//! Axum route handlers for the render hook and the schema settings page.

use axum::{extract::State, response::Html, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::schema::publisher::{Regenerated, StoreState};
use crate::settings::{is_renderer_disabled, SCHEMA_KEY, SETTINGS_GROUP};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SaveSchemaRequest {
    pub document: String,
}

#[derive(Debug, Serialize)]
pub struct SchemaSettingsResponse {
    pub group: &'static str,
    pub key: &'static str,
    /// "set" or "unset"
    pub state: &'static str,
    pub document: Option<String>,
    pub competing_renderer: String,
    pub competing_renderer_disabled: bool,
}

#[derive(Debug, Serialize)]
pub struct PromptPreviewResponse {
    pub prompt: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /head
///
/// Render hook: the JSON-LD script tag for the page head.
/// Never fails; degraded paths emit the placeholder document.
pub async fn handle_head(State(state): State<AppState>) -> Html<String> {
    Html(state.publisher.render_head().await)
}

/// GET /api/v1/schema
pub async fn handle_get_schema(
    State(state): State<AppState>,
) -> Result<Json<SchemaSettingsResponse>, AppError> {
    let (state_name, document) = match state.publisher.state().await? {
        StoreState::Set(document) => ("set", Some(document)),
        StoreState::Unset => ("unset", None),
    };
    let competing_renderer_disabled =
        is_renderer_disabled(state.settings.as_ref(), &state.competing_renderer).await?;

    Ok(Json(SchemaSettingsResponse {
        group: SETTINGS_GROUP,
        key: SCHEMA_KEY,
        state: state_name,
        document,
        competing_renderer: state.competing_renderer.clone(),
        competing_renderer_disabled,
    }))
}

/// PUT /api/v1/schema
///
/// The settings-save path. Stored verbatim; sanitization happens on emission.
pub async fn handle_save_schema(
    State(state): State<AppState>,
    Json(request): Json<SaveSchemaRequest>,
) -> Result<Json<SchemaSettingsResponse>, AppError> {
    if request.document.trim().is_empty() {
        return Err(AppError::Validation(
            "document cannot be empty; use DELETE to clear the stored schema".to_string(),
        ));
    }

    state.publisher.save(&request.document).await?;
    handle_get_schema(State(state)).await
}

/// DELETE /api/v1/schema
pub async fn handle_clear_schema(
    State(state): State<AppState>,
) -> Result<Json<SchemaSettingsResponse>, AppError> {
    state.publisher.clear().await?;
    handle_get_schema(State(state)).await
}

/// POST /api/v1/schema/regenerate
///
/// Runs the full pipeline and stores the result unless it is the placeholder
/// or not valid JSON.
pub async fn handle_regenerate(State(state): State<AppState>) -> Json<Regenerated> {
    Json(state.publisher.regenerate().await)
}

/// GET /api/v1/schema/prompt
///
/// The prompt a regeneration would send now. Makes no completion call.
pub async fn handle_prompt_preview(State(state): State<AppState>) -> Json<PromptPreviewResponse> {
    Json(PromptPreviewResponse {
        prompt: state.publisher.generator().preview_prompt().await,
    })
}
