use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai::{prompts, GenerateRequest};
use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::json_body;

#[derive(Debug, Deserialize)]
pub struct RefineRequest {
    pub prayers: Vec<String>,
}

/// POST /functions/refine-prayers - polish a batch of prayer requests
///
/// All prayers go to the model in one prompt; the answer is split back into
/// exactly one entry per input.
///
/// Expected Input:
/// ```json
/// { "prayers": ["취업 기도 부탁", "어머니 건강"] }
/// ```
///
/// Expected Output:
/// ```json
/// { "data": ["취업의 문이 열리도록 기도합니다.", "어머니의 건강을 위해 기도합니다."] }
/// ```
pub async fn refine_prayers(
    State(state): State<AppState>,
    payload: Result<Json<RefineRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = json_body(payload, "prayers must be an array of strings")?;
    if request.prayers.is_empty() {
        return Ok(Json(json!({ "data": [] })));
    }

    let prompt = prompts::prayer_prompt(&request.prayers);
    let generation = state
        .chain
        .run(state.model.as_ref(), &GenerateRequest::text(prompt))
        .await?;

    let refined = prompts::split_refined(&generation.text, &request.prayers);
    tracing::info!("Refined {} prayers with {}", refined.len(), generation.model);

    Ok(Json(json!({ "data": refined })))
}
