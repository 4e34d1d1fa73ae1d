use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use mongodb::bson::oid::ObjectId;
use serde_json::json;
use tracing::{debug, info};

use crate::{
    error::{AppError, Context, Envelope, Failure, Operation},
    models::{NewThought, RECENT_LIMIT},
    state::AppState,
    utils::validate_thought,
};

pub async fn guide_handler() -> impl IntoResponse {
    let guide = json!({
        "Routes": [{
            "Hello": "Welcome to the Happy Thoughts API! See instructions below",
            "GET /thoughts": "Get the 20 most recent thoughts, newest first",
            "POST /thoughts": "Post a new thought: { message (5-140 chars), name (1-20 chars) }",
            "POST /thoughts/:thoughtId/like": "Like a specific thought",
            "DELETE /thoughts/:thoughtId/delete": "Delete a specific thought",
        }],
    });

    (StatusCode::OK, Json(json!({ "responseMessage": guide })))
}

pub async fn list_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, Failure> {
    let thoughts = state
        .store
        .recent(RECENT_LIMIT)
        .await
        .during(Operation::List)?;

    Ok((
        StatusCode::OK,
        Json(Envelope::ok(thoughts, "Successfully fetched thoughts.")),
    ))
}

pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewThought>, JsonRejection>,
) -> Result<impl IntoResponse, Failure> {
    let Json(payload) = payload
        .map_err(|e| AppError::MalformedPayload(e.body_text()))
        .during(Operation::Create)?;

    if payload.created_at.is_some() {
        debug!("Ignoring client supplied createdAt");
    }

    let thought = validate_thought(payload)
        .map_err(AppError::Validation)
        .during(Operation::Create)?;

    let created = state
        .store
        .insert(thought)
        .await
        .during(Operation::Create)?;
    info!("Created thought {}", created.id);

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(created, "Created thought successfully.")),
    ))
}

pub async fn like_handler(
    State(state): State<Arc<AppState>>,
    Path(thought_id): Path<String>,
) -> Result<impl IntoResponse, Failure> {
    let id = parse_id(&thought_id).during(Operation::Like)?;

    let liked = state
        .store
        .like(&id)
        .await
        .during(Operation::Like)?
        .ok_or(AppError::NotFound)
        .during(Operation::Like)?;
    debug!("Thought {} now has {} likes", liked.id, liked.likes);

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(
            format!("Happy thought: {} has been updated", liked.message),
            "Liked thought successfully.",
        )),
    ))
}

pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(thought_id): Path<String>,
) -> Result<impl IntoResponse, Failure> {
    let id = parse_id(&thought_id).during(Operation::Delete)?;

    let deleted = state
        .store
        .delete(&id)
        .await
        .during(Operation::Delete)?
        .ok_or(AppError::NotFound)
        .during(Operation::Delete)?;
    info!("Deleted thought {}", deleted.id);

    Ok((
        StatusCode::OK,
        Json(Envelope::ok(deleted, "Thought deleted successfully.")),
    ))
}

fn parse_id(thought_id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(thought_id).map_err(|_| AppError::InvalidId(thought_id.to_string()))
}
