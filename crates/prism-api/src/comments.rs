use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use prism_db::models::CommentRow;
use prism_types::api::{Claims, CommentResponse, CreateCommentRequest};

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::{now_timestamp, parse_id, parse_timestamp};

fn comment_response(row: CommentRow) -> CommentResponse {
    CommentResponse {
        id: parse_id(&row.id),
        post_id: parse_id(&row.post_id),
        user_id: parse_id(&row.user_id),
        text: row.text,
        username: row.username,
        profile_picture: row.profile_picture,
        created_at: parse_timestamp(&row.created_at),
    }
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let comments: Vec<CommentResponse> = state
        .db
        .list_comments(&post_id.to_string())?
        .into_iter()
        .map(comment_response)
        .collect();
    Ok(Json(comments))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<impl IntoResponse> {
    let text = req.comment.trim();
    if text.is_empty() {
        return Err(ApiError::Validation("Comment text is required".into()));
    }

    let pid = post_id.to_string();
    if state.db.get_post(&pid)?.is_none() {
        return Err(ApiError::NotFound("Post"));
    }

    let comment_id = Uuid::new_v4();
    state.db.insert_comment(
        &comment_id.to_string(),
        &pid,
        &claims.sub.to_string(),
        text,
        &now_timestamp(),
    )?;

    let comment = state
        .db
        .get_comment(&comment_id.to_string())?
        .ok_or(ApiError::NotFound("Comment"))?;

    Ok((StatusCode::CREATED, Json(comment_response(comment))))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(Uuid, Uuid)>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let _ = post_id; // validated by path extraction

    let comment = state
        .db
        .get_comment(&comment_id.to_string())?
        .ok_or(ApiError::NotFound("Comment"))?;
    if comment.user_id != claims.sub.to_string() {
        return Err(ApiError::Forbidden);
    }

    state.db.delete_comment(&comment_id.to_string())?;
    Ok(Json(json!({ "message": "Comment deleted" })))
}
