use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use prism_db::models::PostRow;
use prism_types::api::{
    Claims, CreatePostRequest, PostAuthor, PostResponse, ToggleResponse, UpdatePostRequest,
};

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::{now_timestamp, parse_id, parse_timestamp};

fn post_response(row: PostRow) -> PostResponse {
    PostResponse {
        id: parse_id(&row.id),
        author: PostAuthor {
            id: parse_id(&row.created_by),
            username: row.author_username,
            profile_pic: row.author_profile_picture,
        },
        caption: row.caption,
        image_url: row.image_url,
        video_url: row.video_url,
        location: row.location,
        tags: row.tags,
        likes: row.likes,
        saves: row.saves,
        created_at: parse_timestamp(&row.created_at),
    }
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreatePostRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.image_url.is_none() && req.video_url.is_none() {
        return Err(ApiError::Validation("An image or video is required".into()));
    }

    let post_id = Uuid::new_v4();
    state.db.insert_post(
        &post_id.to_string(),
        &claims.sub.to_string(),
        req.caption.as_deref(),
        req.image_url.as_deref(),
        req.video_url.as_deref(),
        req.location.as_deref(),
        req.tags.as_deref(),
        &now_timestamp(),
    )?;

    let post = state
        .db
        .get_post(&post_id.to_string())?
        .ok_or(ApiError::NotFound("Post"))?;

    Ok((StatusCode::CREATED, Json(post_response(post))))
}

pub async fn list_posts(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let posts: Vec<PostResponse> = state
        .db
        .list_posts()?
        .into_iter()
        .map(post_response)
        .collect();
    Ok(Json(posts))
}

/// Posts by users the caller follows, newest first.
pub async fn feed(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let posts: Vec<PostResponse> = state
        .db
        .list_feed_posts(&claims.sub.to_string())?
        .into_iter()
        .map(post_response)
        .collect();
    Ok(Json(posts))
}

pub async fn saved_posts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let posts: Vec<PostResponse> = state
        .db
        .list_saved_posts(&claims.sub.to_string())?
        .into_iter()
        .map(post_response)
        .collect();
    Ok(Json(posts))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let post = state
        .db
        .get_post(&post_id.to_string())?
        .ok_or(ApiError::NotFound("Post"))?;
    Ok(Json(post_response(post)))
}

pub async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdatePostRequest>,
) -> ApiResult<impl IntoResponse> {
    let id = post_id.to_string();
    let post = state.db.get_post(&id)?.ok_or(ApiError::NotFound("Post"))?;
    if post.created_by != claims.sub.to_string() {
        return Err(ApiError::Forbidden);
    }

    state.db.update_post(
        &id,
        req.caption.as_deref(),
        req.location.as_deref(),
        req.tags.as_deref(),
    )?;

    let post = state.db.get_post(&id)?.ok_or(ApiError::NotFound("Post"))?;
    Ok(Json(post_response(post)))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let id = post_id.to_string();
    let post = state.db.get_post(&id)?.ok_or(ApiError::NotFound("Post"))?;
    if post.created_by != claims.sub.to_string() {
        return Err(ApiError::Forbidden);
    }

    // Likes, saves, and comments go with the post, in one transaction.
    state.db.delete_post_cascade(&id)?;

    Ok(Json(json!({ "message": "Post deleted successfully" })))
}

pub async fn toggle_like(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let id = post_id.to_string();
    if state.db.get_post(&id)?.is_none() {
        return Err(ApiError::NotFound("Post"));
    }

    let liked = state.db.toggle_like(&id, &claims.sub.to_string())?;
    let message = if liked { "Post liked" } else { "Post unliked" };
    Ok(Json(ToggleResponse {
        message: message.to_string(),
        liked: Some(liked),
        saved: None,
    }))
}

pub async fn toggle_save(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let id = post_id.to_string();
    if state.db.get_post(&id)?.is_none() {
        return Err(ApiError::NotFound("Post"));
    }

    let saved = state.db.toggle_save(&id, &claims.sub.to_string())?;
    let message = if saved { "Post saved" } else { "Post unsaved" };
    Ok(Json(ToggleResponse {
        message: message.to_string(),
        liked: None,
        saved: Some(saved),
    }))
}
