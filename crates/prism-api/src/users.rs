use std::collections::HashSet;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use prism_types::api::{
    Claims, FollowResponse, ProfilePost, ProfileResponse, UpdateProfileRequest, UserListEntry,
};

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::parse_id;

/// Everyone except the caller, with the caller's follow state attached.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let caller = claims.sub.to_string();
    let following: HashSet<String> = state.db.get_following_ids(&caller)?.into_iter().collect();

    let users: Vec<UserListEntry> = state
        .db
        .list_users()?
        .into_iter()
        .filter(|u| u.id != caller)
        .map(|u| UserListEntry {
            id: parse_id(&u.id),
            is_following: following.contains(&u.id),
            username: u.username,
        })
        .collect();

    Ok(Json(users))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let id = user_id.to_string();
    let user = state.db.get_user_by_id(&id)?.ok_or(ApiError::NotFound("User"))?;

    let posts: Vec<ProfilePost> = state
        .db
        .list_posts_by_user(&id)?
        .into_iter()
        .map(|p| ProfilePost {
            id: parse_id(&p.id),
            image_url: p.image_url,
            video_url: p.video_url,
            likes: p.likes,
            saves: p.saves,
        })
        .collect();

    let following: Vec<Uuid> = state
        .db
        .get_following_ids(&id)?
        .iter()
        .map(|s| parse_id(s))
        .collect();
    let followers: Vec<Uuid> = state
        .db
        .get_follower_ids(&id)?
        .iter()
        .map(|s| parse_id(s))
        .collect();

    Ok(Json(ProfileResponse {
        id: user_id,
        username: user.username,
        bio: user.bio,
        profile_pic: user.profile_picture,
        followers_count: followers.len(),
        following_count: following.len(),
        following,
        followers,
        posts,
    }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    // Users only edit their own profile.
    if claims.sub != user_id {
        return Err(ApiError::Forbidden);
    }

    let username = req.username.trim();
    if username.is_empty() {
        return Err(ApiError::Validation("Username is required".into()));
    }
    let bio = req.bio.as_deref().unwrap_or("").trim().to_string();

    let updated = state.db.update_user_profile(
        &user_id.to_string(),
        username,
        &bio,
        req.profile_pic.as_deref(),
    )?;
    if !updated {
        return Err(ApiError::NotFound("User"));
    }

    let user = state
        .db
        .get_user_by_id(&user_id.to_string())?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "user": {
            "id": user_id,
            "username": user.username,
            "bio": user.bio,
            "profilePic": user.profile_picture,
        },
    })))
}

pub async fn toggle_follow(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    if claims.sub == user_id {
        return Err(ApiError::Validation("Cannot follow yourself".into()));
    }

    let target = user_id.to_string();
    if state.db.get_user_by_id(&target)?.is_none() {
        return Err(ApiError::NotFound("User"));
    }

    let is_following = state.db.toggle_follow(&claims.sub.to_string(), &target)?;

    let message = if is_following {
        "Followed successfully"
    } else {
        "Unfollowed successfully"
    };
    Ok(Json(FollowResponse {
        message: message.to_string(),
        is_following,
    }))
}
