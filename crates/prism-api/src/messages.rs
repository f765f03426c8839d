use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use anyhow::anyhow;
use uuid::Uuid;

use prism_db::convo::{MessageStore, conversation_heads, conversation_key, pending_requests};
use prism_db::models::MessageRow;
use prism_types::api::{
    Claims, ConversationActionRequest, ConversationResponse, ConversationUser,
    MessageRequestResponse, MessageResponse, SendMessageRequest,
};

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::{now_timestamp, parse_id, parse_timestamp};

fn message_response(row: MessageRow) -> MessageResponse {
    MessageResponse {
        id: parse_id(&row.id),
        sender_id: parse_id(&row.sender_id),
        receiver_id: parse_id(&row.receiver_id),
        message: row.body,
        is_read: row.is_read,
        conversation_id: row.conversation_id,
        created_at: parse_timestamp(&row.created_at),
    }
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let content = req.content.as_deref().unwrap_or("").trim().to_string();
    let Some(receiver_id) = req.receiver_id else {
        return Err(ApiError::Validation("Receiver ID and content are required".into()));
    };
    if content.is_empty() {
        return Err(ApiError::Validation("Receiver ID and content are required".into()));
    }
    if receiver_id == claims.sub {
        return Err(ApiError::Validation("Cannot message yourself".into()));
    }

    let sender = claims.sub.to_string();
    let receiver = receiver_id.to_string();
    if state.db.get_user_by_id(&receiver)?.is_none() {
        return Err(ApiError::NotFound("User"));
    }

    let row = MessageRow {
        id: Uuid::new_v4().to_string(),
        conversation_id: conversation_key(&sender, &receiver),
        sender_id: sender,
        receiver_id: receiver,
        body: content,
        is_read: false,
        created_at: now_timestamp(),
    };

    // Run blocking DB insert off the async runtime
    let db = state.clone();
    let insert_row = row.clone();
    tokio::task::spawn_blocking(move || db.db.insert_message(&insert_row))
        .await
        .map_err(|e| ApiError::Internal(anyhow!("spawn_blocking join error: {e}")))??;

    Ok((StatusCode::CREATED, Json(message_response(row))))
}

/// One entry per conversation involving the caller, latest message first.
pub async fn get_conversations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let user = claims.sub.to_string();

    let resolved = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let messages = db.db.find_messages_by_user(&user)?;
        let heads = conversation_heads(&messages, &user);
        // A vanished counterpart yields null profile fields, not a failure.
        heads
            .into_iter()
            .map(|head| {
                let other = db.db.get_user_by_id(&head.other_user_id)?;
                Ok((head, other))
            })
            .collect::<anyhow::Result<Vec<_>>>()
    })
    .await
    .map_err(|e| ApiError::Internal(anyhow!("spawn_blocking join error: {e}")))??;

    let conversations: Vec<ConversationResponse> = resolved
        .into_iter()
        .map(|(head, other)| ConversationResponse {
            conversation_id: head.conversation_id,
            other_user: ConversationUser {
                id: parse_id(&head.other_user_id),
                username: other.as_ref().map(|u| u.username.clone()),
                profile_pic: other.and_then(|u| u.profile_picture),
            },
            last_message: head.last.body,
            last_message_at: parse_timestamp(&head.last.created_at),
            unread_count: head.unread as u32,
        })
        .collect();

    Ok(Json(conversations))
}

/// Conversations where the caller has received messages but never replied.
pub async fn get_message_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let user = claims.sub.to_string();

    let resolved = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let messages = db.db.find_messages_by_user(&user)?;
        pending_requests(&messages, &user)
            .into_iter()
            .map(|msg| {
                let sender = db.db.get_user_by_id(&msg.sender_id)?;
                Ok((msg, sender))
            })
            .collect::<anyhow::Result<Vec<_>>>()
    })
    .await
    .map_err(|e| ApiError::Internal(anyhow!("spawn_blocking join error: {e}")))??;

    let requests: Vec<MessageRequestResponse> = resolved
        .into_iter()
        .map(|(msg, sender)| MessageRequestResponse {
            id: parse_id(&msg.id),
            sender_id: parse_id(&msg.sender_id),
            sender_username: sender.as_ref().map(|u| u.username.clone()),
            sender_profile_picture: sender.and_then(|u| u.profile_picture),
            message: msg.body,
            conversation_id: msg.conversation_id,
            created_at: parse_timestamp(&msg.created_at),
        })
        .collect();

    Ok(Json(requests))
}

pub async fn get_conversation_messages(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let messages = state.db.find_messages_by_conversation(&conversation_id)?;

    // Participants only; an empty conversation is an empty list for anyone.
    let caller = claims.sub.to_string();
    let participant = messages
        .iter()
        .any(|m| m.sender_id == caller || m.receiver_id == caller);
    if !messages.is_empty() && !participant {
        return Err(ApiError::Forbidden);
    }

    let messages: Vec<MessageResponse> = messages.into_iter().map(message_response).collect();
    Ok(Json(messages))
}

/// Accept marks the conversation read. Decline deletes the conversation's
/// messages, but only while it is still a pending request for the caller.
pub async fn update_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ConversationActionRequest>,
) -> ApiResult<impl IntoResponse> {
    let caller = claims.sub.to_string();

    match req.action.as_str() {
        "accept" => {
            state.db.update_read_flag(&conversation_id, &caller)?;
            Ok(Json(serde_json::json!({ "message": "Request accepted" })))
        }
        "decline" => {
            let messages = state.db.find_messages_by_conversation(&conversation_id)?;
            let received = messages.iter().any(|m| m.receiver_id == caller);
            let sent = messages.iter().any(|m| m.sender_id == caller);

            if !messages.is_empty() && !received && !sent {
                return Err(ApiError::Forbidden);
            }
            if !received || sent {
                return Err(ApiError::Validation(
                    "Conversation is not a pending request".into(),
                ));
            }

            state.db.delete_conversation(&conversation_id)?;
            Ok(Json(serde_json::json!({ "message": "Request declined" })))
        }
        _ => Err(ApiError::Validation("Invalid action".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use prism_db::Database;

    use crate::auth::AppStateInner;

    fn test_state() -> AppState {
        let db = Database::open_in_memory().unwrap();
        Arc::new(AppStateInner {
            db,
            jwt_secret: "test-secret".into(),
        })
    }

    fn add_user(state: &AppState, id: Uuid, name: &str) {
        state
            .db
            .create_user(&id.to_string(), name, &format!("{name}@example.com"), "hash")
            .unwrap();
    }

    fn claims_for(id: Uuid, name: &str) -> Claims {
        Claims {
            sub: id,
            username: name.to_string(),
            email: format!("{name}@example.com"),
            exp: 0,
        }
    }

    fn send_req(receiver: Option<Uuid>, content: Option<&str>) -> SendMessageRequest {
        SendMessageRequest {
            receiver_id: receiver,
            content: content.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn missing_or_blank_fields_are_rejected() {
        let state = test_state();
        let amy = Uuid::new_v4();
        let ben = Uuid::new_v4();
        add_user(&state, amy, "amy");
        add_user(&state, ben, "ben");
        let claims = claims_for(amy, "amy");

        // Missing receiver, missing content, and whitespace-only content
        // all come back as a validation error, never an extractor rejection.
        for req in [
            send_req(None, Some("hi")),
            send_req(Some(ben), None),
            send_req(Some(ben), Some("   ")),
        ] {
            let res = send_message(
                State(state.clone()),
                Extension(claims.clone()),
                Json(req),
            )
            .await;
            assert!(matches!(res, Err(ApiError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn self_send_is_rejected() {
        let state = test_state();
        let amy = Uuid::new_v4();
        add_user(&state, amy, "amy");

        let res = send_message(
            State(state.clone()),
            Extension(claims_for(amy, "amy")),
            Json(send_req(Some(amy), Some("note to self"))),
        )
        .await;
        assert!(matches!(res, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn unknown_receiver_is_not_found() {
        let state = test_state();
        let amy = Uuid::new_v4();
        add_user(&state, amy, "amy");

        let res = send_message(
            State(state.clone()),
            Extension(claims_for(amy, "amy")),
            Json(send_req(Some(Uuid::new_v4()), Some("hello?"))),
        )
        .await;
        assert!(matches!(res, Err(ApiError::NotFound("User"))));
    }

    #[tokio::test]
    async fn sent_message_lands_on_the_pair_key() {
        let state = test_state();
        let amy = Uuid::new_v4();
        let ben = Uuid::new_v4();
        add_user(&state, amy, "amy");
        add_user(&state, ben, "ben");

        let res = send_message(
            State(state.clone()),
            Extension(claims_for(amy, "amy")),
            Json(send_req(Some(ben), Some("  hi  "))),
        )
        .await;
        assert!(res.is_ok());

        let key = conversation_key(&amy.to_string(), &ben.to_string());
        let msgs = state.db.find_messages_by_conversation(&key).unwrap();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].body, "hi");
        assert!(!msgs[0].is_read);
    }
}
