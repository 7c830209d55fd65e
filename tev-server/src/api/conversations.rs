//! Conversation and message endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use tev_common::db::conversations;
use tev_common::db::models::{Conversation, ConversationMessage};
use tev_common::Error;

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantNameQuery {
    pub participant_name: Option<String>,
}

/// GET /api/conversations/:blog
pub async fn list_conversations(
    State(state): State<AppState>,
    Path(blog): Path<String>,
) -> ApiResult<Json<Vec<Conversation>>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(conversations::list_for_blog(&mut conn, &blog).await?))
}

/// POST /api/conversations/:blog
pub async fn create_conversation(
    State(state): State<AppState>,
    Path(blog): Path<String>,
    Json(mut convo): Json<Conversation>,
) -> ApiResult<(StatusCode, Json<Conversation>)> {
    convo.blog = blog;
    convo.num_messages = 0;
    let mut conn = state.db.acquire().await?;
    let created = conversations::insert(&mut conn, &convo).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/conversations/:blog
pub async fn delete_conversations(
    State(state): State<AppState>,
    Path(blog): Path<String>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db.acquire().await?;
    conversations::delete_all_for_blog(&mut conn, &blog).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/conversations/:blog/hidden
pub async fn hidden_conversations(
    State(state): State<AppState>,
    Path(blog): Path<String>,
) -> ApiResult<Json<Vec<Conversation>>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(conversations::list_by_hidden(&mut conn, &blog, true).await?))
}

/// GET /api/conversations/:blog/unhidden
pub async fn unhidden_conversations(
    State(state): State<AppState>,
    Path(blog): Path<String>,
) -> ApiResult<Json<Vec<Conversation>>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(conversations::list_by_hidden(&mut conn, &blog, false).await?))
}

/// PUT /api/conversations/:blog/unignoreAll
pub async fn unignore_all(
    State(state): State<AppState>,
    Path(blog): Path<String>,
) -> ApiResult<Json<u64>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(conversations::unhide_all(&mut conn, &blog).await?))
}

/// GET /api/conversations/:blog/byParticipant/:participant
pub async fn by_participant(
    State(state): State<AppState>,
    Path((blog, participant)): Path<(String, String)>,
) -> ApiResult<Json<Conversation>> {
    let mut conn = state.db.acquire().await?;
    let convo = conversations::find_by_participant(&mut conn, &blog, &participant)
        .await?
        .ok_or_else(|| Error::not_found("Conversation", "participant", &participant))?;
    Ok(Json(convo))
}

/// PUT /api/conversations/:blog/byParticipant/:participant/ignore
pub async fn ignore_participant(
    State(state): State<AppState>,
    Path((blog, participant)): Path<(String, String)>,
) -> ApiResult<Json<Conversation>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(
        conversations::set_hidden_for_participant(&mut conn, &blog, &participant, true).await?,
    ))
}

/// PUT /api/conversations/:blog/byParticipant/:participant/unignore
pub async fn unignore_participant(
    State(state): State<AppState>,
    Path((blog, participant)): Path<(String, String)>,
) -> ApiResult<Json<Conversation>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(
        conversations::set_hidden_for_participant(&mut conn, &blog, &participant, false).await?,
    ))
}

/// GET /api/conversations/:blog/byParticipantId/:participant_id?participantName=
///
/// Older exports have no participant ids, so an id that does not pick
/// exactly one conversation falls back to the participant name.
pub async fn by_participant_id(
    State(state): State<AppState>,
    Path((blog, participant_id)): Path<(String, String)>,
    Query(query): Query<ParticipantNameQuery>,
) -> ApiResult<Json<Conversation>> {
    let mut conn = state.db.acquire().await?;
    let mut matches = conversations::list_by_participant_id(&mut conn, &blog, &participant_id).await?;
    if matches.len() == 1 {
        if let Some(convo) = matches.pop() {
            return Ok(Json(convo));
        }
    }

    let name = query
        .participant_name
        .ok_or_else(|| Error::not_found("Conversation", "participant id", &participant_id))?;
    let convo = conversations::find_by_participant(&mut conn, &blog, &name)
        .await?
        .ok_or_else(|| Error::not_found("Conversation", "participant", &name))?;
    Ok(Json(convo))
}

/// GET /api/conversations/:blog/:id
pub async fn get_conversation(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, i64)>,
) -> ApiResult<Json<Conversation>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(conversations::get(&mut conn, &blog, id).await?))
}

/// PUT /api/conversations/:blog/:id
pub async fn update_conversation(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, i64)>,
    Json(mut convo): Json<Conversation>,
) -> ApiResult<Json<Conversation>> {
    let mut conn = state.db.acquire().await?;
    let stored = conversations::get(&mut conn, &blog, id).await?;
    convo.id = stored.id;
    convo.blog = stored.blog;
    convo.num_messages = stored.num_messages;
    conversations::update(&mut conn, &convo).await?;
    Ok(Json(convo))
}

/// DELETE /api/conversations/:blog/:id
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, i64)>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db.acquire().await?;
    conversations::delete(&mut conn, &blog, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/conversations/:blog/:id/messages
pub async fn conversation_messages(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, i64)>,
) -> ApiResult<Json<Vec<ConversationMessage>>> {
    let mut conn = state.db.acquire().await?;
    conversations::get(&mut conn, &blog, id).await?;
    Ok(Json(conversations::messages_for_conversation(&mut conn, id).await?))
}

/// POST /api/conversations/:blog/:id/messages
pub async fn add_message(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, i64)>,
    Json(mut message): Json<ConversationMessage>,
) -> ApiResult<(StatusCode, Json<ConversationMessage>)> {
    let mut tx = state.db.begin().await?;
    match conversations::get(&mut tx, &blog, id).await {
        Ok(_) => {}
        Err(Error::NotFound { .. }) => {
            return Err(Error::InvalidConvoParent {
                conversation_id: id,
                blog,
            }
            .into());
        }
        Err(e) => return Err(e.into()),
    }

    message.conversation_id = id;
    let created = conversations::insert_message(&mut tx, &message).await?;
    conversations::refresh_message_count(&mut tx, id).await?;
    tx.commit().await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/conversations/:blog/messages
pub async fn blog_messages(
    State(state): State<AppState>,
    Path(blog): Path<String>,
) -> ApiResult<Json<Vec<ConversationMessage>>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(conversations::messages_for_blog(&mut conn, &blog).await?))
}

/// DELETE /api/conversations/:blog/messages
pub async fn delete_blog_messages(
    State(state): State<AppState>,
    Path(blog): Path<String>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db.acquire().await?;
    conversations::delete_messages_for_blog(&mut conn, &blog).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/conversations/:blog/messages/:id
pub async fn update_message(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, i64)>,
    Json(mut message): Json<ConversationMessage>,
) -> ApiResult<Json<ConversationMessage>> {
    let mut conn = state.db.acquire().await?;
    let stored = conversations::get_message(&mut conn, &blog, id).await?;
    message.id = stored.id;
    message.conversation_id = stored.conversation_id;
    conversations::update_message(&mut conn, &message).await?;
    Ok(Json(message))
}

/// DELETE /api/conversations/:blog/messages/:id
pub async fn delete_message(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, i64)>,
) -> ApiResult<StatusCode> {
    let mut tx = state.db.begin().await?;
    let stored = conversations::get_message(&mut tx, &blog, id).await?;
    conversations::delete_message(&mut tx, id).await?;
    conversations::refresh_message_count(&mut tx, stored.conversation_id).await?;
    tx.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn conversation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/conversations/:blog",
            get(list_conversations)
                .post(create_conversation)
                .delete(delete_conversations),
        )
        .route("/api/conversations/:blog/hidden", get(hidden_conversations))
        .route("/api/conversations/:blog/unhidden", get(unhidden_conversations))
        .route("/api/conversations/:blog/unignoreAll", put(unignore_all))
        .route(
            "/api/conversations/:blog/byParticipant/:participant",
            get(by_participant),
        )
        .route(
            "/api/conversations/:blog/byParticipant/:participant/ignore",
            put(ignore_participant),
        )
        .route(
            "/api/conversations/:blog/byParticipant/:participant/unignore",
            put(unignore_participant),
        )
        .route(
            "/api/conversations/:blog/byParticipantId/:participant_id",
            get(by_participant_id),
        )
        .route(
            "/api/conversations/:blog/messages",
            get(blog_messages).delete(delete_blog_messages),
        )
        .route(
            "/api/conversations/:blog/messages/:id",
            put(update_message).delete(delete_message),
        )
        .route(
            "/api/conversations/:blog/:id",
            get(get_conversation)
                .put(update_conversation)
                .delete(delete_conversation),
        )
        .route(
            "/api/conversations/:blog/:id/messages",
            get(conversation_messages).post(add_message),
        )
}
