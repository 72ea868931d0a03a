//! Admin-to-customer message routes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use domain::models::message::{
    merge_recipients, ListMessagesQuery, Message, SendMessageRequest, UpdateMessageRequest,
    DEFAULT_RECIPIENT_NAME,
};
use persistence::db::is_undefined_table;
use persistence::repositories::{CustomerRepository, GroupRepository, MessageRepository};
use std::collections::HashMap;
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AppJson;
use crate::middleware::metrics::record_messages_sent;

/// List messages, newest first.
///
/// GET /api/messages?customerId=<uuid>
pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let repo = MessageRepository::new(state.pool.clone());

    match repo.list(query.customer_id).await {
        Ok(messages) => Ok(Json(messages.into_iter().map(Message::from).collect())),
        Err(e) if is_undefined_table(&e) => {
            warn!("messages table missing, returning empty list");
            Ok(Json(Vec::new()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Send a message to customers and/or the members of a group.
///
/// POST /api/messages
///
/// One row is written per distinct recipient. Names are looked up here;
/// ids without a customer row get the generic recipient name.
pub async fn send_message(
    State(state): State<AppState>,
    AppJson(request): AppJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<Vec<Message>>), ApiError> {
    request.validate()?;
    if !request.has_recipients() {
        return Err(ApiError::Validation(
            "customerIds or groupId is required".into(),
        ));
    }

    let group_members = match request.group_id {
        Some(group_id) => GroupRepository::new(state.pool.clone())
            .find_by_id(group_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Group not found".into()))?
            .member_ids,
        None => Vec::new(),
    };

    let recipient_ids = merge_recipients(&request.customer_ids, &group_members);
    if recipient_ids.is_empty() {
        return Err(ApiError::Validation("No recipients selected".into()));
    }

    let names: HashMap<_, _> = CustomerRepository::new(state.pool.clone())
        .names_for(&recipient_ids)
        .await?
        .into_iter()
        .collect();
    let recipients: Vec<(uuid::Uuid, String)> = recipient_ids
        .into_iter()
        .map(|id| {
            let name = names
                .get(&id)
                .cloned()
                .unwrap_or_else(|| DEFAULT_RECIPIENT_NAME.to_string());
            (id, name)
        })
        .collect();

    let created = MessageRepository::new(state.pool.clone())
        .create_many(&recipients, request.message.trim())
        .await?;

    record_messages_sent(created.len());
    info!(
        recipient_count = created.len(),
        group_id = ?request.group_id,
        "Message sent"
    );

    Ok((
        StatusCode::CREATED,
        Json(created.into_iter().map(Message::from).collect()),
    ))
}

/// Mark a message read (or unread).
///
/// PUT /api/messages
pub async fn update_message(
    State(state): State<AppState>,
    AppJson(request): AppJson<UpdateMessageRequest>,
) -> Result<Json<Message>, ApiError> {
    let repo = MessageRepository::new(state.pool.clone());

    let message = repo
        .set_read(request.id, request.read)
        .await?
        .ok_or_else(|| ApiError::NotFound("Message not found".into()))?;

    info!(message_id = %message.id, read = message.read, "Message updated");
    Ok(Json(message.into()))
}
