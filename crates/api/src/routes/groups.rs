//! Recipient group routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::customer::SuccessResponse;
use domain::models::group::{CreateGroupRequest, DeleteGroupRequest, Group};
use persistence::db::is_undefined_table;
use persistence::repositories::GroupRepository;
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AppJson;

/// List groups with their member ids, newest first.
///
/// GET /api/groups
pub async fn list_groups(State(state): State<AppState>) -> Result<Json<Vec<Group>>, ApiError> {
    let repo = GroupRepository::new(state.pool.clone());

    match repo.list().await {
        Ok(groups) => Ok(Json(groups.into_iter().map(Group::from).collect())),
        Err(e) if is_undefined_table(&e) => {
            warn!("groups table missing, returning empty list");
            Ok(Json(Vec::new()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Create a group.
///
/// POST /api/groups
pub async fn create_group(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    request.validate()?;

    let repo = GroupRepository::new(state.pool.clone());
    let members = request.unique_member_ids();
    let group = repo
        .create(request.name.trim(), &members)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::NotFound(_) => ApiError::NotFound("One or more members do not exist".into()),
            other => other,
        })?;

    info!(
        group_id = %group.id,
        member_count = group.member_ids.len(),
        "Group created"
    );

    Ok((StatusCode::CREATED, Json(group.into())))
}

/// Delete a group. Its customers and their messages are not touched.
///
/// DELETE /api/groups
pub async fn delete_group(
    State(state): State<AppState>,
    AppJson(request): AppJson<DeleteGroupRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let repo = GroupRepository::new(state.pool.clone());

    if repo.delete(request.id).await? == 0 {
        return Err(ApiError::NotFound("Group not found".into()));
    }

    info!(group_id = %request.id, "Group deleted");
    Ok(Json(SuccessResponse::ok()))
}
