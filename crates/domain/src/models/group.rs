//! Recipient groups used to address messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A named set of customers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub member_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a group.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "At least one member is required"))]
    pub member_ids: Vec<Uuid>,
}

impl CreateGroupRequest {
    /// Member ids without duplicates, in submitted order.
    pub fn unique_member_ids(&self) -> Vec<Uuid> {
        let mut seen = std::collections::HashSet::new();
        self.member_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

/// Request payload for deleting a group.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteGroupRequest {
    pub id: Uuid,
}
