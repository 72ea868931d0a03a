//! Admin-to-customer broadcast messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Fallback recipient name when the customer row is gone.
pub const DEFAULT_RECIPIENT_NAME: &str = "Customer";

/// A message delivered to one customer.
///
/// Serialized with snake_case keys; the customer inbox reads rows in that shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Message {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Query parameters for listing messages.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesQuery {
    pub customer_id: Option<Uuid>,
}

/// Request payload for sending a message to several customers.
///
/// Recipients are the union of `customerIds` and the members of `groupId`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub customer_ids: Vec<Uuid>,

    pub group_id: Option<Uuid>,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    #[validate(length(max = 5000, message = "Message must be at most 5000 characters"))]
    pub message: String,
}

impl SendMessageRequest {
    pub fn has_recipients(&self) -> bool {
        !self.customer_ids.is_empty() || self.group_id.is_some()
    }
}

/// Request payload for marking a message read or unread.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMessageRequest {
    pub id: Uuid,
    #[serde(default = "default_read")]
    pub read: bool,
}

fn default_read() -> bool {
    true
}

/// Merges explicit recipients with group members, keeping first-seen order.
pub fn merge_recipients(explicit: &[Uuid], group_members: &[Uuid]) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    explicit
        .iter()
        .chain(group_members.iter())
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}
