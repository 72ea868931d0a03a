//! Customer domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A storefront customer account with its points balance.
///
/// The stored password hash never leaves the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub points: i64,
    /// Balance is treated as infinite and never debited.
    pub unlimited: bool,
    pub revision: i64,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a customer.
///
/// Self sign-up must supply a password. Admin-created accounts may omit it,
/// in which case a temporary password is generated and returned once.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: Option<String>,

    #[serde(default)]
    pub admin_create: bool,
}

impl CreateCustomerRequest {
    /// Returns the supplied password if it is not blank.
    pub fn supplied_password(&self) -> Option<&str> {
        self.password
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// Response for a created customer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerResponse {
    #[serde(flatten)]
    pub customer: Customer,

    /// Only present for admin-created accounts without a supplied password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporary_password: Option<String>,
}

/// Request payload for updating a customer.
///
/// Absent optional fields keep their stored value. When `revision` is
/// supplied the update only applies if it matches the stored revision.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerRequest {
    pub id: Uuid,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(custom(function = "shared::validation::validate_points"))]
    pub points: Option<i64>,

    pub unlimited: Option<bool>,

    pub password: Option<String>,

    pub revision: Option<i64>,
}

impl UpdateCustomerRequest {
    /// Returns the new password if one was supplied and is not blank.
    pub fn new_password(&self) -> Option<&str> {
        self.password
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// Response for a customer update.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateCustomerResponse {
    pub success: bool,
    pub customer: Customer,
}

/// Request payload for deleting a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteCustomerRequest {
    pub id: Uuid,
}

/// Request payload for password verification (sign-in).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCustomerRequest {
    pub id: Option<Uuid>,
    pub email: Option<String>,
    #[serde(default)]
    pub password: String,
}

/// How a customer should be looked up for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerLookup {
    ById(Uuid),
    ByEmail(String),
}

impl VerifyCustomerRequest {
    /// Email takes precedence over id when both are supplied.
    pub fn lookup(&self) -> Option<CustomerLookup> {
        match (self.email.as_deref().map(str::trim), self.id) {
            (Some(email), _) if !email.is_empty() => Some(CustomerLookup::ByEmail(
                shared::validation::normalize_email(email),
            )),
            (_, Some(id)) => Some(CustomerLookup::ById(id)),
            _ => None,
        }
    }
}

/// Simple success acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
