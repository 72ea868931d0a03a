//! Order domain models.

use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Open,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::Completed => "completed",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(OrderStatus::Open),
            "completed" => Ok(OrderStatus::Completed),
            _ => Err(format!("Invalid order status: {}", s)),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A line of an order with the name and price captured at order time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    pub sku: String,
    pub name: String,
    pub qty: i64,
    pub price: i64,
}

impl OrderItem {
    pub fn line_total(&self) -> Option<i64> {
        self.price.checked_mul(self.qty)
    }
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub at: DateTime<Utc>,
    pub person_name: String,
    pub customer_id: Option<Uuid>,
    pub email: String,
    pub note: String,
    pub admin_note: String,
    pub items: Vec<OrderItem>,
    pub total: i64,
    pub status: OrderStatus,
    pub revision: i64,
}

/// One order in an order collection save.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderInput {
    #[validate(length(min = 1, max = 64, message = "Order id must be between 1 and 64 characters"))]
    pub id: String,

    pub at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub person_name: String,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub customer_id: Option<Uuid>,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub note: String,

    #[serde(default)]
    pub admin_note: String,

    #[serde(default)]
    pub items: Vec<OrderItem>,

    #[validate(range(min = 0, message = "Total must not be negative"))]
    pub total: i64,

    #[serde(default)]
    pub status: OrderStatus,

    pub revision: Option<i64>,
}

/// Admin edit of a single order.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub status: Option<OrderStatus>,

    #[validate(length(max = 2000, message = "Admin note must be at most 2000 characters"))]
    pub admin_note: Option<String>,

    pub revision: Option<i64>,
}

/// A cart line submitted at checkout. Prices are never taken from the client.
#[derive(Debug, Clone, Deserialize)]
pub struct CartLine {
    pub sku: String,
    pub qty: i64,
}

/// Request payload for placing an order.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub customer_id: Uuid,

    #[serde(default)]
    pub items: Vec<CartLine>,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Note must be at most 2000 characters"))]
    pub note: String,
}

/// Result of a successful checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order: Order,
    /// Customer balance after the debit.
    pub points: i64,
}

/// Generates a short human-readable order id such as `ORD-7QX2KD`.
pub fn generate_order_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    format!("ORD-{}", suffix)
}

/// Treats `""` (sent by older clients for guest orders) as no customer.
fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Uuid::parse_str(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_status_parse() {
        assert_eq!("open".parse::<OrderStatus>().unwrap(), OrderStatus::Open);
        assert_eq!(
            "Completed".parse::<OrderStatus>().unwrap(),
            OrderStatus::Completed
        );
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_generate_order_id_format() {
        let id = generate_order_id();
        assert!(id.starts_with("ORD-"));
        assert_eq!(id.len(), 10);
        assert!(id[4..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_order_input_empty_customer_id() {
        let input: OrderInput = serde_json::from_value(json!({
            "id": "ORD-ABC123",
            "personName": "Guest",
            "customerId": "",
            "items": [{"sku": "QP-CAP-001", "name": "Cap", "qty": 1, "price": 15}],
            "total": 15,
            "status": "open"
        }))
        .unwrap();
        assert_eq!(input.customer_id, None);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_order_input_customer_id_parsed() {
        let id = Uuid::new_v4();
        let input: OrderInput = serde_json::from_value(json!({
            "id": "ORD-ABC123",
            "customerId": id.to_string(),
            "total": 0
        }))
        .unwrap();
        assert_eq!(input.customer_id, Some(id));
        assert_eq!(input.status, OrderStatus::Open);
        assert!(input.items.is_empty());
    }

    #[test]
    fn test_order_input_invalid_customer_id() {
        let result: Result<OrderInput, _> = serde_json::from_value(json!({
            "id": "ORD-ABC123",
            "customerId": "not-a-uuid",
            "total": 0
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_order_serializes_camel_case() {
        let order = Order {
            id: "ORD-ABC123".into(),
            at: Utc::now(),
            person_name: "Amina".into(),
            customer_id: None,
            email: String::new(),
            note: "gift wrap".into(),
            admin_note: String::new(),
            items: vec![],
            total: 0,
            status: OrderStatus::Completed,
            revision: 1,
        };
        let value = serde_json::to_value(order).unwrap();
        assert_eq!(value["personName"], "Amina");
        assert_eq!(value["adminNote"], "");
        assert_eq!(value["status"], "completed");
    }

    #[test]
    fn test_line_total_overflow() {
        let item = OrderItem {
            sku: "X".into(),
            name: "X".into(),
            qty: i64::MAX,
            price: 2,
        };
        assert_eq!(item.line_total(), None);
    }
}
