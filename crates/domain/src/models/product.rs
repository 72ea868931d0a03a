//! Product catalogue models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Placeholder image used when a product has no image URL.
pub const PLACEHOLDER_IMAGE_URL: &str = "/placeholder.svg?height=400&width=400";

/// Availability of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    InStock,
    OutOfStock,
    ComingSoon,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::InStock => "in_stock",
            ProductStatus::OutOfStock => "out_of_stock",
            ProductStatus::ComingSoon => "coming_soon",
        }
    }

    /// Only in-stock products can be ordered.
    pub fn is_orderable(&self) -> bool {
        matches!(self, ProductStatus::InStock)
    }
}

impl FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_stock" => Ok(ProductStatus::InStock),
            "out_of_stock" => Ok(ProductStatus::OutOfStock),
            "coming_soon" => Ok(ProductStatus::ComingSoon),
            _ => Err(format!("Invalid product status: {}", s)),
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A product in the storefront catalogue. The SKU is the primary key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub sku: String,
    pub name: String,
    /// Price in points.
    pub price: i64,
    #[serde(rename = "desc")]
    pub description: String,
    pub status: ProductStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Absent for built-in default products that were never stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<i64>,
}

/// One product in a catalogue save.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[validate(length(min = 1, max = 64, message = "SKU must be between 1 and 64 characters"))]
    pub sku: String,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub name: String,

    #[validate(custom(function = "shared::validation::validate_price"))]
    pub price: i64,

    #[serde(default, rename = "desc")]
    pub description: String,

    #[serde(default)]
    pub status: ProductStatus,

    pub image_url: Option<String>,

    /// Revision the client last saw; enables the stale-write check.
    pub revision: Option<i64>,
}

/// The built-in catalogue served while no products are stored.
pub fn default_products() -> Vec<Product> {
    vec![
        Product {
            sku: "QP-SHIRT-001".into(),
            name: "QurtubloX T-Shirt".into(),
            price: 25,
            description: "Official QurtubloX merchandise - premium cotton t-shirt".into(),
            status: ProductStatus::InStock,
            image_url: None,
            revision: None,
        },
        Product {
            sku: "QP-HOODIE-001".into(),
            name: "QurtubloX Hoodie".into(),
            price: 45,
            description: "Warm and comfortable hoodie with QurtubloX logo".into(),
            status: ProductStatus::InStock,
            image_url: None,
            revision: None,
        },
        Product {
            sku: "QP-CAP-001".into(),
            name: "QurtubloX Cap".into(),
            price: 15,
            description: "Stylish cap representing the movement".into(),
            status: ProductStatus::ComingSoon,
            image_url: None,
            revision: None,
        },
    ]
}
