//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod customer;
pub mod group;
pub mod message;
pub mod order;
pub mod product;

pub use customer::CustomerEntity;
pub use group::GroupEntity;
pub use message::MessageEntity;
pub use order::{OrderEntity, OrderStatusDb};
pub use product::{ProductEntity, ProductStatusDb};
