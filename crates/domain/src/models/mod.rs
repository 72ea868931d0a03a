//! Domain models for the QurtubloX Store.

pub mod customer;
pub mod group;
pub mod message;
pub mod order;
pub mod product;

pub use customer::Customer;
pub use group::Group;
pub use message::Message;
pub use order::{Order, OrderItem, OrderStatus};
pub use product::{Product, ProductStatus};
