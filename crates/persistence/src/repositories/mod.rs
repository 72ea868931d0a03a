//! Repository implementations for database operations.

pub mod customer;
pub mod group;
pub mod message;
pub mod order;
pub mod product;

pub use customer::{CustomerRepository, CustomerUpdate};
pub use group::GroupRepository;
pub use message::MessageRepository;
pub use order::{CheckoutOutcome, NewOrder, OrderRepository};
pub use product::ProductRepository;

/// Result of a collection save (products, orders).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// All rows were written and rows absent from the collection removed.
    Saved { upserted: u64, removed: u64 },
    /// A row's revision no longer matched; nothing was written.
    Stale { key: String },
}

/// Result of a single-row revision-checked update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome<T> {
    Updated(T),
    NotFound,
    Stale,
}
