//! Entity models: Topping, Order (with embedded OrderItem), and the external Customer.

mod customer;
mod order;
mod topping;

pub use customer::Customer;
pub use order::{Order, OrderItem};
pub use topping::Topping;

use crate::validation::Rules;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A persistable entity: a collection name for the connector plus the
/// validation rules applied to incoming request bodies.
pub trait Model: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection (table) name the connector stores these documents under.
    const COLLECTION: &'static str;

    /// Per-field validation rules, keyed by wire field name.
    fn rules() -> Rules;
}
