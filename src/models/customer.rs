use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Customer record owned by the remote customer service. Anything beyond
/// `id` and `name` is kept as-is since that service controls the shape.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
