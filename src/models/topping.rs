use crate::models::Model;
use crate::validation::{Rules, ValidationRule};
use serde::{Deserialize, Serialize};

/// A pizza topping available for ordering. Names must be unique among stored
/// toppings; the check happens at creation time only.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Model for Topping {
    const COLLECTION: &'static str = "toppings";

    fn rules() -> Rules {
        Rules::from([
            (
                "name",
                ValidationRule {
                    required: true,
                    min_length: Some(1),
                    ..Default::default()
                },
            ),
            (
                "price",
                ValidationRule {
                    required: true,
                    minimum: Some(0.0),
                    ..Default::default()
                },
            ),
        ])
    }
}
