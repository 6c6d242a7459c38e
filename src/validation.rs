//! Request validation from per-model rules.

use crate::error::AppError;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Per-field rules keyed by wire field name.
pub type Rules = HashMap<&'static str, ValidationRule>;

#[derive(Clone, Debug, Default)]
pub struct ValidationRule {
    pub required: bool,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub pattern: Option<&'static str>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a full body. All required fields must be present and non-null.
    pub fn validate(body: &Map<String, Value>, rules: &Rules) -> Result<(), AppError> {
        for (field, rule) in rules {
            let val = body.get(*field);
            if rule.required && (val.is_none() || val == Some(&Value::Null)) {
                return Err(AppError::Validation(format!("{} is required", field)));
            }
            if let Some(v) = val {
                validate_field(field, v, rule)?;
            }
        }
        Ok(())
    }

    /// Validate only the fields present in body (for PATCH). Required is not enforced for missing fields.
    pub fn validate_partial(body: &Map<String, Value>, rules: &Rules) -> Result<(), AppError> {
        for (field, v) in body {
            if let Some(rule) = rules.get(field.as_str()) {
                validate_field(field, v, rule)?;
            }
        }
        Ok(())
    }
}

fn validate_field(field: &str, v: &Value, rule: &ValidationRule) -> Result<(), AppError> {
    if v.is_null() {
        return Ok(());
    }
    if let Some(min) = rule.min_length {
        if let Some(s) = v.as_str() {
            if s.len() < min as usize {
                return Err(AppError::Validation(format!(
                    "{} must be at least {} characters",
                    field, min
                )));
            }
        }
    }
    if let Some(max) = rule.max_length {
        if let Some(s) = v.as_str() {
            if s.len() > max as usize {
                return Err(AppError::Validation(format!(
                    "{} must be at most {} characters",
                    field, max
                )));
            }
        }
    }
    if let Some(pattern) = rule.pattern {
        let re = Regex::new(pattern)
            .map_err(|_| AppError::Validation(format!("invalid pattern for {}", field)))?;
        if let Some(s) = v.as_str() {
            if !re.is_match(s) {
                return Err(AppError::Validation(format!(
                    "{} does not match required pattern",
                    field
                )));
            }
        }
    }
    if let Some(min) = rule.minimum {
        if let Some(n) = v.as_f64() {
            if n < min {
                return Err(AppError::Validation(format!("{} must be at least {}", field, min)));
            }
        }
    }
    if let Some(max) = rule.maximum {
        if let Some(n) = v.as_f64() {
            if n > max {
                return Err(AppError::Validation(format!("{} must be at most {}", field, max)));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

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

    fn body(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn missing_required_field_fails() {
        let b = body(json!({ "price": 2.5 }));
        let err = RequestValidator::validate(&b, &rules()).unwrap_err();
        assert!(err.to_string().contains("name is required"));
    }

    #[test]
    fn null_counts_as_missing() {
        let b = body(json!({ "name": null, "price": 2.5 }));
        assert!(RequestValidator::validate(&b, &rules()).is_err());
    }

    #[test]
    fn full_body_passes() {
        let b = body(json!({ "name": "cheese", "price": 2.5 }));
        assert!(RequestValidator::validate(&b, &rules()).is_ok());
    }

    #[test]
    fn min_length_enforced() {
        let b = body(json!({ "name": "", "price": 1.0 }));
        assert!(RequestValidator::validate(&b, &rules()).is_err());
    }

    #[test]
    fn minimum_enforced() {
        let b = body(json!({ "name": "cheese", "price": -1.0 }));
        assert!(RequestValidator::validate(&b, &rules()).is_err());
    }

    #[test]
    fn partial_skips_required() {
        let b = body(json!({ "price": 3.0 }));
        assert!(RequestValidator::validate_partial(&b, &rules()).is_ok());
    }

    #[test]
    fn partial_still_checks_present_fields() {
        let b = body(json!({ "price": -3.0 }));
        assert!(RequestValidator::validate_partial(&b, &rules()).is_err());
    }
}
