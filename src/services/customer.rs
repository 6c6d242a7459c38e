//! Customer lookups against the remote customer microservice, bound from a
//! rest datasource configuration (base URL + path template).

use crate::config::{ConnectorKind, DatasourceConfig};
use crate::error::{AppError, ConfigError};
use crate::models::Customer;
use async_trait::async_trait;

#[async_trait]
pub trait CustomerService: Send + Sync {
    async fn get_by_id(&self, customer_id: &str) -> Result<Customer, AppError>;
}

/// HTTP-backed implementation. One synchronous call per lookup: no retry,
/// no timeout override, no fallback.
pub struct RestCustomerService {
    client: reqwest::Client,
    base_url: String,
    get_by_id_template: String,
}

impl RestCustomerService {
    pub fn from_config(ds: &DatasourceConfig) -> Result<Self, AppError> {
        if ds.connector != ConnectorKind::Rest {
            return Err(ConfigError::ConnectorMismatch {
                name: ds.name.clone(),
                connector: format!("{:?}", ds.connector).to_lowercase(),
            }
            .into());
        }
        let base_url = ds.base_url.clone().ok_or_else(|| ConfigError::MissingField {
            name: ds.name.clone(),
            field: "baseUrl",
        })?;
        let get_by_id_template =
            ds.get_by_id_template
                .clone()
                .ok_or_else(|| ConfigError::MissingField {
                    name: ds.name.clone(),
                    field: "getByIdTemplate",
                })?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            get_by_id_template,
        })
    }

    fn get_by_id_url(&self, id: &str) -> String {
        let path = self.get_by_id_template.replace("{id}", id);
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl CustomerService for RestCustomerService {
    async fn get_by_id(&self, customer_id: &str) -> Result<Customer, AppError> {
        let url = self.get_by_id_url(customer_id);
        tracing::debug!(%url, "fetch customer");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("customer service request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(AppError::Upstream(format!(
                "customer service returned {status}: {body}"
            )));
        }

        response
            .json::<Customer>()
            .await
            .map_err(|e| AppError::Upstream(format!("customer response parse failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rest_config() -> DatasourceConfig {
        DatasourceConfig {
            name: "customer".to_string(),
            connector: ConnectorKind::Rest,
            url: None,
            base_url: Some("http://localhost:3001/".to_string()),
            get_by_id_template: Some("/customers/{id}".to_string()),
        }
    }

    #[test]
    fn renders_path_template() {
        let svc = RestCustomerService::from_config(&rest_config()).unwrap();
        assert_eq!(
            svc.get_by_id_url("42"),
            "http://localhost:3001/customers/42"
        );
    }

    #[test]
    fn rejects_non_rest_datasource() {
        let mut ds = rest_config();
        ds.connector = ConnectorKind::Memory;
        assert!(RestCustomerService::from_config(&ds).is_err());
    }

    #[test]
    fn rejects_missing_base_url() {
        let mut ds = rest_config();
        ds.base_url = None;
        assert!(RestCustomerService::from_config(&ds).is_err());
    }
}
