//! Datasource configuration: static JSON describing connector type and target.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorKind {
    Memory,
    Postgres,
    Rest,
}

/// One datasource, as declared in its JSON file. `url` backs postgres;
/// `baseUrl` + `getByIdTemplate` back rest service proxies.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasourceConfig {
    pub name: String,
    pub connector: ConnectorKind,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub get_by_id_template: Option<String>,
}
