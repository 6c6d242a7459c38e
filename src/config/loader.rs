//! Loads datasource configuration JSON files from a directory.

use crate::config::DatasourceConfig;
use crate::error::ConfigError;
use std::path::Path;

/// Read every `*.json` file in `dir` as one datasource configuration.
pub async fn load_datasources(dir: impl AsRef<Path>) -> Result<Vec<DatasourceConfig>, ConfigError> {
    let dir = dir.as_ref();
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", dir.display(), e)))?;
    let mut out = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ConfigError::Load(e.to_string()))?
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
        let ds: DatasourceConfig = serde_json::from_str(&raw)
            .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(name = %ds.name, path = %path.display(), "loaded datasource");
        out.push(ds);
    }
    Ok(out)
}

/// Look up a datasource by its declared name.
pub fn datasource_by_name<'a>(
    configs: &'a [DatasourceConfig],
    name: &str,
) -> Result<&'a DatasourceConfig, ConfigError> {
    configs
        .iter()
        .find(|ds| ds.name == name)
        .ok_or_else(|| ConfigError::MissingDatasource(name.to_string()))
}
