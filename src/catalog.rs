// Read-only catalog backed by static JSON documents

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Lookup of catalog documents by numeric id. `Ok(None)` means the record does
/// not exist; `Err` means the store itself failed.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_product(&self, id: u64) -> Result<Option<Value>>;

    async fn get_categories(&self) -> Result<Option<Value>>;

    async fn get_category(&self, id: u64) -> Result<Option<Value>>;

    async fn get_comments(&self, id: u64) -> Result<Option<Value>>;

    /// Products for every id that resolves, in request order
    async fn get_products(&self, ids: &[u64]) -> Result<Vec<Value>> {
        let mut products = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(product) = self.get_product(*id).await? {
                products.push(product);
            }
        }
        Ok(products)
    }
}

/// Directory layout:
///
/// ```text
/// <root>/products/{id}.json
/// <root>/cats/cat.json
/// <root>/cats_products/{id}.json
/// <root>/products_comments/{id}.json
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    root: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn read(&self, relative: &str) -> Result<Option<Value>> {
        let path = self.root.join(relative);

        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };

        let value = serde_json::from_slice(&data)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;
        Ok(Some(value))
    }
}

#[async_trait]
impl CatalogStore for JsonFileCatalog {
    async fn get_product(&self, id: u64) -> Result<Option<Value>> {
        self.read(&format!("products/{}.json", id)).await
    }

    async fn get_categories(&self) -> Result<Option<Value>> {
        self.read("cats/cat.json").await
    }

    async fn get_category(&self, id: u64) -> Result<Option<Value>> {
        self.read(&format!("cats_products/{}.json", id)).await
    }

    async fn get_comments(&self, id: u64) -> Result<Option<Value>> {
        self.read(&format!("products_comments/{}.json", id)).await
    }
}

/// Parse a route id. Any well-formed non-negative integer is valid, zero included.
pub fn parse_id(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

/// Parse `?ids=1,2,3`, silently skipping entries that are not ids
pub fn parse_id_list(raw: &str) -> Vec<u64> {
    raw.split(',').filter_map(parse_id).collect()
}
