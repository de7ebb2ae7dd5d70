use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::product::Product;
use crate::errors::SourceError;
use crate::fixtures::seed_products;

/// Supplies the initial product collection. Stands in for whatever storage a
/// real deployment would load the catalog from.
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn load(&self) -> Result<Vec<Product>, SourceError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FixtureProductSource;

#[async_trait]
impl ProductSource for FixtureProductSource {
    async fn load(&self) -> Result<Vec<Product>, SourceError> {
        Ok(seed_products())
    }
}

/// Reads a JSON array of products.
#[derive(Clone, Debug)]
pub struct JsonFileProductSource {
    path: PathBuf,
}

impl JsonFileProductSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ProductSource for JsonFileProductSource {
    async fn load(&self) -> Result<Vec<Product>, SourceError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Read { path: self.path.clone(), source })?;

        serde_json::from_str::<Vec<Product>>(&raw)
            .map_err(|source| SourceError::Parse { path: self.path.clone(), source })
    }
}

/// Picks the JSON file when a seed path is configured, the built-in shelf otherwise.
pub fn from_seed_path(seed_path: Option<PathBuf>) -> Box<dyn ProductSource> {
    match seed_path {
        Some(path) => Box::new(JsonFileProductSource::new(path)),
        None => Box::new(FixtureProductSource),
    }
}
