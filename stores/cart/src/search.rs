//! Product search: a read path over the product catalog.
//!
//! Not a store. Each search fetches the whole collection and filters it
//! client-side.

use reactive_stores_core::fetch::{Fetch, FetchError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A product as listed in the catalog
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    /// Catalog identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Unit price
    pub price: f64,
    /// Category label
    pub category: String,
}

impl CatalogProduct {
    /// Case-insensitive substring match on name or category
    ///
    /// `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.category.to_lowercase().contains(needle)
    }
}

/// Searches the product collection at `url`
#[derive(Clone)]
pub struct ProductCatalog {
    url: String,
    fetch: Arc<dyn Fetch>,
}

impl ProductCatalog {
    /// Creates a catalog reading from `url`
    pub fn new(url: impl Into<String>, fetch: Arc<dyn Fetch>) -> Self {
        Self {
            url: url.into(),
            fetch,
        }
    }

    /// Products whose name or category contains `term`, ignoring case
    ///
    /// A blank term returns nothing without fetching. Records that are not
    /// catalog products are skipped.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's [`FetchError`] when the collection cannot
    /// be fetched.
    #[tracing::instrument(skip(self), fields(url = %self.url))]
    pub async fn search(&self, term: &str) -> Result<Vec<CatalogProduct>, FetchError> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let records = self.fetch.fetch(&self.url).await?;
        let total = records.len();

        let products: Vec<CatalogProduct> = records
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<CatalogProduct>(record) {
                Ok(product) => Some(product),
                Err(error) => {
                    tracing::warn!(%error, "Skipping malformed catalog record");
                    None
                },
            })
            .filter(|product| product.matches(&needle))
            .collect();

        tracing::debug!(total, matched = products.len(), "Catalog search finished");
        Ok(products)
    }
}

impl std::fmt::Debug for ProductCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductCatalog")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}
