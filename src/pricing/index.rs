//! Persisted price index: `{ category: { class: USD/hr } }`

use crate::error::{Result, StackNagError};
use crate::utils::ensure_parent_dir;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Index category for EC2 instance types
pub const COMPUTE_CATEGORY: &str = "ec2";
/// Index category for RDS instance classes
pub const DATABASE_CATEGORY: &str = "rds";

pub const DEFAULT_INDEX_PATH: &str = "price_index.json";

/// Read-only after load; safe to share by reference or `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceIndex {
    categories: BTreeMap<String, BTreeMap<String, f64>>,
}

impl PriceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the index file written by `stacknag build-index`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StackNagError::PriceIndexMissing {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        Self::from_json_str(&content).map_err(|e| StackNagError::PriceIndexInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let index: PriceIndex = serde_json::from_str(content)?;
        for (category, prices) in &index.categories {
            if let Some((class, price)) = prices.iter().find(|(_, p)| !p.is_finite() || **p < 0.0) {
                return Err(StackNagError::PriceParse {
                    sku: format!("{}/{}", category, class),
                    reason: format!("price {} is not a non-negative amount", price),
                });
            }
        }
        Ok(index)
    }

    /// Write the whole index, pretty-printed, replacing any previous file.
    pub fn save(&self, path: &Path) -> Result<()> {
        ensure_parent_dir(path)?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Replace one category wholesale
    pub fn set_category(&mut self, category: &str, prices: BTreeMap<String, f64>) {
        self.categories.insert(category.to_string(), prices);
    }

    pub fn insert(&mut self, category: &str, class: &str, price: f64) {
        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(class.to_string(), price);
    }

    /// Hourly price of `class` in `category`; a miss is an error, never zero.
    pub fn lookup(&self, category: &str, class: &str) -> Result<f64> {
        self.categories
            .get(category)
            .and_then(|prices| prices.get(class))
            .copied()
            .ok_or_else(|| StackNagError::PriceNotFound {
                category: category.to_string(),
                class: class.to_string(),
            })
    }

    pub fn category(&self, category: &str) -> Option<&BTreeMap<String, f64>> {
        self.categories.get(category)
    }

    /// `(category, number of classes)` pairs in key order
    pub fn summary(&self) -> Vec<(&str, usize)> {
        self.categories
            .iter()
            .map(|(name, prices)| (name.as_str(), prices.len()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.values().all(|prices| prices.is_empty())
    }
}
