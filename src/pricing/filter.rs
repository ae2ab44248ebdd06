//! Catalog filter: one on-demand hourly price per resource class

use crate::error::{Result, StackNagError};
use crate::pricing::catalog::Catalog;
use crate::pricing::rules::RuleSet;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Filter `catalog` down to `resource-class -> USD/hr` using `rules`.
///
/// Products missing the class attribute are skipped with a warning. Two
/// surviving products with the same class abort the category with
/// `DuplicateClass`.
pub fn filter_catalog(catalog: &Catalog, rules: &RuleSet) -> Result<BTreeMap<String, f64>> {
    let mut prices = BTreeMap::new();
    let mut skipped = 0usize;

    for (sku, product) in &catalog.products {
        if !rules.accepts(product) {
            continue;
        }

        let Some(class) = product.attributes.get(&rules.class_attribute) else {
            warn!(
                sku = %sku,
                category = %rules.category,
                "Product has no {} attribute, skipping",
                rules.class_attribute
            );
            skipped += 1;
            continue;
        };

        let price = catalog.on_demand_price(sku)?;
        match prices.entry(class.clone()) {
            Entry::Occupied(_) => {
                return Err(StackNagError::DuplicateClass {
                    category: rules.category.clone(),
                    class: class.clone(),
                });
            }
            Entry::Vacant(slot) => {
                debug!(category = %rules.category, class = %class, price, "Indexed price");
                slot.insert(price);
            }
        }
    }

    info!(
        category = %rules.category,
        classes = prices.len(),
        skipped,
        "Filtered catalog"
    );
    Ok(prices)
}
