//! Price catalog filtering and the persisted price index
//!
//! - `catalog`: typed bulk offer file
//! - `rules`: attribute matchers and category policies
//! - `filter`: catalog + rules -> one price per class
//! - `index`: the `{ category: { class: price } }` file
//! - `builder`: the offline build step

pub mod builder;
pub mod catalog;
pub mod filter;
pub mod index;
pub mod rules;

pub use builder::{build_index, CatalogSource, DirectoryCatalogSource, HttpCatalogSource};
pub use catalog::Catalog;
pub use filter::filter_catalog;
pub use index::{PriceIndex, COMPUTE_CATEGORY, DATABASE_CATEGORY};
pub use rules::{CategoryPolicy, Matcher, RuleSet};
