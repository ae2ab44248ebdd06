//! Typed view of an AWS bulk pricing offer file
//!
//! Only the parts the filter reads are modelled: `products` and the
//! `terms.OnDemand` section. Reserved terms and the rest of the document are
//! ignored during deserialization.
//!
//! Every map is a `BTreeMap`, so "the first" term or price dimension of a SKU
//! is the first in key order, and iteration is deterministic.

use crate::error::{Result, StackNagError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Currency every index price is expressed in
pub const CURRENCY: &str = "USD";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(rename = "offerCode", default, skip_serializing_if = "Option::is_none")]
    pub offer_code: Option<String>,
    #[serde(default)]
    pub products: BTreeMap<String, Product>,
    #[serde(default)]
    pub terms: Terms,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub sku: String,
    #[serde(rename = "productFamily", default, skip_serializing_if = "Option::is_none")]
    pub product_family: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Terms {
    /// sku -> offer term code -> term
    #[serde(rename = "OnDemand", default)]
    pub on_demand: BTreeMap<String, BTreeMap<String, Term>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Term {
    #[serde(default)]
    pub sku: String,
    /// rate code -> dimension
    #[serde(rename = "priceDimensions", default)]
    pub price_dimensions: BTreeMap<String, PriceDimension>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceDimension {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// currency -> decimal string, e.g. `{"USD": "0.0960000000"}`
    #[serde(rename = "pricePerUnit", default)]
    pub price_per_unit: BTreeMap<String, String>,
}

impl Catalog {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| StackNagError::Catalog(format!("Failed to parse offer file: {}", e)))
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| StackNagError::Catalog(format!("Failed to parse offer file: {}", e)))
    }

    /// On-demand price of a SKU: first on-demand term, first price
    /// dimension, `USD` amount.
    pub fn on_demand_price(&self, sku: &str) -> Result<f64> {
        let parse_error = |reason: &str| StackNagError::PriceParse {
            sku: sku.to_string(),
            reason: reason.to_string(),
        };

        let dimension = self
            .terms
            .on_demand
            .get(sku)
            .and_then(|terms| terms.values().next())
            .and_then(|term| term.price_dimensions.values().next())
            .ok_or_else(|| parse_error("no on-demand price dimension"))?;

        let raw = dimension
            .price_per_unit
            .get(CURRENCY)
            .ok_or_else(|| parse_error("no USD price"))?;

        let price: f64 = raw
            .trim()
            .parse()
            .map_err(|_| parse_error(&format!("not a number: {:?}", raw)))?;

        if !price.is_finite() || price < 0.0 {
            return Err(parse_error(&format!("out of range: {}", price)));
        }
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFER: &str = r#"{
        "formatVersion": "v1.0",
        "offerCode": "AmazonEC2",
        "products": {
            "SKU1": {
                "sku": "SKU1",
                "productFamily": "Compute Instance",
                "attributes": {"instanceType": "m5.large", "tenancy": "Shared"}
            }
        },
        "terms": {
            "OnDemand": {
                "SKU1": {
                    "SKU1.JRTCKXETXF": {
                        "offerTermCode": "JRTCKXETXF",
                        "sku": "SKU1",
                        "priceDimensions": {
                            "SKU1.JRTCKXETXF.6YS6EN2CT7": {
                                "unit": "Hrs",
                                "pricePerUnit": {"USD": "0.0960000000"},
                                "appliesTo": []
                            }
                        },
                        "termAttributes": {}
                    }
                }
            },
            "Reserved": {"SKU1": {}}
        }
    }"#;

    #[test]
    fn test_parse_offer_file() {
        let catalog = Catalog::from_slice(OFFER.as_bytes()).unwrap();
        assert_eq!(catalog.offer_code.as_deref(), Some("AmazonEC2"));
        assert_eq!(catalog.products.len(), 1);
        assert_eq!(catalog.products["SKU1"].attributes["instanceType"], "m5.large");
    }

    #[test]
    fn test_on_demand_price() {
        let catalog = Catalog::from_slice(OFFER.as_bytes()).unwrap();
        let price = catalog.on_demand_price("SKU1").unwrap();
        assert!((price - 0.096).abs() < 1e-12);
    }

    #[test]
    fn test_missing_term_is_error() {
        let catalog = Catalog::from_slice(OFFER.as_bytes()).unwrap();
        let err = catalog.on_demand_price("NOPE").unwrap_err();
        assert!(matches!(err, StackNagError::PriceParse { .. }));
    }

    #[test]
    fn test_unparseable_price_is_error() {
        let mut catalog = Catalog::from_slice(OFFER.as_bytes()).unwrap();
        for term in catalog.terms.on_demand.get_mut("SKU1").unwrap().values_mut() {
            for dim in term.price_dimensions.values_mut() {
                dim.price_per_unit.insert(CURRENCY.to_string(), "free".to_string());
            }
        }
        assert!(catalog.on_demand_price("SKU1").is_err());
    }

    #[test]
    fn test_garbage_is_catalog_error() {
        let err = Catalog::from_slice(b"not json").unwrap_err();
        assert!(matches!(err, StackNagError::Catalog(_)));
    }
}
