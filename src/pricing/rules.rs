//! Attribute-match rule sets for the price catalog filter
//!
//! A rule set is a list of `(attribute, Matcher)` pairs evaluated directly
//! against a product's attribute map. In configuration text a value with a
//! leading `^` is a prefix match, anything else must match exactly.

use crate::pricing::catalog::Product;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Marks a prefix matcher in configuration text
pub const PREFIX_SENTINEL: char = '^';

/// Usage types that bill instance-hours contain this marker
pub const INSTANCE_USAGE_MARKER: &str = "InstanceUsage";

/// Engine code the RDS catalog uses for non-standard, custom-engine offers
pub const NON_STANDARD_ENGINE_CODE: &str = "210";

pub const DEFAULT_CLASS_ATTRIBUTE: &str = "instanceType";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Matcher {
    Exact(String),
    Prefix(String),
}

impl Matcher {
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix(PREFIX_SENTINEL) {
            Some(prefix) => Matcher::Prefix(prefix.to_string()),
            None => Matcher::Exact(raw.to_string()),
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Matcher::Exact(expected) => value == expected,
            Matcher::Prefix(prefix) => value.starts_with(prefix.as_str()),
        }
    }
}

impl From<String> for Matcher {
    fn from(raw: String) -> Self {
        Matcher::parse(&raw)
    }
}

impl From<Matcher> for String {
    fn from(matcher: Matcher) -> Self {
        matcher.to_string()
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Exact(value) => write!(f, "{}", value),
            Matcher::Prefix(prefix) => write!(f, "{}{}", PREFIX_SENTINEL, prefix),
        }
    }
}

/// Category-specific exclusions applied after the attribute rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryPolicy {
    #[default]
    Compute,
    /// Drops storage/IO line items and non-standard engine offers
    Database,
}

impl CategoryPolicy {
    pub fn admits(&self, attributes: &BTreeMap<String, String>) -> bool {
        match self {
            CategoryPolicy::Compute => true,
            CategoryPolicy::Database => {
                let instance_hours = attributes
                    .get("usagetype")
                    .is_some_and(|usage| usage.contains(INSTANCE_USAGE_MARKER));
                let standard_engine = attributes
                    .get("engineCode")
                    .map_or(true, |code| code != NON_STANDARD_ENGINE_CODE);
                instance_hours && standard_engine
            }
        }
    }
}

fn default_class_attribute() -> String {
    DEFAULT_CLASS_ATTRIBUTE.to_string()
}

/// Filter rules for one resource category ("ec2", "rds", ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Category key in the price index
    pub category: String,
    /// Offer code of the bulk catalog, e.g. `AmazonEC2`
    pub offer_code: String,
    /// Full catalog URL, overriding the one derived from the offer code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Attribute holding the resource class (the index key)
    #[serde(default = "default_class_attribute")]
    pub class_attribute: String,
    #[serde(default)]
    pub policy: CategoryPolicy,
    pub attributes: BTreeMap<String, Matcher>,
}

impl RuleSet {
    pub fn new(category: &str, offer_code: &str, policy: CategoryPolicy) -> Self {
        Self {
            category: category.to_string(),
            offer_code: offer_code.to_string(),
            url: None,
            class_attribute: default_class_attribute(),
            policy,
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style rule insertion, `raw` follows the `^prefix` convention
    pub fn rule(mut self, attribute: &str, raw: &str) -> Self {
        self.attributes
            .insert(attribute.to_string(), Matcher::parse(raw));
        self
    }

    pub fn rules(&self) -> impl Iterator<Item = (&str, &Matcher)> {
        self.attributes.iter().map(|(k, m)| (k.as_str(), m))
    }

    /// True iff every rule matches and the category policy admits the product
    pub fn accepts(&self, product: &Product) -> bool {
        let rules_match = self.rules().all(|(attribute, matcher)| {
            product
                .attributes
                .get(attribute)
                .is_some_and(|value| matcher.matches(value))
        });
        rules_match && self.policy.admits(&product.attributes)
    }

    pub fn catalog_url(&self, base_url: &str, region: &str) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!(
                "{}/offers/v1.0/aws/{}/current/{}/index.json",
                base_url.trim_end_matches('/'),
                self.offer_code,
                region
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(attrs: &[(&str, &str)]) -> Product {
        Product {
            sku: "SKU".to_string(),
            product_family: None,
            attributes: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_matcher_parse() {
        assert_eq!(Matcher::parse("Linux"), Matcher::Exact("Linux".into()));
        assert_eq!(
            Matcher::parse("^InstanceUsage"),
            Matcher::Prefix("InstanceUsage".into())
        );
        assert_eq!(Matcher::parse("^InstanceUsage").to_string(), "^InstanceUsage");
    }

    #[test]
    fn test_matcher_matches() {
        assert!(Matcher::parse("Shared").matches("Shared"));
        assert!(!Matcher::parse("Shared").matches("Shared "));
        assert!(Matcher::parse("^Instance").matches("InstanceUsage:db.m5.large"));
        assert!(!Matcher::parse("^Instance").matches("RDS:StorageUsage"));
    }

    #[test]
    fn test_missing_attribute_fails_rule() {
        let rules = RuleSet::new("ec2", "AmazonEC2", CategoryPolicy::Compute)
            .rule("tenancy", "Shared");
        assert!(!rules.accepts(&product(&[("instanceType", "m5.large")])));
        assert!(rules.accepts(&product(&[("tenancy", "Shared")])));
    }

    #[test]
    fn test_database_policy() {
        let policy = CategoryPolicy::Database;
        let attrs = |usage: &str, code: &str| product(&[("usagetype", usage), ("engineCode", code)]).attributes;

        assert!(policy.admits(&attrs("InstanceUsage:db.t3.micro", "2")));
        assert!(policy.admits(&attrs("USE2-InstanceUsage:db.t3.micro", "2")));
        assert!(!policy.admits(&attrs("RDS:GP2-Storage", "2")));
        assert!(!policy.admits(&attrs("InstanceUsage:db.t3.micro", NON_STANDARD_ENGINE_CODE)));
        assert!(CategoryPolicy::Compute.admits(&attrs("anything", NON_STANDARD_ENGINE_CODE)));
    }

    #[test]
    fn test_catalog_url() {
        let rules = RuleSet::new("ec2", "AmazonEC2", CategoryPolicy::Compute);
        assert_eq!(
            rules.catalog_url("https://pricing.us-east-1.amazonaws.com/", "us-east-1"),
            "https://pricing.us-east-1.amazonaws.com/offers/v1.0/aws/AmazonEC2/current/us-east-1/index.json"
        );

        let mut pinned = rules.clone();
        pinned.url = Some("http://localhost/ec2.json".into());
        assert_eq!(pinned.catalog_url("ignored", "us-east-1"), "http://localhost/ec2.json");
    }

    #[test]
    fn test_rule_set_toml_shape() {
        let text = r#"
            category = "rds"
            offer_code = "AmazonRDS"
            policy = "database"

            [attributes]
            databaseEngine = "MySQL"
            usagetype = "^InstanceUsage"
        "#;
        let rules: RuleSet = toml::from_str(text).unwrap();
        assert_eq!(rules.class_attribute, DEFAULT_CLASS_ATTRIBUTE);
        assert_eq!(rules.policy, CategoryPolicy::Database);
        assert_eq!(
            rules.attributes["usagetype"],
            Matcher::Prefix("InstanceUsage".into())
        );
    }
}
