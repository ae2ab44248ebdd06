//! Configuration
//!
//! Two layers:
//! - `Settings`: runtime values from the environment (or matching CLI
//!   flags): webhook URLs, metrics namespace, AWS profile/region, index path.
//! - `PricingConfig`: the filter rule sets for the offline index build, read
//!   from a TOML file or the built-in defaults.

use crate::error::{ConfigError, Result};
use crate::pricing::index::DEFAULT_INDEX_PATH;
use crate::pricing::rules::{CategoryPolicy, RuleSet};
use anyhow::Context;
use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Webhook receiving stack status reports
    #[arg(long, env = "PRICE_NOTIFY_URL", global = true)]
    pub price_notify_url: Option<String>,

    /// Webhook receiving build notifications (defaults to the status webhook)
    #[arg(long, env = "CODEBUILD_NOTIFY_URL", global = true)]
    pub codebuild_notify_url: Option<String>,

    /// CloudWatch namespace for published metrics
    #[arg(long, env = "NAMESPACE", global = true)]
    pub namespace: Option<String>,

    /// Alerting topic ARN, recorded with every report
    #[arg(long, env = "ALERT_TOPIC_ARN", global = true)]
    pub alert_topic_arn: Option<String>,

    /// Named AWS credential profile
    #[arg(long = "profile", env = "AWS_PROFILE", global = true)]
    pub aws_profile: Option<String>,

    /// AWS region override
    #[arg(long = "region", env = "AWS_REGION", global = true)]
    pub aws_region: Option<String>,

    /// Price index file produced by `stacknag build-index`
    #[arg(long, env = "PRICE_INDEX_PATH", global = true, default_value = DEFAULT_INDEX_PATH)]
    pub price_index_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            price_notify_url: None,
            codebuild_notify_url: None,
            namespace: None,
            alert_topic_arn: None,
            aws_profile: None,
            aws_region: None,
            price_index_path: PathBuf::from(DEFAULT_INDEX_PATH),
        }
    }
}

fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingField(name.to_string()).into()),
    }
}

impl Settings {
    pub fn require_price_notify_url(&self) -> Result<&str> {
        require(&self.price_notify_url, "PRICE_NOTIFY_URL")
    }

    /// Build webhook, falling back to the status webhook
    pub fn require_codebuild_notify_url(&self) -> Result<&str> {
        require(&self.codebuild_notify_url, "CODEBUILD_NOTIFY_URL")
            .or_else(|_| require(&self.price_notify_url, "CODEBUILD_NOTIFY_URL or PRICE_NOTIFY_URL"))
    }

    pub fn require_namespace(&self) -> Result<&str> {
        require(&self.namespace, "NAMESPACE")
    }
}

/// Public bulk pricing endpoint
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://pricing.us-east-1.amazonaws.com";
pub const DEFAULT_PRICING_REGION: &str = "us-east-1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Single pricing region; offer files are fetched for this region only
    pub region: String,
    pub catalog_base_url: String,
    pub categories: Vec<RuleSet>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        let location = "US East (N. Virginia)";
        Self {
            region: DEFAULT_PRICING_REGION.to_string(),
            catalog_base_url: DEFAULT_CATALOG_BASE_URL.to_string(),
            categories: vec![
                RuleSet::new("ec2", "AmazonEC2", CategoryPolicy::Compute)
                    .rule("location", location)
                    .rule("tenancy", "Shared")
                    .rule("operatingSystem", "Linux")
                    .rule("preInstalledSw", "NA")
                    .rule("licenseModel", "No License required")
                    .rule("capacitystatus", "Used"),
                RuleSet::new("rds", "AmazonRDS", CategoryPolicy::Database)
                    .rule("location", location)
                    .rule("databaseEngine", "MySQL")
                    .rule("deploymentOption", "Single-AZ")
                    .rule("usagetype", "^InstanceUsage"),
            ],
        }
    }
}

impl PricingConfig {
    /// Load rule sets from `path`, `./.stacknag.toml`,
    /// `~/.config/stacknag/pricing.toml`, or fall back to the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            let local = PathBuf::from(".stacknag.toml");
            if local.exists() {
                local
            } else {
                dirs::config_dir()
                    .map(|d| d.join("stacknag").join("pricing.toml"))
                    .unwrap_or(local)
            }
        };

        if !config_path.exists() {
            if path.is_some() {
                anyhow::bail!(
                    "Pricing config not found: {}\n  Tip: Run 'stacknag init' to create one",
                    config_path.display()
                );
            }
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read pricing config: {}", config_path.display()))?;
        let config: PricingConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .with_context(|| format!("Failed to parse pricing config: {}", config_path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "categories".to_string(),
                reason: "at least one category is required".to_string(),
            }
            .into());
        }
        let mut seen = std::collections::HashSet::new();
        for rules in &self.categories {
            if !seen.insert(rules.category.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "categories".to_string(),
                    reason: format!("category {} is defined twice", rules.category),
                }
                .into());
            }
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize pricing config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write pricing config: {}", path.display()))?;
        Ok(())
    }
}

pub fn init_config(output: &Path) -> anyhow::Result<()> {
    PricingConfig::default().save(output)?;
    println!("Created pricing config: {}", output.display());
    Ok(())
}
