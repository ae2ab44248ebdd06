//! Offline price index construction
//!
//! Categories are processed one at a time and the index file is rewritten
//! after each one, so a failure on a later category keeps the categories that
//! were already computed.

use crate::config::PricingConfig;
use crate::error::{Result, StackNagError};
use crate::pricing::catalog::Catalog;
use crate::pricing::filter::filter_catalog;
use crate::pricing::index::PriceIndex;
use crate::pricing::rules::RuleSet;
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Offer files are large; allow a slow download.
const CATALOG_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Where raw offer files come from
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self, rules: &RuleSet, region: &str) -> Result<Catalog>;
}

/// Downloads offer files from the public bulk pricing endpoint
pub struct HttpCatalogSource {
    client: reqwest::Client,
    base_url: String,
    show_progress: bool,
}

impl HttpCatalogSource {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(CATALOG_DOWNLOAD_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            show_progress: false,
        })
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn spinner(&self, message: String) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self, rules: &RuleSet, region: &str) -> Result<Catalog> {
        let url = rules.catalog_url(&self.base_url, region);
        info!(category = %rules.category, url = %url, "Downloading offer file");

        let pb = self.spinner(format!("Downloading {} prices...", rules.offer_code));
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            pb.finish_with_message("Download failed");
            return Err(StackNagError::Catalog(format!(
                "GET {} returned {}",
                url, status
            )));
        }

        let body = response.bytes().await?;
        pb.set_message(format!("Parsing {} offer file ({} bytes)...", rules.offer_code, body.len()));
        let catalog = Catalog::from_slice(&body)?;
        pb.finish_with_message(format!("{}: {} products", rules.offer_code, catalog.products.len()));
        Ok(catalog)
    }
}

/// Reads previously downloaded offer files named `{offer_code}.json`
pub struct DirectoryCatalogSource {
    dir: PathBuf,
}

impl DirectoryCatalogSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl CatalogSource for DirectoryCatalogSource {
    async fn fetch(&self, rules: &RuleSet, _region: &str) -> Result<Catalog> {
        let path = self.dir.join(format!("{}.json", rules.offer_code));
        info!(category = %rules.category, path = %path.display(), "Reading offer file");
        let file = std::fs::File::open(&path).map_err(|e| {
            StackNagError::Catalog(format!("Cannot open {}: {}", path.display(), e))
        })?;
        Catalog::from_reader(std::io::BufReader::new(file))
    }
}

/// Build the index for every configured category, saving after each one.
///
/// A category that filters to no classes is an error: the default rules name
/// a single location and usage type, so another region matches nothing.
pub async fn build_index(
    config: &PricingConfig,
    source: &dyn CatalogSource,
    path: &Path,
) -> Result<PriceIndex> {
    let mut index = PriceIndex::new();

    for rules in &config.categories {
        info!(category = %rules.category, "Getting prices");
        let catalog = source.fetch(rules, &config.region).await?;
        let prices = filter_catalog(&catalog, rules)?;
        if prices.is_empty() {
            return Err(StackNagError::Catalog(format!(
                "no {} products matched the {} rules for region {}",
                rules.offer_code, rules.category, config.region
            )));
        }
        index.set_category(&rules.category, prices);
        index.save(path)?;
        info!(category = %rules.category, path = %path.display(), "Price index updated");
    }

    Ok(index)
}
