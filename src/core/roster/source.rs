//! Dataset sources.
//!
//! A source knows how to fetch one year's roster document and the initials
//! table. The store and the live loader only see the trait, so tests can feed
//! fixtures without touching the network.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::error::{Result, RosterError};
use super::initials::InitialsTable;
use super::models::{PartitionKey, RosterDocument};

/// Public CDN mirror of the per-year roster documents.
pub const DEFAULT_PARTITION_URL_TEMPLATE: &str =
    "https://fastly.jsdelivr.net/gh/dogxii/zzuli-he@main/public/example/{year}.json";

/// Public CDN mirror of the initials table.
pub const DEFAULT_INITIALS_URL: &str =
    "https://fastly.jsdelivr.net/gh/dogxii/zzuli-he@main/public/example/pinyinTable.json";

/// File name of the initials table inside a local dataset directory.
pub const INITIALS_FILENAME: &str = "pinyinTable.json";

/// Placeholder substituted with the four-digit year.
pub const YEAR_PLACEHOLDER: &str = "{year}";

pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Short description used in log lines.
    fn describe(&self) -> String;

    async fn fetch_partition(&self, key: PartitionKey) -> Result<RosterDocument>;

    async fn fetch_initials(&self) -> Result<InitialsTable>;
}

// ============================================================================
// HTTP
// ============================================================================

/// Fetches documents over HTTP(S), typically from the CDN.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    partition_url_template: String,
    initials_url: Url,
}

impl HttpSource {
    pub fn new(
        partition_url_template: impl Into<String>,
        initials_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let partition_url_template = partition_url_template.into();
        if !partition_url_template.contains(YEAR_PLACEHOLDER) {
            return Err(RosterError::Config(format!(
                "partition URL template must contain {YEAR_PLACEHOLDER}: {partition_url_template}"
            )));
        }
        // Validate the template once with a concrete year so bad URLs fail at startup.
        expand_template(&partition_url_template, PartitionKey::Y2021)?;

        let initials_url = Url::parse(initials_url)
            .map_err(|e| RosterError::Config(format!("invalid initials URL {initials_url}: {e}")))?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            partition_url_template,
            initials_url,
        })
    }

    /// Source pointing at the public CDN mirror.
    pub fn cdn() -> Result<Self> {
        Self::new(
            DEFAULT_PARTITION_URL_TEMPLATE,
            DEFAULT_INITIALS_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn partition_url(&self, key: PartitionKey) -> Result<Url> {
        expand_template(&self.partition_url_template, key)
    }

    async fn get_bytes(&self, url: Url) -> Result<Vec<u8>> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RosterError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

fn expand_template(template: &str, key: PartitionKey) -> Result<Url> {
    let raw = template.replace(YEAR_PLACEHOLDER, &key.year().to_string());
    Url::parse(&raw).map_err(|e| RosterError::Config(format!("invalid partition URL {raw}: {e}")))
}

#[async_trait]
impl RosterSource for HttpSource {
    fn describe(&self) -> String {
        format!("http({})", self.partition_url_template)
    }

    async fn fetch_partition(&self, key: PartitionKey) -> Result<RosterDocument> {
        let url = self.partition_url(key)?;
        tracing::debug!(partition = %key, %url, "Fetching roster document");
        let bytes = self.get_bytes(url).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn fetch_initials(&self) -> Result<InitialsTable> {
        tracing::debug!(url = %self.initials_url, "Fetching initials table");
        let bytes = self.get_bytes(self.initials_url.clone()).await?;
        InitialsTable::from_json_slice(&bytes)
    }
}

// ============================================================================
// Local directory
// ============================================================================

/// Reads `<dir>/<year>.json` and `<dir>/pinyinTable.json`.
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn partition_path(&self, key: PartitionKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.year()))
    }

    pub fn initials_path(&self) -> PathBuf {
        self.dir.join(INITIALS_FILENAME)
    }
}

#[async_trait]
impl RosterSource for FileSource {
    fn describe(&self) -> String {
        format!("file({})", self.dir.display())
    }

    async fn fetch_partition(&self, key: PartitionKey) -> Result<RosterDocument> {
        let bytes = tokio::fs::read(self.partition_path(key)).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn fetch_initials(&self) -> Result<InitialsTable> {
        let bytes = tokio::fs::read(self.initials_path()).await?;
        InitialsTable::from_json_slice(&bytes)
    }
}
