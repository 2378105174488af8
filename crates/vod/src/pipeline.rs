//! End-to-end acquisition: metadata in, validated artifacts out.

use std::path::Path;
use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use crate::downloader::RedundantDownloader;
use crate::extractor::extract;
use crate::media::{DownloadedArtifact, ResolvedSource};
use crate::metadata::{item_id, locate_item};
use crate::planner::plan;
use crate::probe::HttpProber;
use crate::selector::select;
use crate::{AcquireConfig, AcquireError, Session, create_client};

const FALLBACK_ITEM_ID: &str = "video";

/// Runs extraction, selection, planning and downloading with one client.
#[derive(Debug, Clone)]
pub struct Acquirer {
    client: Client,
    config: AcquireConfig,
}

impl Acquirer {
    pub fn new(config: AcquireConfig) -> Result<Self, AcquireError> {
        let client = create_client(&config)?;
        Ok(Self { client, config })
    }

    /// Use an existing client. It must not follow redirects on its own.
    pub fn with_client(client: Client, config: AcquireConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &AcquireConfig {
        &self.config
    }

    pub fn session(&self, cookie_jar: &str) -> Arc<Session> {
        Arc::new(Session::new(self.client.clone(), &self.config, cookie_jar))
    }

    /// Locate the item in `metadata` and pick its best accessible source.
    pub async fn resolve(
        &self,
        metadata: &Value,
        session: &Arc<Session>,
    ) -> Result<ResolvedSource, AcquireError> {
        let item = locate_item(metadata).map_err(|_| AcquireError::NoSourcesFound)?;
        let candidates = extract(item);
        debug!(count = candidates.len(), "Resolving source");

        let prober = HttpProber::new(session.clone(), self.config.probe_timeout);
        select(candidates, &prober, self.config.probe_mode).await
    }

    /// Resolve, plan and download every variant of one item.
    ///
    /// The artifacts are named after `item_id`, falling back to the id found
    /// in the metadata.
    pub async fn acquire(
        &self,
        metadata: &Value,
        cookie_jar: &str,
        output_dir: &Path,
        item_id: Option<&str>,
    ) -> Result<Vec<DownloadedArtifact>, AcquireError> {
        let session = self.session(cookie_jar);
        self.acquire_with_session(metadata, session, output_dir, item_id)
            .await
    }

    pub async fn acquire_with_session(
        &self,
        metadata: &Value,
        session: Arc<Session>,
        output_dir: &Path,
        id: Option<&str>,
    ) -> Result<Vec<DownloadedArtifact>, AcquireError> {
        let source = self.resolve(metadata, &session).await?;
        let variants = plan(&source);

        let id = id
            .map(str::to_string)
            .or_else(|| locate_item(metadata).ok().and_then(item_id))
            .map(|id| sanitize_id(&id))
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| FALLBACK_ITEM_ID.to_string());
        let base_filename = format!("{id}.{}", self.config.default_extension);

        info!(
            id = %id,
            source = %source.kind(),
            variants = variants.len(),
            "Acquiring item"
        );

        RedundantDownloader::new(session, &self.config)
            .download_all(&variants, output_dir, &base_filename)
            .await
    }
}

fn sanitize_id(id: &str) -> String {
    id.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}
