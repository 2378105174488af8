//! # Redundant Downloader
//!
//! Streams every planned variant to its own file and keeps only artifacts that
//! pass the size check. Variants are isolated from each other: a failing
//! variant is recorded and its siblings carry on.
//!
//! Bytes are written to a `.part` file first and renamed into place only after
//! validation, so a failed or undersized attempt never leaves a file behind and
//! never clobbers an artifact from an earlier run.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::future::join_all;
use reqwest::Response;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::DownloadError;
use crate::media::{DownloadOutcome, DownloadVariant, DownloadedArtifact, VariantFailure};
use crate::{AcquireConfig, AcquireError, Session};

const PART_EXTENSION: &str = "part";

pub struct RedundantDownloader {
    session: Arc<Session>,
    min_valid_bytes: u64,
    max_redirects: usize,
    download_timeout: Option<Duration>,
    concurrent: bool,
    default_extension: String,
}

impl RedundantDownloader {
    pub fn new(session: Arc<Session>, config: &AcquireConfig) -> Self {
        Self {
            session,
            min_valid_bytes: config.min_valid_bytes,
            max_redirects: config.max_redirects,
            download_timeout: config.download_timeout,
            concurrent: config.concurrent_downloads,
            default_extension: config.default_extension.clone(),
        }
    }

    /// Download every variant and return only the valid artifacts.
    ///
    /// Fails with [`AcquireError::AllDownloadsFailed`] when no variant
    /// produced a valid artifact.
    pub async fn download_all(
        &self,
        variants: &[DownloadVariant],
        output_dir: &Path,
        base_filename: &str,
    ) -> Result<Vec<DownloadedArtifact>, AcquireError> {
        let outcomes = self.download_each(variants, output_dir, base_filename).await;

        let mut artifacts = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(artifact) => artifacts.push(artifact),
                Err(failure) => failures.push(failure),
            }
        }

        if artifacts.is_empty() {
            warn!(failed = failures.len(), "Every download variant failed");
            return Err(AcquireError::AllDownloadsFailed(failures));
        }

        info!(
            succeeded = artifacts.len(),
            failed = failures.len(),
            "Download variants finished"
        );
        Ok(artifacts)
    }

    /// Download every variant and report each outcome, in input order.
    pub async fn download_each(
        &self,
        variants: &[DownloadVariant],
        output_dir: &Path,
        base_filename: &str,
    ) -> Vec<DownloadOutcome> {
        if self.concurrent {
            join_all(
                variants
                    .iter()
                    .map(|variant| self.download_variant(variant, output_dir, base_filename)),
            )
            .await
        } else {
            let mut outcomes = Vec::with_capacity(variants.len());
            for variant in variants {
                outcomes.push(
                    self.download_variant(variant, output_dir, base_filename)
                        .await,
                );
            }
            outcomes
        }
    }

    /// Path of the artifact for `variant`: `<stem><suffix>.<ext>`.
    pub fn target_path(
        &self,
        output_dir: &Path,
        base_filename: &str,
        variant: &DownloadVariant,
    ) -> PathBuf {
        let base = Path::new(base_filename);
        let stem = base
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("video");
        let extension = base
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(&self.default_extension);

        output_dir.join(format!("{stem}{}.{extension}", variant.file_suffix))
    }

    async fn download_variant(
        &self,
        variant: &DownloadVariant,
        output_dir: &Path,
        base_filename: &str,
    ) -> DownloadOutcome {
        let path = self.target_path(output_dir, base_filename, variant);
        let part_path = path.with_extension(part_extension(&path));

        debug!(variant = %variant.label, path = %path.display(), "Starting variant download");

        let result = match self.download_timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, self.fetch_to_file(&variant.url, &part_path))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(DownloadError::Timeout(limit)),
                }
            }
            None => self.fetch_to_file(&variant.url, &part_path).await,
        };

        let result = match result {
            Ok(size) if size <= self.min_valid_bytes => Err(DownloadError::ArtifactTooSmall {
                size,
                min: self.min_valid_bytes,
            }),
            Ok(size) => tokio::fs::rename(&part_path, &path)
                .await
                .map(|_| size)
                .map_err(DownloadError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(size) => {
                info!(variant = %variant.label, path = %path.display(), size, "Variant downloaded");
                Ok(DownloadedArtifact {
                    variant: variant.clone(),
                    path,
                    size,
                })
            }
            Err(reason) => {
                remove_partial(&part_path).await;
                warn!(variant = %variant.label, url = %variant.url, error = %reason, "Variant failed");
                Err(VariantFailure {
                    variant: variant.clone(),
                    reason,
                })
            }
        }
    }

    async fn fetch_to_file(&self, url: &str, path: &Path) -> Result<u64, DownloadError> {
        let response = self.open(url).await?;
        write_body(response, path).await
    }

    /// Issue the GET and follow redirects by hand, up to `max_redirects` hops.
    async fn open(&self, url: &str) -> Result<Response, DownloadError> {
        let mut current =
            Url::parse(url).map_err(|e| DownloadError::UrlError(format!("{url}: {e}")))?;

        for hop in 0..=self.max_redirects {
            let response = self.session.get(current.as_str()).send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }
            if !status.is_redirection() {
                return Err(DownloadError::StatusCode(status));
            }

            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .ok_or(DownloadError::MissingLocation)?;
            let next = current
                .join(location)
                .map_err(|e| DownloadError::UrlError(format!("{location}: {e}")))?;

            debug!(hop = hop + 1, from = %current, to = %next, "Following redirect");
            current = next;
        }

        Err(DownloadError::TooManyRedirects(self.max_redirects))
    }
}

/// Stream the response body to `path` and return the size on disk.
async fn write_body(response: Response, path: &Path) -> Result<u64, DownloadError> {
    let file = File::create(path).await?;
    let mut writer = BufWriter::new(file);

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        writer.write_all(&chunk?).await?;
    }
    writer.flush().await?;

    Ok(tokio::fs::metadata(path).await?.len())
}

fn part_extension(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{ext}.{PART_EXTENSION}"),
        None => PART_EXTENSION.to_string(),
    }
}

async fn remove_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "Failed to remove partial file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{ResolvedSource, SourceKind};
    use crate::planner::plan;
    use crate::test_utils::{init_test_tracing, test_session, unreachable_url};
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn downloader(config: &AcquireConfig) -> RedundantDownloader {
        RedundantDownloader::new(test_session(config), config)
    }

    fn body(len: usize) -> Vec<u8> {
        vec![0x42; len]
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_target_path_naming() {
        let downloader = downloader(&AcquireConfig::default());
        let dir = Path::new("/downloads");
        let variant = DownloadVariant::new("https://a", "no-watermark", "_nowm");

        assert_eq!(
            downloader.target_path(dir, "7301.mp4", &variant),
            PathBuf::from("/downloads/7301_nowm.mp4")
        );
        assert_eq!(
            downloader.target_path(dir, "7301", &variant),
            PathBuf::from("/downloads/7301_nowm.mp4")
        );
        assert_eq!(
            downloader.target_path(dir, "7301.mov", &variant),
            PathBuf::from("/downloads/7301_nowm.mov")
        );
    }

    #[tokio::test]
    async fn test_single_variant_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/video"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body(4096)))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let variants = vec![DownloadVariant::new(
            format!("{}/video", server.uri()),
            "original",
            "",
        )];

        let artifacts = downloader(&AcquireConfig::default())
            .download_all(&variants, dir.path(), "7301.mp4")
            .await
            .unwrap();

        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].size, 4096);
        assert_eq!(artifacts[0].path, dir.path().join("7301.mp4"));
        assert_eq!(std::fs::read(&artifacts[0].path).unwrap().len(), 4096);
        assert_eq!(file_names(dir.path()), vec!["7301.mp4"]);
    }

    #[tokio::test]
    async fn test_small_artifact_is_deleted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/video"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body(1000)))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let variants = vec![DownloadVariant::new(
            format!("{}/video", server.uri()),
            "original",
            "",
        )];

        let outcomes = downloader(&AcquireConfig::default())
            .download_each(&variants, dir.path(), "7301.mp4")
            .await;

        assert_eq!(outcomes.len(), 1);
        let failure = outcomes[0].as_ref().unwrap_err();
        assert!(matches!(
            failure.reason,
            DownloadError::ArtifactTooSmall { size: 1000, min: 1024 }
        ));
        assert!(file_names(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_threshold_is_exclusive() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/video"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body(1024)))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let variants = vec![DownloadVariant::new(
            format!("{}/video", server.uri()),
            "original",
            "",
        )];

        let result = downloader(&AcquireConfig::default())
            .download_all(&variants, dir.path(), "7301.mp4")
            .await;

        assert!(matches!(result, Err(AcquireError::AllDownloadsFailed(ref f)) if f.len() == 1));
        assert!(file_names(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_one_of_three_variants_succeeds() {
        init_test_tracing();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/play/"))
            .and(query_param("watermark", "1"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/play/"))
            .and(query_param("watermark", "0"))
            .and(query_param("logo", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body(100)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/play/"))
            .and(query_param("watermark", "0"))
            .and(query_param("logo", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body(8192)))
            .mount(&server)
            .await;

        let source = ResolvedSource::new(
            &format!("{}/play/?video_id=v1&watermark=1&logo=1", server.uri()),
            SourceKind::PlayAddr,
            3,
        );
        let variants = plan(&source);
        assert_eq!(variants.len(), 3);

        let dir = TempDir::new().unwrap();
        let config = AcquireConfig::default();
        let outcomes = downloader(&config)
            .download_each(&variants, dir.path(), "7301.mp4")
            .await;

        assert_eq!(outcomes.len(), 3);
        assert!(matches!(
            outcomes[0].as_ref().unwrap_err().reason,
            DownloadError::StatusCode(status) if status == 403
        ));
        assert!(matches!(
            outcomes[1].as_ref().unwrap_err().reason,
            DownloadError::ArtifactTooSmall { .. }
        ));

        let artifacts = downloader(&config)
            .download_all(&variants, dir.path(), "7301.mp4")
            .await
            .unwrap();

        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].variant.label, "no-watermark-no-logo");
        assert_eq!(artifacts[0].size, 8192);
        assert_eq!(file_names(dir.path()), vec!["7301_clean.mp4"]);
        assert!(!dir.path().join("7301.mp4").exists());
        assert!(!dir.path().join("7301_nowm.mp4").exists());
    }

    #[tokio::test]
    async fn test_failure_does_not_clobber_existing_artifact() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/video"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body(10)))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("7301.mp4"), body(2048)).unwrap();
        let variants = vec![DownloadVariant::new(
            format!("{}/video", server.uri()),
            "original",
            "",
        )];

        let result = downloader(&AcquireConfig::default())
            .download_all(&variants, dir.path(), "7301.mp4")
            .await;

        assert!(result.is_err());
        assert_eq!(std::fs::read(dir.path().join("7301.mp4")).unwrap().len(), 2048);
        assert_eq!(file_names(dir.path()), vec!["7301.mp4"]);
    }

    #[tokio::test]
    async fn test_redirects_are_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/short"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/cdn/v.mp4"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cdn/v.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body(2048)))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let variants = vec![DownloadVariant::new(
            format!("{}/short", server.uri()),
            "original",
            "",
        )];

        let artifacts = downloader(&AcquireConfig::default())
            .download_all(&variants, dir.path(), "7301")
            .await
            .unwrap();

        assert_eq!(artifacts[0].size, 2048);
    }

    #[tokio::test]
    async fn test_redirect_loop_is_capped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/loop"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/loop"))
            .expect(3)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let config = AcquireConfig::builder().with_max_redirects(2).build();
        let variants = vec![DownloadVariant::new(
            format!("{}/loop", server.uri()),
            "original",
            "",
        )];

        let outcomes = downloader(&config)
            .download_each(&variants, dir.path(), "7301")
            .await;

        assert!(matches!(
            outcomes[0].as_ref().unwrap_err().reason,
            DownloadError::TooManyRedirects(2)
        ));
    }

    #[tokio::test]
    async fn test_redirect_without_location() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/video"))
            .respond_with(ResponseTemplate::new(301))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let variants = vec![DownloadVariant::new(
            format!("{}/video", server.uri()),
            "original",
            "",
        )];

        let outcomes = downloader(&AcquireConfig::default())
            .download_each(&variants, dir.path(), "7301")
            .await;

        assert!(matches!(
            outcomes[0].as_ref().unwrap_err().reason,
            DownloadError::MissingLocation
        ));
    }

    #[tokio::test]
    async fn test_all_failed_reports_every_variant() {
        let dir = TempDir::new().unwrap();
        let variants = vec![
            DownloadVariant::new(unreachable_url(), "original", ""),
            DownloadVariant::new("not a url", "no-watermark", "_nowm"),
        ];

        let result = downloader(&AcquireConfig::default())
            .download_all(&variants, dir.path(), "7301.mp4")
            .await;

        match result {
            Err(AcquireError::AllDownloadsFailed(failures)) => {
                assert_eq!(failures.len(), 2);
                assert!(matches!(failures[0].reason, DownloadError::HttpError(_)));
                assert!(matches!(failures[1].reason, DownloadError::UrlError(_)));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(file_names(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_download_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(body(4096))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let config = AcquireConfig::builder()
            .with_download_timeout(Duration::from_millis(200))
            .build();
        let variants = vec![DownloadVariant::new(
            format!("{}/slow", server.uri()),
            "original",
            "",
        )];

        let outcomes = downloader(&config)
            .download_each(&variants, dir.path(), "7301")
            .await;

        assert!(matches!(
            outcomes[0].as_ref().unwrap_err().reason,
            DownloadError::Timeout(_)
        ));
        assert!(file_names(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_sequential_mode_keeps_input_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body(2000)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body(3000)))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let config = AcquireConfig::builder()
            .with_concurrent_downloads(false)
            .build();
        let variants = vec![
            DownloadVariant::new(format!("{}/a", server.uri()), "original", ""),
            DownloadVariant::new(format!("{}/b", server.uri()), "no-watermark", "_nowm"),
        ];

        let artifacts = downloader(&config)
            .download_all(&variants, dir.path(), "7301.mp4")
            .await
            .unwrap();

        let sizes: Vec<u64> = artifacts.iter().map(|a| a.size).collect();
        assert_eq!(sizes, vec![2000, 3000]);
        assert_eq!(file_names(dir.path()), vec!["7301.mp4", "7301_nowm.mp4"]);
    }
}
