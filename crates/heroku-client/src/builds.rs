//! Build submission and status polling.
//!
//! A build moves `pending -> succeeded | failed` on the platform side. The
//! client submits it, then re-fetches it every poll interval until the status
//! is anything other than `pending`. A failed build is a normal result; only
//! transport and API failures, exhausted poll bounds and cancellation are
//! errors.

use crate::client::{segment, HerokuClient, NO_BODY};
use crate::config::PollConfig;
use crate::error::{HerokuError, HerokuResult};
use crate::types::{BuildRecord, CreateBuildRequest, SourceBlob};
use github_client::tarball_url;
use reqwest::Method;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Default delay between build status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Deadline used by [`PollOptions::bounded`].
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// How to wait for a build to finish.
///
/// The default polls forever. Production callers should set a timeout or an
/// attempt limit, e.g. with [`PollOptions::bounded`].
#[derive(Debug, Clone)]
pub struct PollOptions {
    pub interval: Duration,
    pub timeout: Option<Duration>,
    pub max_attempts: Option<u32>,
    cancel: Option<watch::Receiver<bool>>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
            max_attempts: None,
            cancel: None,
        }
    }
}

impl PollOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default interval with a [`DEFAULT_POLL_TIMEOUT`] deadline.
    pub fn bounded() -> Self {
        Self::default().with_timeout(DEFAULT_POLL_TIMEOUT)
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Abort polling once `true` is sent on the channel.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }
}

impl From<&PollConfig> for PollOptions {
    fn from(config: &PollConfig) -> Self {
        Self {
            interval: config.interval,
            timeout: config.timeout,
            max_attempts: config.max_attempts,
            cancel: None,
        }
    }
}

impl HerokuClient {
    /// Poll options from this client's configuration.
    pub fn poll_options(&self) -> PollOptions {
        PollOptions::from(&self.poll)
    }

    /// Submit a build without waiting for it.
    #[instrument(skip(self))]
    pub async fn create_build(&self, app: &str, source: &SourceBlob) -> HerokuResult<BuildRecord> {
        let build: BuildRecord = self
            .execute(
                Method::POST,
                &format!("/apps/{}/builds", segment(app)),
                Some(&CreateBuildRequest {
                    source_blob: source,
                }),
            )
            .await?;

        info!(build_id = %build.id, app_id = %build.app.id, status = %build.status, "Submitted build");
        Ok(build)
    }

    /// Fetch a build by app and build id.
    #[instrument(skip(self))]
    pub async fn get_build(&self, app: &str, build_id: &str) -> HerokuResult<BuildRecord> {
        self.execute(
            Method::GET,
            &format!("/apps/{}/builds/{}", segment(app), segment(build_id)),
            NO_BODY,
        )
        .await
    }

    /// Poll `build` until its status is no longer `pending`.
    ///
    /// A failed status fetch aborts the loop; it is not retried.
    #[instrument(skip(self, build, options), fields(build_id = %build.id))]
    pub async fn wait_for_build(
        &self,
        build: BuildRecord,
        mut options: PollOptions,
    ) -> HerokuResult<BuildRecord> {
        let started = self.clock.now();
        let mut build = build;
        let mut attempts: u32 = 0;

        while build.status.is_pending() {
            if options.is_cancelled() {
                return Err(self.cancelled(&build));
            }
            if options.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(self.poll_timeout(&build, attempts, started));
            }

            let mut delay = options.interval;
            if let Some(timeout) = options.timeout {
                let elapsed = self.clock.now().saturating_duration_since(started);
                if elapsed >= timeout {
                    return Err(self.poll_timeout(&build, attempts, started));
                }
                delay = delay.min(timeout - elapsed);
            }

            if self.pause(delay, &mut options.cancel).await {
                return Err(self.cancelled(&build));
            }

            attempts += 1;
            build = self.get_build(&build.app.id, &build.id).await?;
            debug!(attempt = attempts, status = %build.status, "Polled build");
        }

        info!(status = %build.status, attempts, "Build finished");
        Ok(build)
    }

    /// Submit a build from a source archive and wait for it to finish.
    #[instrument(skip(self, options))]
    pub async fn build_from_source(
        &self,
        app: &str,
        source: SourceBlob,
        options: PollOptions,
    ) -> HerokuResult<BuildRecord> {
        let build = self.create_build(app, &source).await?;
        self.wait_for_build(build, options).await
    }

    /// Build the head of `branch` of a GitHub repository and wait for it to
    /// finish.
    ///
    /// Without an explicit `version`, the branch's head commit sha is looked
    /// up and recorded as the build version.
    #[instrument(skip(self, options))]
    pub async fn build_from_repository(
        &self,
        app: &str,
        repo_url: &str,
        branch: &str,
        version: Option<&str>,
        options: PollOptions,
    ) -> HerokuResult<BuildRecord> {
        let version = match version {
            Some(version) => version.to_string(),
            None => self.github.resolve_commit(repo_url, branch).await?,
        };

        let source = SourceBlob::new(tarball_url(repo_url, branch)).with_version(version);
        self.build_from_source(app, source, options).await
    }

    /// Sleep for `delay`, returning early with `true` if cancelled.
    async fn pause(&self, delay: Duration, cancel: &mut Option<watch::Receiver<bool>>) -> bool {
        let Some(rx) = cancel.as_mut() else {
            self.clock.sleep(delay).await;
            return false;
        };

        let cancelled = async {
            // A dropped sender can never cancel.
            if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = self.clock.sleep(delay) => false,
            _ = cancelled => true,
        }
    }

    fn poll_timeout(
        &self,
        build: &BuildRecord,
        attempts: u32,
        started: std::time::Instant,
    ) -> HerokuError {
        let elapsed = self.clock.now().saturating_duration_since(started);
        warn!(build_id = %build.id, attempts, ?elapsed, "Gave up waiting for build");
        HerokuError::PollTimeout {
            build_id: build.id.clone(),
            attempts,
            elapsed,
        }
    }

    fn cancelled(&self, build: &BuildRecord) -> HerokuError {
        warn!(build_id = %build.id, "Build polling cancelled");
        HerokuError::Cancelled {
            build_id: build.id.clone(),
        }
    }
}
