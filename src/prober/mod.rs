//! Endpoint probing
//!
//! [`Prober`] checks one endpoint and never fails: every outcome is a
//! [`ProbeResult`]. [`probe_all`] runs probes concurrently under an
//! optional aggregate deadline and keeps results in endpoint order. The
//! deadline only cuts probes that have not completed their handshake; once
//! an endpoint answered, it stays reachable and keeps whatever details were
//! collected in time.

pub mod archive;

use crate::adnl::tl::{self, LiteRequest};
use crate::adnl::{AdnlConnection, AdnlError, AdnlResult};
use crate::logging::Logger;
use crate::models::{Config, EndpointDescriptor, ProbeResult, ServerDetails, StatusReport};
use crate::types::ProbeErrorKind;
use archive::BlockLookup;
use async_trait::async_trait;
use futures::future::join_all;
use std::future::Future;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::Semaphore;

/// Reachability check of a single endpoint
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, endpoint: &EndpointDescriptor, budget: ProbeBudget) -> ProbeResult;
}

/// Time a single probe may spend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeBudget {
    /// Bound for the handshake and for each follow-up query
    pub timeout: Duration,
    /// End of the whole probing phase
    pub deadline: Option<Instant>,
}

impl ProbeBudget {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout, deadline: None }
    }

    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// The probe timeout, cut short by the deadline if it comes first
    pub fn step_timeout(&self) -> Duration {
        match self.deadline {
            Some(deadline) => self
                .timeout
                .min(deadline.saturating_duration_since(Instant::now())),
            None => self.timeout,
        }
    }
}

/// Settings of one probing phase
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOptions {
    pub timeout: Duration,
    /// Probes still pending at the deadline are reported as timed out
    pub deadline: Option<Duration>,
    /// Maximum probes in flight, 0 for no limit
    pub concurrency: usize,
    pub exact: bool,
}

impl ProbeOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: config.probe_timeout(),
            deadline: config.deadline(),
            concurrency: config.concurrency,
            exact: config.exact_archive_depth,
        }
    }
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Probe every endpoint and collect results in input order
pub async fn probe_all<P>(prober: &P, endpoints: &[EndpointDescriptor], options: &ProbeOptions) -> StatusReport
where
    P: Prober + ?Sized,
{
    let start = Instant::now();
    let permits = match options.concurrency {
        0 => endpoints.len().max(1),
        limit => limit,
    };
    let semaphore = Semaphore::new(permits);
    let budget = ProbeBudget::new(options.timeout).with_deadline(options.deadline.map(|d| Instant::now() + d));

    let probes = endpoints.iter().map(|endpoint| {
        let semaphore = &semaphore;
        async move {
            let _permit = match budget.deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline.into(), semaphore.acquire()).await {
                    Ok(permit) => permit,
                    Err(_) => return ProbeResult::failed(endpoint.clone(), ProbeErrorKind::Timeout),
                },
                None => semaphore.acquire().await,
            };
            prober.probe(endpoint, budget).await
        }
    });

    let results = join_all(probes).await;
    StatusReport::new(results, start.elapsed())
}

async fn bounded<T, F>(timeout: Duration, operation: F) -> AdnlResult<T>
where
    F: Future<Output = AdnlResult<T>>,
{
    tokio::time::timeout(timeout, operation)
        .await
        .unwrap_or(Err(AdnlError::Timeout))
}

/// Probes lite-servers over ADNL and collects [`ServerDetails`]
pub struct AdnlProber {
    logger: Logger,
    exact: bool,
}

impl AdnlProber {
    pub fn new(logger: Logger, exact: bool) -> Self {
        Self { logger, exact }
    }

    /// Query what the server is willing to tell. Stops at the first failure
    /// that leaves the stream out of sync. Fields are filled as answers
    /// arrive so a cancelled collection keeps what it got.
    async fn collect_details(&self, session: &mut Session<'_>, details: &mut ServerDetails) {
        details.ping = session.ping().await.ok();

        if let Ok(answer) = session.query(LiteRequest::GetTime).await {
            details.time = tl::parse_current_time(&answer).ok();
        }

        if let Ok(answer) = session.query(LiteRequest::GetVersion).await {
            details.version = tl::parse_version(&answer).ok();
        }

        let started = Instant::now();
        if let Ok(answer) = session.query(LiteRequest::GetMasterchainInfo).await {
            if let Ok(block) = tl::parse_masterchain_info(&answer) {
                details.request = Some(started.elapsed());
                details.last_seqno = Some(block.seqno);
            }
        }

        if session.usable {
            let now = details.time.unwrap_or_else(unix_now);
            details.archive_depth = Some(if self.exact {
                archive::exact_depth(session, now).await
            } else {
                archive::quick_depth(session, now).await
            });
        }
    }
}

#[async_trait]
impl Prober for AdnlProber {
    async fn probe(&self, endpoint: &EndpointDescriptor, budget: ProbeBudget) -> ProbeResult {
        let start = Instant::now();

        let mut connection = match bounded(budget.step_timeout(), AdnlConnection::connect(endpoint)).await {
            Ok(connection) => connection,
            Err(e) => {
                self.logger
                    .debug("Connection failed")
                    .endpoint(endpoint)
                    .field("reason", e.to_string())
                    .log()
                    .await;
                return ProbeResult::failed(endpoint.clone(), e.kind());
            }
        };
        let latency = start.elapsed();

        let mut details = ServerDetails::default();
        let mut session = Session::new(&mut connection, budget.timeout, &self.logger, endpoint);
        let collect = self.collect_details(&mut session, &mut details);
        match budget.deadline {
            Some(deadline) => {
                if tokio::time::timeout_at(deadline.into(), collect).await.is_err() {
                    self.logger
                        .debug("Deadline reached while collecting details")
                        .endpoint(endpoint)
                        .log()
                        .await;
                }
            }
            None => collect.await,
        }
        let _ = connection.close().await;

        let result = ProbeResult::reachable(endpoint.clone(), latency, details);
        self.logger.debug("Probe finished").probe_result(&result).log().await;
        result
    }
}

/// An open connection plus whether it can still carry queries
struct Session<'a> {
    connection: &'a mut AdnlConnection,
    timeout: Duration,
    usable: bool,
    logger: &'a Logger,
    endpoint: &'a EndpointDescriptor,
}

impl<'a> Session<'a> {
    fn new(
        connection: &'a mut AdnlConnection,
        timeout: Duration,
        logger: &'a Logger,
        endpoint: &'a EndpointDescriptor,
    ) -> Self {
        Self { connection, timeout, usable: true, logger, endpoint }
    }

    async fn ping(&mut self) -> AdnlResult<Duration> {
        if !self.usable {
            return Err(AdnlError::Closed);
        }
        let result = bounded(self.timeout, self.connection.ping()).await;
        self.record(result).await
    }

    async fn query(&mut self, request: LiteRequest) -> AdnlResult<Vec<u8>> {
        if !self.usable {
            return Err(AdnlError::Closed);
        }
        let result = bounded(self.timeout, self.connection.query(&request)).await;
        self.record(result).await
    }

    /// Anything but a lite-server error leaves the stream out of sync
    async fn record<T>(&mut self, result: AdnlResult<T>) -> AdnlResult<T> {
        if let Err(e) = &result {
            if !matches!(e, AdnlError::LiteServer { .. }) {
                self.usable = false;
            }
            self.logger
                .debug("Lite-server request failed")
                .endpoint(self.endpoint)
                .field("reason", e.to_string())
                .log()
                .await;
        }
        result
    }
}

#[async_trait]
impl<'a> BlockLookup for Session<'a> {
    async fn has_block_at(&mut self, utime: u32) -> AdnlResult<bool> {
        let answer = self.query(LiteRequest::LookupBlockByUtime(utime)).await;

        match answer.and_then(|answer| tl::check_block_header(&answer)) {
            Ok(()) => Ok(true),
            Err(AdnlError::LiteServer { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn unix_now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}
