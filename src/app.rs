//! Main application orchestration and execution

use crate::{
    cli::StatusArgs,
    config::{display_config_summary, load_config, ConfigResolver},
    error::Result,
    logging::{Logger, LoggerFactory},
    models::{Config, EndpointDescriptor, StatusReport},
    output::StatusReporter,
    prober::{probe_all, AdnlProber, ProbeOptions, Prober},
};
use std::time::Instant;

/// One `status` invocation: resolve, probe, render
pub struct App {
    config: Config,
    logger: Logger,
    reporter: StatusReporter,
}

impl App {
    /// Build the configuration from CLI arguments and the environment
    pub async fn from_args(args: StatusArgs) -> Result<Self> {
        let config = load_config(args)?;
        Ok(Self::new(config).await)
    }

    pub async fn new(config: Config) -> Self {
        let logger = LoggerFactory::new(&config).create_logger("APP").await;
        let reporter = StatusReporter::new(config.enable_color);
        Self { config, logger, reporter }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve the configured source. Fails before any probing happens.
    pub async fn resolve(&self) -> Result<Vec<EndpointDescriptor>> {
        let resolver = ConfigResolver::new(self.config.fetch_timeout(), self.logger.named("CONFIG"))?;
        resolver.resolve(&self.config.source()).await
    }

    /// Probe `endpoints` with `prober` and return the rendered report
    pub async fn probe_and_render<P>(&self, prober: &P, endpoints: &[EndpointDescriptor]) -> (StatusReport, String)
    where
        P: Prober + ?Sized,
    {
        let options = ProbeOptions::from_config(&self.config);
        let report = probe_all(prober, endpoints, &options).await;

        self.logger
            .info("Probing finished")
            .field("endpoints", report.len())
            .field("reachable", report.reachable_count())
            .field("elapsed_ms", report.elapsed().as_millis() as u64)
            .log()
            .await;

        let rendered = self.reporter.render(&report);
        (report, rendered)
    }

    /// Run the whole command, printing the report to stdout.
    ///
    /// Unreachable endpoints are part of the report, not an error.
    pub async fn run(self) -> Result<StatusReport> {
        let started = Instant::now();

        self.logger
            .debug(&format!("Starting {}", crate::long_version()))
            .field("config", display_config_summary(&self.config))
            .log()
            .await;

        let operation = self.logger.start_operation("status").await;
        let endpoints = match self.resolve().await {
            Ok(endpoints) => endpoints,
            Err(e) => {
                self.logger.end_operation(&operation, "status", false).await;
                return Err(e);
            }
        };

        println!("{}", self.reporter.running_banner());
        println!();

        let prober = AdnlProber::new(self.logger.named("PROBE"), self.config.exact_archive_depth);
        let (report, rendered) = self.probe_and_render(&prober, &endpoints).await;

        print!("{}", rendered);
        println!();
        println!("{}", self.reporter.reachability_summary(&report));
        println!("{}", self.reporter.completed_banner(started.elapsed()));

        self.logger.end_operation(&operation, "status", true).await;
        Ok(report)
    }
}
