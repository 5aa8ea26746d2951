//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::{supports_color, StatusArgs},
    config::env::EnvManager,
    error::Result,
    models::Config,
};

/// Combines `status` arguments with the environment into a [`Config`]
pub struct ConfigParser {
    args: StatusArgs,
}

impl ConfigParser {
    pub fn new(args: StatusArgs) -> Self {
        Self { args }
    }

    /// Defaults, then `.env`, then the process environment, then CLI flags
    pub fn parse(&self) -> Result<Config> {
        EnvManager::load_env_file()?;
        self.parse_with_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ConfigParser::parse`] with an explicit environment and no `.env` loading
    pub fn parse_with_lookup<F>(&self, lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        config.merge_from_lookup(lookup)?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_cli_overrides(&self, config: &mut Config) {
        let args = &self.args;

        config.network = args.network;
        config.config_source = args.config.clone();
        config.exact_archive_depth = args.exact;

        if let Some(timeout) = args.timeout {
            config.probe_timeout_ms = timeout;
        }

        if let Some(deadline) = args.deadline {
            config.deadline_secs = deadline;
        }

        if let Some(concurrency) = args.concurrency {
            config.concurrency = concurrency;
        }

        config.enable_color = match args.use_colors() {
            Some(forced) => forced,
            None => config.enable_color && supports_color(),
        };

        // These are CLI-only
        config.verbose = args.verbose;
        config.debug = args.debug;
    }
}

/// Convenience function to load the complete configuration
pub fn load_config(args: StatusArgs) -> Result<Config> {
    ConfigParser::new(args).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Network: {}", config.network));
    summary.push(format!("Source: {}", config.source().describe()));
    summary.push(format!("Probe timeout: {}ms", config.probe_timeout_ms));
    match config.deadline() {
        Some(deadline) => summary.push(format!("Deadline: {}s", deadline.as_secs())),
        None => summary.push("Deadline: none".to_string()),
    }
    if config.concurrency == 0 {
        summary.push("Concurrency: one probe per endpoint".to_string());
    } else {
        summary.push(format!("Concurrency: {}", config.concurrency));
    }
    summary.push(format!("Archive depth: {}", if config.exact_archive_depth { "exact" } else { "quick" }));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
