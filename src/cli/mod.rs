//! Command-line interface

use crate::types::NetworkPreset;
use clap::{Arg, ArgAction, ArgMatches, Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::io::IsTerminal;

/// Inspect ADNL clients (lite-servers) of the TON network
#[derive(Parser, Debug, Clone)]
#[command(name = "adnlctl")]
#[command(version, about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show lite-server status
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    /// Network name (mainnet or testnet)
    #[arg(short = 'n', long, value_parser = parse_network)]
    pub network: NetworkPreset,

    /// Config path or HTTP(S) URL (JSON)
    #[arg(short = 'c', long, value_name = "PATH_OR_URL")]
    pub config: Option<String>,

    /// Use precise archive depth check (slower)
    #[arg(long)]
    pub exact: bool,

    /// Per-probe timeout in milliseconds
    #[arg(long, value_name = "MS", value_parser = parse_timeout_ms)]
    pub timeout: Option<u64>,

    /// Deadline for the whole probing phase in seconds (0 disables it)
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Maximum number of concurrent probes (0 probes every endpoint at once)
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Force colored output
    #[arg(long, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// The clap command with a `-v/--version` flag in place of clap's `-V`
    pub fn command_with_version() -> clap::Command {
        Self::command().arg(
            Arg::new("version")
                .short('v')
                .long("version")
                .help("Show version and exit")
                .action(ArgAction::Version),
        )
    }

    /// Parse process arguments, exiting on `--help`, `--version` or usage errors
    pub fn parse_args() -> Self {
        let matches = Self::command_with_version().get_matches();
        Self::from_matches(&matches)
    }

    /// Parse from an explicit argument list
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = Self::command_with_version().try_get_matches_from(args)?;
        Self::from_arg_matches(&matches)
    }

    /// Whether error output should include hints beyond the error line
    pub fn wants_details(&self) -> bool {
        match &self.command {
            Command::Status(args) => args.verbose || args.debug,
        }
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self::from_arg_matches(matches).unwrap_or_else(|e| e.exit())
    }
}

impl StatusArgs {
    /// Check if colors should be enabled
    pub fn use_colors(&self) -> Option<bool> {
        if self.color {
            Some(true)
        } else if self.no_color {
            Some(false)
        } else {
            None
        }
    }
}

fn parse_network(s: &str) -> Result<NetworkPreset, String> {
    s.parse::<NetworkPreset>().map_err(|e| e.to_string())
}

/// Parse a timeout in milliseconds
fn parse_timeout_ms(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid timeout: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid timeout: {}", s))
        .and_then(|ms| {
            if ms == 0 {
                Err("Timeout must be greater than 0".to_string())
            } else if ms > crate::defaults::MAX_PROBE_TIMEOUT_MS {
                Err(format!(
                    "Timeout cannot exceed {} ms",
                    crate::defaults::MAX_PROBE_TIMEOUT_MS
                ))
            } else {
                Ok(ms)
            }
        })
}

/// Check if the terminal supports color output
pub fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    std::io::stdout().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(args: &[&str]) -> StatusArgs {
        let mut argv = vec!["adnlctl", "status"];
        argv.extend_from_slice(args);
        match Cli::try_parse_args(argv).unwrap().command {
            Command::Status(args) => args,
        }
    }

    #[test]
    fn test_status_minimal() {
        let args = status(&["-n", "mainnet"]);
        assert_eq!(args.network, NetworkPreset::Mainnet);
        assert_eq!(args.config, None);
        assert!(!args.exact);
        assert_eq!(args.timeout, None);
        assert_eq!(args.use_colors(), None);
    }

    #[test]
    fn test_status_all_options() {
        let args = status(&[
            "-n", "TESTNET",
            "-c", "https://ton.org/testnet-global.config.json",
            "--exact",
            "--timeout", "2500",
            "--deadline", "30",
            "--concurrency", "4",
            "--no-color",
            "--verbose",
            "--debug",
        ]);

        assert_eq!(args.network, NetworkPreset::Testnet);
        assert_eq!(args.config.as_deref(), Some("https://ton.org/testnet-global.config.json"));
        assert!(args.exact);
        assert_eq!(args.timeout, Some(2500));
        assert_eq!(args.deadline, Some(30));
        assert_eq!(args.concurrency, Some(4));
        assert_eq!(args.use_colors(), Some(false));
        assert!(args.verbose);
        assert!(args.debug);
    }

    #[test]
    fn test_error_details_follow_verbosity() {
        let quiet = Cli::try_parse_args(["adnlctl", "status", "-n", "mainnet"]).unwrap();
        assert!(!quiet.wants_details());

        for flag in ["--verbose", "--debug"] {
            let cli = Cli::try_parse_args(["adnlctl", "status", "-n", "mainnet", flag]).unwrap();
            assert!(cli.wants_details());
        }
    }

    #[test]
    fn test_network_is_required() {
        assert!(Cli::try_parse_args(["adnlctl", "status"]).is_err());
    }

    #[test]
    fn test_unknown_network_rejected() {
        let err = Cli::try_parse_args(["adnlctl", "status", "-n", "devnet"]).unwrap_err();
        assert!(err.to_string().contains("devnet"));
    }

    #[test]
    fn test_color_flags_conflict() {
        assert!(Cli::try_parse_args(["adnlctl", "status", "-n", "mainnet", "--color", "--no-color"]).is_err());
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_args(["adnlctl", "-v"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_timeout_parsing_edge_cases() {
        assert_eq!(parse_timeout_ms("1"), Ok(1));
        assert_eq!(parse_timeout_ms("60000"), Ok(60000));
        assert!(parse_timeout_ms("0").is_err());
        assert!(parse_timeout_ms("60001").is_err());
        assert!(parse_timeout_ms("+5").is_err());
        assert!(parse_timeout_ms("0x10").is_err());
        assert!(parse_timeout_ms("abc").is_err());
    }

    #[test]
    fn test_command_is_well_formed() {
        Cli::command_with_version().debug_assert();
    }
}
