use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "spatialcode-viewer")]
#[command(version, about = "Turn a UI screenshot and a short description into a generated project")]
pub struct Cli {
    /// Base URL of the analysis API
    #[arg(long, env = "SPATIALCODE_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Request timeout in seconds for service calls
    #[arg(long, env = "SPATIALCODE_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Open a saved analysis result (JSON) at startup
    #[arg(long, value_name = "PATH")]
    pub result: Option<PathBuf>,

    /// Enable debug logging when RUST_LOG is not set
    #[arg(short, long)]
    pub verbose: bool,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Session configuration. Nothing is persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub timeout_secs: u64,
    pub initial_result: Option<PathBuf>,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            initial_result: None,
            verbose: false,
        }
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            api_url: cli.api_url.trim().to_string(),
            timeout_secs: cli.timeout_secs.max(1),
            initial_result: cli.result,
            verbose: cli.verbose,
        }
    }
}

impl Config {
    /// Default `env_logger` filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_arguments() {
        let cli = Cli::try_parse_from([
            "spatialcode-viewer",
            "--api-url",
            " https://codegen.example.com/api/v1 ",
            "--timeout-secs",
            "0",
            "--result",
            "saved.json",
            "-v",
        ])
        .unwrap();
        let config = Config::from(cli);
        assert_eq!(config.api_url, "https://codegen.example.com/api/v1");
        assert_eq!(config.timeout_secs, 1);
        assert_eq!(config.initial_result, Some(PathBuf::from("saved.json")));
        assert_eq!(config.log_filter(), "debug");
    }

    #[test]
    fn test_default_config_values() {
        let config = Config::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.log_filter(), "info");
    }

    #[test]
    fn test_rejects_non_numeric_timeout() {
        assert!(Cli::try_parse_from(["spatialcode-viewer", "--timeout-secs", "soon"]).is_err());
    }
}
