use clap::Parser;
use std::path::PathBuf;

/// WCAG Auditor: runs accessibility audits against public web pages.
#[derive(Parser, Debug, Clone)]
#[command(name = "wcag-auditor")]
pub struct CliArgs {
    /// HTTP port for the audit API
    #[arg(long = "port", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Chrome remote-debugging endpoint
    #[arg(long = "chrome", default_value = DEFAULT_CHROME_ENDPOINT)]
    pub chrome_endpoint: String,

    /// Path to the axe-core bundle injected into audited pages
    #[arg(long = "axe-script", default_value = "assets/axe.min.js")]
    pub axe_script: PathBuf,

    /// Markup validation service endpoint (Nu validator JSON API)
    #[arg(long = "validator-url", default_value = DEFAULT_VALIDATOR_URL)]
    pub validator_url: String,

    /// SQLite database file for check history
    #[arg(long = "db", default_value = "wcag-checks.db")]
    pub db_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AuditorConfig {
    pub port: u16,
    pub chrome_endpoint: String,
    pub axe_script: PathBuf,
    pub validator_url: String,
    pub db_path: PathBuf,
}

// Port and endpoint constants
pub const DEFAULT_PORT: u16 = 8970;
pub const DEFAULT_CHROME_ENDPOINT: &str = "http://127.0.0.1:9222";
pub const DEFAULT_VALIDATOR_URL: &str = "https://validator.w3.org/nu/?out=json";

// Navigation constants
pub const NAV_TIMEOUT_SECS: u64 = 30;
pub const NAV_POLL_INTERVAL_MS: u64 = 100;
pub const PAGE_CALL_TIMEOUT_SECS: u64 = 30;
pub const PAGE_VIEWPORT_WIDTH: u32 = 1920;
pub const PAGE_VIEWPORT_HEIGHT: u32 = 1080;

// Outbound HTTP constants
pub const HTTP_CLIENT_TIMEOUT_SECS: u64 = 30;
pub const VALIDATOR_TIMEOUT_SECS: u64 = 30;
pub const VALIDATOR_USER_AGENT: &str = "wcag-auditor/0.1";

// History constants
pub const HISTORY_LIMIT: usize = 50;

/// Conformance profile: only rules carrying these tags run.
pub const WCAG_TAGS: &[&str] = &["wcag2a", "wcag2aa", "wcag21a", "wcag21aa"];

impl AuditorConfig {
    pub fn from_args(args: CliArgs) -> Self {
        AuditorConfig {
            port: args.port,
            chrome_endpoint: args.chrome_endpoint.trim_end_matches('/').to_string(),
            axe_script: args.axe_script,
            validator_url: args.validator_url,
            db_path: args.db_path,
        }
    }
}
