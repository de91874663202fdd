use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use serde::Deserialize;

/// Configuration for the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the FastFix REST API
    #[serde(default)]
    pub api_base_url: String,
    /// Where printable invoices and quotations are written
    #[serde(default = "default_print_dir")]
    pub print_dir: String,
    /// File that receives tracing output while the terminal UI is running
    #[serde(default = "default_log_file")]
    pub log_file: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_shop_name")]
    pub shop_name: String,
    #[serde(default = "default_shop_address")]
    pub shop_address: String,
    #[serde(default = "default_shop_phones")]
    pub shop_phones: String,
    #[serde(default = "default_shop_email")]
    pub shop_email: String,
}

fn default_print_dir() -> String {
    "prints".to_string()
}

fn default_log_file() -> String {
    "fastfix-console.log".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_shop_name() -> String {
    "FastFix Auto Maintenance".to_string()
}

fn default_shop_address() -> String {
    "Industrial Area 5, Sharjah".to_string()
}

fn default_shop_phones() -> String {
    "0529479330, 055656616".to_string()
}

fn default_shop_email() -> String {
    "fastfixautoMaint@gmail.com".to_string()
}

/// Command-line overrides for the environment configuration
#[derive(Debug, Parser)]
#[command(name = "fastfix-console", about = "FastFix workshop administration console")]
pub struct Cli {
    /// Base URL of the FastFix REST API
    #[arg(long)]
    pub api_url: Option<String>,
    /// Output directory for printable documents
    #[arg(long)]
    pub print_dir: Option<String>,
    /// Log file path
    #[arg(long)]
    pub log_file: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into Config struct
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    /// Apply command-line overrides on top of the environment
    pub fn with_overrides(mut self, cli: Cli) -> Self {
        if let Some(url) = cli.api_url {
            self.api_base_url = url;
        }
        if let Some(dir) = cli.print_dir {
            self.print_dir = dir;
        }
        if let Some(file) = cli.log_file {
            self.log_file = file;
        }
        self
    }

    /// API base URL without a trailing slash
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    let cli = Cli::parse();

    let config = Config::load()?.with_overrides(cli);
    if config.api_base_url().is_empty() {
        anyhow::bail!("API_BASE_URL is not set; export it or pass --api-url");
    }

    Ok(config)
}
