use std::{io::ErrorKind, path::{Path, PathBuf}, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use tracing::debug;
use url::Url;
use validator::Validate;

use crate::{browser::chrome::ChromeOptions, cli::Cli, job_boards::SearchQuery};


#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct BrowserConfig {
    /// The Chrome/Chromium executable. Found automatically when missing.
    pub(crate) chrome_path: Option<PathBuf>,
    pub(crate) headless: bool,
    /// How long to wait for elements and frames before giving up.
    #[validate(range(min = 100))]
    pub(crate) element_timeout_ms: u64
}


impl Default for BrowserConfig {
    fn default() -> Self {
        Self { chrome_path: None, headless: true, element_timeout_ms: 10_000 }
    }
}


/// Settings read from `config.toml`, overridden by command line flags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    /// Wait after each posting, in milliseconds.
    #[validate(range(max = 60000))]
    pub(crate) pause_ms: u64,
    /// Search page to start from instead of the board's default.
    pub(crate) start_url: Option<Url>,
    #[validate]
    pub(crate) search: SearchQuery,
    #[validate]
    pub(crate) browser: BrowserConfig
}


impl Default for Config {
    fn default() -> Self {
        Self {
            pause_ms: 1000,
            start_url: None,
            search: SearchQuery::default(),
            browser: BrowserConfig::default()
        }
    }
}


impl Config {
    /// Reads the config file, falling back to the defaults if there is none.
    pub(crate) async fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display()))
        };
        Self::parse(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub(crate) fn apply_cli(&mut self, cli: &Cli) {
        macro_rules! set {
            ($field: expr, $flag: expr) => {
                if let Some(value) = $flag.clone() {
                    $field = value;
                }
            };
        }

        set!(self.search.what, cli.query);
        set!(self.search.location, cli.location);
        set!(self.search.exclude, cli.exclude);
        set!(self.search.results_per_page, cli.results_per_page);
        set!(self.search.sort, cli.sort);
        set!(self.pause_ms, cli.pause_ms);
        if cli.start_url.is_some() {
            self.start_url = cli.start_url.clone();
        }
        if cli.driver_path.is_some() {
            self.browser.chrome_path = cli.driver_path.clone();
        }
        if cli.headed {
            self.browser.headless = false;
        }
    }

    pub(crate) fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    pub(crate) fn chrome_options(&self) -> ChromeOptions {
        ChromeOptions {
            chrome_path: self.browser.chrome_path.clone(),
            headless: self.browser.headless,
            element_timeout: Duration::from_millis(self.browser.element_timeout_ms)
        }
    }
}
