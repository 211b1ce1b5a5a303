//! Run configuration for pinharvest.
//!
//! Raw values come from CLI flags backed by environment variables (a `.env`
//! file is loaded before parsing). They are validated once into immutable
//! config values that are handed to each component's constructor.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::browser::BrowserEngineConfig;

/// Default Pinterest origin.
pub const DEFAULT_SITE_BASE: &str = "https://www.pinterest.com";

/// Default Eagle API endpoint.
pub const DEFAULT_CATALOG_BASE: &str = "http://127.0.0.1:41595";

/// Default ledger location, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "./data/state.db";

/// Default browser locale.
pub const DEFAULT_LOCALE: &str = "ko-KR";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("PINTEREST_KEYWORDS is empty. Set keywords in .env")]
    MissingKeywords,
    #[error("Invalid jitter bounds: min {min}s, max {max}s (need 0 <= min <= max)")]
    InvalidJitter { min: f64, max: f64 },
    #[error("Invalid URL for {name}: {value}")]
    InvalidUrl { name: &'static str, value: String },
}

/// Parse a boolean environment value. Accepts `1`, `true`, `yes`, `on`
/// (case-insensitive); anything else is false.
pub fn parse_flag(value: &str) -> Result<bool, String> {
    Ok(matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    ))
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn validate_url(name: &'static str, value: &str) -> Result<String, ConfigError> {
    Url::parse(value).map_err(|_| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
    })?;
    Ok(value.trim_end_matches('/').to_string())
}

/// Ledger location flags.
#[derive(Debug, Clone, clap::Args)]
pub struct LedgerArgs {
    /// Path of the SQLite ledger of imported pins
    #[arg(long = "db-path", env = "DB_PATH", default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,
}

/// Eagle API flags.
#[derive(Debug, Clone, clap::Args)]
pub struct CatalogArgs {
    /// Eagle API base URL
    #[arg(long = "eagle-api-base", env = "EAGLE_API_BASE", default_value = DEFAULT_CATALOG_BASE)]
    pub api_base: String,
    /// Eagle API token
    #[arg(long = "eagle-token", env = "EAGLE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    /// Destination folder id
    #[arg(long = "eagle-folder-id", env = "EAGLE_FOLDER_ID")]
    pub folder_id: Option<String>,
    /// Comma-separated tags added to every import
    #[arg(long = "eagle-tags", env = "EAGLE_TAGS")]
    pub tags: Option<String>,
    /// Request timeout in seconds
    #[arg(long = "eagle-timeout", env = "EAGLE_TIMEOUT", default_value = "20")]
    pub timeout_secs: u64,
}

/// Jitter bounds shared by every paced command.
#[derive(Debug, Clone, clap::Args)]
pub struct PacingArgs {
    /// Lower jitter bound in seconds
    #[arg(long = "sleep-min", env = "RANDOM_SLEEP_MIN", default_value = "0.8")]
    pub sleep_min: f64,
    /// Upper jitter bound in seconds
    #[arg(long = "sleep-max", env = "RANDOM_SLEEP_MAX", default_value = "1.8")]
    pub sleep_max: f64,
}

/// Pinterest and browser flags for a harvest pass.
#[derive(Debug, Clone, clap::Args)]
pub struct SiteArgs {
    /// Comma-separated search keywords (required)
    #[arg(long, env = "PINTEREST_KEYWORDS")]
    pub keywords: Option<String>,
    /// Pinterest login email
    #[arg(long, env = "PINTEREST_EMAIL")]
    pub email: Option<String>,
    /// Pinterest login password
    #[arg(long, env = "PINTEREST_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Run the browser headless (1/true/yes/on)
    #[arg(
        long,
        env = "PINTEREST_HEADLESS",
        default_value = "true",
        value_parser = parse_flag,
        action = clap::ArgAction::Set
    )]
    pub headless: bool,
    /// Browser locale
    #[arg(long, env = "PINTEREST_LOCALE", default_value = DEFAULT_LOCALE)]
    pub locale: String,
    /// Maximum candidates kept per keyword
    #[arg(long = "max-pins", env = "MAX_PINS_PER_KEYWORD", default_value = "30")]
    pub max_pins_per_keyword: usize,
    /// Scroll rounds per search page
    #[arg(long, env = "SCROLL_ROUNDS", default_value = "8")]
    pub scroll_rounds: u32,
    /// Rewrite thumbnail URLs to original-size images
    #[arg(
        long,
        env = "PREFER_ORIGINALS",
        default_value = "false",
        value_parser = parse_flag,
        action = clap::ArgAction::Set
    )]
    pub prefer_originals: bool,
    /// Page navigation timeout in seconds
    #[arg(long = "browser-timeout", env = "BROWSER_TIMEOUT", default_value = "60")]
    pub browser_timeout: u64,
    /// Connect to an existing Chrome DevTools endpoint instead of launching one
    #[arg(long = "browser-remote-url", env = "BROWSER_REMOTE_URL")]
    pub remote_url: Option<String>,
    /// Proxy server for the browser (e.g. socks5://127.0.0.1:1080)
    #[arg(long = "browser-proxy", env = "BROWSER_PROXY")]
    pub proxy: Option<String>,
    /// Extra Chrome command-line arguments, whitespace-separated
    #[arg(long = "browser-args", env = "BROWSER_ARGS", allow_hyphen_values = true)]
    pub chrome_args: Option<String>,
}

/// Source-site settings.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub base_url: String,
    pub email: Option<String>,
    pub password: Option<String>,
    pub locale: String,
    /// Rewrite harvested image URLs to the `originals` size.
    pub prefer_originals: bool,
}

impl SiteConfig {
    /// Login credentials, if both halves are present.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) => Some((email, password)),
            _ => None,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SITE_BASE.to_string(),
            email: None,
            password: None,
            locale: DEFAULT_LOCALE.to_string(),
            prefer_originals: false,
        }
    }
}

/// Pacing and per-keyword limits.
#[derive(Debug, Clone, PartialEq)]
pub struct PacingConfig {
    pub sleep_min: f64,
    pub sleep_max: f64,
    pub scroll_rounds: u32,
    pub max_items_per_keyword: usize,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            sleep_min: 0.8,
            sleep_max: 1.8,
            scroll_rounds: 8,
            max_items_per_keyword: 30,
        }
    }
}

impl PacingConfig {
    fn from_args(pacing: &PacingArgs, site: Option<&SiteArgs>) -> Result<Self, ConfigError> {
        let (min, max) = (pacing.sleep_min, pacing.sleep_max);
        let representable = |secs: f64| Duration::try_from_secs_f64(secs).is_ok();
        if !(representable(min) && representable(max)) || min > max {
            return Err(ConfigError::InvalidJitter { min, max });
        }
        let defaults = Self::default();
        Ok(Self {
            sleep_min: min,
            sleep_max: max,
            scroll_rounds: site.map_or(defaults.scroll_rounds, |s| s.scroll_rounds),
            max_items_per_keyword: site
                .map_or(defaults.max_items_per_keyword, |s| s.max_pins_per_keyword),
        })
    }
}

/// Eagle API settings.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub folder_id: Option<String>,
    pub tags: Vec<String>,
    pub timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_BASE.to_string(),
            token: None,
            folder_id: None,
            tags: Vec::new(),
            timeout: Duration::from_secs(20),
        }
    }
}

impl CatalogConfig {
    pub fn from_args(args: &CatalogArgs) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: validate_url("EAGLE_API_BASE", &args.api_base)?,
            token: non_empty(&args.token),
            folder_id: non_empty(&args.folder_id),
            tags: split_list(args.tags.as_deref()),
            timeout: Duration::from_secs(args.timeout_secs),
        })
    }
}

/// Settings for `import-urls`: no browser and no keywords.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub catalog: CatalogConfig,
    pub pacing: PacingConfig,
    pub db_path: PathBuf,
}

impl ImportConfig {
    pub fn from_args(
        catalog: &CatalogArgs,
        pacing: &PacingArgs,
        ledger: &LedgerArgs,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            catalog: CatalogConfig::from_args(catalog)?,
            pacing: PacingConfig::from_args(pacing, None)?,
            db_path: ledger.db_path.clone(),
        })
    }
}

/// Complete, validated configuration for one harvest pass.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub keywords: Vec<String>,
    pub site: SiteConfig,
    pub pacing: PacingConfig,
    pub catalog: CatalogConfig,
    pub browser: BrowserEngineConfig,
    pub db_path: PathBuf,
}

impl HarvestConfig {
    /// Validate raw flags. Fails before any browser or network activity.
    pub fn from_args(
        site: &SiteArgs,
        pacing: &PacingArgs,
        catalog: &CatalogArgs,
        ledger: &LedgerArgs,
    ) -> Result<Self, ConfigError> {
        let keywords = split_list(site.keywords.as_deref());
        if keywords.is_empty() {
            return Err(ConfigError::MissingKeywords);
        }

        let browser = BrowserEngineConfig {
            headless: site.headless,
            locale: site.locale.clone(),
            timeout: site.browser_timeout,
            proxy: non_empty(&site.proxy),
            chrome_args: site
                .chrome_args
                .as_deref()
                .unwrap_or_default()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            remote_url: non_empty(&site.remote_url),
        };

        Ok(Self {
            keywords,
            site: SiteConfig {
                base_url: DEFAULT_SITE_BASE.to_string(),
                email: non_empty(&site.email),
                password: non_empty(&site.password),
                locale: site.locale.clone(),
                prefer_originals: site.prefer_originals,
            },
            pacing: PacingConfig::from_args(pacing, Some(site))?,
            catalog: CatalogConfig::from_args(catalog)?,
            browser,
            db_path: ledger.db_path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site_args(keywords: Option<&str>) -> SiteArgs {
        SiteArgs {
            keywords: keywords.map(str::to_string),
            email: None,
            password: None,
            headless: true,
            locale: DEFAULT_LOCALE.to_string(),
            max_pins_per_keyword: 30,
            scroll_rounds: 8,
            prefer_originals: false,
            browser_timeout: 60,
            remote_url: None,
            proxy: None,
            chrome_args: None,
        }
    }

    fn pacing_args(min: f64, max: f64) -> PacingArgs {
        PacingArgs {
            sleep_min: min,
            sleep_max: max,
        }
    }

    fn catalog_args() -> CatalogArgs {
        CatalogArgs {
            api_base: DEFAULT_CATALOG_BASE.to_string(),
            token: Some(String::new()),
            folder_id: None,
            tags: Some("pinterest, , moodboard ".to_string()),
            timeout_secs: 20,
        }
    }

    fn ledger_args() -> LedgerArgs {
        LedgerArgs {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }

    #[test]
    fn test_parse_flag() {
        for v in ["1", "true", "YES", " on "] {
            assert_eq!(parse_flag(v), Ok(true), "{v}");
        }
        for v in ["0", "false", "off", "", "maybe"] {
            assert_eq!(parse_flag(v), Ok(false), "{v}");
        }
    }

    #[test]
    fn test_split_list_trims_and_drops_empty() {
        assert_eq!(
            split_list(Some(" cats ,dogs,, bird nest ")),
            vec!["cats", "dogs", "bird nest"]
        );
        assert!(split_list(None).is_empty());
    }

    #[test]
    fn test_missing_keywords_is_fatal() {
        for raw in [None, Some(""), Some(" , ,")] {
            let err = HarvestConfig::from_args(
                &site_args(raw),
                &pacing_args(0.8, 1.8),
                &catalog_args(),
                &ledger_args(),
            )
            .unwrap_err();
            assert_eq!(err, ConfigError::MissingKeywords);
        }
    }

    #[test]
    fn test_harvest_config_defaults() {
        let config = HarvestConfig::from_args(
            &site_args(Some("cats,dogs")),
            &pacing_args(0.8, 1.8),
            &catalog_args(),
            &ledger_args(),
        )
        .unwrap();

        assert_eq!(config.keywords, vec!["cats", "dogs"]);
        assert_eq!(config.pacing, PacingConfig::default());
        assert_eq!(config.catalog.base_url, "http://127.0.0.1:41595");
        assert_eq!(config.catalog.token, None);
        assert_eq!(config.catalog.tags, vec!["pinterest", "moodboard"]);
        assert_eq!(config.catalog.timeout, Duration::from_secs(20));
        assert!(config.site.credentials().is_none());
        assert!(config.browser.headless);
        assert!(config.browser.chrome_args.is_empty());
        assert_eq!(config.browser.locale, "ko-KR");
        assert_eq!(config.db_path, PathBuf::from("./data/state.db"));
    }

    #[test]
    fn test_credentials_require_both_halves() {
        let mut args = site_args(Some("cats"));
        args.email = Some("me@example.com".to_string());
        let config = HarvestConfig::from_args(
            &args,
            &pacing_args(0.8, 1.8),
            &catalog_args(),
            &ledger_args(),
        )
        .unwrap();
        assert!(config.site.credentials().is_none());

        args.password = Some("hunter2".to_string());
        let config = HarvestConfig::from_args(
            &args,
            &pacing_args(0.8, 1.8),
            &catalog_args(),
            &ledger_args(),
        )
        .unwrap();
        assert_eq!(
            config.site.credentials(),
            Some(("me@example.com", "hunter2"))
        );
    }

    #[test]
    fn test_inverted_jitter_rejected() {
        let err = HarvestConfig::from_args(
            &site_args(Some("cats")),
            &pacing_args(2.0, 1.0),
            &catalog_args(),
            &ledger_args(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidJitter { .. }));
    }

    #[test]
    fn test_browser_args_split_on_whitespace() {
        let mut args = site_args(Some("cats"));
        args.chrome_args = Some(" --window-size=1400,900  --mute-audio ".to_string());
        let config = HarvestConfig::from_args(
            &args,
            &pacing_args(0.8, 1.8),
            &catalog_args(),
            &ledger_args(),
        )
        .unwrap();
        assert_eq!(
            config.browser.chrome_args,
            vec!["--window-size=1400,900", "--mute-audio"]
        );
    }

    #[test]
    fn test_unrepresentable_jitter_rejected() {
        for (min, max) in [(1e20, 1e20), (0.8, 1e20), (-1.0, 1.0), (0.8, f64::NAN)] {
            let err = HarvestConfig::from_args(
                &site_args(Some("cats")),
                &pacing_args(min, max),
                &catalog_args(),
                &ledger_args(),
            )
            .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidJitter { .. }), "{min}..{max}");
        }

        let err = ImportConfig::from_args(&catalog_args(), &pacing_args(0.0, 1e20), &ledger_args())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidJitter { .. }));
    }

    #[test]
    fn test_catalog_base_trailing_slash_trimmed() {
        let mut args = catalog_args();
        args.api_base = "http://localhost:41595/".to_string();
        let config = CatalogConfig::from_args(&args).unwrap();
        assert_eq!(config.base_url, "http://localhost:41595");

        args.api_base = "not a url".to_string();
        assert!(CatalogConfig::from_args(&args).is_err());
    }
}
