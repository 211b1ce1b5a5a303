//! Browser engine configuration.

use crate::config::DEFAULT_LOCALE;

/// How the Chrome session is started and how pages behave.
#[derive(Debug, Clone)]
pub struct BrowserEngineConfig {
    /// Run in headless mode (default: true).
    pub headless: bool,

    /// Browser locale, e.g. "ko-KR". Drives `--lang`, Accept-Language and
    /// `navigator.languages`.
    pub locale: String,

    /// Navigation timeout in seconds.
    pub timeout: u64,

    /// Proxy server URL (e.g., "socks5://127.0.0.1:1080").
    pub proxy: Option<String>,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to existing browser instead of launching one.
    pub remote_url: Option<String>,

    /// Additional Chrome arguments, appended after the stealth flags.
    pub chrome_args: Vec<String>,
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            headless: true,
            locale: DEFAULT_LOCALE.to_string(),
            timeout: 60,
            proxy: None,
            remote_url: None,
            chrome_args: Vec::new(),
        }
    }
}
