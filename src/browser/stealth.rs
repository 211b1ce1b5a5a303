//! Automation-hiding scripts and locale headers.
//!
//! Based on puppeteer-extra-plugin-stealth techniques.

/// Desktop Chrome user agent sent instead of the headless default.
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Chrome flags that remove the most obvious automation markers.
pub const STEALTH_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-infobars",
    "--disable-dev-shm-usage",
    "--no-first-run",
    "--no-default-browser-check",
    "--disable-background-networking",
    "--disable-sync",
    "--disable-translate",
    "--metrics-recording-only",
    "--safebrowsing-disable-auto-update",
    // Often needed for headless in containers
    "--no-sandbox",
    "--disable-gpu",
    "--disable-software-rasterizer",
];

const FIXED_SCRIPTS: &[&str] = &[
    // Remove webdriver property
    r#"
    Object.defineProperty(navigator, 'webdriver', {
        get: () => undefined,
        configurable: true
    });
    "#,
    // Fix chrome object
    r#"
    window.chrome = {
        runtime: {},
        loadTimes: function() {},
        csi: function() {},
        app: {}
    };
    "#,
    r#"
    Object.defineProperty(navigator, 'plugins', {
        get: () => [
            { name: 'Chrome PDF Plugin', filename: 'internal-pdf-viewer', description: 'Portable Document Format' },
            { name: 'Chrome PDF Viewer', filename: 'mhjfbmdgcfjbbpaeojofohoefgiehjai', description: '' },
            { name: 'Native Client', filename: 'internal-nacl-plugin', description: '' }
        ],
        configurable: true
    });
    "#,
    r#"
    delete window.cdc_adoQpoasnfa76pfcZLmcfl_Array;
    delete window.cdc_adoQpoasnfa76pfcZLmcfl_Promise;
    delete window.cdc_adoQpoasnfa76pfcZLmcfl_Symbol;
    "#,
];

/// `navigator.languages` for a locale: the locale itself, then its primary
/// language when that differs.
pub fn navigator_languages(locale: &str) -> Vec<String> {
    let locale = locale.trim();
    if locale.is_empty() {
        return vec!["en-US".to_string(), "en".to_string()];
    }
    let mut languages = vec![locale.to_string()];
    if let Some((primary, _)) = locale.split_once('-') {
        if !primary.is_empty() {
            languages.push(primary.to_string());
        }
    }
    languages
}

/// Accept-Language header value for a locale, e.g. `ko-KR,ko;q=0.9`.
pub fn accept_language(locale: &str) -> String {
    navigator_languages(locale)
        .iter()
        .enumerate()
        .map(|(i, lang)| {
            if i == 0 {
                lang.clone()
            } else {
                format!("{};q=0.{}", lang, 10 - i.min(9))
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Scripts evaluated on every loaded page.
pub fn stealth_scripts(locale: &str) -> Vec<String> {
    let languages = navigator_languages(locale)
        .iter()
        .map(|l| format!("'{}'", l.replace('\'', "")))
        .collect::<Vec<_>>()
        .join(", ");

    let mut scripts: Vec<String> = FIXED_SCRIPTS.iter().map(|s| s.to_string()).collect();
    scripts.push(format!(
        r#"
    Object.defineProperty(navigator, 'languages', {{
        get: () => [{}],
        configurable: true
    }});
    "#,
        languages
    ));
    scripts
}
