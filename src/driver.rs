use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::protocol::cdp::Browser::{SetDownloadBehavior, SetDownloadBehaviorBehaviorOption};
use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::{debug, info};

use crate::config::Config;
use crate::dom;
use crate::error::{Error, Result};

/// What the scraper needs from a browser: navigate, read the rendered DOM,
/// and hand a URL over to the browser's own download machinery.
pub trait Driver {
    fn navigate(&mut self, url: &str) -> Result<()>;

    fn current_url(&self) -> String;

    /// Rendered markup of the current document.
    fn content(&self) -> Result<String>;

    /// Let the browser save `url` into its download directory.
    fn trigger_download(&mut self, url: &str) -> Result<()>;

    fn is_alive(&self) -> bool {
        true
    }
}

// ============================================================
// Chrome session
// ============================================================
pub struct ChromeSession {
    // Dropping the Browser kills the chrome process; keep it alongside the tab.
    browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeSession {
    /// One headless browser per scrape, downloading into `download_dir`.
    pub fn launch(config: &Config, download_dir: &Path, proxy: Option<&str>) -> Result<Self> {
        let ua_arg = format!("--user-agent={}", config.user_agent);
        let proxy_arg = proxy.map(|p| format!("--proxy-server={p}"));

        let mut args: Vec<&OsStr> = vec![
            OsStr::new("--disable-blink-features=AutomationControlled"),
            OsStr::new("--no-first-run"),
            OsStr::new("--no-default-browser-check"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new("--disable-popup-blocking"),
            OsStr::new(&ua_arg),
        ];
        if let Some(arg) = &proxy_arg {
            info!("Using proxy server {}", arg.trim_start_matches("--proxy-server="));
            args.push(OsStr::new(arg));
        }

        let browser = Browser::new(LaunchOptions {
            headless: config.headless,
            window_size: Some((1920, 1080)),
            sandbox: false,
            path: config.chromium_path.as_ref().map(PathBuf::from),
            args,
            idle_browser_timeout: Duration::from_secs(config.idle_timeout_secs),
            ..Default::default()
        })
        .map_err(|e| Error::browser(format!("{e:#}")))?;

        let tab = browser.new_tab().map_err(|e| Error::browser(format!("{e:#}")))?;

        let download_dir = download_dir.canonicalize()?;
        tab.call_method(SetDownloadBehavior {
            behavior: SetDownloadBehaviorBehaviorOption::Allow,
            browser_context_id: None,
            download_path: Some(download_dir.to_string_lossy().into_owned()),
            events_enabled: None,
        })
        .map_err(|e| Error::browser(format!("{e:#}")))?;
        debug!("Downloads go to {}", download_dir.display());

        Ok(Self { browser, tab })
    }
}

impl Driver for ChromeSession {
    fn navigate(&mut self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| Error::browser(format!("{url}: {e:#}")))?;
        Ok(())
    }

    fn current_url(&self) -> String {
        self.tab.get_url()
    }

    fn content(&self) -> Result<String> {
        self.tab.get_content().map_err(|e| Error::browser(format!("{e:#}")))
    }

    fn trigger_download(&mut self, url: &str) -> Result<()> {
        // Chrome aborts a navigation that turns into a download, so an
        // error here usually means the download started.
        if let Err(e) = self.tab.navigate_to(url) {
            debug!("Navigation to download {} ended with: {:#}", url, e);
        }
        if self.is_alive() {
            Ok(())
        } else {
            Err(Error::SessionLost)
        }
    }

    fn is_alive(&self) -> bool {
        self.browser.get_version().is_ok()
    }
}

/// Switch into the frame matching `css` by loading its `src` in the same tab.
/// Returns the frame URL, or `None` if there is no such frame.
pub fn enter_frame(driver: &mut dyn Driver, css: &str) -> Result<Option<String>> {
    let doc = dom::parse(&driver.content()?);
    let Some(src) = dom::first_attr(&doc, css, "src")? else {
        return Ok(None);
    };
    let frame_url = dom::resolve(&driver.current_url(), &src);
    driver.navigate(&frame_url)?;
    Ok(Some(frame_url))
}
