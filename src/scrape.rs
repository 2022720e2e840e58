use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Config;
use crate::detect::{self, Detection};
use crate::driver::{ChromeSession, Driver};
use crate::error::Result;
use crate::extract::Extraction;
use crate::fetch::{Fetch, HttpFetcher};
use crate::process::Processor;
use crate::prompt::Confirm;
use crate::reconcile::{Reconciler, Report};
use crate::rename::{self, Renamed};

/// `<base>/<province>/<year>`, created on first use.
pub fn target_dir(base: &Path, province: &str, year: i32) -> Result<PathBuf> {
    let prov_dir = base.join(province);
    let path = prov_dir.join(year.to_string());
    ensure_dir(&prov_dir, province)?;
    ensure_dir(&path, &format!("{province} {year}"))?;
    Ok(path)
}

fn ensure_dir(path: &Path, what: &str) -> Result<()> {
    match fs::create_dir(path) {
        Ok(()) => info!("{} directory created", what),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => info!("{} directory already exists", what),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct Summary {
    pub detection: Option<Detection>,
    pub pages: usize,
    pub report: Option<Report>,
    pub renames: Option<Vec<Renamed>>,
}

/// Detect, extract, download, rename, all against an already-open driver.
pub fn run(
    driver: &mut dyn Driver,
    processor: Processor<'_>,
    confirm: &mut dyn Confirm,
    settle: Duration,
    max_rounds: usize,
    url: &str,
) -> Result<Summary> {
    let dir = processor.dir().to_path_buf();
    let mut summary = Summary::default();

    info!("Loading main page {}", url);
    driver.navigate(url)?;

    summary.detection = detect::detect(driver)?;
    let extraction = match summary.detection {
        Some(found) => found.layout.extract(driver)?,
        None => Extraction::default(),
    };
    summary.pages = extraction.pages.len();
    info!("Page list has {} entries", summary.pages);

    if !extraction.is_empty() {
        let mut reconciler = Reconciler {
            processor,
            confirm: &mut *confirm,
            settle,
            max_rounds,
        };
        summary.report = Some(reconciler.run(driver, &extraction.pages)?);
    }

    if !extraction.renames.is_empty() && confirm.confirm("Rename files?") {
        summary.renames = Some(rename::rename_all(&dir, &extraction.renames)?);
    }

    Ok(summary)
}

/// One province-year: its own directory and its own browser.
pub fn scrape_year(
    config: &Config,
    base: &Path,
    province: &str,
    year: i32,
    url: &str,
    proxy: Option<&str>,
    confirm: &mut dyn Confirm,
) -> Result<Summary> {
    let dir = target_dir(base, province, year)?;
    let options = config.process_options();
    let fetcher = HttpFetcher::new(
        &config.user_agent,
        proxy,
        Duration::from_secs(config.fetch_timeout_secs),
        config.accept_invalid_certs,
    )?;
    let mut session = ChromeSession::launch(config, &dir, proxy)?;
    let processor = Processor::new(&dir, &options, &fetcher as &dyn Fetch);

    let summary = run(
        &mut session,
        processor,
        confirm,
        config.settle(),
        config.max_rounds,
        url,
    )?;
    if summary.detection.is_none() {
        warn!("{} {}: no known yearbook layout at {}", province, year, url);
    }
    if let Some(report) = &summary.report {
        if report.remaining > 0 {
            warn!("{} {}: {} files still missing", province, year, report.remaining);
        }
    }
    Ok(summary)
}
