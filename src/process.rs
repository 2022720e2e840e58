//! Subpage processing: turn one page-list entry into a file in the target
//! directory, by whichever means its URL and content call for.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use nanorand::{Rng, WyRand};
use tracing::info;

use crate::config::ProcessOptions;
use crate::dom;
use crate::driver::Driver;
use crate::error::Result;
use crate::extract::PageEntry;
use crate::fetch::Fetch;
use crate::table;

const BINARY_MARKERS: [&str; 4] = [".jpg", ".png", ".pdf", ".doc"];
const SHEET_LINK: &str = "a[href*='xls']";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Handed to the browser's downloader.
    Spreadsheet,
    /// Fetched directly and written with its original extension.
    Binary,
    /// Loaded and inspected for a spreadsheet link, a table, or saved whole.
    Page,
    Other,
}

/// Classify by URL alone; the spreadsheet check wins over everything else.
pub fn classify(url: &str, options: &ProcessOptions) -> Target {
    let lower = url.to_lowercase();
    if lower.contains(".xls") {
        Target::Spreadsheet
    } else if !options.disable_img && BINARY_MARKERS.iter().any(|m| lower.contains(m)) {
        Target::Binary
    } else if lower.contains(".htm") {
        Target::Page
    } else {
        Target::Other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavedKind {
    Binary,
    Table,
    Page,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnknownFormat,
    /// An HTML page with nothing the enabled capture paths could take.
    NothingToCapture,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Download handed to the browser; the file appears asynchronously.
    Triggered(String),
    Saved { kind: SavedKind, path: PathBuf },
    Skipped(SkipReason),
}

pub struct Processor<'a> {
    dir: &'a Path,
    options: &'a ProcessOptions,
    fetcher: &'a dyn Fetch,
    rng: WyRand,
}

impl<'a> Processor<'a> {
    pub fn new(dir: &'a Path, options: &'a ProcessOptions, fetcher: &'a dyn Fetch) -> Self {
        Self {
            dir,
            options,
            fetcher,
            rng: WyRand::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        self.dir
    }

    pub fn process(&mut self, driver: &mut dyn Driver, entry: &PageEntry) -> Result<Outcome> {
        let url = entry.url.as_str();
        match classify(url, self.options) {
            Target::Spreadsheet => {
                info!("Downloading: {}", url);
                driver.trigger_download(url)?;
                self.download_pause();
                Ok(Outcome::Triggered(url.to_string()))
            }
            Target::Binary => {
                info!("Saving: {}", url);
                let bytes = self.fetcher.fetch(url)?;
                let path = self.dir.join(format!("{}{}", entry.id, dom::extension(url)));
                fs::write(&path, bytes)?;
                Ok(Outcome::Saved {
                    kind: SavedKind::Binary,
                    path,
                })
            }
            Target::Page => self.page(driver, entry),
            Target::Other => {
                info!("No relevant formats found: {}", url);
                Ok(Outcome::Skipped(SkipReason::UnknownFormat))
            }
        }
    }

    fn page(&mut self, driver: &mut dyn Driver, entry: &PageEntry) -> Result<Outcome> {
        info!("Analyzing page: {}", entry.url);
        driver.navigate(&entry.url)?;
        let here = driver.current_url();
        let content = driver.content()?;
        let doc = dom::parse(&content);

        if let Some(href) = dom::first_attr(&doc, SHEET_LINK, "href")? {
            let sheet = dom::resolve(&here, &href);
            info!("Found excel: {}", sheet);
            driver.trigger_download(&sheet)?;
            self.download_pause();
            return Ok(Outcome::Triggered(sheet));
        }

        if !self.options.disable_csv {
            if let Some(markup) = table::first_table_html(&doc)? {
                info!("Found table");
                let rows = table::rows(&markup)?;
                let path = self.dir.join(format!("{}.csv", entry.id));
                table::write_csv(&path, &rows)?;
                return Ok(Outcome::Saved {
                    kind: SavedKind::Table,
                    path,
                });
            }
        }

        if !self.options.disable_htmlpage {
            info!("Saving page as html.");
            let ext = match dom::extension(&entry.url) {
                "" => ".html",
                ext => ext,
            };
            let path = self.dir.join(format!("{}{}", entry.id, ext));
            // Never overwrite an earlier capture.
            let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
            file.write_all(content.as_bytes())?;
            return Ok(Outcome::Saved {
                kind: SavedKind::Page,
                path,
            });
        }

        Ok(Outcome::Skipped(SkipReason::NothingToCapture))
    }

    fn download_pause(&mut self) {
        let jitter = match self.options.pause_jitter_ms {
            0 => 0,
            max => self.rng.generate_range(0..=max),
        };
        thread::sleep(self.options.download_pause + Duration::from_millis(jitter));
    }
}
