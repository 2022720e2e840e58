//! The download loop: compare the page list with what is on disk, fetch
//! what is missing, let downloads settle, look again. It ends when nothing is
//! missing or the user stops it.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::dom;
use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::extract::PageEntry;
use crate::process::{Outcome, Processor};
use crate::prompt::Confirm;

/// Identifiers of the files already in `dir` (file name minus extension).
pub fn downloaded(dir: &Path) -> Result<HashSet<String>> {
    let mut names = HashSet::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        names.insert(dom::strip_extension(&name).to_string());
    }
    Ok(names)
}

/// Entries with no identifier-matching file, in page-list order.
pub fn missing<'p>(pages: &'p [PageEntry], downloaded: &HashSet<String>) -> Vec<&'p PageEntry> {
    pages.iter().filter(|p| !downloaded.contains(&p.id)).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub rounds: usize,
    pub attempted: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Entries still unsatisfied when the loop ended.
    pub remaining: usize,
}

pub struct Reconciler<'a, 'p> {
    pub processor: Processor<'p>,
    pub confirm: &'a mut dyn Confirm,
    pub settle: Duration,
    /// 0 means no limit.
    pub max_rounds: usize,
}

impl Reconciler<'_, '_> {
    pub fn run(&mut self, driver: &mut dyn Driver, pages: &[PageEntry]) -> Result<Report> {
        let dir = self.processor.dir().to_path_buf();
        let mut report = Report::default();
        let mut have = downloaded(&dir)?;
        let mut todo = missing(pages, &have);

        while !todo.is_empty() {
            if self.max_rounds > 0 && report.rounds >= self.max_rounds {
                warn!("Giving up after {} rounds", report.rounds);
                break;
            }
            info!("Number of potential targets: {}", pages.len());
            info!("Number of files downloaded: {}", have.len());
            if self.confirm.confirm("List missing files?") {
                for entry in &todo {
                    println!("{}: \n{}", entry.id, entry.url);
                }
            }
            if !self.confirm.confirm("Download missing files?") {
                break;
            }

            report.rounds += 1;
            for entry in &todo {
                report.attempted += 1;
                match self.processor.process(driver, entry) {
                    Ok(Outcome::Skipped(reason)) => {
                        report.skipped += 1;
                        info!("Skipped {} ({:?})", entry.url, reason);
                    }
                    Ok(_) => {}
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        if !driver.is_alive() {
                            return Err(Error::SessionLost);
                        }
                        report.failed += 1;
                        warn!("Unable to save {}: {}", entry.url, e);
                    }
                }
            }

            thread::sleep(self.settle);
            have = downloaded(&dir)?;
            todo = missing(pages, &have);
        }

        report.remaining = todo.len();
        Ok(report)
    }
}
