#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::PathBuf;

use tjnj::dom;
use tjnj::driver::Driver;
use tjnj::error::{Error, Result};
use tjnj::fetch::Fetch;
use tjnj::prompt::Confirm;

/// In-memory browser: a map of URL to markup.
#[derive(Default)]
pub struct FakeDriver {
    pub pages: HashMap<String, String>,
    pub current: String,
    pub navigations: Vec<String>,
    pub downloads: Vec<String>,
    /// URLs whose navigation or download fails.
    pub failing: HashSet<String>,
    /// When set, a triggered download writes a file named after the URL's last segment.
    pub download_dir: Option<PathBuf>,
    pub dead: bool,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn downloads_into(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }
}

impl Driver for FakeDriver {
    fn navigate(&mut self, url: &str) -> Result<()> {
        self.navigations.push(url.to_string());
        if self.dead {
            return Err(Error::SessionLost);
        }
        if self.failing.contains(url) {
            return Err(Error::browser(format!("net::ERR_CONNECTION_RESET at {url}")));
        }
        self.current = url.to_string();
        Ok(())
    }

    fn current_url(&self) -> String {
        self.current.clone()
    }

    fn content(&self) -> Result<String> {
        Ok(self.pages.get(&self.current).cloned().unwrap_or_default())
    }

    fn trigger_download(&mut self, url: &str) -> Result<()> {
        self.downloads.push(url.to_string());
        if self.dead {
            return Err(Error::SessionLost);
        }
        if self.failing.contains(url) {
            return Err(Error::browser(format!("download refused: {url}")));
        }
        if let Some(dir) = &self.download_dir {
            let name = dom::percent_decode(dom::file_name(url));
            fs::write(dir.join(name), b"PK\x03\x04").map_err(Error::from)?;
        }
        Ok(())
    }

    fn is_alive(&self) -> bool {
        !self.dead
    }
}

/// Answers questions from a queue, then says no.
#[derive(Default)]
pub struct ScriptedConfirm {
    pub answers: VecDeque<bool>,
    pub asked: Vec<String>,
}

impl ScriptedConfirm {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            asked: Vec::new(),
        }
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, question: &str) -> bool {
        self.asked.push(question.to_string());
        self.answers.pop_front().unwrap_or(false)
    }
}

#[derive(Default)]
pub struct FakeFetch {
    pub failing: HashSet<String>,
    pub fetched: RefCell<Vec<String>>,
}

impl Fetch for FakeFetch {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.fetched.borrow_mut().push(url.to_string());
        if self.failing.contains(url) {
            return Err(Error::Status {
                status: 404,
                url: url.to_string(),
            });
        }
        Ok(b"%PDF-1.4".to_vec())
    }
}
