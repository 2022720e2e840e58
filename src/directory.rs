//! The province → year → yearbook URL directory (`urls.json`).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::Result;

const NOTE_KEY: &str = "NOTE";

/// Loaded once before any scrape and passed around read-only; only the
/// interactive missing-year prompt adds overrides.
#[derive(Debug, Clone, Default)]
pub struct UrlDirectory {
    provinces: BTreeMap<String, BTreeMap<String, String>>,
}

impl UrlDirectory {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let provinces = serde_json::from_str(text)?;
        Ok(Self { provinces })
    }

    pub fn provinces(&self) -> Vec<&str> {
        self.provinces.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, province: &str) -> bool {
        self.provinces.contains_key(province)
    }

    pub fn note(&self, province: &str) -> Option<&str> {
        self.provinces.get(province)?.get(NOTE_KEY).map(String::as_str)
    }

    pub fn url(&self, province: &str, year: i32) -> Option<&str> {
        self.provinces
            .get(province)?
            .get(&year.to_string())
            .map(String::as_str)
    }

    pub fn set_override(&mut self, province: &str, year: i32, url: &str) {
        self.provinces
            .entry(province.to_string())
            .or_default()
            .insert(year.to_string(), url.to_string());
    }
}
