//! Command line and the interactive questions asked before any download.

use std::env;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use dialoguer::Input;
use thiserror::Error;

use crate::config::Config;
use crate::directory::UrlDirectory;

pub const FIRST_YEAR: i32 = 1999;

#[derive(Parser, Debug, Default)]
#[command(name = "tjnj", version, about = "Chinese provincial statistical yearbook downloader")]
pub struct Args {
    /// Download directory; files land in <dir>/<province>/<year>/
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Province name, full pinyin without spaces
    #[arg(short, long)]
    pub province: Option<String>,

    /// Year or range of years: yyyy or yyyy-yyyy
    #[arg(long)]
    pub years: Option<String>,

    /// Proxy server for the browser and direct downloads
    #[arg(long)]
    pub proxy: Option<String>,

    /// Path to Config.toml
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the yearbook URL directory (overrides urls_file)
    #[arg(long)]
    pub urls: Option<PathBuf>,

    /// Answer yes to every confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Do not convert HTML tables to CSV
    #[arg(long)]
    pub no_csv: bool,

    /// Do not fetch images, PDFs or documents
    #[arg(long)]
    pub no_img: bool,

    /// Save pages without tables or spreadsheet links as raw HTML
    #[arg(long)]
    pub save_html: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Command-line switches take precedence over Config.toml.
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.dir {
            config.download_dir = dir.to_string_lossy().into_owned();
        }
        if let Some(urls) = &self.urls {
            config.urls_file = urls.to_string_lossy().into_owned();
        }
        if self.no_csv {
            config.disable_csv = true;
        }
        if self.no_img {
            config.disable_img = true;
        }
        if self.save_html {
            config.disable_htmlpage = false;
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum YearsError {
    #[error("unable to parse download year `{0}`")]
    Unparsable(String),
    #[error("year range invalid: enter a year or range between 1999 and {max}")]
    OutOfRange { max: i32 },
}

/// `yyyy` or `yyyy-yyyy`, both ends inclusive, within 1999..=`current_year`.
pub fn parse_years(input: &str, current_year: i32) -> std::result::Result<(i32, i32), YearsError> {
    let input = input.trim();
    let unparsable = || YearsError::Unparsable(input.to_string());
    let (start, end) = match input.split_once('-') {
        None => {
            let y = input.parse::<i32>().map_err(|_| unparsable())?;
            (y, y)
        }
        Some((a, b)) => (
            a.trim().parse::<i32>().map_err(|_| unparsable())?,
            b.trim().parse::<i32>().map_err(|_| unparsable())?,
        ),
    };
    if start < FIRST_YEAR || end > current_year || start > end {
        return Err(YearsError::OutOfRange { max: current_year });
    }
    Ok((start, end))
}

// ============================================================
// Interactive prompts
// ============================================================
pub fn ask_dir() -> Result<PathBuf> {
    loop {
        let input: String = Input::new()
            .with_prompt("Path to download directory (leave empty for current working directory)")
            .allow_empty(true)
            .interact_text()?;
        let path = if input.trim().is_empty() {
            env::current_dir()?
        } else {
            PathBuf::from(input.trim())
        };
        if path.is_dir() {
            return Ok(path);
        }
        println!("Download directory does not exist. Please re-enter.");
    }
}

pub fn ask_province(directory: &UrlDirectory) -> Result<String> {
    let mut prompt = "Province name (full pinyin, no spaces)";
    loop {
        let input: String = Input::new().with_prompt(prompt).interact_text()?;
        let province = input.trim().to_lowercase();
        if directory.contains(&province) {
            return Ok(province);
        }
        if province == "ls" {
            println!("{:?}", directory.provinces());
        }
        prompt = "Province name not recognized. Please re-enter or enter 'ls' for list of provinces";
    }
}

pub fn ask_years(current_year: i32) -> Result<(i32, i32)> {
    loop {
        let input: String = Input::new()
            .with_prompt("Enter the year or range of years you would like to download ('yyyy' or 'yyyy-yyyy')")
            .interact_text()?;
        match parse_years(&input, current_year) {
            Ok(range) => return Ok(range),
            Err(e) => println!("{e}. Please re-enter."),
        }
    }
}

pub fn ask_proxy() -> Result<Option<String>> {
    let input: String = Input::new()
        .with_prompt("Enter proxy server (optional)")
        .allow_empty(true)
        .interact_text()?;
    let input = input.trim();
    Ok((!input.is_empty()).then(|| input.to_string()))
}

/// Years in `start..=end` with a URL. Years missing from the directory are
/// asked for; `s` skips the year. Without `interactive`, they are skipped.
pub fn resolve_years(
    directory: &mut UrlDirectory,
    province: &str,
    (start, end): (i32, i32),
    interactive: bool,
) -> Result<Vec<(i32, String)>> {
    let mut out = Vec::new();
    for year in start..=end {
        if let Some(url) = directory.url(province, year) {
            out.push((year, url.to_string()));
            continue;
        }
        println!("Yearbook URL for {province} {year} not found.");
        if !interactive {
            continue;
        }
        let input: String = Input::new()
            .with_prompt("Please input yearbook URL or 's' to skip year")
            .interact_text()?;
        let input = input.trim();
        if input == "s" || input.is_empty() {
            continue;
        }
        directory.set_override(province, year, input);
        out.push((year, input.to_string()));
    }
    if out.is_empty() {
        bail!("no yearbook URLs to download for {province} {start}-{end}");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_year() {
        assert_eq!(parse_years("2019", 2026), Ok((2019, 2019)));
        assert_eq!(parse_years(" 1999 ", 2026), Ok((1999, 1999)));
    }

    #[test]
    fn year_range_inclusive() {
        assert_eq!(parse_years("2015-2020", 2026), Ok((2015, 2020)));
        assert_eq!(parse_years("2020 - 2026", 2026), Ok((2020, 2026)));
    }

    #[test]
    fn bounds_enforced() {
        assert_eq!(parse_years("1998", 2026), Err(YearsError::OutOfRange { max: 2026 }));
        assert_eq!(parse_years("2027", 2026), Err(YearsError::OutOfRange { max: 2026 }));
        assert_eq!(parse_years("2021-2019", 2026), Err(YearsError::OutOfRange { max: 2026 }));
    }

    #[test]
    fn garbage_rejected() {
        assert!(matches!(parse_years("twenty", 2026), Err(YearsError::Unparsable(_))));
        assert!(matches!(parse_years("2019-", 2026), Err(YearsError::Unparsable(_))));
    }

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from(["tjnj", "--no-csv", "--save-html", "--dir", "/tmp/nj"]);
        let mut config = Config::default();
        args.apply(&mut config);
        assert!(config.disable_csv);
        assert!(!config.disable_htmlpage);
        assert!(!config.disable_img);
        assert_eq!(config.download_dir, "/tmp/nj");
    }

    #[test]
    fn non_interactive_skips_unknown_years() {
        let mut dir = UrlDirectory::from_json(r#"{"anhui": {"NOTE": "", "2020": "http://a/2020/"}}"#).unwrap();
        let years = resolve_years(&mut dir, "anhui", (2019, 2020), false).unwrap();
        assert_eq!(years, vec![(2020, "http://a/2020/".to_string())]);
        assert!(resolve_years(&mut dir, "anhui", (2018, 2019), false).is_err());
    }
}
