//! Anhui has changed layout three times: a `mainFrame` menu with chapter
//! pages (2004-05), a dtree script menu (2006-22) and a Vue-style
//! `const contents` array (2023 onward).

use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use super::{Extraction, standard};
use crate::driver::Driver;
use crate::error::Result;
use crate::{dom, literal};

static DTREE_ADD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"d\.add(\(.*?\))\s*;").expect("dtree pattern"));

static CONTENTS_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\{"index":.*?\}"#).expect("contents pattern"));

const DTREE_SCRIPT: &str = "div[class='dtree'] > script";
const CONTENTS_MARKER: &str = "const contents";
const MENU_LINKS: &str = "td[class='menuFont'] > a";
const HF_LINKS: &str = "a[href*='javascript:hf']";
const HF_PREFIX: &str = "javascript:hf";

/// `d.add(id, parent, label, link)` calls inside the dtree menu script.
pub fn dtree(driver: &mut dyn Driver) -> Result<Extraction> {
    let url = driver.current_url();
    let root = dom::url_root(&url);
    let doc = dom::parse(&driver.content()?);

    let script: String = dom::select(&doc, DTREE_SCRIPT)?
        .iter()
        .flat_map(|el| el.text())
        .collect();

    let mut out = Extraction::default();
    for cap in DTREE_ADD.captures_iter(&script) {
        let items = match literal::tuple(&cap[1]) {
            Ok(items) => items,
            Err(e) => {
                warn!("Skipping menu entry: {}", e);
                continue;
            }
        };
        let Some(link) = literal::str_at(&items, 3).filter(|l| !l.is_empty()) else {
            continue;
        };
        let page = format!("{root}{link}");
        let id = dom::identifier(&page);
        let label = literal::str_at(&items, 2).unwrap_or_default().to_string();
        info!("Found page: {}", page);
        out.push(page, id, Some(label));
    }
    Ok(out)
}

/// Entries of the `const contents = [...]` array; links are relative to `statics/`.
pub fn contents(driver: &mut dyn Driver) -> Result<Extraction> {
    let url = driver.current_url();
    let root = format!("{}statics/", dom::url_root(&url));
    let doc = dom::parse(&driver.content()?);

    let mut out = Extraction::default();
    let Some(script) = dom::script_text(&doc, CONTENTS_MARKER)? else {
        return Ok(out);
    };

    for m in CONTENTS_ITEM.find_iter(&script) {
        let entry = match literal::contents_entry(m.as_str()) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping contents entry: {}", e);
                continue;
            }
        };
        let Some(link) = entry.link.filter(|l| !l.is_empty()) else {
            continue;
        };
        let page = format!("{root}{link}");
        let id = dom::identifier(&page);
        out.push(page, id, Some(entry.label));
    }
    Ok(out)
}

/// Inside `mainFrame`: either a direct menu of links, or chapter pages whose
/// entries are `javascript:hf(...)` calls.
pub fn framed(driver: &mut dyn Driver) -> Result<Extraction> {
    let doc = dom::parse(&driver.content()?);
    if dom::exists(&doc, MENU_LINKS)? {
        return standard::links(driver, MENU_LINKS);
    }

    let base = driver.current_url();
    let chapters: Vec<String> = dom::select(&doc, "a[href]")?
        .iter()
        .filter_map(|el| el.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(|href| dom::resolve(&base, href))
        .collect();
    drop(doc);

    let mut out = Extraction::default();
    for chapter in chapters {
        if let Err(e) = driver.navigate(&chapter) {
            warn!("Unable to open chapter {}: {}", chapter, e);
            continue;
        }
        let root = dom::url_root(&chapter);
        let page_doc = dom::parse(&driver.content()?);
        for el in dom::select(&page_doc, HF_LINKS)? {
            let Some(href) = el.value().attr("href") else {
                continue;
            };
            let payload = dom::percent_decode(&href.replace(HF_PREFIX, ""));
            let items = match literal::tuple(&payload) {
                Ok(items) => items,
                Err(e) => {
                    warn!("Skipping chapter entry: {}", e);
                    continue;
                }
            };
            let Some(link) = literal::str_at(&items, 0).filter(|l| !l.is_empty()) else {
                continue;
            };
            let page = format!("{root}{link}");
            let id = dom::identifier(&page);
            let label = literal::str_at(&items, 1).unwrap_or_default().to_string();
            out.push(page, id, Some(label));
        }
    }
    Ok(out)
}
