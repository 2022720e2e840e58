use tracing::{info, warn};

use super::Extraction;
use crate::dom;
use crate::driver::Driver;
use crate::error::Result;

const CHAPTER_CELLS: &str = "td[onclick]";
const ONCLICK_PREFIX: &str = "location.href=";
const TABLE_LINKS: &str = "a[href*='nj']";
const SHEET_LINK_CAPTION: &str = "电子表格链接";

/// Chapter URL from an `onclick="location.href='ch03.htm'"` handler.
fn chapter_target(root: &str, onclick: &str) -> String {
    let suffix: String = onclick.replace(ONCLICK_PREFIX, "").chars().filter(|c| *c != '\'').collect();
    format!("{root}{}", suffix.trim())
}

/// Chapters are table cells navigating on click; each chapter page lists
/// its tables as links whose path contains `nj`.
pub fn chapters(driver: &mut dyn Driver) -> Result<Extraction> {
    let url = driver.current_url();
    let root = dom::url_root(&url);
    let doc = dom::parse(&driver.content()?);
    let chapters: Vec<String> = dom::select(&doc, CHAPTER_CELLS)?
        .iter()
        .filter_map(|td| td.value().attr("onclick"))
        .map(|onclick| chapter_target(root, onclick))
        .collect();
    drop(doc);

    let mut out = Extraction::default();
    for chapter in chapters {
        info!("Opening chapter {}", chapter);
        if let Err(e) = driver.navigate(&chapter) {
            warn!("Unable to open chapter {}: {}", chapter, e);
            continue;
        }
        let here = driver.current_url();
        let page_doc = dom::parse(&driver.content()?);
        for el in dom::select(&page_doc, TABLE_LINKS)? {
            let Some(href) = el.value().attr("href") else {
                continue;
            };
            let page = dom::resolve(&here, href);
            let id = dom::identifier(&page);
            let label = dom::clean_label(&el.inner_html().replace(SHEET_LINK_CAPTION, ""));
            out.push(page, id, Some(label));
        }
    }
    Ok(out)
}
