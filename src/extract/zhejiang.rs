use tracing::{info, warn};

use super::{Extraction, standard};
use crate::dom;
use crate::driver::{self, Driver};
use crate::error::Result;

const TOP_FRAME: &str = "frame[name='top']";
const CONTENTS_FRAME: &str = "frame[name='contents']";
const EXCEL_AREA: &str = "area[href*='excel']";
const MENU_ITEMS: &str = "li[class='yb-menu-item'] a";

/// Pre-2020 frameset. The banner frame usually carries an image-map link to
/// a spreadsheet-only menu; when it does not, the default contents frame is
/// read instead.
pub fn legacy(driver: &mut dyn Driver) -> Result<Extraction> {
    let url = driver.current_url();

    match excel_menu(driver) {
        Ok(true) => {}
        Ok(false) => {
            info!("No excel menu found. Analyzing default menu.");
            default_menu(driver, &url)?;
        }
        Err(e) => {
            warn!("Excel menu probe failed ({}). Analyzing default menu.", e);
            default_menu(driver, &url)?;
        }
    }
    standard::links(driver, "a[href]")
}

fn excel_menu(driver: &mut dyn Driver) -> Result<bool> {
    if driver::enter_frame(driver, TOP_FRAME)?.is_none() {
        return Ok(false);
    }
    info!("Identified frame: top");
    let top = driver.current_url();
    let doc = dom::parse(&driver.content()?);
    let Some(href) = dom::first_attr(&doc, EXCEL_AREA, "href")? else {
        return Ok(false);
    };
    drop(doc);
    driver.navigate(&dom::resolve(&top, &href))?;
    Ok(true)
}

fn default_menu(driver: &mut dyn Driver, url: &str) -> Result<()> {
    driver.navigate(url)?;
    if driver::enter_frame(driver, CONTENTS_FRAME)?.is_none() {
        warn!("No contents frame on {}; reading the page itself", url);
    }
    Ok(())
}

/// 2020 onward: menu items name the HTML rendering of each table in their
/// `main` attribute, and the spreadsheet sits at the same path under
/// `excel/`. Those files already carry full names, so nothing is renamed.
pub fn modern(driver: &mut dyn Driver) -> Result<Extraction> {
    let url = driver.current_url();
    let base = dom::url_dir(&url);
    let doc = dom::parse(&driver.content()?);

    let mut out = Extraction::default();
    for el in dom::select(&doc, MENU_ITEMS)? {
        let Some(main) = el.value().attr("main") else {
            continue;
        };
        let page = sheet_url(base, main);
        let id = dom::identifier(&page);
        out.push(page, id, None);
    }
    Ok(out)
}

/// `./html/1-1.html` under `base` becomes `base/excel/1-1.xlsx`.
fn sheet_url(base: &str, main: &str) -> String {
    let mut rest = main.chars();
    rest.next();
    let path = rest.as_str().replace("/html/", "/excel/").replace(".html", ".xlsx");
    format!("{base}{path}")
}
