use tracing::debug;

use super::Extraction;
use crate::dom;
use crate::driver::Driver;
use crate::error::Result;

/// Every element matching `css` with a non-empty `href` becomes a page; its
/// label is the cleaned inner markup.
pub fn links(driver: &mut dyn Driver, css: &str) -> Result<Extraction> {
    let base = driver.current_url();
    let doc = dom::parse(&driver.content()?);

    let mut out = Extraction::default();
    for el in dom::select(&doc, css)? {
        let Some(href) = el.value().attr("href").filter(|h| !h.is_empty()) else {
            continue;
        };
        let url = dom::resolve(&base, href);
        let id = dom::identifier(&url);
        let label = dom::clean_label(&el.inner_html());
        debug!("Found page: {} ({})", url, id);
        out.push(url, id, Some(label));
    }
    Ok(out)
}
