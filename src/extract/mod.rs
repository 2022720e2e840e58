//! Page-list extractors, one per recognised yearbook site layout.

mod anhui;
mod jiangsu;
mod standard;
mod zhejiang;

use std::collections::HashMap;
use std::fmt;

use crate::driver::Driver;
use crate::error::Result;

/// One downloadable subpage: where it lives and the name its file will carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    pub url: String,
    pub id: String,
}

/// Identifier → human-readable label, applied after downloading.
pub type RenameMap = HashMap<String, String>;

#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Ordered, may contain repeated identifiers.
    pub pages: Vec<PageEntry>,
    pub renames: RenameMap,
}

impl Extraction {
    pub fn push(&mut self, url: String, id: String, label: Option<String>) {
        if let Some(label) = label {
            self.renames.insert(id.clone(), label);
        }
        self.pages.push(PageEntry { url, id });
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Plain link lists, in a frame or inline.
    Standard,
    /// dtree menu script, 2006-2022.
    AnhuiLegacy,
    /// `const contents` array, 2023 onward.
    AnhuiModern,
    /// `mainFrame` menu with chapter pages, 2004-2005.
    AnhuiFramed,
    /// Chapter cells with `onclick` navigation.
    Jiangsu,
    /// Frameset with a `top` banner and excel image-map.
    ZhejiangLegacy,
    /// `yb-menu-item` list, spreadsheet URLs derived by naming convention.
    ZhejiangModern,
}

impl Layout {
    /// Build the page list from the document the driver is currently on.
    pub fn extract(self, driver: &mut dyn Driver) -> Result<Extraction> {
        match self {
            Layout::Standard => standard::links(driver, "a[href]"),
            Layout::AnhuiLegacy => anhui::dtree(driver),
            Layout::AnhuiModern => anhui::contents(driver),
            Layout::AnhuiFramed => anhui::framed(driver),
            Layout::Jiangsu => jiangsu::chapters(driver),
            Layout::ZhejiangLegacy => zhejiang::legacy(driver),
            Layout::ZhejiangModern => zhejiang::modern(driver),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layout::Standard => "standard",
            Layout::AnhuiLegacy => "anhui-dtree",
            Layout::AnhuiModern => "anhui-contents",
            Layout::AnhuiFramed => "anhui-mainframe",
            Layout::Jiangsu => "jiangsu",
            Layout::ZhejiangLegacy => "zhejiang-frames",
            Layout::ZhejiangModern => "zhejiang-menu",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_label_wins_on_collision() {
        let mut ex = Extraction::default();
        ex.push("http://x/a/01.htm".into(), "01".into(), Some("一".into()));
        ex.push("http://x/b/01.htm".into(), "01".into(), Some("二".into()));
        ex.push("http://x/b/02.xlsx".into(), "02".into(), None);
        assert_eq!(ex.pages.len(), 3);
        assert_eq!(ex.renames.len(), 1);
        assert_eq!(ex.renames["01"], "二");
    }
}
