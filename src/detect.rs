//! Site-layout detection: an ordered table of structural signatures, first
//! match wins. Adding a layout means adding one [`Layout`] variant and one
//! row here.

use tracing::{debug, info, warn};

use crate::dom;
use crate::driver::{self, Driver};
use crate::error::Result;
use crate::extract::Layout;

#[derive(Debug, Clone, Copy)]
pub enum Probe {
    /// At least one element matches the CSS selector.
    Element(&'static str),
    /// Some inline script contains the marker text.
    Script(&'static str),
}

impl Probe {
    fn matches(&self, doc: &scraper::Html) -> Result<bool> {
        match self {
            Probe::Element(css) => dom::exists(doc, css),
            Probe::Script(marker) => dom::script_contains(doc, marker),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Route {
    /// Extract from the page as loaded.
    Here(Layout),
    /// Load the `src` of the first element matching `frame`, then pick the
    /// first branch whose probe matches inside it.
    Frame {
        frame: &'static str,
        branches: &'static [(Probe, Layout)],
        otherwise: Layout,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub name: &'static str,
    pub probe: Probe,
    pub route: Route,
}

pub const SIGNATURES: &[Signature] = &[
    Signature {
        name: "contents frame",
        probe: Probe::Element("frame[name='contents']"),
        route: Route::Frame {
            frame: "frame[name='contents']",
            branches: &[],
            otherwise: Layout::Standard,
        },
    },
    Signature {
        name: "folding list",
        probe: Probe::Element("ul#foldinglist, ul[class='mainlists']"),
        route: Route::Here(Layout::Standard),
    },
    Signature {
        name: "left frame",
        probe: Probe::Element("frame[name='left']"),
        route: Route::Frame {
            frame: "frame[name='left']",
            branches: &[(Probe::Element("div[class='dtree'] > script"), Layout::AnhuiLegacy)],
            otherwise: Layout::Standard,
        },
    },
    Signature {
        name: "contents script",
        probe: Probe::Script("const contents"),
        route: Route::Here(Layout::AnhuiModern),
    },
    Signature {
        name: "mainFrame",
        probe: Probe::Element("frame[name='mainFrame']"),
        route: Route::Frame {
            frame: "frame[name='mainFrame']",
            branches: &[],
            otherwise: Layout::AnhuiFramed,
        },
    },
    Signature {
        name: "iframe",
        probe: Probe::Element("iframe"),
        route: Route::Frame {
            frame: "iframe",
            branches: &[
                (Probe::Element("td[onclick]"), Layout::Jiangsu),
                (Probe::Element("frame[name='top']"), Layout::ZhejiangLegacy),
            ],
            otherwise: Layout::ZhejiangModern,
        },
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub signature: &'static str,
    pub layout: Layout,
}

/// Probe the loaded entry page against [`SIGNATURES`]. Frame routes leave the
/// driver inside the frame, which is where extraction continues.
pub fn detect(driver: &mut dyn Driver) -> Result<Option<Detection>> {
    detect_with(driver, SIGNATURES)
}

pub fn detect_with(driver: &mut dyn Driver, table: &[Signature]) -> Result<Option<Detection>> {
    let doc = dom::parse(&driver.content()?);
    let Some(sig) = first_match(&doc, table)? else {
        warn!("Unable to detect yearbook format at {}", driver.current_url());
        return Ok(None);
    };
    drop(doc);
    debug!("Matched signature: {}", sig.name);

    let layout = match sig.route {
        Route::Here(layout) => layout,
        Route::Frame {
            frame,
            branches,
            otherwise,
        } => {
            match driver::enter_frame(driver, frame)? {
                Some(url) => info!("Identified frame ({}): {}", sig.name, url),
                None => warn!("Frame {} has no src; reading the page itself", frame),
            }
            let inner = dom::parse(&driver.content()?);
            let mut chosen = otherwise;
            for (probe, layout) in branches {
                if probe.matches(&inner)? {
                    chosen = *layout;
                    break;
                }
            }
            chosen
        }
    };

    info!("Detected layout: {}", layout);
    Ok(Some(Detection {
        signature: sig.name,
        layout,
    }))
}

fn first_match<'t>(doc: &scraper::Html, table: &'t [Signature]) -> Result<Option<&'t Signature>> {
    for sig in table {
        if sig.probe.matches(doc)? {
            return Ok(Some(sig));
        }
    }
    Ok(None)
}
