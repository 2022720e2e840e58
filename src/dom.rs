//! Structural queries over rendered page markup, plus the URL/label
//! string helpers shared by every extractor.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{Error, Result};

pub fn parse(html: &str) -> Html {
    Html::parse_document(html)
}

pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Selector(format!("{css}: {e:?}")))
}

pub fn exists(doc: &Html, css: &str) -> Result<bool> {
    let sel = selector(css)?;
    Ok(doc.select(&sel).next().is_some())
}

pub fn select<'a>(doc: &'a Html, css: &str) -> Result<Vec<ElementRef<'a>>> {
    let sel = selector(css)?;
    Ok(doc.select(&sel).collect())
}

/// Value of `attr` on the first element matching `css`, if any.
pub fn first_attr(doc: &Html, css: &str, attr: &str) -> Result<Option<String>> {
    let sel = selector(css)?;
    Ok(doc
        .select(&sel)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::to_string))
}

/// True if any `<script>` body contains `marker`.
pub fn script_contains(doc: &Html, marker: &str) -> Result<bool> {
    Ok(script_text(doc, marker)?.is_some())
}

/// Body of the first `<script>` containing `marker`.
pub fn script_text(doc: &Html, marker: &str) -> Result<Option<String>> {
    let sel = selector("script")?;
    Ok(doc
        .select(&sel)
        .map(|el| el.text().collect::<String>())
        .find(|body| body.contains(marker)))
}

/// Resolve `href` against `base` the way a browser resolves the `href` property.
pub fn resolve(base: &str, href: &str) -> String {
    match Url::parse(base).and_then(|b| b.join(href.trim())) {
        Ok(u) => u.to_string(),
        Err(_) => href.to_string(),
    }
}

/// Everything up to and including the last `/`.
pub fn url_root(url: &str) -> &str {
    match url.rfind('/') {
        Some(i) => &url[..=i],
        None => "",
    }
}

/// Directory part of `url` without the trailing `/`.
pub fn url_dir(url: &str) -> &str {
    match url.rfind('/') {
        Some(i) => &url[..i],
        None => url,
    }
}

/// Final path segment, verbatim.
pub fn file_name(url: &str) -> &str {
    match url.rfind('/') {
        Some(i) => &url[i + 1..],
        None => url,
    }
}

/// Strip the text after the last `.`; a name without one is returned whole.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(i) => &name[..i],
        None => name,
    }
}

/// Extension of the final segment, dot included (`".pdf"`), or empty.
pub fn extension(url: &str) -> &str {
    let name = file_name(url);
    match name.rfind('.') {
        Some(i) => &name[i..],
        None => "",
    }
}

/// Terminal segment without extension, not decoded.
pub fn raw_identifier(url: &str) -> &str {
    strip_extension(file_name(url))
}

/// Terminal segment without extension, percent-decoded as UTF-8.
pub fn identifier(url: &str) -> String {
    percent_decode(raw_identifier(url))
}

pub fn percent_decode(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(s) => s.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned(),
    }
}

const LABEL_NOISE: &str = "&.,:;<>?/=#\"\n\t ";

/// Drop lowercase ASCII letters and markup punctuation so only the
/// reference code and the CJK caption survive.
pub fn clean_label(inner_html: &str) -> String {
    inner_html
        .chars()
        .filter(|c| !c.is_ascii_lowercase() && !LABEL_NOISE.contains(*c))
        .collect::<String>()
        .trim()
        .to_string()
}
