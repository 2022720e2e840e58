//! HTML `<table>` to rectangular rows, for delimited-text capture.

use std::path::Path;

use scraper::{ElementRef, Html};

use crate::dom;
use crate::error::{Error, Result};

/// Outer markup of the first `<table>` in `doc`.
pub fn first_table_html(doc: &Html) -> Result<Option<String>> {
    Ok(dom::select(doc, "table")?.first().map(|t| t.html()))
}

/// Rows of the first table in `fragment`. Spanned cells are repeated across
/// the rows and columns they cover; short rows are padded to full width.
pub fn rows(fragment: &str) -> Result<Vec<Vec<String>>> {
    let doc = Html::parse_fragment(fragment);
    let table = dom::select(&doc, "table")?
        .into_iter()
        .next()
        .ok_or(Error::NoTable)?;

    let mut grid: Vec<Vec<Option<String>>> = Vec::new();
    // (column, text, rows still to fill below the current one)
    let mut pending: Vec<(usize, String, usize)> = Vec::new();

    for (r, tr) in table_rows(table).into_iter().enumerate() {
        if grid.len() <= r {
            grid.push(Vec::new());
        }
        for (col, text, left) in pending.iter_mut() {
            if *left > 0 {
                place(&mut grid[r], *col, text.clone());
                *left -= 1;
            }
        }
        pending.retain(|(_, _, left)| *left > 0);

        let mut col = 0;
        for cell in children(tr).filter(|c| matches!(c.value().name(), "td" | "th")) {
            while grid[r].get(col).is_some_and(Option::is_some) {
                col += 1;
            }
            let text = cell_text(cell);
            let colspan = span(cell, "colspan");
            let rowspan = span(cell, "rowspan");
            for c in col..col + colspan {
                place(&mut grid[r], c, text.clone());
                if rowspan > 1 {
                    pending.push((c, text.clone(), rowspan - 1));
                }
            }
            col += colspan;
        }
    }

    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    Ok(grid
        .into_iter()
        .map(|row| {
            let mut row: Vec<String> = row.into_iter().map(Option::unwrap_or_default).collect();
            row.resize(width, String::new());
            row
        })
        .filter(|row| row.iter().any(|c| !c.is_empty()))
        .collect())
}

/// Write rows without header or index, comma separated.
pub fn write_csv(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn children<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

/// `tr`s of this table only, not of tables nested in its cells.
fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut out = Vec::new();
    for child in children(table) {
        match child.value().name() {
            "tr" => out.push(child),
            "thead" | "tbody" | "tfoot" => {
                out.extend(children(child).filter(|c| c.value().name() == "tr"))
            }
            _ => {}
        }
    }
    out
}

fn place(row: &mut Vec<Option<String>>, col: usize, text: String) {
    if row.len() <= col {
        row.resize(col + 1, None);
    }
    if row[col].is_none() {
        row[col] = Some(text);
    }
}

fn span(cell: ElementRef<'_>, attr: &str) -> usize {
    cell.value()
        .attr(attr)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
        .min(1000)
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_rows() {
        let rows = rows(
            "<table><tr><td>地区</td><td>人口</td></tr><tr><td>合肥</td><td> 963.4 </td></tr></table>",
        )
        .unwrap();
        assert_eq!(rows, vec![vec!["地区", "人口"], vec!["合肥", "963.4"]]);
    }

    #[test]
    fn spans_are_expanded() {
        let html = r#"<table><tbody>
            <tr><th rowspan="2">指标</th><th colspan="2">2020</th></tr>
            <tr><th>上半年</th><th>下半年</th></tr>
            <tr><td>GDP</td><td>1</td><td>2</td></tr>
        </tbody></table>"#;
        let rows = rows(html).unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["指标", "2020", "2020"],
                vec!["指标", "上半年", "下半年"],
                vec!["GDP", "1", "2"],
            ]
        );
    }

    #[test]
    fn nested_table_rows_stay_inside_cell() {
        let html = "<table><tr><td>a<table><tr><td>x</td><td>y</td></tr></table></td><td>b</td></tr></table>";
        let rows = rows(html).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], "b");
    }

    #[test]
    fn no_table_is_an_error() {
        assert!(matches!(rows("<div>nothing</div>"), Err(Error::NoTable)));
    }
}
