mod common;

use std::fs;
use std::path::Path;

use common::{FakeDriver, FakeFetch};
use tjnj::config::ProcessOptions;
use tjnj::extract::PageEntry;
use tjnj::process::{Outcome, Processor, SavedKind, SkipReason};

fn entry(url: &str, id: &str) -> PageEntry {
    PageEntry {
        url: url.to_string(),
        id: id.to_string(),
    }
}

fn files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn spreadsheet_is_handed_to_browser() {
    let tmp = tempfile::tempdir().unwrap();
    let mut driver = FakeDriver::new().downloads_into(tmp.path());
    let fetch = FakeFetch::default();
    let opts = ProcessOptions::default();
    let mut processor = Processor::new(tmp.path(), &opts, &fetch);

    let url = "http://tjj.example.gov.cn/nj/2020/excel/1-1.xlsx";
    let outcome = processor.process(&mut driver, &entry(url, "1-1")).unwrap();
    assert_eq!(outcome, Outcome::Triggered(url.to_string()));
    assert_eq!(files(tmp.path()), vec!["1-1.xlsx"]);
    assert!(fetch.fetched.borrow().is_empty());
}

#[test]
fn table_page_becomes_one_csv() {
    let tmp = tempfile::tempdir().unwrap();
    let url = "http://tjj.example.gov.cn/nj/2020/html/2-1.htm";
    let mut driver = FakeDriver::new().page(
        url,
        r#"<p>2-1 人口</p>
           <table>
             <tr><th rowspan="2">地区</th><th colspan="2">人口</th></tr>
             <tr><th>男</th><th>女</th></tr>
             <tr><td>合肥</td><td>480</td><td>466</td></tr>
           </table>
           <table><tr><td>附注</td></tr></table>"#,
    );
    let fetch = FakeFetch::default();
    let opts = ProcessOptions::default();
    let mut processor = Processor::new(tmp.path(), &opts, &fetch);

    let outcome = processor.process(&mut driver, &entry(url, "2-1")).unwrap();
    let path = tmp.path().join("2-1.csv");
    assert_eq!(
        outcome,
        Outcome::Saved {
            kind: SavedKind::Table,
            path: path.clone()
        }
    );
    assert_eq!(files(tmp.path()), vec!["2-1.csv"]);
    let csv = fs::read_to_string(path).unwrap();
    assert_eq!(csv.lines().collect::<Vec<_>>(), vec!["地区,人口,人口", "地区,男,女", "合肥,480,466"]);
}

#[test]
fn spreadsheet_link_on_page_wins_over_table() {
    let tmp = tempfile::tempdir().unwrap();
    let url = "http://tjj.example.gov.cn/nj/2020/html/3-1.htm";
    let mut driver = FakeDriver::new().page(
        url,
        r#"<a href="../excel/3-1.xls">下载</a><table><tr><td>1</td></tr></table>"#,
    );
    let fetch = FakeFetch::default();
    let opts = ProcessOptions::default();
    let mut processor = Processor::new(tmp.path(), &opts, &fetch);

    let outcome = processor.process(&mut driver, &entry(url, "3-1")).unwrap();
    assert_eq!(
        outcome,
        Outcome::Triggered("http://tjj.example.gov.cn/nj/2020/excel/3-1.xls".to_string())
    );
    assert!(files(tmp.path()).is_empty());
}

#[test]
fn binaries_are_fetched_directly() {
    let tmp = tempfile::tempdir().unwrap();
    let mut driver = FakeDriver::new();
    let fetch = FakeFetch::default();
    let opts = ProcessOptions::default();
    let mut processor = Processor::new(tmp.path(), &opts, &fetch);

    let url = "http://tjj.example.gov.cn/nj/2020/%E6%A6%82%E8%BF%B0.pdf";
    let outcome = processor.process(&mut driver, &entry(url, "概述")).unwrap();
    assert!(matches!(outcome, Outcome::Saved { kind: SavedKind::Binary, .. }));
    assert_eq!(files(tmp.path()), vec!["概述.pdf"]);
    assert!(driver.navigations.is_empty());
}

#[test]
fn nothing_to_capture_is_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    let url = "http://tjj.example.gov.cn/nj/2020/html/intro.htm";
    let mut driver = FakeDriver::new().page(url, "<table><tr><td>说明</td></tr></table>");
    let fetch = FakeFetch::default();
    let opts = ProcessOptions {
        disable_csv: true,
        disable_htmlpage: true,
        ..ProcessOptions::default()
    };
    let mut processor = Processor::new(tmp.path(), &opts, &fetch);

    let outcome = processor.process(&mut driver, &entry(url, "intro")).unwrap();
    assert_eq!(outcome, Outcome::Skipped(SkipReason::NothingToCapture));

    let other = entry("http://tjj.example.gov.cn/nj/2020/search.asp", "search");
    let outcome = processor.process(&mut driver, &other).unwrap();
    assert_eq!(outcome, Outcome::Skipped(SkipReason::UnknownFormat));
    assert!(files(tmp.path()).is_empty());
}

#[test]
fn raw_page_never_overwritten() {
    let tmp = tempfile::tempdir().unwrap();
    let url = "http://tjj.example.gov.cn/nj/2020/html/notes.htm";
    let mut driver = FakeDriver::new().page(url, "<p>编辑说明</p>");
    let fetch = FakeFetch::default();
    let opts = ProcessOptions {
        disable_htmlpage: false,
        ..ProcessOptions::default()
    };
    let mut processor = Processor::new(tmp.path(), &opts, &fetch);

    let page = entry(url, "notes");
    let outcome = processor.process(&mut driver, &page).unwrap();
    assert!(matches!(outcome, Outcome::Saved { kind: SavedKind::Page, .. }));
    assert_eq!(files(tmp.path()), vec!["notes.htm"]);
    assert!(processor.process(&mut driver, &page).is_err());
}
