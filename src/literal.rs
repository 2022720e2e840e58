//! Lenient decoding of the script literals some yearbook menus embed:
//! dtree-style argument tuples and the entries of a `contents` array.
//!
//! Only the shapes those menus actually use are accepted. Anything else is
//! reported as [`Error::Literal`] and the caller skips that one entry.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Trailing field of `contents` entries that is not part of the data.
const OPENED_FLAG: &str = ",\"opened\":false";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentsEntry {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub label: String,
}

/// Decode one `{"index":...}` object from a `contents` array.
pub fn contents_entry(raw: &str) -> Result<ContentsEntry> {
    let normalized = raw.replace(OPENED_FLAG, "");
    serde_json::from_str(&normalized).map_err(|e| Error::Literal(format!("{raw}: {e}")))
}

/// Decode a parenthesised argument list such as `(1,0,'人口','html/01.htm')`.
pub fn tuple(raw: &str) -> Result<Vec<Value>> {
    let mut lexer = Lexer::new(raw);
    lexer.skip_ws();
    if !lexer.eat('(') {
        return Err(lexer.error("expected `(`"));
    }

    let mut items = Vec::new();
    loop {
        lexer.skip_ws();
        if lexer.eat(')') {
            break;
        }
        items.push(lexer.value()?);
        lexer.skip_ws();
        if lexer.eat(',') {
            continue;
        }
        if lexer.eat(')') {
            break;
        }
        return Err(lexer.error("expected `,` or `)`"));
    }

    lexer.skip_ws();
    if !lexer.at_end() {
        return Err(lexer.error("trailing input"));
    }
    Ok(items)
}

/// String view of a tuple slot; non-strings, `null` and out-of-range are `None`.
pub fn str_at(items: &[Value], index: usize) -> Option<&str> {
    items.get(index).and_then(Value::as_str)
}

struct Lexer<'a> {
    src: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
        }
    }

    fn error(&mut self, what: &str) -> Error {
        let at = self.chars.peek().map(|(i, _)| *i).unwrap_or(self.src.len());
        Error::Literal(format!("{what} at byte {at} in {}", self.src))
    }

    fn at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn eat(&mut self, want: char) -> bool {
        if matches!(self.chars.peek(), Some((_, c)) if *c == want) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn value(&mut self) -> Result<Value> {
        match self.chars.peek().map(|(_, c)| *c) {
            Some(q @ ('\'' | '"')) => {
                self.chars.next();
                self.string(q).map(Value::String)
            }
            Some(c) if c == '-' || c == '+' || c.is_ascii_digit() => self.number(),
            Some(c) if c.is_ascii_alphabetic() => self.word(),
            _ => Err(self.error("expected a value")),
        }
    }

    fn string(&mut self, quote: char) -> Result<String> {
        let mut out = String::new();
        while let Some((_, c)) = self.chars.next() {
            match c {
                '\\' => match self.chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, other)) => out.push(other),
                    None => break,
                },
                c if c == quote => return Ok(out),
                c => out.push(c),
            }
        }
        Err(self.error("unterminated string"))
    }

    fn number(&mut self) -> Result<Value> {
        let mut text = String::new();
        while let Some((_, c)) = self.chars.peek() {
            if c.is_ascii_digit() || matches!(*c, '-' | '+' | '.' | 'e' | 'E') {
                text.push(*c);
                self.chars.next();
            } else {
                break;
            }
        }
        if let Ok(n) = text.parse::<i64>() {
            return Ok(Value::from(n));
        }
        match text.parse::<f64>() {
            Ok(f) => Ok(Value::from(f)),
            Err(_) => Err(Error::Literal(format!("bad number `{text}` in {}", self.src))),
        }
    }

    fn word(&mut self) -> Result<Value> {
        let mut word = String::new();
        while let Some((_, c)) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || *c == '_' {
                word.push(*c);
                self.chars.next();
            } else {
                break;
            }
        }
        match word.as_str() {
            "true" | "True" => Ok(Value::Bool(true)),
            "false" | "False" => Ok(Value::Bool(false)),
            "null" | "None" | "undefined" => Ok(Value::Null),
            _ => Err(Error::Literal(format!("unexpected identifier `{word}` in {}", self.src))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dtree_arguments() {
        let items = tuple("(12, 1, '2-1 人口数', 'html/02-01.htm')").unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0], Value::from(12));
        assert_eq!(str_at(&items, 2), Some("2-1 人口数"));
        assert_eq!(str_at(&items, 3), Some("html/02-01.htm"));
    }

    #[test]
    fn root_node_without_link() {
        let items = tuple("(0,-1,'2019安徽统计年鉴')").unwrap();
        assert_eq!(str_at(&items, 3), None);
        assert_eq!(items[1], Value::from(-1));
    }

    #[test]
    fn mixed_quotes_and_trailing_comma() {
        let items = tuple(r#"("a'b", 'c\'d', True,)"#).unwrap();
        assert_eq!(str_at(&items, 0), Some("a'b"));
        assert_eq!(str_at(&items, 1), Some("c'd"));
        assert_eq!(items[2], Value::Bool(true));
    }

    #[test]
    fn malformed_tuple_is_an_error() {
        assert!(tuple("('unterminated)").is_err());
        assert!(tuple("(1 2)").is_err());
        assert!(tuple("[1,2]").is_err());
        assert!(tuple("(window.open)").is_err());
    }

    #[test]
    fn contents_entry_with_opened_flag() {
        let e = contents_entry(
            r#"{"index":"1-1","label":"1-1 行政区划","link":"1-1.xlsx","opened":false}"#,
        )
        .unwrap();
        assert_eq!(e.link.as_deref(), Some("1-1.xlsx"));
        assert_eq!(e.label, "1-1 行政区划");
    }

    #[test]
    fn contents_entry_without_link() {
        let e = contents_entry(r#"{"index":"1","label":"综合","link":null,"opened":false}"#).unwrap();
        assert_eq!(e.link, None);
        let e = contents_entry(r#"{"index":"1","label":"综合"}"#).unwrap();
        assert_eq!(e.link, None);
    }

    #[test]
    fn contents_entry_malformed() {
        assert!(contents_entry(r#"{"index":"1","label":}"#).is_err());
    }
}
