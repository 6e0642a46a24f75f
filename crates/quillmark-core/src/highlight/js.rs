use super::{HighlightToken, Scanner, TokenClass, quoted_end};
use once_cell::sync::Lazy;
use std::collections::HashSet;

static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "const", "let", "var", "function", "return", "if", "else", "for", "while", "switch",
        "case", "break", "continue", "new", "class", "import", "from", "export", "async",
        "await", "try", "catch", "finally", "throw",
    ]
    .into_iter()
    .collect()
});

pub(crate) fn tokenize(code: &str) -> Vec<HighlightToken> {
    let mut scanner = Scanner::new(code);
    let bytes = scanner.bytes();

    while let Some(byte) = scanner.peek() {
        let pos = scanner.pos();
        match byte {
            b'/' if scanner.peek_at(1) == Some(b'/') => {
                let end = bytes[pos..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map(|idx| pos + idx)
                    .unwrap_or(bytes.len());
                scanner.emit(end, TokenClass::Comment);
            }
            b'/' if scanner.peek_at(1) == Some(b'*') => {
                let end = scanner.end_after(pos + 2, "*/");
                scanner.emit(end, TokenClass::Comment);
            }
            b'"' | b'\'' | b'`' => match quoted_end(bytes, pos) {
                Some(end) => scanner.emit(end, TokenClass::String),
                // A quote that never closes is ordinary text.
                None => scanner.skip(1),
            },
            b if b.is_ascii_digit() => {
                let (end, is_number) = scan_number(bytes, pos);
                let class = if is_number {
                    TokenClass::Number
                } else {
                    TokenClass::Plain
                };
                scanner.emit(end, class);
            }
            b if is_ident_start(b) => {
                let end = word_end(bytes, pos);
                let class = if KEYWORDS.contains(&code[pos..end]) {
                    TokenClass::Keyword
                } else {
                    TokenClass::Plain
                };
                scanner.emit(end, class);
            }
            _ => scanner.skip(1),
        }
    }

    scanner.finish()
}

fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte == b'$'
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$'
}

fn word_end(bytes: &[u8], start: usize) -> usize {
    let mut idx = start;
    while idx < bytes.len() && is_word_byte(bytes[idx]) {
        idx += 1;
    }
    idx
}

fn digits_end(bytes: &[u8], start: usize) -> usize {
    let mut idx = start;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    idx
}

/// Scans `123` or `1.5` starting at a digit. A digit run glued to letters
/// (`10px`, `0x1f`) is a plain word instead.
fn scan_number(bytes: &[u8], start: usize) -> (usize, bool) {
    let int_end = digits_end(bytes, start);
    match bytes.get(int_end) {
        Some(&b) if is_word_byte(b) => (word_end(bytes, start), false),
        Some(b'.') if bytes.get(int_end + 1).is_some_and(u8::is_ascii_digit) => {
            let frac_end = digits_end(bytes, int_end + 1);
            if bytes.get(frac_end).is_some_and(|&b| is_word_byte(b)) {
                (int_end, true)
            } else {
                (frac_end, true)
            }
        }
        _ => (int_end, true),
    }
}
