use super::{HighlightToken, Scanner, TokenClass, quoted_end};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Segment {
    /// Text ending in `{`: a selector list or an at-rule prelude.
    Selector,
    /// `property: value` inside a rule body.
    Declaration { colon: usize },
    Other,
}

pub(crate) fn tokenize(code: &str) -> Vec<HighlightToken> {
    let mut scanner = Scanner::new(code);
    let bytes = scanner.bytes();
    let mut depth = 0usize;

    while scanner.peek().is_some() {
        let start = scanner.pos();
        let (end, terminator) = segment_end(bytes, start);
        let segment = match terminator {
            Some(b'{') => Segment::Selector,
            _ if depth > 0 => match top_level_colon(bytes, start, end) {
                Some(colon) => Segment::Declaration { colon },
                None => Segment::Other,
            },
            _ => Segment::Other,
        };
        emit_segment(&mut scanner, end, segment);

        if let Some(byte) = terminator {
            scanner.skip(1);
            match byte {
                b'{' => depth += 1,
                b'}' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
    }

    scanner.finish()
}

/// Finds the next `{`, `}` or `;` outside comments and strings.
fn segment_end(bytes: &[u8], start: usize) -> (usize, Option<u8>) {
    let mut idx = start;
    while idx < bytes.len() {
        match bytes[idx] {
            b'{' | b'}' | b';' => return (idx, Some(bytes[idx])),
            b'/' if bytes.get(idx + 1) == Some(&b'*') => idx = comment_end(bytes, idx),
            b'"' | b'\'' => idx = quoted_end(bytes, idx).unwrap_or(idx + 1),
            _ => idx += 1,
        }
    }
    (bytes.len(), None)
}

fn top_level_colon(bytes: &[u8], start: usize, end: usize) -> Option<usize> {
    let mut idx = start;
    while idx < end {
        match bytes[idx] {
            b':' => return Some(idx),
            b'/' if bytes.get(idx + 1) == Some(&b'*') => idx = comment_end(bytes, idx),
            b'"' | b'\'' => idx = quoted_end(bytes, idx).unwrap_or(idx + 1),
            _ => idx += 1,
        }
    }
    None
}

fn comment_end(bytes: &[u8], start: usize) -> usize {
    bytes[start + 2..]
        .windows(2)
        .position(|window| window == b"*/")
        .map(|idx| start + 2 + idx + 2)
        .unwrap_or(bytes.len())
}

fn emit_segment(scanner: &mut Scanner<'_>, end: usize, segment: Segment) {
    let bytes = scanner.bytes();
    let mut seen_word = false;
    let mut at_rule = false;

    while scanner.pos() < end {
        let pos = scanner.pos();
        let byte = bytes[pos];
        if byte == b'/' && scanner.peek_at(1) == Some(b'*') {
            scanner.emit(comment_end(bytes, pos).min(end), TokenClass::Comment);
            continue;
        }
        if byte == b'"' || byte == b'\'' {
            match quoted_end(bytes, pos) {
                Some(close) if close <= end => scanner.emit(close, TokenClass::String),
                _ => scanner.skip(1),
            }
            continue;
        }
        if byte.is_ascii_whitespace() {
            scanner.skip(1);
            continue;
        }

        match segment {
            Segment::Selector => {
                if matches!(byte, b',' | b'>' | b'+' | b'~') {
                    scanner.skip(1);
                    continue;
                }
                let word = run_end(bytes, pos, end, is_selector_byte);
                let class = if byte == b'@' && !seen_word {
                    at_rule = true;
                    TokenClass::Keyword
                } else if at_rule {
                    TokenClass::Plain
                } else {
                    TokenClass::Selector
                };
                seen_word = true;
                scanner.emit(word, class);
            }
            Segment::Declaration { colon } if pos < colon => {
                let word = run_end(bytes, pos, colon, |b| !b.is_ascii_whitespace());
                scanner.emit(word.max(pos + 1), TokenClass::Property);
            }
            Segment::Declaration { colon } if pos == colon => scanner.skip(1),
            Segment::Declaration { .. } => {
                if byte == b'!' && bytes.get(pos + 1).is_some_and(u8::is_ascii_alphabetic) {
                    let word = run_end(bytes, pos + 1, end, is_value_byte);
                    scanner.emit(word, TokenClass::Keyword);
                } else if is_value_byte(byte) {
                    let word = run_end(bytes, pos, end, is_value_byte);
                    scanner.emit(word, TokenClass::Value);
                } else {
                    scanner.skip(1);
                }
            }
            Segment::Other => {
                if byte == b'@' {
                    let word = run_end(bytes, pos + 1, end, is_value_byte);
                    scanner.emit(word, TokenClass::Keyword);
                } else {
                    scanner.skip(1);
                }
            }
        }
    }
}

fn run_end(bytes: &[u8], start: usize, end: usize, accept: impl Fn(u8) -> bool) -> usize {
    let mut idx = start;
    while idx < end && accept(bytes[idx]) {
        if bytes[idx] == b'/' && bytes.get(idx + 1) == Some(&b'*') {
            break;
        }
        idx += 1;
    }
    idx
}

fn is_selector_byte(byte: u8) -> bool {
    !byte.is_ascii_whitespace() && !matches!(byte, b',' | b'>' | b'+' | b'~' | b'"' | b'\'')
}

fn is_value_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'#' | b'%' | b'.' | b'-' | b'_')
}
