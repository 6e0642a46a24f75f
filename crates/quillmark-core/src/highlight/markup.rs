use super::{HighlightToken, Scanner, TokenClass, quoted_end};

pub(crate) fn tokenize(code: &str) -> Vec<HighlightToken> {
    let mut scanner = Scanner::new(code);
    let bytes = scanner.bytes();

    while let Some(byte) = scanner.peek() {
        let pos = scanner.pos();
        if scanner.starts_with("<!--") {
            let end = scanner.end_after(pos + 4, "-->");
            scanner.emit(end, TokenClass::Comment);
            continue;
        }
        if byte != b'<' {
            scanner.skip(1);
            continue;
        }
        match tag_end(bytes, pos) {
            Some(close) => emit_tag(&mut scanner, close),
            None => scanner.skip(1),
        }
    }

    scanner.finish()
}

/// Index of the `>` closing the tag opened at `start`, if the text there
/// looks like a tag at all.
fn tag_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut name_start = start + 1;
    if matches!(bytes.get(name_start), Some(b'/' | b'!' | b'?')) {
        name_start += 1;
    }
    if !bytes.get(name_start)?.is_ascii_alphabetic() {
        return None;
    }
    let mut idx = name_start;
    while idx < bytes.len() {
        match bytes[idx] {
            b'>' => return Some(idx),
            b'<' => return None,
            b'"' | b'\'' => idx = quoted_end(bytes, idx)?,
            _ => idx += 1,
        }
    }
    None
}

fn emit_tag(scanner: &mut Scanner<'_>, close: usize) {
    let bytes = scanner.bytes();
    let open = scanner.pos();
    let declaration = matches!(bytes.get(open + 1), Some(b'!' | b'?'));

    // `<`, `</`, `<!` and `<?` stay plain; the marker after `<` is part of
    // a declaration's name.
    let name_start = if bytes.get(open + 1) == Some(&b'/') {
        open + 2
    } else {
        open + 1
    };
    scanner.skip(name_start - open);
    let name_end = run_end(bytes, name_start + usize::from(declaration), close, is_name_byte);
    let class = if declaration {
        TokenClass::Keyword
    } else {
        TokenClass::Tag
    };
    scanner.emit(name_end, class);

    while scanner.pos() < close {
        let pos = scanner.pos();
        let byte = bytes[pos];
        if byte == b'"' || byte == b'\'' {
            match quoted_end(bytes, pos) {
                Some(end) if end <= close => scanner.emit(end, TokenClass::String),
                _ => scanner.skip(1),
            }
        } else if is_name_byte(byte) && !declaration {
            let end = run_end(bytes, pos, close, is_name_byte);
            scanner.emit(end, TokenClass::Attr);
            if scanner.peek() == Some(b'=') {
                scanner.skip(1);
                emit_unquoted_value(scanner, close);
            }
        } else {
            scanner.skip(1);
        }
    }
    scanner.skip(1);
}

fn emit_unquoted_value(scanner: &mut Scanner<'_>, close: usize) {
    let bytes = scanner.bytes();
    let pos = scanner.pos();
    match bytes.get(pos) {
        Some(b'"' | b'\'') | None => {}
        Some(&byte) if byte.is_ascii_whitespace() || pos >= close => {}
        Some(_) => {
            let end = run_end(bytes, pos, close, |b| {
                !b.is_ascii_whitespace() && b != b'/' && b != b'"' && b != b'\''
            });
            if end > pos {
                scanner.emit(end, TokenClass::String);
            }
        }
    }
}

fn run_end(bytes: &[u8], start: usize, end: usize, accept: impl Fn(u8) -> bool) -> usize {
    let mut idx = start;
    while idx < end && accept(bytes[idx]) {
        idx += 1;
    }
    idx
}

fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b':' | b'.')
}
