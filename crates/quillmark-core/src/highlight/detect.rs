use super::Language;

const JS_HINT_WORDS: [&str; 10] = [
    "const", "let", "var", "function", "return", "import", "export", "class", "async", "await",
];

/// Guesses the language of an unlabeled code block.
///
/// Checks run in a fixed order: markup, then a CSS rule shape, then
/// JavaScript keywords. Short snippets are ambiguous and the first match
/// wins.
pub fn detect_language(code: &str) -> Option<Language> {
    let trimmed = code.trim();
    let detected = if looks_like_markup(trimmed) {
        Some(Language::Markup)
    } else if looks_like_css_rule(trimmed) {
        Some(Language::Css)
    } else if looks_like_javascript(trimmed) {
        Some(Language::JavaScript)
    } else {
        None
    };
    tracing::debug!(?detected, "detected code block language");
    detected
}

/// An opening tag with a closing tag somewhere after it, or an HTML doctype.
fn looks_like_markup(text: &str) -> bool {
    if text.to_ascii_lowercase().contains("<!doctype html>") {
        return true;
    }
    let bytes = text.as_bytes();
    let mut next_gt = NextByte::new(bytes, b'>');
    // The earliest opening tag leaves the longest tail to find a closer in.
    let first_open = (0..bytes.len()).find_map(|idx| opening_tag_end(bytes, idx, &mut next_gt));
    match first_open {
        Some(end) => (end..bytes.len()).any(|idx| is_closing_tag(bytes, idx)),
        None => false,
    }
}

/// Finds the next occurrence of a byte for offsets that only move forward,
/// so repeated lookups scan the input once in total.
struct NextByte<'a> {
    bytes: &'a [u8],
    target: u8,
    found: Option<usize>,
    exhausted: bool,
}

impl<'a> NextByte<'a> {
    fn new(bytes: &'a [u8], target: u8) -> Self {
        Self {
            bytes,
            target,
            found: None,
            exhausted: false,
        }
    }

    fn at_or_after(&mut self, from: usize) -> Option<usize> {
        if let Some(pos) = self.found.filter(|&pos| pos >= from) {
            return Some(pos);
        }
        if self.exhausted {
            return None;
        }
        let from = from.min(self.bytes.len());
        self.found = self.bytes[from..]
            .iter()
            .position(|&b| b == self.target)
            .map(|offset| from + offset);
        self.exhausted = self.found.is_none();
        self.found
    }
}

fn opening_tag_end(bytes: &[u8], start: usize, next_gt: &mut NextByte<'_>) -> Option<usize> {
    if bytes[start] != b'<' || !bytes.get(start + 1)?.is_ascii_alphabetic() {
        return None;
    }
    let mut idx = start + 2;
    while idx < bytes.len() && is_tag_name_byte(bytes[idx]) {
        idx += 1;
    }
    match *bytes.get(idx)? {
        b'>' => Some(idx + 1),
        byte if byte.is_ascii_whitespace() => next_gt.at_or_after(idx).map(|gt| gt + 1),
        _ => None,
    }
}

fn is_closing_tag(bytes: &[u8], start: usize) -> bool {
    if !bytes[start..].starts_with(b"</") {
        return false;
    }
    if !bytes.get(start + 2).is_some_and(u8::is_ascii_alphabetic) {
        return false;
    }
    let mut idx = start + 3;
    while idx < bytes.len() && is_tag_name_byte(bytes[idx]) {
        idx += 1;
    }
    bytes.get(idx) == Some(&b'>')
}

fn is_tag_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-'
}

/// `selector { property: value; }`: a word before `{`, then a `:` and
/// later a `;` that closes the block.
fn looks_like_css_rule(text: &str) -> bool {
    let bytes = text.as_bytes();
    let Some(open) = (0..bytes.len()).find(|&idx| bytes[idx] == b'{' && has_selector_before(bytes, idx))
    else {
        return false;
    };
    let Some(semi) = last_semicolon_before_brace(bytes) else {
        return false;
    };
    semi > open && bytes[open + 1..semi].contains(&b':')
}

fn has_selector_before(bytes: &[u8], brace: usize) -> bool {
    let mut idx = brace;
    while idx > 0 && bytes[idx - 1].is_ascii_whitespace() {
        idx -= 1;
    }
    let word_end = idx;
    while idx > 0 && is_tag_name_byte(bytes[idx - 1]) {
        idx -= 1;
    }
    bytes[idx..word_end].iter().any(u8::is_ascii_alphabetic)
}

fn last_semicolon_before_brace(bytes: &[u8]) -> Option<usize> {
    (0..bytes.len()).rev().find_map(|idx| {
        if bytes[idx] != b'}' {
            return None;
        }
        let mut before = idx;
        while before > 0 && bytes[before - 1].is_ascii_whitespace() {
            before -= 1;
        }
        (before > 0 && bytes[before - 1] == b';').then(|| before - 1)
    })
}

fn looks_like_javascript(text: &str) -> bool {
    if text.contains("=>") {
        return true;
    }
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .any(|word| JS_HINT_WORDS.contains(&word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_needs_open_and_close() {
        assert_eq!(
            detect_language("<div class=\"a\">\n  <p>x</p>\n</div>"),
            Some(Language::Markup)
        );
        assert_eq!(
            detect_language("<!doctype HTML>\n<title>x"),
            Some(Language::Markup)
        );
        assert_ne!(detect_language("<br>"), Some(Language::Markup));
    }

    #[test]
    fn css_rule_shape() {
        assert_eq!(
            detect_language("body {\n  margin: 0;\n}"),
            Some(Language::Css)
        );
        assert_eq!(detect_language("#id{color:red;}"), Some(Language::Css));
        assert_eq!(detect_language("{ color: red; }"), None);
    }

    #[test]
    fn javascript_keywords_and_arrows() {
        assert_eq!(
            detect_language("function add(a, b) { return a + b }"),
            Some(Language::JavaScript)
        );
        assert_eq!(detect_language("xs.map(x => x * 2)"), Some(Language::JavaScript));
        assert_eq!(detect_language("constant folding"), None);
    }

    #[test]
    fn markup_wins_over_javascript() {
        assert_eq!(
            detect_language("<script>const a = 1;</script>"),
            Some(Language::Markup)
        );
    }

    #[test]
    fn unclosed_tag_openers_scan_in_linear_time() {
        let code = "<a ".repeat(100_000);
        let started = std::time::Instant::now();
        assert_eq!(detect_language(&code), None);
        assert!(
            started.elapsed() < std::time::Duration::from_secs(2),
            "detection took {:?}",
            started.elapsed()
        );

        let closed_late = format!("{}>x</a>", "<a ".repeat(100_000));
        assert_eq!(detect_language(&closed_late), Some(Language::Markup));
    }

    #[test]
    fn empty_and_plain_text() {
        assert_eq!(detect_language(""), None);
        assert_eq!(detect_language("   \n "), None);
        assert_eq!(detect_language("SELECT * FROM t"), None);
    }
}
