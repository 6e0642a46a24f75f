mod css;
mod detect;
mod js;
mod markup;

use crate::escape::{escape_html, push_escaped};

pub use detect::detect_language;

/// Syntactic category of a highlighted run of code.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TokenClass {
    Keyword,
    String,
    Comment,
    Number,
    Tag,
    Attr,
    Selector,
    Property,
    Value,
    Plain,
}

impl TokenClass {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenClass::Keyword => "keyword",
            TokenClass::String => "string",
            TokenClass::Comment => "comment",
            TokenClass::Number => "number",
            TokenClass::Tag => "tag",
            TokenClass::Attr => "attr",
            TokenClass::Selector => "selector",
            TokenClass::Property => "property",
            TokenClass::Value => "value",
            TokenClass::Plain => "plain",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HighlightToken {
    pub text: String,
    pub class: TokenClass,
}

/// Languages with a dedicated tokenizer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Language {
    JavaScript,
    Css,
    Markup,
}

impl Language {
    /// Display label used when the language was detected rather than named.
    pub fn label(self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Css => "css",
            Language::Markup => "html",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Highlighted {
    pub html: String,
    pub label: String,
}

/// Highlights a code block body.
///
/// `hint` is the fence info token. Recognized hints pick a tokenizer
/// directly; an unknown hint disables highlighting but is kept as the label;
/// a missing hint falls back to [`detect_language`].
pub fn highlight_code(code: &str, hint: Option<&str>) -> Highlighted {
    let normalized = hint.map(|value| value.trim().to_lowercase()).unwrap_or_default();
    let (language, label) = match normalized.as_str() {
        "js" => (Some(Language::JavaScript), "javascript".to_string()),
        "javascript" | "ts" | "tsx" => (Some(Language::JavaScript), normalized.clone()),
        "css" => (Some(Language::Css), normalized.clone()),
        "html" | "xml" => (Some(Language::Markup), normalized.clone()),
        "" => match detect_language(code) {
            Some(language) => (Some(language), language.label().to_string()),
            None => (None, "plain".to_string()),
        },
        _ => (None, normalized.clone()),
    };

    let html = match language {
        Some(language) => render_tokens(&tokenize(code, language)),
        None => escape_html(code),
    };
    Highlighted { html, label }
}

/// Splits `code` into classified tokens. Concatenating the token texts
/// always yields `code` again.
pub fn tokenize(code: &str, language: Language) -> Vec<HighlightToken> {
    match language {
        Language::JavaScript => js::tokenize(code),
        Language::Css => css::tokenize(code),
        Language::Markup => markup::tokenize(code),
    }
}

pub fn render_tokens(tokens: &[HighlightToken]) -> String {
    let mut out = String::new();
    for token in tokens {
        if token.class == TokenClass::Plain {
            for ch in token.text.chars() {
                push_escaped(&mut out, ch);
            }
            continue;
        }
        out.push_str("<span class=\"token-");
        out.push_str(token.class.as_str());
        out.push_str("\">");
        for ch in token.text.chars() {
            push_escaped(&mut out, ch);
        }
        out.push_str("</span>");
    }
    out
}

/// Byte cursor shared by the tokenizers.
///
/// Every token boundary the tokenizers pick sits on an ASCII byte, so the
/// slices taken here always fall on character boundaries even when the
/// plain run in between skipped over multi-byte characters.
pub(crate) struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    pending: usize,
    tokens: Vec<HighlightToken>,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            pending: 0,
            tokens: Vec::new(),
        }
    }

    pub(crate) fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    pub(crate) fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes().get(self.pos + offset).copied()
    }

    pub(crate) fn starts_with(&self, needle: &str) -> bool {
        self.bytes()[self.pos..].starts_with(needle.as_bytes())
    }

    /// Position right after the next `needle` at or past `from`, or the end
    /// of input when it never appears.
    pub(crate) fn end_after(&self, from: usize, needle: &str) -> usize {
        let from = from.min(self.src.len());
        self.bytes()[from..]
            .windows(needle.len())
            .position(|window| window == needle.as_bytes())
            .map(|idx| from + idx + needle.len())
            .unwrap_or(self.src.len())
    }

    /// Advances over bytes that stay in the current plain run.
    pub(crate) fn skip(&mut self, count: usize) {
        self.pos = (self.pos + count).min(self.src.len());
    }

    /// Emits `[pos, end)` as one token of `class`.
    pub(crate) fn emit(&mut self, end: usize, class: TokenClass) {
        let end = end.min(self.src.len());
        self.flush_plain();
        let text = &self.src[self.pos..end];
        self.push(text, class);
        self.pos = end;
        self.pending = end;
    }

    pub(crate) fn finish(mut self) -> Vec<HighlightToken> {
        self.pos = self.src.len();
        self.flush_plain();
        self.tokens
    }

    fn flush_plain(&mut self) {
        if self.pending < self.pos {
            let text = &self.src[self.pending..self.pos];
            self.push(text, TokenClass::Plain);
        }
        self.pending = self.pos;
    }

    fn push(&mut self, text: &str, class: TokenClass) {
        if text.is_empty() {
            return;
        }
        if class == TokenClass::Plain {
            if let Some(last) = self.tokens.last_mut().filter(|last| last.class == class) {
                last.text.push_str(text);
                return;
            }
        }
        self.tokens.push(HighlightToken {
            text: text.to_string(),
            class,
        });
    }
}

/// End of a quoted literal opened at `start`, honoring backslash escapes.
pub(crate) fn quoted_end(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = *bytes.get(start)?;
    let mut idx = start + 1;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\\' => idx += 2,
            byte if byte == quote => return Some(idx + 1),
            _ => idx += 1,
        }
    }
    None
}

#[cfg(test)]
pub(crate) fn joined(tokens: &[HighlightToken]) -> String {
    tokens.iter().map(|token| token.text.as_str()).collect()
}

#[cfg(test)]
pub(crate) fn classes_of<'t>(tokens: &'t [HighlightToken], class: TokenClass) -> Vec<&'t str> {
    tokens
        .iter()
        .filter(|token| token.class == class)
        .map(|token| token.text.as_str())
        .collect()
}
