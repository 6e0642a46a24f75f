use crate::escape::{escape_attr, escape_html};
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Colors accepted by `[color:NAME]...[/color]`, compared lowercase.
static COLOR_PALETTE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "red", "blue", "green", "orange", "purple", "pink", "teal", "gray", "#ff0000", "#0000ff",
        "#008000", "#ff7f00",
    ]
    .into_iter()
    .collect()
});

const COLOR_OPEN: &str = "[color:";
const COLOR_CLOSE: &str = "[/color]";

struct Emphasis {
    marker: char,
    width: usize,
    tag: &'static str,
}

// Applied in this order; each pass sees the output of the previous one.
const EMPHASIS_PASSES: [Emphasis; 4] = [
    Emphasis {
        marker: '*',
        width: 2,
        tag: "strong",
    },
    Emphasis {
        marker: '_',
        width: 2,
        tag: "u",
    },
    Emphasis {
        marker: '*',
        width: 1,
        tag: "em",
    },
    Emphasis {
        marker: '~',
        width: 2,
        tag: "del",
    },
];

/// Returns true when `name` is in the color-span palette (case-insensitive).
pub fn is_palette_color(name: &str) -> bool {
    COLOR_PALETTE.contains(name.to_ascii_lowercase().as_str())
}

/// Renders one line of inline markdown to HTML.
///
/// The text is escaped up front. Code spans and anchor tags are then moved
/// into a call-local arena and referenced from the working text as `<N>`.
/// Escaped text never contains a literal `<`, so a reference cannot be forged
/// by user content, and later passes cannot rewrite what was stashed.
pub fn format_inline(text: &str) -> String {
    let escaped = escape_html(text);
    let mut stash = Stash::default();

    let mut working = stash_code_spans(&escaped, &mut stash);
    working = convert_links(&working, &mut stash);
    for pass in &EMPHASIS_PASSES {
        working = apply_emphasis(&working, pass, &stash);
    }
    working = apply_color_spans(&working, &stash);

    stash.restore(&working)
}

#[derive(Default)]
struct Stash {
    fragments: Vec<String>,
}

impl Stash {
    fn push(&mut self, html: String) -> String {
        let key = format!("<{}>", self.fragments.len());
        self.fragments.push(html);
        key
    }

    fn opens_anchor(&self, index: usize) -> bool {
        self.fragments
            .get(index)
            .is_some_and(|fragment| fragment.starts_with("<a "))
    }

    fn restore(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find('<') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let digits = after.bytes().take_while(|b| b.is_ascii_digit()).count();
            if digits > 0 && after.as_bytes().get(digits) == Some(&b'>') {
                let fragment = after[..digits]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| self.fragments.get(index));
                if let Some(fragment) = fragment {
                    out.push_str(fragment);
                    rest = &after[digits + 1..];
                    continue;
                }
            }
            out.push('<');
            rest = after;
        }
        out.push_str(rest);
        out
    }
}

fn stash_code_spans(text: &str, stash: &mut Stash) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('`') {
        let after = &rest[open + 1..];
        match after.find('`') {
            // An empty pair is not a span; the second backtick may open one.
            Some(0) => {
                out.push_str(&rest[..=open]);
                rest = after;
            }
            Some(close) => {
                out.push_str(&rest[..open]);
                out.push_str(&stash.push(format!("<code>{}</code>", &after[..close])));
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

fn convert_links(text: &str, stash: &mut Stash) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        let candidate = &rest[open..];
        match match_link(candidate) {
            Some(link) => {
                out.push_str(&stash.push(format!(
                    "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">",
                    link.url.replace('`', "&#96;")
                )));
                out.push_str(link.label);
                out.push_str("</a>");
                rest = &candidate[link.consumed..];
            }
            None => {
                out.push('[');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

struct LinkMatch<'a> {
    label: &'a str,
    url: &'a str,
    consumed: usize,
}

fn match_link(text: &str) -> Option<LinkMatch<'_>> {
    let body = text.strip_prefix('[')?;
    let label_len = body.find(']')?;
    if label_len == 0 {
        return None;
    }
    let after = body[label_len..].strip_prefix("](")?;
    let url_len = after
        .find(|c: char| c.is_whitespace() || c == ')' || c == '<')
        .unwrap_or(after.len());
    let url = &after[..url_len];
    if !is_web_url(url) || !after[url_len..].starts_with(')') {
        return None;
    }
    Some(LinkMatch {
        label: &body[..label_len],
        url,
        consumed: 1 + label_len + 2 + url_len + 1,
    })
}

/// Only absolute `http(s)` URLs with something after the scheme qualify.
pub(crate) fn is_web_url(url: &str) -> bool {
    ["http://", "https://"]
        .iter()
        .any(|scheme| url.len() > scheme.len() && url.starts_with(scheme))
}

/// True when every tag opened in `fragment` is closed inside it and no tag
/// closes one opened outside. Stashed anchors count as open `a` tags.
fn is_balanced(fragment: &str, stash: &Stash) -> bool {
    let mut open: Vec<&str> = Vec::new();
    let mut rest = fragment;
    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('>') else {
            break;
        };
        let tag = &after[..end];
        if let Some(name) = tag.strip_prefix('/') {
            if open.pop() != Some(name) {
                return false;
            }
        } else if !tag.is_empty() && tag.bytes().all(|b| b.is_ascii_digit()) {
            if tag.parse::<usize>().is_ok_and(|index| stash.opens_anchor(index)) {
                open.push("a");
            }
        } else {
            open.push(tag.split(' ').next().unwrap_or(tag));
        }
        rest = &after[end + 1..];
    }
    open.is_empty()
}

fn apply_emphasis(text: &str, pass: &Emphasis, stash: &Stash) -> String {
    let delim = pass.marker.to_string().repeat(pass.width);
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(delim.as_str()) {
        out.push_str(&rest[..start]);
        let after = &rest[start + delim.len()..];
        let body_len = after.find(pass.marker).unwrap_or(after.len());
        let body = &after[..body_len];
        let closed = body_len > 0 && after[body_len..].starts_with(delim.as_str());
        if closed && is_balanced(body, stash) {
            out.push('<');
            out.push_str(pass.tag);
            out.push('>');
            out.push_str(body);
            out.push_str("</");
            out.push_str(pass.tag);
            out.push('>');
            rest = &after[body_len + delim.len()..];
        } else {
            out.push(pass.marker);
            rest = &rest[start + 1..];
        }
    }
    out.push_str(rest);
    out
}

fn apply_color_spans(text: &str, stash: &Stash) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(COLOR_OPEN) {
        out.push_str(&rest[..start]);
        let after = &rest[start + COLOR_OPEN.len()..];
        match match_color_span(after).filter(|(_, inner, _)| is_balanced(inner, stash)) {
            Some((name, inner, consumed)) => {
                if is_palette_color(name) {
                    out.push_str("<span style=\"color:");
                    out.push_str(&escape_attr(&name.to_ascii_lowercase()));
                    out.push_str("\">");
                    out.push_str(inner);
                    out.push_str("</span>");
                } else {
                    out.push_str(inner);
                }
                rest = &after[consumed..];
            }
            None => {
                out.push('[');
                rest = &rest[start + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn match_color_span(text: &str) -> Option<(&str, &str, usize)> {
    let name_len = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '#'))
        .unwrap_or(text.len());
    if name_len == 0 {
        return None;
    }
    let body = text[name_len..].strip_prefix(']')?;
    let inner_len = body.find(COLOR_CLOSE)?;
    let consumed = name_len + 1 + inner_len + COLOR_CLOSE.len();
    Some((&text[..name_len], &body[..inner_len], consumed))
}
