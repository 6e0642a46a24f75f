use crate::ast::{Block, BlockKind, CodeBlock, List, ListItem, ListKind};
use crate::inline::is_web_url;
use crate::span::Span;

const FENCE: &str = "```";

/// Classification of a single source line outside a code block.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineKind<'a> {
    Fence { lang: Option<&'a str> },
    Blank,
    Rule,
    Image { alt: &'a str, url: &'a str },
    Heading { level: u8, text: &'a str },
    Quote { text: &'a str },
    ChecklistItem { checked: bool, text: &'a str },
    BulletItem { text: &'a str },
    OrderedItem { text: &'a str },
    Text,
}

impl LineKind<'_> {
    fn list_kind(&self) -> Option<ListKind> {
        match self {
            LineKind::ChecklistItem { .. } => Some(ListKind::Checklist),
            LineKind::BulletItem { .. } => Some(ListKind::Bullet),
            LineKind::OrderedItem { .. } => Some(ListKind::Ordered),
            _ => None,
        }
    }
}

type LineRule = for<'a> fn(&'a str) -> Option<LineKind<'a>>;

// First match wins. Checklist items must precede bullet items, which would
// otherwise accept `- [ ] text` as a bullet whose text starts with `[ ]`.
const LINE_RULES: [LineRule; 9] = [
    fence_open,
    blank,
    rule,
    image,
    heading,
    quote,
    checklist_item,
    bullet_item,
    ordered_item,
];

/// Splits a document into blocks.
///
/// `\r\n` is normalized to `\n` first. The parser is total: any line that
/// fits no other construct becomes paragraph text.
pub fn parse(source: &str) -> Vec<Block> {
    let normalized = source.replace("\r\n", "\n");
    let lines: Vec<&str> = normalized.split('\n').collect();
    let mut blocks = Vec::new();
    let mut paragraph = ParagraphBuffer::default();

    let mut idx = 0;
    while idx < lines.len() {
        let line = lines[idx];
        let kind = classify(line);
        if kind != LineKind::Text {
            paragraph.flush_into(&mut blocks);
        }

        match kind {
            LineKind::Blank => {}
            LineKind::Text => paragraph.push(idx, line),
            LineKind::Fence { lang } => {
                let (block, next) = parse_code_block(&lines, idx, lang);
                blocks.push(block);
                idx = next;
                continue;
            }
            LineKind::Rule => blocks.push(Block {
                span: Span::line(idx),
                kind: BlockKind::ThematicBreak,
            }),
            LineKind::Image { alt, url } => blocks.push(Block {
                span: Span::line(idx),
                kind: BlockKind::Image {
                    alt: alt.to_string(),
                    url: url.to_string(),
                },
            }),
            LineKind::Heading { level, text } => blocks.push(Block {
                span: Span::line(idx),
                kind: BlockKind::Heading {
                    level,
                    text: text.to_string(),
                },
            }),
            LineKind::Quote { text } => blocks.push(Block {
                span: Span::line(idx),
                kind: BlockKind::BlockQuote {
                    text: text.to_string(),
                },
            }),
            LineKind::ChecklistItem { .. }
            | LineKind::BulletItem { .. }
            | LineKind::OrderedItem { .. } => {
                let (block, next) = parse_list(&lines, idx);
                blocks.push(block);
                idx = next;
                continue;
            }
        }
        idx += 1;
    }
    paragraph.flush_into(&mut blocks);

    blocks
}

/// Classifies one line by the first matching rule in [`LINE_RULES`].
pub fn classify(line: &str) -> LineKind<'_> {
    LINE_RULES
        .iter()
        .find_map(|rule| rule(line))
        .unwrap_or(LineKind::Text)
}

#[derive(Default)]
struct ParagraphBuffer {
    start: usize,
    lines: Vec<String>,
}

impl ParagraphBuffer {
    fn push(&mut self, idx: usize, line: &str) {
        if self.lines.is_empty() {
            self.start = idx;
        }
        self.lines.push(line.to_string());
    }

    fn flush_into(&mut self, blocks: &mut Vec<Block>) {
        if self.lines.is_empty() {
            return;
        }
        let lines = std::mem::take(&mut self.lines);
        blocks.push(Block {
            span: Span {
                start: self.start,
                end: self.start + lines.len(),
            },
            kind: BlockKind::Paragraph { lines },
        });
    }
}

fn parse_code_block(lines: &[&str], open: usize, lang: Option<&str>) -> (Block, usize) {
    let mut body = Vec::new();
    let mut idx = open + 1;
    let mut closed = false;
    while idx < lines.len() {
        let line = lines[idx];
        idx += 1;
        if line.trim() == FENCE {
            closed = true;
            break;
        }
        body.push(line);
    }
    if !closed {
        tracing::debug!(line = open + 1, "code fence left open at end of input");
    }

    let block = Block {
        span: Span {
            start: open,
            end: idx,
        },
        kind: BlockKind::CodeBlock(CodeBlock {
            lang: lang.map(str::to_string),
            text: body.join("\n"),
            closed,
        }),
    };
    (block, idx)
}

/// Collects the run of consecutive items of the same kind starting at
/// `start`.
fn parse_list(lines: &[&str], start: usize) -> (Block, usize) {
    let first = classify(lines[start]);
    let kind = first.list_kind().unwrap_or(ListKind::Bullet);
    let mut items = Vec::new();
    let mut idx = start;
    while idx < lines.len() {
        let item = match classify(lines[idx]) {
            LineKind::ChecklistItem { checked, text } if kind == ListKind::Checklist => ListItem {
                text: text.to_string(),
                task: Some(checked),
            },
            LineKind::BulletItem { text } if kind == ListKind::Bullet => ListItem {
                text: text.to_string(),
                task: None,
            },
            LineKind::OrderedItem { text } if kind == ListKind::Ordered => ListItem {
                text: text.to_string(),
                task: None,
            },
            _ => break,
        };
        items.push(item);
        idx += 1;
    }

    let block = Block {
        span: Span { start, end: idx },
        kind: BlockKind::List(List { kind, items }),
    };
    (block, idx)
}

fn fence_open(line: &str) -> Option<LineKind<'_>> {
    let info = line.strip_prefix(FENCE)?;
    Some(LineKind::Fence {
        lang: info.split_whitespace().next(),
    })
}

fn blank(line: &str) -> Option<LineKind<'_>> {
    line.trim().is_empty().then_some(LineKind::Blank)
}

fn rule(line: &str) -> Option<LineKind<'_>> {
    let trimmed = line.trim();
    let marker = trimmed.chars().next()?;
    let is_rule = matches!(marker, '-' | '*' | '_')
        && trimmed.len() >= 3
        && trimmed.chars().all(|ch| ch == marker);
    is_rule.then_some(LineKind::Rule)
}

fn image(line: &str) -> Option<LineKind<'_>> {
    let body = line.strip_prefix("![")?;
    let alt_len = body.find(']')?;
    let url = body[alt_len..].strip_prefix("](")?.strip_suffix(')')?;
    if url.contains(|c: char| c.is_whitespace() || c == ')') || !is_web_url(url) {
        return None;
    }
    Some(LineKind::Image {
        alt: &body[..alt_len],
        url,
    })
}

fn heading(line: &str) -> Option<LineKind<'_>> {
    let level = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let text = item_text(&line[level..])?;
    Some(LineKind::Heading {
        level: level as u8,
        text,
    })
}

fn quote(line: &str) -> Option<LineKind<'_>> {
    let rest = line.strip_prefix('>')?;
    let mut chars = rest.chars();
    let text = match chars.next() {
        Some(ch) if ch.is_whitespace() => chars.as_str(),
        _ => rest,
    };
    Some(LineKind::Quote { text })
}

fn checklist_item(line: &str) -> Option<LineKind<'_>> {
    let rest = after_gap(strip_bullet_marker(line)?)?;
    let rest = rest.strip_prefix('[')?;
    let mut chars = rest.chars();
    let checked = match chars.next()? {
        ' ' => false,
        'x' | 'X' => true,
        _ => return None,
    };
    let text = item_text(chars.as_str().strip_prefix(']')?)?;
    Some(LineKind::ChecklistItem { checked, text })
}

fn bullet_item(line: &str) -> Option<LineKind<'_>> {
    let text = item_text(strip_bullet_marker(line)?)?;
    Some(LineKind::BulletItem { text })
}

fn ordered_item(line: &str) -> Option<LineKind<'_>> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let text = item_text(line[digits..].strip_prefix('.')?)?;
    Some(LineKind::OrderedItem { text })
}

fn strip_bullet_marker(line: &str) -> Option<&str> {
    line.strip_prefix('-').or_else(|| line.strip_prefix('*'))
}

/// Requires at least one whitespace character and skips the whole run.
fn after_gap(rest: &str) -> Option<&str> {
    rest.starts_with(char::is_whitespace)
        .then(|| rest.trim_start())
}

/// Gap followed by non-empty item text.
fn item_text(rest: &str) -> Option<&str> {
    after_gap(rest).filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<&'static str> {
        parse(source).iter().map(|block| block.kind.name()).collect()
    }

    #[test]
    fn classifies_each_construct() {
        assert_eq!(classify("```js"), LineKind::Fence { lang: Some("js") });
        assert_eq!(classify("```"), LineKind::Fence { lang: None });
        assert_eq!(classify("   "), LineKind::Blank);
        assert_eq!(classify("***"), LineKind::Rule);
        assert_eq!(classify("  ___  "), LineKind::Rule);
        assert_eq!(
            classify("![cat](https://x.io/c.png)"),
            LineKind::Image {
                alt: "cat",
                url: "https://x.io/c.png"
            }
        );
        assert_eq!(
            classify("### Title"),
            LineKind::Heading {
                level: 3,
                text: "Title"
            }
        );
        assert_eq!(classify("> quoted"), LineKind::Quote { text: "quoted" });
        assert_eq!(
            classify("- [x] done"),
            LineKind::ChecklistItem {
                checked: true,
                text: "done"
            }
        );
        assert_eq!(classify("* item"), LineKind::BulletItem { text: "item" });
        assert_eq!(classify("12. item"), LineKind::OrderedItem { text: "item" });
        assert_eq!(classify("plain words"), LineKind::Text);
    }

    #[test]
    fn checklist_precedes_bullet() {
        assert_eq!(
            classify("- [ ] todo"),
            LineKind::ChecklistItem {
                checked: false,
                text: "todo"
            }
        );
        assert_eq!(
            classify("* [X] Done"),
            LineKind::ChecklistItem {
                checked: true,
                text: "Done"
            }
        );
        assert_eq!(classify("- [y] no"), LineKind::BulletItem { text: "[y] no" });
    }

    #[test]
    fn near_misses_fall_back_to_text() {
        assert_eq!(classify("####### seven"), LineKind::Text);
        assert_eq!(classify("#hashtag"), LineKind::Text);
        assert_eq!(classify("-item"), LineKind::Text);
        assert_eq!(classify("- "), LineKind::Text);
        assert_eq!(classify("1.item"), LineKind::Text);
        assert_eq!(classify("--"), LineKind::Text);
        assert_eq!(classify("-*-"), LineKind::Text);
        assert_eq!(classify("![x](ftp://x.io/a.png)"), LineKind::Text);
        assert_eq!(classify("![x](https://x.io/a b.png)"), LineKind::Text);
    }

    #[test]
    fn quote_keeps_text_after_single_space() {
        assert_eq!(classify(">  two"), LineKind::Quote { text: " two" });
        assert_eq!(classify(">"), LineKind::Quote { text: "" });
        assert_eq!(classify(">tight"), LineKind::Quote { text: "tight" });
    }

    #[test]
    fn paragraph_lines_accumulate_until_blank() {
        let blocks = parse("one\ntwo\n\nthree");
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[0].kind,
            BlockKind::Paragraph {
                lines: vec!["one".to_string(), "two".to_string()]
            }
        );
        assert_eq!(blocks[0].span, Span { start: 0, end: 2 });
        assert_eq!(blocks[1].span, Span { start: 3, end: 4 });
    }

    #[test]
    fn block_start_flushes_paragraph() {
        assert_eq!(
            kinds("intro\n# Title\nbody\n---\nmore"),
            vec!["paragraph", "heading", "paragraph", "thematic_break", "paragraph"]
        );
    }

    #[test]
    fn consecutive_items_form_one_list() {
        let blocks = parse("- a\n- b\n* c\n\n- d");
        assert_eq!(blocks.len(), 2);
        match &blocks[0].kind {
            BlockKind::List(list) => {
                assert_eq!(list.kind, ListKind::Bullet);
                assert_eq!(list.items.len(), 3);
            }
            other => panic!("expected list, got {other:?}"),
        }
        assert_eq!(blocks[0].span, Span { start: 0, end: 3 });
    }

    #[test]
    fn list_kinds_do_not_merge() {
        assert_eq!(
            kinds("- a\n1. b\n- [ ] c\n- d"),
            vec!["bullet_list", "ordered_list", "checklist", "bullet_list"]
        );
    }

    #[test]
    fn bullet_run_stops_at_checklist_item() {
        assert_eq!(kinds("- a\n- [ ] b"), vec!["bullet_list", "checklist"]);
        assert_eq!(kinds("- [x] a\n- b"), vec!["checklist", "bullet_list"]);
    }

    #[test]
    fn list_ends_at_paragraph_text() {
        let blocks = parse("1. a\n2. b\ntrailing");
        assert_eq!(kinds("1. a\n2. b\ntrailing"), vec!["ordered_list", "paragraph"]);
        assert_eq!(blocks[1].span, Span { start: 2, end: 3 });
    }

    #[test]
    fn code_fence_collects_raw_lines() {
        let blocks = parse("text\n```js\nconst a = 1;\n\n# not a heading\n```\nafter");
        assert_eq!(kinds("text\n```js\nx\n```\nafter"), vec!["paragraph", "code_block", "paragraph"]);
        match &blocks[1].kind {
            BlockKind::CodeBlock(code) => {
                assert_eq!(code.lang.as_deref(), Some("js"));
                assert_eq!(code.text, "const a = 1;\n\n# not a heading");
                assert!(code.closed);
            }
            other => panic!("expected code block, got {other:?}"),
        }
        assert_eq!(blocks[1].span, Span { start: 1, end: 6 });
    }

    #[test]
    fn fence_with_info_inside_code_is_content() {
        let blocks = parse("```\n```js\n```");
        match &blocks[0].kind {
            BlockKind::CodeBlock(code) => {
                assert_eq!(code.text, "```js");
                assert!(code.closed);
            }
            other => panic!("expected code block, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_fence_keeps_body() {
        let blocks = parse("```python\nprint(1)\n");
        assert_eq!(blocks.len(), 1);
        match &blocks[0].kind {
            BlockKind::CodeBlock(code) => {
                assert_eq!(code.lang.as_deref(), Some("python"));
                assert_eq!(code.text, "print(1)\n");
                assert!(!code.closed);
            }
            other => panic!("expected code block, got {other:?}"),
        }
    }

    #[test]
    fn crlf_is_normalized() {
        let blocks = parse("a\r\nb\r\n\r\n- c\r\n");
        assert_eq!(
            blocks[0].kind,
            BlockKind::Paragraph {
                lines: vec!["a".to_string(), "b".to_string()]
            }
        );
        assert_eq!(blocks[1].kind.name(), "bullet_list");
    }

    #[test]
    fn empty_document_has_no_blocks() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n  \n").is_empty());
    }
}
