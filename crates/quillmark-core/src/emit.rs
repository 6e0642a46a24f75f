use crate::ast::{Block, BlockKind, CodeBlock, List, ListKind};
use crate::escape::escape_attr;
use crate::highlight::highlight_code;
use crate::inline::format_inline;

/// Emits the HTML fragment for a sequence of blocks.
///
/// Each block yields exactly one chunk; chunks are joined with `\n` in
/// block order.
pub fn emit_html(blocks: &[Block]) -> String {
    let mut writer = HtmlWriter::new();
    for block in blocks {
        emit_block(&mut writer, block);
    }
    writer.finish()
}

struct HtmlWriter {
    chunks: Vec<String>,
}

impl HtmlWriter {
    fn new() -> Self {
        Self { chunks: Vec::new() }
    }

    fn chunk(&mut self, html: String) {
        self.chunks.push(html);
    }

    fn finish(self) -> String {
        self.chunks.join("\n")
    }
}

fn emit_block(writer: &mut HtmlWriter, block: &Block) {
    tracing::trace!(
        kind = block.kind.name(),
        start = block.span.start,
        end = block.span.end,
        "emit block"
    );
    match &block.kind {
        BlockKind::Paragraph { lines } => {
            let body = lines
                .iter()
                .map(|line| format_inline(line))
                .collect::<Vec<_>>()
                .join("<br />");
            writer.chunk(format!("<p>{}</p>", body));
        }
        BlockKind::Heading { level, text } => {
            writer.chunk(format!("<h{}>{}</h{}>", level, format_inline(text), level));
        }
        BlockKind::BlockQuote { text } => {
            writer.chunk(format!(
                "<blockquote><p>{}</p></blockquote>",
                format_inline(text)
            ));
        }
        BlockKind::List(list) => writer.chunk(render_list(list)),
        BlockKind::CodeBlock(code) => writer.chunk(render_code_block(code)),
        BlockKind::ThematicBreak => writer.chunk("<hr />".to_string()),
        BlockKind::Image { alt, url } => {
            writer.chunk(format!(
                "<figure><img src=\"{}\" alt=\"{}\" loading=\"lazy\" /></figure>",
                escape_attr(url),
                escape_attr(alt)
            ));
        }
    }
}

fn render_list(list: &List) -> String {
    let (open, close) = match list.kind {
        ListKind::Bullet => ("<ul>", "</ul>"),
        ListKind::Ordered => ("<ol>", "</ol>"),
        ListKind::Checklist => ("<ul class=\"checklist\">", "</ul>"),
    };
    let mut out = String::from(open);
    for item in &list.items {
        let text = format_inline(&item.text);
        match item.task {
            Some(checked) => {
                let (state, checkbox) = if checked {
                    ("true", "<input type=\"checkbox\" disabled checked />")
                } else {
                    ("false", "<input type=\"checkbox\" disabled />")
                };
                out.push_str(&format!(
                    "<li data-checked=\"{}\">{}<span>{}</span></li>",
                    state, checkbox, text
                ));
            }
            None => {
                out.push_str("<li>");
                out.push_str(&text);
                out.push_str("</li>");
            }
        }
    }
    out.push_str(close);
    out
}

fn render_code_block(code: &CodeBlock) -> String {
    let highlighted = highlight_code(&code.text, code.lang.as_deref());
    let label = escape_attr(&highlighted.label);
    format!(
        "<div class=\"code-block\"><span class=\"code-lang\">{}</span><pre><code class=\"language-{}\">{}</code></pre></div>",
        label, label, highlighted.html
    )
}
