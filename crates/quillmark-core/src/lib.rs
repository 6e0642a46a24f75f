mod ast;
mod emit;
mod escape;
mod highlight;
mod inline;
mod parser;
mod span;

pub use ast::{Block, BlockKind, CodeBlock, List, ListItem, ListKind};
pub use emit::emit_html;
pub use escape::{escape_attr, escape_html};
pub use highlight::{
    HighlightToken, Highlighted, Language, TokenClass, detect_language, highlight_code, render_tokens,
    tokenize,
};
pub use inline::{format_inline, is_palette_color};
pub use parser::{LineKind, classify, parse};
pub use span::Span;

/// Renders a markdown document to an HTML fragment.
///
/// Never fails: any input produces some output, and all user text is
/// escaped before it reaches the fragment.
pub fn render(markdown: &str) -> String {
    let blocks = parse(markdown);
    tracing::debug!(blocks = blocks.len(), "parsed markdown");
    emit_html(&blocks)
}
