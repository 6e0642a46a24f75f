use crate::span::Span;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Block {
    /// Source lines the block was built from, fences included.
    pub span: Span,
    pub kind: BlockKind,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BlockKind {
    /// Raw lines; rendered with a line break between each.
    Paragraph {
        lines: Vec<String>,
    },
    Heading {
        level: u8,
        text: String,
    },
    BlockQuote {
        text: String,
    },
    List(List),
    CodeBlock(CodeBlock),
    ThematicBreak,
    Image {
        alt: String,
        url: String,
    },
}

impl BlockKind {
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Paragraph { .. } => "paragraph",
            BlockKind::Heading { .. } => "heading",
            BlockKind::BlockQuote { .. } => "blockquote",
            BlockKind::List(list) => match list.kind {
                ListKind::Bullet => "bullet_list",
                ListKind::Ordered => "ordered_list",
                ListKind::Checklist => "checklist",
            },
            BlockKind::CodeBlock(_) => "code_block",
            BlockKind::ThematicBreak => "thematic_break",
            BlockKind::Image { .. } => "image",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ListKind {
    Bullet,
    Ordered,
    Checklist,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct List {
    pub kind: ListKind,
    pub items: Vec<ListItem>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListItem {
    pub text: String,
    /// Checkbox state; only set for checklist items.
    pub task: Option<bool>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CodeBlock {
    /// First token of the fence info string, as written.
    pub lang: Option<String>,
    pub text: String,
    /// False when input ended before a closing fence.
    pub closed: bool,
}
