//! Document tree produced by the parser.

use indexmap::IndexMap;

/// A parsed Asciidoc document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Document title (`= Title`), already converted to inline HTML.
    pub title: Option<String>,
    /// Header and body attribute entries, last assignment wins.
    pub attributes: IndexMap<String, String>,
    /// Top-level blocks: an optional preamble followed by sections and any
    /// blocks outside of sections.
    pub blocks: Vec<Block>,
    /// Every image reference, block or inline, in document order.
    pub images: Vec<ImageRef>,
}

impl Document {
    /// Value of a document attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Every listing in depth-first document order.
    pub fn listings(&self) -> Vec<&Listing> {
        let mut out = Vec::new();
        collect_listings(&self.blocks, &mut out);
        out
    }
}

fn collect_listings<'a>(blocks: &'a [Block], out: &mut Vec<&'a Listing>) {
    for block in blocks {
        match &block.kind {
            BlockKind::Listing(listing) => out.push(listing),
            BlockKind::List(list) => {
                for item in &list.items {
                    collect_listings(&item.blocks, out);
                }
            }
            kind => {
                if let Some(children) = kind.children() {
                    collect_listings(children, out);
                }
            }
        }
    }
}

/// An image referenced by the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Position in [`Document::images`]; rendered as `data-image-index`.
    pub index: usize,
    /// Target as written in the macro.
    pub target: String,
    /// Value of the `imagesdir` attribute when the image was encountered.
    pub images_dir: Option<String>,
    pub alt: String,
    pub width: Option<String>,
    pub height: Option<String>,
}

/// Metadata collected from attribute, anchor and title lines above a block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockMeta {
    pub id: Option<String>,
    /// Block title (`.Title`), converted to inline HTML.
    pub title: Option<String>,
    /// First positional attribute without its shorthands (`source`, `graph`).
    pub style: Option<String>,
    pub roles: Vec<String>,
    pub options: Vec<String>,
    /// Named attributes, and positional ones under their 1-based index.
    pub attributes: IndexMap<String, String>,
}

impl BlockMeta {
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A block with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub meta: BlockMeta,
    pub kind: BlockKind,
}

/// Block variants.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// Content between the header and the first section.
    Preamble(Vec<Block>),
    Section(Section),
    /// Paragraph text as inline HTML.
    Paragraph(String),
    Listing(Listing),
    /// Verbatim text of a literal block.
    Literal(String),
    List(List),
    Table(Table),
    /// Block image, by index into [`Document::images`].
    Image(usize),
    Sidebar(Vec<Block>),
    /// Speaker notes.
    Notes(Vec<Block>),
    Example(Vec<Block>),
    Open(Vec<Block>),
    Quote {
        blocks: Vec<Block>,
        attribution: Option<String>,
    },
    /// Passthrough content, emitted verbatim.
    Pass(String),
    /// HTML produced by a block processor.
    Raw(String),
    ThematicBreak,
}

impl BlockKind {
    /// Nested blocks of compound variants.
    pub fn children(&self) -> Option<&[Block]> {
        match self {
            Self::Preamble(blocks)
            | Self::Sidebar(blocks)
            | Self::Notes(blocks)
            | Self::Example(blocks)
            | Self::Open(blocks)
            | Self::Quote { blocks, .. } => Some(blocks),
            Self::Section(section) => Some(&section.blocks),
            _ => None,
        }
    }
}

/// A section: `==` is level 1, `===` level 2 and so on.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub level: usize,
    /// Title as inline HTML.
    pub title: String,
    /// Id used for the heading anchor.
    pub id: String,
    pub blocks: Vec<Block>,
}

/// A verbatim code listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Stable identifier, rendered as `data-code-id` on the `<code>` element.
    pub code_id: usize,
    /// Source text exactly as written.
    pub source: String,
    pub language: Option<String>,
    /// Source contains markup that must reach the output unescaped.
    pub keep_markup: bool,
    pub linenums: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    /// Item text as inline HTML.
    pub text: String,
    /// Nested lists.
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Header cells as inline HTML.
    pub header: Option<Vec<String>>,
    /// Body rows, each cell as inline HTML.
    pub rows: Vec<Vec<String>>,
}
