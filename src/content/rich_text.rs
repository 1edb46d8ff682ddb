//! Structured rich text as delivered by the CMS
//!
//! A rich-text field is a list of typed blocks (paragraphs, headings, list
//! items, images...). Each block carries its plain text plus inline spans
//! (`strong`, `em`, `hyperlink`, `label`) addressed by UTF-16 code-unit
//! offsets, the way the CMS counts them.

use serde::{Deserialize, Serialize};

use crate::helpers::html_escape;

/// A rich-text field
pub type RichText = Vec<RichTextBlock>;

/// One block of a rich-text field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextBlock {
    #[serde(rename = "type")]
    pub kind: BlockKind,

    #[serde(default, deserialize_with = "crate::content::post::null_as_empty")]
    pub text: String,

    #[serde(default)]
    pub spans: Vec<Span>,

    /// Image source, only for `image` blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Image alternative text, only for `image` blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,

    /// Embedded media, only for `embed` blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oembed: Option<Embed>,
}

impl RichTextBlock {
    /// A plain paragraph without inline formatting
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, text)
    }

    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            spans: Vec::new(),
            url: None,
            alt: None,
            oembed: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.spans.push(span);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    Preformatted,
    ListItem,
    OListItem,
    Image,
    Embed,
    #[serde(other)]
    Unknown,
}

impl BlockKind {
    /// Element wrapping a text block, `None` for non-text blocks
    fn tag(self) -> Option<&'static str> {
        match self {
            BlockKind::Paragraph => Some("p"),
            BlockKind::Heading1 => Some("h1"),
            BlockKind::Heading2 => Some("h2"),
            BlockKind::Heading3 => Some("h3"),
            BlockKind::Heading4 => Some("h4"),
            BlockKind::Heading5 => Some("h5"),
            BlockKind::Heading6 => Some("h6"),
            BlockKind::Preformatted => Some("pre"),
            BlockKind::ListItem | BlockKind::OListItem => Some("li"),
            BlockKind::Image | BlockKind::Embed | BlockKind::Unknown => None,
        }
    }

    /// List container for list items
    fn list_tag(self) -> Option<&'static str> {
        match self {
            BlockKind::ListItem => Some("ul"),
            BlockKind::OListItem => Some("ol"),
            _ => None,
        }
    }
}

/// Inline formatting over `[start, end)` of the block text, in UTF-16 units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,

    #[serde(rename = "type")]
    pub kind: SpanKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SpanData>,
}

impl Span {
    pub fn new(kind: SpanKind, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            kind,
            data: None,
        }
    }

    pub fn link(start: usize, end: usize, url: impl Into<String>) -> Self {
        Self {
            start,
            end,
            kind: SpanKind::Hyperlink,
            data: Some(SpanData {
                url: Some(url.into()),
                ..SpanData::default()
            }),
        }
    }

    fn open_tag(&self) -> String {
        match self.kind {
            SpanKind::Strong => "<strong>".to_string(),
            SpanKind::Em => "<em>".to_string(),
            SpanKind::Label => {
                let label = self
                    .data
                    .as_ref()
                    .and_then(|d| d.label.as_deref())
                    .unwrap_or("");
                format!(r#"<span class="{}">"#, html_escape(label))
            }
            SpanKind::Hyperlink => {
                let data = self.data.clone().unwrap_or_default();
                let href = data.url.unwrap_or_default();
                match data.target {
                    Some(target) => format!(
                        r#"<a href="{}" target="{}" rel="noopener">"#,
                        html_escape(&href),
                        html_escape(&target)
                    ),
                    None => format!(r#"<a href="{}">"#, html_escape(&href)),
                }
            }
            SpanKind::Unknown => String::new(),
        }
    }

    fn close_tag(&self) -> &'static str {
        match self.kind {
            SpanKind::Strong => "</strong>",
            SpanKind::Em => "</em>",
            SpanKind::Label => "</span>",
            SpanKind::Hyperlink => "</a>",
            SpanKind::Unknown => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpanKind {
    Strong,
    Em,
    Hyperlink,
    Label,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default)]
    pub embed_url: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
}

/// Plain text of a rich-text field, blocks joined with a single space
pub fn as_text(blocks: &[RichTextBlock]) -> String {
    blocks
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// HTML markup of a rich-text field
///
/// Consecutive list items are grouped into one `<ul>`/`<ol>`. Block order
/// and span order are preserved; text is escaped and newlines become `<br />`.
pub fn as_html(blocks: &[RichTextBlock]) -> String {
    let mut html = String::new();
    let mut open_list: Option<&'static str> = None;

    for block in blocks {
        let list = block.kind.list_tag();
        if open_list != list {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list {
                html.push_str(&format!("<{}>", tag));
            }
            open_list = list;
        }

        match block.kind {
            BlockKind::Image => html.push_str(&image_html(block)),
            BlockKind::Embed => html.push_str(&embed_html(block)),
            BlockKind::Unknown => {
                tracing::debug!("Skipping unknown rich text block");
            }
            kind => {
                if let Some(tag) = kind.tag() {
                    html.push_str(&format!(
                        "<{}>{}</{}>",
                        tag,
                        inline_html(&block.text, &block.spans),
                        tag
                    ));
                }
            }
        }
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{}>", tag));
    }

    html
}

fn image_html(block: &RichTextBlock) -> String {
    let src = block.url.as_deref().unwrap_or("");
    let alt = block.alt.as_deref().unwrap_or("");
    format!(
        r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
        html_escape(src),
        html_escape(alt)
    )
}

fn embed_html(block: &RichTextBlock) -> String {
    let Some(embed) = &block.oembed else {
        return String::new();
    };
    let provider = embed
        .provider_name
        .as_deref()
        .map(|p| format!(r#" data-oembed-provider="{}""#, html_escape(&p.to_lowercase())))
        .unwrap_or_default();
    format!(
        r#"<div data-oembed="{}" data-oembed-type="{}"{}>{}</div>"#,
        html_escape(&embed.embed_url),
        html_escape(&embed.kind),
        provider,
        embed.html.as_deref().unwrap_or("")
    )
}

/// Apply inline spans to a block's text
///
/// Spans may overlap without nesting; a span cut by the end of an inner one
/// is closed and reopened so the output stays well formed.
fn inline_html(text: &str, spans: &[Span]) -> String {
    let len = text.len();

    // Outer spans first: earlier start, then longer extent.
    let mut ordered: Vec<(usize, usize, &Span)> = spans
        .iter()
        .map(|s| (byte_offset(text, s.start), byte_offset(text, s.end), s))
        .filter(|(start, end, _)| start < end)
        .collect();
    ordered.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut bounds: Vec<usize> = vec![0, len];
    for (start, end, _) in &ordered {
        bounds.push(*start);
        bounds.push(*end);
    }
    bounds.sort_unstable();
    bounds.dedup();

    let mut html = String::new();
    let mut stack: Vec<usize> = Vec::new();

    for window in bounds.windows(2) {
        let (from, to) = (window[0], window[1]);
        let active = |i: usize| ordered[i].0 <= from && ordered[i].1 >= to;

        if let Some(pos) = stack.iter().position(|&i| !active(i)) {
            let closed: Vec<usize> = stack.drain(pos..).collect();
            for &i in closed.iter().rev() {
                html.push_str(ordered[i].2.close_tag());
            }
            for i in closed {
                if active(i) {
                    html.push_str(&ordered[i].2.open_tag());
                    stack.push(i);
                }
            }
        }

        for i in 0..ordered.len() {
            if active(i) && !stack.contains(&i) {
                html.push_str(&ordered[i].2.open_tag());
                stack.push(i);
            }
        }

        html.push_str(&html_escape(&text[from..to]).replace('\n', "<br />"));
    }

    for &i in stack.iter().rev() {
        html.push_str(ordered[i].2.close_tag());
    }

    html
}

/// Byte offset of a UTF-16 code-unit offset into `text`
///
/// Offsets past the end are clamped; an offset inside a surrogate pair falls
/// back to the start of that character.
fn byte_offset(text: &str, units: usize) -> usize {
    let mut seen = 0;
    for (byte, ch) in text.char_indices() {
        seen += ch.len_utf16();
        if seen > units {
            return byte;
        }
    }
    text.len()
}
