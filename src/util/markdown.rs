//! Plain-text extraction from product descriptions written in Markdown.

use comrak::{
    Arena,
    nodes::{AstNode, NodeValue},
    options::Options,
    parse_document,
};

/// Markup characters that survive parsing as literal text (unbalanced emphasis,
/// stray heading or quote markers) and are dropped from the plain rendition.
const STRAY_MARKUP: &[char] = &['*', '_', '~', '`', '#', '>'];

/// Reduce Markdown to a single line of plain text.
///
/// Images are removed entirely, links are replaced by their text, raw HTML
/// loses its tags but keeps its text, and all runs of whitespace collapse to
/// one space.
pub fn strip_markdown(markdown: &str) -> String {
    if markdown.trim().is_empty() {
        return String::new();
    }

    let arena = Arena::new();
    let root = parse_document(&arena, markdown, &plain_text_options());

    let mut buffer = String::with_capacity(markdown.len());
    collect_text(root, &mut buffer);

    let cleaned: String = buffer
        .chars()
        .filter(|ch| !STRAY_MARKUP.contains(ch))
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn plain_text_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options
}

fn collect_text<'a>(node: &'a AstNode<'a>, buffer: &mut String) {
    {
        let data = node.data.borrow();
        match &data.value {
            NodeValue::Image(_) | NodeValue::HtmlInline(_) => return,
            NodeValue::HtmlBlock(block) => {
                buffer.push(' ');
                push_html_text(&block.literal, buffer);
                buffer.push(' ');
                return;
            }
            NodeValue::Text(text) => buffer.push_str(text),
            NodeValue::Code(code) => buffer.push_str(&code.literal),
            NodeValue::CodeBlock(block) => {
                buffer.push(' ');
                buffer.push_str(&block.literal);
                buffer.push(' ');
            }
            NodeValue::LineBreak | NodeValue::SoftBreak => buffer.push(' '),
            NodeValue::Paragraph
            | NodeValue::Heading(_)
            | NodeValue::Item(_)
            | NodeValue::TableCell => buffer.push(' '),
            _ => {}
        }
    }

    let mut child = node.first_child();
    while let Some(next) = child {
        collect_text(next, buffer);
        child = next.next_sibling();
    }
}

/// Tags that only style a run of text; removing them must not split words.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "code", "em", "i", "kbd", "mark", "s", "small", "span", "strong", "sub",
    "sup", "u",
];

/// Append the text of a raw HTML fragment, dropping its tags. Block-level
/// tags become word breaks; inline tags vanish.
fn push_html_text(html: &str, buffer: &mut String) {
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        buffer.push_str(&rest[..start]);
        let Some(len) = rest[start..].find('>') else {
            rest = &rest[start..];
            break;
        };
        let tag = &rest[start + 1..start + len];
        if !is_inline_tag(tag) {
            buffer.push(' ');
        }
        rest = &rest[start + len + 1..];
    }
    buffer.push_str(rest);
}

fn is_inline_tag(tag: &str) -> bool {
    let name: String = tag
        .trim_start_matches('/')
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    INLINE_TAGS.contains(&name.as_str())
}
