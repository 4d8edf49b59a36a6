use std::sync::LazyLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Passive HTML rendering: markup → visible text blocks
// ---------------------------------------------------------------------------

/// One block of visible document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading(String),
    Text(String),
}

/// Script, style and comment bodies never contribute visible text. An
/// unterminated element hides everything up to the end of the input.
static HIDDEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?is)<script\b.*?(?:</script\s*>|\z)",
        r"|<style\b.*?(?:</style\s*>|\z)",
        r"|<!--.*?(?:-->|\z)",
        r"|<head\b.*?(?:</head\s*>|\z)",
    ))
    .expect("static regex")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<(/?)([A-Za-z][A-Za-z0-9]*)[^>]*>").expect("static regex"));

/// Tags that end the current block when opened or closed.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "footer",
    "form", "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "td",
    "th", "tr", "ul", "button", "label", "title",
];

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Extract the visible text of an HTML document as headings and paragraphs.
///
/// Nothing is executed: scripts and styles are dropped, tags are stripped and
/// the common character entities decoded.
pub fn visible_blocks(html: &str) -> Vec<Block> {
    let cleaned = HIDDEN.replace_all(html, " ");

    let mut blocks = Vec::new();
    let mut current = String::new();
    let mut in_heading = false;
    let mut last = 0;

    for caps in TAG.captures_iter(&cleaned) {
        let Some(whole) = caps.get(0) else { continue };
        current.push_str(&cleaned[last..whole.start()]);
        last = whole.end();

        let closing = !caps[1].is_empty();
        let name = caps[2].to_ascii_lowercase();

        if HEADING_TAGS.contains(&name.as_str()) {
            flush(&mut blocks, &mut current, in_heading);
            in_heading = !closing;
        } else if BLOCK_TAGS.contains(&name.as_str()) {
            flush(&mut blocks, &mut current, in_heading);
        }
    }
    current.push_str(&cleaned[last..]);
    flush(&mut blocks, &mut current, in_heading);

    blocks
}

fn flush(blocks: &mut Vec<Block>, buffer: &mut String, heading: bool) {
    let text = collapse_whitespace(&decode_entities(buffer));
    buffer.clear();
    if text.is_empty() {
        return;
    }
    blocks.push(if heading {
        Block::Heading(text)
    } else {
        Block::Text(text)
    });
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
