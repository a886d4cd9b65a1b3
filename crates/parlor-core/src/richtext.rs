//! Lightweight rich text for assistant replies
//!
//! Understands a small markdown-like subset: `### ` headings, numbered and
//! dashed lists, blank spacer lines, and `**bold**` spans. Anything else is
//! rendered as a plain paragraph. Malformed markers degrade to literal text.

use regex::Regex;
use std::sync::OnceLock;

/// A structural unit of a rendered reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading(String),
    OrderedList(Vec<String>),
    UnorderedList(Vec<String>),
    BlankSpacer,
    Paragraph(String),
}

/// An inline run of text within a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Plain(String),
    Strong(String),
}

fn ordered_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s*").expect("valid ordered list pattern"))
}

fn unordered_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-\s+").expect("valid unordered list pattern"))
}

fn heading_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^###\s+").expect("valid heading pattern"))
}

fn strong_span() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid bold pattern"))
}

fn is_ordered_item(line: &str) -> bool {
    ordered_marker().is_match(line.trim())
}

fn is_unordered_item(line: &str) -> bool {
    line.trim().starts_with("- ")
}

/// Split on `\n`, dropping the `\r` of a `\r\n` pair.
fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Parse a reply into blocks.
///
/// Lines are classified top to bottom. List blocks greedily consume every
/// following line that carries the same kind of marker.
pub fn parse(text: &str) -> Vec<Block> {
    let lines = split_lines(text);
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if trimmed.starts_with("### ") {
            let title = heading_marker().replace(trimmed, "");
            blocks.push(Block::Heading(title.into_owned()));
            i += 1;
            continue;
        }

        if is_ordered_item(line) {
            let mut items = Vec::new();
            while i < lines.len() && is_ordered_item(lines[i]) {
                items.push(ordered_marker().replace(lines[i].trim(), "").into_owned());
                i += 1;
            }
            blocks.push(Block::OrderedList(items));
            continue;
        }

        if is_unordered_item(line) {
            let mut items = Vec::new();
            while i < lines.len() && is_unordered_item(lines[i]) {
                items.push(unordered_marker().replace(lines[i].trim(), "").into_owned());
                i += 1;
            }
            blocks.push(Block::UnorderedList(items));
            continue;
        }

        if trimmed.is_empty() {
            blocks.push(Block::BlankSpacer);
        } else {
            blocks.push(Block::Paragraph(line.to_string()));
        }
        i += 1;
    }

    blocks
}

/// Split text into plain and `**strong**` runs.
///
/// A strong span needs a non-empty body with no `*` inside. Unpaired or empty
/// markers stay in the plain text.
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let mut runs = Vec::new();
    let mut last = 0;

    for caps in strong_span().captures_iter(text) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            runs.push(Inline::Plain(text[last..whole.start()].to_string()));
        }
        runs.push(Inline::Strong(body.as_str().to_string()));
        last = whole.end();
    }

    if last < text.len() {
        runs.push(Inline::Plain(text[last..].to_string()));
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_blocks_in_order() {
        let blocks = parse("### Title\n- a\n- b\n1. x\n1. y\n\npara");
        assert_eq!(
            blocks,
            vec![
                Block::Heading("Title".to_string()),
                Block::UnorderedList(vec!["a".to_string(), "b".to_string()]),
                Block::OrderedList(vec!["x".to_string(), "y".to_string()]),
                Block::BlankSpacer,
                Block::Paragraph("para".to_string()),
            ]
        );
    }

    #[test]
    fn test_crlf_lines() {
        let blocks = parse("first\r\n\r\n- item\r\n");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph("first".to_string()),
                Block::BlankSpacer,
                Block::UnorderedList(vec!["item".to_string()]),
                Block::BlankSpacer,
            ]
        );
    }

    #[test]
    fn test_indented_heading_and_items() {
        let blocks = parse("   ### Setup  \n  2. one\n 10.two");
        assert_eq!(
            blocks,
            vec![
                Block::Heading("Setup".to_string()),
                Block::OrderedList(vec!["one".to_string(), "two".to_string()]),
            ]
        );
    }

    #[test]
    fn test_list_stops_at_first_other_line() {
        let blocks = parse("- a\nnot a list\n- b");
        assert_eq!(
            blocks,
            vec![
                Block::UnorderedList(vec!["a".to_string()]),
                Block::Paragraph("not a list".to_string()),
                Block::UnorderedList(vec!["b".to_string()]),
            ]
        );
    }

    #[test]
    fn test_markers_without_space_are_paragraphs() {
        let blocks = parse("###Title\n-dash");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph("###Title".to_string()),
                Block::Paragraph("-dash".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_input_is_single_spacer() {
        assert_eq!(parse(""), vec![Block::BlankSpacer]);
    }

    #[test]
    fn test_parse_is_repeatable() {
        let text = "### A\n- b\n\n**c** d";
        assert_eq!(parse(text), parse(text));
    }

    #[test]
    fn test_bold_then_plain() {
        assert_eq!(
            parse_inline("**bold** and plain"),
            vec![
                Inline::Strong("bold".to_string()),
                Inline::Plain(" and plain".to_string()),
            ]
        );
    }

    #[test]
    fn test_unmatched_markers_stay_literal() {
        assert_eq!(parse_inline("a ** b"), vec![Inline::Plain("a ** b".to_string())]);
        assert_eq!(parse_inline("****"), vec![Inline::Plain("****".to_string())]);
        assert_eq!(
            parse_inline("x **open"),
            vec![Inline::Plain("x **open".to_string())]
        );
    }

    #[test]
    fn test_multiple_spans() {
        assert_eq!(
            parse_inline("a **b** c **d**"),
            vec![
                Inline::Plain("a ".to_string()),
                Inline::Strong("b".to_string()),
                Inline::Plain(" c ".to_string()),
                Inline::Strong("d".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_inline() {
        assert!(parse_inline("").is_empty());
    }
}
