//! Markdown rendering helpers.
//!
//! Message content is always accepted as CommonMark. Providers that only take
//! plain text get [`to_plain_text`], providers that take rich content get
//! [`to_html`], and a missing title is derived with [`extract_title`].

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

fn markdown_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Strips markdown formatting, keeping line and paragraph breaks.
///
/// Headings and list items end with a newline, paragraphs and code blocks
/// with a blank line. Link targets, image URLs and raw HTML are dropped;
/// link text and image alt text are kept.
pub fn to_plain_text(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, markdown_options());
    let mut output = String::with_capacity(markdown.len());

    for event in parser {
        match event {
            Event::Text(text) | Event::Code(text) => output.push_str(&text),
            Event::SoftBreak | Event::HardBreak => output.push('\n'),
            Event::TaskListMarker(done) => output.push_str(if done { "[x] " } else { "[ ] " }),
            Event::Start(Tag::Item) => end_line(&mut output),
            Event::End(TagEnd::Heading(_))
            | Event::End(TagEnd::Item)
            | Event::End(TagEnd::TableHead)
            | Event::End(TagEnd::TableRow) => end_line(&mut output),
            Event::End(TagEnd::TableCell) => output.push('\t'),
            Event::End(TagEnd::Paragraph)
            | Event::End(TagEnd::CodeBlock)
            | Event::End(TagEnd::List(_))
            | Event::End(TagEnd::Table)
            | Event::Rule => end_block(&mut output),
            _ => {}
        }
    }

    output.trim().to_string()
}

/// Renders markdown to an HTML fragment.
pub fn to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, markdown_options());
    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

/// First line of the plain-text rendering of `markdown`.
pub fn extract_title(markdown: &str) -> String {
    to_plain_text(markdown)
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Everything after the first line of `plain`, or `None` when nothing remains.
pub fn strip_title(plain: &str) -> Option<&str> {
    plain
        .split_once('\n')
        .map(|(_, rest)| rest.trim())
        .filter(|rest| !rest.is_empty())
}

fn end_line(output: &mut String) {
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }
}

fn end_block(output: &mut String) {
    if output.is_empty() {
        return;
    }
    end_line(output);
    if !output.ends_with("\n\n") {
        output.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_heading_and_paragraph() {
        assert_eq!(to_plain_text("# Hello\nWorld"), "Hello\nWorld");
    }

    #[test]
    fn test_plain_text_keeps_paragraph_breaks() {
        assert_eq!(
            to_plain_text("first **bold** para\n\nsecond *para*"),
            "first bold para\n\nsecond para"
        );
    }

    #[test]
    fn test_plain_text_drops_link_targets() {
        assert_eq!(
            to_plain_text("see [the docs](https://example.com/docs)"),
            "see the docs"
        );
    }

    #[test]
    fn test_plain_text_list_items() {
        assert_eq!(to_plain_text("- one\n- two\n\nafter"), "one\ntwo\n\nafter");
    }

    #[test]
    fn test_plain_text_code() {
        assert_eq!(to_plain_text("run `cargo` now"), "run cargo now");
        assert_eq!(to_plain_text("```\nlet x = 1;\n```"), "let x = 1;");
    }

    #[test]
    fn test_plain_text_drops_raw_html() {
        assert_eq!(to_plain_text("a <b>b</b> c"), "a b c");
    }

    #[test]
    fn test_plain_text_empty() {
        assert_eq!(to_plain_text(""), "");
        assert_eq!(to_plain_text("   \n\n"), "");
    }

    #[test]
    fn test_html_rendering() {
        let html = to_html("# Title\n\n**bold** ~~gone~~");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn test_extract_title_first_line() {
        assert_eq!(extract_title("# Hello\nWorld"), "Hello");
        assert_eq!(extract_title("\n\n  **Deploy** finished\nmore"), "Deploy finished");
        assert_eq!(extract_title(""), "");
    }

    #[test]
    fn test_extract_title_matches_plain_first_line() {
        for content in ["# A\nB", "line one\nline two", "- item\n- next", "> quoted\n\ntext"] {
            let plain = to_plain_text(content);
            assert_eq!(extract_title(content), plain.lines().next().unwrap_or_default());
        }
    }

    #[test]
    fn test_strip_title() {
        assert_eq!(strip_title("Hello\nWorld"), Some("World"));
        assert_eq!(strip_title("Hello\n\nWorld\nAgain"), Some("World\nAgain"));
        assert_eq!(strip_title("Hello"), None);
        assert_eq!(strip_title("Hello\n  "), None);
    }
}
