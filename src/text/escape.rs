/// Characters Telegram's MarkdownV2 parser treats as markup.
const MARKDOWN_V2_RESERVED: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    '\\',
];

/// Backslash-escapes every MarkdownV2 reserved character in `text`.
///
/// Telegram rejects the whole message when an unescaped reserved character
/// appears outside an entity, so untrusted text must go through this first.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 4);
    for ch in text.chars() {
        if MARKDOWN_V2_RESERVED.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_reserved() {
        assert_eq!(escape_markdown_v2("v1.2-beta!"), r"v1\.2\-beta\!");
        assert_eq!(escape_markdown_v2("a_b*c"), r"a\_b\*c");
        assert_eq!(escape_markdown_v2(r"C:\tmp"), r"C:\\tmp");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(escape_markdown_v2("hello world"), "hello world");
        assert_eq!(escape_markdown_v2(""), "");
    }
}
