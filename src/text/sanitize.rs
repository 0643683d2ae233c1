//! Removes URLs, e-mail addresses and IPv4 addresses from message text.
//!
//! Some providers (notably QQ relays) drop or penalize messages containing
//! links. The stripper is applied until nothing matches, so running it on its
//! own output is a no-op.

use regex::Regex;
use std::sync::LazyLock;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:https?|ftp|wss?)://\S+|\bwww\.\S+").expect("valid URL pattern")
});

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}")
        .expect("valid e-mail pattern")
});

static IPV4_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}(?::\d{1,5})?\b").expect("valid IPv4 pattern")
});

static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("valid whitespace pattern"));

/// Strips URLs, e-mail addresses and IPv4 addresses from `text`.
pub fn sanitize(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = strip_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current.trim().to_string()
}

fn strip_once(text: &str) -> String {
    let text = URL_PATTERN.replace_all(text, "");
    let text = EMAIL_PATTERN.replace_all(&text, "");
    let text = IPV4_PATTERN.replace_all(&text, "");
    BLANK_RUN.replace_all(&text, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_removes_urls() {
        assert_eq!(
            sanitize("build ok, see https://ci.example.com/run/42 for logs"),
            "build ok, see for logs"
        );
        assert_eq!(sanitize("mirror at www.example.org today"), "mirror at today");
    }

    #[test]
    fn test_removes_emails() {
        assert_eq!(sanitize("mail ops@example.com now"), "mail now");
    }

    #[test]
    fn test_removes_ipv4_with_port() {
        assert_eq!(sanitize("host 192.168.1.20:8080 is down"), "host is down");
        assert_eq!(sanitize("dns 8.8.8.8"), "dns");
    }

    #[test]
    fn test_keeps_plain_text() {
        assert_eq!(sanitize("version 1.2 released"), "version 1.2 released");
        assert_eq!(sanitize("line one\nline two"), "line one\nline two");
    }

    #[test]
    fn test_idempotent_on_known_input() {
        let once = sanitize("a http://x.io b 10.0.0.1 c d@e.fr");
        assert_eq!(sanitize(&once), once);
    }

    proptest! {
        #[test]
        fn prop_sanitize_is_idempotent(input in "[a-z0-9@:/ .\\n-]{0,80}") {
            let once = sanitize(&input);
            prop_assert_eq!(sanitize(&once), once);
        }

        #[test]
        fn prop_sanitize_leaves_no_url(host in "[a-z]{1,10}", path in "[a-z0-9/]{0,10}") {
            let text = format!("before https://{}.com/{} after", host, path);
            let cleaned = sanitize(&text);
            prop_assert!(!cleaned.contains("https://"));
        }
    }
}
