//! Text transforms shared by the provider adapters.

mod escape;
mod markdown;
mod sanitize;

pub use escape::escape_markdown_v2;
pub use markdown::{extract_title, strip_title, to_html, to_plain_text};
pub use sanitize::sanitize;
