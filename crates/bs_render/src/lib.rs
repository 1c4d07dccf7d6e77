//! Markdown rendering and WordPress payload preparation.

pub mod markdown;
pub mod publish;

pub use markdown::{escape_html, render_or_preformatted, CmarkRenderer, MarkdownRenderer};
pub use publish::{build_publish_payload, extract_featured_image, extract_title, strip_first_image};
