//! Preparing a rendered article for WordPress.

use bs_core::PublishPayload;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};

pub const UNTITLED: &str = "Untitled Post";

lazy_static! {
    static ref H1: Selector = Selector::parse("h1").expect("valid h1 selector");
    static ref FEATURED_IMAGE: Regex =
        Regex::new(r"!\[.*?\]\((data:image/.*?;base64,.*?)\)").expect("valid featured image pattern");
}

/// Text content of the first `<h1>`, or "Untitled Post".
pub fn extract_title(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment
        .select(&H1)
        .next()
        .map(|h1| h1.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// The first inline `data:image/...;base64,...` URI in the Markdown.
pub fn extract_featured_image(markdown: &str) -> Option<String> {
    FEATURED_IMAGE
        .captures(markdown)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Byte range of the first `<img ...>` tag, ignoring anything inside HTML
/// comments.
fn first_img_tag(html: &str) -> Option<std::ops::Range<usize>> {
    let bytes = html.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        let rest = &html[i..];
        if rest.starts_with("<!--") {
            match rest[4..].find("-->") {
                Some(end) => i += 4 + end + 3,
                None => return None,
            }
            continue;
        }
        let is_img = bytes
            .get(i + 1..i + 4)
            .map_or(false, |name| name.eq_ignore_ascii_case(b"img"))
            && bytes
                .get(i + 4)
                .map_or(false, |&c| c.is_ascii_whitespace() || c == b'>' || c == b'/');
        if !is_img {
            i += 1;
            continue;
        }

        let mut quote: Option<u8> = None;
        for (offset, &b) in bytes[i..].iter().enumerate() {
            match quote {
                Some(q) if b == q => quote = None,
                Some(_) => {}
                None if b == b'"' || b == b'\'' => quote = Some(b),
                None if b == b'>' => return Some(i..i + offset + 1),
                None => {}
            }
        }
        return None;
    }
    None
}

/// Removes the first image tag from the HTML; the featured image travels
/// separately so WordPress can set it as the post thumbnail.
pub fn strip_first_image(html: &str) -> String {
    match first_img_tag(html) {
        Some(range) => {
            let mut out = String::with_capacity(html.len() - range.len());
            out.push_str(&html[..range.start]);
            out.push_str(&html[range.end..]);
            out
        }
        None => html.to_string(),
    }
}

/// Title from the HTML, body without the featured image, image from the
/// Markdown.
pub fn build_publish_payload(html: &str, markdown: &str) -> PublishPayload {
    PublishPayload {
        title: extract_title(html),
        content: strip_first_image(html),
        image_base64: extract_featured_image(markdown),
    }
}
