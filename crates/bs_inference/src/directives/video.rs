use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub(crate) static ref VIDEO_DIRECTIVE: Regex =
        Regex::new(r"\[YOUTUBE_SEARCH_QUERY:(.*?)\]\n?").expect("valid video directive pattern");
    static ref VIDEO_ID: Regex =
        Regex::new(r"(?:v=|v%3D|/embed/|\.be/)([a-zA-Z0-9_-]{11})").expect("valid video id pattern");
}

pub const EMBED_HOST: &str = "https://www.youtube-nocookie.com/embed/";

/// What happened to one video directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoResolution {
    Embedded { video_id: String },
    /// A URL came back but no video ID could be pulled out of it.
    Unextractable { url: String },
    NotFound,
}

impl VideoResolution {
    pub fn from_lookup(url: Option<String>) -> Self {
        match url {
            Some(url) => match extract_video_id(&url) {
                Some(video_id) => VideoResolution::Embedded { video_id },
                None => VideoResolution::Unextractable { url },
            },
            None => VideoResolution::NotFound,
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, VideoResolution::Embedded { .. })
    }

    /// Markup that replaces the directive in the article.
    pub fn to_markup(&self, topic: &str) -> String {
        match self {
            VideoResolution::Embedded { video_id } => embed_markup(video_id, topic),
            VideoResolution::Unextractable { url } => format!(
                "<!-- YouTube embed failed: Could not extract a valid video ID from the URL: {} -->",
                comment_safe(url)
            ),
            VideoResolution::NotFound => format!(
                "<!-- YouTube embed failed: No relevant video was found for the topic \"{}\" -->",
                comment_safe(topic)
            ),
        }
    }
}

/// Pulls the 11-character ID out of `watch?v=`, `v%3D`, `/embed/` and
/// `youtu.be/` style URLs.
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('[', "&#91;")
}

/// Text embedded in a comment can neither close it nor read as a directive.
fn comment_safe(value: &str) -> String {
    value.replace("--", "- -").replace('[', "&#91;")
}

/// Responsive privacy-enhanced player: 600x338 intrinsic size, sized by CSS
/// to the full width at 16:9.
pub fn embed_markup(video_id: &str, topic: &str) -> String {
    format!(
        r#"<iframe
  title="{title}"
  width="600"
  height="338"
  src="{host}{id}"
  frameborder="0"
  allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture; web-share"
  referrerpolicy="strict-origin-when-cross-origin"
  allowfullscreen
  style="width: 100%; aspect-ratio: 16 / 9; border: none; border-radius: 12px; margin: 1.5rem 0; box-shadow: 0 4px 6px -1px rgb(0 0 0 / 0.1), 0 2px 4px -2px rgb(0 0 0 / 0.1);">
</iframe>"#,
        title = escape_attribute(topic),
        host = EMBED_HOST,
        id = video_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        let cases = [
            "https://www.youtube.com/watch?v=abc12345678",
            "https://www.youtube.com/embed/abc12345678",
            "https://youtu.be/abc12345678",
            "https://www.youtube.com/watch?feature=share&v=abc12345678&t=42",
            "https://consent.youtube.com/m?continue=https%3A%2F%2Fwww.youtube.com%2Fwatch%3Fv%3Dabc12345678",
        ];
        for url in cases {
            assert_eq!(extract_video_id(url).as_deref(), Some("abc12345678"), "{}", url);
        }
        assert_eq!(extract_video_id("https://youtu.be/a-b_c123XYZ").as_deref(), Some("a-b_c123XYZ"));
    }

    #[test]
    fn test_extract_video_id_failures() {
        assert!(extract_video_id("https://www.youtube.com/@somechannel").is_none());
        assert!(extract_video_id("https://youtu.be/short").is_none());
        assert!(extract_video_id("").is_none());
    }

    #[test]
    fn test_resolution_from_lookup() {
        assert_eq!(
            VideoResolution::from_lookup(Some("https://youtu.be/abc12345678".to_string())),
            VideoResolution::Embedded { video_id: "abc12345678".to_string() }
        );
        assert_eq!(
            VideoResolution::from_lookup(Some("https://www.youtube.com/results?search_query=x".to_string())),
            VideoResolution::Unextractable {
                url: "https://www.youtube.com/results?search_query=x".to_string()
            }
        );
        assert_eq!(VideoResolution::from_lookup(None), VideoResolution::NotFound);
    }

    #[test]
    fn test_embed_markup() {
        let html = embed_markup("abc12345678", "Tea & \"Calm\"");
        assert!(html.starts_with("<iframe\n  title=\"Tea &amp; &quot;Calm&quot;\"\n"));
        assert!(html.contains("src=\"https://www.youtube-nocookie.com/embed/abc12345678\""));
        assert!(html.contains("width=\"600\""));
        assert!(html.contains("height=\"338\""));
        assert!(html.contains("aspect-ratio: 16 / 9"));
        assert!(html.contains("border-radius: 12px"));
        assert!(html.contains("allowfullscreen\n"));
        assert!(html.ends_with("</iframe>"));
    }

    #[test]
    fn test_failure_comments() {
        assert_eq!(
            VideoResolution::NotFound.to_markup("Test Topic"),
            "<!-- YouTube embed failed: No relevant video was found for the topic \"Test Topic\" -->"
        );
        assert_eq!(
            VideoResolution::Unextractable { url: "https://youtube.com/x".to_string() }.to_markup("t"),
            "<!-- YouTube embed failed: Could not extract a valid video ID from the URL: https://youtube.com/x -->"
        );
        assert!(!VideoResolution::NotFound.to_markup("a --> b").contains("-->\""));
    }

    #[test]
    fn test_markup_never_carries_directive_text() {
        let topic = "Why [YOUTUBE_SEARCH_QUERY: x] matters";
        let not_found = VideoResolution::NotFound.to_markup(topic);
        assert!(not_found.contains("Why &#91;YOUTUBE_SEARCH_QUERY: x] matters"));

        let unextractable = VideoResolution::Unextractable {
            url: "https://youtube.com/[YOUTUBE_SEARCH_QUERY:x]".to_string(),
        }
        .to_markup(topic);
        let embedded = embed_markup("abc12345678", topic);
        for markup in [not_found, unextractable, embedded] {
            assert!(!markup.contains("[YOUTUBE_SEARCH_QUERY:"), "{}", markup);
            assert!(!VIDEO_DIRECTIVE.is_match(&markup), "{}", markup);
        }
    }
}
