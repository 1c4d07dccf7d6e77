use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LEADING_IMAGE_DIRECTIVE: Regex =
        Regex::new(r"^\[FEATURED_IMAGE_PROMPT:(.*?)\]\s*\n?").expect("valid image directive pattern");
}

/// A featured-image directive found at the very start of an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDirective {
    pub prompt: String,
    /// Bytes to drop from the front of the article, trailing whitespace included.
    pub len: usize,
}

/// Only a directive at offset zero counts; one further down is left alone.
pub fn leading_image_directive(markdown: &str) -> Option<ImageDirective> {
    let caps = LEADING_IMAGE_DIRECTIVE.captures(markdown)?;
    let whole = caps.get(0)?;
    let prompt = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
    Some(ImageDirective {
        prompt: prompt.to_string(),
        len: whole.end(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_directive() {
        let text = "[FEATURED_IMAGE_PROMPT:  a lighthouse at dusk ]\n# Title\nBody";
        let directive = leading_image_directive(text).unwrap();
        assert_eq!(directive.prompt, "a lighthouse at dusk");
        assert_eq!(&text[directive.len..], "# Title\nBody");
    }

    #[test]
    fn test_directive_swallows_blank_lines() {
        let text = "[FEATURED_IMAGE_PROMPT: x]\n\n\n# Title";
        let directive = leading_image_directive(text).unwrap();
        assert_eq!(&text[directive.len..], "# Title");
    }

    #[test]
    fn test_directive_must_lead() {
        assert!(leading_image_directive("# Title\n[FEATURED_IMAGE_PROMPT: x]").is_none());
        assert!(leading_image_directive(" [FEATURED_IMAGE_PROMPT: x]").is_none());
        assert!(leading_image_directive("[FEATURED_IMAGE_PROMPT: unterminated\n# Title]").is_none());
        assert!(leading_image_directive("[IMAGE: x]").is_none());
    }
}
