use pulldown_cmark::{html, Options, Parser};

/// Markdown to HTML. Implementations must be deterministic and never fail.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}

/// CommonMark plus the usual blog extensions. Raw HTML (video iframes,
/// failure comments) passes through untouched.
#[derive(Debug, Clone, Copy)]
pub struct CmarkRenderer {
    options: Options,
}

impl Default for CmarkRenderer {
    fn default() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        Self { options }
    }
}

impl CmarkRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        Self { options }
    }
}

impl MarkdownRenderer for CmarkRenderer {
    fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Renders with `renderer`, or shows the raw text in a `<pre>` block when
/// there is none.
pub fn render_or_preformatted(renderer: Option<&dyn MarkdownRenderer>, markdown: &str) -> String {
    match renderer {
        Some(renderer) => renderer.render(markdown),
        None => {
            tracing::warn!("No Markdown renderer available, falling back to preformatted text");
            format!("<pre>{}</pre>", escape_html(markdown))
        }
    }
}
