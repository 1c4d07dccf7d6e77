//! Instruction prompt for article generation.
//!
//! The template asks the model to open with a featured-image directive and to
//! drop a video search directive where a video fits; the resolver in
//! [`crate::directives`] consumes both.

use bs_core::ArticleConfig;

pub const DEFAULT_AUTHOR_BIO: &str =
    "Written by Aslan Madaev, writer exploring the human side of growth and learning.";

pub const MEDICAL_DISCLAIMER: &str =
    "This article is for educational purposes only and is not intended as medical or professional advice.";

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    author_bio: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            author_bio: DEFAULT_AUTHOR_BIO.to_string(),
        }
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_author_bio(mut self, bio: impl Into<String>) -> Self {
        self.author_bio = bio.into();
        self
    }

    pub fn author_bio(&self) -> &str {
        &self.author_bio
    }

    fn internal_links_clause(config: &ArticleConfig) -> String {
        match config.internal_links_list() {
            Some(links) => format!(
                "  - **Internal Links:** Include 1-2 contextual internal links. You MUST choose relevant links from the following list. Do not invent your own internal links.\n    ```\n    {}\n    ```",
                links
            ),
            None => "  - **Internal Links:** Include 1-2 contextual internal links. Use placeholders in the format `[Internal Link: descriptive-slug-for-relevant-page]`.".to_string(),
        }
    }

    pub fn build(&self, config: &ArticleConfig) -> String {
        let topic = &config.topic;
        let internal_links = Self::internal_links_clause(config);
        let bio = &self.author_bio;

        format!(
            r#"
You are an expert content writer and blogger with deep emotional intelligence. Your goal is to craft an article that connects, educates, and inspires readers through clarity, honesty, and lived experience.

**PRIMARY GOAL:** Write a blog post on the topic: "{topic}".

**TONE & STYLE:**
- Modern, conversational, and reflective.
- Warm, kind, and authentic.
- Write like a person who has lived and learned, speaking to readers as equals.
- Use "I" statements, examples, and observations drawn from real human experience.
- NEVER use em dashes. Use commas or periods instead.
- Avoid filler, repetition, or robotic phrasing.
- Write short paragraphs with a natural, easy flow.
- The output must be only the clean, ready-to-publish blog post in valid Markdown format. Do not include any extra explanations before or after the article.

**RESEARCH & SOURCING (EEAT STANDARDS):**
- Before writing, perform research using your available tools to gather relevant, credible resources.
- Integrate these resources directly into the article:
  - **Expert Quote:** Include at least one quote from a credible authority or expert in the field.
  - **Outbound Link:** Include one link to a trusted external source (academic, research-based, or established publication).
{internal_links}
  - **Relevant Video:** Suggest a search query for a relevant YouTube video that explains or enhances a key point. Place a placeholder in the article body where it fits best, using the format: `[YOUTUBE_SEARCH_QUERY: your concise search query here]`. If no video would be a strong fit, do not include this placeholder.
  - **Other Resources:** If you find relevant books or news articles, link to them contextually.
- **Trustworthiness:** All writing must be honest and accurate. Avoid exaggeration or unsupported claims.

**STRUCTURE:**
Follow this structure precisely:
1.  **Featured Image Placeholder:** Start the entire output with a placeholder for a featured image. The format is: `[FEATURED_IMAGE_PROMPT: A simple, text-free, illustrative image representing the concept of: {topic}]`
2.  **Title:** A compelling title, maximum 67 characters.
3.  **Table of Contents:** A short, bulleted list providing an easy overview of the article's sections.
4.  **Introduction:** A short, emotionally connecting opening that hooks the reader.
5.  **Featured Snippet Answer:** Immediately following the intro, write a direct, concise paragraph (40-60 words) that clearly answers the main question or keyword phrase of the topic. DO NOT give this paragraph a heading.
6.  **Body with Subheadings:** Use logical, keyword-aware, and inviting H2 subheadings to structure the main content.
7.  **Final Thoughts:** A short reflection offering insight or closure.
8.  **Citations:** If you referenced scholarly or research-based sources, list them here under a "References" H2 heading, using APA styling. Do not use any other citation format.
9.  **Author Bio:** End the entire post with this exact line: "{bio}"

**SEO GUIDELINES:**
- The topic "{topic}" is the focus keyphrase.
- Include the keyphrase (or natural variations) in the title, introduction, the featured snippet answer, and at least one subheading.
- Optimize for featured snippets by directly answering "how," "what," or "why" questions related to the topic near the beginning of the article.

**DISCLAIMER:**
- If the topic is related to medical, psychological, or therapeutic subjects, include this exact disclaimer at the very bottom, after the author bio: "{disclaimer}"

Begin the article now.
"#,
            topic = topic,
            internal_links = internal_links,
            bio = bio,
            disclaimer = MEDICAL_DISCLAIMER,
        )
    }
}

/// Shorthand for [`PromptBuilder::build`] with the default author bio.
pub fn build_prompt(config: &ArticleConfig) -> String {
    PromptBuilder::default().build(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_topic_and_structure() {
        let prompt = build_prompt(&ArticleConfig::new("Mindful Communication"));

        assert!(prompt.contains("Write a blog post on the topic: \"Mindful Communication\"."));
        assert!(prompt.contains(
            "[FEATURED_IMAGE_PROMPT: A simple, text-free, illustrative image representing the concept of: Mindful Communication]"
        ));
        assert!(prompt.contains("[YOUTUBE_SEARCH_QUERY: your concise search query here]"));
        assert!(prompt.contains("maximum 67 characters"));
        assert!(prompt.contains(DEFAULT_AUTHOR_BIO));
        assert!(prompt.contains(MEDICAL_DISCLAIMER));
        assert!(prompt.trim_end().ends_with("Begin the article now."));
    }

    #[test]
    fn test_placeholder_links_without_list() {
        let prompt = build_prompt(&ArticleConfig::new("Journaling"));
        assert!(prompt.contains("[Internal Link: descriptive-slug-for-relevant-page]"));
        assert!(!prompt.contains("You MUST choose relevant links"));

        let blank = ArticleConfig::new("Journaling").with_internal_links("   ");
        assert_eq!(build_prompt(&blank), prompt);
    }

    #[test]
    fn test_literal_links_list() {
        let config = ArticleConfig::new("Reading habits")
            .with_internal_links("\nhttps://blog.example/a\nhttps://blog.example/b\n");
        let prompt = build_prompt(&config);

        assert!(prompt.contains("You MUST choose relevant links from the following list."));
        assert!(prompt.contains("    ```\n    https://blog.example/a\nhttps://blog.example/b\n    ```"));
        assert!(!prompt.contains("[Internal Link:"));
    }

    #[test]
    fn test_custom_author_bio() {
        let builder = PromptBuilder::new().with_author_bio("Written by Sam, gardener.");
        let prompt = builder.build(&ArticleConfig::new("Compost"));
        assert!(prompt.contains("End the entire post with this exact line: \"Written by Sam, gardener.\""));
        assert!(!prompt.contains(DEFAULT_AUTHOR_BIO));
    }
}
