use time::Date;

use super::error::DomainError;

/// A published blog article with its body already rendered to HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub published: Date,
    pub tags: Vec<String>,
    pub body_html: String,
    /// Whether the rendered body contains code blocks or inline code.
    pub contains_code: bool,
}

impl Article {
    pub fn new(
        slug: impl Into<String>,
        title: impl Into<String>,
        published: Date,
    ) -> Result<Self, DomainError> {
        let slug = slug.into();
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::EmptyTitle { slug });
        }

        Ok(Self {
            slug,
            title,
            description: String::new(),
            published,
            tags: Vec::new(),
            body_html: String::new(),
            contains_code: false,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_body(mut self, body_html: impl Into<String>, contains_code: bool) -> Self {
        self.body_html = body_html.into();
        self.contains_code = contains_code;
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }
}

/// Sort newest first; articles published on the same day are ordered by slug.
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| {
        b.published
            .cmp(&a.published)
            .then_with(|| a.slug.cmp(&b.slug))
    });
}
