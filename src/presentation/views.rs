use crate::application::error::{ErrorReport, HttpError};
use crate::domain::selector::LanguageControl;
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

/// Render a template to a string; used by the static export.
pub fn render_to_string<T: Template>(template: &T) -> Result<String, TemplateRenderError> {
    template.render().map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_to_string",
            "Template rendering failed",
            err,
        )
    })
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    let content = ErrorPageView::not_found();
    let view = LayoutContext::new(chrome, content);
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

#[derive(Clone)]
pub struct NavigationView {
    pub entries: Vec<NavigationLinkView>,
}

#[derive(Clone)]
pub struct FooterView {
    pub copy: String,
    pub links: Vec<NavigationLinkView>,
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub href: String,
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
}

#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
}

impl LayoutChrome {
    pub fn with_canonical(self, canonical: String) -> Self {
        Self {
            meta: self.meta.with_canonical(canonical),
            ..self
        }
    }

    /// Prefix the document title with a page title (`Imprint · Quire`).
    pub fn with_page_title(self, page_title: &str) -> Self {
        Self {
            meta: self.meta.with_page_title(page_title),
            ..self
        }
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            navigation: chrome.navigation,
            footer: chrome.footer,
            meta: chrome.meta,
            content,
        }
    }
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
    pub canonical: String,
    pub language: String,
}

impl PageMetaView {
    pub fn with_canonical(self, canonical: String) -> Self {
        Self { canonical, ..self }
    }

    pub fn with_page_title(self, page_title: &str) -> Self {
        if page_title.is_empty() {
            return self;
        }
        Self {
            title: format!("{page_title} · {}", self.title),
            ..self
        }
    }

    pub fn with_language(self, language: &str) -> Self {
        Self {
            language: language.to_string(),
            ..self
        }
    }
}

#[derive(Clone)]
pub struct TagBadge {
    pub label: String,
    pub href: String,
}

#[derive(Clone)]
pub struct ArticleCard {
    pub href: String,
    pub title: String,
    pub description: String,
    pub iso_date: String,
    pub published: String,
    pub badges: Vec<TagBadge>,
}

#[derive(Clone)]
pub struct TagSummary {
    pub label: String,
    pub href: String,
    pub count: usize,
    pub is_active: bool,
}

pub struct IndexContext {
    pub heading: String,
    pub articles: Vec<ArticleCard>,
    pub tags: Vec<TagSummary>,
    pub has_results: bool,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<IndexContext>,
}

pub struct ArticleDetailContext {
    pub title: String,
    pub description: String,
    pub published: String,
    pub iso_date: String,
    pub badges: Vec<TagBadge>,
    pub body_html: String,
    pub contains_code: bool,
}

#[derive(Template)]
#[template(path = "article.html")]
pub struct ArticleTemplate {
    pub view: LayoutContext<ArticleDetailContext>,
}

pub struct LegalPageView {
    pub title: String,
    pub language: String,
    /// Empty when the selected language has no variant.
    pub body_html: String,
    pub controls: Vec<LanguageControl>,
}

impl LegalPageView {
    pub fn has_body(&self) -> bool {
        !self.body_html.is_empty()
    }
}

#[derive(Template)]
#[template(path = "legal.html")]
pub struct LegalTemplate {
    pub view: LayoutContext<LegalPageView>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub primary_action: Option<ErrorAction>,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist. Try returning to the homepage to continue exploring.".to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Back to home".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

pub fn build_tag_badges<'a, T>(tags: T) -> Vec<TagBadge>
where
    T: IntoIterator<Item = &'a String>,
{
    tags.into_iter()
        .map(|tag| TagBadge {
            label: format!("#{}", title_case(tag)),
            href: format!("/tags/{tag}"),
        })
        .collect()
}

pub fn title_case(tag: &str) -> String {
    let mut words = Vec::new();
    for segment in tag.split(['-', '_']) {
        if segment.is_empty() {
            continue;
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            let mut word = String::new();
            word.extend(first.to_uppercase());
            for ch in chars {
                word.extend(ch.to_lowercase());
            }
            words.push(word);
        }
    }

    if words.is_empty() {
        tag.to_string()
    } else {
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_splits_on_separators() {
        assert_eq!(title_case("privacy-policy"), "Privacy Policy");
        assert_eq!(title_case("nest_js"), "Nest Js");
        assert_eq!(title_case("---"), "---");
    }

    #[test]
    fn page_title_is_prefixed() {
        let meta = PageMetaView {
            title: "Quire".into(),
            description: String::new(),
            canonical: String::new(),
            language: "en".into(),
        };
        assert_eq!(meta.clone().with_page_title("Imprint").title, "Imprint · Quire");
        assert_eq!(meta.with_page_title("").title, "Quire");
    }

    #[test]
    fn badges_link_to_tag_pages() {
        let tags = vec!["docker".to_string()];
        let badges = build_tag_badges(&tags);
        assert_eq!(badges[0].label, "#Docker");
        assert_eq!(badges[0].href, "/tags/docker");
    }
}
