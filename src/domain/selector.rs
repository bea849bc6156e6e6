//! Selection of the language variant shown on a localized page.
//!
//! One selector exists per rendered page instance. It borrows the document set,
//! owns nothing but the current language code, and is dropped with the page.

use super::documents::{DocumentSet, LocalizedDocument, language_label, resolve_active_document};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageControl {
    pub code: String,
    pub label: String,
    pub href: String,
    pub is_active: bool,
}

/// Output of [`LocalizedDocumentSelector::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorOutput {
    /// Resolved body, empty when no variant matches the selection.
    pub body: String,
    pub title: Option<String>,
    pub controls: Vec<LanguageControl>,
}

#[derive(Debug, Clone)]
pub struct LocalizedDocumentSelector<'a> {
    documents: &'a DocumentSet,
    current_language: String,
}

impl<'a> LocalizedDocumentSelector<'a> {
    pub fn new(documents: &'a DocumentSet, default_language: impl Into<String>) -> Self {
        Self {
            documents,
            current_language: default_language.into(),
        }
    }

    /// Switch to `code`. The code is not checked against the document set.
    pub fn select_language(&mut self, code: impl Into<String>) {
        self.current_language = code.into();
    }

    pub fn current_language(&self) -> &str {
        &self.current_language
    }

    pub fn active_document(&self) -> Option<&'a LocalizedDocument> {
        resolve_active_document(self.documents, &self.current_language)
    }

    /// Resolve the body and build one control per distinct language.
    ///
    /// `href` maps a language code to the link that selects it.
    pub fn render<F>(&self, href: F) -> SelectorOutput
    where
        F: Fn(&str) -> String,
    {
        let active = self.active_document();
        let controls = self
            .documents
            .language_codes()
            .into_iter()
            .map(|code| LanguageControl {
                code: code.to_string(),
                label: language_label(code),
                href: href(code),
                is_active: code == self.current_language,
            })
            .collect();

        SelectorOutput {
            body: active.map(|document| document.body.clone()).unwrap_or_default(),
            title: active.map(|document| document.title.clone()),
            controls,
        }
    }
}
