//! Localized document variants and the sets they are grouped into.
//!
//! A [`DocumentSet`] holds every language variant of one logical document
//! (for example the imprint in English and German). Sets are built once by the
//! content library and never mutated afterwards.

use super::error::DomainError;

/// Language used when nothing else has been selected.
pub const DEFAULT_LANGUAGE: &str = "en";

/// One language-tagged variant of a static document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedDocument {
    pub language_code: String,
    pub title: String,
    /// Pre-rendered, sanitized HTML.
    pub body: String,
}

impl LocalizedDocument {
    pub fn new(
        language_code: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            language_code: language_code.into(),
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Ordered collection of localized variants.
///
/// Language codes are expected to be unique but this is not enforced; lookups
/// always return the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSet {
    documents: Vec<LocalizedDocument>,
}

impl DocumentSet {
    pub fn new(documents: Vec<LocalizedDocument>) -> Self {
        Self { documents }
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocalizedDocument> {
        self.documents.iter()
    }

    /// Distinct language codes in first-occurrence order.
    pub fn language_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = Vec::with_capacity(self.documents.len());
        for document in &self.documents {
            let code = document.language_code.as_str();
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
        codes
    }
}

/// Find the first variant written in `current_language`.
pub fn resolve_active_document<'a>(
    documents: &'a DocumentSet,
    current_language: &str,
) -> Option<&'a LocalizedDocument> {
    documents
        .iter()
        .find(|document| document.language_code == current_language)
}

/// A legal page (imprint, privacy policy, ...) published in one or more languages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegalDocument {
    pub slug: String,
    pub variants: DocumentSet,
}

impl LegalDocument {
    pub fn new(slug: impl Into<String>, variants: DocumentSet) -> Result<Self, DomainError> {
        let slug = slug.into();
        if variants.is_empty() {
            return Err(DomainError::NoVariants { slug });
        }
        Ok(Self { slug, variants })
    }
}

/// Whether `code` looks like a language tag (`en`, `de`, `pt-br`).
pub fn is_valid_language_code(code: &str) -> bool {
    !code.is_empty()
        && !code.starts_with('-')
        && !code.ends_with('-')
        && code
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
}

/// Human-readable label for a language control.
pub fn language_label(code: &str) -> String {
    match code {
        "en" => "English".to_string(),
        "de" => "Deutsch".to_string(),
        "fr" => "Français".to_string(),
        "es" => "Español".to_string(),
        "it" => "Italiano".to_string(),
        "nl" => "Nederlands".to_string(),
        other => other.to_ascii_uppercase(),
    }
}
