//! Localized legal pages (imprint, privacy policy).
//!
//! Each call builds a fresh [`LocalizedDocumentSelector`], so the selected
//! language lives exactly as long as one rendered page.

use std::sync::Arc;

use metrics::counter;
use tracing::debug;

use crate::application::content::ContentLibrary;
use crate::domain::selector::LocalizedDocumentSelector;
use crate::infra::telemetry::{LANGUAGE_MISS_METRIC, PAGE_RENDER_METRIC};
use crate::presentation::views::{LegalPageView, title_case};

/// How language controls link to the other variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageLinks {
    /// `/legal/<slug>?lang=<code>`, served dynamically.
    Query,
    /// `/legal/<slug>/` for the default language, `/legal/<slug>/<code>/` otherwise.
    Directory,
}

impl LanguageLinks {
    pub fn href(self, slug: &str, code: &str, default_language: &str) -> String {
        match self {
            LanguageLinks::Query => format!("/legal/{slug}?lang={code}"),
            LanguageLinks::Directory if code == default_language => format!("/legal/{slug}/"),
            LanguageLinks::Directory => format!("/legal/{slug}/{code}/"),
        }
    }
}

#[derive(Clone)]
pub struct LegalPageService {
    library: Arc<ContentLibrary>,
}

impl LegalPageService {
    pub fn new(library: Arc<ContentLibrary>) -> Self {
        Self { library }
    }

    /// Render the legal page `slug` in `language` (or the default language).
    ///
    /// Returns `None` only for an unknown slug. A language without a variant
    /// yields a page with an empty body.
    pub fn page_view(
        &self,
        slug: &str,
        language: Option<&str>,
        links: LanguageLinks,
    ) -> Option<LegalPageView> {
        let document = self.library.legal_document(slug)?;
        let default_language = self.library.default_language();

        let mut selector = LocalizedDocumentSelector::new(&document.variants, default_language);
        if let Some(code) = language {
            selector.select_language(code);
        }

        let output = selector.render(|code| links.href(slug, code, default_language));
        counter!(PAGE_RENDER_METRIC, "kind" => "legal").increment(1);

        if output.title.is_none() {
            debug!(
                target = "quire::legal",
                slug,
                language = selector.current_language(),
                "No variant for selected language, rendering empty body"
            );
            counter!(LANGUAGE_MISS_METRIC, "document" => slug.to_string()).increment(1);
        }

        Some(LegalPageView {
            title: output.title.unwrap_or_else(|| title_case(slug)),
            language: selector.current_language().to_string(),
            body_html: output.body,
            controls: output.controls,
        })
    }
}
