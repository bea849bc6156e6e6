use std::sync::Arc;

use crate::application::content::ContentLibrary;
use crate::config::SiteSettings;
use crate::domain::documents::resolve_active_document;
use crate::presentation::views::{
    BrandView, FooterView, LayoutChrome, NavigationLinkView, NavigationView, PageMetaView,
    title_case,
};

/// Builds the header, footer and default metadata shared by every page.
#[derive(Clone)]
pub struct ChromeService {
    site: SiteSettings,
    library: Arc<ContentLibrary>,
}

impl ChromeService {
    pub fn new(site: SiteSettings, library: Arc<ContentLibrary>) -> Self {
        Self { site, library }
    }

    pub fn load(&self) -> LayoutChrome {
        let footer_links = self
            .library
            .legal_documents()
            .iter()
            .map(|document| {
                let label = resolve_active_document(
                    &document.variants,
                    self.library.default_language(),
                )
                .map(|variant| variant.title.clone())
                .unwrap_or_else(|| title_case(&document.slug));
                NavigationLinkView {
                    label,
                    href: format!("/legal/{}", document.slug),
                }
            })
            .collect();

        LayoutChrome {
            brand: BrandView {
                title: self.site.title.clone(),
                href: "/".to_string(),
            },
            navigation: NavigationView {
                entries: vec![NavigationLinkView {
                    label: "Articles".to_string(),
                    href: "/".to_string(),
                }],
            },
            footer: FooterView {
                copy: self.site.footer.clone(),
                links: footer_links,
            },
            meta: PageMetaView {
                title: self.site.title.clone(),
                description: self.site.description.clone(),
                canonical: canonical_url(&self.site.base_url, "/"),
                language: self.library.default_language().to_string(),
            },
        }
    }

    /// Chrome with the canonical URL pointing at `path`.
    pub fn load_for(&self, path: &str) -> LayoutChrome {
        self.load()
            .with_canonical(canonical_url(&self.site.base_url, path))
    }
}

pub(crate) fn canonical_url(base: &str, path: &str) -> String {
    let root = format!("{}/", base.trim_end_matches('/'));
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        root
    } else {
        format!("{root}{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::documents::{DocumentSet, LegalDocument, LocalizedDocument};

    fn library() -> Arc<ContentLibrary> {
        let imprint = LegalDocument::new(
            "imprint",
            DocumentSet::new(vec![
                LocalizedDocument::new("de", "Impressum", ""),
                LocalizedDocument::new("en", "Imprint", ""),
            ]),
        )
        .unwrap();
        let privacy = LegalDocument::new(
            "privacy-policy",
            DocumentSet::new(vec![LocalizedDocument::new("de", "Datenschutz", "")]),
        )
        .unwrap();
        Arc::new(ContentLibrary::new(Vec::new(), vec![imprint, privacy], "en"))
    }

    #[test]
    fn footer_links_use_default_language_titles() {
        let chrome = ChromeService::new(SiteSettings::default(), library()).load();
        let links: Vec<_> = chrome
            .footer
            .links
            .iter()
            .map(|link| (link.label.as_str(), link.href.as_str()))
            .collect();
        assert_eq!(
            links,
            vec![
                ("Imprint", "/legal/imprint"),
                ("Privacy Policy", "/legal/privacy-policy")
            ]
        );
    }

    #[test]
    fn canonical_url_joins_base_and_path() {
        assert_eq!(
            canonical_url("https://blog.example.com", "/articles/docker"),
            "https://blog.example.com/articles/docker"
        );
        assert_eq!(
            canonical_url("https://blog.example.com/", "/"),
            "https://blog.example.com/"
        );
    }
}
