//! Page composition shared by the HTTP handlers and the static export.

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use metrics::counter;
use thiserror::Error;
use tokio::fs;
use tracing::info;

use crate::application::{
    chrome::ChromeService,
    content::ContentLibrary,
    feed::{FeedFilter, FeedService},
    legal::{LanguageLinks, LegalPageService},
};
use crate::config::SiteSettings;
use crate::infra::{assets::bundled_assets, telemetry::PAGE_RENDER_METRIC};
use crate::presentation::views::{
    ArticleTemplate, ErrorPageView, ErrorTemplate, IndexTemplate, LayoutContext, LegalTemplate,
    TemplateRenderError, render_to_string,
};

/// Builds complete page templates from the content library.
#[derive(Clone)]
pub struct SitePages {
    library: Arc<ContentLibrary>,
    chrome: ChromeService,
    feed: FeedService,
    legal: LegalPageService,
}

impl SitePages {
    pub fn new(site: SiteSettings, library: Arc<ContentLibrary>) -> Self {
        Self {
            chrome: ChromeService::new(site, library.clone()),
            feed: FeedService::new(library.clone()),
            legal: LegalPageService::new(library.clone()),
            library,
        }
    }

    pub fn library(&self) -> &ContentLibrary {
        &self.library
    }

    pub fn chrome(&self) -> &ChromeService {
        &self.chrome
    }

    /// Article listing; `None` for an unknown tag.
    pub fn index(&self, filter: FeedFilter) -> Option<IndexTemplate> {
        let path = match &filter {
            FeedFilter::All => "/".to_string(),
            FeedFilter::Tag(tag) => format!("/tags/{tag}"),
        };
        let content = self.feed.index_context(&filter)?;
        counter!(PAGE_RENDER_METRIC, "kind" => "index").increment(1);

        let mut chrome = self.chrome.load_for(&path);
        if let FeedFilter::Tag(_) = filter {
            chrome = chrome.with_page_title(&content.heading);
        }
        Some(IndexTemplate {
            view: LayoutContext::new(chrome, content),
        })
    }

    pub fn article(&self, slug: &str) -> Option<ArticleTemplate> {
        let content = self.feed.article_context(slug)?;
        counter!(PAGE_RENDER_METRIC, "kind" => "article").increment(1);

        let mut chrome = self
            .chrome
            .load_for(&format!("/articles/{slug}"))
            .with_page_title(&content.title);
        if !content.description.is_empty() {
            chrome.meta.description = content.description.clone();
        }
        Some(ArticleTemplate {
            view: LayoutContext::new(chrome, content),
        })
    }

    pub fn legal(
        &self,
        slug: &str,
        language: Option<&str>,
        links: LanguageLinks,
    ) -> Option<LegalTemplate> {
        let content = self.legal.page_view(slug, language, links)?;
        let mut chrome = self
            .chrome
            .load_for(&format!("/legal/{slug}"))
            .with_page_title(&content.title);
        chrome.meta = chrome.meta.with_language(&content.language);
        Some(LegalTemplate {
            view: LayoutContext::new(chrome, content),
        })
    }

    pub fn not_found(&self) -> ErrorTemplate {
        ErrorTemplate {
            view: LayoutContext::new(self.chrome.load(), ErrorPageView::not_found()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Template(#[from] TemplateRenderError),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub pages: usize,
    pub assets: usize,
}

/// Write a static copy of the site below `output`.
///
/// Legal pages are written once per language variant, with language controls
/// linking between the exported directories.
pub async fn export_site(pages: &SitePages, output: &Path) -> Result<ExportSummary, ExportError> {
    let mut writer = ExportWriter::new(output);
    let library = pages.library();

    if let Some(index) = pages.index(FeedFilter::All) {
        writer.page("index.html", &render_to_string(&index)?).await?;
    }

    for (tag, _) in library.tags() {
        if let Some(template) = pages.index(FeedFilter::Tag(tag.clone())) {
            writer
                .page(&format!("tags/{tag}/index.html"), &render_to_string(&template)?)
                .await?;
        }
    }

    for article in library.articles() {
        if let Some(template) = pages.article(&article.slug) {
            writer
                .page(
                    &format!("articles/{}/index.html", article.slug),
                    &render_to_string(&template)?,
                )
                .await?;
        }
    }

    for document in library.legal_documents() {
        let slug = document.slug.as_str();
        if let Some(template) = pages.legal(slug, None, LanguageLinks::Directory) {
            writer
                .page(&format!("legal/{slug}/index.html"), &render_to_string(&template)?)
                .await?;
        }
        for code in document.variants.language_codes() {
            if let Some(template) = pages.legal(slug, Some(code), LanguageLinks::Directory) {
                writer
                    .page(
                        &format!("legal/{slug}/{code}/index.html"),
                        &render_to_string(&template)?,
                    )
                    .await?;
            }
        }
    }

    writer
        .page("404.html", &render_to_string(&pages.not_found())?)
        .await?;

    for (path, contents) in bundled_assets() {
        writer.asset(&format!("static/{path}"), contents).await?;
    }

    info!(
        target = "quire::export",
        output = %output.display(),
        pages = writer.summary.pages,
        assets = writer.summary.assets,
        "Export completed"
    );

    Ok(writer.summary)
}

struct ExportWriter<'a> {
    root: &'a Path,
    summary: ExportSummary,
}

impl<'a> ExportWriter<'a> {
    fn new(root: &'a Path) -> Self {
        Self {
            root,
            summary: ExportSummary::default(),
        }
    }

    async fn page(&mut self, relative: &str, html: &str) -> Result<(), ExportError> {
        self.write(relative, html.as_bytes()).await?;
        self.summary.pages += 1;
        Ok(())
    }

    async fn asset(&mut self, relative: &str, contents: &[u8]) -> Result<(), ExportError> {
        self.write(relative, contents).await?;
        self.summary.assets += 1;
        Ok(())
    }

    async fn write(&self, relative: &str, contents: &[u8]) -> Result<(), ExportError> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| ExportError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        fs::write(&path, contents)
            .await
            .map_err(|source| ExportError::Io { path, source })
    }
}
