//! Loads the content directory into memory once at startup.
//!
//! Layout:
//!
//! ```text
//! content/
//!   articles/<name>.md          one article per file
//!   legal/<slug>/<lang>.md      one language variant per file
//! ```

use std::{
    collections::{BTreeMap, HashSet},
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use time::{Date, macros::format_description};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::application::front_matter::{
    self, ArticleFrontMatter, FrontMatterError, LegalFrontMatter,
};
use crate::application::render::{RenderRequest, RenderService, RenderTarget};
use crate::domain::{
    articles::{Article, sort_newest_first},
    documents::{DocumentSet, LegalDocument, LocalizedDocument, is_valid_language_code},
    error::DomainError,
    slug::{SlugError, derive_slug},
};

const ARTICLES_DIR: &str = "articles";
const LEGAL_DIR: &str = "legal";
const MARKDOWN_EXTENSION: &str = "md";

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid front matter in `{path}`")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },
    #[error("invalid date `{value}` in `{path}`, expected YYYY-MM-DD")]
    InvalidDate { path: PathBuf, value: String },
    #[error("cannot derive a slug for `{path}`")]
    Slug {
        path: PathBuf,
        #[source]
        source: SlugError,
    },
    #[error("`{path}` is not named after a language code")]
    InvalidLanguage { path: PathBuf },
    #[error("`{path}` repeats language `{language}` already loaded for this document")]
    DuplicateLanguage { path: PathBuf, language: String },
    #[error("duplicate {kind} slug `{slug}`")]
    DuplicateSlug { kind: &'static str, slug: String },
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ContentError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Everything the site publishes, with markdown already rendered.
#[derive(Debug, Clone, Default)]
pub struct ContentLibrary {
    articles: Vec<Article>,
    legal: Vec<LegalDocument>,
    default_language: String,
}

impl ContentLibrary {
    pub fn new(
        mut articles: Vec<Article>,
        legal: Vec<LegalDocument>,
        default_language: impl Into<String>,
    ) -> Self {
        sort_newest_first(&mut articles);
        Self {
            articles,
            legal,
            default_language: default_language.into(),
        }
    }

    pub async fn load(
        root: &Path,
        default_language: &str,
        renderer: &dyn RenderService,
    ) -> Result<Self, ContentError> {
        fs::metadata(root)
            .await
            .map_err(|err| ContentError::io(root, err))?;

        let articles = load_articles(&root.join(ARTICLES_DIR), renderer).await?;
        let legal = load_legal(&root.join(LEGAL_DIR), default_language, renderer).await?;

        info!(
            target = "quire::content",
            root = %root.display(),
            articles = articles.len(),
            legal_documents = legal.len(),
            "Loaded site content"
        );

        Ok(Self::new(articles, legal, default_language))
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Articles ordered newest first.
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn article(&self, slug: &str) -> Option<&Article> {
        self.articles.iter().find(|article| article.slug == slug)
    }

    pub fn articles_tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Article> {
        self.articles.iter().filter(move |article| article.has_tag(tag))
    }

    /// Tags with their article counts, ordered by tag.
    pub fn tags(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for article in &self.articles {
            for tag in &article.tags {
                *counts.entry(tag.as_str()).or_default() += 1;
            }
        }
        counts
            .into_iter()
            .map(|(tag, count)| (tag.to_string(), count))
            .collect()
    }

    pub fn legal_documents(&self) -> &[LegalDocument] {
        &self.legal
    }

    pub fn legal_document(&self, slug: &str) -> Option<&LegalDocument> {
        self.legal.iter().find(|document| document.slug == slug)
    }
}

async fn load_articles(
    dir: &Path,
    renderer: &dyn RenderService,
) -> Result<Vec<Article>, ContentError> {
    let mut articles = Vec::new();
    let mut seen = HashSet::new();

    for path in markdown_files(dir).await? {
        let source = fs::read_to_string(&path)
            .await
            .map_err(|err| ContentError::io(&path, err))?;
        let (meta, body): (ArticleFrontMatter, &str) =
            front_matter::parse(&source).map_err(|source| ContentError::FrontMatter {
                path: path.clone(),
                source,
            })?;

        if meta.draft {
            debug!(target = "quire::content", path = %path.display(), "Skipping draft");
            continue;
        }

        let slug = match meta.slug.as_deref() {
            Some(explicit) => derive_slug(explicit),
            None => derive_slug(&file_stem(&path)),
        }
        .map_err(|source| ContentError::Slug {
            path: path.clone(),
            source,
        })?;

        if !seen.insert(slug.clone()) {
            return Err(ContentError::DuplicateSlug {
                kind: "article",
                slug,
            });
        }

        let published = parse_date(&meta.date).ok_or_else(|| ContentError::InvalidDate {
            path: path.clone(),
            value: meta.date.clone(),
        })?;

        let tags = normalise_tags(&meta.tags).map_err(|source| ContentError::Slug {
            path: path.clone(),
            source,
        })?;

        let rendered = renderer.render(&RenderRequest::new(
            RenderTarget::Article { slug: slug.clone() },
            body,
        ));

        let article = Article::new(slug, meta.title, published)?
            .with_description(meta.description.unwrap_or_default())
            .with_tags(tags)
            .with_body(rendered.html, rendered.contains_code);
        articles.push(article);
    }

    Ok(articles)
}

async fn load_legal(
    dir: &Path,
    default_language: &str,
    renderer: &dyn RenderService,
) -> Result<Vec<LegalDocument>, ContentError> {
    let mut documents = Vec::new();

    for document_dir in subdirectories(dir).await? {
        let slug = derive_slug(&file_name(&document_dir)).map_err(|source| {
            ContentError::Slug {
                path: document_dir.clone(),
                source,
            }
        })?;
        if documents
            .iter()
            .any(|existing: &LegalDocument| existing.slug == slug)
        {
            return Err(ContentError::DuplicateSlug { kind: "legal", slug });
        }

        let mut variants = Vec::new();
        for path in markdown_files(&document_dir).await? {
            let language = file_stem(&path).to_ascii_lowercase();
            if !is_valid_language_code(&language) {
                return Err(ContentError::InvalidLanguage { path });
            }
            if variants
                .iter()
                .any(|variant: &LocalizedDocument| variant.language_code == language)
            {
                return Err(ContentError::DuplicateLanguage { path, language });
            }

            let source = fs::read_to_string(&path)
                .await
                .map_err(|err| ContentError::io(&path, err))?;
            let (meta, body): (LegalFrontMatter, &str) = front_matter::parse(&source)
                .map_err(|source| ContentError::FrontMatter {
                    path: path.clone(),
                    source,
                })?;

            let rendered = renderer.render(&RenderRequest::new(
                RenderTarget::LegalVariant {
                    slug: slug.clone(),
                    language: language.clone(),
                },
                body,
            ));
            variants.push(LocalizedDocument::new(language, meta.title, rendered.html));
        }

        if variants.is_empty() {
            warn!(
                target = "quire::content",
                path = %document_dir.display(),
                "Legal document directory has no variants, skipping"
            );
            continue;
        }

        order_variants(&mut variants, default_language);
        documents.push(LegalDocument::new(slug, DocumentSet::new(variants))?);
    }

    documents.sort_by(|a, b| a.slug.cmp(&b.slug));
    Ok(documents)
}

/// Default language first, the rest alphabetically.
fn order_variants(variants: &mut [LocalizedDocument], default_language: &str) {
    variants.sort_by(|a, b| {
        let a_default = a.language_code != default_language;
        let b_default = b.language_code != default_language;
        a_default
            .cmp(&b_default)
            .then_with(|| a.language_code.cmp(&b.language_code))
    });
}

fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).ok()
}

fn normalise_tags(tags: &[String]) -> Result<Vec<String>, SlugError> {
    let mut normalised: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let slug = derive_slug(tag)?;
        if !normalised.contains(&slug) {
            normalised.push(slug);
        }
    }
    Ok(normalised)
}

/// Markdown files directly inside `dir`, sorted by path. A missing directory is empty.
async fn markdown_files(dir: &Path) -> Result<Vec<PathBuf>, ContentError> {
    let mut files = Vec::new();
    for_each_entry(dir, |path, is_dir| {
        if !is_dir && path.extension().is_some_and(|ext| ext == MARKDOWN_EXTENSION) {
            files.push(path);
        }
    })
    .await?;
    files.sort();
    Ok(files)
}

async fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>, ContentError> {
    let mut dirs = Vec::new();
    for_each_entry(dir, |path, is_dir| {
        if is_dir {
            dirs.push(path);
        }
    })
    .await?;
    dirs.sort();
    Ok(dirs)
}

async fn for_each_entry<F>(dir: &Path, mut visit: F) -> Result<(), ContentError>
where
    F: FnMut(PathBuf, bool),
{
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(ContentError::io(dir, err)),
    };

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|err| ContentError::io(dir, err))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|err| ContentError::io(&entry.path(), err))?;
        visit(entry.path(), file_type.is_dir());
    }

    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::render::render_service;
    use time::macros::date;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
        std::fs::write(path, contents).expect("write fixture");
    }

    async fn load(root: &Path) -> Result<ContentLibrary, ContentError> {
        let renderer = render_service();
        ContentLibrary::load(root, "en", renderer.as_ref()).await
    }

    #[tokio::test]
    async fn loads_articles_newest_first_and_skips_drafts() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            dir.path(),
            "articles/Docker Basics.md",
            "+++\ntitle = \"Docker basics\"\ndate = \"2023-01-10\"\ntags = [\"Docker\", \"docker\"]\n+++\nBody",
        );
        write(
            dir.path(),
            "articles/k8s.md",
            "+++\ntitle = \"Kubernetes\"\ndate = \"2023-04-01\"\nslug = \"Intro to K8s\"\n+++\nBody",
        );
        write(
            dir.path(),
            "articles/wip.md",
            "+++\ntitle = \"WIP\"\ndate = \"2023-05-01\"\ndraft = true\n+++\n",
        );
        write(dir.path(), "articles/notes.txt", "ignored");

        let library = load(dir.path()).await.expect("content loads");

        let slugs: Vec<_> = library.articles().iter().map(|a| a.slug.as_str()).collect();
        assert_eq!(slugs, vec!["intro-to-k8s", "docker-basics"]);

        let docker = library.article("docker-basics").expect("article");
        assert_eq!(docker.published, date!(2023 - 01 - 10));
        assert_eq!(docker.tags, vec!["docker".to_string()]);
        assert_eq!(library.tags(), vec![("docker".to_string(), 1)]);
    }

    #[tokio::test]
    async fn article_code_flag_comes_from_the_renderer() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            dir.path(),
            "articles/pods.md",
            "+++\ntitle = \"Pods\"\ndate = \"2023-02-01\"\n+++\nRun `kubectl get pods`.",
        );
        write(
            dir.path(),
            "articles/prose.md",
            "+++\ntitle = \"Prose\"\ndate = \"2023-02-02\"\n+++\nNo code here.",
        );

        let library = load(dir.path()).await.expect("content loads");
        assert!(library.article("pods").expect("pods").contains_code);
        assert!(!library.article("prose").expect("prose").contains_code);
    }

    #[tokio::test]
    async fn loads_legal_variants_with_default_language_first() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "legal/imprint/de.md", "+++\ntitle = \"Impressum\"\n+++\nHallo");
        write(dir.path(), "legal/imprint/EN.md", "+++\ntitle = \"Imprint\"\n+++\nHello");
        write(dir.path(), "legal/imprint/fr.md", "+++\ntitle = \"Mentions\"\n+++\nBonjour");

        let library = load(dir.path()).await.expect("content loads");
        let imprint = library.legal_document("imprint").expect("imprint");

        assert_eq!(imprint.variants.language_codes(), vec!["en", "de", "fr"]);
        let first = imprint.variants.iter().next().expect("variant");
        assert_eq!(first.title, "Imprint");
        assert!(first.body.contains("Hello"));
    }

    #[tokio::test]
    async fn language_codes_differing_only_in_case_collide() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "legal/imprint/EN.md", "+++\ntitle = \"Imprint\"\n+++\nUpper");
        write(dir.path(), "legal/imprint/en.md", "+++\ntitle = \"Imprint\"\n+++\nLower");

        let err = load(dir.path()).await.unwrap_err();
        match err {
            ContentError::DuplicateLanguage { language, path } => {
                assert_eq!(language, "en");
                assert!(path.ends_with("legal/imprint/en.md"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_legal_directories_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("legal/privacy")).expect("dir");

        let library = load(dir.path()).await.expect("content loads");
        assert!(library.legal_documents().is_empty());
        assert!(library.articles().is_empty());
    }

    #[tokio::test]
    async fn missing_root_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load(&dir.path().join("absent")).await.unwrap_err();
        assert!(matches!(err, ContentError::Io { .. }));
    }

    #[tokio::test]
    async fn invalid_date_is_reported_with_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            dir.path(),
            "articles/bad.md",
            "+++\ntitle = \"Bad\"\ndate = \"01.02.2023\"\n+++\n",
        );

        let err = load(dir.path()).await.unwrap_err();
        match err {
            ContentError::InvalidDate { value, path } => {
                assert_eq!(value, "01.02.2023");
                assert!(path.ends_with("articles/bad.md"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn duplicate_article_slugs_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            dir.path(),
            "articles/a.md",
            "+++\ntitle = \"A\"\ndate = \"2023-01-01\"\nslug = \"same\"\n+++\n",
        );
        write(
            dir.path(),
            "articles/b.md",
            "+++\ntitle = \"B\"\ndate = \"2023-01-02\"\nslug = \"same\"\n+++\n",
        );

        let err = load(dir.path()).await.unwrap_err();
        assert!(matches!(err, ContentError::DuplicateSlug { kind: "article", .. }));
    }

    #[tokio::test]
    async fn legal_files_must_be_named_by_language() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            dir.path(),
            "legal/privacy/en_US.md",
            "+++\ntitle = \"Privacy\"\n+++\n",
        );

        let err = load(dir.path()).await.unwrap_err();
        assert!(matches!(err, ContentError::InvalidLanguage { .. }));
    }

    #[test]
    fn tags_are_counted_across_articles() {
        let library = ContentLibrary::new(
            vec![
                Article::new("a", "A", date!(2023 - 01 - 01))
                    .unwrap()
                    .with_tags(vec!["docker".into(), "nestjs".into()]),
                Article::new("b", "B", date!(2023 - 01 - 02))
                    .unwrap()
                    .with_tags(vec!["docker".into()]),
            ],
            Vec::new(),
            "en",
        );

        assert_eq!(
            library.tags(),
            vec![("docker".to_string(), 2), ("nestjs".to_string(), 1)]
        );
        assert_eq!(library.articles_tagged("nestjs").count(), 1);
        assert_eq!(library.articles()[0].slug, "b");
    }
}
