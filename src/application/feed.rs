use std::sync::Arc;

use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::application::content::ContentLibrary;
use crate::domain::articles::Article;
use crate::presentation::views::{
    ArticleCard, ArticleDetailContext, IndexContext, TagSummary, build_tag_badges, title_case,
};

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const DISPLAY_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedFilter {
    All,
    Tag(String),
}

/// Article listings and detail pages.
#[derive(Clone)]
pub struct FeedService {
    library: Arc<ContentLibrary>,
}

impl FeedService {
    pub fn new(library: Arc<ContentLibrary>) -> Self {
        Self { library }
    }

    pub fn is_known_tag(&self, tag: &str) -> bool {
        self.library.tags().iter().any(|(known, _)| known == tag)
    }

    /// Listing for `filter`; `None` when the tag is unknown.
    pub fn index_context(&self, filter: &FeedFilter) -> Option<IndexContext> {
        let (heading, articles): (String, Vec<&Article>) = match filter {
            FeedFilter::All => (
                "Latest articles".to_string(),
                self.library.articles().iter().collect(),
            ),
            FeedFilter::Tag(tag) => {
                if !self.is_known_tag(tag) {
                    return None;
                }
                (
                    format!("Tagged #{}", title_case(tag)),
                    self.library.articles_tagged(tag).collect(),
                )
            }
        };

        let active_tag = match filter {
            FeedFilter::Tag(tag) => Some(tag.as_str()),
            FeedFilter::All => None,
        };
        let tags = self
            .library
            .tags()
            .into_iter()
            .map(|(tag, count)| TagSummary {
                label: title_case(&tag),
                href: format!("/tags/{tag}"),
                count,
                is_active: active_tag == Some(tag.as_str()),
            })
            .collect();

        let cards: Vec<ArticleCard> = articles.into_iter().map(article_card).collect();
        Some(IndexContext {
            heading,
            has_results: !cards.is_empty(),
            articles: cards,
            tags,
        })
    }

    pub fn article_context(&self, slug: &str) -> Option<ArticleDetailContext> {
        let article = self.library.article(slug)?;
        let (iso_date, published) = format_dates(article.published);
        Some(ArticleDetailContext {
            title: article.title.clone(),
            description: article.description.clone(),
            published,
            iso_date,
            badges: build_tag_badges(&article.tags),
            contains_code: article.contains_code,
            body_html: article.body_html.clone(),
        })
    }
}

fn article_card(article: &Article) -> ArticleCard {
    let (iso_date, published) = format_dates(article.published);
    ArticleCard {
        href: format!("/articles/{}", article.slug),
        title: article.title.clone(),
        description: article.description.clone(),
        iso_date,
        published,
        badges: build_tag_badges(&article.tags),
    }
}

fn format_dates(date: Date) -> (String, String) {
    let iso = date.format(ISO_DATE).unwrap_or_default();
    let display = date.format(DISPLAY_DATE).unwrap_or_else(|_| iso.clone());
    (iso, display)
}
