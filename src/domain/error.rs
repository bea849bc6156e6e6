use thiserror::Error;

/// Content that cannot be turned into a publishable domain value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("article `{slug}` has an empty title")]
    EmptyTitle { slug: String },
    #[error("legal document `{slug}` has no language variants")]
    NoVariants { slug: String },
}
