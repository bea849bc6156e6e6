use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;

use crate::{
    application::{feed::FeedFilter, legal::LanguageLinks, site::SitePages},
    infra::assets,
    presentation::views::{render_not_found_response, render_template_response},
};

use super::middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub pages: Arc<SitePages>,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/tags/{tag}", get(tag_index))
        .route("/articles/{slug}", get(article_detail))
        .route("/legal/{slug}", get(legal_page))
        .route("/static/{*path}", get(assets::serve_static))
        .route("/_health", get(health))
        .fallback(fallback)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LanguageQuery {
    lang: Option<String>,
}

async fn index(State(state): State<HttpState>) -> Response {
    match state.pages.index(FeedFilter::All) {
        Some(template) => render_template_response(template, StatusCode::OK),
        None => not_found(&state),
    }
}

async fn tag_index(State(state): State<HttpState>, Path(tag): Path<String>) -> Response {
    match state.pages.index(FeedFilter::Tag(tag)) {
        Some(template) => render_template_response(template, StatusCode::OK),
        None => not_found(&state),
    }
}

async fn article_detail(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    match state.pages.article(&slug) {
        Some(template) => render_template_response(template, StatusCode::OK),
        None => not_found(&state),
    }
}

async fn legal_page(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> Response {
    match state
        .pages
        .legal(&slug, query.lang.as_deref(), LanguageLinks::Query)
    {
        Some(template) => render_template_response(template, StatusCode::OK),
        None => not_found(&state),
    }
}

async fn health() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

async fn fallback(State(state): State<HttpState>) -> Response {
    not_found(&state)
}

fn not_found(state: &HttpState) -> Response {
    render_not_found_response(state.pages.chrome().load())
}
