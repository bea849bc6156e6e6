use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use quire::application::content::ContentLibrary;
use quire::application::site::SitePages;
use quire::config::SiteSettings;
use quire::domain::articles::Article;
use quire::domain::documents::{DocumentSet, LegalDocument, LocalizedDocument};
use quire::infra::http::{HttpState, RequestContext, build_router};
use time::macros::date;
use tower::ServiceExt;

fn router() -> Router {
    let article = Article::new(
        "compose-healthchecks",
        "Compose healthchecks",
        date!(2024 - 03 - 09),
    )
    .expect("valid article")
    .with_description("Waiting for dependencies properly.")
    .with_tags(vec!["docker".to_string()])
    .with_body("<p>Use depends_on with condition.</p>", false);

    let imprint = LegalDocument::new(
        "imprint",
        DocumentSet::new(vec![
            LocalizedDocument::new("en", "Imprint", "<p>Operated by Jane Doe.</p>"),
            LocalizedDocument::new("de", "Impressum", "<p>Betrieben von Jane Doe.</p>"),
        ]),
    )
    .expect("imprint has variants");

    let library = ContentLibrary::new(vec![article], vec![imprint], "en");
    let pages = SitePages::new(SiteSettings::default(), Arc::new(library));
    build_router(HttpState {
        pages: Arc::new(pages),
    })
}

async fn get(uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    let response = router()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

#[tokio::test]
async fn legal_page_defaults_to_site_language() {
    let (status, body) = get("/legal/imprint").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Operated by Jane Doe."));
    assert!(!body.contains("Betrieben von Jane Doe."));
    assert!(body.contains(r#"hreflang="en" class="is-active""#));
    assert!(body.contains(r#"hreflang="de""#));
}

#[tokio::test]
async fn legal_page_switches_language_from_query() {
    let (status, body) = get("/legal/imprint?lang=de").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Betrieben von Jane Doe."));
    assert!(!body.contains("Operated by Jane Doe."));
    assert!(body.contains(r#"hreflang="de" class="is-active""#));
}

#[tokio::test]
async fn legal_page_without_variant_renders_empty_body() {
    let (status, body) = get("/legal/imprint?lang=fr").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("Operated by Jane Doe."));
    assert!(!body.contains("Betrieben von Jane Doe."));
    assert!(!body.contains("is-active"));
    assert!(body.contains(r#"hreflang="en""#));
    assert!(body.contains(r#"hreflang="de""#));
}

#[tokio::test]
async fn unknown_legal_page_is_not_found() {
    let (status, body) = get("/legal/terms").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Page Not Found"));
}

#[tokio::test]
async fn footer_links_to_legal_pages() {
    let (_, body) = get("/").await;
    assert!(body.contains(r#"href="/legal/imprint""#));
}

#[tokio::test]
async fn index_and_article_pages_render() {
    let (status, body) = get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Compose healthchecks"));

    let (status, body) = get("/articles/compose-healthchecks").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Use depends_on with condition."));
    assert!(body.contains("March 9, 2024"));

    let (status, _) = get("/articles/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tag_pages_filter_articles() {
    let (status, body) = get("/tags/docker").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Compose healthchecks"));

    let (status, _) = get("/tags/kubernetes").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn static_assets_and_health_are_served() {
    let request = Request::builder()
        .uri("/static/site.css")
        .body(Body::empty())
        .expect("request should build");
    let response = router().oneshot(request).await.expect("router should respond");
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/css"));

    let (status, _) = get("/_health").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn unmatched_routes_fall_back_to_not_found_page() {
    let request = Request::builder()
        .uri("/nope/at/all")
        .body(Body::empty())
        .expect("request should build");
    let response = router().oneshot(request).await.expect("router should respond");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.extensions().get::<RequestContext>().is_some());
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn incoming_request_id_is_echoed() {
    let request = Request::builder()
        .uri("/legal/imprint")
        .header("x-request-id", "trace-abc")
        .body(Body::empty())
        .expect("request should build");
    let response = router().oneshot(request).await.expect("router should respond");
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok()),
        Some("trace-abc")
    );
}
