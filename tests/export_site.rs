use std::{fs, path::Path, sync::Arc};

use quire::application::content::ContentLibrary;
use quire::application::render::render_service;
use quire::application::site::{SitePages, export_site};
use quire::config::SiteSettings;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("parent dir")).expect("create dirs");
    fs::write(path, contents).expect("write fixture");
}

fn seed_content(root: &Path) {
    write(
        root,
        "articles/k8s-probes.md",
        "+++\ntitle = \"Kubernetes probes\"\ndate = \"2023-04-01\"\ntags = [\"kubernetes\"]\n+++\n\nLiveness is not readiness.\n",
    );
    write(
        root,
        "articles/unfinished.md",
        "+++\ntitle = \"Unfinished\"\ndate = \"2023-05-01\"\ndraft = true\n+++\n\nNot yet.\n",
    );
    write(
        root,
        "legal/imprint/en.md",
        "+++\ntitle = \"Imprint\"\n+++\n\nResponsible for this site: Jane Doe.\n",
    );
    write(
        root,
        "legal/imprint/de.md",
        "+++\ntitle = \"Impressum\"\n+++\n\nVerantwortlich: Jane Doe.\n",
    );
    write(
        root,
        "legal/privacy/en.md",
        "+++\ntitle = \"Privacy Policy\"\n+++\n\nNo cookies are set.\n",
    );
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative))
        .unwrap_or_else(|err| panic!("expected {relative} to exist: {err}"))
}

#[tokio::test]
async fn export_writes_every_page_and_language_variant() {
    let content = tempfile::tempdir().expect("content dir");
    let output = tempfile::tempdir().expect("output dir");
    seed_content(content.path());

    let renderer = render_service();
    let library = ContentLibrary::load(content.path(), "en", renderer.as_ref())
        .await
        .expect("content should load");
    let pages = SitePages::new(SiteSettings::default(), Arc::new(library));

    let summary = export_site(&pages, output.path())
        .await
        .expect("export should succeed");

    let out = output.path();
    assert!(read(out, "index.html").contains("Kubernetes probes"));
    assert!(!read(out, "index.html").contains("Unfinished"));
    assert!(read(out, "tags/kubernetes/index.html").contains("Kubernetes probes"));
    assert!(read(out, "articles/k8s-probes/index.html").contains("Liveness is not readiness."));
    assert!(!out.join("articles/unfinished/index.html").exists());

    let imprint = read(out, "legal/imprint/index.html");
    assert!(imprint.contains("Responsible for this site"));
    assert!(imprint.contains(r#"href="/legal/imprint/de/""#));

    let impressum = read(out, "legal/imprint/de/index.html");
    assert!(impressum.contains("Verantwortlich"));
    assert!(!impressum.contains("Responsible for this site"));

    assert!(read(out, "legal/imprint/en/index.html").contains("Responsible for this site"));
    assert!(read(out, "legal/privacy/index.html").contains("No cookies are set."));
    assert!(!out.join("legal/privacy/de/index.html").exists());

    assert!(read(out, "404.html").contains("Page Not Found"));
    assert!(out.join("static/site.css").exists());

    // index, one tag, one article, imprint (root + 2 variants), privacy (root + 1), 404
    assert_eq!(summary.pages, 9);
    assert!(summary.assets >= 1);
}
