//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small directory site and drive the full
//! crawl, from the index page to the CSV file, through the real HTTP fetcher.

use dcmap_crawler::config::Config;
use dcmap_crawler::crawler::run_crawl;
use dcmap_crawler::{CrawlError, Level};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock server's `/usa/` index
fn create_test_config(server: &MockServer, dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.crawler.root_url = format!("{}/usa/", server.uri());
    config.crawler.request_timeout_secs = 5;
    config.crawler.max_retries = 1;
    config.crawler.retry_delay_ms = 10;
    config.output.csv_path = csv_path(dir).to_string_lossy().into_owned();
    config
}

fn csv_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("out").join("datacenters.csv")
}

fn html(json_ld: &str, body: &str) -> String {
    format!(
        r#"<html><head><script type="application/ld+json">{}</script></head><body>{}</body></html>"#,
        json_ld, body
    )
}

/// Index page whose JSON-LD only links to state pages
fn index_page(base: &str) -> String {
    html(
        &format!(
            r#"{{"@context": "https://schema.org", "@graph": [
                {{"@type": "SiteNavigationElement", "name": "California", "url": "{base}/usa/california/"}},
                {{"@type": "SiteNavigationElement", "name": "Texas", "url": "{base}/usa/texas/"}}
            ]}}"#
        ),
        "",
    )
}

/// Page listing exactly one entity
fn listing_page(name: &str, url: &str) -> String {
    html(
        &format!(
            r#"{{"@type": "ItemList", "itemListElement": [
                {{"@type": "ListItem", "position": 1, "item": {{"@type": "Place", "name": "{name}", "url": "{url}"}}}}
            ]}}"#
        ),
        "",
    )
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
        .expect(1)
        .mount(server)
        .await;
}

/// Mounts the index and the California subtree; Texas is left to each test
async fn mount_site(server: &MockServer) {
    let base = server.uri();
    mount_page(server, "/usa/", index_page(&base)).await;
    mount_page(
        server,
        "/usa/california/",
        listing_page("Los Angeles", &format!("{base}/usa/california/los-angeles/")),
    )
    .await;
    mount_page(
        server,
        "/usa/california/los-angeles/",
        listing_page(
            "One Wilshire",
            &format!("{base}/usa/california/los-angeles/one-wilshire/"),
        ),
    )
    .await;
}

async fn mount_texas(server: &MockServer) {
    let base = server.uri();
    mount_page(
        server,
        "/usa/texas/",
        listing_page("Dallas", &format!("{base}/usa/texas/dallas/")),
    )
    .await;
    mount_page(
        server,
        "/usa/texas/dallas/",
        listing_page("Infomart", &format!("{base}/usa/texas/dallas/infomart/")),
    )
    .await;
}

/// (name, level) of every CSV row, in file order
fn read_rows(path: &Path) -> Vec<(String, String)> {
    let mut reader = csv::Reader::from_path(path).expect("CSV should exist");
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["name", "source_url", "level", "address", "city", "state", "postal_code"]
    );

    reader
        .records()
        .map(|row| {
            let row = row.unwrap();
            (row[0].to_string(), row[2].to_string())
        })
        .collect()
}

fn rows(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(name, level)| (name.to_string(), level.to_string()))
        .collect()
}

#[tokio::test]
async fn test_full_crawl_two_states() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_site(&server).await;
    mount_texas(&server).await;

    let config = create_test_config(&server, &dir);
    let outcome = run_crawl(config, CancellationToken::new()).await.unwrap();

    assert_eq!(
        read_rows(&csv_path(&dir)),
        rows(&[
            ("Los Angeles", "state"),
            ("One Wilshire", "city"),
            ("Dallas", "state"),
            ("Infomart", "city"),
        ])
    );
    assert_eq!(outcome.summary.pages_visited(), 5);
    assert_eq!(outcome.summary.pages_skipped(), 0);
    assert_eq!(outcome.summary.tier(Level::City).records_extracted, 2);
    assert!(!outcome.summary.cancelled);
}

#[tokio::test]
async fn test_state_failure_skips_subtree_only() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_site(&server).await;

    // One attempt plus one retry
    Mock::given(method("GET"))
        .and(path("/usa/texas/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/usa/texas/dallas/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, &dir);
    let outcome = run_crawl(config, CancellationToken::new()).await.unwrap();

    assert_eq!(
        read_rows(&csv_path(&dir)),
        rows(&[("Los Angeles", "state"), ("One Wilshire", "city")])
    );
    assert_eq!(outcome.summary.tier(Level::State).pages_skipped, 1);
}

#[tokio::test]
async fn test_denied_state_is_not_retried() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_site(&server).await;

    Mock::given(method("GET"))
        .and(path("/usa/texas/"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, &dir);
    let outcome = run_crawl(config, CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.summary.pages_skipped(), 1);
}

#[tokio::test]
async fn test_index_denied_is_fatal_and_writes_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/usa/"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, &dir);
    let result = run_crawl(config, CancellationToken::new()).await;

    assert!(matches!(result, Err(CrawlError::IndexUnavailable { .. })));
    assert!(!csv_path(&dir).exists());
}

#[tokio::test]
async fn test_heuristic_fallback_on_plain_markup() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let base = server.uri();

    mount_page(
        &server,
        "/usa/",
        format!(
            r#"<html><body><nav><a href="/">Home</a></nav>
            <ul><li><a href="{base}/usa/ohio/">Ohio</a></li></ul></body></html>"#
        ),
    )
    .await;
    mount_page(
        &server,
        "/usa/ohio/",
        r#"<html><body><ul>
            <li><a href="/usa/ohio/columbus/">Columbus</a></li>
            <li><a href="/usa/ohio/columbus/">more</a></li>
        </ul></body></html>"#
            .to_string(),
    )
    .await;
    mount_page(
        &server,
        "/usa/ohio/columbus/",
        r#"<html><body><div class="listing">
            <a href="/usa/ohio/columbus/cologix-col1/">Cologix COL1</a>
            <span class="address">555 Scherers Ct</span>
        </div></body></html>"#
            .to_string(),
    )
    .await;

    let config = create_test_config(&server, &dir);
    let outcome = run_crawl(config, CancellationToken::new()).await.unwrap();

    assert_eq!(
        read_rows(&csv_path(&dir)),
        rows(&[
            ("Ohio", "index"),
            ("Columbus", "state"),
            ("Cologix COL1", "city"),
        ])
    );
    let cologix = &outcome.records[2];
    assert_eq!(cologix.address.as_deref(), Some("555 Scherers Ct"));
    assert_eq!(cologix.state.as_deref(), Some("Ohio"));
    assert_eq!(cologix.city.as_deref(), Some("Columbus"));
    assert_eq!(outcome.summary.tier(Level::City).heuristic_pages, 1);
}

#[tokio::test]
async fn test_html_dump_written() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_site(&server).await;
    mount_texas(&server).await;

    let dump_path = dir.path().join("pages.html");
    let mut config = create_test_config(&server, &dir);
    config.output.dump_html_path = Some(dump_path.to_string_lossy().into_owned());

    run_crawl(config, CancellationToken::new()).await.unwrap();

    let dump = std::fs::read_to_string(&dump_path).unwrap();
    assert_eq!(dump.matches("<!-- dcmap-crawler:").count(), 5);
    assert!(dump.starts_with(&format!("<!-- dcmap-crawler: index {}/usa/ -->", server.uri())));
    assert!(dump.contains("One Wilshire"));
}

#[tokio::test]
async fn test_empty_site_still_writes_header() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_page(&server, "/usa/", "<html><body><p>Nothing here</p></body></html>".to_string()).await;

    let config = create_test_config(&server, &dir);
    let outcome = run_crawl(config, CancellationToken::new()).await.unwrap();

    assert!(outcome.records.is_empty());
    assert!(read_rows(&csv_path(&dir)).is_empty());
}

#[tokio::test]
async fn test_unwritable_output_is_fatal() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_page(&server, "/usa/", "<html><body><p>Nothing here</p></body></html>".to_string()).await;

    // The CSV path names an existing directory
    let mut config = create_test_config(&server, &dir);
    config.output.csv_path = dir.path().to_string_lossy().into_owned();

    let result = run_crawl(config, CancellationToken::new()).await;

    assert!(matches!(result, Err(CrawlError::Output(_))));
}

#[tokio::test]
async fn test_crawl_timeout_keeps_partial_results() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let base = server.uri();

    // The city below California is never requested once the deadline fires
    mount_page(&server, "/usa/", index_page(&base)).await;
    mount_page(
        &server,
        "/usa/california/",
        listing_page("Los Angeles", &format!("{base}/usa/california/los-angeles/")),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/usa/texas/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html></html>", "text/html")
                .set_delay(Duration::from_secs(4)),
        )
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, &dir);
    config.crawler.crawl_timeout_secs = Some(1);

    let outcome = run_crawl(config, CancellationToken::new()).await.unwrap();

    assert!(outcome.summary.cancelled);
    assert_eq!(
        read_rows(&csv_path(&dir)),
        rows(&[("Los Angeles", "state")])
    );
}
