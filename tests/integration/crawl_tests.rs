//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use sitemap_digest::config::{Config, CrawlerConfig, UserAgentConfig};
use sitemap_digest::crawler::{
    build_http_client, crawl, decode_urlset, resolve_sitemap, Coordinator, Fetcher, RetryPolicy,
};
use sitemap_digest::DigestError;
use std::io::Read;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A fetcher with the default attempt count but millisecond backoff
fn fast_fetcher() -> Fetcher {
    let client = build_http_client(&UserAgentConfig::default(), &CrawlerConfig::default())
        .expect("Failed to build client");
    Fetcher::new(
        client,
        RetryPolicy {
            max_retries: 3,
            min_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
        },
    )
}

fn coordinator(config: Config) -> Coordinator {
    Coordinator::with_fetcher(config, fast_fetcher())
}

fn post_page(title: &str) -> String {
    format!(
        r#"<html><head><title>Blog: {title}</title></head><body>
        <div class="post"><h3 class="post-title entry-title" itemprop="name">
{title}
</h3><div class="post-body">Body</div></div></body></html>"#
    )
}

fn urlset(entries: &[(String, &str)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#,
    );
    for (loc, lastmod) in entries {
        xml.push_str(&format!(
            "<url><loc>{}</loc><lastmod>{}</lastmod></url>",
            loc, lastmod
        ));
    }
    xml.push_str("</urlset>");
    xml
}

async fn mount_xml(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "application/xml"),
        )
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, route: &str, title: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(post_page(title))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_urlset_end_to_end() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let a = format!("{}/a.html", base_url);
    let b = format!("{}/b.html", base_url);
    mount_xml(
        &mock_server,
        "/sitemap.xml",
        urlset(&[(a.clone(), "2024-01-02"), (b.clone(), "2024-01-01")]),
    )
    .await;
    mount_page(&mock_server, "/a.html", "A").await;
    mount_page(&mock_server, "/b.html", "B").await;

    let report = coordinator(Config::default())
        .crawl_site(&base_url)
        .await
        .expect("Crawl failed");

    assert_eq!(
        report.render(),
        format!(
            "<ol>\n<li><a href=\"{}\">B</a></li>\n<li><a href=\"{}\">A</a></li>\n</ol>",
            b, a
        )
    );
    assert_eq!(report.statistics.pages_listed, 2);
    assert_eq!(report.statistics.pages_fetched, 2);
    assert_eq!(report.statistics.titles_found, 2);
    assert!(report.archive.is_none());
}

#[tokio::test]
async fn test_trailing_slash_site_url() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let a = format!("{}/a.html", base_url);
    mount_xml(&mock_server, "/sitemap.xml", urlset(&[(a, "2024-01-01")])).await;
    mount_page(&mock_server, "/a.html", "A").await;

    let report = coordinator(Config::default())
        .crawl_site(&format!("{}/", base_url))
        .await
        .expect("Crawl failed");

    assert_eq!(report.batch.len(), 1);
    assert_eq!(report.batch[0].title, "A");
}

#[tokio::test]
async fn test_equal_lastmod_keeps_decode_order() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let entries: Vec<(String, &str)> = ["x", "y", "z", "x"]
        .iter()
        .map(|name| (format!("{}/{}.html", base_url, name), "2024-05-05"))
        .collect();
    mount_xml(&mock_server, "/sitemap.xml", urlset(&entries)).await;
    for name in ["x", "y", "z"] {
        mount_page(&mock_server, &format!("/{}.html", name), &name.to_uppercase()).await;
    }

    let report = coordinator(Config::default())
        .crawl_site(&base_url)
        .await
        .expect("Crawl failed");

    let titles: Vec<_> = report.batch.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["X", "Y", "Z", "X"]);
}

#[tokio::test]
async fn test_sitemap_index_flattening_preserves_child_order() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let child_a = urlset(&[
        (format!("{}/a1.html", base_url), "2024-03-01"),
        (format!("{}/a2.html", base_url), "2024-01-01"),
    ]);
    let child_b = urlset(&[(format!("{}/b1.html", base_url), "2024-02-01")]);
    mount_xml(&mock_server, "/sitemap-a.xml", child_a.clone()).await;
    mount_xml(&mock_server, "/sitemap-b.xml", child_b.clone()).await;
    mount_xml(
        &mock_server,
        "/sitemap.xml",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>{base}/sitemap-a.xml</loc></sitemap>
  <sitemap><loc>{base}/sitemap-b.xml</loc></sitemap>
</sitemapindex>"#,
            base = base_url
        ),
    )
    .await;

    let batch = resolve_sitemap(&fast_fetcher(), &base_url)
        .await
        .expect("Resolve failed");

    let mut expected = decode_urlset("a", child_a.as_bytes()).unwrap();
    expected.extend(decode_urlset("b", child_b.as_bytes()).unwrap());
    assert_eq!(batch, expected);
}

#[tokio::test]
async fn test_single_child_index_matches_direct_sitemap() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let child = urlset(&[(format!("{}/only.html", base_url), "2024-01-01")]);
    mount_xml(&mock_server, "/posts.xml", child.clone()).await;
    mount_xml(
        &mock_server,
        "/sitemap.xml",
        format!(
            "<sitemapindex><sitemap><loc>{}/posts.xml</loc></sitemap></sitemapindex>",
            base_url
        ),
    )
    .await;
    mount_page(&mock_server, "/only.html", "Only").await;

    let report = coordinator(Config::default())
        .crawl_site(&base_url)
        .await
        .expect("Crawl failed");

    let mut expected = decode_urlset("child", child.as_bytes()).unwrap();
    expected[0].title = "Only".to_string();
    assert_eq!(report.batch, expected);
}

#[tokio::test]
async fn test_malformed_sitemap_is_fatal() {
    let mock_server = MockServer::start().await;
    mount_xml(
        &mock_server,
        "/sitemap.xml",
        "<urlset><url><loc>oops</url>".to_string(),
    )
    .await;

    let result = coordinator(Config::default())
        .crawl_site(&mock_server.uri())
        .await;

    assert!(matches!(result, Err(DigestError::Sitemap { .. })));
}

#[tokio::test]
async fn test_missing_sitemap_is_fatal() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string("<html><body>Not Found</body></html>"),
        )
        .expect(4)
        .mount(&mock_server)
        .await;

    let result = coordinator(Config::default())
        .crawl_site(&mock_server.uri())
        .await;

    assert!(matches!(result, Err(DigestError::Sitemap { .. })));
}

#[tokio::test]
async fn test_retry_bound_returns_last_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky.html"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(4)
        .mount(&mock_server)
        .await;

    // Default policy: 3 retries, backoff drawn from [300ms, 1300ms)
    let fetcher = Fetcher::from_config(&Config::default()).expect("Failed to build fetcher");
    let started = Instant::now();
    let result = fetcher
        .fetch(&format!("{}/flaky.html", mock_server.uri()))
        .await
        .expect("Fetch should not fail on error status");
    let elapsed = started.elapsed();

    assert_eq!(result.attempts, 4);
    assert_eq!(result.status.as_u16(), 503);
    assert!(!result.is_success());
    assert_eq!(result.body, b"unavailable");
    assert!(elapsed >= Duration::from_millis(900), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(10), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn test_retry_recovers_after_transient_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page.html"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/page.html", "Recovered").await;

    let result = fast_fetcher()
        .fetch(&format!("{}/page.html", mock_server.uri()))
        .await
        .expect("Fetch failed");

    assert_eq!(result.attempts, 3);
    assert!(result.is_success());
}

#[tokio::test]
async fn test_transport_error_is_fatal() {
    // Nothing listens on port 1
    let result = fast_fetcher().fetch("http://127.0.0.1:1/page.html").await;
    assert!(matches!(result, Err(DigestError::Http { .. })));
}

#[tokio::test]
async fn test_error_page_yields_empty_title() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let ok = format!("{}/ok.html", base_url);
    let gone = format!("{}/gone.html", base_url);
    mount_xml(
        &mock_server,
        "/sitemap.xml",
        urlset(&[(ok, "2024-01-01"), (gone, "2024-01-02")]),
    )
    .await;
    mount_page(&mock_server, "/ok.html", "Ok").await;
    Mock::given(method("GET"))
        .and(path("/gone.html"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<h1>Not Found</h1>"))
        .expect(4)
        .mount(&mock_server)
        .await;

    let report = coordinator(Config::default())
        .crawl_site(&base_url)
        .await
        .expect("Crawl should tolerate error pages");

    assert_eq!(report.batch[0].title, "Ok");
    assert_eq!(report.batch[1].title, "");
    assert_eq!(report.statistics.pages_degraded, 1);
}

#[tokio::test]
async fn test_unreachable_page_aborts_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_xml(
        &mock_server,
        "/sitemap.xml",
        urlset(&[
            (format!("{}/a.html", base_url), "2024-01-01"),
            ("http://127.0.0.1:1/dead.html".to_string(), "2024-01-02"),
        ]),
    )
    .await;
    mount_page(&mock_server, "/a.html", "A").await;

    let result = coordinator(Config::default()).crawl_site(&base_url).await;
    assert!(matches!(result, Err(DigestError::Http { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_ceiling() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let entries: Vec<(String, &str)> = (0..25)
        .map(|i| (format!("{}/p{}.html", base_url, i), "2024-01-01"))
        .collect();
    mount_xml(&mock_server, "/sitemap.xml", urlset(&entries)).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/p\d+\.html$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(post_page("Slow"))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&mock_server)
        .await;

    let report = coordinator(Config::default())
        .crawl_site(&base_url)
        .await
        .expect("Crawl failed");

    assert_eq!(report.statistics.pages_fetched, 25);
    assert_eq!(report.statistics.titles_found, 25);
    assert!(
        report.statistics.peak_in_flight <= 10,
        "peak was {}",
        report.statistics.peak_in_flight
    );
    assert!(report.statistics.peak_in_flight > 1);
}

#[tokio::test]
async fn test_backup_and_archive() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let backup_root = tempfile::tempdir().expect("Failed to create temp dir");

    let a = format!("{}/2024/01/a.html", base_url);
    let about = format!("{}/about", base_url);
    mount_xml(
        &mock_server,
        "/sitemap.xml",
        urlset(&[(a.clone(), "2024-01-01"), (about.clone(), "2024-01-02")]),
    )
    .await;
    mount_page(&mock_server, "/2024/01/a.html", "A").await;
    mount_page(&mock_server, "/about", "About").await;

    let mut config = Config::default();
    config.backup.path = Some(backup_root.path().to_string_lossy().into_owned());

    let report = coordinator(config)
        .crawl_site(&base_url)
        .await
        .expect("Crawl failed");

    assert_eq!(report.statistics.pages_backed_up, 1);

    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    let site_dir = backup_root.path().join("127.0.0.1").join(&date);
    let page_name = a.replace("://", "").replace('/', "_");

    let written = std::fs::read(site_dir.join(&page_name)).expect("Backup file missing");
    assert_eq!(written, post_page("A").into_bytes());
    assert!(!site_dir.join(about.replace("://", "").replace('/', "_")).exists());

    let archive_path = report.archive.expect("Archive missing");
    assert_eq!(
        archive_path,
        site_dir.join(format!("{}_127_0_0_1_archive.zip", date))
    );

    let mut archive =
        zip::ZipArchive::new(std::fs::File::open(&archive_path).unwrap()).unwrap();
    assert_eq!(archive.len(), 1);
    let mut content = String::new();
    archive
        .by_name(&page_name)
        .expect("Archive entry missing")
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, post_page("A"));
}

#[tokio::test]
async fn test_no_archive_without_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let backup_root = tempfile::tempdir().expect("Failed to create temp dir");

    mount_xml(
        &mock_server,
        "/sitemap.xml",
        urlset(&[(format!("{}/about", base_url), "2024-01-01")]),
    )
    .await;
    mount_page(&mock_server, "/about", "About").await;

    let mut config = Config::default();
    config.backup.path = Some(backup_root.path().to_string_lossy().into_owned());

    let report = coordinator(config)
        .crawl_site(&base_url)
        .await
        .expect("Crawl failed");

    assert!(report.archive.is_none());
    assert_eq!(report.statistics.pages_backed_up, 0);
}

#[tokio::test]
async fn test_crawl_multiple_sites() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    for server in [&first, &second] {
        let base_url = server.uri();
        mount_xml(
            server,
            "/sitemap.xml",
            urlset(&[(format!("{}/a.html", base_url), "2024-01-01")]),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/a.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(post_page("A")))
            .expect(1)
            .mount(server)
            .await;
    }

    let mut config = Config::default();
    config.sites = vec![first.uri(), second.uri()];

    crawl(config).await.expect("Crawl failed");
}
