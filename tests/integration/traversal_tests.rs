//! Integration tests for catalogue traversal
//!
//! These tests use wiremock to serve catalogue pages and run the full
//! fetch, extract and store cycle end-to-end.

use catalogue_scraper::config::{Config, OutputConfig, ScraperConfig, UserAgentConfig};
use catalogue_scraper::crawler::matcher::{Both, ClassPattern, Tag};
use catalogue_scraper::crawler::{traverse, Coordinator, Extractor, Heuristics, TransportError};
use catalogue_scraper::product::{ContentId, IdentityScheme, ProductRecord, StoredRecord};
use catalogue_scraper::storage::{
    ProductStore, RunRecord, RunStatus, RunTotals, SqliteStorage, StorageError, StorageResult,
    UpsertOutcome,
};
use catalogue_scraper::ScrapeError;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for the catalogue at `{server}/shop`
fn create_test_config(base_url: &str, num_pages: u32, db_path: &str) -> Config {
    Config {
        scraper: ScraperConfig {
            base_url: base_url.to_string(),
            num_pages,
            proxy: None,
            max_concurrent_pages: 1,
            request_timeout_secs: 5,
            connect_timeout_secs: 2,
            preflight: true,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: Some("test@example.com".to_string()),
        },
        output: OutputConfig {
            database_path: db_path.to_string(),
            identity_scheme: IdentityScheme::default(),
        },
    }
}

/// Renders a catalogue page with one product card per `(title, price)` pair
fn catalogue_page(products: &[(&str, &str)]) -> String {
    let cards: String = products
        .iter()
        .map(|(title, price)| {
            format!(
                r#"<div class="product-card">
                    <h2 class="product-title">{title}</h2>
                    <span class="price">{price}</span>
                    <del>$999</del>
                    <img src="/placeholder.png">
                    <img src="http://img.example.com/{title}.jpg">
                </div>"#
            )
        })
        .collect();
    format!("<html><head><title>Shop</title></head><body>{}</body></html>", cards)
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_root(server: &MockServer) {
    mount_page(server, "/shop", "<html><body>Shop</body></html>".to_string()).await;
}

fn memory_coordinator(config: Config) -> Coordinator<SqliteStorage> {
    let storage = SqliteStorage::new_in_memory(config.output.identity_scheme)
        .expect("Failed to open in-memory storage");
    Coordinator::new(config, storage).expect("Failed to create coordinator")
}

#[tokio::test]
async fn test_traversal_extracts_and_stores() {
    let server = MockServer::start().await;
    mount_root(&server).await;
    mount_page(&server, "/shop/page/1", catalogue_page(&[("Anvil", "$10"), ("Bucket", "$4")])).await;
    mount_page(&server, "/shop/page/2", catalogue_page(&[("Crate", "$7")])).await;

    let base_url = format!("{}/shop", server.uri());
    let mut coordinator = memory_coordinator(create_test_config(&base_url, 2, ":memory:"));
    let report = coordinator.run().await.expect("Traversal failed");

    assert_eq!(
        report.records,
        vec![
            ProductRecord::new("Anvil", "$10", "http://img.example.com/Anvil.jpg"),
            ProductRecord::new("Bucket", "$4", "http://img.example.com/Bucket.jpg"),
            ProductRecord::new("Crate", "$7", "http://img.example.com/Crate.jpg"),
        ]
    );
    assert_eq!(report.inserted_count, 3);
    assert_eq!(report.existing_count, 0);
    assert_eq!(report.pages_fetched, 2);
    assert!(report.is_clean());
    assert_eq!(report.status(), RunStatus::Completed);

    let stored = coordinator.store().retrieve_all().expect("Failed to read store");
    assert_eq!(stored.len(), 3);
    for item in &stored {
        assert_eq!(item.id, item.record.content_id(IdentityScheme::default()));
    }
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let server = MockServer::start().await;
    mount_root(&server).await;
    mount_page(&server, "/shop/page/1", catalogue_page(&[("Anvil", "$10"), ("Bucket", "$4")])).await;
    mount_page(&server, "/shop/page/2", catalogue_page(&[("Crate", "$7"), ("Drill", "$30")])).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("products.db");
    let config = create_test_config(
        &format!("{}/shop", server.uri()),
        2,
        db_path.to_str().expect("Non-UTF-8 temp path"),
    );

    let first = traverse(&config).await.expect("First run failed");
    assert_eq!(first.inserted_count, 4);
    assert_eq!(first.existing_count, 0);

    let second = traverse(&config).await.expect("Second run failed");
    assert_eq!(second.inserted_count, 0);
    assert_eq!(second.existing_count, 4);
    assert_eq!(second.records, first.records);

    let storage = SqliteStorage::new(&db_path, IdentityScheme::default()).expect("Failed to open DB");
    assert_eq!(storage.count().expect("Failed to count"), 4);

    let run = storage.latest_run().expect("Failed to load run").expect("No run recorded");
    assert_eq!(run.id, second.run_id.expect("Second run has no ID"));
    assert_eq!(run.inserted_count, 0);
    assert_eq!(run.existing_count, 4);
    assert_eq!(run.status, RunStatus::Completed);
}

#[tokio::test]
async fn test_failed_page_is_skipped() {
    let server = MockServer::start().await;
    mount_root(&server).await;
    mount_page(&server, "/shop/page/1", catalogue_page(&[("Anvil", "$10")])).await;
    Mock::given(method("GET"))
        .and(path("/shop/page/2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/shop/page/3", catalogue_page(&[("Crate", "$7")])).await;

    let base_url = format!("{}/shop", server.uri());
    let mut coordinator = memory_coordinator(create_test_config(&base_url, 3, ":memory:"));
    let report = coordinator.run().await.expect("Traversal failed");

    let titles: Vec<_> = report.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Anvil", "Crate"]);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.page_failures.len(), 1);
    assert_eq!(report.page_failures[0].page, 2);
    assert_eq!(report.page_failures[0].error, TransportError::Status(500));
    assert_eq!(report.inserted_count, 2);
    assert_eq!(report.status(), RunStatus::Partial);
}

#[tokio::test]
async fn test_missing_pages_all_fail() {
    let server = MockServer::start().await;
    mount_root(&server).await;

    let base_url = format!("{}/shop", server.uri());
    let mut coordinator = memory_coordinator(create_test_config(&base_url, 2, ":memory:"));
    let report = coordinator.run().await.expect("Traversal failed");

    assert!(report.records.is_empty());
    assert_eq!(report.pages_fetched, 0);
    assert_eq!(report.inserted_count, 0);
    assert_eq!(report.existing_count, 0);
    assert!(report
        .page_failures
        .iter()
        .all(|failure| failure.error == TransportError::Status(404)));
    assert_eq!(report.status(), RunStatus::Failed);
}

#[tokio::test]
async fn test_unreachable_target_fails_fast() {
    let server = MockServer::start().await;
    // Page 1 exists but the catalogue root does not answer
    mount_page(&server, "/shop/page/1", catalogue_page(&[("Anvil", "$10")])).await;

    let base_url = format!("{}/shop", server.uri());
    let mut coordinator = memory_coordinator(create_test_config(&base_url, 1, ":memory:"));
    let result = coordinator.run().await;

    assert!(matches!(result, Err(ScrapeError::TargetUnreachable { .. })));

    let requests = server.received_requests().await.expect("Request recording disabled");
    assert_eq!(requests.len(), 1, "Only the pre-flight request should be sent");
    assert_eq!(coordinator.store().count().expect("Failed to count"), 0);
    assert!(coordinator.store().latest_run().expect("Failed to load run").is_none());
}

#[tokio::test]
async fn test_preflight_can_be_disabled() {
    let server = MockServer::start().await;
    mount_page(&server, "/shop/page/1", catalogue_page(&[("Anvil", "$10")])).await;

    let mut config = create_test_config(&format!("{}/shop", server.uri()), 1, ":memory:");
    config.scraper.preflight = false;
    let mut coordinator = memory_coordinator(config);
    let report = coordinator.run().await.expect("Traversal failed");

    assert_eq!(report.inserted_count, 1);
}

#[tokio::test]
async fn test_fragments_with_missing_fields_are_kept() {
    let server = MockServer::start().await;
    mount_root(&server).await;
    mount_page(
        &server,
        "/shop/page/1",
        r#"<html><body>
            <div class="product-details"><span class="price">$1</span></div>
            <div class="product-details"><span class="product-name">No Price</span></div>
            <div class="product-details"></div>
        </body></html>"#
            .to_string(),
    )
    .await;

    let base_url = format!("{}/shop", server.uri());
    let mut coordinator = memory_coordinator(create_test_config(&base_url, 1, ":memory:"));
    let report = coordinator.run().await.expect("Traversal failed");

    assert_eq!(
        report.records,
        vec![
            ProductRecord::new("", "$1", ""),
            ProductRecord::new("No Price", "", ""),
            ProductRecord::default(),
        ]
    );
    assert_eq!(report.inserted_count, 3);
}

#[tokio::test]
async fn test_concurrent_fetch_keeps_page_order() {
    let server = MockServer::start().await;
    mount_root(&server).await;
    for page in 1..=5u32 {
        let title = format!("Item{}", page);
        Mock::given(method("GET"))
            .and(path(format!("/shop/page/{}", page)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(catalogue_page(&[(title.as_str(), "$1")]))
                    // Earlier pages answer later
                    .set_delay(Duration::from_millis(50 * u64::from(6 - page))),
            )
            .mount(&server)
            .await;
    }

    let mut config = create_test_config(&format!("{}/shop", server.uri()), 5, ":memory:");
    config.scraper.max_concurrent_pages = 4;
    let mut coordinator = memory_coordinator(config);
    let report = coordinator.run().await.expect("Traversal failed");

    let titles: Vec<_> = report.records.iter().map(|r| r.title.clone()).collect();
    assert_eq!(titles, vec!["Item1", "Item2", "Item3", "Item4", "Item5"]);
    assert_eq!(report.inserted_count, 5);
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let server = MockServer::start().await;
    mount_root(&server).await;
    Mock::given(method("GET"))
        .and(path("/shop/page/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(catalogue_page(&[("Late", "$1")]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/shop/page/2", catalogue_page(&[("OnTime", "$2")])).await;

    let mut config = create_test_config(&format!("{}/shop", server.uri()), 2, ":memory:");
    config.scraper.request_timeout_secs = 1;
    let mut coordinator = memory_coordinator(config);
    let report = coordinator.run().await.expect("Traversal failed");

    assert_eq!(report.page_failures.len(), 1);
    assert_eq!(report.page_failures[0].error, TransportError::Timeout);
    assert_eq!(report.records, vec![ProductRecord::new("OnTime", "$2", "http://img.example.com/OnTime.jpg")]);
}

#[tokio::test]
async fn test_requests_go_through_proxy() {
    let proxy = MockServer::start().await;
    mount_root(&proxy).await;
    mount_page(&proxy, "/shop/page/1", catalogue_page(&[("Proxied", "$3")])).await;

    // The catalogue host does not resolve; only the proxy can answer
    let mut config = create_test_config("http://catalogue.invalid/shop", 1, ":memory:");
    config.scraper.proxy = Some(proxy.uri());
    let mut coordinator = memory_coordinator(config);
    let report = coordinator.run().await.expect("Traversal failed");

    assert!(report.page_failures.is_empty());
    assert_eq!(
        report.records,
        vec![ProductRecord::new("Proxied", "$3", "http://img.example.com/Proxied.jpg")]
    );

    let requests = proxy.received_requests().await.expect("Request recording disabled");
    assert_eq!(requests.len(), 2, "Pre-flight and page request should both use the proxy");
}

/// Store whose first write fails; later writes go to an in-memory SQLite store
struct FlakyStore {
    inner: SqliteStorage,
    failed: bool,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: SqliteStorage::new_in_memory(IdentityScheme::default())
                .expect("Failed to open in-memory storage"),
            failed: false,
        }
    }
}

impl ProductStore for FlakyStore {
    fn identity_scheme(&self) -> IdentityScheme {
        self.inner.identity_scheme()
    }

    fn upsert(&mut self, record: &ProductRecord) -> StorageResult<UpsertOutcome> {
        if !self.failed {
            self.failed = true;
            return Err(StorageError::Sqlite(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
                Some("database is locked".to_string()),
            )));
        }
        self.inner.upsert(record)
    }

    fn contains(&self, id: &ContentId) -> StorageResult<bool> {
        self.inner.contains(id)
    }

    fn retrieve_all(&self) -> StorageResult<Vec<StoredRecord>> {
        self.inner.retrieve_all()
    }

    fn count(&self) -> StorageResult<u64> {
        self.inner.count()
    }

    fn begin_run(&mut self, base_url: &str, num_pages: u32) -> StorageResult<i64> {
        self.inner.begin_run(base_url, num_pages)
    }

    fn finish_run(&mut self, run_id: i64, totals: &RunTotals) -> StorageResult<()> {
        self.inner.finish_run(run_id, totals)
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.inner.get_run(run_id)
    }

    fn latest_run(&self) -> StorageResult<Option<RunRecord>> {
        self.inner.latest_run()
    }
}

#[tokio::test]
async fn test_store_failure_is_isolated() {
    let server = MockServer::start().await;
    mount_root(&server).await;
    mount_page(&server, "/shop/page/1", catalogue_page(&[("Anvil", "$10"), ("Bucket", "$4")])).await;

    let config = create_test_config(&format!("{}/shop", server.uri()), 1, ":memory:");
    let mut coordinator =
        Coordinator::new(config, FlakyStore::new()).expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Traversal failed");

    let titles: Vec<_> = report.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Anvil", "Bucket"]);
    assert_eq!(report.inserted_count, 1);
    assert_eq!(report.existing_count, 0);

    assert_eq!(report.store_failures.len(), 1);
    let failure = &report.store_failures[0];
    assert_eq!(failure.record.title, "Anvil");
    assert_eq!(failure.id, failure.record.content_id(IdentityScheme::default()));
    assert!(failure.error.contains("database is locked"));

    assert!(report.page_failures.is_empty());
    assert_eq!(report.status(), RunStatus::Partial);

    let store = coordinator.store();
    assert!(!store.contains(&failure.id).expect("Failed to query store"));
    assert_eq!(store.count().expect("Failed to count"), 1);

    let run = store.latest_run().expect("Failed to load run").expect("No run recorded");
    assert_eq!(run.status, RunStatus::Partial);
    assert_eq!(run.inserted_count, 1);
}

#[tokio::test]
async fn test_custom_heuristics() {
    let server = MockServer::start().await;
    mount_root(&server).await;
    mount_page(
        &server,
        "/shop/page/1",
        r#"<html><body><ul>
            <li class="listing-item"><b class="item-label">Lamp</b><i class="amount">$12</i></li>
            <li class="listing-item"><b class="item-label">Rug</b><i class="amount">$40</i></li>
            <div class="product-card"><span class="product-title">Ignored</span></div>
        </ul></body></html>"#
            .to_string(),
    )
    .await;

    let heuristics = Heuristics {
        card: Box::new(Both(Tag(&["li"]), ClassPattern::new(Some("listing"), &["item"]))),
        title: Box::new(ClassPattern::new(Some("item"), &["label"])),
        price: Box::new(ClassPattern::new(None, &["amount"])),
        ..Heuristics::default()
    };

    let config = create_test_config(&format!("{}/shop", server.uri()), 1, ":memory:");
    let mut coordinator = memory_coordinator(config).with_extractor(Extractor::new(heuristics));
    let report = coordinator.run().await.expect("Traversal failed");

    assert_eq!(
        report.records,
        vec![
            ProductRecord::new("Lamp", "$12", ""),
            ProductRecord::new("Rug", "$40", ""),
        ]
    );
}
