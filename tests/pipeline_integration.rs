//! End-to-end pipeline runs against a file-backed SQLite warehouse.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use indicatif::ProgressBar;
use linkmeta_core::{
    HttpRedirectResolver, IdType, LinkCache, MetadataError, PipelineConfig, PipelineError,
    RedirectResolver, ResolveError, run,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

mod support;
use support::mock_http::mock_server;

/// Resolves from a fixed table; anything else fails.
struct TableResolver(HashMap<String, String>);

impl TableResolver {
    fn new(pairs: &[(&str, &str)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(link, url)| ((*link).to_string(), (*url).to_string()))
                .collect(),
        )
    }
}

#[async_trait]
impl RedirectResolver for TableResolver {
    fn name(&self) -> &'static str {
        "table"
    }

    async fn resolve(&self, link: &str) -> Result<String, ResolveError> {
        self.0
            .get(link)
            .cloned()
            .ok_or_else(|| ResolveError::request_failed(link, "unknown link"))
    }
}

/// Creates `TITLE_INFO_DIM` at `db_path` with a few titles, one of them excluded by division.
async fn seed_warehouse(db_path: &Path) {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))
        .expect("options")
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("create warehouse");

    sqlx::query(
        "CREATE TABLE TITLE_INFO_DIM (
            ISBN_13 TEXT, ASIN TEXT, TITLE TEXT, AUTHOR TEXT,
            ORIGINAL_PUBLICATION_DATE TEXT, NIELSEN_CATEGORY TEXT,
            NIELSEN_SUB_CATEGORY TEXT, DIVISION TEXT
        )",
    )
    .execute(&pool)
    .await
    .expect("create table");

    let rows = [
        ("9780143127741", "B00ABCDEFG", "Station Eleven", "Knopf Doubleday"),
        ("9780525559474", "B07XYZ1234", "The Midnight Library", "Viking"),
        ("9780000000002", "B000000002", "Internal Memo", "PRH Corporate"),
    ];
    for (isbn, asin, title, division) in rows {
        sqlx::query(
            "INSERT INTO TITLE_INFO_DIM VALUES (?, ?, ?, 'Author', '2014-09-09', 'Fiction', 'Literary', ?)",
        )
        .bind(isbn)
        .bind(asin)
        .bind(title)
        .bind(division)
        .execute(&pool)
        .await
        .expect("insert");
    }
    pool.close().await;
}

struct Fixture {
    dir: TempDir,
    config: PipelineConfig,
}

async fn fixture() -> Fixture {
    let dir = TempDir::new().expect("temp dir");
    let db_path = dir.path().join("title_info.db");
    seed_warehouse(&db_path).await;
    let config = PipelineConfig {
        cache_path: dir.path().join("link_lookup.json"),
        warehouse_url: Some(format!("sqlite:{}", db_path.display())),
        ..PipelineConfig::default()
    };
    Fixture { dir, config }
}

fn links(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

#[tokio::test]
async fn test_pipeline_single_isbn_link_yields_one_record() {
    let fx = fixture().await;
    let resolver = TableResolver::new(&[(
        "http://x/1",
        "https://www.amazon.com/Station-Eleven/dp/9780143127741",
    )]);

    let output = run(&links(&["http://x/1"]), &fx.config, &resolver, &ProgressBar::hidden())
        .await
        .expect("pipeline");

    assert_eq!(output.records.len(), 1);
    let record = &output.records[0];
    assert_eq!(record.link, "http://x/1");
    assert_eq!(record.id_type, IdType::Isbn13);
    assert_eq!(record.identifier, "9780143127741");
    assert_eq!(record.title.as_deref(), Some("Station Eleven"));
    assert_eq!(record.asin.as_deref(), Some("B00ABCDEFG"));
    assert_eq!(output.stats.input_links, 1);
    assert_eq!(output.stats.resolved, 1);
    assert_eq!(output.stats.extracted, 1);
    assert_eq!(output.stats.records, 1);
}

#[tokio::test]
async fn test_pipeline_mixed_links_drop_and_join() {
    let fx = fixture().await;
    let resolver = TableResolver::new(&[
        ("http://x/asin", "https://www.amazon.com/dp/B07XYZ1234?tag=aff"),
        ("http://x/isbn", "https://shop.example/book/9780143127741"),
        ("http://x/corp", "https://shop.example/book/9780000000002"),
        ("http://x/none", "https://shop.example/about"),
        ("http://x/unknown", "https://shop.example/book/9789999999999"),
    ]);
    let input = links(&[
        "http://x/isbn",
        "http://x/dead",
        "http://x/asin",
        "http://x/corp",
        "http://x/none",
        "http://x/unknown",
    ]);

    let output = run(&input, &fx.config, &resolver, &ProgressBar::hidden())
        .await
        .expect("pipeline");

    // ASIN group comes first, then ISBN-13.
    let got: Vec<(&str, IdType)> = output
        .records
        .iter()
        .map(|r| (r.link.as_str(), r.id_type))
        .collect();
    assert_eq!(
        got,
        vec![("http://x/asin", IdType::Asin), ("http://x/isbn", IdType::Isbn13)]
    );
    assert!(output.records.iter().all(|r| input.contains(&r.link)));
    assert_eq!(output.stats.resolved, 5);
    assert_eq!(output.stats.extracted, 4);
    assert_eq!(output.stats.records, 2);
}

#[tokio::test]
async fn test_pipeline_duplicate_links_fan_out() {
    let fx = fixture().await;
    let resolver = TableResolver::new(&[("http://x/1", "https://x.example/dp/B00ABCDEFG")]);

    let output = run(
        &links(&["http://x/1", "http://x/1"]),
        &fx.config,
        &resolver,
        &ProgressBar::hidden(),
    )
    .await
    .expect("pipeline");

    assert_eq!(output.records.len(), 2);
    assert!(output.records.iter().all(|r| r.identifier == "B00ABCDEFG"));
}

#[tokio::test]
async fn test_pipeline_persists_cache_and_reuses_it() {
    let fx = fixture().await;
    let first = TableResolver::new(&[("http://x/1", "https://x.example/dp/9780525559474")]);
    run(&links(&["http://x/1"]), &fx.config, &first, &ProgressBar::hidden())
        .await
        .expect("first run");

    let cache = LinkCache::load(&fx.config.cache_path).expect("cache");
    assert_eq!(cache.get("http://x/1"), Some("https://x.example/dp/9780525559474"));

    // Second run cannot resolve anything, so results come from the cache alone.
    let offline = TableResolver::new(&[]);
    let output = run(&links(&["http://x/1"]), &fx.config, &offline, &ProgressBar::hidden())
        .await
        .expect("second run");
    assert_eq!(output.records.len(), 1);
    assert_eq!(output.records[0].title.as_deref(), Some("The Midnight Library"));
}

#[tokio::test]
async fn test_pipeline_without_identifiers_skips_warehouse() {
    let fx = fixture().await;
    let config = PipelineConfig {
        warehouse_url: None,
        ..fx.config.clone()
    };
    let resolver = TableResolver::new(&[("http://x/1", "https://x.example/about")]);

    let output = run(&links(&["http://x/1"]), &config, &resolver, &ProgressBar::hidden())
        .await
        .expect("pipeline");
    assert!(output.records.is_empty());
}

#[tokio::test]
async fn test_pipeline_identifiers_without_warehouse_is_an_error() {
    let fx = fixture().await;
    let config = PipelineConfig {
        warehouse_url: None,
        ..fx.config.clone()
    };
    let resolver = TableResolver::new(&[("http://x/1", "https://x.example/dp/B00ABCDEFG")]);

    let err = run(&links(&["http://x/1"]), &config, &resolver, &ProgressBar::hidden())
        .await
        .unwrap_err();
    assert!(
        matches!(err, PipelineError::WarehouseNotConfigured { identifiers: 1 }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_pipeline_missing_warehouse_file_is_an_error() {
    let fx = fixture().await;
    let config = PipelineConfig {
        warehouse_url: Some(format!(
            "sqlite:{}",
            fx.dir.path().join("absent.db").display()
        )),
        ..fx.config.clone()
    };
    let resolver = TableResolver::new(&[("http://x/1", "https://x.example/dp/B00ABCDEFG")]);

    let err = run(&links(&["http://x/1"]), &config, &resolver, &ProgressBar::hidden())
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Metadata(_)), "got {err:?}");
}

#[tokio::test]
async fn test_pipeline_failed_query_surfaces_and_keeps_cache() {
    let fx = fixture().await;
    let db_path = fx.dir.path().join("no_titles.db");
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))
        .expect("options")
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("create warehouse");
    sqlx::query("CREATE TABLE SOMETHING_ELSE (ID TEXT)")
        .execute(&pool)
        .await
        .expect("create table");
    pool.close().await;

    let config = PipelineConfig {
        warehouse_url: Some(format!("sqlite:{}", db_path.display())),
        ..fx.config.clone()
    };
    let resolver = TableResolver::new(&[("http://x/1", "https://x.example/dp/B00ABCDEFG")]);

    let err = run(&links(&["http://x/1"]), &config, &resolver, &ProgressBar::hidden())
        .await
        .unwrap_err();
    assert!(
        matches!(err, PipelineError::Metadata(MetadataError::Query(_))),
        "got {err:?}"
    );

    let cache = LinkCache::load(&config.cache_path).expect("cache");
    assert_eq!(cache.get("http://x/1"), Some("https://x.example/dp/B00ABCDEFG"));
}

#[tokio::test]
async fn test_pipeline_over_http_redirects() {
    let Some(server) = mock_server().await else {
        return;
    };
    let fx = fixture().await;
    let target = format!("{}/dp/9780143127741", server.uri());

    Mock::given(method("HEAD"))
        .and(path("/s/station"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", target.as_str()))
        .mount(&server)
        .await;
    Mock::given(path("/dp/9780143127741"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let link = format!("{}/s/station", server.uri());
    let resolver = HttpRedirectResolver::new(Duration::from_secs(5), 10).expect("resolver");
    let output = run(
        std::slice::from_ref(&link),
        &fx.config,
        &resolver,
        &ProgressBar::hidden(),
    )
    .await
    .expect("pipeline");

    assert_eq!(output.records.len(), 1);
    assert_eq!(output.records[0].link, link);
    assert_eq!(output.records[0].title.as_deref(), Some("Station Eleven"));
}
