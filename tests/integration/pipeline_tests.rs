//! End-to-end scrape runs against a mock catalog

use crate::common::{
    create_test_config, detail_page, listing_page, mount_html, Item, UnwritableStore,
};
use book_flow::crawler::{CatalogScraper, Orchestrator};
use book_flow::storage::{BookStore, IdentityPolicy, RunStatus, SqliteStorage};
use book_flow::{run_scrape, BookFlowError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_two_valid_items_and_one_untitled() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/index.html",
        listing_page(
            &[
                Item::new("Soumission", "catalogue/soumission_998/index.html", "media/s.jpg", "£50.10"),
                Item::untitled("catalogue/nameless_997/index.html"),
                Item::new("Sharp Objects", "catalogue/sharp-objects_997/index.html", "media/so.jpg", "£47.82"),
            ],
            1,
            2,
            true,
        ),
    )
    .await;
    mount_html(
        &server,
        "/catalogue/soumission_998/index.html",
        detail_page("Fiction", Some("Michel Houellebecq")),
    )
    .await;
    mount_html(&server, "/catalogue/page-2.html", listing_page(&[], 2, 2, false)).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("books.db");
    let config = create_test_config(&server.uri(), db_path.to_str().unwrap());
    let mut storage = SqliteStorage::new(&db_path).unwrap();

    let summary = run_scrape(&config, &mut storage, "hash-a")
        .await
        .expect("Scrape should succeed");

    assert_eq!(summary.scraped_count, 2);
    assert_eq!(summary.saved_count, 2);
    assert_eq!(summary.pages_processed, 1);

    let books = storage.list_books().unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0].title, "Soumission");
    assert_eq!(books[0].category.as_deref(), Some("Fiction"));
    assert_eq!(books[0].author.as_deref(), Some("Michel Houellebecq"));
    assert_eq!(books[1].title, "Sharp Objects");
    assert_eq!(books[1].category, None);

    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "hash-a");
    assert_eq!(run.totals.saved_count, 2);
}

#[tokio::test]
async fn test_every_commit_failing_reports_nothing_saved() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/index.html",
        listing_page(
            &[Item::new("Doomed", "catalogue/doomed_1/index.html", "media/d.jpg", "£9.99")],
            1,
            2,
            true,
        ),
    )
    .await;
    mount_html(
        &server,
        "/catalogue/page-2.html",
        listing_page(
            &[Item::new("Also Doomed", "doomed_2/index.html", "../media/d2.jpg", "£8.99")],
            2,
            2,
            false,
        ),
    )
    .await;

    let config = create_test_config(&server.uri(), ":memory:");
    let mut store = UnwritableStore(SqliteStorage::new_in_memory().unwrap());

    let result = run_scrape(&config, &mut store, "hash-b").await;

    match result {
        Err(BookFlowError::NothingSaved {
            scraped_count,
            pages_processed,
        }) => {
            assert_eq!(scraped_count, 2);
            assert_eq!(pages_processed, 2);
        }
        other => panic!("expected NothingSaved, got {:?}", other),
    }
    assert_eq!(store.0.count_books().unwrap(), 0);
}

#[tokio::test]
async fn test_identity_collision_across_pages() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/index.html",
        listing_page(
            &[Item::new("Olio", "catalogue/olio_984/index.html", "media/olio.jpg", "£23.88")],
            1,
            3,
            true,
        ),
    )
    .await;
    mount_html(
        &server,
        "/catalogue/page-2.html",
        listing_page(
            &[Item::new("Olio", "olio_984/index.html", "../media/olio.jpg", "£19.99")],
            2,
            3,
            true,
        ),
    )
    .await;
    // page-3.html is not mounted, so the loop ends on a 404

    let config = create_test_config(&server.uri(), ":memory:");
    let mut storage = SqliteStorage::new_in_memory().unwrap();

    let summary = run_scrape(&config, &mut storage, "hash-c").await.unwrap();

    assert_eq!(summary.scraped_count, 2);
    assert_eq!(summary.saved_count, 2);
    assert_eq!(summary.pages_processed, 2);

    let books = storage.list_books().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].price, 19.99);
}

#[tokio::test]
async fn test_rerun_updates_instead_of_duplicating() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/index.html",
        listing_page(
            &[Item::new("Sapiens", "catalogue/sapiens_996/index.html", "media/sapiens.jpg", "£54.23")],
            1,
            1,
            false,
        ),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("books.db");
    let config = create_test_config(&server.uri(), db_path.to_str().unwrap());

    {
        let mut storage = SqliteStorage::new(&db_path).unwrap();
        run_scrape(&config, &mut storage, "first").await.unwrap();
    }

    let mut storage = SqliteStorage::new(&db_path).unwrap();
    let summary = run_scrape(&config, &mut storage, "second").await.unwrap();

    assert_eq!(summary.saved_count, 1);
    assert_eq!(storage.count_books().unwrap(), 1);
    assert!(storage.list_books().unwrap()[0].updated_at.is_some());
    assert_eq!(storage.get_latest_run().unwrap().unwrap().config_hash, "second");
}

#[tokio::test]
async fn test_next_page_check_refetches_listing() {
    let server = MockServer::start().await;

    // Total-page lookup, the scrape itself, then the next-page check
    Mock::given(method("GET"))
        .and(path("/index.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            &[Item::new("Only", "catalogue/only_1/index.html", "media/o.jpg", "£3.00")],
            1,
            1,
            false,
        )))
        .expect(3)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), ":memory:");
    config.site.fetch_details = false;
    let scraper = CatalogScraper::from_config(&config).unwrap();
    let mut storage = SqliteStorage::new_in_memory().unwrap();

    let summary = Orchestrator::new(scraper, &mut storage, IdentityPolicy::TitleAndImage)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.pages_processed, 1);
    assert_eq!(summary.saved_count, 1);
    server.verify().await;
}

#[tokio::test]
async fn test_unreachable_site_reports_nothing_saved() {
    let server = MockServer::start().await;
    let mut storage = SqliteStorage::new_in_memory().unwrap();
    let config = create_test_config(&server.uri(), ":memory:");

    let result = run_scrape(&config, &mut storage, "hash-x").await;

    assert!(matches!(
        result,
        Err(BookFlowError::NothingSaved {
            scraped_count: 0,
            pages_processed: 0
        })
    ));
    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Failed);
}
