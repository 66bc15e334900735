//! Page scraper tests against a mock catalog

use crate::common::{create_test_config, detail_page, listing_page, mount_html, mount_status, Item};
use book_flow::crawler::{CatalogScraper, CatalogSource};
use wiremock::MockServer;

fn scraper_for(server: &MockServer) -> CatalogScraper {
    let config = create_test_config(&server.uri(), ":memory:");
    CatalogScraper::from_config(&config).expect("Failed to build scraper")
}

#[tokio::test]
async fn test_scrape_index_page_with_details() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/index.html",
        listing_page(
            &[Item::new(
                "A Light in the Attic",
                "catalogue/a-light-in-the-attic_1000/index.html",
                "media/cache/2c/da/attic.jpg",
                "£51.77",
            )],
            1,
            50,
            true,
        ),
    )
    .await;
    mount_html(
        &server,
        "/catalogue/a-light-in-the-attic_1000/index.html",
        detail_page("Poetry", Some("Shel Silverstein")),
    )
    .await;

    let drafts = scraper_for(&server).scrape_page(1, 50).await;

    assert_eq!(drafts.len(), 1);
    let draft = &drafts[0];
    assert_eq!(draft.title, "A Light in the Attic");
    assert_eq!(draft.price, 51.77);
    assert_eq!(draft.rating, Some(3.0));
    assert!(draft.available);
    assert_eq!(draft.category.as_deref(), Some("Poetry"));
    assert_eq!(draft.author.as_deref(), Some("Shel Silverstein"));
    assert_eq!(
        draft.image.as_deref(),
        Some(format!("{}/media/cache/2c/da/attic.jpg", server.uri()).as_str())
    );
}

#[tokio::test]
async fn test_later_pages_resolve_relative_links() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/catalogue/page-2.html",
        listing_page(
            &[Item::new(
                "In Her Wake",
                "in-her-wake_980/index.html",
                "../media/cache/5d/72/wake.jpg",
                "£12.84",
            )],
            2,
            50,
            true,
        ),
    )
    .await;
    mount_html(
        &server,
        "/catalogue/in-her-wake_980/index.html",
        detail_page("Thriller", None),
    )
    .await;

    let drafts = scraper_for(&server).scrape_page(2, 0).await;

    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].category.as_deref(), Some("Thriller"));
    assert_eq!(drafts[0].author, None);
    assert_eq!(
        drafts[0].image.as_deref(),
        Some(format!("{}/media/cache/5d/72/wake.jpg", server.uri()).as_str())
    );
}

#[tokio::test]
async fn test_failed_detail_page_keeps_draft() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/index.html",
        listing_page(
            &[
                Item::new("Broken Detail", "catalogue/broken_1/index.html", "media/b.jpg", "£10.00"),
                Item::new("Missing Detail", "catalogue/missing_2/index.html", "media/m.jpg", "£11.00"),
            ],
            1,
            1,
            false,
        ),
    )
    .await;
    mount_status(&server, "/catalogue/broken_1/index.html", 500).await;

    let drafts = scraper_for(&server).scrape_page(1, 0).await;

    assert_eq!(drafts.len(), 2);
    for draft in &drafts {
        assert_eq!(draft.category, None);
        assert_eq!(draft.author, None);
    }
    assert_eq!(drafts[0].title, "Broken Detail");
    assert_eq!(drafts[1].title, "Missing Detail");
}

#[tokio::test]
async fn test_untitled_items_are_dropped() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/index.html",
        listing_page(
            &[
                Item::new("Kept", "catalogue/kept_1/index.html", "media/k.jpg", "£5.00"),
                Item::untitled("catalogue/untitled_2/index.html"),
            ],
            1,
            1,
            false,
        ),
    )
    .await;

    let drafts = scraper_for(&server).scrape_page(1, 0).await;

    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].title, "Kept");
}

#[tokio::test]
async fn test_missing_page_is_empty() {
    let server = MockServer::start().await;
    let scraper = scraper_for(&server);

    assert!(scraper.scrape_page(7, 0).await.is_empty());
    assert!(!scraper.has_next_page(7).await);
    assert_eq!(scraper.get_total_pages().await, 0);
}

#[tokio::test]
async fn test_page_without_items_is_empty() {
    let server = MockServer::start().await;
    mount_html(&server, "/catalogue/page-3.html", listing_page(&[], 3, 3, true)).await;

    let scraper = scraper_for(&server);
    assert!(scraper.scrape_page(3, 0).await.is_empty());
    assert!(scraper.has_next_page(3).await);
}

#[tokio::test]
async fn test_pagination_hints() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/index.html",
        listing_page(&[Item::new("X", "catalogue/x_1/index.html", "media/x.jpg", "£1.00")], 1, 50, true),
    )
    .await;
    mount_html(
        &server,
        "/catalogue/page-50.html",
        listing_page(&[Item::new("Y", "y_2/index.html", "../media/y.jpg", "£2.00")], 50, 50, false),
    )
    .await;

    let scraper = scraper_for(&server);
    assert_eq!(scraper.get_total_pages().await, 50);
    assert!(scraper.has_next_page(1).await);
    assert!(!scraper.has_next_page(50).await);
}
