//! Shared fixtures: a mock catalog site and test configuration

use book_flow::config::{Config, SiteConfig, StorageConfig, UserAgentConfig};
use book_flow::storage::{
    BookStore, DraftRecord, IdentityKey, IdentityPolicy, RunRecord, RunStatus, RunTotals,
    SqliteStorage, StorageError, StorageResult, StoredBook,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// One listing item as it appears on a catalog page
pub struct Item<'a> {
    pub title: Option<&'a str>,
    pub href: &'a str,
    pub image: &'a str,
    pub price: &'a str,
    pub rating: &'a str,
}

impl<'a> Item<'a> {
    pub fn new(title: &'a str, href: &'a str, image: &'a str, price: &'a str) -> Self {
        Self {
            title: Some(title),
            href,
            image,
            price,
            rating: "Three",
        }
    }

    pub fn untitled(href: &'a str) -> Self {
        Self {
            title: None,
            href,
            image: "media/cache/none.jpg",
            price: "£1.00",
            rating: "One",
        }
    }

    fn render(&self) -> String {
        let title_attr = self
            .title
            .map(|t| format!(r#" title="{}""#, t))
            .unwrap_or_default();
        let link_text = self.title.unwrap_or("");
        format!(
            r#"<li class="col-xs-6"><article class="product_pod">
                <div class="image_container">
                    <a href="{href}"><img src="{image}" alt="cover" class="thumbnail"></a>
                </div>
                <p class="star-rating {rating}"><i class="icon-star"></i></p>
                <h3><a href="{href}"{title_attr}>{link_text}</a></h3>
                <div class="product_price">
                    <p class="price_color">{price}</p>
                    <p class="instock availability"><i class="icon-ok"></i> In stock</p>
                </div>
            </article></li>"#,
            href = self.href,
            image = self.image,
            rating = self.rating,
            title_attr = title_attr,
            link_text = link_text,
            price = self.price,
        )
    }
}

/// Renders a listing page with a pager
pub fn listing_page(items: &[Item<'_>], current: u32, total: u32, has_next: bool) -> String {
    let rendered: String = items.iter().map(Item::render).collect();
    let next = if has_next {
        format!(
            r#"<li class="next"><a href="page-{}.html">next</a></li>"#,
            current + 1
        )
    } else {
        String::new()
    };
    format!(
        r#"<!DOCTYPE html><html><body><section>
            <ol class="row">{rendered}</ol>
            <ul class="pager">
                <li class="current">Page {current} of {total}</li>
                {next}
            </ul>
        </section></body></html>"#,
    )
}

/// Renders a detail page with a breadcrumb and an info table
pub fn detail_page(category: &str, author: Option<&str>) -> String {
    let author_row = author
        .map(|a| format!("<tr><th>Author</th><td>{}</td></tr>", a))
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html><html><body>
        <ul class="breadcrumb">
            <li><a href="../../index.html">Home</a></li>
            <li><a href="../category/books_1/index.html">Books</a></li>
            <li><a href="../category/books/x_2/index.html">{category}</a></li>
            <li class="active">Some Book</li>
        </ul>
        <article class="product_page">
            <table class="table table-striped">
                <tr><th>UPC</th><td>a897fe39b1053632</td></tr>
                {author_row}
            </table>
        </article>
        </body></html>"#,
    )
}

pub async fn mount_html(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, page_path: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Creates a test configuration pointing at `base_url`
pub fn create_test_config(base_url: &str, db_path: &str) -> Config {
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
            listing_timeout_secs: 5,
            detail_timeout_secs: 2,
            fetch_details: true,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        storage: StorageConfig {
            database_path: db_path.to_string(),
            summary_path: "./test_catalog.md".to_string(),
            identity: IdentityPolicy::TitleAndImage,
        },
    }
}

/// SQLite store whose commits always fail, as if the disk went away
pub struct UnwritableStore(pub SqliteStorage);

impl BookStore for UnwritableStore {
    fn begin_batch(&mut self) -> StorageResult<()> {
        self.0.begin_batch()
    }
    fn commit_batch(&mut self) -> StorageResult<()> {
        Err(StorageError::Database("disk I/O error".to_string()))
    }
    fn rollback_batch(&mut self) -> StorageResult<()> {
        self.0.rollback_batch()
    }
    fn find_by_identity(&self, key: &IdentityKey<'_>) -> StorageResult<Option<StoredBook>> {
        self.0.find_by_identity(key)
    }
    fn insert_book(&mut self, draft: &DraftRecord) -> StorageResult<i64> {
        self.0.insert_book(draft)
    }
    fn update_book(&mut self, book_id: i64, draft: &DraftRecord) -> StorageResult<()> {
        self.0.update_book(book_id, draft)
    }
    fn get_book(&self, book_id: i64) -> StorageResult<StoredBook> {
        self.0.get_book(book_id)
    }
    fn list_books(&self) -> StorageResult<Vec<StoredBook>> {
        self.0.list_books()
    }
    fn count_books(&self) -> StorageResult<u64> {
        self.0.count_books()
    }
    fn list_categories(&self) -> StorageResult<Vec<String>> {
        self.0.list_categories()
    }
    fn start_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        self.0.start_run(config_hash)
    }
    fn finish_run(&mut self, run_id: i64, status: RunStatus, totals: &RunTotals) -> StorageResult<()> {
        self.0.finish_run(run_id, status, totals)
    }
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.0.get_run(run_id)
    }
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        self.0.get_latest_run()
    }
}
