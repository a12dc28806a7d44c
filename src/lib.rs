//! 「もっと見る」型ECカタログのスクレイパーライブラリ
//!
//! - ブラウザで「もっと見る」を押し切って全商品を読み込む
//! - 商品カードから型付きの商品レコードを抽出する
//! - カテゴリごとにCSVへ書き出す
//!
//! # 1カテゴリの取得
//!
//! ```rust,ignore
//! use catalog_scraper::{CatalogService, CrawlRequest};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut service = CatalogService::default();
//!
//!     let request = CrawlRequest::new("test-sites/e-commerce/more/phones")
//!         .with_headless(false);
//!
//!     let products = service.call(request).await.unwrap();
//!     println!("Products: {}", products.len());
//! }
//! ```
//!
//! # 全カテゴリをCSVへ
//!
//! ```rust,ignore
//! use catalog_scraper::{CatalogCrawler, ChromiumLauncher, CsvSink, ScraperConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ScraperConfig::default().with_output_path("./data");
//!     let launcher = ChromiumLauncher::from_config(&config);
//!     let mut sink = CsvSink::new(&config.output_path);
//!
//!     let crawler = CatalogCrawler::new(config, launcher).unwrap();
//!     let report = crawler.crawl_all(&mut sink).await;
//!     println!("Failed: {}", report.failed().count());
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod fetch;
pub mod product;
pub mod render;
pub mod service;
pub mod sink;
pub mod traits;

// 主要な型をリエクスポート
pub use config::{CategoryRef, ScraperConfig};
pub use crawler::{CatalogCrawler, CategoryOutcome, CrawlReport};
pub use error::ScraperError;
pub use fetch::HttpFetcher;
pub use service::{CatalogService, CrawlRequest};
pub use sink::CsvSink;
pub use traits::{ControlState, ProductSink, RenderSession, SessionLauncher};

// 抽出・レンダリング関連の型もリエクスポート
pub use product::{ExtractionError, FieldRole, ProductParser, ProductRecord};
pub use render::{ChromiumLauncher, PaginationDriver, RenderedDocument, Termination};
