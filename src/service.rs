use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tower::Service;
use tracing::info;

use crate::config::ScraperConfig;
use crate::crawler::CatalogCrawler;
use crate::error::ScraperError;
use crate::product::ProductRecord;
use crate::render::ChromiumLauncher;

/// クロールリクエスト
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    /// カテゴリのパスまたは絶対URL
    pub target: String,
    pub headless: bool,
    pub load_more_timeout: Duration,
}

impl CrawlRequest {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            headless: true,
            load_more_timeout: ScraperConfig::default().load_more_timeout,
        }
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_load_more_timeout(mut self, timeout: Duration) -> Self {
        self.load_more_timeout = timeout;
        self
    }
}

/// tower::Serviceを実装したカタログサービス
#[derive(Debug, Clone, Default)]
pub struct CatalogService {
    config: ScraperConfig,
}

impl CatalogService {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }

    fn config_for(&self, req: &CrawlRequest) -> ScraperConfig {
        self.config
            .clone()
            .with_headless(req.headless)
            .with_load_more_timeout(req.load_more_timeout)
    }
}

impl Service<CrawlRequest> for CatalogService {
    type Response = Vec<ProductRecord>;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: CrawlRequest) -> Self::Future {
        info!("クロールリクエスト受信: target={}", req.target);
        let config = self.config_for(&req);

        Box::pin(async move {
            let launcher = ChromiumLauncher::from_config(&config);
            let crawler = CatalogCrawler::new(config, launcher)?;

            let products = crawler.crawl_category(&req.target).await?;

            info!(
                "クロール完了: target={}, products={}",
                req.target,
                products.len()
            );
            Ok(products)
        })
    }
}
