//! カテゴリ単位のクロール
//!
//! URL解決 → セッション起動 → ページネーション → 抽出 → セッション終了

use std::pin::pin;

use futures::StreamExt;
use tracing::{error, info, warn};
use url::Url;

use crate::config::{CategoryRef, ScraperConfig};
use crate::error::ScraperError;
use crate::product::{ProductParser, ProductRecord};
use crate::render::PaginationDriver;
use crate::traits::{ProductSink, SessionLauncher};

/// 1カテゴリの結果
#[derive(Debug)]
pub struct CategoryOutcome {
    pub category: String,
    /// 成功時は出力した商品数
    pub result: Result<usize, ScraperError>,
}

/// 全カテゴリクロールの結果
#[derive(Debug, Default)]
pub struct CrawlReport {
    pub outcomes: Vec<CategoryOutcome>,
}

impl CrawlReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &CategoryOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &CategoryOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }
}

pub struct CatalogCrawler<L> {
    config: ScraperConfig,
    launcher: L,
    driver: PaginationDriver,
    parser: ProductParser,
}

impl<L: SessionLauncher> CatalogCrawler<L> {
    pub fn new(config: ScraperConfig, launcher: L) -> Result<Self, ScraperError> {
        let driver = PaginationDriver::from_config(&config);
        let parser = ProductParser::new(&config.product_selectors)?;
        Ok(Self {
            config,
            launcher,
            driver,
            parser,
        })
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// パスをベースURLに対して解決（絶対URLはそのまま）
    pub fn resolve(&self, target: &str) -> Result<Url, ScraperError> {
        Url::parse(&self.config.base_url)
            .and_then(|base| base.join(target))
            .map_err(|source| ScraperError::InvalidUrl {
                target: target.to_string(),
                source,
            })
    }

    /// 1カテゴリの全商品を取得
    pub async fn crawl_category(
        &self,
        target: &str,
    ) -> Result<Vec<ProductRecord>, ScraperError> {
        let url = self.resolve(target)?;

        let mut session = self.launcher.launch().await?;
        let rendered = self.driver.render(session.as_mut(), url.as_str()).await;

        // 成否に関わらずセッションを閉じる
        if let Err(e) = session.close().await {
            warn!("セッションの終了に失敗: {}: {}", url, e);
        }
        drop(session);

        let document = rendered?;
        let products = self.parser.parse(&document.html)?;
        info!(url = %url, count = products.len(), "商品抽出完了");
        Ok(products)
    }

    pub async fn crawl_home_page(&self) -> Result<Vec<ProductRecord>, ScraperError> {
        let target = self
            .config
            .category("home")
            .map(|c| c.target.clone())
            .unwrap_or_else(|| "test-sites/e-commerce/more/".to_string());
        self.crawl_category(&target).await
    }

    /// 設定された全カテゴリをクロールしてシンクに渡す
    ///
    /// 失敗したカテゴリは出力せずに記録し、残りのカテゴリは続行する。
    pub async fn crawl_all(&self, sink: &mut dyn ProductSink) -> CrawlReport {
        self.crawl_categories(&self.config.categories, sink).await
    }

    pub async fn crawl_categories(
        &self,
        categories: &[CategoryRef],
        sink: &mut dyn ProductSink,
    ) -> CrawlReport {
        let mut results = pin!(futures::stream::iter(categories)
            .map(|category| async move {
                (category, self.crawl_category(&category.target).await)
            })
            .buffered(self.config.concurrency.max(1)));

        let mut report = CrawlReport::default();
        while let Some((category, result)) = results.next().await {
            let result = result.and_then(|products| {
                sink.accept(&category.name, &products)?;
                Ok(products.len())
            });

            match &result {
                Ok(count) => info!(category = %category.name, count, "カテゴリ完了"),
                Err(e) => error!(
                    category = %category.name,
                    kind = e.kind(),
                    "カテゴリ失敗: {}",
                    e
                ),
            }

            report.outcomes.push(CategoryOutcome {
                category: category.name.clone(),
                result,
            });
        }
        report
    }
}
