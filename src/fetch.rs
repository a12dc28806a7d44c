//! ブラウザを使わないHTTP取得
//!
//! ページネーションが不要なページはこちらで取得して抽出する。

use std::time::Duration;

use tracing::{debug, info};

use crate::error::ScraperError;
use crate::product::{ProductParser, ProductRecord};

const USER_AGENT: &str = concat!("catalog-scraper/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, ScraperError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ScraperError::Transport {
                url: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }

    /// HTMLを取得（2xx以外はエラー）
    pub async fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        debug!("GET {}", url);
        let transport = |e: reqwest::Error| ScraperError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// 1ページ分の商品を取得
    pub async fn products_from_page(
        &self,
        url: &str,
        parser: &ProductParser,
    ) -> Result<Vec<ProductRecord>, ScraperError> {
        let html = self.fetch_html(url).await?;
        let products = parser.parse(&html)?;
        info!(url, count = products.len(), "商品取得完了（レンダリングなし）");
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><body>
        <div class="thumbnail">
          <h4 class="price">$109.99</h4>
          <a class="title" title="Galaxy Tab 3">Galaxy Tab 3</a>
          <p class="card-text">7", 8GB, Wi-Fi</p>
          <p class="review-count">3 reviews</p>
          <p data-rating="2"></p>
        </div>
    </body></html>"#;

    #[tokio::test]
    async fn test_products_from_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/test-sites/e-commerce/static/computers/tablets"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let parser = ProductParser::with_defaults().unwrap();
        let url = format!("{}/test-sites/e-commerce/static/computers/tablets", server.uri());

        let products = fetcher.products_from_page(&url, &parser).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title(), "Galaxy Tab 3");
        assert_eq!(products[0].price(), 109.99);
        assert_eq!(products[0].rating(), 2);
    }

    #[tokio::test]
    async fn test_non_success_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher
            .fetch_html(&format!("{}/missing", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, ScraperError::HttpStatus { status: 503, .. }));
        assert_eq!(err.kind(), "transport");
    }
}
