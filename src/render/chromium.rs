//! chromiumoxide によるセッション実装

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::traits::{ControlState, RenderSession, SessionLauncher};

/// 要素の表示状態のポーリング間隔（ミリ秒）
const WAIT_POLL_INTERVAL_MS: u64 = 250;
/// CDPリクエストのタイムアウト（秒）
const CDP_REQUEST_TIMEOUT_SECS: u64 = 60;

/// 表示中かつ有効な要素なら true
const INTERACTABLE_FN: &str = r#"
    function() {
        const style = window.getComputedStyle(this);
        const rect = this.getBoundingClientRect();
        return !this.disabled
            && style.display !== 'none'
            && style.visibility !== 'hidden'
            && rect.width > 0
            && rect.height > 0;
    }
"#;

/// クロールごとにChromiumを起動する
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    headless: bool,
    chrome_executable: Option<PathBuf>,
}

impl ChromiumLauncher {
    pub fn new(headless: bool) -> Self {
        Self {
            headless,
            chrome_executable: None,
        }
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(config.headless)
    }

    pub fn with_chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_executable = Some(path.into());
        self
    }

    fn chrome_path(&self) -> PathBuf {
        self.chrome_executable.clone().unwrap_or_else(|| {
            std::env::var("CHROME_PATH")
                .or_else(|_| std::env::var("CHROMIUM_PATH"))
                .unwrap_or_else(|_| "chromium".to_string())
                .into()
        })
    }
}

#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn RenderSession>, ScraperError> {
        info!("ブラウザを初期化中...");

        // セッションごとに専用のユーザーデータディレクトリを使う
        let unique_id = format!(
            "{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );
        let user_data_dir = std::env::temp_dir().join(format!("catalog-scraper-{}", unique_id));

        let mut builder = BrowserConfig::builder()
            .chrome_executable(self.chrome_path())
            .user_data_dir(&user_data_dir)
            .window_size(1280, 800);

        if !self.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .no_sandbox()
            .request_timeout(Duration::from_secs(CDP_REQUEST_TIMEOUT_SECS))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .build()
            .map_err(ScraperError::BrowserInit)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("ブラウザイベント: {:?}", event);
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        info!("ブラウザ初期化完了");
        Ok(Box::new(ChromiumSession {
            browser: Some(browser),
            page,
            handler_task,
        }))
    }
}

/// ポーリング1回分の観測結果
#[derive(Debug)]
enum Observation {
    Absent,
    Present,
    Interactable,
    /// 再描画中のノード参照切れなど、一時的に確認できなかった
    Unavailable(ScraperError),
}

/// 操作可能になるまでの待機状態
#[derive(Debug, Default)]
struct ReadinessWait {
    seen: bool,
}

impl ReadinessWait {
    /// 観測を記録し、待機を終えるべきなら最終状態を返す
    fn record(&mut self, observation: Observation) -> Option<ControlState> {
        match observation {
            Observation::Interactable => Some(ControlState::Interactable),
            Observation::Present => {
                self.seen = true;
                None
            }
            Observation::Absent => None,
            Observation::Unavailable(e) => {
                debug!("コントロールを確認できません。再試行します: {}", e);
                None
            }
        }
    }

    /// タイムアウト時の状態
    fn expire(&self) -> ControlState {
        if self.seen {
            ControlState::Inert
        } else {
            ControlState::Missing
        }
    }
}

/// 1つのChromiumプロセスと1タブ
pub struct ChromiumSession {
    browser: Option<Browser>,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl ChromiumSession {
    async fn is_interactable(element: &Element) -> Result<bool, ScraperError> {
        let returns = element
            .call_js_fn(INTERACTABLE_FN, false)
            .await
            .map_err(|e| ScraperError::Browser(e.to_string()))?;
        Ok(matches!(
            returns.result.value,
            Some(serde_json::Value::Bool(true))
        ))
    }

    async fn observe(&self, selector: &str) -> Observation {
        let element = match self.find_first(selector).await {
            Ok(Some(element)) => element,
            Ok(None) => return Observation::Absent,
            Err(e) => return Observation::Unavailable(e),
        };
        match Self::is_interactable(&element).await {
            Ok(true) => Observation::Interactable,
            Ok(false) => Observation::Present,
            Err(e) => Observation::Unavailable(e),
        }
    }

    async fn find_first(&self, selector: &str) -> Result<Option<Element>, ScraperError> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| ScraperError::Browser(e.to_string()))?;
        Ok(elements.into_iter().next())
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;
        debug!("ページ読み込み完了: {}", url);
        Ok(())
    }

    async fn element_exists(&mut self, selector: &str) -> Result<bool, ScraperError> {
        Ok(self.find_first(selector).await?.is_some())
    }

    async fn click(&mut self, selector: &str) -> Result<(), ScraperError> {
        let element = self
            .find_first(selector)
            .await?
            .ok_or_else(|| ScraperError::ElementNotFound(selector.to_string()))?;
        element
            .click()
            .await
            .map_err(|e| ScraperError::Interaction(e.to_string()))?;
        Ok(())
    }

    async fn wait_until_interactable(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<ControlState, ScraperError> {
        let start = Instant::now();
        let mut wait = ReadinessWait::default();

        loop {
            let observation = self.observe(selector).await;
            if let Some(state) = wait.record(observation) {
                debug!("{} が操作可能になりました ({:?})", selector, start.elapsed());
                return Ok(state);
            }

            if start.elapsed() >= timeout {
                return Ok(wait.expire());
            }

            sleep(Duration::from_millis(WAIT_POLL_INTERVAL_MS)).await;
        }
    }

    async fn move_and_click(&mut self, selector: &str) -> Result<(), ScraperError> {
        let element = self
            .find_first(selector)
            .await?
            .ok_or_else(|| ScraperError::Interaction(format!("{} disappeared", selector)))?;

        // マウス移動 → 押下/解放のイベントとして送る
        element
            .hover()
            .await
            .map_err(|e| ScraperError::Interaction(format!("hover: {}", e)))?;
        element
            .click()
            .await
            .map_err(|e| ScraperError::Interaction(format!("click: {}", e)))?;
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String, ScraperError> {
        self.page
            .content()
            .await
            .map_err(|e| ScraperError::Browser(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };
        info!("ブラウザを終了中...");

        if let Err(e) = browser.close().await {
            warn!("ブラウザ終了コマンドに失敗: {}", e);
        }
        if let Err(e) = browser.wait().await {
            warn!("ブラウザプロセスの終了待機に失敗: {}", e);
        }
        self.handler_task.abort();

        info!("ブラウザ終了完了");
        Ok(())
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageSelectors;
    use crate::render::PaginationDriver;

    #[test]
    fn test_launcher_from_config() {
        let config = ScraperConfig::new().with_headless(false);
        let launcher = ChromiumLauncher::from_config(&config).with_chrome_executable("/opt/chrome");
        assert!(!launcher.headless);
        assert_eq!(launcher.chrome_path(), PathBuf::from("/opt/chrome"));
    }

    fn stale_node() -> Observation {
        Observation::Unavailable(ScraperError::Browser(
            "Could not find node with given id".to_string(),
        ))
    }

    #[test]
    fn test_wait_survives_stale_node_until_interactable() {
        let mut wait = ReadinessWait::default();
        assert_eq!(wait.record(Observation::Present), None);
        assert_eq!(wait.record(stale_node()), None);
        assert_eq!(wait.record(stale_node()), None);
        assert_eq!(
            wait.record(Observation::Interactable),
            Some(ControlState::Interactable)
        );
    }

    #[test]
    fn test_wait_expires_as_inert_after_control_seen() {
        let mut wait = ReadinessWait::default();
        assert_eq!(wait.record(stale_node()), None);
        assert_eq!(wait.record(Observation::Present), None);
        assert_eq!(wait.record(stale_node()), None);
        assert_eq!(wait.expire(), ControlState::Inert);
    }

    #[test]
    fn test_wait_expires_as_missing_when_never_seen() {
        let mut wait = ReadinessWait::default();
        assert_eq!(wait.record(Observation::Absent), None);
        assert_eq!(wait.record(stale_node()), None);
        assert_eq!(wait.expire(), ControlState::Missing);
    }

    #[tokio::test]
    #[ignore] // 実環境テスト用: cargo test test_render_live -- --ignored --nocapture
    async fn test_render_live() {
        let launcher = ChromiumLauncher::new(true);
        let mut session = launcher.launch().await.expect("Failed to launch browser");
        let driver = PaginationDriver::new(PageSelectors::default(), Duration::from_secs(15));

        let result = driver
            .render(
                session.as_mut(),
                "https://webscraper.io/test-sites/e-commerce/more/phones/touch",
            )
            .await;
        session.close().await.expect("Failed to close browser");

        let doc = result.expect("Render failed");
        println!("termination={:?} clicks={}", doc.termination, doc.invocations);
        assert!(doc.html.contains("thumbnail"));
    }
}
