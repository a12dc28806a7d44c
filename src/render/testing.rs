//! テスト用のスクリプト化されたセッション

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ScraperError;
use crate::traits::{ControlState, RenderSession, SessionLauncher};

#[derive(Debug, Default)]
pub(crate) struct SessionLog {
    pub launched: usize,
    pub closed: usize,
    pub navigated: Vec<String>,
    pub interstitial_clicks: usize,
    pub load_more_clicks: usize,
}

impl SessionLog {
    pub fn shared() -> Arc<Mutex<SessionLog>> {
        Arc::new(Mutex::new(SessionLog::default()))
    }
}

pub(crate) struct ScriptedSession {
    html: String,
    pages: HashMap<String, String>,
    current_url: Option<String>,
    controls: VecDeque<ControlState>,
    /// 台本を使い切った後に返す状態
    exhausted_control: ControlState,
    interstitial: bool,
    failing_interstitial_check: bool,
    /// この回数だけクリックが成功し、以降は失敗する
    clicks_before_failure: Option<usize>,
    failing_navigation: bool,
    /// 成功したクリックで追加読み込みされた件数
    loaded_batches: usize,
    log: Arc<Mutex<SessionLog>>,
}

impl ScriptedSession {
    pub fn new(html: &str, log: Arc<Mutex<SessionLog>>) -> Self {
        Self {
            html: html.to_string(),
            pages: HashMap::new(),
            current_url: None,
            controls: VecDeque::new(),
            exhausted_control: ControlState::Missing,
            interstitial: false,
            failing_interstitial_check: false,
            clicks_before_failure: None,
            failing_navigation: false,
            loaded_batches: 0,
            log,
        }
    }

    pub fn with_pages(mut self, pages: HashMap<String, String>) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_controls(mut self, controls: Vec<ControlState>) -> Self {
        self.controls = controls.into();
        self
    }

    pub fn then_control(mut self, control: ControlState) -> Self {
        self.exhausted_control = control;
        self
    }

    pub fn with_interstitial(mut self) -> Self {
        self.interstitial = true;
        self
    }

    pub fn with_failing_interstitial_check(mut self) -> Self {
        self.failing_interstitial_check = true;
        self
    }

    pub fn with_failing_clicks(self) -> Self {
        self.with_clicks_failing_after(0)
    }

    pub fn with_clicks_failing_after(mut self, successes: usize) -> Self {
        self.clicks_before_failure = Some(successes);
        self
    }

    pub fn with_failing_navigation(mut self) -> Self {
        self.failing_navigation = true;
        self
    }
}

#[async_trait]
impl RenderSession for ScriptedSession {
    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError> {
        self.log.lock().unwrap().navigated.push(url.to_string());
        if self.failing_navigation {
            return Err(ScraperError::Navigation(format!("net::ERR_NAME_NOT_RESOLVED {url}")));
        }
        self.current_url = Some(url.to_string());
        Ok(())
    }

    async fn element_exists(&mut self, _selector: &str) -> Result<bool, ScraperError> {
        if self.failing_interstitial_check {
            return Err(ScraperError::Browser("Target closed".to_string()));
        }
        Ok(self.interstitial)
    }

    async fn click(&mut self, _selector: &str) -> Result<(), ScraperError> {
        self.log.lock().unwrap().interstitial_clicks += 1;
        self.interstitial = false;
        Ok(())
    }

    async fn wait_until_interactable(
        &mut self,
        _selector: &str,
        _timeout: Duration,
    ) -> Result<ControlState, ScraperError> {
        Ok(self.controls.pop_front().unwrap_or(self.exhausted_control))
    }

    async fn move_and_click(&mut self, _selector: &str) -> Result<(), ScraperError> {
        self.log.lock().unwrap().load_more_clicks += 1;
        if self.clicks_before_failure == Some(self.loaded_batches) {
            return Err(ScraperError::Interaction(
                "element click intercepted".to_string(),
            ));
        }
        self.loaded_batches += 1;
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String, ScraperError> {
        let mut html = self
            .current_url
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .unwrap_or(&self.html)
            .clone();
        for batch in 1..=self.loaded_batches {
            html.push_str(&format!("<div class=\"item\">batch {batch}</div>"));
        }
        Ok(html)
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        self.log.lock().unwrap().closed += 1;
        Ok(())
    }
}

/// URLごとのHTMLを返すセッションを起動する
pub(crate) struct ScriptedLauncher {
    pub fallback_html: String,
    pub pages: HashMap<String, String>,
    pub failing_navigation: bool,
    pub log: Arc<Mutex<SessionLog>>,
}

impl ScriptedLauncher {
    pub fn new(fallback_html: &str) -> Self {
        Self {
            fallback_html: fallback_html.to_string(),
            pages: HashMap::new(),
            failing_navigation: false,
            log: SessionLog::shared(),
        }
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }
}

#[async_trait]
impl SessionLauncher for ScriptedLauncher {
    async fn launch(&self) -> Result<Box<dyn RenderSession>, ScraperError> {
        self.log.lock().unwrap().launched += 1;
        let mut session = ScriptedSession::new(&self.fallback_html, self.log.clone())
            .with_pages(self.pages.clone())
            .with_controls(vec![ControlState::Interactable; 2])
            .then_control(ControlState::Inert);
        if self.failing_navigation {
            session = session.with_failing_navigation();
        }
        Ok(Box::new(session))
    }
}
