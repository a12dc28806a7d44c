//! ページネーション状態機械
//!
//! Navigate → DismissInterstitial → AwaitControl ⇄ Invoke → Terminal

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{PageSelectors, ScraperConfig};
use crate::error::ScraperError;
use crate::traits::{ControlState, RenderSession};

/// ページネーションの終了理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// これ以上読み込むものがない
    Exhausted,
    /// クリック操作に失敗したため中断
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Navigate,
    DismissInterstitial,
    AwaitControl,
    Invoke,
    Terminal(Termination),
}

/// ページネーション完了後のHTML
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub html: String,
    pub termination: Termination,
    /// 成功した「もっと見る」クリック回数
    pub invocations: usize,
}

#[derive(Debug, Clone)]
pub struct PaginationDriver {
    selectors: PageSelectors,
    timeout: Duration,
}

impl PaginationDriver {
    pub fn new(selectors: PageSelectors, timeout: Duration) -> Self {
        Self { selectors, timeout }
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(config.page_selectors.clone(), config.load_more_timeout)
    }

    /// 全商品を読み込んだ状態のHTMLを取得
    pub async fn render(
        &self,
        session: &mut dyn RenderSession,
        url: &str,
    ) -> Result<RenderedDocument, ScraperError> {
        let mut state = RenderState::Navigate;
        let mut invocations = 0;

        loop {
            if let RenderState::Terminal(termination) = state {
                let html = session.page_source().await?;
                info!(
                    url,
                    ?termination,
                    invocations,
                    bytes = html.len(),
                    "ページネーション完了"
                );
                return Ok(RenderedDocument {
                    html,
                    termination,
                    invocations,
                });
            }

            let next = self.step(session, state, url).await?;
            if state == RenderState::Invoke && next == RenderState::AwaitControl {
                invocations += 1;
            }
            state = next;
        }
    }

    /// 1回分の状態遷移
    pub async fn step(
        &self,
        session: &mut dyn RenderSession,
        state: RenderState,
        url: &str,
    ) -> Result<RenderState, ScraperError> {
        match state {
            RenderState::Navigate => {
                info!("ページに移動中: {}", url);
                session.navigate(url).await?;
                Ok(RenderState::DismissInterstitial)
            }
            RenderState::DismissInterstitial => {
                let selector = &self.selectors.cookie_accept;
                match session.element_exists(selector).await {
                    Ok(true) => {
                        debug!("Cookie同意ボタンを検出、クリックします...");
                        if let Err(e) = session.click(selector).await {
                            debug!("Cookie同意ボタンのクリックに失敗: {}", e);
                        }
                    }
                    Ok(false) => {}
                    Err(e) => debug!("Cookie同意ボタンを確認できません: {}", e),
                }
                Ok(RenderState::AwaitControl)
            }
            RenderState::AwaitControl => {
                let control = session
                    .wait_until_interactable(&self.selectors.load_more, self.timeout)
                    .await?;
                match control {
                    ControlState::Interactable => Ok(RenderState::Invoke),
                    ControlState::Inert => {
                        debug!("「もっと見る」ボタンが非表示または無効です");
                        Ok(RenderState::Terminal(Termination::Exhausted))
                    }
                    ControlState::Missing => {
                        debug!("「もっと見る」ボタンが{:?}以内に現れませんでした", self.timeout);
                        Ok(RenderState::Terminal(Termination::Exhausted))
                    }
                }
            }
            RenderState::Invoke => match session.move_and_click(&self.selectors.load_more).await {
                Ok(()) => Ok(RenderState::AwaitControl),
                Err(e) => {
                    warn!("「もっと見る」のクリックに失敗、読み込み済みの内容で終了します: {}", e);
                    Ok(RenderState::Terminal(Termination::Aborted))
                }
            },
            RenderState::Terminal(termination) => Ok(RenderState::Terminal(termination)),
        }
    }
}
