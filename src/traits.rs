use std::time::Duration;

use async_trait::async_trait;

use crate::error::ScraperError;
use crate::product::ProductRecord;

/// 待機後のページ内コントロールの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    /// 表示されていて操作可能
    Interactable,
    /// 存在するが非表示または無効
    Inert,
    /// タイムアウトまでに現れなかった
    Missing,
}

/// 1つのブラウザセッション（1タブ）に対する操作
#[async_trait]
pub trait RenderSession: Send {
    /// URLを開く
    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError>;

    /// セレクタに一致する要素が現在存在するか
    async fn element_exists(&mut self, selector: &str) -> Result<bool, ScraperError>;

    /// 要素をクリック
    async fn click(&mut self, selector: &str) -> Result<(), ScraperError>;

    /// 要素が操作可能になるまで最大 `timeout` 待機
    async fn wait_until_interactable(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<ControlState, ScraperError>;

    /// マウスを要素上に移動してからクリック
    async fn move_and_click(&mut self, selector: &str) -> Result<(), ScraperError>;

    /// 現在のページHTML全体
    async fn page_source(&mut self) -> Result<String, ScraperError>;

    /// リソース解放
    async fn close(&mut self) -> Result<(), ScraperError>;
}

/// クロールごとに新しいセッションを起動する
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn RenderSession>, ScraperError>;
}

/// カテゴリごとの抽出結果の出力先
pub trait ProductSink {
    fn accept(&mut self, category: &str, products: &[ProductRecord]) -> Result<(), ScraperError>;
}
