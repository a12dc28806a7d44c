//! ページレンダリングモジュール
//!
//! ブラウザセッションを操作して「もっと見る」を押し切り、全商品が読み込まれたHTMLを返す

mod chromium;
mod driver;
#[cfg(test)]
pub(crate) mod testing;

pub use chromium::{ChromiumLauncher, ChromiumSession};
pub use driver::{PaginationDriver, RenderState, RenderedDocument, Termination};
