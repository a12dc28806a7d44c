use thiserror::Error;

use crate::product::ExtractionError;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("ブラウザ初期化エラー: {0}")]
    BrowserInit(String),

    #[error("ナビゲーションエラー: {0}")]
    Navigation(String),

    #[error("ブラウザ操作エラー: {0}")]
    Browser(String),

    #[error("要素が見つかりません: {0}")]
    ElementNotFound(String),

    #[error("クリック操作に失敗しました: {0}")]
    Interaction(String),

    #[error("URLを解決できません: {target}: {source}")]
    InvalidUrl {
        target: String,
        #[source]
        source: url::ParseError,
    },

    #[error("HTTP取得エラー: {url}: {message}")]
    Transport { url: String, message: String },

    #[error("HTTPステータスエラー: {url}: {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("商品データ抽出エラー: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("ファイル操作エラー: {0}")]
    FileIO(#[from] std::io::Error),

    #[error("CSV書き込みエラー: {0}")]
    Csv(#[from] csv::Error),
}

impl ScraperError {
    /// 診断ログ用の失敗種別
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BrowserInit(_) => "browser_init",
            Self::Navigation(_) => "navigation",
            Self::Browser(_) | Self::ElementNotFound(_) => "browser",
            Self::Interaction(_) => "interaction",
            Self::InvalidUrl { .. } => "invalid_url",
            Self::Transport { .. } | Self::HttpStatus { .. } => "transport",
            Self::Extraction(_) => "extraction",
            Self::FileIO(_) | Self::Csv(_) => "output",
        }
    }
}
