use std::path::PathBuf;
use std::time::Duration;

/// スクレイプ対象サイトのオリジン
pub const BASE_URL: &str = "https://webscraper.io/";

/// 「もっと見る」ボタンが操作可能になるまでの待機時間（秒）
pub const LOAD_MORE_TIMEOUT_SECS: u64 = 15;

/// カテゴリ名とパス（または絶対URL）の対応
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRef {
    pub name: String,
    pub target: String,
}

impl CategoryRef {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
        }
    }
}

/// 既知のカテゴリ一覧
pub fn default_categories() -> Vec<CategoryRef> {
    vec![
        CategoryRef::new("home", "test-sites/e-commerce/more"),
        CategoryRef::new(
            "computers",
            "https://webscraper.io/test-sites/e-commerce/more/computers",
        ),
        CategoryRef::new("laptops", "test-sites/e-commerce/more/computers/laptops"),
        CategoryRef::new("tablets", "test-sites/e-commerce/more/computers/tablets"),
        CategoryRef::new("phones", "test-sites/e-commerce/more/phones"),
        CategoryRef::new("touch", "test-sites/e-commerce/more/phones/touch"),
    ]
}

/// ページ操作に使うセレクタ
#[derive(Debug, Clone)]
pub struct PageSelectors {
    /// Cookie同意ボタン
    pub cookie_accept: String,
    /// 「もっと見る」ボタン
    pub load_more: String,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            cookie_accept: ".acceptCookies".to_string(),
            load_more: ".ecomerce-items-scroll-more".to_string(),
        }
    }
}

/// 商品カードの各要素のセレクタ
#[derive(Debug, Clone)]
pub struct ProductSelectors {
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    pub price: String,
    pub review_count: String,
    pub rating_attribute: String,
    pub star_icon: String,
}

impl Default for ProductSelectors {
    fn default() -> Self {
        Self {
            thumbnail: ".thumbnail".to_string(),
            title: ".title".to_string(),
            description: ".card-text".to_string(),
            price: ".price".to_string(),
            review_count: ".review-count".to_string(),
            rating_attribute: "[data-rating]".to_string(),
            star_icon: ".ws-icon-star".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub base_url: String,
    pub categories: Vec<CategoryRef>,
    pub output_path: PathBuf,
    pub headless: bool,
    pub load_more_timeout: Duration,
    /// 同時に起動するブラウザセッション数
    pub concurrency: usize,
    pub page_selectors: PageSelectors,
    pub product_selectors: ProductSelectors,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            categories: default_categories(),
            output_path: PathBuf::from("."),
            headless: true,
            load_more_timeout: Duration::from_secs(LOAD_MORE_TIMEOUT_SECS),
            concurrency: 1,
            page_selectors: PageSelectors::default(),
            product_selectors: ProductSelectors::default(),
        }
    }
}

impl ScraperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_categories(mut self, categories: Vec<CategoryRef>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_load_more_timeout(mut self, timeout: Duration) -> Self {
        self.load_more_timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// 名前でカテゴリを検索
    pub fn category(&self, name: &str) -> Option<&CategoryRef> {
        self.categories.iter().find(|c| c.name == name)
    }
}
