use catalog_scraper::{CatalogCrawler, ChromiumLauncher, ScraperConfig};

#[tokio::main]
async fn main() {
    // ログ設定
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // 環境変数から対象カテゴリを取得
    let category = std::env::var("CATEGORY").unwrap_or_else(|_| "home".to_string());

    let config = ScraperConfig::new().with_headless(false); // デバッグ用に表示モード
    let target = match config.category(&category) {
        Some(c) => c.target.clone(),
        None => category.clone(),
    };

    let launcher = ChromiumLauncher::from_config(&config);
    let crawler = CatalogCrawler::new(config, launcher).expect("invalid selectors");

    println!("=== Crawl {} ===", category);

    match crawler.crawl_category(&target).await {
        Ok(products) => {
            println!("成功! {}件", products.len());
            for p in &products {
                println!(
                    "  - {} ${:.2} ★{} ({} reviews)",
                    p.title(),
                    p.price(),
                    p.rating(),
                    p.num_of_reviews()
                );
            }
        }
        Err(e) => {
            eprintln!("エラー: {}", e);
        }
    }
}
