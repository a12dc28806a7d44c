use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use catalog_scraper::{CatalogCrawler, CategoryRef, ChromiumLauncher, CsvSink, ScraperConfig};

/// 「もっと見る」型カタログの全カテゴリをCSVに書き出す
#[derive(Debug, Parser)]
#[command(name = "catalog-scraper", version)]
struct Args {
    /// 相対パスを解決するベースURL
    #[arg(long, default_value = catalog_scraper::config::BASE_URL)]
    base_url: String,

    /// CSVの出力ディレクトリ
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// 対象カテゴリ（省略時は全カテゴリ）
    #[arg(short, long = "category")]
    categories: Vec<String>,

    /// ブラウザを表示する
    #[arg(long)]
    headful: bool,

    /// 「もっと見る」ボタンの待機秒数
    #[arg(long, default_value_t = catalog_scraper::config::LOAD_MORE_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// 同時に起動するブラウザ数
    #[arg(short = 'j', long, default_value_t = 1)]
    concurrency: usize,
}

fn select_categories(
    known: Vec<CategoryRef>,
    wanted: &[String],
) -> Result<Vec<CategoryRef>, String> {
    if wanted.is_empty() {
        return Ok(known);
    }
    wanted
        .iter()
        .map(|name| {
            known
                .iter()
                .find(|c| &c.name == name)
                .cloned()
                .ok_or_else(|| format!("不明なカテゴリ: {}", name))
        })
        .collect()
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let known = catalog_scraper::config::default_categories();
    let categories = match select_categories(known, &args.categories) {
        Ok(categories) => categories,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(2);
        }
    };

    let config = ScraperConfig::new()
        .with_base_url(args.base_url)
        .with_categories(categories)
        .with_output_path(args.output)
        .with_headless(!args.headful)
        .with_load_more_timeout(Duration::from_secs(args.timeout_secs))
        .with_concurrency(args.concurrency);

    let launcher = ChromiumLauncher::from_config(&config);
    let mut sink = CsvSink::new(&config.output_path);
    let crawler = match CatalogCrawler::new(config, launcher) {
        Ok(crawler) => crawler,
        Err(e) => {
            error!("クローラーの初期化に失敗: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = crawler.crawl_all(&mut sink).await;

    for outcome in report.failed() {
        if let Err(e) = &outcome.result {
            error!(category = %outcome.category, kind = e.kind(), "出力なし: {}", e);
        }
    }
    info!(
        succeeded = report.succeeded().count(),
        failed = report.failed().count(),
        "全カテゴリのクロール完了"
    );

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_all_by_default() {
        let known = catalog_scraper::config::default_categories();
        let selected = select_categories(known.clone(), &[]).unwrap();
        assert_eq!(selected, known);
    }

    #[test]
    fn test_select_subset_in_requested_order() {
        let known = catalog_scraper::config::default_categories();
        let wanted = vec!["touch".to_string(), "home".to_string()];
        let selected = select_categories(known, &wanted).unwrap();
        let names: Vec<&str> = selected.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["touch", "home"]);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let known = catalog_scraper::config::default_categories();
        let err = select_categories(known, &["garden".to_string()]).unwrap_err();
        assert!(err.contains("garden"));
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "catalog-scraper",
            "-o",
            "/tmp/csv",
            "-c",
            "phones",
            "--headful",
            "-j",
            "2",
        ])
        .unwrap();
        assert_eq!(args.output, PathBuf::from("/tmp/csv"));
        assert_eq!(args.categories, ["phones"]);
        assert!(args.headful);
        assert_eq!(args.concurrency, 2);
        assert_eq!(args.timeout_secs, 15);
    }
}
