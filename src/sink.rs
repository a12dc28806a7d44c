use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ScraperError;
use crate::product::ProductRecord;
use crate::traits::ProductSink;

/// CSVのヘッダ行（商品が0件でも書き出す）
pub const CSV_HEADER: [&str; 5] = ["title", "description", "price", "rating", "numOfReviews"];

/// カテゴリごとに `<出力先>/<カテゴリ名>.csv` を書き出す
#[derive(Debug, Clone)]
pub struct CsvSink {
    output_path: PathBuf,
}

impl CsvSink {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    pub fn path_for(&self, category: &str) -> PathBuf {
        self.output_path.join(format!("{}.csv", category))
    }

    fn write(path: &Path, products: &[ProductRecord]) -> Result<(), ScraperError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)?;

        writer.write_record(CSV_HEADER)?;
        for product in products {
            writer.serialize(product)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl ProductSink for CsvSink {
    fn accept(&mut self, category: &str, products: &[ProductRecord]) -> Result<(), ScraperError> {
        std::fs::create_dir_all(&self.output_path)?;

        // 書き込み途中のファイルを残さないよう一時ファイルからリネームする
        let path = self.path_for(category);
        let partial = path.with_extension("csv.part");
        let written = Self::write(&partial, products)
            .and_then(|()| std::fs::rename(&partial, &path).map_err(ScraperError::from));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&partial);
            return Err(e);
        }

        info!("{}件の商品を書き出しました: {:?}", products.len(), path);
        Ok(())
    }
}
